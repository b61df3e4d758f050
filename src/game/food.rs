use std::f64::consts::PI;

use rand::Rng;

use crate::config::*;
use crate::game::physics::{self, Point};
use crate::protocol::messages::FoodDto;

/// Food value tiers. Common and medium come from random spawns (90/10),
/// death drops only from dead snakes, moving is the rare roaming tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodLevel {
    Common,
    Medium,
    DeathDrop,
    Moving,
}

impl FoodLevel {
    pub fn value(self) -> u32 {
        match self {
            FoodLevel::Common => 1,
            FoodLevel::Medium => 3,
            FoodLevel::DeathDrop => 5,
            FoodLevel::Moving => 10,
        }
    }

    /// 90% common / 10% medium, the split used for every random spawn.
    fn random_spawn_level() -> Self {
        if rand::thread_rng().gen::<f64>() < 0.10 {
            FoodLevel::Medium
        } else {
            FoodLevel::Common
        }
    }
}

/// Motion state carried only by the moving tier.
#[derive(Debug, Clone)]
pub struct Motion {
    pub angle: f64,
    pub speed: f64,
    pub ticks_left: u32,
}

#[derive(Debug, Clone)]
pub struct Food {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub level: FoodLevel,
    pub color: String,
    pub motion: Option<Motion>,
}

impl Food {
    pub fn with_level(id: u64, x: f64, y: f64, level: FoodLevel) -> Self {
        Food {
            id,
            x,
            y,
            level,
            color: color_for_level(level),
            motion: None,
        }
    }

    /// Uniform-random spawn inside the circular world.
    pub fn scattered(id: u64) -> Self {
        let (x, y) =
            physics::random_circle_point(WORLD_CENTER_X, WORLD_CENTER_Y, WORLD_RADIUS);
        Food::with_level(id, x, y, FoodLevel::random_spawn_level())
    }

    /// Death drop near a body segment, scattered a little so a corpse reads
    /// as a trail instead of a pile, clamped back inside the world.
    pub fn death_drop(id: u64, at: Point) -> Self {
        let mut rng = rand::thread_rng();
        let sx = at.x + (rng.gen::<f64>() * 2.0 - 1.0) * DEATH_FOOD_SCATTER;
        let sy = at.y + (rng.gen::<f64>() * 2.0 - 1.0) * DEATH_FOOD_SCATTER;
        let (x, y) =
            physics::clamp_to_circle(sx, sy, WORLD_CENTER_X, WORLD_CENTER_Y, WORLD_RADIUS);
        Food::with_level(id, x, y, FoodLevel::DeathDrop)
    }

    /// Tail drop from a boosting snake, colored to match it.
    pub fn boost_drop(id: u64, at: Point, color: String) -> Self {
        let mut f = Food::with_level(id, at.x, at.y, FoodLevel::Medium);
        f.color = color;
        f
    }

    /// Rare moving food with a random initial travel direction.
    pub fn moving(id: u64) -> Self {
        let (x, y) =
            physics::random_circle_point(WORLD_CENTER_X, WORLD_CENTER_Y, WORLD_RADIUS);
        let mut rng = rand::thread_rng();
        let mut f = Food::with_level(id, x, y, FoodLevel::Moving);
        f.motion = Some(Motion {
            angle: rng.gen::<f64>() * 2.0 * PI,
            speed: MOVING_FOOD_SPEED,
            ticks_left: rng.gen_range(MOVING_FOOD_DIR_MIN_TICKS..MOVING_FOOD_DIR_MAX_TICKS),
        });
        f
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    pub fn value(&self) -> u32 {
        self.level.value()
    }

    /// Advance moving food one tick: travel, reflect elastically off the
    /// circular boundary, count down to the next random direction change.
    pub fn update_motion(&mut self) {
        let Some(motion) = self.motion.as_mut() else {
            return;
        };

        self.x += motion.angle.cos() * motion.speed;
        self.y += motion.angle.sin() * motion.speed;

        let dx = self.x - WORLD_CENTER_X;
        let dy = self.y - WORLD_CENTER_Y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist > WORLD_RADIUS {
            // Mirror the velocity about the inward boundary normal:
            // v' = v - 2(v·n)n
            let nx = -dx / dist;
            let ny = -dy / dist;
            let vx = motion.angle.cos();
            let vy = motion.angle.sin();
            let dot = vx * nx + vy * ny;
            let rx = vx - 2.0 * dot * nx;
            let ry = vy - 2.0 * dot * ny;
            motion.angle = ry.atan2(rx);
            // Reposition just inside the boundary at the exit point
            self.x = WORLD_CENTER_X + (dx / dist) * (WORLD_RADIUS - 1.0);
            self.y = WORLD_CENTER_Y + (dy / dist) * (WORLD_RADIUS - 1.0);
        }

        motion.ticks_left = motion.ticks_left.saturating_sub(1);
        if motion.ticks_left == 0 {
            let mut rng = rand::thread_rng();
            motion.angle = rng.gen::<f64>() * 2.0 * PI;
            motion.ticks_left =
                rng.gen_range(MOVING_FOOD_DIR_MIN_TICKS..MOVING_FOOD_DIR_MAX_TICKS);
        }
    }

    pub fn to_dto(&self) -> FoodDto {
        FoodDto {
            id: self.id,
            x: physics::round1(self.x),
            y: physics::round1(self.y),
            value: self.value(),
            color: self.color.clone(),
            level: self.value(),
            moving: u8::from(self.is_moving()),
        }
    }
}

/// A cluster of 5-12 food items scattered within 80-150px of a random
/// center. `next_id` hands out world ids.
pub fn spawn_cluster(next_id: &mut impl FnMut() -> u64) -> Vec<Food> {
    let mut rng = rand::thread_rng();
    let (cx, cy) = physics::random_circle_point(
        WORLD_CENTER_X,
        WORLD_CENTER_Y,
        WORLD_RADIUS - 200.0,
    );
    let count = rng.gen_range(5..=12);
    let cluster_radius = rng.gen_range(80.0..150.0);

    (0..count)
        .map(|_| {
            let mut rng = rand::thread_rng();
            let angle = rng.gen::<f64>() * 2.0 * PI;
            let r = cluster_radius * rng.gen::<f64>().sqrt();
            let (x, y) = physics::clamp_to_circle(
                cx + r * angle.cos(),
                cy + r * angle.sin(),
                WORLD_CENTER_X,
                WORLD_CENTER_Y,
                WORLD_RADIUS,
            );
            Food::with_level(next_id(), x, y, FoodLevel::random_spawn_level())
        })
        .collect()
}

fn color_for_level(level: FoodLevel) -> String {
    let mut rng = rand::thread_rng();
    let palette: &[&str] = match level {
        FoodLevel::Common => &[
            "#ff6b6b", "#ffd93d", "#6bcb77", "#4d96ff", "#ff922b",
            "#cc5de8", "#20c997", "#f06595", "#74c0fc", "#a9e34b",
        ],
        FoodLevel::Medium => &["#f39c12", "#e67e22", "#d35400", "#c0392b", "#e74c3c"],
        FoodLevel::DeathDrop => &["#8e44ad", "#9b59b6", "#6c3483", "#a569bd", "#7d3c98"],
        FoodLevel::Moving => return "#ffd700".to_string(),
    };
    palette[rng.gen_range(0..palette.len())].to_string()
}
