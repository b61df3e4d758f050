use std::collections::VecDeque;
use std::f64::consts::PI;

use rand::Rng;

use crate::config::*;
use crate::game::physics::{self, Point};
use crate::protocol::messages::SnakeDto;

/// A player- or bot-controlled snake: an ordered chain of segments with the
/// head at the front. Score tracks segment count; width follows score with
/// diminishing returns.
#[derive(Debug, Clone)]
pub struct Snake {
    pub id: u64,
    pub name: String,
    pub segments: VecDeque<Point>,
    pub angle: f64,
    pub speed: f64,
    pub score: u32,
    pub color: String,
    pub alive: bool,
    pub boosting: bool,
    boost_ticks: u32,
    pub width: f64,
}

impl Snake {
    /// Spawn at a random point at least SPAWN_MARGIN inside the boundary,
    /// with a short initial chain trailing behind a random heading.
    pub fn spawn(id: u64, name: String, color: String) -> Self {
        let (x, y) = physics::random_circle_point(
            WORLD_CENTER_X,
            WORLD_CENTER_Y,
            WORLD_RADIUS - SPAWN_MARGIN,
        );
        let angle = physics::normalize_angle(rand::thread_rng().gen::<f64>() * 2.0 * PI);

        let segments = (0..SNAKE_INIT_SEGMENTS)
            .map(|i| {
                Point::new(
                    x - i as f64 * SNAKE_SEGMENT_SPACING * angle.cos(),
                    y - i as f64 * SNAKE_SEGMENT_SPACING * angle.sin(),
                )
            })
            .collect();

        Snake {
            id,
            name,
            segments,
            angle,
            speed: SNAKE_NORMAL_SPEED,
            score: SNAKE_INIT_SEGMENTS as u32,
            color,
            alive: true,
            boosting: false,
            boost_ticks: 0,
            width: SNAKE_BASE_WIDTH,
        }
    }

    pub fn head(&self) -> Point {
        self.segments[0]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Advance one tick along the current heading: the new head is pushed to
    /// the front and the tail point dropped, so the chain length is constant
    /// here (growth bookkeeping appends separately). Returns true when the
    /// new head crossed the circular boundary; the crossing is fatal but
    /// resolved by the caller.
    pub fn advance(&mut self) -> bool {
        let head = self.head();
        let new_head = Point::new(
            head.x + self.speed * self.angle.cos(),
            head.y + self.speed * self.angle.sin(),
        );

        self.segments.push_front(new_head);
        self.segments.pop_back();

        !physics::inside_world(new_head.x, new_head.y)
    }

    /// Maximum angular change this tick; longer snakes turn slower.
    pub fn max_turn(&self) -> f64 {
        SNAKE_MAX_TURN_RATE / (1.0 + self.len() as f64 * SNAKE_TURN_SCALE_FACTOR)
    }

    /// Apply a control sample: steer toward `angle` (clamped to the turn
    /// limit), set boost. While boosting, every SNAKE_BOOST_COST_TICKS-th
    /// tick costs a tail segment; the vacated tail position is returned with
    /// probability BOOST_DROP_PROBABILITY so the caller can drop food there.
    pub fn apply_input(&mut self, angle: f64, boost: bool) -> Option<Point> {
        let max_turn = self.max_turn();
        let diff = physics::normalize_angle(angle - self.angle).clamp(-max_turn, max_turn);
        self.angle = physics::normalize_angle(self.angle + diff);

        self.boosting = boost;

        if !boost {
            self.speed = SNAKE_NORMAL_SPEED;
            self.boost_ticks = 0;
            return None;
        }

        self.speed = SNAKE_BOOST_SPEED;
        self.boost_ticks += 1;
        if self.boost_ticks % SNAKE_BOOST_COST_TICKS != 0 || self.len() <= SNAKE_MIN_SEGMENTS {
            return None;
        }

        let tail = self.segments.pop_back().expect("segments never empty");
        self.score = self.score.saturating_sub(1);
        let width_loss = SNAKE_WIDTH_GAIN_FACTOR / (self.len() + 1) as f64;
        self.width = (self.width - width_loss).max(SNAKE_BASE_WIDTH);

        if rand::thread_rng().gen::<f64>() < BOOST_DROP_PROBABILITY {
            Some(tail)
        } else {
            None
        }
    }

    /// Consume food worth `value`: append that many tail segments and grow
    /// width by factor * value / new_length; the per-food gain shrinks as
    /// the snake lengthens, capped at SNAKE_MAX_WIDTH.
    pub fn grow(&mut self, value: u32) {
        let tail = *self.segments.back().expect("segments never empty");
        for _ in 0..value {
            self.segments.push_back(tail);
        }
        self.score += value;
        let gain = SNAKE_WIDTH_GAIN_FACTOR * value as f64 / self.len() as f64;
        self.width = (self.width + gain).min(SNAKE_MAX_WIDTH);
    }

    /// Mark the snake dead and return the positions where its body converts
    /// to food: every DEATH_FOOD_PER_UNIT-th segment, trimmed to
    /// DEATH_FOOD_FRACTION of the total; the remainder is the score sink.
    pub fn death_drop_points(&mut self) -> Vec<Point> {
        self.alive = false;
        let total = self.len() / DEATH_FOOD_PER_UNIT;
        let drop_count = (total as f64 * DEATH_FOOD_FRACTION) as usize;
        self.segments
            .iter()
            .step_by(DEATH_FOOD_PER_UNIT)
            .take(drop_count)
            .copied()
            .collect()
    }

    /// Compact wire form, coordinates rounded to one decimal.
    pub fn to_dto(&self) -> SnakeDto {
        SnakeDto {
            id: self.id,
            name: self.name.clone(),
            segments: self
                .segments
                .iter()
                .map(|p| [physics::round1(p.x), physics::round1(p.y)])
                .collect(),
            color: self.color.clone(),
            score: self.score,
            boosting: u8::from(self.boosting),
            width: physics::round1(self.width),
        }
    }
}

pub fn random_color() -> String {
    let mut rng = rand::thread_rng();
    PLAYER_COLORS[rng.gen_range(0..PLAYER_COLORS.len())].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::physics::{distance, inside_world, normalize_angle};

    fn test_snake() -> Snake {
        Snake::spawn(1, "tester".into(), "#e74c3c".into())
    }

    #[test]
    fn spawn_respects_margin_and_invariants() {
        for i in 0..100 {
            let s = Snake::spawn(i, "s".into(), "#fff".into());
            let head = s.head();
            assert!(
                distance(head.x, head.y, WORLD_CENTER_X, WORLD_CENTER_Y)
                    <= WORLD_RADIUS - SPAWN_MARGIN
            );
            assert_eq!(s.len(), SNAKE_INIT_SEGMENTS);
            assert_eq!(s.score as usize, SNAKE_INIT_SEGMENTS);
            assert_eq!(s.width, SNAKE_BASE_WIDTH);
            assert!(s.angle > -PI && s.angle <= PI);
        }
    }

    #[test]
    fn advance_keeps_length_and_moves_head() {
        let mut s = test_snake();
        s.angle = 0.0;
        let before = s.head();
        let len = s.len();
        let out = s.advance();
        assert!(!out);
        assert_eq!(s.len(), len);
        let after = s.head();
        assert!((after.x - before.x - SNAKE_NORMAL_SPEED).abs() < 1e-9);
        assert_eq!(after.y, before.y);
    }

    #[test]
    fn advance_flags_boundary_crossing() {
        let mut s = test_snake();
        // Place the head just inside the east edge, heading out
        *s.segments.front_mut().unwrap() =
            Point::new(WORLD_CENTER_X + WORLD_RADIUS - 1.0, WORLD_CENTER_Y);
        s.angle = 0.0;
        assert!(s.advance());
    }

    #[test]
    fn turn_is_clamped_by_size_scaled_rate() {
        let mut s = test_snake();
        s.angle = 0.0;
        let max_turn = s.max_turn();
        s.apply_input(PI / 2.0, false);
        assert!((s.angle - max_turn).abs() < 1e-9);

        // A long snake turns strictly slower
        let mut long = test_snake();
        long.grow(500);
        assert!(long.max_turn() < max_turn);
    }

    #[test]
    fn turn_clamp_takes_shortest_path_across_pi() {
        let mut s = test_snake();
        s.angle = PI - 0.01;
        // Requested heading just past -π: shortest signed distance is a small
        // positive turn across the wrap, not a near-2π negative sweep.
        s.apply_input(-PI + 0.01, false);
        assert!(s.angle > -PI && s.angle <= PI);
        let moved = normalize_angle(s.angle - (PI - 0.01));
        assert!(moved > 0.0);
        assert!(moved <= s.max_turn() + 1e-9);
    }

    #[test]
    fn grow_appends_and_width_gain_diminishes() {
        let mut s = test_snake();
        let w0 = s.width;
        s.grow(3);
        let first_gain = s.width - w0;
        assert_eq!(s.len(), SNAKE_INIT_SEGMENTS + 3);
        assert_eq!(s.score as usize, SNAKE_INIT_SEGMENTS + 3);
        assert!(first_gain > 0.0);

        s.grow(200);
        let w1 = s.width;
        s.grow(3);
        let later_gain = s.width - w1;
        assert!(later_gain < first_gain);
        assert!(s.width <= SNAKE_MAX_WIDTH);
    }

    #[test]
    fn width_never_exceeds_cap() {
        let mut s = test_snake();
        for _ in 0..100 {
            s.grow(10);
        }
        assert!(s.width <= SNAKE_MAX_WIDTH);
    }

    #[test]
    fn boost_costs_a_segment_every_third_tick() {
        let mut s = test_snake();
        s.grow(10);
        let len0 = s.len();
        let score0 = s.score;

        s.apply_input(s.angle, true);
        s.apply_input(s.angle, true);
        assert_eq!(s.len(), len0);
        s.apply_input(s.angle, true);
        assert_eq!(s.len(), len0 - 1);
        assert_eq!(s.score, score0 - 1);
        assert!(s.boosting);
        assert_eq!(s.speed, SNAKE_BOOST_SPEED);

        // Releasing boost resets speed and the counter
        s.apply_input(s.angle, false);
        assert_eq!(s.speed, SNAKE_NORMAL_SPEED);
        assert!(!s.boosting);
    }

    #[test]
    fn boost_never_shrinks_below_min_segments() {
        let mut s = test_snake();
        for _ in 0..10_000 {
            s.apply_input(s.angle, true);
            assert!(s.len() >= SNAKE_MIN_SEGMENTS);
            assert!(s.width >= SNAKE_BASE_WIDTH);
        }
        assert_eq!(s.len(), SNAKE_MIN_SEGMENTS);
    }

    #[test]
    fn death_drop_samples_segments_at_sink_fraction() {
        let mut s = test_snake();
        s.grow(90); // 100 segments
        let drops = s.death_drop_points();
        assert!(!s.alive);
        let expected =
            ((s.len() / DEATH_FOOD_PER_UNIT) as f64 * DEATH_FOOD_FRACTION) as usize;
        assert_eq!(drops.len(), expected);
        for p in &drops {
            assert!(inside_world(p.x, p.y));
        }
    }

    #[test]
    fn dto_round_trips_at_one_decimal() {
        let mut s = test_snake();
        s.grow(5);
        let dto = s.to_dto();
        let json = serde_json::to_string(&dto).expect("serialize");
        let parsed: SnakeDto = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed.segments.len(), s.len());
        for (pair, seg) in parsed.segments.iter().zip(s.segments.iter()) {
            assert_eq!(pair[0], physics::round1(seg.x));
            assert_eq!(pair[1], physics::round1(seg.y));
        }
        assert_eq!(parsed.score, s.score);
        assert_eq!(parsed.width, physics::round1(s.width));
    }
}
