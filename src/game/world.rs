use std::collections::HashMap;

use tracing::debug;

use crate::config::*;
use crate::game::food::{self, Food};
use crate::game::grid::SpatialGrid;
use crate::game::physics::{self, Point};
use crate::game::snake::Snake;
use crate::protocol::messages::{FoodDto, LeaderboardEntry, MinimapTrace, SnakeDto};

/// Owns all live snakes and food plus the derived spatial index. A single
/// writer (the game loop) mutates it per tick under the exclusive lock;
/// broadcast readers take shared access. Entities are addressed by stable
/// u64 ids from a World-owned counter, never by reference.
pub struct World {
    pub snakes: HashMap<u64, Snake>,
    pub food: HashMap<u64, Food>,
    pub grid: SpatialGrid,
    next_entity_id: u64,
}

impl World {
    pub fn new() -> Self {
        let mut world = Self::empty();
        world.spawn_initial_food();
        world
    }

    /// A world with no food seeded; starting point for tests.
    pub fn empty() -> Self {
        World {
            snakes: HashMap::new(),
            food: HashMap::new(),
            grid: SpatialGrid::default(),
            next_entity_id: 1,
        }
    }

    /// Allocate the next entity id (snakes and food share the space).
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    pub fn add_snake(&mut self, snake: Snake) {
        self.snakes.insert(snake.id, snake);
    }

    pub fn remove_snake(&mut self, id: u64) {
        self.snakes.remove(&id);
    }

    pub fn insert_food(&mut self, food: Food) {
        self.food.insert(food.id, food);
    }

    fn spawn_initial_food(&mut self) {
        let clustered = (INITIAL_FOOD_COUNT as f64 * CLUSTER_FRACTION) as usize;
        let mut spawned = 0;
        while spawned < clustered {
            let cluster = {
                let mut next = || self.next_id();
                food::spawn_cluster(&mut next)
            };
            for f in cluster {
                if spawned >= clustered {
                    break;
                }
                self.insert_food(f);
                spawned += 1;
            }
        }
        for _ in 0..INITIAL_FOOD_COUNT - clustered {
            let id = self.next_id();
            self.insert_food(Food::scattered(id));
        }
    }

    /// Rebuild the spatial index from current positions. Must run after all
    /// movement of a tick and before any of that tick's queries.
    pub fn rebuild_grid(&mut self) {
        self.grid.clear();
        for f in self.food.values() {
            self.grid.insert_food(f);
        }
        for s in self.snakes.values() {
            if s.alive {
                self.grid.insert_snake_body(s);
            }
        }
    }

    pub fn update_moving_food(&mut self) {
        for f in self.food.values_mut() {
            f.update_motion();
        }
    }

    /// Spawn one rare moving food unless the cap is already reached.
    pub fn maybe_spawn_moving_food(&mut self) {
        let count = self.food.values().filter(|f| f.is_moving()).count();
        if count >= MOVING_FOOD_MAX_COUNT {
            return;
        }
        let id = self.next_id();
        self.insert_food(Food::moving(id));
        debug!(moving = count + 1, "spawned moving food");
    }

    /// Top non-moving food back up toward the target, at most
    /// FOOD_SPAWN_PER_TICK per call, preferring clusters for large deficits.
    pub fn maintain_food_count(&mut self) {
        let normal = self.food.values().filter(|f| !f.is_moving()).count();
        let deficit = TARGET_FOOD_COUNT.saturating_sub(normal);
        if deficit == 0 {
            return;
        }
        let budget = deficit.min(FOOD_SPAWN_PER_TICK);
        let mut spawned = 0;
        while spawned < budget {
            if budget - spawned >= 5 {
                let cluster = {
                    let mut next = || self.next_id();
                    food::spawn_cluster(&mut next)
                };
                for f in cluster {
                    if spawned >= budget {
                        break;
                    }
                    self.insert_food(f);
                    spawned += 1;
                }
            } else {
                let id = self.next_id();
                self.insert_food(Food::scattered(id));
                spawned += 1;
            }
        }
    }

    /// Head-vs-body and head-vs-head collision detection against this
    /// tick's index. Returns victim id mapped to killer name. A snake marked
    /// dead
    /// earlier in the pass is skipped for further death checks, but its body
    /// stays a hazard for snakes evaluated before it.
    pub fn detect_collisions(&self) -> HashMap<u64, String> {
        let mut deaths: HashMap<u64, String> = HashMap::new();
        let alive_ids: Vec<u64> = self
            .snakes
            .values()
            .filter(|s| s.alive)
            .map(|s| s.id)
            .collect();

        for &id in &alive_ids {
            if deaths.contains_key(&id) {
                continue;
            }
            let head = self.snakes[&id].head();
            for hit in
                self.grid
                    .nearby_snake_body(head.x, head.y, COLLISION_CHECK_RADIUS, id)
            {
                let Some(other) = self.snakes.get(&hit.snake_id) else {
                    continue;
                };
                if !other.alive {
                    continue;
                }
                let dist = physics::distance(head.x, head.y, hit.x, hit.y);
                if dist < SNAKE_HEAD_RADIUS + SNAKE_BODY_RADIUS {
                    deaths.entry(id).or_insert_with(|| other.name.clone());
                }
            }
        }

        // Head-to-head: the lower score dies; a tie kills both.
        for i in 0..alive_ids.len() {
            for j in (i + 1)..alive_ids.len() {
                let (a_id, b_id) = (alive_ids[i], alive_ids[j]);
                if deaths.contains_key(&a_id) || deaths.contains_key(&b_id) {
                    continue;
                }
                let a = &self.snakes[&a_id];
                let b = &self.snakes[&b_id];
                if a.head().distance_to(b.head()) < SNAKE_HEAD_RADIUS * 2.0 {
                    if a.score >= b.score {
                        deaths.insert(b_id, a.name.clone());
                    }
                    if b.score >= a.score {
                        deaths.insert(a_id, b.name.clone());
                    }
                }
            }
        }

        deaths
    }

    /// Mark a snake dead and scatter food over part of its body. Returns the
    /// number of food items dropped.
    pub fn convert_to_food(&mut self, id: u64) -> usize {
        let points = match self.snakes.get_mut(&id) {
            Some(snake) if snake.alive => snake.death_drop_points(),
            _ => return 0,
        };
        let count = points.len();
        for p in points {
            let fid = self.next_id();
            self.insert_food(Food::death_drop(fid, p));
        }
        count
    }

    /// Pull food within the magnet radius (but outside the eating radius)
    /// one step toward each live head, never overshooting.
    pub fn apply_food_magnet(&mut self) {
        let heads: Vec<Point> = self
            .snakes
            .values()
            .filter(|s| s.alive)
            .map(|s| s.head())
            .collect();
        for head in heads {
            for fid in self.grid.nearby_food(head.x, head.y, MAGNET_RADIUS) {
                let Some(food) = self.food.get_mut(&fid) else {
                    continue;
                };
                let dx = head.x - food.x;
                let dy = head.y - food.y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist <= SNAKE_HEAD_RADIUS + FOOD_RADIUS {
                    continue; // close enough to eat this tick
                }
                let step = MAGNET_SPEED.min(dist);
                food.x += dx / dist * step;
                food.y += dy / dist * step;
            }
        }
    }

    /// Consume food within eating radius of each live head.
    pub fn collect_food(&mut self) {
        let ids: Vec<u64> = self
            .snakes
            .values()
            .filter(|s| s.alive)
            .map(|s| s.id)
            .collect();
        for id in ids {
            let head = self.snakes[&id].head();
            for fid in self
                .grid
                .nearby_food(head.x, head.y, SNAKE_HEAD_RADIUS + FOOD_RADIUS)
            {
                let Some(food) = self.food.remove(&fid) else {
                    continue;
                };
                if let Some(snake) = self.snakes.get_mut(&id) {
                    snake.grow(food.value());
                }
            }
        }
    }

    /// Top-N live snakes by descending score.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut alive: Vec<&Snake> = self.snakes.values().filter(|s| s.alive).collect();
        alive.sort_by(|a, b| b.score.cmp(&a.score));
        alive.truncate(LEADERBOARD_SIZE);
        alive
            .into_iter()
            .map(|s| LeaderboardEntry {
                id: s.id,
                name: s.name.clone(),
                score: s.score,
            })
            .collect()
    }

    /// Snakes with at least one segment inside the viewport rectangle
    /// centered on (cx, cy); body visibility, not just the head.
    pub fn snakes_in_viewport(&self, cx: f64, cy: f64) -> Vec<SnakeDto> {
        let half_w = VIEWPORT_WIDTH / 2.0 + VIEWPORT_BUFFER;
        let half_h = VIEWPORT_HEIGHT / 2.0 + VIEWPORT_BUFFER;
        let (min_x, max_x) = (cx - half_w, cx + half_w);
        let (min_y, max_y) = (cy - half_h, cy + half_h);

        self.snakes
            .values()
            .filter(|s| s.alive)
            .filter(|s| {
                s.segments
                    .iter()
                    .any(|p| p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y)
            })
            .map(Snake::to_dto)
            .collect()
    }

    /// Food overlapping the viewport rectangle, via the grid's rect query.
    pub fn food_in_viewport(&self, cx: f64, cy: f64) -> Vec<FoodDto> {
        let half_w = VIEWPORT_WIDTH / 2.0 + VIEWPORT_BUFFER;
        let half_h = VIEWPORT_HEIGHT / 2.0 + VIEWPORT_BUFFER;
        self.grid
            .food_in_rect(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
            .into_iter()
            .filter_map(|id| self.food.get(&id))
            .map(Food::to_dto)
            .collect()
    }

    /// Downsampled body traces for the minimap, independent of any
    /// viewport. The stride maps body length to roughly one minimap pixel;
    /// snakes shorter than one stride are omitted.
    pub fn minimap(&self) -> Vec<MinimapTrace> {
        let scale = MINIMAP_DIAMETER / (WORLD_RADIUS * 2.0);
        let stride = ((1.0 / (scale * SNAKE_SEGMENT_SPACING)) as usize).max(2);

        let mut traces = Vec::new();
        for s in self.snakes.values() {
            if !s.alive || s.len() < stride {
                continue;
            }
            let mut segs: Vec<[f64; 2]> = s
                .segments
                .iter()
                .step_by(stride)
                .map(|p| [physics::round1(p.x), physics::round1(p.y)])
                .collect();
            if let Some(last) = s.segments.back() {
                let last_pt = [physics::round1(last.x), physics::round1(last.y)];
                if segs.last() != Some(&last_pt) {
                    segs.push(last_pt);
                }
            }
            if segs.len() >= 2 {
                traces.push(MinimapTrace {
                    segments: segs,
                    color: s.color.clone(),
                    width: physics::round1(s.width),
                });
            }
        }
        traces
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::food::FoodLevel;

    fn snake_heading(
        world: &mut World,
        name: &str,
        x: f64,
        y: f64,
        angle: f64,
        extra: u32,
    ) -> u64 {
        let id = world.next_id();
        let mut s = Snake::spawn(id, name.into(), "#fff".into());
        let segs: Vec<Point> = (0..s.len())
            .map(|i| {
                Point::new(
                    x - i as f64 * SNAKE_SEGMENT_SPACING * angle.cos(),
                    y - i as f64 * SNAKE_SEGMENT_SPACING * angle.sin(),
                )
            })
            .collect();
        s.segments = segs.into_iter().collect();
        s.angle = angle;
        if extra > 0 {
            s.grow(extra);
        }
        world.add_snake(s);
        id
    }

    fn snake_heading_east(world: &mut World, name: &str, x: f64, y: f64, extra: u32) -> u64 {
        snake_heading(world, name, x, y, 0.0, extra)
    }

    #[test]
    fn initial_seed_reaches_target_population() {
        let w = World::new();
        assert_eq!(w.food.len(), INITIAL_FOOD_COUNT);
        assert!(w.food.values().all(|f| !f.is_moving()));
    }

    #[test]
    fn replenish_is_capped_per_tick() {
        let mut w = World::empty();
        for _ in 0..(TARGET_FOOD_COUNT - 500) {
            let id = w.next_id();
            w.insert_food(Food::with_level(id, WORLD_CENTER_X, WORLD_CENTER_Y, FoodLevel::Common));
        }
        w.maintain_food_count();
        assert_eq!(w.food.len(), TARGET_FOOD_COUNT - 500 + FOOD_SPAWN_PER_TICK);
    }

    #[test]
    fn replenish_small_deficit_tops_up_exactly() {
        let mut w = World::empty();
        for _ in 0..(TARGET_FOOD_COUNT - 3) {
            let id = w.next_id();
            w.insert_food(Food::with_level(id, WORLD_CENTER_X, WORLD_CENTER_Y, FoodLevel::Common));
        }
        w.maintain_food_count();
        assert_eq!(w.food.len(), TARGET_FOOD_COUNT);
        w.maintain_food_count();
        assert_eq!(w.food.len(), TARGET_FOOD_COUNT);
    }

    #[test]
    fn moving_food_spawn_respects_cap() {
        let mut w = World::empty();
        for _ in 0..MOVING_FOOD_MAX_COUNT + 2 {
            w.maybe_spawn_moving_food();
        }
        let moving = w.food.values().filter(|f| f.is_moving()).count();
        assert_eq!(moving, MOVING_FOOD_MAX_COUNT);
    }

    #[test]
    fn head_to_head_lower_score_dies() {
        use std::f64::consts::PI;
        let mut w = World::empty();
        // Head-on approach: bodies trail away from the meeting point
        let a = snake_heading(&mut w, "Anna", 10600.0, 10500.0, 0.0, 5); // score 15
        let b = snake_heading(&mut w, "Bert", 10619.0, 10500.0, PI, 0); // score 10
        w.rebuild_grid();

        let deaths = w.detect_collisions();
        assert_eq!(deaths.get(&b).map(String::as_str), Some("Anna"));
        assert!(!deaths.contains_key(&a));
    }

    #[test]
    fn head_to_head_tie_kills_both() {
        use std::f64::consts::PI;
        let mut w = World::empty();
        let a = snake_heading(&mut w, "Anna", 10600.0, 10500.0, 0.0, 0);
        let b = snake_heading(&mut w, "Bert", 10619.0, 10500.0, PI, 0);
        w.rebuild_grid();

        let deaths = w.detect_collisions();
        assert_eq!(deaths.get(&a).map(String::as_str), Some("Bert"));
        assert_eq!(deaths.get(&b).map(String::as_str), Some("Anna"));
    }

    #[test]
    fn head_into_body_kills_the_head_owner() {
        let mut w = World::empty();
        // Victim's head runs into the other's body trail (not its head):
        // the body of "Wall" extends west from (10700, 10560)
        let wall = snake_heading_east(&mut w, "Wall", 10700.0, 10560.0, 30);
        let victim = snake_heading_east(&mut w, "Vic", 10660.0, 10565.0, 0);
        w.rebuild_grid();

        let deaths = w.detect_collisions();
        assert_eq!(deaths.get(&victim).map(String::as_str), Some("Wall"));
        assert!(!deaths.contains_key(&wall));
    }

    #[test]
    fn conversion_drops_food_and_marks_dead() {
        let mut w = World::empty();
        let id = snake_heading_east(&mut w, "Dead", 10600.0, 10500.0, 90); // 100 segments
        let before = w.food.len();

        let dropped = w.convert_to_food(id);
        let snake = &w.snakes[&id];
        assert!(!snake.alive);
        let expected =
            ((snake.len() / DEATH_FOOD_PER_UNIT) as f64 * DEATH_FOOD_FRACTION) as usize;
        assert_eq!(dropped, expected);
        assert_eq!(w.food.len(), before + expected);
        // A second conversion is a no-op: the death is processed exactly once
        assert_eq!(w.convert_to_food(id), 0);
    }

    #[test]
    fn magnet_pulls_food_in_the_band_only() {
        let mut w = World::empty();
        let snake_id = snake_heading_east(&mut w, "Mag", 10500.0, 10500.0, 0);
        let head = w.snakes[&snake_id].head();

        let near_id = w.next_id();
        w.insert_food(Food::with_level(
            near_id,
            head.x + 15.5,
            head.y,
            FoodLevel::Common,
        ));
        let eat_id = w.next_id();
        w.insert_food(Food::with_level(
            eat_id,
            head.x + 10.0,
            head.y,
            FoodLevel::Common,
        ));
        w.rebuild_grid();

        w.apply_food_magnet();
        let pulled = &w.food[&near_id];
        assert!((pulled.x - (head.x + 15.5 - MAGNET_SPEED)).abs() < 1e-9);
        // Food already inside the eating radius is left for consumption
        let waiting = &w.food[&eat_id];
        assert_eq!(waiting.x, head.x + 10.0);
    }

    #[test]
    fn consumption_removes_food_and_grows_snake() {
        let mut w = World::empty();
        let snake_id = snake_heading_east(&mut w, "Eat", 10500.0, 10500.0, 0);
        let head = w.snakes[&snake_id].head();
        let fid = w.next_id();
        w.insert_food(Food::with_level(fid, head.x + 5.0, head.y, FoodLevel::Medium));
        w.rebuild_grid();

        let score_before = w.snakes[&snake_id].score;
        w.collect_food();
        assert!(!w.food.contains_key(&fid));
        assert_eq!(w.snakes[&snake_id].score, score_before + 3);
    }

    #[test]
    fn leaderboard_is_sorted_truncated_and_alive_only() {
        let mut w = World::empty();
        for i in 0..(LEADERBOARD_SIZE + 5) {
            let id = snake_heading_east(
                &mut w,
                &format!("s{i}"),
                10500.0 + i as f64 * 300.0,
                10500.0,
                i as u32,
            );
            if i == 3 {
                w.snakes.get_mut(&id).unwrap().alive = false;
            }
        }

        let board = w.leaderboard();
        assert_eq!(board.len(), LEADERBOARD_SIZE);
        assert!(board.windows(2).all(|p| p[0].score >= p[1].score));
        assert!(board.iter().all(|e| e.name != "s3"));
    }

    #[test]
    fn viewport_includes_snakes_by_any_segment() {
        let mut w = World::empty();
        // Head far east of the viewport, but the tail reaches back into it
        let id = w.next_id();
        let mut s = Snake::spawn(id, "Long".into(), "#fff".into());
        let segs: Vec<Point> = (0..400)
            .map(|i| Point::new(12500.0 - i as f64 * SNAKE_SEGMENT_SPACING, 10500.0))
            .collect();
        s.segments = segs.into_iter().collect();
        w.add_snake(s);

        let visible = w.snakes_in_viewport(10500.0, 10500.0);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, id);

        // Entirely out of range → culled
        let far = w.snakes_in_viewport(3000.0, 3000.0);
        assert!(far.is_empty());
    }

    #[test]
    fn viewport_food_comes_from_rect_query() {
        let mut w = World::empty();
        let inside = w.next_id();
        w.insert_food(Food::with_level(inside, 10600.0, 10500.0, FoodLevel::Common));
        let outside = w.next_id();
        w.insert_food(Food::with_level(outside, 14000.0, 10500.0, FoodLevel::Common));
        w.rebuild_grid();

        let dtos = w.food_in_viewport(10500.0, 10500.0);
        assert_eq!(dtos.len(), 1);
        assert_eq!(dtos[0].id, inside);
    }

    #[test]
    fn minimap_omits_short_snakes_and_downsamples_long_ones() {
        let mut w = World::empty();
        snake_heading_east(&mut w, "Short", 10500.0, 10500.0, 0);
        let long_id = snake_heading_east(&mut w, "Long", 10500.0, 11000.0, 150);

        let traces = w.minimap();
        assert_eq!(traces.len(), 1);
        let trace = &traces[0];
        let long = &w.snakes[&long_id];
        assert!(trace.segments.len() >= 2);
        assert!(trace.segments.len() < long.len() / 2);
        // Tail is always part of the trace
        let tail = long.segments.back().unwrap();
        assert_eq!(
            *trace.segments.last().unwrap(),
            [physics::round1(tail.x), physics::round1(tail.y)]
        );
    }

    #[test]
    fn id_generator_is_monotonic() {
        let mut w = World::empty();
        let a = w.next_id();
        let b = w.next_id();
        assert!(b > a);
    }
}
