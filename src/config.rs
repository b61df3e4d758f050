// Game tuning constants. The world is a circle: crossing the boundary kills.

// Server
pub const SERVER_PORT: u16 = 8080;
pub const MAX_PLAYERS: usize = 200;
pub const MAX_NAME_LEN: usize = 20;

// World: circular map, center (10500, 10500), radius 10500
pub const WORLD_CENTER_X: f64 = 10500.0;
pub const WORLD_CENTER_Y: f64 = 10500.0;
pub const WORLD_RADIUS: f64 = 10500.0;
pub const SPAWN_MARGIN: f64 = 500.0;

// Game loop
pub const TICK_RATE: u64 = 20; // ticks per second
pub const TICK_DURATION_MS: u64 = 1000 / TICK_RATE;

// Snake
pub const SNAKE_NORMAL_SPEED: f64 = 3.0; // px per tick
pub const SNAKE_BOOST_SPEED: f64 = 5.0;
pub const SNAKE_BOOST_COST_TICKS: u32 = 3; // lose 1 segment every N boost ticks
pub const SNAKE_INIT_SEGMENTS: usize = 10;
pub const SNAKE_SEGMENT_SPACING: f64 = 8.0;
pub const SNAKE_HEAD_RADIUS: f64 = 10.0;
pub const SNAKE_BODY_RADIUS: f64 = 8.0;
pub const SNAKE_MIN_SEGMENTS: usize = 3;
pub const SNAKE_BASE_WIDTH: f64 = 10.0;
pub const SNAKE_MAX_WIDTH: f64 = 28.0;
// Max radians per tick at minimum size; longer snakes turn slower:
// max_turn = SNAKE_MAX_TURN_RATE / (1 + segments * SNAKE_TURN_SCALE_FACTOR)
pub const SNAKE_MAX_TURN_RATE: f64 = 0.18;
pub const SNAKE_TURN_SCALE_FACTOR: f64 = 0.008;
pub const SNAKE_WIDTH_GAIN_FACTOR: f64 = 4.0;

// Food
pub const INITIAL_FOOD_COUNT: usize = 12_500;
pub const TARGET_FOOD_COUNT: usize = 12_500;
pub const FOOD_RADIUS: f64 = 5.0;
pub const FOOD_SPAWN_PER_TICK: usize = 100;
pub const DEATH_FOOD_PER_UNIT: usize = 2; // sample every Nth segment on death
pub const DEATH_FOOD_FRACTION: f64 = 0.7; // score sink: not all mass returns
pub const DEATH_FOOD_SCATTER: f64 = 20.0;
pub const BOOST_DROP_PROBABILITY: f64 = 0.5;
pub const CLUSTER_FRACTION: f64 = 0.7; // share of initial food spawned in clusters

// Moving food (rare tier)
pub const MOVING_FOOD_SPAWN_INTERVAL: u64 = 300; // ticks (~15s)
pub const MOVING_FOOD_MAX_COUNT: usize = 3;
pub const MOVING_FOOD_SPEED: f64 = 4.0;
pub const MOVING_FOOD_DIR_MIN_TICKS: u32 = 60;
pub const MOVING_FOOD_DIR_MAX_TICKS: u32 = 120;

// Magnetic food attraction
pub const MAGNET_RADIUS: f64 = 16.0;
pub const MAGNET_SPEED: f64 = 3.0; // px per tick toward the head

// Viewport
pub const VIEWPORT_WIDTH: f64 = 1536.0;
pub const VIEWPORT_HEIGHT: f64 = 864.0;
pub const VIEWPORT_BUFFER: f64 = 200.0;

// Spatial grid
pub const GRID_CELL_SIZE: f64 = 200.0;

// Leaderboard
pub const LEADERBOARD_SIZE: usize = 10;

// Collision
pub const COLLISION_CHECK_RADIUS: f64 = 20.0;

// Minimap
pub const MINIMAP_DIAMETER: f64 = 160.0;

// Bot AI
pub const BOT_COUNT: usize = 50;
pub const BOT_RESPAWN_DELAY: u32 = 100; // ticks (~5s)
pub const BOT_DANGER_RADIUS: f64 = 80.0;
pub const BOT_FOOD_SEEK_RADIUS: f64 = 500.0;
pub const BOT_CHASE_RADIUS: f64 = 300.0;
pub const BOT_FLEE_RADIUS: f64 = 200.0;
pub const BOT_BOUNDARY_BUFFER: f64 = 500.0;
pub const BOT_FLEE_BOOST_TICKS: u32 = 30;
pub const BOT_RUSH_TICKS: u32 = 80; // kill-site rush duration (~4s)
pub const BOT_RUSH_ARRIVE_RADIUS: f64 = 30.0;
pub const BOT_ORBIT_LIMIT: u32 = 8; // non-decreasing ticks before abandoning food
pub const BOT_SEEK_LIMIT: u32 = 60; // max ticks spent on one seek

// Player colors palette
pub const PLAYER_COLORS: &[&str] = &[
    "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6",
    "#1abc9c", "#e67e22", "#e91e63", "#00bcd4", "#8bc34a",
    "#ff5722", "#607d8b", "#795548", "#673ab7", "#03a9f4",
    "#4caf50", "#ffeb3b", "#ff9800", "#f44336", "#9c27b0",
];
