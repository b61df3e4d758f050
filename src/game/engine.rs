use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::{interval, Duration};
use tracing::info;

use crate::config::*;
use crate::game::bot::BotManager;
use crate::game::food::Food;
use crate::game::world::World;
use crate::protocol::messages::{LeaderboardEntry, MinimapTrace, ServerMessage};
use crate::server::conn::ConnManager;

pub type SharedWorld = Arc<RwLock<World>>;

pub fn create_world() -> SharedWorld {
    Arc::new(RwLock::new(World::new()))
}

/// The fixed-timestep simulation driver: sole writer of the world. Each tick
/// runs the full mutating phase under the exclusive lock, then broadcasts
/// under shared access, so no client ever observes a torn mid-tick state.
pub struct GameLoop {
    world: SharedWorld,
    conns: Arc<ConnManager>,
    bots: BotManager,
    tick_count: u64,
}

impl GameLoop {
    pub fn new(world: SharedWorld, conns: Arc<ConnManager>) -> Self {
        GameLoop {
            world,
            conns,
            bots: BotManager::new(),
            tick_count: 0,
        }
    }

    pub async fn run(mut self) {
        {
            let mut w = self.world.write().await;
            self.bots.spawn_initial(&mut w);
        }
        info!(tick_rate = TICK_RATE, bots = BOT_COUNT, "game loop started");

        let mut ticker = interval(Duration::from_millis(TICK_DURATION_MS));
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// One discrete simulation step. Order matters: moving food, bot
    /// decisions + movement, player input + movement, index rebuild,
    /// collisions, boundary-death merge, death processing, magnet +
    /// consumption, spawns, replenishment; then bot population upkeep and
    /// broadcast outside the mutating phase.
    async fn tick(&mut self) {
        self.tick_count += 1;

        let (leaderboard, minimap, kill_map) = {
            let mut w = self.world.write().await;

            w.update_moving_food();

            let mut boundary_deaths = self.bots.update(&mut w);
            self.move_players(&mut w, &mut boundary_deaths);

            w.rebuild_grid();

            let mut deaths = w.detect_collisions();
            for id in boundary_deaths {
                deaths.entry(id).or_insert_with(|| "Boundary".to_string());
            }

            let mut kill_map: HashMap<u64, (String, u32)> = HashMap::new();
            for (victim_id, killer_name) in &deaths {
                let (name, score) = match w.snakes.get(victim_id) {
                    Some(s) if s.alive => (s.name.clone(), s.score),
                    _ => continue,
                };
                let dropped = w.convert_to_food(*victim_id);
                kill_map.insert(*victim_id, (killer_name.clone(), score));
                info!(victim = %name, killer = %killer_name, dropped, "snake died");
            }

            self.bots.handle_deaths(&deaths, &w);

            w.apply_food_magnet();
            w.collect_food();

            if self.tick_count % MOVING_FOOD_SPAWN_INTERVAL == 0 {
                w.maybe_spawn_moving_food();
            }
            w.maintain_food_count();

            (w.leaderboard(), w.minimap(), kill_map)
        };

        // Respawn countdowns and replacements need only a short fresh lock
        {
            let mut w = self.world.write().await;
            self.bots.maintain_population(&mut w);
        }

        self.broadcast(&leaderboard, &minimap).await;

        for (victim_id, (killer, score)) in kill_map {
            if let Some(conn) = self.conns.get(victim_id) {
                conn.send(&ServerMessage::Death { killer, score });
            }
        }
    }

    /// Apply each connection's buffered input and move its snake, noting
    /// boundary crossings.
    fn move_players(&self, w: &mut World, boundary_deaths: &mut Vec<u64>) {
        for conn in self.conns.snapshot() {
            let input = conn.input();
            let mut drop = None;
            let crossed = match w.snakes.get_mut(&conn.id) {
                Some(snake) if snake.alive => {
                    drop = snake
                        .apply_input(input.angle, input.boost)
                        .map(|p| (p, snake.color.clone()));
                    snake.advance()
                }
                _ => continue,
            };
            if crossed {
                boundary_deaths.push(conn.id);
            }
            if let Some((at, color)) = drop {
                let fid = w.next_id();
                w.insert_food(Food::boost_drop(fid, at, color));
            }
        }
    }

    /// Viewport-culled state to every connection; clients without a live
    /// snake still get the global leaderboard.
    async fn broadcast(&self, leaderboard: &[LeaderboardEntry], minimap: &[MinimapTrace]) {
        let w = self.world.read().await;
        for conn in self.conns.snapshot() {
            let center = w
                .snakes
                .get(&conn.id)
                .filter(|s| s.alive)
                .map(|s| s.head());
            let msg = match center {
                Some(head) => ServerMessage::State {
                    snakes: w.snakes_in_viewport(head.x, head.y),
                    food: w.food_in_viewport(head.x, head.y),
                    leaderboard: leaderboard.to_vec(),
                    minimap: minimap.to_vec(),
                },
                None => ServerMessage::State {
                    snakes: Vec::new(),
                    food: Vec::new(),
                    leaderboard: leaderboard.to_vec(),
                    minimap: Vec::new(),
                },
            };
            conn.send(&msg);
        }
    }
}
