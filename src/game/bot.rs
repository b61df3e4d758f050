use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::*;
use crate::game::food::Food;
use crate::game::physics;
use crate::game::snake::{random_color, Snake};
use crate::game::world::World;

/// Multilingual pool of snake/warrior themed bot names.
const BOT_NAMES: &[&str] = &[
    // Vietnamese
    "Rắn Thần", "Sấm Sét", "Bão Tố", "Tia Chớp", "Ma Tốc Độ",
    "Rồng Lửa", "Bóng Đêm", "Sát Thủ", "Độc Xà", "Vua Rắn",
    "Hắc Mamba", "Kim Xà", "Thanh Xà", "Bạch Xà", "Thần Xà",
    "Hỏa Long", "Băng Xà", "Quỷ Xà", "Điện Xà", "Lôi Thần",
    // English
    "Viper", "Cobra", "Mamba", "Python", "Anaconda",
    "Sidewinder", "Rattlesnake", "Phantom", "Shadow", "Blaze",
    "Frostbite", "Venom", "Reaper", "Striker", "Apex",
    "Cyclone", "Tempest", "Havoc", "Wraith", "Spectre",
    // Japanese
    "蛇神", "雷蛇", "龍王", "鬼蛇", "忍者",
    "侍", "影", "嵐", "炎蛇", "氷龍",
    // Korean
    "독사왕", "번개뱀", "용의발톱", "그림자", "폭풍",
    "흑사", "천둥", "불뱀", "얼음독", "광전사",
    // Chinese
    "毒蛇王", "雷电蛇", "火龙", "冰蟒", "暗影",
    "狂蛇", "风暴", "霸蛇", "鬼火", "战神",
    // Spanish
    "Serpiente", "Víbora", "Trueno", "Tormenta", "Fuego",
    "Sombra", "Veneno", "Relámpago", "Fantasma", "Dragón",
    // Russian
    "Гадюка", "Кобра", "Гром", "Буря", "Тень",
    "Пламя", "Мороз", "Ужас", "Змей", "Дракон",
    // Arabic
    "الأفعى", "البرق", "العاصفة", "الظل", "النار",
    // Thai
    "พญานาค", "สายฟ้า", "มังกร", "เงา", "พิษ",
    // Hindi
    "नागराज", "बिजली", "तूफान", "अग्नि", "विष",
    // Portuguese
    "Serpente", "Raio", "Tempestade", "Sombra Real", "Peçonha",
    // French
    "Vipère", "Éclair", "Tonnerre", "Ombre", "Flamme",
    // German
    "Schlange", "Blitz", "Donner", "Schatten", "Feuer",
];

/// A bot's steering output for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steer {
    pub angle: f64,
    pub boost: bool,
}

#[derive(Debug, Clone, Copy)]
struct RushTarget {
    x: f64,
    y: f64,
    ticks_left: u32,
}

/// Per-bot controller state. The organism itself lives in the World; this
/// struct only carries the decision bookkeeping between ticks.
#[derive(Debug)]
struct Bot {
    wander_ticks: i32,
    target_angle: f64,
    boost_ticks: u32,
    respawn_in: u32,
    seek_ticks: u32,
    last_score: u32,
    last_food_dist: f64,
    orbit_count: u32,
    rush: Option<RushTarget>,
}

impl Bot {
    fn new(heading: f64) -> Self {
        Bot {
            wander_ticks: random_wander_duration(),
            target_angle: heading,
            boost_ticks: 0,
            respawn_in: 0,
            seek_ticks: 0,
            last_score: 0,
            last_food_dist: 0.0,
            orbit_count: 0,
            rush: None,
        }
    }

    /// Evaluate the priority chain top to bottom; the first satisfied rule
    /// wins. Roam is the fallback.
    fn decide(&mut self, snake: &Snake, world: &World) -> Steer {
        if let Some(s) = self.rule_avoid_boundary(snake) {
            return s;
        }
        if let Some(s) = self.rule_avoid_danger(snake, world) {
            return s;
        }
        if let Some(s) = self.rule_flee(snake, world) {
            return s;
        }
        // A flee boost started on an earlier tick keeps burning while lower
        // priority rules run.
        let carry = self.tick_lingering_boost();
        if let Some(s) = self.rule_chase(snake, world, carry) {
            return s;
        }
        if let Some(s) = self.rule_rush_kill_site(snake, carry) {
            return s;
        }
        if let Some(s) = self.rule_seek_food(snake, world, carry) {
            return s;
        }
        self.roam(snake, carry)
    }

    /// Priority 1: too close to the world edge; steer straight at the
    /// center.
    fn rule_avoid_boundary(&mut self, snake: &Snake) -> Option<Steer> {
        let head = snake.head();
        let dist = physics::distance(head.x, head.y, WORLD_CENTER_X, WORLD_CENTER_Y);
        if dist <= WORLD_RADIUS - BOT_BOUNDARY_BUFFER {
            return None;
        }
        self.target_angle = (WORLD_CENTER_Y - head.y).atan2(WORLD_CENTER_X - head.x);
        self.wander_ticks = random_wander_duration();
        Some(Steer {
            angle: self.target_angle,
            boost: false,
        })
    }

    /// Priority 2: another snake's body directly ahead; turn 90° away,
    /// direction chosen by which side the obstacle is on.
    fn rule_avoid_danger(&mut self, snake: &Snake, world: &World) -> Option<Steer> {
        let head = snake.head();
        for hit in world
            .grid
            .nearby_snake_body(head.x, head.y, BOT_DANGER_RADIUS, snake.id)
        {
            let seg_angle = (hit.y - head.y).atan2(hit.x - head.x);
            let diff = physics::normalize_angle(seg_angle - snake.angle);
            if diff.abs() < PI / 4.0 {
                self.target_angle = if diff >= 0.0 {
                    snake.angle - PI / 2.0
                } else {
                    snake.angle + PI / 2.0
                };
                self.wander_ticks = random_wander_duration();
                return Some(Steer {
                    angle: self.target_angle,
                    boost: false,
                });
            }
        }
        None
    }

    /// Priority 3: a bigger snake's head nearby; run directly away and
    /// start a boost burst.
    fn rule_flee(&mut self, snake: &Snake, world: &World) -> Option<Steer> {
        let head = snake.head();
        for other in world.snakes.values() {
            if other.id == snake.id || !other.alive || other.score <= snake.score {
                continue;
            }
            let other_head = other.head();
            if head.distance_to(other_head) >= BOT_FLEE_RADIUS {
                continue;
            }
            self.target_angle = (head.y - other_head.y).atan2(head.x - other_head.x);
            self.boost_ticks = BOT_FLEE_BOOST_TICKS;
            self.wander_ticks = random_wander_duration();
            let boost = self.tick_lingering_boost();
            return Some(Steer {
                angle: self.target_angle,
                boost,
            });
        }
        None
    }

    fn tick_lingering_boost(&mut self) -> bool {
        if self.boost_ticks > 0 {
            self.boost_ticks -= 1;
            true
        } else {
            false
        }
    }

    /// Priority 4: a smaller snake's head nearby; steer at it, boosting
    /// only when the bot can afford to lose length.
    fn rule_chase(&mut self, snake: &Snake, world: &World, carry_boost: bool) -> Option<Steer> {
        let head = snake.head();
        for other in world.snakes.values() {
            if other.id == snake.id || !other.alive || other.score >= snake.score {
                continue;
            }
            let other_head = other.head();
            if head.distance_to(other_head) >= BOT_CHASE_RADIUS {
                continue;
            }
            self.target_angle = (other_head.y - head.y).atan2(other_head.x - head.x);
            self.wander_ticks = random_wander_duration();
            return Some(Steer {
                angle: self.target_angle,
                boost: carry_boost || can_afford_boost(snake),
            });
        }
        None
    }

    /// Priority 5: recently killed someone; rush to the victim's last head
    /// position for a bounded number of ticks.
    fn rule_rush_kill_site(&mut self, snake: &Snake, carry_boost: bool) -> Option<Steer> {
        let rush = self.rush.as_mut()?;
        rush.ticks_left = rush.ticks_left.saturating_sub(1);
        let expired = rush.ticks_left == 0;
        let head = snake.head();
        let target = (rush.x, rush.y);
        if physics::distance(head.x, head.y, target.0, target.1) < BOT_RUSH_ARRIVE_RADIUS {
            // Arrived; normal food seeking takes over
            self.rush = None;
            return None;
        }
        self.target_angle = (target.1 - head.y).atan2(target.0 - head.x);
        if expired {
            self.rush = None;
        }
        Some(Steer {
            angle: self.target_angle,
            boost: carry_boost || can_afford_boost(snake),
        })
    }

    /// Priority 6: steer at the nearest food ahead (±90°), with orbit
    /// detection; if the distance to the target stalls for a run of ticks
    /// the bot is circling it and breaks out with a hard random turn.
    fn rule_seek_food(&mut self, snake: &Snake, world: &World, carry_boost: bool) -> Option<Steer> {
        // Eating something resets the seek bookkeeping
        if snake.score > self.last_score {
            self.seek_ticks = 0;
            self.orbit_count = 0;
            self.last_food_dist = 0.0;
        }
        self.last_score = snake.score;

        let head = snake.head();
        if self.seek_ticks < BOT_SEEK_LIMIT {
            let near = world
                .grid
                .nearby_food(head.x, head.y, BOT_FOOD_SEEK_RADIUS);
            let mut best: Option<(f64, f64, f64)> = None; // (dist, x, y)
            for id in near {
                let Some(food) = world.food.get(&id) else {
                    continue;
                };
                let d = physics::distance(head.x, head.y, food.x, food.y);
                let food_angle = (food.y - head.y).atan2(food.x - head.x);
                // Food behind us is ignored entirely; chasing it causes orbits
                if physics::normalize_angle(food_angle - snake.angle).abs() > PI / 2.0 {
                    continue;
                }
                if best.is_none_or(|(bd, _, _)| d < bd) {
                    best = Some((d, food.x, food.y));
                }
            }
            if let Some((dist, fx, fy)) = best {
                if self.last_food_dist > 0.0 && dist >= self.last_food_dist - 1.0 {
                    self.orbit_count += 1;
                } else {
                    self.orbit_count = 0;
                }
                self.last_food_dist = dist;

                if self.orbit_count >= BOT_ORBIT_LIMIT {
                    return Some(self.escape_turn(snake));
                }

                self.target_angle = (fy - head.y).atan2(fx - head.x);
                self.seek_ticks += 1;
                return Some(Steer {
                    angle: self.target_angle,
                    boost: carry_boost,
                });
            }
        }
        if self.seek_ticks >= BOT_SEEK_LIMIT {
            return Some(self.escape_turn(snake));
        }
        None
    }

    /// Abandon the current food target: reset seek state and force a turn of
    /// at least 90° off the current heading.
    fn escape_turn(&mut self, snake: &Snake) -> Steer {
        let mut rng = rand::thread_rng();
        self.orbit_count = 0;
        self.seek_ticks = 0;
        self.last_food_dist = 0.0;
        self.target_angle = snake.angle + PI / 2.0 + rng.gen::<f64>() * PI;
        self.wander_ticks = 30 + rng.gen_range(0..40);
        Steer {
            angle: self.target_angle,
            boost: false,
        }
    }

    /// Priority 7 (fallback): wander toward a uniformly random in-world
    /// destination, re-picked every 40-100 ticks.
    fn roam(&mut self, snake: &Snake, carry_boost: bool) -> Steer {
        if self.wander_ticks <= 0 {
            let head = snake.head();
            let (tx, ty) = physics::random_circle_point(
                WORLD_CENTER_X,
                WORLD_CENTER_Y,
                WORLD_RADIUS - BOT_BOUNDARY_BUFFER,
            );
            self.target_angle = (ty - head.y).atan2(tx - head.x);
            self.wander_ticks = 40 + rand::thread_rng().gen_range(0..60);
        }
        self.wander_ticks -= 1;
        Steer {
            angle: self.target_angle,
            boost: carry_boost,
        }
    }
}

/// Boosting costs length; only worth it with some slack above the floor.
fn can_afford_boost(snake: &Snake) -> bool {
    snake.len() > SNAKE_MIN_SEGMENTS + 5
}

fn random_wander_duration() -> i32 {
    rand::thread_rng().gen_range(60..=120)
}

/// Drives the fixed population of autonomous snakes: one decision per live
/// bot per tick, respawn countdowns, and name bookkeeping.
pub struct BotManager {
    bots: HashMap<u64, Bot>,
    used_names: HashSet<String>,
}

impl BotManager {
    pub fn new() -> Self {
        BotManager {
            bots: HashMap::new(),
            used_names: HashSet::new(),
        }
    }

    pub fn spawn_initial(&mut self, world: &mut World) {
        for _ in 0..BOT_COUNT {
            self.spawn_bot(world);
        }
    }

    fn spawn_bot(&mut self, world: &mut World) {
        let id = world.next_id();
        let name = self.pick_name();
        let snake = Snake::spawn(id, name, random_color());
        self.bots.insert(id, Bot::new(snake.angle));
        world.add_snake(snake);
    }

    /// Run every live bot for one tick: decide, apply the input, move.
    /// Returns the ids of bots whose new head crossed the boundary.
    pub fn update(&mut self, world: &mut World) -> Vec<u64> {
        let mut boundary_deaths = Vec::new();
        let ids: Vec<u64> = self.bots.keys().copied().collect();
        for id in ids {
            let steer = {
                let Some(snake) = world.snakes.get(&id) else {
                    continue;
                };
                if !snake.alive {
                    continue;
                }
                let bot = self.bots.get_mut(&id).expect("bot state exists");
                bot.decide(snake, world)
            };

            let mut drop = None;
            if let Some(snake) = world.snakes.get_mut(&id) {
                drop = snake
                    .apply_input(steer.angle, steer.boost)
                    .map(|p| (p, snake.color.clone()));
                if snake.advance() {
                    boundary_deaths.push(id);
                }
            }
            if let Some((at, color)) = drop {
                let fid = world.next_id();
                world.insert_food(Food::boost_drop(fid, at, color));
            }
        }
        boundary_deaths
    }

    /// Called once per tick with this tick's deaths: killer bots get a rush
    /// target at the victim's last head position, dead bots start their
    /// respawn countdown.
    pub fn handle_deaths(&mut self, deaths: &HashMap<u64, String>, world: &World) {
        for (victim_id, killer_name) in deaths {
            let Some(victim) = world.snakes.get(victim_id) else {
                continue;
            };
            let head = victim.head();
            for (bot_id, bot) in self.bots.iter_mut() {
                let Some(killer) = world.snakes.get(bot_id) else {
                    continue;
                };
                if !killer.alive || killer.name != *killer_name {
                    continue;
                }
                bot.rush = Some(RushTarget {
                    x: head.x,
                    y: head.y,
                    ticks_left: BOT_RUSH_TICKS,
                });
                break;
            }
        }

        for (bot_id, bot) in self.bots.iter_mut() {
            let dead = world.snakes.get(bot_id).is_none_or(|s| !s.alive);
            if dead && bot.respawn_in == 0 {
                bot.respawn_in = BOT_RESPAWN_DELAY;
            }
        }
    }

    /// Tick respawn countdowns, replace bots whose countdown elapsed, and
    /// top the population back up to BOT_COUNT.
    pub fn maintain_population(&mut self, world: &mut World) {
        let mut to_respawn = Vec::new();
        for (id, bot) in self.bots.iter_mut() {
            if bot.respawn_in == 0 {
                continue;
            }
            bot.respawn_in -= 1;
            if bot.respawn_in == 0 {
                to_respawn.push(*id);
            }
        }
        for old_id in to_respawn {
            if let Some(snake) = world.snakes.get(&old_id) {
                self.used_names.remove(&snake.name);
            }
            world.remove_snake(old_id);
            self.bots.remove(&old_id);
            self.spawn_bot(world);
        }

        if self.bots.len() < BOT_COUNT {
            self.spawn_bot(world);
        }
    }

    pub fn population(&self) -> usize {
        self.bots.len()
    }

    /// Random unused name from the pool; once exhausted, a numeric suffix
    /// keeps names unique.
    fn pick_name(&mut self) -> String {
        let mut rng = rand::thread_rng();
        let mut order: Vec<usize> = (0..BOT_NAMES.len()).collect();
        order.shuffle(&mut rng);
        for i in order {
            if !self.used_names.contains(BOT_NAMES[i]) {
                self.used_names.insert(BOT_NAMES[i].to_string());
                return BOT_NAMES[i].to_string();
            }
        }
        let base = BOT_NAMES[rng.gen_range(0..BOT_NAMES.len())];
        let mut n = 2u32;
        loop {
            let candidate = format!("{base} {n}");
            if !self.used_names.contains(&candidate) {
                self.used_names.insert(candidate.clone());
                return candidate;
            }
            n += 1;
        }
    }
}

impl Default for BotManager {
    fn default() -> Self {
        Self::new()
    }
}
