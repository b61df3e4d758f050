use std::collections::{HashMap, HashSet};

use crate::config::GRID_CELL_SIZE;
use crate::game::food::Food;
use crate::game::snake::Snake;

/// What a grid cell entry points at: a food item or one snake body segment.
#[derive(Debug, Clone, Copy)]
enum EntryKind {
    Food(u64),
    Body { snake_id: u64, seg_idx: usize },
}

#[derive(Debug, Clone, Copy)]
struct GridEntry {
    kind: EntryKind,
    x: f64,
    y: f64,
}

/// A body segment returned from a radius query.
#[derive(Debug, Clone, Copy)]
pub struct BodyHit {
    pub snake_id: u64,
    pub seg_idx: usize,
    pub x: f64,
    pub y: f64,
}

/// Uniform hash grid for proximity queries. Rebuilt from scratch every tick
/// after movement; entries are an ephemeral view of the world, never owned
/// state. Queries scan only the cells overlapping the bounding box of the
/// radius/rect and filter by exact squared distance, so there are no false
/// negatives and no false positives in the results.
#[derive(Debug)]
pub struct SpatialGrid {
    cells: HashMap<(i32, i32), Vec<GridEntry>>,
    cell_size: f64,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        SpatialGrid {
            cells: HashMap::new(),
            cell_size,
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    fn key_for(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert_food(&mut self, food: &Food) {
        let key = self.key_for(food.x, food.y);
        self.cells.entry(key).or_default().push(GridEntry {
            kind: EntryKind::Food(food.id),
            x: food.x,
            y: food.y,
        });
    }

    /// Insert every non-head segment of a snake. The head is never indexed;
    /// head collisions are checked pairwise by the loop.
    pub fn insert_snake_body(&mut self, snake: &Snake) {
        for (i, seg) in snake.segments.iter().enumerate().skip(1) {
            let key = self.key_for(seg.x, seg.y);
            self.cells.entry(key).or_default().push(GridEntry {
                kind: EntryKind::Body {
                    snake_id: snake.id,
                    seg_idx: i,
                },
                x: seg.x,
                y: seg.y,
            });
        }
    }

    fn cell_range(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> (i32, i32, i32, i32) {
        (
            (min_x / self.cell_size).floor() as i32,
            (min_y / self.cell_size).floor() as i32,
            (max_x / self.cell_size).floor() as i32,
            (max_y / self.cell_size).floor() as i32,
        )
    }

    /// Food ids within `radius` of (x, y).
    pub fn nearby_food(&self, x: f64, y: f64, radius: f64) -> Vec<u64> {
        let (min_cx, min_cy, max_cx, max_cy) =
            self.cell_range(x - radius, y - radius, x + radius, y + radius);
        let r2 = radius * radius;
        let mut results = Vec::new();
        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                let Some(entries) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for e in entries {
                    if let EntryKind::Food(id) = e.kind {
                        let dx = e.x - x;
                        let dy = e.y - y;
                        if dx * dx + dy * dy <= r2 {
                            results.push(id);
                        }
                    }
                }
            }
        }
        results
    }

    /// Body segments within `radius` of (x, y), excluding those owned by
    /// `exclude_id`.
    pub fn nearby_snake_body(&self, x: f64, y: f64, radius: f64, exclude_id: u64) -> Vec<BodyHit> {
        let (min_cx, min_cy, max_cx, max_cy) =
            self.cell_range(x - radius, y - radius, x + radius, y + radius);
        let r2 = radius * radius;
        let mut results = Vec::new();
        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                let Some(entries) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for e in entries {
                    if let EntryKind::Body { snake_id, seg_idx } = e.kind {
                        if snake_id == exclude_id {
                            continue;
                        }
                        let dx = e.x - x;
                        let dy = e.y - y;
                        if dx * dx + dy * dy <= r2 {
                            results.push(BodyHit {
                                snake_id,
                                seg_idx,
                                x: e.x,
                                y: e.y,
                            });
                        }
                    }
                }
            }
        }
        results
    }

    /// Food ids overlapping the rectangle, deduplicated.
    pub fn food_in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<u64> {
        let (min_cx, min_cy, max_cx, max_cy) = self.cell_range(min_x, min_y, max_x, max_y);
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                let Some(entries) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for e in entries {
                    if let EntryKind::Food(id) = e.kind {
                        if e.x >= min_x
                            && e.x <= max_x
                            && e.y >= min_y
                            && e.y <= max_y
                            && seen.insert(id)
                        {
                            results.push(id);
                        }
                    }
                }
            }
        }
        results
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(GRID_CELL_SIZE)
    }
}
