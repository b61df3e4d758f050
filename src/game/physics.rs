use std::f64::consts::PI;

use rand::Rng;

use crate::config::*;

/// A 2D world coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        distance(self.x, self.y, other.x, other.y)
    }
}

pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt()
}

pub fn distance_sq(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    (x2 - x1).powi(2) + (y2 - y1).powi(2)
}

/// Wrap an angle into (-π, π].
pub fn normalize_angle(mut a: f64) -> f64 {
    while a > PI {
        a -= 2.0 * PI;
    }
    while a <= -PI {
        a += 2.0 * PI;
    }
    a
}

/// Uniformly random point inside a circle. Polar sampling with sqrt(r)
/// keeps the area density uniform.
pub fn random_circle_point(cx: f64, cy: f64, radius: f64) -> (f64, f64) {
    let mut rng = rand::thread_rng();
    let r = radius * rng.gen::<f64>().sqrt();
    let angle = rng.gen::<f64>() * 2.0 * PI;
    (cx + r * angle.cos(), cy + r * angle.sin())
}

/// Move a point back inside the circle if it lies outside, projecting onto
/// the boundary with a 1px margin.
pub fn clamp_to_circle(x: f64, y: f64, cx: f64, cy: f64, radius: f64) -> (f64, f64) {
    let dx = x - cx;
    let dy = y - cy;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist <= radius {
        return (x, y);
    }
    let scale = (radius - 1.0) / dist;
    (cx + dx * scale, cy + dy * scale)
}

pub fn inside_world(x: f64, y: f64) -> bool {
    distance_sq(x, y, WORLD_CENTER_X, WORLD_CENTER_Y) <= WORLD_RADIUS * WORLD_RADIUS
}

/// Round to 1 decimal place; coordinates on the wire carry no more precision.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
