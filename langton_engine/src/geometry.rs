//! Plane geometry shared by the rule editor and its layout.

use serde::{Deserialize, Serialize};

/// A position on the editor canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    pub fn distance_squared(self, other: Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn distance(self, other: Point) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Width and height of a drawing surface, as reported by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Viewport {
        Viewport { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Whether `point` lies within `tolerance` of the segment from `start` to `end`.
///
/// The projection is clamped to the segment, and distances are compared squared.
pub fn is_point_on_segment(point: Point, start: Point, end: Point, tolerance: f64) -> bool {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_squared = dx * dx + dy * dy;

    // Degenerate segment, i.e. a single point
    if length_squared == 0.0 {
        return point.distance(start) < tolerance;
    }

    let t = (((point.x - start.x) * dx + (point.y - start.y) * dy) / length_squared).clamp(0.0, 1.0);
    let closest = Point::new(start.x + t * dx, start.y + t * dy);

    point.distance_squared(closest) < tolerance * tolerance
}

/// Whether `point` lies within `tolerance` of the circle of `radius` around `center`.
pub fn is_point_on_circle(point: Point, center: Point, radius: f64, tolerance: f64) -> bool {
    (point.distance(center) - radius).abs() < tolerance
}
