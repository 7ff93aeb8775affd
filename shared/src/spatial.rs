//! Obstacle geometry and the small interpolation helpers both sides use.

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Static axis-aligned rectangle. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Obstacle {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn get_bounds(&self) -> (f32, f32, f32, f32) {
        (self.x, self.y, self.x + self.w, self.y + self.h)
    }

    /// True if a `size`×`size` box at `(x, y)` strictly overlaps this rectangle.
    pub fn overlaps_box(&self, x: f32, y: f32, size: f32) -> bool {
        rects_overlap((x, y, x + size, y + size), self.get_bounds())
    }
}

/// Strict overlap of two `(min_x, min_y, max_x, max_y)` rectangles.
/// Rectangles that only share an edge do not overlap.
pub fn rects_overlap(a: (f32, f32, f32, f32), b: (f32, f32, f32, f32)) -> bool {
    let (x1, y1, x2, y2) = a;
    let (x3, y3, x4, y4) = b;

    !(x2 <= x3 || x4 <= x1 || y2 <= y3 || y4 <= y1)
}

/// Square playfield plus its static obstacles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaMap {
    pub size: f32,
    pub obstacles: Vec<Obstacle>,
}

impl ArenaMap {
    pub fn new(size: f32, obstacles: Vec<Obstacle>) -> Self {
        Self { size, obstacles }
    }

    /// True if a `size`×`size` box at `(x, y)` leaves the map or touches an obstacle.
    pub fn intersects_obstacle(&self, x: f32, y: f32, size: f32) -> bool {
        if x < 0.0 || x + size > self.size || y < 0.0 || y + size > self.size {
            return true;
        }
        self.hits_obstacle(x, y, size)
    }

    /// Obstacle test without the bounds check. Used by client prediction, which
    /// clamps to the map separately.
    pub fn hits_obstacle(&self, x: f32, y: f32, size: f32) -> bool {
        self.obstacles.iter().any(|o| o.overlaps_box(x, y, size))
    }

    /// Clamps a coordinate so a box of `size` stays on the map.
    pub fn clamp_axis(&self, value: f32, size: f32) -> f32 {
        value.max(0.0).min((self.size - size).max(0.0))
    }
}

pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    (dx * dx + dy * dy).sqrt()
}

pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start * (1.0 - t) + end * t
}

/// Maps any finite angle into `[-PI, PI)`.
pub fn normalize_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Interpolates between two angles along the shortest arc.
pub fn lerp_angle(start: f32, end: f32, t: f32) -> f32 {
    start + normalize_angle(end - start) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f32::consts::PI;

    fn open_map() -> ArenaMap {
        ArenaMap::new(1000.0, vec![Obstacle::new(100.0, 100.0, 50.0, 80.0)])
    }

    #[test]
    fn test_overlap_detection() {
        let map = open_map();
        assert!(map.intersects_obstacle(90.0, 90.0, 20.0));
        assert!(!map.intersects_obstacle(300.0, 300.0, 20.0));
    }

    #[test]
    fn test_edge_touch_is_not_overlap() {
        let map = open_map();
        // Box ends exactly where the obstacle starts.
        assert!(!map.intersects_obstacle(80.0, 120.0, 20.0));
        // Box starts exactly where the obstacle ends.
        assert!(!map.intersects_obstacle(150.0, 120.0, 20.0));
        assert!(!map.intersects_obstacle(120.0, 180.0, 20.0));
    }

    #[test]
    fn test_bounds_count_as_obstacle() {
        let map = open_map();
        assert!(map.intersects_obstacle(-1.0, 500.0, 20.0));
        assert!(map.intersects_obstacle(500.0, 981.0, 20.0));
        assert!(!map.intersects_obstacle(980.0, 980.0, 20.0));
        assert!(!map.hits_obstacle(-1.0, 500.0, 20.0));
    }

    #[test]
    fn test_overlap_symmetric_under_axis_swap() {
        let obstacle = Obstacle::new(100.0, 300.0, 50.0, 120.0);
        let swapped = Obstacle::new(300.0, 100.0, 120.0, 50.0);
        let probes = [
            (90.0, 290.0, 15.0),
            (140.0, 410.0, 20.0),
            (150.0, 300.0, 10.0),
            (60.0, 350.0, 40.0),
            (0.0, 0.0, 500.0),
        ];
        for (x, y, size) in probes {
            assert_eq!(
                obstacle.overlaps_box(x, y, size),
                swapped.overlaps_box(y, x, size)
            );
        }
    }

    #[test]
    fn test_clamp_axis() {
        let map = open_map();
        assert_eq!(map.clamp_axis(-5.0, 40.0), 0.0);
        assert_eq!(map.clamp_axis(990.0, 40.0), 960.0);
        assert_eq!(map.clamp_axis(500.0, 40.0), 500.0);
    }

    #[test]
    fn test_lerp() {
        assert_approx_eq!(lerp(0.0, 10.0, 0.2), 2.0);
        assert_approx_eq!(lerp(10.0, 10.0, 0.7), 10.0);
    }

    #[test]
    fn test_lerp_angle_wraps_shortest_path() {
        // From just below +PI to just above -PI should move forward through PI.
        let start = PI - 0.1;
        let end = -PI + 0.1;
        let halfway = lerp_angle(start, end, 0.5);
        assert_approx_eq!(halfway, PI, 1e-4);

        let back = lerp_angle(end, start, 0.5);
        assert_approx_eq!(back, -PI, 1e-4);
    }

    #[test]
    fn test_lerp_angle_huge_inputs_terminate() {
        for (start, end) in [(0.0, 1.0e30), (-3.0e20, 2.0), (1.4e8, -1.4e8), (f32::MAX, 0.0)] {
            let angle = lerp_angle(start, end, 0.2);
            assert!(angle.is_finite(), "lerp_angle({}, {}) = {}", start, end, angle);
        }
    }

    #[test]
    fn test_normalize_angle_range() {
        for angle in [0.0, PI, -PI, 7.0, -7.0, 1.0e30, -1.0e30] {
            let n = normalize_angle(angle);
            assert!((-PI..=PI).contains(&n), "normalize_angle({}) = {}", angle, n);
        }
        assert_approx_eq!(normalize_angle(2.0 * PI + 0.5), 0.5, 1e-5);
        assert_approx_eq!(normalize_angle(-0.5), -0.5);
    }

    #[test]
    fn test_lerp_angle_plain() {
        assert_approx_eq!(lerp_angle(0.0, 1.0, 0.5), 0.5);
    }

    #[test]
    fn test_distance() {
        assert_approx_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
    }
}
