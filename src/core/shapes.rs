//! Polygon, segment, path and obstacle types.

use serde::{Deserialize, Serialize};

use super::point::Point;

/// Minimum absolute polygon area (square pixels) considered drawable
const MIN_AREA: f32 = 1e-3;

/// Closed polygon in device pixel space
///
/// Used for zones, restricted areas, room outlines and carpet runs.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Area {
    /// Vertices in drawing order (closing edge implied)
    pub vertices: Vec<Point>,
}

impl Area {
    /// Create a polygon from vertices
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle spanning two corners
    pub fn rectangle(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }

    /// Signed area (shoelace formula)
    pub fn signed_area(&self) -> f32 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        sum * 0.5
    }

    /// Absolute area in square pixels
    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    /// True for polygons with fewer than three vertices or no area
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
            || self.vertices.iter().any(|p| !p.is_finite())
            || self.area() < MIN_AREA
    }

    /// Bounding box as (min, max)
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = *self.vertices.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.vertices[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    /// Center of the bounding box
    pub fn center(&self) -> Option<Point> {
        let (min, max) = self.bounds()?;
        Some(Point::new((min.x + max.x) * 0.5, (min.y + max.y) * 0.5))
    }

    /// Even-odd point containment test
    pub fn contains(&self, point: Point) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Virtual wall segment
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    /// First endpoint
    pub start: Point,
    /// Second endpoint
    pub end: Point,
}

impl Wall {
    /// Create a wall between two points
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Segment length in pixels
    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }
}

/// Which trajectory a path block describes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// Path actually driven
    Actual,
    /// Planned path to the go-to target
    Predicted,
    /// Path driven with the mop attached
    Mop,
    /// Path driven towards the go-to target
    Goto,
}

impl PathKind {
    /// Name for logging
    pub fn name(&self) -> &'static str {
        match self {
            PathKind::Actual => "path",
            PathKind::Predicted => "predicted_path",
            PathKind::Mop => "mop_path",
            PathKind::Goto => "goto_path",
        }
    }
}

/// Ordered point sequence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Trajectory kind
    pub kind: PathKind,
    /// Points in temporal order
    pub points: Vec<Point>,
}

impl Path {
    /// Empty path of the given kind
    pub fn empty(kind: PathKind) -> Self {
        Self {
            kind,
            points: Vec::new(),
        }
    }

    /// Path with points
    pub fn new(kind: PathKind, points: Vec<Point>) -> Self {
        Self { kind, points }
    }

    /// True when the path has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Obstacle detected by the vacuum
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Location in device pixels
    pub position: Point,
    /// Device-specific obstacle class code
    pub kind: u16,
    /// Detection confidence (0-100)
    pub confidence: u16,
    /// Photo identifier for obstacles that carry a picture
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_id: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_area() {
        let rect = Area::rectangle(0.0, 0.0, 10.0, 5.0);
        assert_eq!(rect.area(), 50.0);
        assert!(!rect.is_degenerate());
        assert_eq!(rect.center(), Some(Point::new(5.0, 2.5)));
    }

    #[test]
    fn test_degenerate_polygons() {
        assert!(Area::new(vec![]).is_degenerate());
        assert!(Area::new(vec![Point::new(1.0, 1.0)]).is_degenerate());
        // Collinear points enclose no area
        let line = Area::new(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 10.0),
        ]);
        assert!(line.is_degenerate());
    }

    #[test]
    fn test_contains() {
        let rect = Area::rectangle(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(5.0, 5.0)));
        assert!(!rect.contains(Point::new(15.0, 5.0)));
        assert!(!Area::new(vec![Point::ZERO]).contains(Point::ZERO));
    }

    #[test]
    fn test_wall_length() {
        let wall = Wall::new(Point::new(0.0, 0.0), Point::new(0.0, 7.0));
        assert_eq!(wall.length(), 7.0);
    }
}
