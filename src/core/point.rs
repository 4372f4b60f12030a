//! Point types and fixed-point coordinate conversion.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Fixed-point shift amount (Q16.16 format)
pub const FIXED_POINT_SHIFT: u32 = 16;
const FIXED_POINT_SCALE: f32 = (1u32 << FIXED_POINT_SHIFT) as f32;

/// Convert a Q16.16 fixed-point value to device pixel units.
#[inline]
pub fn from_fixed_point(fp: i32) -> f32 {
    fp as f32 / FIXED_POINT_SCALE
}

/// Convert device pixel units to Q16.16 fixed-point.
#[inline]
pub fn to_fixed_point(value: f32) -> i32 {
    (value * FIXED_POINT_SCALE).round() as i32
}

/// A point in device pixel space
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (columns, increasing right)
    pub x: f32,
    /// Y coordinate (rows, increasing down)
    pub y: f32,
}

impl Point {
    /// Create a new point
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero point (origin)
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Build a point from raw Q16.16 coordinates
    #[inline]
    pub fn from_fixed(x: i32, y: i32) -> Self {
        Self::new(from_fixed_point(x), from_fixed_point(y))
    }

    /// Raw Q16.16 coordinates of this point
    #[inline]
    pub fn to_fixed(&self) -> (i32, i32) {
        (to_fixed_point(self.x), to_fixed_point(self.y))
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Translate by an offset
    #[inline]
    pub fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// True when both coordinates are finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// A point with an optional heading, used for the vacuum pose
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Location in device pixels
    #[serde(flatten)]
    pub point: Point,
    /// Heading in degrees, when the device reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
}

impl Position {
    /// Position without heading
    pub fn new(point: Point) -> Self {
        Self { point, angle: None }
    }

    /// Position with heading in degrees
    pub fn with_angle(point: Point, angle: f32) -> Self {
        Self {
            point,
            angle: Some(angle),
        }
    }
}
