//! Pixel ↔ millimetre calibration.

use serde::{Deserialize, Serialize};

use crate::core::Point;
use crate::error::DecodeError;

/// Axis-aligned affine mapping between device pixels and millimetres
///
/// `mm = scale * pixel + offset`, independently per axis. A negative scale
/// flips the axis (the device Y axis points up while bitmap rows go down).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Millimetres per pixel along X
    pub scale_x: f32,
    /// Millimetre offset along X
    pub offset_x: f32,
    /// Millimetres per pixel along Y
    pub scale_y: f32,
    /// Millimetre offset along Y
    pub offset_y: f32,
}

impl Calibration {
    /// Build the mapping from two reference pairs `(pixel, mm)`.
    ///
    /// Fails when the two pixel references share an X or Y coordinate.
    pub fn from_reference_points(
        pixel_a: Point,
        mm_a: Point,
        pixel_b: Point,
        mm_b: Point,
    ) -> Result<Self, DecodeError> {
        let dx = pixel_b.x - pixel_a.x;
        let dy = pixel_b.y - pixel_a.y;
        if dx.abs() < f32::EPSILON || dy.abs() < f32::EPSILON {
            return Err(DecodeError::DegenerateCalibration);
        }

        let scale_x = (mm_b.x - mm_a.x) / dx;
        let scale_y = (mm_b.y - mm_a.y) / dy;
        if scale_x.abs() < f32::EPSILON || scale_y.abs() < f32::EPSILON {
            return Err(DecodeError::DegenerateCalibration);
        }

        Ok(Self {
            scale_x,
            offset_x: mm_a.x - scale_x * pixel_a.x,
            scale_y,
            offset_y: mm_a.y - scale_y * pixel_a.y,
        })
    }

    /// Identity mapping (1 mm per pixel)
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            offset_x: 0.0,
            scale_y: 1.0,
            offset_y: 0.0,
        }
    }

    /// Convert device pixels to millimetres
    #[inline]
    pub fn to_mm(&self, pixel: Point) -> Point {
        Point::new(
            self.scale_x * pixel.x + self.offset_x,
            self.scale_y * pixel.y + self.offset_y,
        )
    }

    /// Convert millimetres to device pixels
    #[inline]
    pub fn to_pixel(&self, mm: Point) -> Point {
        Point::new(
            (mm.x - self.offset_x) / self.scale_x,
            (mm.y - self.offset_y) / self.scale_y,
        )
    }
}

/// One reference pair published to map card integrations
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    /// Real-world position (millimetres)
    pub vacuum: Point,
    /// Position in the rendered image (pixels)
    pub map: Point,
}
