//! Scale / rotate / trim transform applied to the rendered canvas.

use serde::{Deserialize, Serialize};

use crate::core::Point;
use crate::error::ConfigError;

use super::defaults;
use super::overrides::OverrideValue;

/// Largest accepted scale factor
pub const MAX_SCALE: f32 = 64.0;

/// Counter-clockwise rotation in quarter turns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    /// No rotation
    #[default]
    Deg0,
    /// 90° counter-clockwise
    Deg90,
    /// Half turn
    Deg180,
    /// 270° counter-clockwise (90° clockwise)
    Deg270,
}

impl Rotation {
    /// Rotation for a degree value
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Degrees counter-clockwise
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// True when width and height swap
    #[inline]
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Dimensions after rotating a `width` × `height` canvas
    #[inline]
    pub fn rotated_dims(&self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_axes() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Map a point on a `width` × `height` canvas through the rotation
    pub fn map_point(&self, p: Point, width: f32, height: f32) -> Point {
        match self {
            Rotation::Deg0 => p,
            Rotation::Deg90 => Point::new(p.y, width - p.x),
            Rotation::Deg180 => Point::new(width - p.x, height - p.y),
            Rotation::Deg270 => Point::new(height - p.y, p.x),
        }
    }

    fn parse(key: &str, value: &OverrideValue) -> Result<Self, ConfigError> {
        let degrees = value.as_f64(key)?;
        if degrees.fract() != 0.0 || !(0.0..=270.0).contains(&degrees) {
            return Err(ConfigError::invalid(key, "rotation must be 0, 90, 180 or 270"));
        }
        Rotation::from_degrees(degrees as u16)
            .ok_or_else(|| ConfigError::invalid(key, "rotation must be 0, 90, 180 or 270"))
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
            .ok_or_else(|| format!("rotation must be 0, 90, 180 or 270, got {degrees}"))
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Per-edge crop, in percent of the post-rotation dimension
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trim {
    /// Percent removed from the left edge
    #[serde(default)]
    pub left: f32,
    /// Percent removed from the right edge
    #[serde(default)]
    pub right: f32,
    /// Percent removed from the top edge
    #[serde(default)]
    pub top: f32,
    /// Percent removed from the bottom edge
    #[serde(default)]
    pub bottom: f32,
}

/// Trim resolved to whole pixels for a concrete canvas
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrimPixels {
    /// Columns removed on the left
    pub left: u32,
    /// Columns removed on the right
    pub right: u32,
    /// Rows removed at the top
    pub top: u32,
    /// Rows removed at the bottom
    pub bottom: u32,
}

impl Trim {
    /// Resolve to pixels for a `width` × `height` canvas, always keeping 1×1
    pub fn to_pixels(&self, width: u32, height: u32) -> TrimPixels {
        let (left, right) = Self::split(width, self.left, self.right);
        let (top, bottom) = Self::split(height, self.top, self.bottom);
        TrimPixels {
            left,
            right,
            top,
            bottom,
        }
    }

    fn split(extent: u32, first_pct: f32, second_pct: f32) -> (u32, u32) {
        let keep_max = extent.saturating_sub(1);
        let first = Self::edge(extent, first_pct).min(keep_max);
        let second = Self::edge(extent, second_pct).min(keep_max - first);
        (first, second)
    }

    #[inline]
    fn edge(extent: u32, pct: f32) -> u32 {
        (extent as f64 * pct.clamp(0.0, 100.0) as f64 / 100.0).floor() as u32
    }

    fn apply(&mut self, key: &str, edge: &str, value: &OverrideValue) -> Result<(), ConfigError> {
        let slot = match edge {
            "left" => &mut self.left,
            "right" => &mut self.right,
            "top" => &mut self.top,
            "bottom" => &mut self.bottom,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        *slot = value.as_f32_in(key, 0.0, 100.0)?;
        Ok(())
    }
}

/// Geometric transform from the decoded bitmap to the output image
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageTransform {
    /// Scale factor (> 0)
    #[serde(default = "defaults::scale")]
    pub scale: f32,
    /// Rotation, counter-clockwise
    #[serde(default)]
    pub rotate: Rotation,
    /// Edge crop in percent
    #[serde(default)]
    pub trim: Trim,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            scale: defaults::scale(),
            rotate: Rotation::Deg0,
            trim: Trim::default(),
        }
    }
}

impl ImageTransform {
    /// True when the transform leaves the canvas untouched
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.rotate == Rotation::Deg0 && self.trim == Trim::default()
    }

    /// Canvas size after scaling (nearest-neighbour, never below 1×1)
    pub fn scaled_dims(&self, width: u32, height: u32) -> (u32, u32) {
        let scale = |v: u32| ((v as f64 * self.scale as f64).round() as u32).max(1);
        (scale(width), scale(height))
    }

    /// Final output size for a `width` × `height` bitmap
    pub fn output_dims(&self, width: u32, height: u32) -> (u32, u32) {
        let (sw, sh) = self.scaled_dims(width, height);
        let (rw, rh) = self.rotate.rotated_dims(sw, sh);
        let trim = self.trim.to_pixels(rw, rh);
        (rw - trim.left - trim.right, rh - trim.top - trim.bottom)
    }

    /// Map a bitmap (canvas) coordinate into output image pixels
    pub fn map_point(&self, canvas: Point, width: u32, height: u32) -> Point {
        let (sw, sh) = self.scaled_dims(width, height);
        let fx = if width > 0 { sw as f32 / width as f32 } else { self.scale };
        let fy = if height > 0 { sh as f32 / height as f32 } else { self.scale };
        let scaled = Point::new(canvas.x * fx, canvas.y * fy);

        let rotated = self.rotate.map_point(scaled, sw as f32, sh as f32);
        let (rw, rh) = self.rotate.rotated_dims(sw, sh);
        let trim = self.trim.to_pixels(rw, rh);
        Point::new(rotated.x - trim.left as f32, rotated.y - trim.top as f32)
    }

    /// Apply a `transform.*` override
    pub(crate) fn apply(
        &mut self,
        key: &str,
        segments: &[&str],
        value: &OverrideValue,
    ) -> Result<(), ConfigError> {
        match segments {
            ["scale"] => {
                let scale = value.as_f64(key)? as f32;
                if !(scale > 0.0) || !scale.is_finite() {
                    return Err(ConfigError::invalid(key, "scale must be greater than 0"));
                }
                if scale > MAX_SCALE {
                    return Err(ConfigError::invalid(
                        key,
                        format!("scale must be at most {MAX_SCALE}"),
                    ));
                }
                self.scale = scale;
            }
            ["rotate"] => self.rotate = Rotation::parse(key, value)?,
            ["trim", edge] => self.trim.apply(key, edge, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_dims_and_points() {
        assert_eq!(Rotation::Deg90.rotated_dims(4, 2), (2, 4));
        assert_eq!(Rotation::Deg180.rotated_dims(4, 2), (4, 2));

        let p = Point::new(1.0, 0.0);
        assert_eq!(Rotation::Deg90.map_point(p, 4.0, 2.0), Point::new(0.0, 3.0));
        assert_eq!(Rotation::Deg180.map_point(p, 4.0, 2.0), Point::new(3.0, 2.0));
        assert_eq!(Rotation::Deg270.map_point(p, 4.0, 2.0), Point::new(2.0, 1.0));
    }

    #[test]
    fn test_four_quarter_turns_restore_points() {
        let mut p = Point::new(1.0, 3.0);
        let (mut w, mut h) = (4.0, 6.0);
        for _ in 0..4 {
            p = Rotation::Deg90.map_point(p, w, h);
            std::mem::swap(&mut w, &mut h);
        }
        assert_eq!(p, Point::new(1.0, 3.0));
    }

    #[test]
    fn test_trim_keeps_one_pixel() {
        let trim = Trim {
            left: 60.0,
            right: 60.0,
            top: 100.0,
            bottom: 0.0,
        };
        let px = trim.to_pixels(10, 10);
        assert_eq!(px.left, 6);
        assert_eq!(px.right, 3);
        assert_eq!(px.top, 9);
        assert_eq!(px.bottom, 0);
        assert_eq!(
            ImageTransform {
                trim,
                ..ImageTransform::default()
            }
            .output_dims(10, 10),
            (1, 1)
        );
    }

    #[test]
    fn test_output_dims() {
        let transform = ImageTransform {
            scale: 2.0,
            rotate: Rotation::Deg90,
            trim: Trim {
                top: 10.0,
                ..Trim::default()
            },
        };
        // 20x10 -> 40x20 -> 20x40 -> 20x36
        assert_eq!(transform.output_dims(20, 10), (20, 36));
        assert_eq!(ImageTransform::default().output_dims(7, 3), (7, 3));
        assert!(ImageTransform::default().is_identity());
    }

    #[test]
    fn test_scaled_dims_never_zero() {
        let transform = ImageTransform {
            scale: 0.01,
            ..ImageTransform::default()
        };
        assert_eq!(transform.scaled_dims(10, 10), (1, 1));
    }

    #[test]
    fn test_apply_overrides() {
        let mut transform = ImageTransform::default();
        transform
            .apply("transform.rotate", &["rotate"], &OverrideValue::Text("90".into()))
            .unwrap();
        assert_eq!(transform.rotate, Rotation::Deg90);
        transform
            .apply("transform.trim.left", &["trim", "left"], &OverrideValue::Number(12.5))
            .unwrap();
        assert_eq!(transform.trim.left, 12.5);

        assert!(
            transform
                .apply("transform.rotate", &["rotate"], &OverrideValue::Number(45.0))
                .is_err()
        );
        assert!(
            transform
                .apply("transform.scale", &["scale"], &OverrideValue::Number(0.0))
                .is_err()
        );
        assert!(
            transform
                .apply("transform.scale", &["scale"], &OverrideValue::Number(1e10))
                .is_err()
        );
        assert_eq!(transform.scale, 1.0);
        assert!(
            transform
                .apply("transform.trim.left", &["trim", "left"], &OverrideValue::Number(101.0))
                .is_err()
        );
        assert!(matches!(
            transform.apply("transform.skew", &["skew"], &OverrideValue::Number(1.0)),
            Err(ConfigError::UnknownKey(_))
        ));
    }
}
