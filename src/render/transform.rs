//! Scale, rotate and trim the drawn canvas.

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::config::{ImageTransform, Rotation};

/// Apply the transform: nearest-neighbour scale, counter-clockwise rotation,
/// then per-edge trim of the rotated canvas
pub fn apply_transform(canvas: &RgbaImage, transform: &ImageTransform) -> RgbaImage {
    let (width, height) = canvas.dimensions();
    let (sw, sh) = transform.scaled_dims(width, height);

    let scaled = if (sw, sh) == (width, height) {
        canvas.clone()
    } else {
        imageops::resize(canvas, sw, sh, FilterType::Nearest)
    };

    // imageops rotates clockwise
    let rotated = match transform.rotate {
        Rotation::Deg0 => scaled,
        Rotation::Deg90 => imageops::rotate270(&scaled),
        Rotation::Deg180 => imageops::rotate180(&scaled),
        Rotation::Deg270 => imageops::rotate90(&scaled),
    };

    let (rw, rh) = rotated.dimensions();
    let trim = transform.trim.to_pixels(rw, rh);
    if trim == Default::default() {
        return rotated;
    }
    log::trace!("Trimming {}x{} canvas by {:?}", rw, rh, trim);
    imageops::crop_imm(
        &rotated,
        trim.left,
        trim.top,
        rw - trim.left - trim.right,
        rh - trim.top - trim.bottom,
    )
    .to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Trim;
    use image::Rgba;

    /// 3x2 canvas with a distinct colour per pixel
    fn sample() -> RgbaImage {
        RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8 * 10, y as u8 * 10, 0, 255]))
    }

    fn with_rotation(rotate: Rotation) -> ImageTransform {
        ImageTransform {
            rotate,
            ..ImageTransform::default()
        }
    }

    #[test]
    fn test_identity() {
        let canvas = sample();
        assert_eq!(apply_transform(&canvas, &ImageTransform::default()), canvas);
    }

    #[test]
    fn test_rotation_is_counter_clockwise() {
        let canvas = sample();
        let rotated = apply_transform(&canvas, &with_rotation(Rotation::Deg90));
        assert_eq!(rotated.dimensions(), (2, 3));
        // Top-right pixel moves to the top-left
        assert_eq!(rotated.get_pixel(0, 0), canvas.get_pixel(2, 0));
        assert_eq!(rotated.get_pixel(1, 2), canvas.get_pixel(0, 1));
    }

    #[test]
    fn test_pixel_rotation_matches_point_mapping() {
        let canvas = sample();
        for rotate in [Rotation::Deg90, Rotation::Deg180, Rotation::Deg270] {
            let transform = with_rotation(rotate);
            let rotated = apply_transform(&canvas, &transform);
            for (x, y, px) in canvas.enumerate_pixels() {
                let centre = crate::core::Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let mapped = transform.map_point(centre, 3, 2);
                assert_eq!(
                    rotated.get_pixel(mapped.x.floor() as u32, mapped.y.floor() as u32),
                    px,
                    "{rotate:?} ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn test_four_rotations_restore_canvas() {
        let canvas = sample();
        let quarter = with_rotation(Rotation::Deg90);
        let mut image = canvas.clone();
        for _ in 0..4 {
            image = apply_transform(&image, &quarter);
        }
        assert_eq!(image, canvas);
    }

    #[test]
    fn test_scale_nearest() {
        let canvas = sample();
        let transform = ImageTransform {
            scale: 2.0,
            ..ImageTransform::default()
        };
        let scaled = apply_transform(&canvas, &transform);
        assert_eq!(scaled.dimensions(), (6, 4));
        assert_eq!(scaled.get_pixel(5, 3), canvas.get_pixel(2, 1));
        assert_eq!(scaled.get_pixel(2, 0), canvas.get_pixel(1, 0));
    }

    #[test]
    fn test_trim_after_rotation() {
        let canvas = RgbaImage::from_fn(10, 20, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let transform = ImageTransform {
            scale: 1.0,
            rotate: Rotation::Deg180,
            trim: Trim {
                left: 20.0,
                top: 10.0,
                ..Trim::default()
            },
        };
        let out = apply_transform(&canvas, &transform);
        assert_eq!(out.dimensions(), transform.output_dims(10, 20));
        assert_eq!(out.dimensions(), (8, 18));
        // Output (0,0) is rotated (2,2), which came from source (7,17)
        assert_eq!(out.get_pixel(0, 0), canvas.get_pixel(7, 17));
    }
}
