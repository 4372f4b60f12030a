//! Image renderer: decoded map + render config → PNG.
//!
//! ## Pipeline
//!
//! 1. Empty maps short-circuit to a placeholder image
//! 2. [`draw_canvas`] expands the bitmap into colours and draws the enabled
//!    drawables in z-order (rooms, carpet, restricted areas, zones, walls,
//!    paths, obstacles, charger, vacuum, room names)
//! 3. [`apply_transform`] scales (nearest-neighbour), rotates
//!    counter-clockwise and trims the whole canvas
//! 4. Free text overlays are written on the result
//! 5. [`encode_png`] produces the output bytes
//!
//! Rendering never fails on geometry: degenerate shapes are skipped. Errors
//! come from the PNG encoder or from a transform whose scaled canvas exceeds
//! [`MAX_OUTPUT_PIXELS`].

mod canvas;
mod font;
mod layers;
mod transform;

pub use canvas::{Mask, blend, paint};
pub use layers::{Painter, base_layer, draw_texts};
pub use transform::apply_transform;

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::config::RenderConfig;
use crate::core::Point;
use crate::error::RenderError;
use crate::map::MapData;

/// Placeholder size for maps without explored area
const PLACEHOLDER_WIDTH: u32 = 160;
const PLACEHOLDER_HEIGHT: u32 = 90;
const PLACEHOLDER_TEXT: &str = "NO MAP";
const PLACEHOLDER_TEXT_SCALE: u32 = 3;

/// Largest scaled canvas the renderer will allocate
pub const MAX_OUTPUT_PIXELS: u64 = 64 * 1024 * 1024;

/// Encoded map image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedMap {
    /// PNG bytes
    pub png: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

/// Render a decoded map to PNG
pub fn render(model: &MapData, config: &RenderConfig) -> Result<RenderedMap, RenderError> {
    let image = if model.is_empty() {
        placeholder(config)
    } else {
        let (width, height) = config
            .transform
            .scaled_dims(model.image.width, model.image.height);
        if width as u64 * height as u64 > MAX_OUTPUT_PIXELS {
            return Err(RenderError::TooLarge { width, height });
        }
        let canvas = draw_canvas(model, config);
        let mut image = apply_transform(&canvas, &config.transform);
        draw_texts(&mut image, config);
        image
    };

    let png = encode_png(&image)?;
    log::debug!(
        "Rendered {}x{} map ({} bytes)",
        image.width(),
        image.height(),
        png.len()
    );
    Ok(RenderedMap {
        png,
        width: image.width(),
        height: image.height(),
    })
}

/// Bitmap and drawables at device resolution, before the transform
pub fn draw_canvas(model: &MapData, config: &RenderConfig) -> RgbaImage {
    if model.is_empty() {
        return placeholder(config);
    }
    let mut canvas = base_layer(&model.image, config);
    Painter::new(&mut canvas, model, config).draw_all();
    canvas
}

/// Image shown while the device reports no explored area
pub fn placeholder(config: &RenderConfig) -> RgbaImage {
    let bg = config.colors.map_outside;
    let mut image = RgbaImage::from_pixel(
        PLACEHOLDER_WIDTH,
        PLACEHOLDER_HEIGHT,
        Rgba([bg.r, bg.g, bg.b, 255]),
    );
    let (tw, th) = font::text_size(PLACEHOLDER_TEXT, PLACEHOLDER_TEXT_SCALE);
    let origin = Point::new(
        (PLACEHOLDER_WIDTH.saturating_sub(tw) / 2) as f32,
        (PLACEHOLDER_HEIGHT.saturating_sub(th) / 2) as f32,
    );
    let mut mask = Mask::for_canvas(&image);
    mask.text(origin, PLACEHOLDER_TEXT, PLACEHOLDER_TEXT_SCALE);
    paint(&mut image, &mask, config.colors.map_wall);
    image
}

/// Encode an RGBA image as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageTransform;
    use crate::map::{MapHeader, MapImage, PixelType};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_empty_map_renders_placeholder() {
        let model = MapData::empty(MapHeader::default(), ImageTransform::default());
        let rendered = render(&model, &RenderConfig::default()).unwrap();
        assert_eq!(&rendered.png[..8], &PNG_SIGNATURE);
        assert_eq!((rendered.width, rendered.height), (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT));
    }

    #[test]
    fn test_render_applies_transform() {
        let mut model = MapData::empty(MapHeader::default(), ImageTransform::default());
        model.image = MapImage {
            top: 0,
            left: 0,
            width: 30,
            height: 10,
            pixels: vec![PixelType::Floor; 300],
            is_empty: false,
        };
        let config = RenderConfig::resolve(&[
            "transform.scale=2".parse().unwrap(),
            "transform.rotate=90".parse().unwrap(),
        ]);
        let rendered = render(&model, &config).unwrap();
        assert_eq!((rendered.width, rendered.height), (20, 60));

        let decoded = image::load_from_memory(&rendered.png).unwrap();
        assert_eq!(decoded.width(), 20);
        assert_eq!(decoded.height(), 60);
    }

    #[test]
    fn test_oversized_scale_is_rejected() {
        let mut model = MapData::empty(MapHeader::default(), ImageTransform::default());
        model.image = MapImage {
            top: 0,
            left: 0,
            width: 30,
            height: 10,
            pixels: vec![PixelType::Floor; 300],
            is_empty: false,
        };
        // Set directly: the override path caps the scale earlier
        let mut config = RenderConfig::default();
        config.transform.scale = 1e10;
        assert!(matches!(
            render(&model, &config),
            Err(RenderError::TooLarge { .. })
        ));
    }
}
