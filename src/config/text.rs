//! Free text overlays.

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::defaults;

/// Text drawn on top of the map
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    /// Text to draw (ASCII; other characters render as `?`)
    pub text: String,
    /// Horizontal position of the top-left corner, percent of canvas width
    #[serde(default)]
    pub x: f32,
    /// Vertical position of the top-left corner, percent of canvas height
    #[serde(default)]
    pub y: f32,
    /// Text colour
    #[serde(default = "default_color")]
    pub color: Color,
    /// Integer glyph magnification
    #[serde(default = "defaults::text_scale")]
    pub scale: u32,
}

fn default_color() -> Color {
    Color::rgb(0, 0, 0)
}

impl TextOverlay {
    /// Black overlay at the given position
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            color: default_color(),
            scale: defaults::text_scale(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let overlay: TextOverlay = toml::from_str(
            r##"
            text = "Floor 1"
            x = 50
            color = "#FF0000"
            "##,
        )
        .unwrap();
        assert_eq!(overlay.text, "Floor 1");
        assert_eq!(overlay.x, 50.0);
        assert_eq!(overlay.y, 0.0);
        assert_eq!(overlay.color, Color::rgb(255, 0, 0));
        assert_eq!(overlay.scale, 2);
    }
}
