//! Render configuration and its override resolver.
//!
//! A [`RenderConfig`] is built once per render request by applying sparse
//! dotted-path overrides on top of fixed defaults. The host-level
//! [`CameraConfig`] wraps it with attribute selection and polling settings and
//! loads everything from a single TOML file.
//!
//! ## Override paths
//!
//! | Path | Value |
//! |------|-------|
//! | `transform.scale` | number > 0 |
//! | `transform.rotate` | 0, 90, 180 or 270 (counter-clockwise) |
//! | `transform.trim.{left,right,top,bottom}` | percent, 0-100 |
//! | `colors.<key>` | `"#RRGGBB"`, `"#RRGGBBAA"` or `[r, g, b(, a)]` |
//! | `drawables.<name>` | bool |
//! | `drawables` | list of enabled drawable names |
//! | `sizes.<name>` | number ≥ 0 |
//!
//! ## Example TOML
//!
//! ```toml
//! [transform]
//! scale = 2
//! rotate = 90
//!
//! [transform.trim]
//! left = 10
//!
//! [colors]
//! path = "#FFFFFF"
//! room_3 = [200, 120, 40]
//!
//! [drawables]
//! obstacles = false
//!
//! [attributes]
//! calibration_points = true
//!
//! [poll]
//! interval_secs = 10
//! non_refreshing_states = [8, 100]
//!
//! [[texts]]
//! text = "Ground floor"
//! x = 2
//! y = 2
//! ```

mod camera;
mod color;
mod defaults;
mod drawable;
mod overrides;
mod sizes;
mod text;
mod transform;

pub use camera::{CameraConfig, PollConfig};
pub use color::{Color, ColorScheme, ROOM_PALETTE_SIZE};
pub use drawable::Drawable;
pub use overrides::{ConfigOverride, OverrideValue};
pub use sizes::Sizes;
pub use text::TextOverlay;
pub use transform::{ImageTransform, Rotation, Trim, TrimPixels};

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::ConfigError;

/// Resolved styling, sizing and transform parameters
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderConfig {
    /// Colour per drawable category
    pub colors: ColorScheme,
    /// Enabled drawables
    pub drawables: BTreeSet<Drawable>,
    /// Marker radii and stroke widths
    pub sizes: Sizes,
    /// Free text overlays
    pub texts: Vec<TextOverlay>,
    /// Scale / rotate / trim
    pub transform: ImageTransform,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            colors: ColorScheme::default(),
            drawables: Drawable::ALL.into_iter().collect(),
            sizes: Sizes::default(),
            texts: Vec::new(),
            transform: ImageTransform::default(),
        }
    }
}

impl RenderConfig {
    /// Merge overrides into the defaults, skipping invalid ones with a warning
    pub fn resolve(overrides: &[ConfigOverride]) -> Self {
        let mut config = Self::default();
        config.merge(overrides);
        config
    }

    /// Merge overrides into the defaults, failing on the first invalid one
    pub fn try_resolve(overrides: &[ConfigOverride]) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for ov in overrides {
            config.apply(ov)?;
        }
        Ok(config)
    }

    /// Merge overrides into this config, skipping invalid ones with a warning
    pub fn merge(&mut self, overrides: &[ConfigOverride]) {
        for ov in overrides {
            if let Err(e) = self.apply(ov) {
                log::warn!("Ignoring render override {}: {}", ov.path, e);
            }
        }
    }

    /// Apply a single override
    pub fn apply(&mut self, ov: &ConfigOverride) -> Result<(), ConfigError> {
        let segments = ov.segments();
        self.apply_segments(&ov.path, &segments, &ov.value)
    }

    pub(crate) fn apply_segments(
        &mut self,
        key: &str,
        segments: &[&str],
        value: &OverrideValue,
    ) -> Result<(), ConfigError> {
        match segments {
            ["transform", rest @ ..] => self.transform.apply(key, rest, value),
            ["colors", name] => self.colors.apply(key, name, value),
            ["sizes", name] => self.sizes.apply(key, name, value),
            ["drawables", name] => {
                let drawable: Drawable = name
                    .parse()
                    .map_err(|_| ConfigError::UnknownKey(key.to_string()))?;
                if value.as_bool(key)? {
                    self.drawables.insert(drawable);
                } else {
                    self.drawables.remove(&drawable);
                }
                Ok(())
            }
            ["drawables"] => {
                self.drawables = Self::parse_drawable_list(key, value)?;
                Ok(())
            }
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    fn parse_drawable_list(key: &str, value: &OverrideValue) -> Result<BTreeSet<Drawable>, ConfigError> {
        let OverrideValue::List(items) = value else {
            return Err(ConfigError::invalid(key, "expected a list of drawable names"));
        };
        items
            .iter()
            .map(|item| match item {
                OverrideValue::Text(name) => name
                    .parse::<Drawable>()
                    .map_err(|e| ConfigError::invalid(key, e)),
                other => Err(ConfigError::invalid(key, format!("expected drawable name, got {other}"))),
            })
            .collect()
    }

    /// True when a drawable category is enabled
    #[inline]
    pub fn is_enabled(&self, drawable: Drawable) -> bool {
        self.drawables.contains(&drawable)
    }

    /// Express every overridable setting as an override
    ///
    /// `resolve(&config.to_overrides())` reproduces `config` except for
    /// `texts`, which are only settable through the typed API.
    pub fn to_overrides(&self) -> Vec<ConfigOverride> {
        let mut out = Vec::new();
        let t = &self.transform;
        out.push(ConfigOverride::new("transform.scale", OverrideValue::Number(t.scale as f64)));
        out.push(ConfigOverride::new(
            "transform.rotate",
            OverrideValue::Number(t.rotate.degrees() as f64),
        ));
        for (edge, pct) in [
            ("left", t.trim.left),
            ("right", t.trim.right),
            ("top", t.trim.top),
            ("bottom", t.trim.bottom),
        ] {
            out.push(ConfigOverride::new(
                format!("transform.trim.{edge}"),
                OverrideValue::Number(pct as f64),
            ));
        }
        for (key, color) in self.colors.entries() {
            out.push(ConfigOverride::new(
                format!("colors.{key}"),
                OverrideValue::Text(color.to_string()),
            ));
        }
        for drawable in Drawable::ALL {
            out.push(ConfigOverride::new(
                format!("drawables.{drawable}"),
                OverrideValue::Bool(self.is_enabled(drawable)),
            ));
        }
        for key in Sizes::KEYS {
            if let Some(size) = self.sizes.get(key) {
                out.push(ConfigOverride::new(
                    format!("sizes.{key}"),
                    OverrideValue::Number(size as f64),
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ov(s: &str) -> ConfigOverride {
        s.parse().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert!(config.transform.is_identity());
        assert_eq!(config.drawables.len(), Drawable::ALL.len());
        assert!(config.texts.is_empty());
        assert_eq!(config.sizes.vacuum_radius, 6.0);
    }

    #[test]
    fn test_resolve_nested_paths() {
        let config = RenderConfig::resolve(&[
            ov("transform.scale=2"),
            ov("transform.trim.left=10"),
            ov("colors.path=\"#FF0000\""),
            ov("drawables.obstacles=false"),
            ov("sizes.vacuum_radius=9"),
        ]);
        assert_eq!(config.transform.scale, 2.0);
        assert_eq!(config.transform.trim.left, 10.0);
        assert_eq!(config.colors.path, Color::rgb(255, 0, 0));
        assert!(!config.is_enabled(Drawable::Obstacles));
        assert!(config.is_enabled(Drawable::Path));
        assert_eq!(config.sizes.vacuum_radius, 9.0);
    }

    #[test]
    fn test_unknown_keys_ignored_by_resolve() {
        let overrides = [ov("transform.skew=3"), ov("bogus=1"), ov("transform.scale=3")];
        let config = RenderConfig::resolve(&overrides);
        assert_eq!(config.transform.scale, 3.0);

        assert!(matches!(
            RenderConfig::try_resolve(&overrides),
            Err(ConfigError::UnknownKey(k)) if k == "transform.skew"
        ));
    }

    #[test]
    fn test_invalid_values_keep_previous() {
        let config = RenderConfig::resolve(&[ov("transform.scale=2"), ov("transform.scale=-1")]);
        assert_eq!(config.transform.scale, 2.0);
    }

    #[test]
    fn test_drawable_list_replaces_set() {
        let config = RenderConfig::resolve(&[ov("drawables=[\"path\", \"charger\"]")]);
        assert_eq!(
            config.drawables,
            [Drawable::Path, Drawable::Charger].into_iter().collect()
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let defaults = RenderConfig::default();
        assert_eq!(RenderConfig::resolve(&defaults.to_overrides()), defaults);

        let custom = RenderConfig::resolve(&[
            ov("transform.rotate=270"),
            ov("transform.trim.bottom=25"),
            ov("colors.room_7=[1, 2, 3, 4]"),
            ov("drawables.room_names=false"),
            ov("colors.room_names=\"#FF0000\""),
            ov("colors.room_outline=\"#00FF00\""),
        ]);
        assert_eq!(RenderConfig::resolve(&custom.to_overrides()), custom);
    }

    #[test]
    fn test_room_label_and_outline_colours() {
        let config = RenderConfig::try_resolve(&[
            ov("colors.room_names=\"#FF0000\""),
            ov("colors.room_outline=\"#00FF00\""),
            ov("colors.room_2=\"#0000FF\""),
        ])
        .unwrap();
        assert_eq!(config.colors.room_names, Color::rgb(255, 0, 0));
        assert_eq!(config.colors.room_outline, Color::rgb(0, 255, 0));
        assert_eq!(config.colors.room(2), Color::rgb(0, 0, 255));
    }

    #[test]
    fn test_oversized_scale_rejected() {
        assert!(matches!(
            RenderConfig::try_resolve(&[ov("transform.scale=1e10")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        let config = RenderConfig::resolve(&[ov("transform.scale=1e10")]);
        assert_eq!(config.transform.scale, 1.0);
    }
}
