//! Host-level camera configuration loaded from TOML.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::attributes::AttributeName;
use crate::error::ConfigError;

use super::defaults;
use super::overrides::{ConfigOverride, OverrideValue};
use super::text::TextOverlay;
use super::RenderConfig;

/// Longest accepted poll interval (one day)
const MAX_POLL_INTERVAL_SECS: f32 = 86_400.0;

/// Polling settings
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PollConfig {
    /// Seconds between poll cycles
    pub interval_secs: f32,
    /// Device states during which the published map is not refreshed
    pub non_refreshing_states: BTreeSet<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::poll_interval_secs(),
            non_refreshing_states: defaults::non_refreshing_states().into_iter().collect(),
        }
    }
}

impl PollConfig {
    /// Interval as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f32(self.interval_secs)
    }

    fn apply(&mut self, key: &str, segments: &[&str], value: &OverrideValue) -> Result<(), ConfigError> {
        match segments {
            ["interval_secs"] => {
                let secs = value.as_f32_in(key, 0.0, MAX_POLL_INTERVAL_SECS)?;
                if secs <= 0.0 {
                    return Err(ConfigError::invalid(key, "interval must be greater than 0"));
                }
                self.interval_secs = secs;
            }
            ["non_refreshing_states"] => {
                self.non_refreshing_states = value.as_u32_list(key)?.into_iter().collect();
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// Complete configuration of one map camera
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CameraConfig {
    /// Rendering settings
    pub render: RenderConfig,
    /// Attributes published alongside the image
    pub attributes: BTreeSet<AttributeName>,
    /// Polling settings
    pub poll: PollConfig,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            attributes: AttributeName::ALL.into_iter().collect(),
            poll: PollConfig::default(),
        }
    }
}

impl CameraConfig {
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
                log::warn!("Ignoring configuration override {}: {}", ov.path, e);
            }
        }
    }

    /// Apply a single override
    pub fn apply(&mut self, ov: &ConfigOverride) -> Result<(), ConfigError> {
        let key = ov.path.as_str();
        let segments = ov.segments();
        match segments.as_slice() {
            ["attributes", name] => {
                let attribute: AttributeName = name
                    .parse()
                    .map_err(|_| ConfigError::UnknownKey(key.to_string()))?;
                if ov.value.as_bool(key)? {
                    self.attributes.insert(attribute);
                } else {
                    self.attributes.remove(&attribute);
                }
                Ok(())
            }
            ["attributes"] => {
                let OverrideValue::List(items) = &ov.value else {
                    return Err(ConfigError::invalid(key, "expected a list of attribute names"));
                };
                self.attributes = items
                    .iter()
                    .map(|item| match item {
                        OverrideValue::Text(name) => name
                            .parse::<AttributeName>()
                            .map_err(|e| ConfigError::invalid(key, e)),
                        other => Err(ConfigError::invalid(
                            key,
                            format!("expected attribute name, got {other}"),
                        )),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(())
            }
            ["poll", rest @ ..] => self.poll.apply(key, rest, &ov.value),
            _ => self.render.apply_segments(key, &segments, &ov.value),
        }
    }

    /// Parse a TOML document
    ///
    /// Scalar settings are flattened into dotted overrides and merged
    /// leniently; `[[texts]]` tables are deserialized directly.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(content)?;
        let texts: Vec<TextOverlay> = match table.remove("texts") {
            Some(value) => value.try_into()?,
            None => Vec::new(),
        };

        let mut overrides = Vec::new();
        ConfigOverride::flatten_toml("", &table, &mut overrides);

        let mut config = Self::resolve(&overrides);
        config.render.texts = texts;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded camera configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Drawable, Rotation};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r##"
        [transform]
        scale = 2
        rotate = 180

        [transform.trim]
        right = 5

        [colors]
        robot = "#00FF00"

        [drawables]
        mop_path = false

        [attributes]
        walls = false

        [poll]
        interval_secs = 10
        non_refreshing_states = [8, 100]

        [[texts]]
        text = "Upstairs"
        x = 1
        y = 2
    "##;

    #[test]
    fn test_from_toml_str() {
        let config = CameraConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.render.transform.scale, 2.0);
        assert_eq!(config.render.transform.rotate, Rotation::Deg180);
        assert_eq!(config.render.transform.trim.right, 5.0);
        assert!(!config.render.is_enabled(Drawable::MopPath));
        assert!(!config.attributes.contains(&AttributeName::Walls));
        assert!(config.attributes.contains(&AttributeName::Rooms));
        assert_eq!(config.poll.interval(), Duration::from_secs(10));
        assert_eq!(
            config.poll.non_refreshing_states,
            [8, 100].into_iter().collect()
        );
        assert_eq!(config.render.texts.len(), 1);
        assert_eq!(config.render.texts[0].text, "Upstairs");
    }

    #[test]
    fn test_defaults() {
        let config = CameraConfig::default();
        assert_eq!(config.poll.interval_secs, 5.0);
        assert_eq!(config.poll.non_refreshing_states, [8].into_iter().collect());
        assert_eq!(config.attributes.len(), AttributeName::ALL.len());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = CameraConfig::from_toml_str("[poll]\nfrequency = 3\n[mystery]\nx = 1\n").unwrap();
        assert_eq!(config, CameraConfig::default());
    }

    #[test]
    fn test_strict_resolve() {
        let bad: ConfigOverride = "poll.interval_secs=0".parse().unwrap();
        assert!(CameraConfig::try_resolve(&[bad]).is_err());

        let list: ConfigOverride = "attributes=[\"rooms\", \"is_empty\"]".parse().unwrap();
        let config = CameraConfig::try_resolve(&[list]).unwrap();
        assert_eq!(config.attributes.len(), 2);
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = CameraConfig::load(file.path()).unwrap();
        assert_eq!(config.render.transform.scale, 2.0);

        assert!(matches!(
            CameraConfig::load("/nonexistent/camera.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            CameraConfig::from_toml_str("[transform"),
            Err(ConfigError::Parse(_))
        ));
    }
}
