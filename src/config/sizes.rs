//! Per-category marker radii and stroke widths.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::defaults;
use super::overrides::OverrideValue;

/// Upper bound accepted for any size (canvas pixels)
const MAX_SIZE: f32 = 1000.0;

/// Marker and stroke sizes, in canvas pixels before scaling
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sizes {
    /// Vacuum marker radius
    #[serde(default = "defaults::vacuum_radius")]
    pub vacuum_radius: f32,
    /// Path stroke width (actual, goto and predicted paths)
    #[serde(default = "defaults::path_width")]
    pub path_width: f32,
    /// Mop path stroke width
    #[serde(default = "defaults::mop_path_width")]
    pub mop_path_width: f32,
    /// Obstacle marker radius
    #[serde(default = "defaults::obstacle_radius")]
    pub obstacle_radius: f32,
    /// Ignored obstacle marker radius
    #[serde(default = "defaults::obstacle_radius")]
    pub ignored_obstacle_radius: f32,
    /// Obstacle-with-photo marker radius
    #[serde(default = "defaults::obstacle_radius")]
    pub obstacle_with_photo_radius: f32,
    /// Ignored obstacle-with-photo marker radius
    #[serde(default = "defaults::obstacle_radius")]
    pub ignored_obstacle_with_photo_radius: f32,
    /// Charger marker radius
    #[serde(default = "defaults::charger_radius")]
    pub charger_radius: f32,
    /// Virtual wall stroke width
    #[serde(default = "defaults::virtual_wall_width")]
    pub virtual_wall_width: f32,
}

impl Default for Sizes {
    fn default() -> Self {
        Self {
            vacuum_radius: defaults::vacuum_radius(),
            path_width: defaults::path_width(),
            mop_path_width: defaults::mop_path_width(),
            obstacle_radius: defaults::obstacle_radius(),
            ignored_obstacle_radius: defaults::obstacle_radius(),
            obstacle_with_photo_radius: defaults::obstacle_radius(),
            ignored_obstacle_with_photo_radius: defaults::obstacle_radius(),
            charger_radius: defaults::charger_radius(),
            virtual_wall_width: defaults::virtual_wall_width(),
        }
    }
}

impl Sizes {
    /// Names of all size keys
    pub const KEYS: [&'static str; 9] = [
        "vacuum_radius",
        "path_width",
        "mop_path_width",
        "obstacle_radius",
        "ignored_obstacle_radius",
        "obstacle_with_photo_radius",
        "ignored_obstacle_with_photo_radius",
        "charger_radius",
        "virtual_wall_width",
    ];

    fn slot_mut(&mut self, name: &str) -> Option<&mut f32> {
        let slot = match name {
            "vacuum_radius" => &mut self.vacuum_radius,
            "path_width" => &mut self.path_width,
            "mop_path_width" => &mut self.mop_path_width,
            "obstacle_radius" => &mut self.obstacle_radius,
            "ignored_obstacle_radius" => &mut self.ignored_obstacle_radius,
            "obstacle_with_photo_radius" => &mut self.obstacle_with_photo_radius,
            "ignored_obstacle_with_photo_radius" => &mut self.ignored_obstacle_with_photo_radius,
            "charger_radius" => &mut self.charger_radius,
            "virtual_wall_width" => &mut self.virtual_wall_width,
            _ => return None,
        };
        Some(slot)
    }

    /// Size by key
    pub fn get(&self, name: &str) -> Option<f32> {
        self.clone().slot_mut(name).map(|v| *v)
    }

    /// Apply a `sizes.<name>` override
    pub(crate) fn apply(&mut self, key: &str, name: &str, value: &OverrideValue) -> Result<(), ConfigError> {
        let size = value.as_f32_in(key, 0.0, MAX_SIZE)?;
        let slot = self
            .slot_mut(name)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        *slot = size;
        Ok(())
    }
}
