//! Independently toggled map element categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Map element category that can be enabled or disabled
///
/// Variant order is the drawing order (z-order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Drawable {
    /// Room outlines
    Rooms,
    /// Carpet runs
    Carpet,
    /// No-carpet areas
    NoCarpetZones,
    /// No-go areas
    NoGoZones,
    /// No-mopping areas
    NoMoppingZones,
    /// Cleaning zones
    Zones,
    /// Virtual walls
    VirtualWalls,
    /// Mop path
    MopPath,
    /// Driven path
    Path,
    /// Path towards the go-to target
    GotoPath,
    /// Planned path
    PredictedPath,
    /// Go-to target marker
    GotoTarget,
    /// Obstacles
    Obstacles,
    /// Ignored obstacles
    IgnoredObstacles,
    /// Obstacles with photo
    ObstaclesWithPhoto,
    /// Ignored obstacles with photo
    IgnoredObstaclesWithPhoto,
    /// Charger
    Charger,
    /// Vacuum position
    VacuumPosition,
    /// Room names
    RoomNames,
}

impl Drawable {
    /// Every drawable in z-order
    pub const ALL: [Drawable; 19] = [
        Drawable::Rooms,
        Drawable::Carpet,
        Drawable::NoCarpetZones,
        Drawable::NoGoZones,
        Drawable::NoMoppingZones,
        Drawable::Zones,
        Drawable::VirtualWalls,
        Drawable::MopPath,
        Drawable::Path,
        Drawable::GotoPath,
        Drawable::PredictedPath,
        Drawable::GotoTarget,
        Drawable::Obstacles,
        Drawable::IgnoredObstacles,
        Drawable::ObstaclesWithPhoto,
        Drawable::IgnoredObstaclesWithPhoto,
        Drawable::Charger,
        Drawable::VacuumPosition,
        Drawable::RoomNames,
    ];

    /// Configuration key
    pub fn name(&self) -> &'static str {
        match self {
            Drawable::Rooms => "rooms",
            Drawable::Carpet => "carpet",
            Drawable::NoCarpetZones => "no_carpet_zones",
            Drawable::NoGoZones => "no_go_zones",
            Drawable::NoMoppingZones => "no_mopping_zones",
            Drawable::Zones => "zones",
            Drawable::VirtualWalls => "virtual_walls",
            Drawable::MopPath => "mop_path",
            Drawable::Path => "path",
            Drawable::GotoPath => "goto_path",
            Drawable::PredictedPath => "predicted_path",
            Drawable::GotoTarget => "goto_target",
            Drawable::Obstacles => "obstacles",
            Drawable::IgnoredObstacles => "ignored_obstacles",
            Drawable::ObstaclesWithPhoto => "obstacles_with_photo",
            Drawable::IgnoredObstaclesWithPhoto => "ignored_obstacles_with_photo",
            Drawable::Charger => "charger",
            Drawable::VacuumPosition => "vacuum_position",
            Drawable::RoomNames => "room_names",
        }
    }
}

impl fmt::Display for Drawable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Drawable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Drawable::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| format!("unknown drawable: {s}"))
    }
}
