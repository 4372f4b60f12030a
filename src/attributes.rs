//! Named attributes published alongside the map image.
//!
//! Attributes are an explicit enum; [`extract`] computes only the requested
//! ones. Values serialize to JSON through serde.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Area, Obstacle, Point, Position, Wall};
use crate::map::{CalibrationPoint, ImageSummary, MapData, Room, RoomId};

/// Attribute names
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeName {
    CalibrationPoints,
    CarpetMap,
    Charger,
    CleanedRooms,
    Goto,
    GotoPath,
    GotoPredictedPath,
    IgnoredObstacles,
    IgnoredObstaclesWithPhoto,
    Image,
    IsEmpty,
    MapName,
    MopPath,
    NoCarpetAreas,
    NoGoAreas,
    NoMoppingAreas,
    Obstacles,
    ObstaclesWithPhoto,
    Path,
    RoomNumbers,
    Rooms,
    VacuumPosition,
    VacuumRoom,
    VacuumRoomName,
    Walls,
    Zones,
}

impl AttributeName {
    /// Every attribute
    pub const ALL: [AttributeName; 26] = [
        AttributeName::CalibrationPoints,
        AttributeName::CarpetMap,
        AttributeName::Charger,
        AttributeName::CleanedRooms,
        AttributeName::Goto,
        AttributeName::GotoPath,
        AttributeName::GotoPredictedPath,
        AttributeName::IgnoredObstacles,
        AttributeName::IgnoredObstaclesWithPhoto,
        AttributeName::Image,
        AttributeName::IsEmpty,
        AttributeName::MapName,
        AttributeName::MopPath,
        AttributeName::NoCarpetAreas,
        AttributeName::NoGoAreas,
        AttributeName::NoMoppingAreas,
        AttributeName::Obstacles,
        AttributeName::ObstaclesWithPhoto,
        AttributeName::Path,
        AttributeName::RoomNumbers,
        AttributeName::Rooms,
        AttributeName::VacuumPosition,
        AttributeName::VacuumRoom,
        AttributeName::VacuumRoomName,
        AttributeName::Walls,
        AttributeName::Zones,
    ];

    /// Published name
    pub fn name(&self) -> &'static str {
        match self {
            AttributeName::CalibrationPoints => "calibration_points",
            AttributeName::CarpetMap => "carpet_map",
            AttributeName::Charger => "charger",
            AttributeName::CleanedRooms => "cleaned_rooms",
            AttributeName::Goto => "goto",
            AttributeName::GotoPath => "goto_path",
            AttributeName::GotoPredictedPath => "goto_predicted_path",
            AttributeName::IgnoredObstacles => "ignored_obstacles",
            AttributeName::IgnoredObstaclesWithPhoto => "ignored_obstacles_with_photo",
            AttributeName::Image => "image",
            AttributeName::IsEmpty => "is_empty",
            AttributeName::MapName => "map_name",
            AttributeName::MopPath => "mop_path",
            AttributeName::NoCarpetAreas => "no_carpet_areas",
            AttributeName::NoGoAreas => "no_go_areas",
            AttributeName::NoMoppingAreas => "no_mopping_areas",
            AttributeName::Obstacles => "obstacles",
            AttributeName::ObstaclesWithPhoto => "obstacles_with_photo",
            AttributeName::Path => "path",
            AttributeName::RoomNumbers => "room_numbers",
            AttributeName::Rooms => "rooms",
            AttributeName::VacuumPosition => "vacuum_position",
            AttributeName::VacuumRoom => "vacuum_room",
            AttributeName::VacuumRoomName => "vacuum_room_name",
            AttributeName::Walls => "walls",
            AttributeName::Zones => "zones",
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttributeName::ALL
            .iter()
            .copied()
            .find(|a| a.name() == s)
            .ok_or_else(|| format!("unknown attribute: {s}"))
    }
}

/// Attribute value
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Absent optional value (`null`)
    None,
    Bool(bool),
    Id(RoomId),
    Text(String),
    Point(Point),
    Position(Position),
    Points(Vec<Point>),
    Areas(Vec<Area>),
    Walls(Vec<Wall>),
    Obstacles(Vec<Obstacle>),
    RoomIds(Vec<RoomId>),
    RoomNames(BTreeMap<RoomId, String>),
    Rooms(BTreeMap<RoomId, Room>),
    Image(ImageSummary),
    Calibration(Vec<CalibrationPoint>),
}

impl AttributeValue {
    fn option<T>(value: Option<T>, f: impl FnOnce(T) -> AttributeValue) -> Self {
        value.map(f).unwrap_or(AttributeValue::None)
    }
}

/// `room_numbers`: id → name when every room is named, otherwise the ids
pub fn room_numbers(model: &MapData) -> AttributeValue {
    let named: Option<BTreeMap<RoomId, String>> = model
        .rooms
        .values()
        .map(|room| room.name.clone().map(|name| (room.id, name)))
        .collect();
    match named {
        Some(names) if !names.is_empty() => AttributeValue::RoomNames(names),
        _ => AttributeValue::RoomIds(model.rooms.keys().copied().collect()),
    }
}

/// Compute one attribute
pub fn attribute(model: &MapData, name: AttributeName) -> AttributeValue {
    match name {
        AttributeName::CalibrationPoints => AttributeValue::Calibration(model.calibration_points()),
        AttributeName::CarpetMap => AttributeValue::Areas(model.carpet_map.clone()),
        AttributeName::Charger => AttributeValue::option(model.charger, AttributeValue::Point),
        AttributeName::CleanedRooms => {
            AttributeValue::RoomIds(model.cleaned_rooms.iter().copied().collect())
        }
        AttributeName::Goto => AttributeValue::option(model.goto, AttributeValue::Point),
        AttributeName::GotoPath => AttributeValue::Points(model.goto_path.points.clone()),
        AttributeName::GotoPredictedPath => AttributeValue::Points(model.predicted_path.points.clone()),
        AttributeName::IgnoredObstacles => AttributeValue::Obstacles(model.ignored_obstacles.clone()),
        AttributeName::IgnoredObstaclesWithPhoto => {
            AttributeValue::Obstacles(model.ignored_obstacles_with_photo.clone())
        }
        AttributeName::Image => AttributeValue::Image(model.image.summary()),
        AttributeName::IsEmpty => AttributeValue::Bool(model.is_empty()),
        AttributeName::MapName => AttributeValue::option(model.map_name.clone(), AttributeValue::Text),
        AttributeName::MopPath => AttributeValue::Points(model.mop_path.points.clone()),
        AttributeName::NoCarpetAreas => AttributeValue::Areas(model.no_carpet_areas.clone()),
        AttributeName::NoGoAreas => AttributeValue::Areas(model.no_go_areas.clone()),
        AttributeName::NoMoppingAreas => AttributeValue::Areas(model.no_mopping_areas.clone()),
        AttributeName::Obstacles => AttributeValue::Obstacles(model.obstacles.clone()),
        AttributeName::ObstaclesWithPhoto => {
            AttributeValue::Obstacles(model.obstacles_with_photo.clone())
        }
        AttributeName::Path => AttributeValue::Points(model.path.points.clone()),
        AttributeName::RoomNumbers => room_numbers(model),
        AttributeName::Rooms => AttributeValue::Rooms(model.rooms.clone()),
        AttributeName::VacuumPosition => {
            AttributeValue::option(model.vacuum_position, AttributeValue::Position)
        }
        AttributeName::VacuumRoom => AttributeValue::option(model.vacuum_room, AttributeValue::Id),
        AttributeName::VacuumRoomName => {
            AttributeValue::option(model.vacuum_room_name.clone(), AttributeValue::Text)
        }
        AttributeName::Walls => AttributeValue::Walls(model.walls.clone()),
        AttributeName::Zones => AttributeValue::Areas(model.zones.clone()),
    }
}

/// Compute the requested attributes
pub fn extract(
    model: &MapData,
    requested: &BTreeSet<AttributeName>,
) -> BTreeMap<AttributeName, AttributeValue> {
    requested
        .iter()
        .map(|&name| (name, attribute(model, name)))
        .collect()
}

/// Attributes as a JSON object keyed by attribute name
pub fn to_json(attributes: &BTreeMap<AttributeName, AttributeValue>) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(attributes)
}
