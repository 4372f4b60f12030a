//! Block tags of the map payload.

/// Size of the common block header (type, header_len, data_len)
pub const BLOCK_HEADER_LEN: usize = 8;

/// Known block types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BlockType {
    Charger = 1,
    Image = 2,
    Path = 3,
    GotoPath = 4,
    GotoPredictedPath = 5,
    CurrentlyCleanedZones = 6,
    GotoTarget = 7,
    RobotPosition = 8,
    NoGoAreas = 9,
    VirtualWalls = 10,
    CleanedRooms = 11,
    NoMoppingAreas = 12,
    Obstacles = 13,
    IgnoredObstacles = 14,
    ObstaclesWithPhoto = 15,
    IgnoredObstaclesWithPhoto = 16,
    CarpetMap = 17,
    MopPath = 18,
    NoCarpetAreas = 19,
    MapName = 32,
    RoomNames = 33,
    RoomOutlines = 34,
    Digest = 1024,
}

impl BlockType {
    /// Block type for a raw tag; `None` for tags this decoder skips
    pub fn from_tag(tag: u16) -> Option<Self> {
        let block = match tag {
            1 => BlockType::Charger,
            2 => BlockType::Image,
            3 => BlockType::Path,
            4 => BlockType::GotoPath,
            5 => BlockType::GotoPredictedPath,
            6 => BlockType::CurrentlyCleanedZones,
            7 => BlockType::GotoTarget,
            8 => BlockType::RobotPosition,
            9 => BlockType::NoGoAreas,
            10 => BlockType::VirtualWalls,
            11 => BlockType::CleanedRooms,
            12 => BlockType::NoMoppingAreas,
            13 => BlockType::Obstacles,
            14 => BlockType::IgnoredObstacles,
            15 => BlockType::ObstaclesWithPhoto,
            16 => BlockType::IgnoredObstaclesWithPhoto,
            17 => BlockType::CarpetMap,
            18 => BlockType::MopPath,
            19 => BlockType::NoCarpetAreas,
            32 => BlockType::MapName,
            33 => BlockType::RoomNames,
            34 => BlockType::RoomOutlines,
            1024 => BlockType::Digest,
            _ => return None,
        };
        Some(block)
    }

    /// Raw tag
    #[inline]
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// Name used in errors and logs
    pub fn name(self) -> &'static str {
        match self {
            BlockType::Charger => "charger",
            BlockType::Image => "image",
            BlockType::Path => "path",
            BlockType::GotoPath => "goto_path",
            BlockType::GotoPredictedPath => "goto_predicted_path",
            BlockType::CurrentlyCleanedZones => "zones",
            BlockType::GotoTarget => "goto_target",
            BlockType::RobotPosition => "robot_position",
            BlockType::NoGoAreas => "no_go_areas",
            BlockType::VirtualWalls => "virtual_walls",
            BlockType::CleanedRooms => "cleaned_rooms",
            BlockType::NoMoppingAreas => "no_mopping_areas",
            BlockType::Obstacles => "obstacles",
            BlockType::IgnoredObstacles => "ignored_obstacles",
            BlockType::ObstaclesWithPhoto => "obstacles_with_photo",
            BlockType::IgnoredObstaclesWithPhoto => "ignored_obstacles_with_photo",
            BlockType::CarpetMap => "carpet_map",
            BlockType::MopPath => "mop_path",
            BlockType::NoCarpetAreas => "no_carpet_areas",
            BlockType::MapName => "map_name",
            BlockType::RoomNames => "room_names",
            BlockType::RoomOutlines => "room_outlines",
            BlockType::Digest => "digest",
        }
    }

    /// Fixed record size for count-prefixed blocks of uniform records
    pub fn record_len(self) -> Option<usize> {
        match self {
            BlockType::Path | BlockType::GotoPath | BlockType::GotoPredictedPath | BlockType::MopPath => {
                Some(8)
            }
            BlockType::CurrentlyCleanedZones => Some(16),
            BlockType::NoGoAreas | BlockType::NoMoppingAreas | BlockType::NoCarpetAreas => Some(32),
            BlockType::VirtualWalls => Some(16),
            BlockType::CleanedRooms => Some(1),
            BlockType::Obstacles | BlockType::IgnoredObstacles => Some(12),
            BlockType::ObstaclesWithPhoto | BlockType::IgnoredObstaclesWithPhoto => Some(16),
            _ => None,
        }
    }
}
