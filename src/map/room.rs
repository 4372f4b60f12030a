//! Room information.

use serde::Serialize;

use crate::core::{Area, Point};

/// Room identifier as reported by the device (stable across polls)
pub type RoomId = u32;

/// Segmented room
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    /// Label from the room-name table, if the device supplied one
    pub name: Option<String>,
    /// Outline in device pixels
    pub outline: Area,
}

impl Room {
    /// Room without a name
    pub fn new(id: RoomId, outline: Area) -> Self {
        Self {
            id,
            name: None,
            outline,
        }
    }

    /// Point used to anchor the room label
    pub fn label_anchor(&self) -> Option<Point> {
        self.outline.center()
    }
}

/// Running bounding box of the pixels of one room
#[derive(Clone, Copy, Debug)]
pub(crate) struct RoomBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl RoomBounds {
    pub fn new(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    pub fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Outline in device pixels, covering whole pixels
    pub fn to_area(self, left: i32, top: i32) -> Area {
        Area::rectangle(
            (self.min_x as i64 + left as i64) as f32,
            (self.min_y as i64 + top as i64) as f32,
            (self.max_x as i64 + 1 + left as i64) as f32,
            (self.max_y as i64 + 1 + top as i64) as f32,
        )
    }
}
