//! Geometry model produced by the payload decoder.
//!
//! [`MapData`] is built fresh on every successful decode and never mutated
//! afterwards; the camera shares it behind an `Arc` once published.
//!
//! Every collection is ordered (`Vec`, `BTreeMap`, `BTreeSet`) so iteration,
//! and therefore rendering, is deterministic for identical payloads.

mod calibration;
mod image;
mod room;

pub use calibration::{Calibration, CalibrationPoint};
pub use image::{
    ImageSummary, MapImage, PIXEL_FLOOR, PIXEL_OUTSIDE, PIXEL_ROOM, PIXEL_WALL, PIXEL_WALL_V2,
    PixelType,
};
pub use room::{Room, RoomId};

pub(crate) use room::RoomBounds;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::ImageTransform;
use crate::core::{Area, Obstacle, Path, PathKind, Point, Position, Wall};

/// Real-world reference points (millimetres) published as calibration
const CALIBRATION_REFERENCES_MM: [Point; 3] = [
    Point::new(0.0, 0.0),
    Point::new(1000.0, 0.0),
    Point::new(0.0, 1000.0),
];

/// Payload header fields
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MapHeader {
    /// Format major version
    pub version_major: u16,
    /// Format minor version
    pub version_minor: u16,
    /// Map slot index on the device
    pub map_index: u32,
    /// Incrementing map revision counter
    pub map_sequence: u32,
}

/// Decoded map
#[derive(Clone, Debug, PartialEq)]
pub struct MapData {
    /// Payload header
    pub header: MapHeader,
    /// Pixel ↔ millimetre mapping (present whenever the image is non-empty)
    pub calibration: Option<Calibration>,
    /// Bitmap
    pub image: MapImage,
    /// Render transform the map was decoded for (used for calibration points)
    pub transform: ImageTransform,
    /// Charging dock
    pub charger: Option<Point>,
    /// Vacuum pose
    pub vacuum_position: Option<Position>,
    /// Room the vacuum is in
    pub vacuum_room: Option<RoomId>,
    /// Name of the room the vacuum is in
    pub vacuum_room_name: Option<String>,
    /// Segmented rooms by id
    pub rooms: BTreeMap<RoomId, Room>,
    /// Virtual walls
    pub walls: Vec<Wall>,
    /// Zones being cleaned
    pub zones: Vec<Area>,
    /// No-go areas
    pub no_go_areas: Vec<Area>,
    /// No-mopping areas
    pub no_mopping_areas: Vec<Area>,
    /// No-carpet areas
    pub no_carpet_areas: Vec<Area>,
    /// Detected carpet, as one-pixel-tall runs
    pub carpet_map: Vec<Area>,
    /// Driven path
    pub path: Path,
    /// Planned path to the go-to target
    pub predicted_path: Path,
    /// Mop path
    pub mop_path: Path,
    /// Path driven towards the go-to target
    pub goto_path: Path,
    /// Go-to target
    pub goto: Option<Point>,
    /// Obstacles
    pub obstacles: Vec<Obstacle>,
    /// Obstacles with photo
    pub obstacles_with_photo: Vec<Obstacle>,
    /// Ignored obstacles
    pub ignored_obstacles: Vec<Obstacle>,
    /// Ignored obstacles with photo
    pub ignored_obstacles_with_photo: Vec<Obstacle>,
    /// Rooms cleaned in the current job
    pub cleaned_rooms: BTreeSet<RoomId>,
    /// Map name
    pub map_name: Option<String>,
}

impl MapData {
    /// Map with no explored area
    pub fn empty(header: MapHeader, transform: ImageTransform) -> Self {
        Self {
            header,
            calibration: None,
            image: MapImage::empty(),
            transform,
            charger: None,
            vacuum_position: None,
            vacuum_room: None,
            vacuum_room_name: None,
            rooms: BTreeMap::new(),
            walls: Vec::new(),
            zones: Vec::new(),
            no_go_areas: Vec::new(),
            no_mopping_areas: Vec::new(),
            no_carpet_areas: Vec::new(),
            carpet_map: Vec::new(),
            path: Path::empty(PathKind::Actual),
            predicted_path: Path::empty(PathKind::Predicted),
            mop_path: Path::empty(PathKind::Mop),
            goto_path: Path::empty(PathKind::Goto),
            goto: None,
            obstacles: Vec::new(),
            obstacles_with_photo: Vec::new(),
            ignored_obstacles: Vec::new(),
            ignored_obstacles_with_photo: Vec::new(),
            cleaned_rooms: BTreeSet::new(),
            map_name: None,
        }
    }

    /// True when the device reported no explored area
    pub fn is_empty(&self) -> bool {
        self.image.is_empty
    }

    /// Name of a room, if known
    pub fn room_name(&self, id: RoomId) -> Option<&str> {
        self.rooms.get(&id).and_then(|room| room.name.as_deref())
    }

    /// Path of the given kind
    pub fn path(&self, kind: PathKind) -> &Path {
        match kind {
            PathKind::Actual => &self.path,
            PathKind::Predicted => &self.predicted_path,
            PathKind::Mop => &self.mop_path,
            PathKind::Goto => &self.goto_path,
        }
    }

    /// Reference points mapping millimetres to rendered image pixels
    ///
    /// Accounts for the scale/rotate/trim transform the map was decoded for.
    /// Empty for maps without calibration.
    pub fn calibration_points(&self) -> Vec<CalibrationPoint> {
        let Some(calibration) = self.calibration else {
            return Vec::new();
        };
        if self.image.is_empty {
            return Vec::new();
        }

        CALIBRATION_REFERENCES_MM
            .iter()
            .map(|&vacuum| {
                let device = calibration.to_pixel(vacuum);
                let canvas = self.image.to_canvas(device);
                let map = self
                    .transform
                    .map_point(canvas, self.image.width, self.image.height);
                CalibrationPoint { vacuum, map }
            })
            .collect()
    }

    /// Drop all geometry, keeping header and transform (used for empty maps)
    pub(crate) fn clear_geometry(&mut self) {
        *self = Self::empty(self.header, self.transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Rotation, Trim};

    fn sample_map() -> MapData {
        let mut map = MapData::empty(MapHeader::default(), ImageTransform::default());
        map.image = MapImage {
            top: 0,
            left: 0,
            width: 100,
            height: 100,
            pixels: vec![PixelType::Floor; 100 * 100],
            is_empty: false,
        };
        // 10 mm per pixel, origin at the top-left corner
        map.calibration = Some(Calibration {
            scale_x: 10.0,
            offset_x: 0.0,
            scale_y: 10.0,
            offset_y: 0.0,
        });
        map
    }

    #[test]
    fn test_empty_map_has_no_calibration_points() {
        let map = MapData::empty(MapHeader::default(), ImageTransform::default());
        assert!(map.is_empty());
        assert!(map.calibration_points().is_empty());
    }

    #[test]
    fn test_calibration_points_identity_transform() {
        let map = sample_map();
        let points = map.calibration_points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].map, Point::new(0.0, 0.0));
        assert_eq!(points[1].map, Point::new(100.0, 0.0));
        assert_eq!(points[2].map, Point::new(0.0, 100.0));
    }

    #[test]
    fn test_calibration_points_follow_transform() {
        let mut map = sample_map();
        map.transform = ImageTransform {
            scale: 2.0,
            rotate: Rotation::Deg0,
            trim: Trim {
                left: 10.0,
                ..Trim::default()
            },
        };
        let points = map.calibration_points();
        // 200 px wide after scaling, 20 px trimmed from the left
        assert_eq!(points[0].map, Point::new(-20.0, 0.0));
        assert_eq!(points[1].map, Point::new(180.0, 0.0));
    }

    #[test]
    fn test_calibration_points_follow_rotation() {
        let mut map = sample_map();
        map.transform.rotate = Rotation::Deg90;
        let points: Vec<Point> = map.calibration_points().iter().map(|p| p.map).collect();
        assert_eq!(
            points,
            vec![Point::new(0.0, 100.0), Point::new(0.0, 0.0), Point::new(100.0, 100.0)]
        );

        map.transform.rotate = Rotation::Deg270;
        map.transform.scale = 2.0;
        let points: Vec<Point> = map.calibration_points().iter().map(|p| p.map).collect();
        assert_eq!(
            points,
            vec![Point::new(200.0, 0.0), Point::new(200.0, 200.0), Point::new(0.0, 0.0)]
        );
    }

    #[test]
    fn test_clear_geometry_keeps_header() {
        let mut map = sample_map();
        map.header.map_sequence = 7;
        map.goto = Some(Point::new(1.0, 1.0));
        map.clear_geometry();
        assert!(map.is_empty());
        assert_eq!(map.goto, None);
        assert_eq!(map.header.map_sequence, 7);
    }
}
