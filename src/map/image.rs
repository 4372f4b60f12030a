//! Decoded map bitmap.

use serde::Serialize;

use crate::core::Point;

use super::RoomId;

/// Pixel code for unexplored space
pub const PIXEL_OUTSIDE: u8 = 0x00;
/// Pixel code for explored floor outside any room
pub const PIXEL_FLOOR: u8 = 0xFF;
/// Low-bit marker for wall pixels
pub const PIXEL_WALL: u8 = 0x00;
/// Low-bit marker for the second wall variant
pub const PIXEL_WALL_V2: u8 = 0x01;
/// Low-bit marker for room pixels (room id in the upper five bits)
pub const PIXEL_ROOM: u8 = 0x07;

/// Classification of a single bitmap pixel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelType {
    /// Not explored
    Outside,
    /// Explored floor outside any segmented room
    Floor,
    /// Wall or obstacle detected by the lidar
    Wall,
    /// Floor belonging to a segmented room
    Room(RoomId),
    /// Code not understood by this decoder
    Unknown(u8),
}

impl PixelType {
    /// Classify a raw pixel code
    pub fn from_code(code: u8) -> Self {
        match code {
            PIXEL_OUTSIDE => PixelType::Outside,
            PIXEL_FLOOR => PixelType::Floor,
            _ => match code & 0x07 {
                PIXEL_WALL | PIXEL_WALL_V2 => PixelType::Wall,
                PIXEL_ROOM => PixelType::Room(RoomId::from(code >> 3)),
                _ => PixelType::Unknown(code),
            },
        }
    }

    /// Room id for room pixels
    pub fn room(&self) -> Option<RoomId> {
        match self {
            PixelType::Room(id) => Some(*id),
            _ => None,
        }
    }
}

/// Map bitmap positioned in device pixel space
#[derive(Clone, Debug, PartialEq)]
pub struct MapImage {
    /// Device pixel row of the first bitmap row
    pub top: i32,
    /// Device pixel column of the first bitmap column
    pub left: i32,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Classified pixels, row-major, top row first
    pub pixels: Vec<PixelType>,
    /// True when the device reported no explored area
    pub is_empty: bool,
}

impl MapImage {
    /// Image for a map with no explored area
    pub fn empty() -> Self {
        Self {
            top: 0,
            left: 0,
            width: 0,
            height: 0,
            pixels: Vec::new(),
            is_empty: true,
        }
    }

    /// Pixel at bitmap coordinates
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<PixelType> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Convert a device pixel point to bitmap (canvas) coordinates
    #[inline]
    pub fn to_canvas(&self, point: Point) -> Point {
        Point::new(point.x - self.left as f32, point.y - self.top as f32)
    }

    /// Convert bitmap coordinates back to device pixels
    #[inline]
    pub fn to_device(&self, point: Point) -> Point {
        Point::new(point.x + self.left as f32, point.y + self.top as f32)
    }

    /// Pixel under a device pixel point
    pub fn pixel_at(&self, point: Point) -> Option<PixelType> {
        let canvas = self.to_canvas(point);
        if !canvas.is_finite() || canvas.x < 0.0 || canvas.y < 0.0 {
            return None;
        }
        self.get(canvas.x.floor() as u32, canvas.y.floor() as u32)
    }

    /// Summary published through the `image` attribute
    pub fn summary(&self) -> ImageSummary {
        ImageSummary {
            top: self.top,
            left: self.left,
            width: self.width,
            height: self.height,
            is_empty: self.is_empty,
        }
    }
}

/// Dimensions and placement of the bitmap, without pixel data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ImageSummary {
    /// Device pixel row of the first bitmap row
    pub top: i32,
    /// Device pixel column of the first bitmap column
    pub left: i32,
    /// Bitmap width
    pub width: u32,
    /// Bitmap height
    pub height: u32,
    /// True when no area was explored
    pub is_empty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_classification() {
        assert_eq!(PixelType::from_code(0x00), PixelType::Outside);
        assert_eq!(PixelType::from_code(0xFF), PixelType::Floor);
        assert_eq!(PixelType::from_code(0x01), PixelType::Wall);
        assert_eq!(PixelType::from_code(0x08), PixelType::Wall);
        assert_eq!(PixelType::from_code((3 << 3) | 0x07), PixelType::Room(3));
        assert_eq!(PixelType::from_code(0x02), PixelType::Unknown(0x02));
    }

    #[test]
    fn test_pixel_at_uses_offset() {
        let image = MapImage {
            top: 10,
            left: 20,
            width: 2,
            height: 2,
            pixels: vec![
                PixelType::Floor,
                PixelType::Wall,
                PixelType::Room(1),
                PixelType::Outside,
            ],
            is_empty: false,
        };

        assert_eq!(image.pixel_at(Point::new(20.5, 10.5)), Some(PixelType::Floor));
        assert_eq!(image.pixel_at(Point::new(21.0, 10.0)), Some(PixelType::Wall));
        assert_eq!(image.pixel_at(Point::new(20.0, 11.9)), Some(PixelType::Room(1)));
        assert_eq!(image.pixel_at(Point::new(19.0, 10.0)), None);
        assert_eq!(image.pixel_at(Point::new(22.0, 10.0)), None);
    }
}
