//! Writer for the map payload format.
//!
//! Produces byte-exact payloads for fixtures, tests and the CLI's sample
//! output. Blocks are emitted in call order.

use crate::core::{Area, PathKind, Point};

use super::block::{BLOCK_HEADER_LEN, BlockType};
use super::decoder::{FILE_HEADER_LEN, MAGIC};

/// Default calibration: 50 mm per pixel, origin at pixel (0, 0)
pub const DEFAULT_CALIBRATION: [Point; 4] = [
    Point::new(0.0, 0.0),
    Point::new(0.0, 0.0),
    Point::new(100.0, 100.0),
    Point::new(5000.0, 5000.0),
];

/// Payload writer
#[derive(Clone, Debug, Default)]
pub struct PayloadBuilder {
    version_major: u16,
    version_minor: u16,
    map_index: u32,
    map_sequence: u32,
    blocks: Vec<u8>,
}

fn put_point(out: &mut Vec<u8>, p: Point) {
    let (x, y) = p.to_fixed();
    out.extend_from_slice(&x.to_le_bytes());
    out.extend_from_slice(&y.to_le_bytes());
}

fn count_header(count: usize) -> Vec<u8> {
    (count as u32).to_le_bytes().to_vec()
}

impl PayloadBuilder {
    /// Empty payload (version 1.0)
    pub fn new() -> Self {
        Self {
            version_major: 1,
            ..Self::default()
        }
    }

    /// Set the format version
    pub fn version(&mut self, major: u16, minor: u16) -> &mut Self {
        self.version_major = major;
        self.version_minor = minor;
        self
    }

    /// Set the map index
    pub fn map_index(&mut self, index: u32) -> &mut Self {
        self.map_index = index;
        self
    }

    /// Set the map sequence number
    pub fn map_sequence(&mut self, sequence: u32) -> &mut Self {
        self.map_sequence = sequence;
        self
    }

    /// Append a block with an arbitrary tag
    pub fn raw_block(&mut self, tag: u16, header: &[u8], data: &[u8]) -> &mut Self {
        let header_len = (BLOCK_HEADER_LEN + header.len()) as u16;
        self.blocks.extend_from_slice(&tag.to_le_bytes());
        self.blocks.extend_from_slice(&header_len.to_le_bytes());
        self.blocks.extend_from_slice(&(data.len() as u32).to_le_bytes());
        self.blocks.extend_from_slice(header);
        self.blocks.extend_from_slice(data);
        self
    }

    fn block(&mut self, block: BlockType, header: &[u8], data: &[u8]) -> &mut Self {
        self.raw_block(block.tag(), header, data)
    }

    /// Image block with the default calibration
    pub fn image(&mut self, top: i32, left: i32, width: u32, height: u32, codes: &[u8]) -> &mut Self {
        self.image_with_calibration(top, left, width, height, codes, DEFAULT_CALIBRATION)
    }

    /// Image block with explicit calibration `[pixel_a, mm_a, pixel_b, mm_b]`
    pub fn image_with_calibration(
        &mut self,
        top: i32,
        left: i32,
        width: u32,
        height: u32,
        codes: &[u8],
        calibration: [Point; 4],
    ) -> &mut Self {
        let mut header = Vec::with_capacity(48);
        header.extend_from_slice(&top.to_le_bytes());
        header.extend_from_slice(&left.to_le_bytes());
        header.extend_from_slice(&height.to_le_bytes());
        header.extend_from_slice(&width.to_le_bytes());
        for p in calibration {
            put_point(&mut header, p);
        }
        self.block(BlockType::Image, &header, codes)
    }

    /// Image block for a map with no explored area
    pub fn empty_image(&mut self) -> &mut Self {
        self.image(0, 0, 0, 0, &[])
    }

    /// Charger position
    pub fn charger(&mut self, p: Point) -> &mut Self {
        let mut data = Vec::new();
        put_point(&mut data, p);
        self.block(BlockType::Charger, &[], &data)
    }

    /// Go-to target
    pub fn goto_target(&mut self, p: Point) -> &mut Self {
        let mut data = Vec::new();
        put_point(&mut data, p);
        self.block(BlockType::GotoTarget, &[], &data)
    }

    /// Vacuum position with optional heading in degrees
    pub fn robot_position(&mut self, p: Point, angle: Option<f32>) -> &mut Self {
        let mut data = Vec::new();
        put_point(&mut data, p);
        if let Some(angle) = angle {
            data.extend_from_slice(&crate::core::to_fixed_point(angle).to_le_bytes());
        }
        self.block(BlockType::RobotPosition, &[], &data)
    }

    /// Path of the given kind
    pub fn path(&mut self, kind: PathKind, points: &[Point]) -> &mut Self {
        let block = match kind {
            PathKind::Actual => BlockType::Path,
            PathKind::Goto => BlockType::GotoPath,
            PathKind::Predicted => BlockType::GotoPredictedPath,
            PathKind::Mop => BlockType::MopPath,
        };
        let mut data = Vec::with_capacity(points.len() * 8);
        for &p in points {
            put_point(&mut data, p);
        }
        self.block(block, &count_header(points.len()), &data)
    }

    /// Cleaned zones as corner pairs
    pub fn zones(&mut self, rects: &[(Point, Point)]) -> &mut Self {
        let mut data = Vec::new();
        for &(a, b) in rects {
            put_point(&mut data, a);
            put_point(&mut data, b);
        }
        self.block(BlockType::CurrentlyCleanedZones, &count_header(rects.len()), &data)
    }

    /// Virtual walls
    pub fn virtual_walls(&mut self, walls: &[(Point, Point)]) -> &mut Self {
        let mut data = Vec::new();
        for &(a, b) in walls {
            put_point(&mut data, a);
            put_point(&mut data, b);
        }
        self.block(BlockType::VirtualWalls, &count_header(walls.len()), &data)
    }

    fn quads(&mut self, block: BlockType, quads: &[Vec<Point>]) -> &mut Self {
        let mut data = Vec::new();
        for quad in quads {
            for i in 0..4 {
                put_point(&mut data, quad.get(i).copied().unwrap_or(Point::ZERO));
            }
        }
        self.block(block, &count_header(quads.len()), &data)
    }

    /// No-go areas (four vertices each)
    pub fn no_go_areas(&mut self, quads: &[Vec<Point>]) -> &mut Self {
        self.quads(BlockType::NoGoAreas, quads)
    }

    /// No-mopping areas (four vertices each)
    pub fn no_mopping_areas(&mut self, quads: &[Vec<Point>]) -> &mut Self {
        self.quads(BlockType::NoMoppingAreas, quads)
    }

    /// No-carpet areas (four vertices each)
    pub fn no_carpet_areas(&mut self, quads: &[Vec<Point>]) -> &mut Self {
        self.quads(BlockType::NoCarpetAreas, quads)
    }

    /// Rooms cleaned in the current job
    pub fn cleaned_rooms(&mut self, ids: &[u8]) -> &mut Self {
        self.block(BlockType::CleanedRooms, &count_header(ids.len()), ids)
    }

    fn obstacle_block(&mut self, block: BlockType, obstacles: &[(Point, u16, u16, Option<u32>)]) -> &mut Self {
        let mut data = Vec::new();
        for &(p, kind, confidence, photo_id) in obstacles {
            put_point(&mut data, p);
            data.extend_from_slice(&kind.to_le_bytes());
            data.extend_from_slice(&confidence.to_le_bytes());
            if let Some(photo_id) = photo_id {
                data.extend_from_slice(&photo_id.to_le_bytes());
            }
        }
        self.block(block, &count_header(obstacles.len()), &data)
    }

    /// Obstacles as `(position, kind, confidence)`
    pub fn obstacles(&mut self, obstacles: &[(Point, u16, u16)]) -> &mut Self {
        let records: Vec<_> = obstacles.iter().map(|&(p, k, c)| (p, k, c, None)).collect();
        self.obstacle_block(BlockType::Obstacles, &records)
    }

    /// Ignored obstacles as `(position, kind, confidence)`
    pub fn ignored_obstacles(&mut self, obstacles: &[(Point, u16, u16)]) -> &mut Self {
        let records: Vec<_> = obstacles.iter().map(|&(p, k, c)| (p, k, c, None)).collect();
        self.obstacle_block(BlockType::IgnoredObstacles, &records)
    }

    /// Obstacles with photo as `(position, kind, confidence, photo_id)`
    pub fn obstacles_with_photo(&mut self, obstacles: &[(Point, u16, u16, u32)]) -> &mut Self {
        let records: Vec<_> = obstacles.iter().map(|&(p, k, c, id)| (p, k, c, Some(id))).collect();
        self.obstacle_block(BlockType::ObstaclesWithPhoto, &records)
    }

    /// Ignored obstacles with photo as `(position, kind, confidence, photo_id)`
    pub fn ignored_obstacles_with_photo(&mut self, obstacles: &[(Point, u16, u16, u32)]) -> &mut Self {
        let records: Vec<_> = obstacles.iter().map(|&(p, k, c, id)| (p, k, c, Some(id))).collect();
        self.obstacle_block(BlockType::IgnoredObstaclesWithPhoto, &records)
    }

    /// Carpet mask, one byte per image pixel
    pub fn carpet(&mut self, mask: &[u8]) -> &mut Self {
        self.block(BlockType::CarpetMap, &[], mask)
    }

    /// Map name
    pub fn map_name(&mut self, name: &str) -> &mut Self {
        self.block(BlockType::MapName, &[], name.as_bytes())
    }

    /// Room name table (names longer than 255 bytes are cut)
    pub fn room_names(&mut self, names: &[(u8, &str)]) -> &mut Self {
        let mut data = Vec::new();
        for &(id, name) in names {
            let bytes = &name.as_bytes()[..name.len().min(u8::MAX as usize)];
            data.push(id);
            data.push(bytes.len() as u8);
            data.extend_from_slice(bytes);
        }
        self.block(BlockType::RoomNames, &count_header(names.len()), &data)
    }

    /// Explicit room outlines
    pub fn room_outlines(&mut self, outlines: &[(u8, Vec<Point>)]) -> &mut Self {
        let mut data = Vec::new();
        for (id, vertices) in outlines {
            data.push(*id);
            data.extend_from_slice(&(vertices.len() as u16).to_le_bytes());
            for &p in vertices {
                put_point(&mut data, p);
            }
        }
        self.block(BlockType::RoomOutlines, &count_header(outlines.len()), &data)
    }

    /// Room outline from an [`Area`]
    pub fn room_outline(&mut self, id: u8, area: &Area) -> &mut Self {
        self.room_outlines(&[(id, area.vertices.clone())])
    }

    /// Trailing digest block (ignored by the decoder)
    pub fn digest(&mut self, digest: &[u8]) -> &mut Self {
        self.block(BlockType::Digest, &[], digest)
    }

    /// Offsets where each block ends, relative to the start of the payload
    pub fn block_boundaries(&self) -> Vec<usize> {
        let mut boundaries = Vec::new();
        let mut pos = 0;
        while pos + BLOCK_HEADER_LEN <= self.blocks.len() {
            let header_len = u16::from_le_bytes([self.blocks[pos + 2], self.blocks[pos + 3]]) as usize;
            let data_len = u32::from_le_bytes([
                self.blocks[pos + 4],
                self.blocks[pos + 5],
                self.blocks[pos + 6],
                self.blocks[pos + 7],
            ]) as usize;
            pos += header_len + data_len;
            boundaries.push(FILE_HEADER_LEN + pos);
        }
        boundaries
    }

    /// Serialize the payload
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FILE_HEADER_LEN + self.blocks.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&(FILE_HEADER_LEN as u16).to_le_bytes());
        out.extend_from_slice(&(self.blocks.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.version_major.to_le_bytes());
        out.extend_from_slice(&self.version_minor.to_le_bytes());
        out.extend_from_slice(&self.map_index.to_le_bytes());
        out.extend_from_slice(&self.map_sequence.to_le_bytes());
        out.extend_from_slice(&self.blocks);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let mut builder = PayloadBuilder::new();
        builder.version(1, 2).map_index(3).map_sequence(4);
        let bytes = builder.build();
        assert_eq!(bytes.len(), FILE_HEADER_LEN);
        assert_eq!(&bytes[0..2], b"rr");
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 20);
        assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 0);
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), 1);
        assert_eq!(u16::from_le_bytes([bytes[10], bytes[11]]), 2);
    }

    #[test]
    fn test_block_boundaries() {
        let mut builder = PayloadBuilder::new();
        builder.charger(Point::new(1.0, 2.0)).map_name("abc");
        assert_eq!(builder.block_boundaries(), vec![36, 47]);
        assert_eq!(builder.build().len(), 47);
    }
}
