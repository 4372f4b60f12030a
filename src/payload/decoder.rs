//! Binary map payload decoder.
//!
//! Payload layout (all integers little-endian):
//!
//! ```text
//! file header (header_len bytes, >= 20)
//!   magic "rr" | header_len u16 | data_len u32 | version u16 u16 | map_index u32 | map_sequence u32
//! blocks (until header_len + data_len or the end of the buffer)
//!   type u16 | header_len u16 | data_len u32 | header_len - 8 header bytes | data_len data bytes
//! ```
//!
//! Unknown block types are skipped. A block that starts but does not finish
//! inside the buffer fails the whole decode; no partial model is returned.

use std::collections::BTreeMap;

use zune_inflate::{DeflateDecoder, DeflateOptions};

use crate::config::{ImageTransform, RenderConfig};
use crate::core::{Area, Obstacle, Path, PathKind, Point, Position, Wall, from_fixed_point};
use crate::error::DecodeError;
use crate::map::{Calibration, MapData, MapHeader, MapImage, PixelType, Room, RoomBounds, RoomId};

use super::block::{BLOCK_HEADER_LEN, BlockType};
use super::reader::ByteReader;

/// Payload magic
pub const MAGIC: [u8; 2] = *b"rr";

/// Minimum file header length
pub const FILE_HEADER_LEN: usize = 20;

/// Upper bound for inflated payloads
const MAX_INFLATED_LEN: usize = 64 * 1024 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const ZLIB_CMF: u8 = 0x78;

/// Decode a raw (optionally gzip/zlib compressed) payload
///
/// The render transform is captured so calibration points can be expressed
/// in output image pixels.
pub fn decode(raw: &[u8], config: &RenderConfig) -> Result<MapData, DecodeError> {
    let inflated = inflate(raw)?;
    let bytes = inflated.as_deref().unwrap_or(raw);
    Decoder::new(config.transform).decode(bytes)
}

/// Inflate gzip or zlib payloads; `None` for uncompressed input
pub fn inflate(raw: &[u8]) -> Result<Option<Vec<u8>>, DecodeError> {
    let options = DeflateOptions::default().set_limit(MAX_INFLATED_LEN);
    if raw.starts_with(&GZIP_MAGIC) {
        let mut decoder = DeflateDecoder::new_with_options(raw, options);
        let data = decoder
            .decode_gzip()
            .map_err(|e| DecodeError::Compression(format!("gzip: {e:?}")))?;
        log::debug!("Inflated gzip payload: {} -> {} bytes", raw.len(), data.len());
        return Ok(Some(data));
    }
    if raw.first() == Some(&ZLIB_CMF) && raw.len() >= 2 && is_zlib_header(raw[0], raw[1]) {
        let mut decoder = DeflateDecoder::new_with_options(raw, options);
        let data = decoder
            .decode_zlib()
            .map_err(|e| DecodeError::Compression(format!("zlib: {e:?}")))?;
        log::debug!("Inflated zlib payload: {} -> {} bytes", raw.len(), data.len());
        return Ok(Some(data));
    }
    Ok(None)
}

/// CMF/FLG check bits of a zlib stream header
#[inline]
fn is_zlib_header(cmf: u8, flg: u8) -> bool {
    ((u16::from(cmf) << 8) | u16::from(flg)) % 31 == 0
}

/// Convert a short read inside a complete block into a malformed-block error
fn in_block(block: BlockType) -> impl Fn(DecodeError) -> DecodeError {
    move |e| match e {
        DecodeError::Truncated { .. } => DecodeError::MalformedBlock {
            block: block.name(),
            reason: format!("content shorter than declared ({e})"),
        },
        other => other,
    }
}

fn malformed(block: BlockType, reason: impl Into<String>) -> DecodeError {
    DecodeError::MalformedBlock {
        block: block.name(),
        reason: reason.into(),
    }
}

/// Read a record count from the block header and check it against the data length
fn record_count(
    block: BlockType,
    header: &mut ByteReader<'_>,
    data: &ByteReader<'_>,
) -> Result<usize, DecodeError> {
    let count = header.u32().map_err(in_block(block))? as usize;
    let record_len = block.record_len().unwrap_or(1);
    let expected = count.checked_mul(record_len);
    if expected != Some(data.remaining()) {
        return Err(malformed(
            block,
            format!(
                "{count} records of {record_len} bytes do not fit {} data bytes",
                data.remaining()
            ),
        ));
    }
    Ok(count)
}

/// Raw image block contents kept until all blocks are read
struct RawImage<'a> {
    top: i32,
    left: i32,
    width: u32,
    height: u32,
    codes: &'a [u8],
}

/// Per-decode state
struct Decoder<'a> {
    model: MapData,
    image: Option<RawImage<'a>>,
    carpet: Option<&'a [u8]>,
    room_names: BTreeMap<RoomId, String>,
    room_outlines: BTreeMap<RoomId, Area>,
}

impl<'a> Decoder<'a> {
    fn new(transform: ImageTransform) -> Self {
        Self {
            model: MapData::empty(MapHeader::default(), transform),
            image: None,
            carpet: None,
            room_names: BTreeMap::new(),
            room_outlines: BTreeMap::new(),
        }
    }

    fn decode(mut self, bytes: &'a [u8]) -> Result<MapData, DecodeError> {
        let mut reader = ByteReader::new(bytes);

        let magic = reader.bytes(2)?;
        if magic != MAGIC {
            return Err(DecodeError::InvalidMagic([magic[0], magic[1]]));
        }
        let header_len = reader.u16()? as usize;
        if header_len < FILE_HEADER_LEN {
            return Err(DecodeError::InvalidHeader(format!(
                "file header length {header_len} is shorter than {FILE_HEADER_LEN}"
            )));
        }
        let data_len = reader.u32()? as usize;
        self.model.header = MapHeader {
            version_major: reader.u16()?,
            version_minor: reader.u16()?,
            map_index: reader.u32()?,
            map_sequence: reader.u32()?,
        };
        reader.skip(header_len - FILE_HEADER_LEN)?;

        // Tolerate a buffer shorter than declared as long as every block is whole
        let block_area_len = data_len.min(reader.remaining());
        if block_area_len < data_len {
            log::debug!(
                "Payload declares {} block bytes, {} present",
                data_len,
                block_area_len
            );
        }
        let mut blocks = reader.sub_reader(block_area_len)?;

        while !blocks.is_empty() {
            let block_offset = blocks.offset();
            let tag = blocks.u16()?;
            let block_header_len = blocks.u16()? as usize;
            let block_data_len = blocks.u32()? as usize;
            if block_header_len < BLOCK_HEADER_LEN {
                return Err(DecodeError::InvalidHeader(format!(
                    "block {tag} at offset {block_offset} has header length {block_header_len}"
                )));
            }
            let header = blocks.sub_reader(block_header_len - BLOCK_HEADER_LEN)?;
            let data = blocks.sub_reader(block_data_len)?;

            match BlockType::from_tag(tag) {
                Some(block) => {
                    log::trace!(
                        "Block {} at offset {} ({} data bytes)",
                        block.name(),
                        block_offset,
                        block_data_len
                    );
                    self.block(block, header, data)?;
                }
                None => log::debug!(
                    "Skipping unknown block type {} at offset {} ({} bytes)",
                    tag,
                    block_offset,
                    block_header_len + block_data_len
                ),
            }
        }

        self.finish()
    }

    fn block(
        &mut self,
        block: BlockType,
        mut header: ByteReader<'a>,
        mut data: ByteReader<'a>,
    ) -> Result<(), DecodeError> {
        let err = in_block(block);
        match block {
            BlockType::Charger => self.model.charger = Some(data.point().map_err(err)?),
            BlockType::GotoTarget => self.model.goto = Some(data.point().map_err(err)?),
            BlockType::RobotPosition => {
                let point = data.point().map_err(&err)?;
                self.model.vacuum_position = Some(if data.remaining() >= 4 {
                    Position::with_angle(point, from_fixed_point(data.i32().map_err(&err)?))
                } else {
                    Position::new(point)
                });
            }
            BlockType::Image => self.image_block(header, data)?,
            BlockType::Path => self.model.path = Self::path(block, PathKind::Actual, header, data)?,
            BlockType::GotoPath => {
                self.model.goto_path = Self::path(block, PathKind::Goto, header, data)?
            }
            BlockType::GotoPredictedPath => {
                self.model.predicted_path = Self::path(block, PathKind::Predicted, header, data)?
            }
            BlockType::MopPath => self.model.mop_path = Self::path(block, PathKind::Mop, header, data)?,
            BlockType::CurrentlyCleanedZones => {
                let count = record_count(block, &mut header, &data)?;
                let mut zones = Vec::with_capacity(count);
                for _ in 0..count {
                    let a = data.point().map_err(&err)?;
                    let b = data.point().map_err(&err)?;
                    zones.push(Area::rectangle(a.x, a.y, b.x, b.y));
                }
                self.model.zones = zones;
            }
            BlockType::NoGoAreas => self.model.no_go_areas = Self::quads(block, header, data)?,
            BlockType::NoMoppingAreas => self.model.no_mopping_areas = Self::quads(block, header, data)?,
            BlockType::NoCarpetAreas => self.model.no_carpet_areas = Self::quads(block, header, data)?,
            BlockType::VirtualWalls => {
                let count = record_count(block, &mut header, &data)?;
                let mut walls = Vec::with_capacity(count);
                for _ in 0..count {
                    let start = data.point().map_err(&err)?;
                    let end = data.point().map_err(&err)?;
                    walls.push(Wall::new(start, end));
                }
                self.model.walls = walls;
            }
            BlockType::CleanedRooms => {
                let count = record_count(block, &mut header, &data)?;
                let ids = data.bytes(count).map_err(err)?;
                self.model.cleaned_rooms = ids.iter().map(|&id| RoomId::from(id)).collect();
            }
            BlockType::Obstacles => {
                self.model.obstacles = Self::obstacles(block, false, header, data)?
            }
            BlockType::IgnoredObstacles => {
                self.model.ignored_obstacles = Self::obstacles(block, false, header, data)?
            }
            BlockType::ObstaclesWithPhoto => {
                self.model.obstacles_with_photo = Self::obstacles(block, true, header, data)?
            }
            BlockType::IgnoredObstaclesWithPhoto => {
                self.model.ignored_obstacles_with_photo = Self::obstacles(block, true, header, data)?
            }
            BlockType::CarpetMap => {
                let len = data.remaining();
                self.carpet = Some(data.bytes(len).map_err(err)?);
            }
            BlockType::MapName => {
                let len = data.remaining();
                let raw = data.bytes(len).map_err(err)?;
                let name = std::str::from_utf8(raw)
                    .map_err(|e| malformed(block, format!("name is not UTF-8: {e}")))?;
                let name = name.trim_end_matches('\0');
                self.model.map_name = (!name.is_empty()).then(|| name.to_string());
            }
            BlockType::RoomNames => self.room_names_block(header, data)?,
            BlockType::RoomOutlines => self.room_outlines_block(header, data)?,
            BlockType::Digest => {}
        }
        Ok(())
    }

    fn image_block(&mut self, mut header: ByteReader<'a>, mut data: ByteReader<'a>) -> Result<(), DecodeError> {
        let block = BlockType::Image;
        let err = in_block(block);

        if data.is_empty() {
            // Empty maps may omit dimensions and calibration entirely
            self.image = None;
            self.model.calibration = match Self::calibration(&mut header) {
                Ok(calibration) => calibration,
                Err(e) => {
                    log::debug!("Dropping calibration of empty image: {}", e);
                    None
                }
            };
            return Ok(());
        }

        let top = header.i32().map_err(&err)?;
        let left = header.i32().map_err(&err)?;
        let height = header.u32().map_err(&err)?;
        let width = header.u32().map_err(&err)?;
        self.model.calibration = Self::calibration_after_dims(&mut header).map_err(&err)?;

        let expected = (width as usize).checked_mul(height as usize);
        if expected != Some(data.remaining()) {
            return Err(malformed(
                block,
                format!(
                    "{}x{} image does not match {} data bytes",
                    width,
                    height,
                    data.remaining()
                ),
            ));
        }
        let len = data.remaining();
        let codes = data.bytes(len).map_err(err)?;
        self.image = Some(RawImage {
            top,
            left,
            width,
            height,
            codes,
        });
        Ok(())
    }

    /// Calibration from a full image block header (dims included)
    fn calibration(header: &mut ByteReader<'_>) -> Result<Option<Calibration>, DecodeError> {
        header.skip(16)?;
        Self::calibration_after_dims(header)
    }

    /// Calibration from the four reference points following the dimensions
    fn calibration_after_dims(header: &mut ByteReader<'_>) -> Result<Option<Calibration>, DecodeError> {
        if header.is_empty() {
            return Ok(None);
        }
        let pixel_a = header.point()?;
        let mm_a = header.point()?;
        let pixel_b = header.point()?;
        let mm_b = header.point()?;
        Calibration::from_reference_points(pixel_a, mm_a, pixel_b, mm_b).map(Some)
    }

    fn path(
        block: BlockType,
        kind: PathKind,
        mut header: ByteReader<'a>,
        mut data: ByteReader<'a>,
    ) -> Result<Path, DecodeError> {
        let count = record_count(block, &mut header, &data)?;
        let points = (0..count)
            .map(|_| data.point())
            .collect::<Result<Vec<Point>, _>>()
            .map_err(in_block(block))?;
        Ok(Path::new(kind, points))
    }

    fn quads(block: BlockType, mut header: ByteReader<'a>, mut data: ByteReader<'a>) -> Result<Vec<Area>, DecodeError> {
        let count = record_count(block, &mut header, &data)?;
        (0..count)
            .map(|_| {
                let vertices = (0..4).map(|_| data.point()).collect::<Result<Vec<Point>, _>>()?;
                Ok(Area::new(vertices))
            })
            .collect::<Result<Vec<Area>, DecodeError>>()
            .map_err(in_block(block))
    }

    fn obstacles(
        block: BlockType,
        with_photo: bool,
        mut header: ByteReader<'a>,
        mut data: ByteReader<'a>,
    ) -> Result<Vec<Obstacle>, DecodeError> {
        let count = record_count(block, &mut header, &data)?;
        (0..count)
            .map(|_| {
                let position = data.point()?;
                let kind = data.u16()?;
                let confidence = data.u16()?;
                let photo_id = if with_photo { Some(data.u32()?) } else { None };
                Ok(Obstacle {
                    position,
                    kind,
                    confidence,
                    photo_id,
                })
            })
            .collect::<Result<Vec<Obstacle>, DecodeError>>()
            .map_err(in_block(block))
    }

    fn room_names_block(&mut self, mut header: ByteReader<'a>, mut data: ByteReader<'a>) -> Result<(), DecodeError> {
        let block = BlockType::RoomNames;
        let err = in_block(block);
        let count = header.u32().map_err(&err)?;
        let mut names = BTreeMap::new();
        for _ in 0..count {
            let id = RoomId::from(data.u8().map_err(&err)?);
            let len = data.u8().map_err(&err)? as usize;
            let raw = data.bytes(len).map_err(&err)?;
            let name = std::str::from_utf8(raw)
                .map_err(|e| malformed(block, format!("room {id} name is not UTF-8: {e}")))?;
            names.insert(id, name.to_string());
        }
        if !data.is_empty() {
            return Err(malformed(block, format!("{} trailing bytes", data.remaining())));
        }
        self.room_names = names;
        Ok(())
    }

    fn room_outlines_block(&mut self, mut header: ByteReader<'a>, mut data: ByteReader<'a>) -> Result<(), DecodeError> {
        let block = BlockType::RoomOutlines;
        let err = in_block(block);
        let count = header.u32().map_err(&err)?;
        let mut outlines = BTreeMap::new();
        for _ in 0..count {
            let id = RoomId::from(data.u8().map_err(&err)?);
            let vertex_count = data.u16().map_err(&err)?;
            let vertices = (0..vertex_count)
                .map(|_| data.point())
                .collect::<Result<Vec<Point>, _>>()
                .map_err(&err)?;
            outlines.insert(id, Area::new(vertices));
        }
        if !data.is_empty() {
            return Err(malformed(block, format!("{} trailing bytes", data.remaining())));
        }
        self.room_outlines = outlines;
        Ok(())
    }

    /// Assemble the model once every block has been read
    fn finish(mut self) -> Result<MapData, DecodeError> {
        let Some(raw) = self.image.take().filter(|raw| raw.width > 0 && raw.height > 0) else {
            log::debug!("Map has no explored area");
            let calibration = self.model.calibration;
            let map_name = self.model.map_name.take();
            self.model.clear_geometry();
            self.model.calibration = calibration;
            self.model.map_name = map_name;
            return Ok(self.model);
        };

        let Some(calibration) = self.model.calibration else {
            return Err(malformed(BlockType::Image, "non-empty image without calibration"));
        };

        self.model.image = MapImage {
            top: raw.top,
            left: raw.left,
            width: raw.width,
            height: raw.height,
            pixels: raw.codes.iter().map(|&code| PixelType::from_code(code)).collect(),
            is_empty: false,
        };
        log::debug!(
            "Decoded {}x{} map at ({}, {}), {:.1} mm/px",
            raw.width,
            raw.height,
            raw.left,
            raw.top,
            calibration.scale_x.abs()
        );

        if let Some(carpet) = self.carpet.take() {
            self.model.carpet_map = carpet_runs(&self.model.image, carpet)?;
        }
        self.build_rooms();
        self.locate_vacuum();
        Ok(self.model)
    }

    /// Rooms from bitmap bounding boxes, explicit outlines and the name table
    fn build_rooms(&mut self) {
        let image = &self.model.image;
        let mut bounds: BTreeMap<RoomId, RoomBounds> = BTreeMap::new();
        for y in 0..image.height {
            for x in 0..image.width {
                if let Some(id) = image.get(x, y).and_then(|p| p.room()) {
                    bounds
                        .entry(id)
                        .and_modify(|b| b.include(x, y))
                        .or_insert_with(|| RoomBounds::new(x, y));
                }
            }
        }

        let mut rooms: BTreeMap<RoomId, Room> = bounds
            .into_iter()
            .map(|(id, b)| (id, Room::new(id, b.to_area(image.left, image.top))))
            .collect();

        for (id, outline) in std::mem::take(&mut self.room_outlines) {
            if outline.is_degenerate() {
                log::debug!("Ignoring degenerate outline for room {}", id);
                continue;
            }
            rooms
                .entry(id)
                .and_modify(|room| room.outline = outline.clone())
                .or_insert_with(|| Room::new(id, outline));
        }

        for (id, name) in std::mem::take(&mut self.room_names) {
            rooms
                .entry(id)
                .or_insert_with(|| Room::new(id, Area::default()))
                .name = Some(name);
        }

        self.model.rooms = rooms;
    }

    fn locate_vacuum(&mut self) {
        let Some(position) = self.model.vacuum_position else {
            return;
        };
        let model = &self.model;
        let room = model
            .image
            .pixel_at(position.point)
            .and_then(|pixel| pixel.room())
            .or_else(|| {
                model
                    .rooms
                    .values()
                    .find(|room| room.outline.contains(position.point))
                    .map(|room| room.id)
            });
        self.model.vacuum_room = room;
        self.model.vacuum_room_name = room.and_then(|id| self.model.room_name(id)).map(str::to_string);
    }
}

/// Decode the carpet mask into one-pixel-tall rectangles in device pixels
fn carpet_runs(image: &MapImage, mask: &[u8]) -> Result<Vec<Area>, DecodeError> {
    let width = image.width as usize;
    if mask.len() != width * image.height as usize {
        return Err(malformed(
            BlockType::CarpetMap,
            format!(
                "{} bytes do not cover a {}x{} image",
                mask.len(),
                image.width,
                image.height
            ),
        ));
    }

    let mut runs = Vec::new();
    for (y, row) in mask.chunks_exact(width).enumerate() {
        let top = (y as i64 + image.top as i64) as f32;
        let mut x = 0;
        while x < width {
            if row[x] == 0 {
                x += 1;
                continue;
            }
            let start = x;
            while x < width && row[x] != 0 {
                x += 1;
            }
            let left = image.left as i64;
            runs.push(Area::rectangle(
                (start as i64 + left) as f32,
                top,
                (x as i64 + left) as f32,
                top + 1.0,
            ));
        }
    }
    Ok(runs)
}
