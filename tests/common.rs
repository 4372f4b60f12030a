//! Test utilities for roborock-map integration tests.
//!
//! Payload fixtures, compression helpers and a scripted transport.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use roborock_map::core::{PathKind, Point};
use roborock_map::error::TransportError;
use roborock_map::{MapTransport, PayloadBuilder, TransportResponse};

/// Pixel code of a room pixel
pub fn room_code(id: u8) -> u8 {
    (id << 3) | 0x07
}

/// Square image filled with a single room
pub fn single_room_builder(size: u32, room: u8) -> PayloadBuilder {
    let mut builder = PayloadBuilder::new();
    builder.image(0, 0, size, size, &vec![room_code(room); (size * size) as usize]);
    builder
}

/// Payload with room 1, the vacuum inside it and optionally its name
pub fn kitchen_payload(named: bool) -> Vec<u8> {
    let mut builder = single_room_builder(10, 1);
    builder.robot_position(Point::new(5.0, 5.0), Some(0.0));
    if named {
        builder.room_names(&[(1, "Kitchen")]);
    }
    builder.build()
}

/// Payload containing only an empty image block
pub fn empty_payload() -> Vec<u8> {
    let mut builder = PayloadBuilder::new();
    builder.empty_image();
    builder.build()
}

/// Payload exercising every block type
pub fn full_builder() -> PayloadBuilder {
    const W: u32 = 24;
    const H: u32 = 16;
    let codes: Vec<u8> = (0..W * H)
        .map(|i| {
            let (x, y) = (i % W, i / W);
            match (x, y) {
                (0, _) | (_, 0) => 0x01,
                _ if x == W - 1 || y == H - 1 => 0x01,
                _ if x < W / 2 => room_code(1),
                _ => room_code(2),
            }
        })
        .collect();
    let carpet: Vec<u8> = (0..W * H).map(|i| u8::from(i % W == 3)).collect();
    let quad = |x0: f32, y0: f32, x1: f32, y1: f32| {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    };

    let mut builder = PayloadBuilder::new();
    builder
        .map_index(1)
        .map_sequence(42)
        .image(0, 0, W, H, &codes)
        .charger(Point::new(2.0, 2.0))
        .robot_position(Point::new(5.0, 8.0), Some(45.0))
        .goto_target(Point::new(20.0, 12.0))
        .path(
            PathKind::Actual,
            &[Point::new(2.0, 2.0), Point::new(5.0, 5.0), Point::new(5.0, 8.0)],
        )
        .path(PathKind::Predicted, &[Point::new(5.0, 8.0), Point::new(20.0, 12.0)])
        .path(PathKind::Goto, &[Point::new(5.0, 8.0), Point::new(8.0, 9.0)])
        .path(PathKind::Mop, &[Point::new(3.0, 3.0), Point::new(9.0, 3.0)])
        .zones(&[(Point::new(14.0, 2.0), Point::new(20.0, 6.0))])
        .virtual_walls(&[(Point::new(12.0, 1.0), Point::new(12.0, 14.0))])
        .no_go_areas(&[quad(15.0, 9.0, 18.0, 12.0)])
        .no_mopping_areas(&[quad(2.0, 10.0, 5.0, 13.0)])
        .no_carpet_areas(&[quad(6.0, 10.0, 8.0, 12.0)])
        .cleaned_rooms(&[1])
        .obstacles(&[(Point::new(9.0, 4.0), 1, 80)])
        .ignored_obstacles(&[(Point::new(10.0, 6.0), 2, 40)])
        .obstacles_with_photo(&[(Point::new(16.0, 4.0), 3, 90, 1001)])
        .ignored_obstacles_with_photo(&[(Point::new(17.0, 13.0), 4, 30, 1002)])
        .carpet(&carpet)
        .map_name("Ground floor")
        .room_names(&[(1, "Kitchen"), (2, "Living room")])
        .digest(&[0xAB; 20]);
    builder
}

/// Full fixture as bytes
pub fn full_payload() -> Vec<u8> {
    full_builder().build()
}

/// Adler-32 checksum
pub fn adler32(data: &[u8]) -> u32 {
    let (mut a, mut b) = (1u32, 0u32);
    for &byte in data {
        a = (a + u32::from(byte)) % 65521;
        b = (b + a) % 65521;
    }
    (b << 16) | a
}

/// CRC-32 (IEEE) checksum
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// Raw deflate stream made of stored blocks
fn deflate_stored(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut chunks = data.chunks(0xFFFF).peekable();
    if chunks.peek().is_none() {
        out.extend_from_slice(&[0x01, 0x00, 0x00, 0xFF, 0xFF]);
        return out;
    }
    while let Some(chunk) = chunks.next() {
        let last = chunks.peek().is_none();
        out.push(u8::from(last));
        let len = chunk.len() as u16;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(chunk);
    }
    out
}

/// zlib stream wrapping `data` without compression
pub fn zlib_stored(data: &[u8]) -> Vec<u8> {
    let mut out = vec![0x78, 0x01];
    out.extend(deflate_stored(data));
    out.extend_from_slice(&adler32(data).to_be_bytes());
    out
}

/// gzip member wrapping `data` without compression
pub fn gzip_stored(data: &[u8]) -> Vec<u8> {
    let mut out = vec![0x1F, 0x8B, 0x08, 0x00, 0, 0, 0, 0, 0x00, 0xFF];
    out.extend(deflate_stored(data));
    out.extend_from_slice(&crc32(data).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out
}

/// Transport replaying a fixed sequence of responses, then timing out
pub struct ScriptedTransport {
    responses: Mutex<Vec<Result<TransportResponse, String>>>,
    calls: Mutex<usize>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<TransportResponse, String>>) -> Arc<Self> {
        let mut responses = responses;
        responses.reverse();
        Arc::new(Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(0),
        })
    }

    /// Transport answering with the given payloads in order
    pub fn bytes(payloads: Vec<Vec<u8>>) -> Arc<Self> {
        Self::new(
            payloads
                .into_iter()
                .map(|p| Ok(TransportResponse::Bytes(p)))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

impl MapTransport for ScriptedTransport {
    fn send(&self, _device_id: &str, _command: &str) -> Result<TransportResponse, TransportError> {
        *self.calls.lock() += 1;
        match self.responses.lock().pop() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Other(message)),
            None => Err(TransportError::Timeout),
        }
    }
}
