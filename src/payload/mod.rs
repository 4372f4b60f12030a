//! Binary map payload: decoder, block tags and a matching writer.
//!
//! ```rust,ignore
//! use roborock_map::config::RenderConfig;
//! use roborock_map::payload;
//!
//! let map = payload::decode(&bytes, &RenderConfig::default())?;
//! println!("{} rooms", map.rooms.len());
//! ```

mod block;
mod builder;
mod decoder;
mod reader;

pub use block::{BLOCK_HEADER_LEN, BlockType};
pub use builder::{DEFAULT_CALIBRATION, PayloadBuilder};
pub use decoder::{FILE_HEADER_LEN, MAGIC, decode, inflate};
pub use reader::ByteReader;
