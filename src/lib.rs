//! # roborock-map
//!
//! Decoder and renderer for the binary map payload reported by robot vacuums.
//!
//! ## Overview
//!
//! A map payload is a sequence of tagged blocks: the occupancy bitmap with its
//! calibration, vector geometry (zones, walls, no-go areas, obstacles), paths
//! and metadata (map name, room names, charger and vacuum position). The crate
//! turns it into a [`MapData`] model and renders that model as a PNG under a
//! configurable colour scheme and scale/rotate/trim transform.
//!
//! ## Pipeline
//!
//! ```text
//! transport ──► payload::decode ──► render::render ──► attributes::extract
//!                                                          │
//!                            status::StatusMachine ◄───────┘
//! ```
//!
//! - [`payload`]: block parser (optionally gzip/zlib compressed input)
//! - [`config`]: defaults plus dotted-path overrides (`transform.trim.left = 10`)
//! - [`render`]: bitmap expansion, drawables in z-order, transform, PNG
//! - [`attributes`]: named values published with the image
//! - [`status`]: status across poll cycles and what gets published
//! - [`camera`]: per-device poll cycle with atomic publication
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use roborock_map::{RenderConfig, decode, render};
//!
//! let config = RenderConfig::resolve(&["transform.rotate=90".parse()?]);
//! let model = decode(&raw, &config)?;
//! let image = render(&model, &config)?;
//! std::fs::write("map.png", &image.png)?;
//! ```
//!
//! ## Coordinate System
//!
//! Geometry is kept in device pixels: x grows to the right, y grows down,
//! origin at the device's pixel (0, 0). The bitmap occupies
//! `[left, left + width) × [top, top + height)`. Calibration maps device
//! pixels to millimetres.

// Named attributes published with the map
pub mod attributes;

// Per-device poll cycle
pub mod camera;

// Render and camera configuration
pub mod config;

// Geometry primitives
pub mod core;

// Error types
pub mod error;

// Decoded map model
pub mod map;

// Binary payload decoding
pub mod payload;

// PNG rendering
pub mod render;

// Map status machine
pub mod status;

pub use attributes::{AttributeName, AttributeValue, extract};
pub use camera::{FileTransport, MapCamera, MapPoller, MapTransport, Snapshot, TransportResponse};
pub use config::{CameraConfig, ConfigOverride, Drawable, ImageTransform, RenderConfig, Rotation};
pub use crate::core::{Area, Obstacle, Path, PathKind, Point, Position, Wall};
pub use error::{ConfigError, DecodeError, Error, RenderError, Result, TransportError};
pub use map::{MapData, MapImage, Room, RoomId};
pub use payload::{PayloadBuilder, decode};
pub use render::{RenderedMap, render};
pub use status::{MapStatus, StatusMachine};
