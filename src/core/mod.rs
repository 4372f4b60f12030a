//! Core geometric types shared by the decoder, renderer and attribute extractor.
//!
//! All coordinates are expressed in device pixel units (the coordinate space of
//! the map bitmap reported by the vacuum). Conversion to real-world millimetres
//! goes through [`crate::map::Calibration`].
//!
//! ## Type Categories
//!
//! - [`Point`]: A single position, decoded from Q16.16 fixed-point
//! - [`Position`]: A point with optional heading (vacuum pose)
//! - [`Area`]: Closed polygon (zones, restricted areas, room outlines, carpet runs)
//! - [`Wall`]: Virtual wall segment
//! - [`Path`]: Ordered point sequence tagged with a [`PathKind`]
//! - [`Obstacle`]: Detected obstacle with kind, confidence and optional photo

mod point;
mod shapes;

pub use point::{FIXED_POINT_SHIFT, Point, Position, from_fixed_point, to_fixed_point};
pub use shapes::{Area, Obstacle, Path, PathKind, Wall};
