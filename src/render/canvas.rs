//! Rasterisation primitives over an RGBA canvas.
//!
//! Shapes are first rasterised into a [`Mask`] and then blended once, so
//! overlapping segments of a translucent path do not darken each other.

use image::{Rgba, RgbaImage};

use crate::config::Color;
use crate::core::Point;

use super::font;

/// Coverage mask with a dirty bounding box
#[derive(Clone, Debug)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
    // Inclusive dirty box (min_x, min_y, max_x, max_y)
    dirty: Option<(u32, u32, u32, u32)>,
}

impl Mask {
    /// Empty mask for a `width` × `height` canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
            dirty: None,
        }
    }

    /// Mask sized to a canvas
    pub fn for_canvas(canvas: &RgbaImage) -> Self {
        Self::new(canvas.width(), canvas.height())
    }

    /// True when nothing is covered
    pub fn is_empty(&self) -> bool {
        self.dirty.is_none()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Cover one pixel; out-of-canvas coordinates are ignored
    #[inline]
    pub fn set(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        self.bits[y as usize * self.width as usize + x as usize] = true;
        self.dirty = Some(match self.dirty {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    /// Row range of the canvas a shape spanning `[lo, hi]` can touch
    fn clamp_rows(&self, lo: f32, hi: f32) -> Option<(i64, i64)> {
        Self::clamp_span(lo, hi, self.height)
    }

    fn clamp_cols(&self, lo: f32, hi: f32) -> Option<(i64, i64)> {
        Self::clamp_span(lo, hi, self.width)
    }

    fn clamp_span(lo: f32, hi: f32, extent: u32) -> Option<(i64, i64)> {
        if !lo.is_finite() || !hi.is_finite() || extent == 0 {
            return None;
        }
        let start = (lo.floor() as i64).max(0);
        let end = (hi.ceil() as i64).min(extent as i64 - 1);
        (start <= end).then_some((start, end))
    }

    /// Even-odd scanline fill, sampling at pixel centres
    ///
    /// Returns `false` (and covers nothing) for degenerate polygons.
    pub fn fill_polygon(&mut self, vertices: &[Point]) -> bool {
        if vertices.len() < 3 || vertices.iter().any(|p| !p.is_finite()) {
            return false;
        }
        let (min_y, max_y) = vertices
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        let Some((row_start, row_end)) = self.clamp_rows(min_y, max_y) else {
            return true;
        };

        let mut crossings: Vec<f32> = Vec::with_capacity(vertices.len());
        for y in row_start..=row_end {
            let yc = y as f32 + 0.5;
            crossings.clear();
            for (i, a) in vertices.iter().enumerate() {
                let b = vertices[(i + 1) % vertices.len()];
                if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                    crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(|l, r| l.total_cmp(r));
            for pair in crossings.chunks_exact(2) {
                // Pixels whose centre lies in [x0, x1)
                let first = (pair[0] - 0.5).ceil() as i64;
                let last = (pair[1] - 0.5).ceil() as i64 - 1;
                for x in first.max(0)..=last.min(self.width as i64 - 1) {
                    self.set(x, y);
                }
            }
        }
        true
    }

    /// Filled disc; always covers at least the pixel containing the centre
    pub fn fill_circle(&mut self, center: Point, radius: f32) {
        if !center.is_finite() || !radius.is_finite() {
            return;
        }
        let radius = radius.max(0.0);
        self.set(center.x.floor() as i64, center.y.floor() as i64);
        let Some((row_start, row_end)) = self.clamp_rows(center.y - radius, center.y + radius) else {
            return;
        };
        let Some((col_start, col_end)) = self.clamp_cols(center.x - radius, center.x + radius) else {
            return;
        };
        let r2 = radius * radius;
        for y in row_start..=row_end {
            let dy = y as f32 + 0.5 - center.y;
            for x in col_start..=col_end {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    self.set(x, y);
                }
            }
        }
    }

    /// Ring of the given stroke width centred on the circle
    pub fn stroke_circle(&mut self, center: Point, radius: f32, width: f32) {
        if !center.is_finite() || !radius.is_finite() || !width.is_finite() {
            return;
        }
        let outer = radius + width * 0.5;
        let inner = (radius - width * 0.5).max(0.0);
        let Some((row_start, row_end)) = self.clamp_rows(center.y - outer, center.y + outer) else {
            return;
        };
        let Some((col_start, col_end)) = self.clamp_cols(center.x - outer, center.x + outer) else {
            return;
        };
        for y in row_start..=row_end {
            let dy = y as f32 + 0.5 - center.y;
            for x in col_start..=col_end {
                let dx = x as f32 + 0.5 - center.x;
                let d2 = dx * dx + dy * dy;
                if d2 <= outer * outer && d2 >= inner * inner {
                    self.set(x, y);
                }
            }
        }
    }

    /// Line segment of the given width with round caps
    pub fn line(&mut self, a: Point, b: Point, width: f32) {
        if !a.is_finite() || !b.is_finite() || !width.is_finite() {
            return;
        }
        let half = width.max(0.0) * 0.5;
        if half < 0.75 {
            self.thin_line(a, b);
            return;
        }

        let Some((row_start, row_end)) = self.clamp_rows(a.y.min(b.y) - half, a.y.max(b.y) + half) else {
            return;
        };
        let Some((col_start, col_end)) = self.clamp_cols(a.x.min(b.x) - half, a.x.max(b.x) + half) else {
            return;
        };
        let d = b - a;
        let len2 = d.x * d.x + d.y * d.y;
        for y in row_start..=row_end {
            for x in col_start..=col_end {
                let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len2 > 0.0 {
                    (((p.x - a.x) * d.x + (p.y - a.y) * d.y) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let closest = Point::new(a.x + t * d.x, a.y + t * d.y);
                if p.distance(&closest) <= half {
                    self.set(x, y);
                }
            }
        }
    }

    /// One-pixel Bresenham line
    fn thin_line(&mut self, a: Point, b: Point) {
        let (mut x0, mut y0) = (a.x.floor() as i64, a.y.floor() as i64);
        let (x1, y1) = (b.x.floor() as i64, b.y.floor() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        // Bound the walk so wild coordinates cannot spin for long
        let max_steps = (self.width as i64 + self.height as i64) * 4 + dx.max(-dy).min(1 << 20);
        for _ in 0..=max_steps {
            self.set(x0, y0);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Connected segments; fewer than two points draws nothing
    pub fn polyline(&mut self, points: &[Point], width: f32) -> bool {
        if points.len() < 2 {
            return false;
        }
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width);
        }
        true
    }

    /// Closed outline
    pub fn stroke_polygon(&mut self, vertices: &[Point], width: f32) -> bool {
        if vertices.len() < 2 {
            return false;
        }
        self.polyline(vertices, width);
        if let (Some(&first), Some(&last)) = (vertices.first(), vertices.last()) {
            self.line(last, first, width);
        }
        true
    }

    /// Bitmap text with its top-left corner at `origin`
    pub fn text(&mut self, origin: Point, text: &str, scale: u32) {
        let scale = scale.max(1) as i64;
        let ox = origin.x.round() as i64;
        let oy = origin.y.round() as i64;
        for (i, c) in text.chars().enumerate() {
            let glyph = font::glyph(c);
            let gx = ox + i as i64 * font::ADVANCE as i64 * scale;
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..font::GLYPH_WIDTH {
                    if bits & (1 << (font::GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.set(gx + col as i64 * scale + sx, oy + row as i64 * scale + sy);
                        }
                    }
                }
            }
        }
    }
}

/// Source-over blend of `color` onto `dst`
#[inline]
pub fn blend(dst: &mut Rgba<u8>, color: Color) {
    match color.a {
        0 => {}
        255 => *dst = Rgba(color.to_array()),
        a => {
            let sa = a as u32;
            let da = dst[3] as u32;
            // out_a = sa + da * (1 - sa), in 0..=255 fixed point
            let out_a = sa * 255 + da * (255 - sa);
            if out_a == 0 {
                *dst = Rgba([0, 0, 0, 0]);
                return;
            }
            let channel = |s: u8, d: u8| -> u8 {
                let num = s as u32 * sa * 255 + d as u32 * da * (255 - sa);
                ((num + out_a / 2) / out_a) as u8
            };
            *dst = Rgba([
                channel(color.r, dst[0]),
                channel(color.g, dst[1]),
                channel(color.b, dst[2]),
                ((out_a + 127) / 255) as u8,
            ]);
        }
    }
}

/// Blend every covered pixel of `mask` once
pub fn paint(canvas: &mut RgbaImage, mask: &Mask, color: Color) {
    let Some((x0, y0, x1, y1)) = mask.dirty else {
        return;
    };
    for y in y0..=y1 {
        for x in x0..=x1 {
            if mask.get(x, y) {
                blend(canvas.get_pixel_mut(x, y), color);
            }
        }
    }
}
