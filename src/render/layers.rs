//! Bitmap expansion and drawable layers.

use image::{Rgba, RgbaImage};

use crate::config::{Color, Drawable, RenderConfig};
use crate::core::{Area, Obstacle, Path, Point};
use crate::map::{MapData, MapImage, PixelType};

use super::canvas::{Mask, paint};
use super::font;

/// Stroke width of zone, room and marker outlines
const OUTLINE_WIDTH: f32 = 1.0;

/// Expand the bitmap into a full-colour canvas
pub fn base_layer(image: &MapImage, config: &RenderConfig) -> RgbaImage {
    let colors = &config.colors;
    let rooms = config.is_enabled(Drawable::Rooms);
    RgbaImage::from_fn(image.width, image.height, |x, y| {
        let color = match image.get(x, y).unwrap_or(PixelType::Outside) {
            PixelType::Outside => colors.map_outside,
            PixelType::Floor => colors.map_inside,
            PixelType::Wall => colors.map_wall,
            PixelType::Room(id) if rooms => colors.room(id),
            PixelType::Room(_) => colors.map_inside,
            PixelType::Unknown(_) => colors.unknown,
        };
        // Bitmap colours are opaque; alpha only matters for overlays
        Rgba([color.r, color.g, color.b, 255])
    })
}

/// Draws drawables onto a canvas in device-pixel space shifted by the image origin
pub struct Painter<'a> {
    canvas: &'a mut RgbaImage,
    model: &'a MapData,
    config: &'a RenderConfig,
}

impl<'a> Painter<'a> {
    pub fn new(canvas: &'a mut RgbaImage, model: &'a MapData, config: &'a RenderConfig) -> Self {
        Self {
            canvas,
            model,
            config,
        }
    }

    #[inline]
    fn to_canvas(&self, p: Point) -> Point {
        self.model.image.to_canvas(p)
    }

    fn to_canvas_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.to_canvas(p)).collect()
    }

    fn mask(&self) -> Mask {
        Mask::new(self.canvas.width(), self.canvas.height())
    }

    /// Draw every enabled drawable in z-order
    pub fn draw_all(&mut self) {
        let config = self.config;
        for &drawable in &config.drawables {
            self.draw(drawable);
        }
    }

    /// Draw one drawable category
    pub fn draw(&mut self, drawable: Drawable) {
        let model = self.model;
        let config = self.config;
        let colors = &config.colors;
        let sizes = &config.sizes;
        match drawable {
            Drawable::Rooms => {
                let outlines: Vec<&Area> = model.rooms.values().map(|room| &room.outline).collect();
                self.outlines(&outlines, colors.room_outline, "room outline");
            }
            Drawable::Carpet => {
                let mut mask = self.mask();
                for run in &model.carpet_map {
                    mask.fill_polygon(&self.to_canvas_all(&run.vertices));
                }
                paint(self.canvas, &mask, colors.carpet);
            }
            Drawable::NoCarpetZones => self.areas(
                &model.no_carpet_areas,
                colors.no_carpet_zones,
                colors.no_carpet_zones_outline,
                "no-carpet area",
            ),
            Drawable::NoGoZones => self.areas(
                &model.no_go_areas,
                colors.no_go_zones,
                colors.no_go_zones_outline,
                "no-go area",
            ),
            Drawable::NoMoppingZones => self.areas(
                &model.no_mopping_areas,
                colors.no_mop_zones,
                colors.no_mop_zones_outline,
                "no-mopping area",
            ),
            Drawable::Zones => self.areas(&model.zones, colors.zones, colors.zones_outline, "zone"),
            Drawable::VirtualWalls => {
                let mut mask = self.mask();
                for wall in &model.walls {
                    mask.line(
                        self.to_canvas(wall.start),
                        self.to_canvas(wall.end),
                        sizes.virtual_wall_width,
                    );
                }
                paint(self.canvas, &mask, colors.virtual_walls);
            }
            Drawable::MopPath => self.path(&model.mop_path, colors.mop_path, sizes.mop_path_width),
            Drawable::Path => self.path(&model.path, colors.path, sizes.path_width),
            Drawable::GotoPath => self.path(&model.goto_path, colors.goto_path, sizes.path_width),
            Drawable::PredictedPath => {
                self.path(&model.predicted_path, colors.predicted_path, sizes.path_width)
            }
            Drawable::GotoTarget => {
                if let Some(target) = model.goto {
                    self.marker(target, sizes.obstacle_radius, colors.goto_target, None);
                }
            }
            Drawable::Obstacles => {
                self.obstacles(&model.obstacles, sizes.obstacle_radius, colors.obstacle)
            }
            Drawable::IgnoredObstacles => self.obstacles(
                &model.ignored_obstacles,
                sizes.ignored_obstacle_radius,
                colors.ignored_obstacle,
            ),
            Drawable::ObstaclesWithPhoto => self.obstacles(
                &model.obstacles_with_photo,
                sizes.obstacle_with_photo_radius,
                colors.obstacle_with_photo,
            ),
            Drawable::IgnoredObstaclesWithPhoto => self.obstacles(
                &model.ignored_obstacles_with_photo,
                sizes.ignored_obstacle_with_photo_radius,
                colors.ignored_obstacle_with_photo,
            ),
            Drawable::Charger => {
                if let Some(charger) = model.charger {
                    self.marker(
                        charger,
                        sizes.charger_radius,
                        colors.charger,
                        Some(colors.charger_outline),
                    );
                }
            }
            Drawable::VacuumPosition => {
                if let Some(position) = model.vacuum_position {
                    self.marker(
                        position.point,
                        sizes.vacuum_radius,
                        colors.robot,
                        Some(colors.robot_outline),
                    );
                }
            }
            Drawable::RoomNames => self.room_names(),
        }
    }

    /// Room labels centred on each room, rotated along with the canvas
    fn room_names(&mut self) {
        let mut mask = self.mask();
        for room in self.model.rooms.values() {
            let Some(anchor) = room.label_anchor() else {
                continue;
            };
            let label = room.name.clone().unwrap_or_else(|| room.id.to_string());
            let (tw, th) = font::text_size(&label, 1);
            let center = self.to_canvas(anchor);
            mask.text(center.offset(-(tw as f32) / 2.0, -(th as f32) / 2.0), &label, 1);
        }
        paint(self.canvas, &mask, self.config.colors.room_names);
    }

    fn areas(&mut self, areas: &[Area], fill: Color, outline: Color, what: &str) {
        let mut fill_mask = self.mask();
        let mut outline_mask = self.mask();
        for area in areas {
            if area.is_degenerate() {
                log::trace!("Skipping degenerate {}", what);
                continue;
            }
            let vertices = self.to_canvas_all(&area.vertices);
            fill_mask.fill_polygon(&vertices);
            outline_mask.stroke_polygon(&vertices, OUTLINE_WIDTH);
        }
        paint(self.canvas, &fill_mask, fill);
        paint(self.canvas, &outline_mask, outline);
    }

    fn outlines(&mut self, areas: &[&Area], color: Color, what: &str) {
        let mut mask = self.mask();
        for area in areas {
            if area.is_degenerate() {
                log::trace!("Skipping degenerate {}", what);
                continue;
            }
            mask.stroke_polygon(&self.to_canvas_all(&area.vertices), OUTLINE_WIDTH);
        }
        paint(self.canvas, &mask, color);
    }

    fn path(&mut self, path: &Path, color: Color, width: f32) {
        let mut mask = self.mask();
        if !mask.polyline(&self.to_canvas_all(&path.points), width) {
            if !path.is_empty() {
                log::trace!("Skipping {} with {} point(s)", path.kind.name(), path.len());
            }
            return;
        }
        paint(self.canvas, &mask, color);
    }

    fn obstacles(&mut self, obstacles: &[Obstacle], radius: f32, color: Color) {
        let mut mask = self.mask();
        for obstacle in obstacles {
            mask.fill_circle(self.to_canvas(obstacle.position), radius);
        }
        paint(self.canvas, &mask, color);
    }

    fn marker(&mut self, center: Point, radius: f32, fill: Color, outline: Option<Color>) {
        let center = self.to_canvas(center);
        let mut mask = self.mask();
        mask.fill_circle(center, radius);
        paint(self.canvas, &mask, fill);
        if let Some(outline) = outline {
            let mut ring = self.mask();
            ring.stroke_circle(center, radius, OUTLINE_WIDTH);
            paint(self.canvas, &ring, outline);
        }
    }
}

/// Free text overlays, positioned in percent of the transformed image
pub fn draw_texts(image: &mut RgbaImage, config: &RenderConfig) {
    let (width, height) = image.dimensions();
    for overlay in &config.texts {
        let mut mask = Mask::for_canvas(image);
        let origin = Point::new(
            overlay.x / 100.0 * width as f32,
            overlay.y / 100.0 * height as f32,
        );
        mask.text(origin, &overlay.text, overlay.scale);
        paint(image, &mask, overlay.color);
    }
}
