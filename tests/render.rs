//! Renderer integration tests: determinism, transforms and drawable toggles.

mod common;

use image::imageops;
use roborock_map::PayloadBuilder;
use roborock_map::config::{ConfigOverride, RenderConfig, Rotation, TextOverlay};
use roborock_map::core::Point;
use roborock_map::payload::decode;
use roborock_map::render::{apply_transform, draw_canvas, render};

fn overrides(items: &[&str]) -> Vec<ConfigOverride> {
    items.iter().map(|s| s.parse().unwrap()).collect()
}

fn config(items: &[&str]) -> RenderConfig {
    RenderConfig::try_resolve(&overrides(items)).unwrap()
}

#[test]
fn test_render_is_deterministic() {
    let raw = common::full_payload();
    let config = config(&["transform.scale=3", "transform.rotate=270", "transform.trim.top=10"]);

    let first = render(&decode(&raw, &config).unwrap(), &config).unwrap();
    let second = render(&decode(&raw, &config).unwrap(), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_output_dimensions_follow_transform() {
    let raw = common::full_payload();
    for rotate in [0, 90, 180, 270] {
        let config = config(&[
            "transform.scale=2",
            &format!("transform.rotate={rotate}"),
            "transform.trim.left=10",
            "transform.trim.bottom=25",
        ]);
        let model = decode(&raw, &config).unwrap();
        let rendered = render(&model, &config).unwrap();
        let expected = config.transform.output_dims(model.image.width, model.image.height);
        assert_eq!((rendered.width, rendered.height), expected, "rotate {rotate}");

        let png = image::load_from_memory(&rendered.png).unwrap();
        assert_eq!((png.width(), png.height()), expected);
    }
}

#[test]
fn test_rotated_pixels_match_mapped_points() {
    let raw = common::full_payload();
    let base = config(&["drawables.room_names=false"]);
    let model = decode(&raw, &base).unwrap();
    let canvas = draw_canvas(&model, &base);
    let (width, height) = canvas.dimensions();

    for rotation in [Rotation::Deg90, Rotation::Deg180, Rotation::Deg270] {
        let mut config = base.clone();
        config.transform.rotate = rotation;
        let rotated = apply_transform(&canvas, &config.transform);

        // Charger, vacuum and a carpet pixel
        for device in [Point::new(2.5, 2.5), Point::new(5.5, 8.5), Point::new(3.5, 12.5)] {
            let at = model.image.to_canvas(device);
            let mapped = config.transform.map_point(at, width, height);
            assert_eq!(
                rotated.get_pixel(mapped.x as u32, mapped.y as u32),
                canvas.get_pixel(at.x as u32, at.y as u32),
                "{rotation:?} {device:?}"
            );
        }
    }
}

#[test]
fn test_room_names_rotate_with_canvas() {
    let mut builder = PayloadBuilder::new();
    builder
        .image(0, 0, 40, 20, &vec![common::room_code(1); 800])
        .room_names(&[(1, "KITCHEN")]);
    let raw = builder.build();

    let upright = config(&["drawables=[\"room_names\"]"]);
    let model = decode(&raw, &upright).unwrap();
    let plain = render(&model, &upright).unwrap();
    let plain = image::load_from_memory(&plain.png).unwrap().to_rgba8();

    // The label is drawn at all
    let background = plain.get_pixel(0, 0);
    assert!(plain.pixels().any(|p| p != background));

    let turned = config(&["drawables=[\"room_names\"]", "transform.rotate=90"]);
    let rotated = render(&model, &turned).unwrap();
    let rotated = image::load_from_memory(&rotated.png).unwrap().to_rgba8();
    assert_eq!(rotated, imageops::rotate270(&plain));
}

#[test]
fn test_text_overlays_stay_upright() {
    let raw = common::single_room_builder(20, 1).build();
    // Bitmap only, rooms drawn as plain floor
    let mut config = config(&["drawables=[\"carpet\"]", "transform.rotate=90"]);
    config.texts.push(TextOverlay::new("I", 0.0, 0.0));
    let model = decode(&raw, &config).unwrap();
    let rendered = render(&model, &config).unwrap();
    let image = image::load_from_memory(&rendered.png).unwrap().to_rgba8();

    let floor = image.get_pixel(19, 19);
    // Top bar of the glyph on the first rows, stem below it
    assert_eq!(image.get_pixel(2, 0).0, [0, 0, 0, 255]);
    assert_eq!(image.get_pixel(4, 8).0, [0, 0, 0, 255]);
    assert_eq!(image.get_pixel(2, 8), floor);
}

#[test]
fn test_disabling_drawables_changes_output() {
    let mut builder = common::single_room_builder(12, 1);
    builder.obstacles(&[(Point::new(3.0, 8.0), 1, 50)]);
    let raw = builder.build();

    let all = config(&[]);
    let model = decode(&raw, &all).unwrap();
    let with_all = draw_canvas(&model, &all);
    let without = draw_canvas(&model, &config(&["drawables.obstacles=false"]));
    let bare = draw_canvas(&model, &config(&["drawables=[\"rooms\"]"]));

    assert_ne!(with_all, without);
    assert_eq!(without.get_pixel(3, 8), bare.get_pixel(3, 8));
    assert_ne!(with_all.get_pixel(3, 8), bare.get_pixel(3, 8));
}

#[test]
fn test_colour_override_is_used() {
    let raw = common::kitchen_payload(true);
    let config = config(&[
        "drawables=[\"rooms\"]",
        "colors.room_1=\"#102030\"",
    ]);
    let model = decode(&raw, &config).unwrap();
    let canvas = draw_canvas(&model, &config);
    assert_eq!(canvas.get_pixel(4, 4).0, [0x10, 0x20, 0x30, 0xFF]);
}

#[test]
fn test_empty_map_renders_placeholder_png() {
    let raw = common::empty_payload();
    let config = config(&["transform.rotate=90", "transform.scale=4"]);
    let model = decode(&raw, &config).unwrap();
    assert!(model.is_empty());

    let rendered = render(&model, &config).unwrap();
    let png = image::load_from_memory(&rendered.png).unwrap();
    assert_eq!((png.width(), png.height()), (rendered.width, rendered.height));
}
