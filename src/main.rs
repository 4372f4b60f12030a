//! roborock-map command line tool.
//!
//! # Usage
//!
//! ```bash
//! # Decode and render a payload once
//! roborock-map render map.bin -o map.png --set transform.rotate=90 --attributes map.json
//!
//! # Poll a payload file like a camera would
//! roborock-map poll map.bin -o map.png --interval 2 --cycles 10
//!
//! # Write a small demo payload
//! roborock-map sample demo.bin
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

use roborock_map::attributes;
use roborock_map::config::CameraConfig;
use roborock_map::core::{PathKind, Point};
use roborock_map::error::Result;
use roborock_map::{ConfigOverride, FileTransport, MapCamera, PayloadBuilder};

/// Device id used for the file-backed camera
const FILE_DEVICE_ID: &str = "file";

#[derive(Parser)]
#[command(name = "roborock-map")]
#[command(about = "Decode and render robot vacuum map payloads")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a payload and write the rendered PNG
    Render {
        /// Payload file (raw, gzip or zlib)
        payload: PathBuf,

        /// Output PNG
        #[arg(short, long, default_value = "map.png")]
        output: PathBuf,

        /// Camera configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override a setting, e.g. `transform.trim.left=10`
        #[arg(long = "set", value_name = "PATH=VALUE")]
        overrides: Vec<ConfigOverride>,

        /// Write the configured attributes as JSON
        #[arg(long)]
        attributes: Option<PathBuf>,
    },

    /// Poll a payload file at a fixed interval, re-rendering each cycle
    Poll {
        /// Payload file (raw, gzip or zlib)
        payload: PathBuf,

        /// Output PNG, rewritten whenever a new map is published
        #[arg(short, long, default_value = "map.png")]
        output: PathBuf,

        /// Camera configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override a setting, e.g. `poll.interval_secs=1`
        #[arg(long = "set", value_name = "PATH=VALUE")]
        overrides: Vec<ConfigOverride>,

        /// Seconds between cycles (defaults to `poll.interval_secs`)
        #[arg(long)]
        interval: Option<f32>,

        /// Stop after this many cycles (runs until killed if omitted)
        #[arg(long)]
        cycles: Option<u32>,
    },

    /// Write a small demo payload
    Sample {
        /// Output payload file
        output: PathBuf,
    },
}

fn load_config(path: Option<&Path>, overrides: &[ConfigOverride]) -> Result<CameraConfig> {
    let mut config = match path {
        Some(path) => CameraConfig::load(path)?,
        None => CameraConfig::default(),
    };
    for ov in overrides {
        config.apply(ov)?;
    }
    Ok(config)
}

fn render_once(
    payload: &Path,
    output: &Path,
    config: CameraConfig,
    attributes_out: Option<&Path>,
) -> Result<()> {
    let transport = FileTransport::new().with_device(FILE_DEVICE_ID, payload);
    let camera = MapCamera::new(FILE_DEVICE_ID, Arc::new(transport), config);

    let status = camera.update();
    log::info!("Status: {}", status);
    let snapshot = camera.snapshot();

    if let Some(image) = &snapshot.image {
        fs::write(output, &image.png)?;
        log::info!(
            "Wrote {}x{} map to {}",
            image.width,
            image.height,
            output.display()
        );
    }

    if let Some(path) = attributes_out {
        let json = attributes::to_json(&snapshot.attributes)?;
        fs::write(path, serde_json::to_string_pretty(&json)?)?;
        log::info!("Wrote {} attributes to {}", snapshot.attributes.len(), path.display());
    }

    if status.is_failure() {
        log::error!("{}", status);
        std::process::exit(1);
    }
    Ok(())
}

fn poll(
    payload: &Path,
    output: &Path,
    config: CameraConfig,
    interval: Option<f32>,
    cycles: Option<u32>,
) -> Result<()> {
    let interval = interval
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(Duration::from_secs_f32)
        .unwrap_or_else(|| config.poll.interval());
    let transport = FileTransport::new().with_device(FILE_DEVICE_ID, payload);
    let camera = MapCamera::new(FILE_DEVICE_ID, Arc::new(transport), config);

    let mut last_image = None;
    let mut cycle = 0u32;
    loop {
        let status = camera.update();
        cycle += 1;
        let snapshot = camera.snapshot();
        if let Some(image) = &snapshot.image {
            let changed = last_image
                .as_ref()
                .is_none_or(|last| !Arc::ptr_eq(last, image));
            if changed {
                fs::write(output, &image.png)?;
                log::info!("Cycle {}: {} (wrote {})", cycle, status, output.display());
                last_image = Some(Arc::clone(image));
            } else {
                log::info!("Cycle {}: {}", cycle, status);
            }
        } else {
            log::info!("Cycle {}: {}", cycle, status);
        }

        if cycles.is_some_and(|limit| cycle >= limit) {
            break;
        }
        thread::sleep(interval);
    }
    Ok(())
}

fn write_sample(output: &Path) -> Result<()> {
    const SIZE: u32 = 40;
    // Room 1 on the left, room 2 on the right, walls around both
    let codes: Vec<u8> = (0..SIZE * SIZE)
        .map(|i| {
            let (x, y) = (i % SIZE, i / SIZE);
            if x == 0 || y == 0 || x == SIZE - 1 || y == SIZE - 1 || x == SIZE / 2 {
                0x01
            } else if x < SIZE / 2 {
                (1 << 3) | 0x07
            } else {
                (2 << 3) | 0x07
            }
        })
        .collect();

    let bytes = PayloadBuilder::new()
        .map_sequence(1)
        .image(0, 0, SIZE, SIZE, &codes)
        .charger(Point::new(3.0, 36.0))
        .robot_position(Point::new(10.0, 20.0), Some(90.0))
        .path(
            PathKind::Actual,
            &[
                Point::new(3.0, 36.0),
                Point::new(10.0, 30.0),
                Point::new(10.0, 20.0),
            ],
        )
        .no_go_areas(&[vec![
            Point::new(25.0, 5.0),
            Point::new(35.0, 5.0),
            Point::new(35.0, 12.0),
            Point::new(25.0, 12.0),
        ]])
        .virtual_walls(&[(Point::new(22.0, 30.0), Point::new(36.0, 30.0))])
        .room_names(&[(1, "Kitchen"), (2, "Hall")])
        .map_name("demo")
        .build();

    fs::write(output, &bytes)?;
    log::info!("Wrote {} byte sample payload to {}", bytes.len(), output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match args.command {
        Commands::Render {
            payload,
            output,
            config,
            overrides,
            attributes,
        } => {
            let config = load_config(config.as_deref(), &overrides)?;
            render_once(&payload, &output, config, attributes.as_deref())
        }
        Commands::Poll {
            payload,
            output,
            config,
            overrides,
            interval,
            cycles,
        } => {
            let config = load_config(config.as_deref(), &overrides)?;
            poll(&payload, &output, config, interval, cycles)
        }
        Commands::Sample { output } => write_sample(&output),
    }
}
