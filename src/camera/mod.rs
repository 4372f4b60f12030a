//! Per-device map camera.
//!
//! One [`MapCamera`] per vacuum runs the poll cycle:
//!
//! ```text
//! transport ──► decode ──► render ──► extract ──► status machine ──► publish
//! ```
//!
//! The camera is the only place where transport, decode and render errors
//! become a [`MapStatus`]. Each cycle builds a complete [`Snapshot`] and swaps
//! it in under a `parking_lot` lock held only for the pointer exchange, so
//! readers never observe a half-updated generation.

mod poller;
mod transport;

pub use poller::MapPoller;
pub use transport::{FileTransport, GET_MAP_V1, MapTransport, TransportResponse};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::attributes::{self, AttributeName, AttributeValue};
use crate::config::CameraConfig;
use crate::error::Result;
use crate::map::MapData;
use crate::payload;
use crate::render::{self, RenderedMap};
use crate::status::{CycleOutcome, MapStatus, StatusMachine};

/// One published generation: status plus the last accepted image and model
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    /// Status after the most recent cycle
    pub status: MapStatus,
    /// Last published image
    pub image: Option<Arc<RenderedMap>>,
    /// Model the published image was rendered from
    pub model: Option<Arc<MapData>>,
    /// Attributes of the published model
    pub attributes: BTreeMap<AttributeName, AttributeValue>,
}

/// Decoded and rendered result of one successful cycle
struct Rendered {
    model: MapData,
    image: RenderedMap,
}

/// Map camera for a single device
pub struct MapCamera {
    device_id: String,
    config: CameraConfig,
    transport: Arc<dyn MapTransport>,
    enabled: AtomicBool,
    device_state: Mutex<Option<u32>>,
    /// Serializes cycles; also owns the status machine
    machine: Mutex<StatusMachine>,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl MapCamera {
    /// Create a camera in the `Initializing` state with polling enabled
    pub fn new(
        device_id: impl Into<String>,
        transport: Arc<dyn MapTransport>,
        config: CameraConfig,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            config,
            transport,
            enabled: AtomicBool::new(true),
            device_state: Mutex::new(None),
            machine: Mutex::new(StatusMachine::new()),
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Device identifier passed to the transport
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Resolved configuration
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Enable polling
    pub fn turn_on(&self) {
        log::info!("[{}] Map polling enabled", self.device_id);
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Disable polling; a cycle already running completes normally
    pub fn turn_off(&self) {
        log::info!("[{}] Map polling disabled", self.device_id);
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Whether polling is enabled
    pub fn is_on(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Record the device's last known state code (`None` if unknown)
    pub fn set_device_state(&self, state: Option<u32>) {
        *self.device_state.lock() = state;
    }

    /// Current published generation
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Current status
    pub fn status(&self) -> MapStatus {
        self.snapshot.read().status
    }

    /// Last published image
    pub fn image(&self) -> Option<Arc<RenderedMap>> {
        self.snapshot.read().image.clone()
    }

    /// Attributes of the last published model
    pub fn attributes(&self) -> BTreeMap<AttributeName, AttributeValue> {
        self.snapshot.read().attributes.clone()
    }

    /// True when the cycle may skip the transport: the device is in a
    /// non-refreshing state and an image is already published
    fn should_skip(&self) -> bool {
        let Some(state) = *self.device_state.lock() else {
            return false;
        };
        self.config.poll.non_refreshing_states.contains(&state)
            && self.snapshot.read().image.is_some()
    }

    /// Run one poll cycle and return the resulting status
    ///
    /// Does nothing while polling is disabled. Concurrent calls are
    /// serialized.
    pub fn update(&self) -> MapStatus {
        let mut machine = self.machine.lock();
        if !self.is_on() {
            return machine.status();
        }
        if self.should_skip() {
            log::debug!(
                "[{}] Device state is non-refreshing, keeping current map",
                self.device_id
            );
            return machine.status();
        }

        log::debug!("[{}] Retrieving map", self.device_id);
        let (outcome, rendered) = match self.retrieve() {
            None => {
                log::warn!("[{}] Unable to retrieve map data", self.device_id);
                (CycleOutcome::NoData, None)
            }
            Some(raw) => match self.process(&raw) {
                Ok(rendered) if rendered.model.is_empty() => {
                    log::debug!("[{}] Map is empty", self.device_id);
                    (CycleOutcome::Empty, Some(rendered))
                }
                Ok(rendered) => (CycleOutcome::Map, Some(rendered)),
                Err(e) => {
                    log::warn!("[{}] Unable to parse map data: {}", self.device_id, e);
                    (CycleOutcome::ParseFailed, None)
                }
            },
        };

        let transition = machine.advance(outcome);
        let previous = self.snapshot();
        let next = match rendered {
            Some(rendered) if transition.publish => {
                let attributes = attributes::extract(&rendered.model, &self.config.attributes);
                log::info!(
                    "[{}] Published {}x{} map ({})",
                    self.device_id,
                    rendered.image.width,
                    rendered.image.height,
                    transition.status
                );
                Snapshot {
                    status: transition.status,
                    image: Some(Arc::new(rendered.image)),
                    model: Some(Arc::new(rendered.model)),
                    attributes,
                }
            }
            _ => Snapshot {
                status: transition.status,
                ..(*previous).clone()
            },
        };
        *self.snapshot.write() = Arc::new(next);
        transition.status
    }

    /// Ask the transport for the payload; any failure counts as no data
    fn retrieve(&self) -> Option<Vec<u8>> {
        match self.transport.send(&self.device_id, GET_MAP_V1) {
            Ok(response) => response.into_bytes(),
            Err(e) => {
                log::warn!("[{}] Map request failed: {}", self.device_id, e);
                None
            }
        }
    }

    fn process(&self, raw: &[u8]) -> Result<Rendered> {
        let model = payload::decode(raw, &self.config.render)?;
        let image = render::render(&model, &self.config.render)?;
        Ok(Rendered { model, image })
    }
}
