//! Background polling thread for one camera.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::MapCamera;

/// Longest single sleep, so shutdown is noticed promptly
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Runs [`MapCamera::update`] at the configured interval on a named thread
///
/// Cycles for one camera never overlap; separate pollers are independent.
pub struct MapPoller {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MapPoller {
    /// Start polling `camera` every `poll.interval_secs`
    pub fn spawn(camera: Arc<MapCamera>) -> std::io::Result<Self> {
        let interval = camera.config().poll.interval();
        Self::spawn_with_interval(camera, interval)
    }

    /// Start polling with an explicit interval
    pub fn spawn_with_interval(camera: Arc<MapCamera>, interval: Duration) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name(format!("map-poll-{}", camera.device_id()))
            .spawn(move || poll_loop(&camera, interval, &thread_running))?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Whether the thread is still polling
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stop polling and wait for the current cycle to finish
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Map poll thread panicked");
            }
        }
    }
}

impl Drop for MapPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_loop(camera: &MapCamera, interval: Duration, running: &AtomicBool) {
    log::info!(
        "[{}] Polling map every {:.1}s",
        camera.device_id(),
        interval.as_secs_f32()
    );

    while running.load(Ordering::Relaxed) {
        let started = Instant::now();
        let status = camera.update();
        log::debug!(
            "[{}] Cycle finished in {:?}: {}",
            camera.device_id(),
            started.elapsed(),
            status
        );

        let deadline = started + interval;
        while running.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }

    log::info!("[{}] Map polling stopped", camera.device_id());
}
