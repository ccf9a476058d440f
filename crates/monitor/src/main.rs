mod config;
mod polling;

use common::{setup_logging, wait_for_resource};
use config::MonitorConfig;
use fastring::{FrameRing, FrameShape};
use polling::RingPoller;
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    flag,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let config = MonitorConfig::from_env();
    setup_logging(&config.environment);

    let shutdown = Arc::new(AtomicBool::new(false));
    flag::register(SIGTERM, Arc::clone(&shutdown))?;
    flag::register(SIGINT, Arc::clone(&shutdown))?;

    let shape = FrameShape::new(config.channels, config.samples);
    let ring = wait_for_resource(
        || FrameRing::open(&config.ring_name, config.capacity, shape),
        config.poll_interval_ms,
        "frame ring",
    );

    tracing::info!(
        ring = %config.ring_name,
        lag_frames = config.lag_frames,
        frames_per_tick = config.frames_per_tick,
        "Watching frame ring"
    );

    let poller = RingPoller::new(
        ring,
        config.lag_frames,
        config.frames_per_tick,
        config.smooth_window,
    )?;

    while !shutdown.load(Ordering::Relaxed) {
        match poller.poll() {
            Ok(Some(summary)) => {
                tracing::info!(
                    write_idx = summary.write_idx,
                    start = summary.start,
                    frames = summary.frames,
                    smoothed_tail = summary.smoothed_tail,
                    "tick"
                );
            }
            Ok(None) => {
                tracing::debug!("No full window yet");
            }
            Err(e) => {
                tracing::error!(error = %e, "Polling tick failed");
            }
        }
        std::thread::sleep(Duration::from_millis(config.poll_interval_ms));
    }

    tracing::info!("Shutting down monitor");
    Ok(())
}
