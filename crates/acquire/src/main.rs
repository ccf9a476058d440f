mod config;
mod synth;

use anyhow::Context;
use common::setup_logging;
use config::AcquireConfig;
use fastring::{FrameRing, FrameShape};
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    flag,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use synth::WindowSynth;

const SAMPLE_RATE_HZ: f64 = 48_000.0;
const BASE_FREQ_HZ: f64 = 440.0;
const LOG_EVERY_WINDOWS: u64 = 500;

fn main() -> anyhow::Result<()> {
    let config = AcquireConfig::from_env();
    setup_logging(&config.environment);

    let shutdown = Arc::new(AtomicBool::new(false));
    flag::register(SIGTERM, Arc::clone(&shutdown))?;
    flag::register(SIGINT, Arc::clone(&shutdown))?;

    let shape = FrameShape::new(config.channels, config.samples);
    let mut ring = FrameRing::create(&config.ring_name, config.capacity, shape)
        .context("Failed to create frame ring in shared memory")?;

    tracing::info!(
        ring = %config.ring_name,
        capacity = config.capacity,
        channels = config.channels,
        samples = config.samples,
        rate = config.windows_per_sec,
        "Publishing synthesized sensor windows"
    );

    let mut synth = WindowSynth::new(config.channels, config.samples, SAMPLE_RATE_HZ, BASE_FREQ_HZ);
    let pace = Duration::from_secs_f64(1.0 / config.windows_per_sec);

    while !shutdown.load(Ordering::Relaxed) {
        let window = synth.next_window();
        ring.publish(window)
            .context("Failed to publish window into the ring")?;

        let write_idx = ring.write_idx();
        if write_idx % LOG_EVERY_WINDOWS == 0 {
            tracing::info!(write_idx, "published");
        }

        std::thread::sleep(pace);
    }

    tracing::info!(write_idx = ring.write_idx(), "Shutting down producer");
    Ok(())
}
