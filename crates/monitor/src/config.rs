use common::{env_or, env_or_str, Environment};

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub environment: Environment,
    pub ring_name: String,
    pub capacity: usize,
    pub channels: usize,
    pub samples: usize,
    pub poll_interval_ms: u64,
    /// Frames to stay behind `write_idx`; keeps reads away from the slots
    /// the producer is about to overwrite.
    pub lag_frames: u64,
    pub frames_per_tick: usize,
    pub smooth_window: usize,
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        Self {
            environment: Environment::from_env(),
            ring_name: env_or_str("RING_NAME", "/sensor_frames"),
            capacity: env_or("RING_CAPACITY", 1024),
            channels: env_or("FRAME_CHANNELS", 4),
            samples: env_or("FRAME_SAMPLES", 256),
            poll_interval_ms: env_or("POLL_INTERVAL_MS", 100),
            lag_frames: env_or("LAG_FRAMES", 16),
            frames_per_tick: env_or("FRAMES_PER_TICK", 8),
            smooth_window: env_or("SMOOTH_WINDOW", 32),
        }
    }
}
