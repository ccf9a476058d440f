use common::{env_or, env_or_str, Environment};

#[derive(Debug, Clone)]
pub struct AcquireConfig {
    pub environment: Environment,
    pub ring_name: String,
    pub capacity: usize,
    pub channels: usize,
    pub samples: usize,
    pub windows_per_sec: f64,
}

impl AcquireConfig {
    pub fn from_env() -> Self {
        Self {
            environment: Environment::from_env(),
            ring_name: env_or_str("RING_NAME", "/sensor_frames"),
            capacity: env_or("RING_CAPACITY", 1024),
            channels: env_or("FRAME_CHANNELS", 4),
            samples: env_or("FRAME_SAMPLES", 256),
            windows_per_sec: env_or("WINDOWS_PER_SEC", 100.0),
        }
    }
}
