pub mod config;
pub mod logging;
pub mod wait;

pub use config::{env_or, env_or_str, Environment};
pub use logging::setup_logging;
pub use wait::wait_for_resource;
