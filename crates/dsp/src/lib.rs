//! Signal-conditioning utilities for the sensor pipeline: rolling-average
//! smoothing, Butterworth low-pass filtering, and Gaussian image blur.

pub mod blur;
pub mod butterworth;
pub mod moving_average;

pub use blur::gaussian_blur;
pub use butterworth::ButterworthLowPass;
pub use moving_average::{moving_average_filter, tenth_percentile, PadMode};
