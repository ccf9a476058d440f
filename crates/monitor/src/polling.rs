use anyhow::Context;
use dsp::{moving_average_filter, PadMode};
use fastring::FrameRing;
use ndarray::s;

/// What one polling tick observed.
pub struct TickSummary {
    pub write_idx: u64,
    pub start: u64,
    pub frames: usize,
    /// Last value of the smoothed first channel.
    pub smoothed_tail: f64,
}

/// Picks the start of a `frames`-frame read that stays `lag` frames
/// behind the producer. None until enough frames exist.
fn tick_start(write_idx: u64, lag: u64, frames: u64) -> Option<u64> {
    write_idx.checked_sub(lag + frames)
}

pub struct RingPoller {
    ring: FrameRing,
    lag_frames: u64,
    frames_per_tick: usize,
    smooth_window: usize,
}

impl RingPoller {
    pub fn new(
        ring: FrameRing,
        lag_frames: u64,
        frames_per_tick: usize,
        smooth_window: usize,
    ) -> anyhow::Result<Self> {
        // The lagged read must still fit inside the un-overwritten window.
        let span = lag_frames as usize + frames_per_tick;
        if span > ring.capacity() {
            anyhow::bail!(
                "lag {} + frames per tick {} exceed ring capacity {}",
                lag_frames,
                frames_per_tick,
                ring.capacity()
            );
        }

        Ok(Self {
            ring,
            lag_frames,
            frames_per_tick,
            smooth_window,
        })
    }

    /// Read and summarize the most recent lagged window, if one exists.
    pub fn poll(&self) -> anyhow::Result<Option<TickSummary>> {
        let write_idx = self.ring.write_idx();
        let Some(start) = tick_start(write_idx, self.lag_frames, self.frames_per_tick as u64)
        else {
            return Ok(None);
        };

        let window = self
            .ring
            .read_window(start, self.frames_per_tick)
            .context("Failed to read lagged window")?;

        // Smooth the first channel across the whole window.
        let channel: Vec<f64> = window
            .slice(s![.., 0, ..])
            .iter()
            .map(|&v| f64::from(v))
            .collect();
        let smoothed = moving_average_filter(&channel, self.smooth_window, PadMode::Percentile);

        Ok(Some(TickSummary {
            write_idx,
            start,
            frames: self.frames_per_tick,
            smoothed_tail: smoothed.last().copied().unwrap_or_default(),
        }))
    }
}
