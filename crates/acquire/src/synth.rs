use std::f64::consts::TAU;

/// Deterministic multi-channel test signal: each channel carries a sine
/// at its own frequency, phase-continuous across windows.
pub struct WindowSynth {
    channels: usize,
    samples: usize,
    /// Phase advance per sample, per channel.
    steps: Vec<f64>,
    phases: Vec<f64>,
    buffer: Vec<f32>,
}

impl WindowSynth {
    pub fn new(channels: usize, samples: usize, sample_rate_hz: f64, base_freq_hz: f64) -> Self {
        let steps = (0..channels)
            .map(|ch| TAU * base_freq_hz * (ch + 1) as f64 / sample_rate_hz)
            .collect();

        Self {
            channels,
            samples,
            steps,
            phases: vec![0.0; channels],
            buffer: vec![0.0; channels * samples],
        }
    }

    /// Fill and return the next (channels x samples) window, row-major.
    /// The returned slice is valid until the next call.
    pub fn next_window(&mut self) -> &[f32] {
        for ch in 0..self.channels {
            let step = self.steps[ch];
            let mut phase = self.phases[ch];
            let row = &mut self.buffer[ch * self.samples..(ch + 1) * self.samples];
            for sample in row.iter_mut() {
                *sample = phase.sin() as f32;
                phase = (phase + step) % TAU;
            }
            self.phases[ch] = phase;
        }
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_shape_and_range() {
        let mut synth = WindowSynth::new(3, 64, 48_000.0, 440.0);
        let window = synth.next_window();
        assert_eq!(window.len(), 3 * 64);
        assert!(window.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_phase_is_continuous_across_windows() {
        let mut continuous = WindowSynth::new(1, 32, 48_000.0, 1_000.0);
        let first: Vec<f32> = continuous.next_window().to_vec();
        let second: Vec<f32> = continuous.next_window().to_vec();

        let mut unbroken = WindowSynth::new(1, 64, 48_000.0, 1_000.0);
        let whole = unbroken.next_window();

        assert_eq!(&whole[..32], first.as_slice());
        assert_eq!(&whole[32..], second.as_slice());
    }
}
