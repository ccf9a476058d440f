//! Rolling-average smoothing with constant left-padding.
//!
//! The filter pads the input on the left with `window_size` copies of a
//! baseline value (the 10th percentile or the minimum of the data), then
//! emits the mean of every width-`window_size` window whose right edge
//! falls on an input sample. Output length equals input length, and the
//! first outputs lean toward the baseline instead of toward zero.

/// Baseline used for the left padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    /// 10th-percentile value of the input.
    Percentile,
    /// Minimum value of the input.
    Min,
}

fn find_min(data: &[f64]) -> f64 {
    let mut min_val = data[0];
    for &v in &data[1..] {
        if v < min_val {
            min_val = v;
        }
    }
    min_val
}

fn partition(arr: &mut [f64], left: usize, right: usize, pivot_index: usize) -> usize {
    let pivot_value = arr[pivot_index];
    arr.swap(pivot_index, right);

    let mut store_index = left;
    for i in left..right {
        if arr[i] < pivot_value {
            arr.swap(i, store_index);
            store_index += 1;
        }
    }

    arr.swap(right, store_index);
    store_index
}

fn quickselect(arr: &mut [f64], mut left: usize, mut right: usize, k: usize) -> f64 {
    while left < right {
        let pivot_index = left + (right - left) / 2;
        let new_index = partition(arr, left, right, pivot_index);

        if new_index == k {
            break;
        } else if new_index > k {
            right = new_index - 1;
        } else {
            left = new_index + 1;
        }
    }
    arr[k]
}

/// 10th percentile of `data`, at rank `floor(0.10 * (n - 1))` of the
/// ascending order. Selects on a scratch copy; the input is untouched.
/// NaN for empty input.
pub fn tenth_percentile(data: &[f64]) -> f64 {
    let n = data.len();
    if n == 0 {
        return f64::NAN;
    }

    let mut scratch = data.to_vec();
    let k = (0.10 * (n - 1) as f64).floor() as usize;
    quickselect(&mut scratch, 0, n - 1, k)
}

/// Rolling average of `data` over windows of `window_size`, left-padded
/// with the [`PadMode`] baseline. Returns one output per input sample.
///
/// `window_size` must be at least 1.
pub fn moving_average_filter(data: &[f64], window_size: usize, pad: PadMode) -> Vec<f64> {
    assert!(window_size >= 1, "window_size must be at least 1");

    let n = data.len();
    if n == 0 {
        return Vec::new();
    }

    let pad_val = match pad {
        PadMode::Percentile => tenth_percentile(data),
        PadMode::Min => find_min(data),
    };

    let mut padded = Vec::with_capacity(n + window_size);
    padded.resize(window_size, pad_val);
    padded.extend_from_slice(data);

    let mut filtered = Vec::with_capacity(n);
    let mut cumsum: f64 = padded[..window_size].iter().sum();
    for i in window_size..padded.len() {
        cumsum += padded[i] - padded[i - window_size];
        filtered.push(cumsum / window_size as f64);
    }

    filtered
}
