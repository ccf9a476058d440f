use crate::errors::RingError;
use crate::ring::ShmRing;
use ndarray::{concatenate, Array3, ArrayView2, ArrayView3, Axis};
use std::mem::size_of;
use std::slice;

/// Logical interpretation of one frame: a row-major
/// (channels x samples) array of f32. The ring itself stores only bytes;
/// the shape is supplied by whichever process attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameShape {
    pub channels: usize,
    pub samples: usize,
}

impl FrameShape {
    pub fn new(channels: usize, samples: usize) -> Self {
        Self { channels, samples }
    }

    /// Samples per frame across all channels.
    pub fn frame_len(&self) -> usize {
        self.channels * self.samples
    }

    /// Byte size of one frame under this shape.
    pub fn frame_bytes(&self) -> usize {
        self.frame_len() * size_of::<f32>()
    }
}

/// A [`ShmRing`] with a persistent frame shape.
///
/// This is the array-facing layer: windows go in as flat `&[f32]` sample
/// buffers and come out as shaped zero-copy views, with the shape fixed at
/// attach time instead of repeated on every call.
pub struct FrameRing {
    ring: ShmRing,
    shape: FrameShape,
}

impl FrameRing {
    pub fn create(name: &str, capacity: usize, shape: FrameShape) -> Result<Self, RingError> {
        let ring = ShmRing::create(name, capacity, shape.frame_bytes())?;
        Ok(Self { ring, shape })
    }

    pub fn open(name: &str, capacity: usize, shape: FrameShape) -> Result<Self, RingError> {
        let ring = ShmRing::open(name, capacity, shape.frame_bytes())?;
        Ok(Self { ring, shape })
    }

    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    pub fn frame_bytes(&self) -> usize {
        self.ring.frame_bytes()
    }

    pub fn write_idx(&self) -> u64 {
        self.ring.write_idx()
    }

    /// Publish one or more frames from a flat sample buffer.
    ///
    /// `samples` must hold a whole number of (channels x samples) frames;
    /// anything else is `InvalidArgument`.
    pub fn publish(&mut self, samples: &[f32]) -> Result<(), RingError> {
        let frame_len = self.shape.frame_len();
        if samples.len() % frame_len != 0 {
            return Err(RingError::InvalidArgument(format!(
                "{} samples do not form whole {} x {} frames",
                samples.len(),
                self.shape.channels,
                self.shape.samples
            )));
        }
        // f32 -> bytes never misaligns or changes length semantics.
        let bytes = unsafe {
            slice::from_raw_parts(samples.as_ptr().cast::<u8>(), samples.len() * size_of::<f32>())
        };
        self.ring.publish(bytes)
    }

    /// Zero-copy (channels x samples) view of one frame.
    pub fn view_frame(&self, logical_idx: u64) -> Result<ArrayView2<'_, f32>, RingError> {
        self.ring
            .view_frame(logical_idx, self.shape.channels, self.shape.samples)
    }

    /// Zero-copy (n_frames x channels x samples) view of contiguous slots.
    /// Fails with `WindowWraps` when the range crosses the ring boundary.
    pub fn view_window(
        &self,
        start: u64,
        n_frames: usize,
    ) -> Result<ArrayView3<'_, f32>, RingError> {
        self.ring
            .view_window(start, n_frames, self.shape.channels, self.shape.samples)
    }

    /// Owning read of `n_frames` logical frames starting at `start`.
    ///
    /// Unlike [`view_window`](Self::view_window) this handles a wrapping
    /// range by reading the two non-wrapping halves and concatenating
    /// them, at the cost of one copy. `n_frames` may not exceed the ring
    /// capacity.
    pub fn read_window(&self, start: u64, n_frames: usize) -> Result<Array3<f32>, RingError> {
        let capacity = self.ring.capacity();
        if n_frames > capacity {
            return Err(RingError::InvalidArgument(format!(
                "cannot read {n_frames} frames from a ring of {capacity} slots"
            )));
        }

        let slot = (start % capacity as u64) as usize;
        let first = n_frames.min(capacity - slot);

        let head = self.view_window(start, first)?;
        if first == n_frames {
            return Ok(head.to_owned());
        }

        let tail = self.view_window(start + first as u64, n_frames - first)?;
        concatenate(Axis(0), &[head, tail]).map_err(|e| {
            RingError::InvalidArgument(format!("window halves do not concatenate: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ShmName(String);

    impl ShmName {
        fn new(tag: &str) -> Self {
            Self(format!("/fastring_adapter_{}_{}", tag, std::process::id()))
        }

        fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl Drop for ShmName {
        fn drop(&mut self) {
            #[cfg(unix)]
            {
                let c = std::ffi::CString::new(self.0.clone()).unwrap();
                unsafe { nix::libc::shm_unlink(c.as_ptr()) };
            }
        }
    }

    #[test]
    fn test_shape_arithmetic() {
        let shape = FrameShape::new(2, 4);
        assert_eq!(shape.frame_len(), 8);
        assert_eq!(shape.frame_bytes(), 32);
    }

    #[test]
    fn test_publish_and_view_roundtrip() {
        let name = ShmName::new("roundtrip");
        let mut ring = FrameRing::create(name.as_str(), 4, FrameShape::new(2, 2)).unwrap();

        ring.publish(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(ring.write_idx(), 1);

        let frame = ring.view_frame(0).unwrap();
        assert_eq!(frame[[0, 1]], 2.0);
        assert_eq!(frame[[1, 0]], 3.0);
    }

    #[test]
    fn test_publish_rejects_ragged_sample_buffers() {
        let name = ShmName::new("ragged");
        let mut ring = FrameRing::create(name.as_str(), 4, FrameShape::new(2, 2)).unwrap();

        let err = ring.publish(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, RingError::InvalidArgument(_)));
        assert_eq!(ring.write_idx(), 0);
    }

    #[test]
    fn test_multi_frame_publish_from_one_buffer() {
        let name = ShmName::new("multi");
        let mut ring = FrameRing::create(name.as_str(), 4, FrameShape::new(1, 2)).unwrap();

        ring.publish(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(ring.write_idx(), 3);
        assert_eq!(ring.view_frame(2).unwrap()[[0, 0]], 5.0);
    }

    #[test]
    fn test_read_window_splits_across_wrap() {
        let name = ShmName::new("wrap_read");
        let mut ring = FrameRing::create(name.as_str(), 4, FrameShape::new(1, 1)).unwrap();

        for value in 0..6 {
            ring.publish(&[value as f32]).unwrap();
        }

        // Frames 2..6 are live; slots for 2,3 sit at the end of the ring
        // and 4,5 at the start, so the range wraps.
        assert!(matches!(
            ring.view_window(2, 4),
            Err(RingError::WindowWraps { .. })
        ));

        let window = ring.read_window(2, 4).unwrap();
        assert_eq!(window.shape(), &[4, 1, 1]);
        for (i, expected) in [2.0f32, 3.0, 4.0, 5.0].iter().enumerate() {
            assert_eq!(window[[i, 0, 0]], *expected);
        }
    }

    #[test]
    fn test_read_window_caps_at_capacity() {
        let name = ShmName::new("overread");
        let ring = FrameRing::create(name.as_str(), 4, FrameShape::new(1, 1)).unwrap();

        assert!(matches!(
            ring.read_window(0, 5),
            Err(RingError::InvalidArgument(_))
        ));
    }
}
