use crate::errors::RingError;
use crate::header::RingHeader;
use crate::region::SharedRegion;
use ndarray::{ArrayView2, ArrayView3};
use std::mem::size_of;
use std::ptr;
use std::slice;
use std::sync::atomic::Ordering;

/// Single-producer / multi-consumer frame ring over a shared region.
///
/// The mapped region holds a [`RingHeader`] followed by `capacity`
/// contiguous slots of `frame_bytes` bytes each. A frame with logical
/// index `L` lives in slot `L % capacity`; slots carry no metadata of
/// their own. The producer owns its handle mutably and is the only caller
/// of [`publish`](Self::publish); readers hold independently opened
/// handles and borrow slot bytes through the view methods.
///
/// Frames more than `capacity` behind the observed `write_idx` may have
/// been overwritten and must not be trusted. The ring never blocks and
/// never signals slow readers.
#[derive(Debug)]
pub struct ShmRing {
    region: SharedRegion,
    capacity: usize,
    frame_bytes: usize,
}

fn ring_total(capacity: usize, frame_bytes: usize) -> Result<usize, RingError> {
    if capacity == 0 || frame_bytes == 0 {
        return Err(RingError::InvalidArgument(
            "capacity and frame_bytes must be non-zero".into(),
        ));
    }
    capacity
        .checked_mul(frame_bytes)
        .and_then(|data| data.checked_add(RingHeader::SIZE))
        .ok_or_else(|| {
            RingError::InvalidArgument(format!(
                "ring of {capacity} slots x {frame_bytes} bytes overflows the address space"
            ))
        })
}

impl ShmRing {
    /// Create the named backing object, size it for `capacity` slots of
    /// `frame_bytes` bytes, map it, and initialise the header.
    pub fn create(name: &str, capacity: usize, frame_bytes: usize) -> Result<Self, RingError> {
        let total = ring_total(capacity, frame_bytes)?;
        let mut region = SharedRegion::create(name, total)?;

        let header = region.as_mut_ptr() as *mut RingHeader;
        unsafe {
            (*header).write_idx.store(0, Ordering::Relaxed);
            ptr::addr_of_mut!((*header).capacity).write(capacity as u64);
            ptr::addr_of_mut!((*header).frame_bytes).write(frame_bytes as u64);
        }

        tracing::debug!(name, capacity, frame_bytes, "created frame ring");

        Ok(Self {
            region,
            capacity,
            frame_bytes,
        })
    }

    /// Attach to an existing ring by name. The caller supplies the
    /// geometry it expects so the mapping can be sized; the header's
    /// recorded values are authoritative and a mismatch is an open error.
    pub fn open(name: &str, capacity: usize, frame_bytes: usize) -> Result<Self, RingError> {
        let total = ring_total(capacity, frame_bytes)?;
        let region = SharedRegion::open(name, total)?;

        let ring = Self {
            region,
            capacity,
            frame_bytes,
        };

        let header = ring.header();
        if header.capacity != capacity as u64 || header.frame_bytes != frame_bytes as u64 {
            return Err(RingError::ResourceOpenFailed(std::io::Error::other(
                format!(
                    "ring geometry mismatch: header records {} slots x {} bytes, expected {} x {}",
                    header.capacity, header.frame_bytes, capacity, frame_bytes
                ),
            )));
        }

        tracing::debug!(name, capacity, frame_bytes, "opened frame ring");

        Ok(ring)
    }

    fn header(&self) -> &RingHeader {
        // The region is at least RingHeader::SIZE bytes and 8-aligned by
        // construction.
        unsafe { &*(self.region.as_ptr() as *const RingHeader) }
    }

    fn data_ptr(&self) -> *const u8 {
        unsafe { self.region.as_ptr().add(RingHeader::SIZE) }
    }

    /// Number of frame slots. Immutable for the life of the ring.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of one frame in bytes. Immutable for the life of the ring.
    pub fn frame_bytes(&self) -> usize {
        self.frame_bytes
    }

    /// Current count of published frames (acquire load).
    ///
    /// After observing a value `w`, any logical index in
    /// `max(0, w - capacity) .. w` is safe to read until the producer
    /// advances past it again.
    pub fn write_idx(&self) -> u64 {
        self.header().write_idx.load(Ordering::Acquire)
    }

    /// Copy whole frames into the ring and publish them.
    ///
    /// `frames` must hold a whole number of frames
    /// (`len % frame_bytes == 0`), rejected with `InvalidArgument`
    /// otherwise. Slot bytes are written first, then a single release
    /// store advances `write_idx` by the number of frames, making them
    /// visible to acquire-side readers.
    ///
    /// There is no back-pressure: publishing more than `capacity` frames,
    /// or outrunning readers, silently overwrites the oldest slots.
    pub fn publish(&mut self, frames: &[u8]) -> Result<(), RingError> {
        if frames.len() % self.frame_bytes != 0 {
            return Err(RingError::InvalidArgument(format!(
                "buffer length {} is not a multiple of frame_bytes {}",
                frames.len(),
                self.frame_bytes
            )));
        }
        let n_frames = frames.len() / self.frame_bytes;

        // Single-producer discipline: nothing else advances write_idx.
        let idx = self.header().write_idx.load(Ordering::Relaxed);
        let capacity = self.capacity as u64;
        let frame_bytes = self.frame_bytes;
        let data = unsafe { self.region.as_mut_ptr().add(RingHeader::SIZE) };

        for i in 0..n_frames {
            let slot = ((idx + i as u64) % capacity) as usize;
            unsafe {
                ptr::copy_nonoverlapping(
                    frames.as_ptr().add(i * frame_bytes),
                    data.add(slot * frame_bytes),
                    frame_bytes,
                );
            }
        }

        self.header()
            .write_idx
            .store(idx + n_frames as u64, Ordering::Release);

        Ok(())
    }

    /// Borrow the slot bytes for logical index `logical_idx`.
    ///
    /// No check against `write_idx` is made: the caller is responsible for
    /// staying inside the valid window, otherwise the bytes may be torn
    /// between a concurrent overwrite and this read.
    pub fn frame(&self, logical_idx: u64) -> &[u8] {
        let slot = (logical_idx % self.capacity as u64) as usize;
        unsafe {
            slice::from_raw_parts(self.data_ptr().add(slot * self.frame_bytes), self.frame_bytes)
        }
    }

    /// Borrow `n_frames` contiguous slots starting at `start % capacity`.
    ///
    /// Fails with `WindowWraps` when the range crosses the ring boundary;
    /// the caller is expected to split such a request into two calls over
    /// the non-wrapping halves.
    pub fn window(&self, start: u64, n_frames: usize) -> Result<&[u8], RingError> {
        let slot = (start % self.capacity as u64) as usize;
        if slot + n_frames > self.capacity {
            return Err(RingError::WindowWraps {
                slot,
                frames: n_frames,
                capacity: self.capacity,
            });
        }
        Ok(unsafe {
            slice::from_raw_parts(
                self.data_ptr().add(slot * self.frame_bytes),
                n_frames * self.frame_bytes,
            )
        })
    }

    fn check_shape(&self, channels: usize, samples: usize) -> Result<(), RingError> {
        let shape_bytes = channels
            .checked_mul(samples)
            .and_then(|n| n.checked_mul(size_of::<f32>()));
        if shape_bytes != Some(self.frame_bytes) {
            return Err(RingError::InvalidArgument(format!(
                "shape {channels} x {samples} f32 frames do not match frame_bytes {}",
                self.frame_bytes
            )));
        }
        Ok(())
    }

    /// Read-only (channels x samples) f32 view of one frame's slot.
    ///
    /// The shape must account for the slot exactly
    /// (`channels * samples * 4 == frame_bytes`). The same caller contract
    /// as [`frame`](Self::frame) applies to `logical_idx`.
    pub fn view_frame(
        &self,
        logical_idx: u64,
        channels: usize,
        samples: usize,
    ) -> Result<ArrayView2<'_, f32>, RingError> {
        self.check_shape(channels, samples)?;
        let bytes = self.frame(logical_idx);
        debug_assert_eq!(bytes.as_ptr() as usize % size_of::<f32>(), 0);
        Ok(unsafe { ArrayView2::from_shape_ptr((channels, samples), bytes.as_ptr().cast()) })
    }

    /// Read-only (n_frames x channels x samples) f32 view over contiguous
    /// slots. Fails with `WindowWraps` like [`window`](Self::window).
    pub fn view_window(
        &self,
        start: u64,
        n_frames: usize,
        channels: usize,
        samples: usize,
    ) -> Result<ArrayView3<'_, f32>, RingError> {
        self.check_shape(channels, samples)?;
        let bytes = self.window(start, n_frames)?;
        debug_assert_eq!(bytes.as_ptr() as usize % size_of::<f32>(), 0);
        Ok(unsafe {
            ArrayView3::from_shape_ptr((n_frames, channels, samples), bytes.as_ptr().cast())
        })
    }
}
