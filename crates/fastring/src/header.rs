use std::sync::atomic::AtomicU64;

/// SAFETY & MEMORY ORDERING:
///
/// This header sits at offset 0 of every mapped ring region and is the
/// only synchronisation point between the producer and its readers.
///
/// Producer protocol:
/// 1. Copy frame bytes into the destination slots
/// 2. Publish the new count with `Ordering::Release`
///
/// Reader protocol:
/// 1. Load `write_idx` with `Ordering::Acquire`
/// 2. Read slot bytes only for logical indices strictly below that value
///    and no more than `capacity` behind it
///
/// The Release-Acquire pair guarantees every slot write made before the
/// store is visible to a reader that observed the store. A reader that
/// strays into the trailing `capacity` boundary can still race the next
/// overwrite; the protocol accepts that torn read by convention.
///
/// `capacity` and `frame_bytes` are written once during creation, before
/// any other process can observe a non-zero `write_idx`, and never change.
///
/// Alignment:
/// `#[repr(C, align(8))]` keeps the AtomicU64 naturally aligned at offset
/// 0 regardless of how the surrounding mapping was obtained, and fixes the
/// field offsets (0, 8, 16) that the on-wire layout documents.
#[repr(C, align(8))]
pub struct RingHeader {
    /// Monotonic count of frames ever published. 0 means no data yet.
    pub write_idx: AtomicU64,
    /// Number of frame slots in the ring. Immutable after creation.
    pub capacity: u64,
    /// Size of one frame slot in bytes. Immutable after creation.
    pub frame_bytes: u64,
}

impl RingHeader {
    pub const SIZE: usize = std::mem::size_of::<Self>();
}
