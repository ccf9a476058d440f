use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RingError {
    #[error("Failed to create shared memory object: {0}")]
    ResourceCreateFailed(#[source] io::Error),

    #[error("Failed to open shared memory object: {0}")]
    ResourceOpenFailed(#[source] io::Error),

    #[error("Failed to size shared memory object to {total} bytes: {source}")]
    SizingFailed {
        total: usize,
        #[source]
        source: io::Error,
    },

    #[error("Failed to map shared memory object: {0}")]
    MapFailed(#[source] io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Window of {frames} frames at slot {slot} wraps a ring of {capacity} slots; split into two calls")]
    WindowWraps {
        slot: usize,
        frames: usize,
        capacity: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        let err = RingError::ResourceOpenFailed(io::Error::new(
            io::ErrorKind::NotFound,
            "no such object",
        ));
        assert_eq!(
            err.to_string(),
            "Failed to open shared memory object: no such object"
        );

        let err = RingError::WindowWraps {
            slot: 6,
            frames: 4,
            capacity: 8,
        };
        assert_eq!(
            err.to_string(),
            "Window of 4 frames at slot 6 wraps a ring of 8 slots; split into two calls"
        );

        let err = RingError::InvalidArgument("buffer length 7 is not a multiple of 8".into());
        assert_eq!(
            err.to_string(),
            "Invalid argument: buffer length 7 is not a multiple of 8"
        );
    }

    #[test]
    fn test_sizing_failed_carries_total() {
        let err = RingError::SizingFailed {
            total: 1048,
            source: io::Error::other("disk quota exceeded"),
        };
        assert!(err.to_string().contains("1048 bytes"));
        assert!(err.to_string().contains("disk quota exceeded"));
    }
}
