use std::path::PathBuf;

/// Convenience result type used across blockreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Error taxonomy for frames, the frame cache, sources and playback.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Width or height is zero.
    #[error("invalid frame dimensions {width}x{height} (both must be > 0)")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Color list length differs from `width * height`.
    #[error("color count mismatch: got {got}, expected {expected}")]
    LengthMismatch {
        /// Colors supplied.
        got: usize,
        /// `width * height`.
        expected: usize,
    },

    /// Packed buffer length differs from the frame's packed size.
    #[error("packed buffer size mismatch: got {got} bytes, expected {expected}")]
    SizeMismatch {
        /// Bytes supplied.
        got: usize,
        /// Packed size for the dimensions.
        expected: usize,
    },

    /// Pixel coordinate outside the frame.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} frame")]
    OutOfRange {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// Frame width.
        width: u32,
        /// Frame height.
        height: u32,
    },

    /// Container built from zero frames.
    #[error("frame container must hold at least one frame")]
    EmptySequence,

    /// Cache file too short to hold a single frame.
    #[error("corrupt frame container '{}': {reason}", path.display())]
    CorruptContainer {
        /// Cache file path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Palette index of 16 or more.
    #[error("invalid palette color index {0} (must be < 16)")]
    InvalidColor(u8),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A frame producer or the external tool behind it failed.
    #[error("frame source error: {0}")]
    Source(String),

    /// Terminal or filesystem I/O.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Source`] value.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Build a [`ReelError::CorruptContainer`] value.
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptContainer {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            ReelError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            ReelError::source("x")
                .to_string()
                .contains("frame source error:")
        );
        assert!(
            ReelError::corrupt("/tmp/a.afc", "short")
                .to_string()
                .contains("corrupt frame container '/tmp/a.afc': short")
        );
    }

    #[test]
    fn io_and_other_preserve_source() {
        let err = ReelError::from(std::io::Error::other("disk gone"));
        assert!(err.to_string().contains("disk gone"));

        let err = ReelError::Other(anyhow::Error::new(std::io::Error::other("boom")));
        assert!(err.to_string().contains("boom"));
    }
}
