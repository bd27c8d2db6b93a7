//! Frame producers consumed by [`crate::PlaybackSession`].

/// Conway's Game of Life.
pub mod life;
/// Video files decoded through `ffmpeg`.
pub mod video;

use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::fingerprint::ContentId;
use crate::frame::packed::Frame;

/// A rewindable, forward-only producer of same-sized frames.
pub trait FrameSource {
    /// Whether [`FrameSource::next_frame`] will yield another frame.
    fn has_next(&mut self) -> ReelResult<bool>;
    /// Produce the next frame and move past it.
    fn next_frame(&mut self) -> ReelResult<Frame>;
    /// Rewind to the first frame.
    fn reset(&mut self);
    /// Skip up to `count` frames without building them. Must be much cheaper than `next_frame`.
    ///
    /// Returns how many frames were actually skipped, which is less than `count` when the source
    /// ends first.
    fn advance(&mut self, count: u64) -> ReelResult<u64>;
    /// Stable content identifier of the source's defining input, used as the cache key.
    fn identity(&self) -> ReelResult<String>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn has_next(&mut self) -> ReelResult<bool> {
        (**self).has_next()
    }

    fn next_frame(&mut self) -> ReelResult<Frame> {
        (**self).next_frame()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn advance(&mut self, count: u64) -> ReelResult<u64> {
        (**self).advance(count)
    }

    fn identity(&self) -> ReelResult<String> {
        (**self).identity()
    }
}

/// Source backed by an in-memory frame list.
#[derive(Clone, Debug)]
pub struct MemorySource {
    frames: Vec<Frame>,
    cursor: usize,
    resets: u64,
}

impl MemorySource {
    /// Source yielding `frames` in order.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            cursor: 0,
            resets: 0,
        }
    }

    /// Index of the next frame to be produced.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// How many times [`FrameSource::reset`] has been called.
    pub fn reset_count(&self) -> u64 {
        self.resets
    }
}

impl FrameSource for MemorySource {
    fn has_next(&mut self) -> ReelResult<bool> {
        Ok(self.cursor < self.frames.len())
    }

    fn next_frame(&mut self) -> ReelResult<Frame> {
        let frame = self
            .frames
            .get(self.cursor)
            .cloned()
            .ok_or_else(|| ReelError::source("memory source is exhausted"))?;
        self.cursor += 1;
        Ok(frame)
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.resets += 1;
    }

    fn advance(&mut self, count: u64) -> ReelResult<u64> {
        let remaining = self.frames.len().saturating_sub(self.cursor);
        let skipped = usize::try_from(count).unwrap_or(usize::MAX).min(remaining);
        self.cursor += skipped;
        Ok(skipped as u64)
    }

    /// Digest of every frame's size and packed bytes.
    fn identity(&self) -> ReelResult<String> {
        let mut id = ContentId::new();
        for frame in &self.frames {
            id.write_u32(frame.width())
                .write_u32(frame.height())
                .write_bytes(frame.as_bytes());
        }
        Ok(id.finish())
    }
}
