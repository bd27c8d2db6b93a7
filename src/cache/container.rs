use crate::cache::store::ContainerStore;
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::packed::Frame;
use std::path::PathBuf;

/// A complete, non-empty frame sequence for one source identity and resolution.
///
/// The width and height are taken from the first frame. Keeping every frame at that size is the
/// producer's job; the container does not re-check it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameContainer {
    identifier: String,
    width: u32,
    height: u32,
    frames: Vec<Frame>,
}

impl FrameContainer {
    /// Collect `frames` under `identifier`. Fails with [`ReelError::EmptySequence`] when empty.
    pub fn build(identifier: impl Into<String>, frames: Vec<Frame>) -> ReelResult<Self> {
        let first = frames.first().ok_or(ReelError::EmptySequence)?;
        let (width, height) = (first.width(), first.height());
        Ok(Self {
            identifier: identifier.into(),
            width,
            height,
            frames,
        })
    }

    /// Cache key of the source these frames came from.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Frame width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Never true for a built container.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Bytes occupied by one frame on disk.
    pub fn frame_size(&self) -> usize {
        Frame::packed_len(self.width, self.height)
    }

    /// Frame at `index`, if any.
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// All frames in display order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Consume the container, keeping the frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Persist into `store`, replacing any file already at this container's path.
    pub fn save(&self, store: &ContainerStore) -> ReelResult<PathBuf> {
        store.save(self)
    }
}
