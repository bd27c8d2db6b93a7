//! Blockreel plays animations in a terminal using colored blank cells as pixels.
//!
//! Each pixel is one of the 16 console colors, stored as a packed nibble. The public API is
//! session-oriented:
//!
//! - Pick a [`FrameSource`] ([`LifeSource`], [`VideoSource`], or your own)
//! - Create a [`PlaybackSession`] with an optional [`ContainerStore`] for the frame cache
//! - [`PlaybackSession::prime`] once per resolution, then [`PlaybackSession::play`] per loop
//!
//! Frames are painted differentially by [`DiffRenderer`]: only cells that changed since the
//! previous frame are redrawn, as runs of same-colored blanks.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Packed frame-cache files.
pub mod cache;
/// Packed 4-bit frames and the console palette.
pub mod frame;
/// Differential painting and terminal sinks.
pub mod render;
pub mod session;
pub mod source;

pub use crate::foundation::core::Fps;
pub use crate::foundation::error::{ReelError, ReelResult};
pub use crate::foundation::fingerprint::{ContentId, content_id, is_valid_identifier};

pub use crate::cache::container::FrameContainer;
pub use crate::cache::store::{CONTAINER_EXT, ContainerStore};
pub use crate::frame::packed::{FILLER_COLOR, Frame};
pub use crate::frame::palette::{PaletteColor, quantize_rgb8};
pub use crate::render::diff::{DiffRenderer, PaintStats};
pub use crate::render::sink::{PaintCommand, RecordingSink, TerminalSink};
pub use crate::render::terminal::CrosstermSink;
pub use crate::session::clock::{Clock, MonotonicClock, SteppingClock, spin_wait};
pub use crate::session::playback::{
    DEFAULT_CACHE_BUDGET_BYTES, PlaybackOpts, PlaybackSession, PlaybackStats, SourceMode,
    estimated_cache_bytes, frames_to_skip,
};
pub use crate::source::life::LifeSource;
pub use crate::source::video::{VideoSource, is_ffmpeg_on_path, video_identity};
pub use crate::source::{FrameSource, MemorySource};
