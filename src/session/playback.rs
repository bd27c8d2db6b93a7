use std::time::Duration;

use crate::cache::container::FrameContainer;
use crate::cache::store::ContainerStore;
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::packed::Frame;
use crate::render::diff::{DiffRenderer, PaintStats};
use crate::render::sink::TerminalSink;
use crate::session::clock::{Clock, MonotonicClock, spin_wait};
use crate::source::FrameSource;

/// Default ceiling on the estimated in-memory cache size (8 GiB).
pub const DEFAULT_CACHE_BUDGET_BYTES: u64 = 8 * 1024 * 1024 * 1024;

/// Bits per pixel assumed when estimating cache size (one packed nibble).
pub const CACHE_BITS_PER_PIXEL: u64 = 4;

/// Estimated memory needed to hold `frames` frames of `width` x `height`.
pub fn estimated_cache_bytes(frames: u64, width: u32, height: u32) -> u64 {
    frames
        .saturating_mul(u64::from(width))
        .saturating_mul(u64::from(height))
        .saturating_mul(CACHE_BITS_PER_PIXEL)
        / 8
}

/// Frames to drop after one that took `elapsed` against a per-frame `budget`.
///
/// `floor(elapsed / budget) - 1`, so a frame that overran by less than a whole budget skips none.
pub fn frames_to_skip(elapsed: Duration, budget: Duration) -> u64 {
    if budget.is_zero() {
        return 0;
    }
    let whole = elapsed.as_nanos() / budget.as_nanos();
    u64::try_from(whole).unwrap_or(u64::MAX).saturating_sub(1)
}

/// Playback configuration.
#[derive(Clone, Debug)]
pub struct PlaybackOpts {
    /// Target frame rate; sets the per-frame budget.
    pub fps: Fps,
    /// Upper bound on frames per pass. `None` plays until the source ends.
    pub max_frames: Option<u64>,
    /// Caching is abandoned once the estimated cache size reaches this many bytes.
    pub cache_budget_bytes: u64,
}

impl Default for PlaybackOpts {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            max_frames: None,
            cache_budget_bytes: DEFAULT_CACHE_BUDGET_BYTES,
        }
    }
}

/// Where frames come from during [`PlaybackSession::play`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Frames are held in memory, loaded from or just written to the frame cache.
    Cached,
    /// Frames are generated on demand and the source is rewound after each pass.
    Live,
}

/// Summary of one playback pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PlaybackStats {
    /// Where the pass took its frames from.
    pub mode: SourceMode,
    /// Frames painted.
    pub frames_shown: u64,
    /// Frames dropped to catch up with the clock.
    pub frames_skipped: u64,
    /// Paint work summed over the pass.
    pub paint: PaintStats,
    /// Longest generate-plus-draw time of any shown frame.
    pub slowest_frame: Duration,
}

impl PlaybackStats {
    fn new(mode: SourceMode) -> Self {
        Self {
            mode,
            frames_shown: 0,
            frames_skipped: 0,
            paint: PaintStats::default(),
            slowest_frame: Duration::ZERO,
        }
    }

    /// Fold another pass into this summary.
    pub fn accumulate(&mut self, other: &PlaybackStats) {
        self.frames_shown += other.frames_shown;
        self.frames_skipped += other.frames_skipped;
        self.paint.accumulate(other.paint);
        self.slowest_frame = self.slowest_frame.max(other.slowest_frame);
    }
}

/// Drives a [`FrameSource`] onto a [`TerminalSink`] at a fixed frame rate.
///
/// [`PlaybackSession::prime`] decides between cached and live playback once per resolution;
/// [`PlaybackSession::play`] then runs one pass and may be called repeatedly to loop.
pub struct PlaybackSession<S: FrameSource, C: Clock = MonotonicClock> {
    source: S,
    store: Option<ContainerStore>,
    opts: PlaybackOpts,
    clock: C,
    renderer: DiffRenderer,
    width: u32,
    height: u32,
    mode: Option<SourceMode>,
    frames: Vec<Frame>,
    previous: Option<Frame>,
}

impl<S: FrameSource> PlaybackSession<S, MonotonicClock> {
    /// Session paced by the wall clock. Without a `store`, playback is always live.
    pub fn new(source: S, store: Option<ContainerStore>, opts: PlaybackOpts) -> Self {
        Self::with_clock(source, store, opts, MonotonicClock::new())
    }
}

impl<S: FrameSource, C: Clock> PlaybackSession<S, C> {
    /// Session paced by `clock`.
    pub fn with_clock(source: S, store: Option<ContainerStore>, opts: PlaybackOpts, clock: C) -> Self {
        Self {
            source,
            store,
            opts,
            clock,
            renderer: DiffRenderer::new(),
            width: 0,
            height: 0,
            mode: None,
            frames: Vec::new(),
            previous: None,
        }
    }

    /// `None` until [`PlaybackSession::prime`] succeeds.
    pub fn mode(&self) -> Option<SourceMode> {
        self.mode
    }

    /// Frames held in memory; empty in live mode.
    pub fn cached_frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The underlying frame source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Options the session was built with.
    pub fn opts(&self) -> &PlaybackOpts {
        &self.opts
    }

    /// Prepare playback at `width` x `height`: fill the frame cache if possible and format the
    /// terminal.
    ///
    /// A cached container for the source is used as-is. Otherwise frames are generated up front
    /// until the source ends, `max_frames` is reached, or the estimated size reaches the cache
    /// budget; in the last case the partial cache is discarded and playback goes live.
    #[tracing::instrument(skip(self, sink))]
    pub fn prime(
        &mut self,
        width: u32,
        height: u32,
        sink: &mut dyn TerminalSink,
    ) -> ReelResult<SourceMode> {
        if width == 0 || height == 0 {
            return Err(ReelError::InvalidDimensions { width, height });
        }
        self.width = width;
        self.height = height;
        self.frames.clear();
        self.previous = None;
        self.mode = None;

        let mode = self.load_or_collect()?;
        self.renderer.format(width, height, sink)?;
        self.mode = Some(mode);

        tracing::info!(?mode, frames = self.frames.len(), "playback primed");
        Ok(mode)
    }

    fn load_or_collect(&mut self) -> ReelResult<SourceMode> {
        let Some(store) = self.store.clone() else {
            return Ok(SourceMode::Live);
        };
        let identifier = self.source.identity()?;

        match store.load(self.width, self.height, &identifier) {
            Ok(Some(container)) => {
                self.frames = container.into_frames();
                return Ok(SourceMode::Cached);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "frame cache unreadable; regenerating");
            }
        }

        if !self.collect_frames()? {
            return Ok(SourceMode::Live);
        }

        let container = FrameContainer::build(identifier, std::mem::take(&mut self.frames))?;
        if let Err(e) = container.save(&store) {
            tracing::warn!(error = %e, "failed to save frame cache; continuing from memory");
        }
        self.frames = container.into_frames();
        Ok(SourceMode::Cached)
    }

    /// Pull frames into memory. Returns `false` when the cache budget was hit.
    fn collect_frames(&mut self) -> ReelResult<bool> {
        let limit = self.opts.max_frames.unwrap_or(u64::MAX);
        let budget = self.opts.cache_budget_bytes;
        let mut count = 0u64;

        while count < limit && self.source.has_next()? {
            let frame = self.source.next_frame()?;
            self.check_dims(&frame)?;
            self.frames.push(frame);
            count += 1;

            let estimate = estimated_cache_bytes(count, self.width, self.height);
            tracing::debug!(frames = count, estimated_bytes = estimate, "caching frames");
            if estimate >= budget {
                tracing::warn!(
                    frames = count,
                    estimated_bytes = estimate,
                    budget_bytes = budget,
                    "frame cache would exceed budget; playing live"
                );
                self.frames = Vec::new();
                self.source.reset();
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn check_dims(&self, frame: &Frame) -> ReelResult<()> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(ReelError::validation(format!(
                "source produced a {}x{} frame for a {}x{} session",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Play one pass from the first frame.
    ///
    /// Each frame's generate and draw time is measured on the session clock. A frame under
    /// budget is followed by a spin-wait for the remainder; a frame over budget causes
    /// [`frames_to_skip`] frames to be dropped. In live mode the source is advanced past dropped
    /// frames and rewound at the end of the pass.
    pub fn play(&mut self, sink: &mut dyn TerminalSink) -> ReelResult<PlaybackStats> {
        let mode = self
            .mode
            .ok_or_else(|| ReelError::validation("playback session must be primed before play"))?;
        let budget = self.opts.fps.frame_budget();
        let total = match mode {
            SourceMode::Cached => self.frames.len() as u64,
            SourceMode::Live => self.opts.max_frames.unwrap_or(u64::MAX),
        };

        let mut stats = PlaybackStats::new(mode);
        let mut index = 0u64;
        while index < total {
            if mode == SourceMode::Live && !self.source.has_next()? {
                break;
            }

            let generate_start = self.clock.elapsed();
            let frame = match mode {
                SourceMode::Cached => self.frames[index as usize].clone(),
                SourceMode::Live => {
                    let frame = self.source.next_frame()?;
                    self.check_dims(&frame)?;
                    frame
                }
            };
            let generate = self.clock.elapsed().saturating_sub(generate_start);

            let draw_start = self.clock.elapsed();
            let paint = self.renderer.render(&frame, self.previous.as_ref(), sink)?;
            sink.flush()?;
            let draw = self.clock.elapsed().saturating_sub(draw_start);
            self.previous = Some(frame);

            let elapsed = generate + draw;
            stats.frames_shown += 1;
            stats.paint.accumulate(paint);
            stats.slowest_frame = stats.slowest_frame.max(elapsed);

            let mut skip = if elapsed < budget {
                0
            } else {
                frames_to_skip(elapsed, budget).min(total - index - 1)
            };
            if skip > 0 && mode == SourceMode::Live {
                skip = self.source.advance(skip)?;
            }
            sink.set_title(&status_line(index, elapsed, budget, draw, generate, skip))?;
            sink.flush()?;
            tracing::trace!(frame = index, ?generate, ?draw, skip, "frame painted");

            if elapsed < budget {
                spin_wait(&self.clock, budget - elapsed);
            }
            stats.frames_skipped += skip;
            index += skip + 1;
        }

        if mode == SourceMode::Live {
            self.source.reset();
        }
        tracing::debug!(
            frames_shown = stats.frames_shown,
            frames_skipped = stats.frames_skipped,
            "playback pass finished"
        );
        Ok(stats)
    }
}

fn status_line(
    index: u64,
    elapsed: Duration,
    budget: Duration,
    draw: Duration,
    generate: Duration,
    skip: u64,
) -> String {
    let ms = |d: Duration| d.as_secs_f64() * 1000.0;
    let mut line = format!(
        "blockreel | frame {index} | {:.2}/{:.2} ms (draw {:.2}, generate {:.2})",
        ms(elapsed),
        ms(budget),
        ms(draw),
        ms(generate)
    );
    if skip > 0 {
        line.push_str(&format!(" | skipping {skip}"));
    }
    line
}
