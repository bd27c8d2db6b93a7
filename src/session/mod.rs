//! Frame pacing and playback orchestration.

/// Time sources and busy-waiting.
pub mod clock;
/// Priming, pacing and frame skipping.
pub mod playback;
