/// Frame rate and other shared value types.
pub mod core;
/// Crate-wide error type.
pub mod error;
pub mod fingerprint;
