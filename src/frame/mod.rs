/// Packed frame storage.
pub mod packed;
/// The 16-color console palette.
pub mod palette;
