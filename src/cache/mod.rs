/// In-memory frame sequences.
pub mod container;
/// On-disk layout of cached sequences.
pub mod store;
