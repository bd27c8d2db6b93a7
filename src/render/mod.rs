pub mod diff;
/// The terminal capability and a recording implementation.
pub mod sink;
/// Crossterm-backed terminal output.
pub mod terminal;
