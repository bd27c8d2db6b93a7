//! Differential frame painter.
//!
//! Converts `(current, previous)` into the smallest sequence of colored blank runs that turns a
//! terminal showing `previous` into one showing `current`:
//! - Pixels equal to `previous` cost nothing while no run is open on their row
//! - A run extends while the color stays the same, even across unchanged pixels
//! - A color change flushes the run; painting continues only if the new pixel changed
//!
//! Rows are emitted top to bottom and each row's commands complete before the next row starts.

use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::packed::Frame;
use crate::frame::palette::PaletteColor;
use crate::render::sink::TerminalSink;

/// Per-render operation counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PaintStats {
    /// Flushed runs (one background change plus one write each).
    pub runs: u64,
    /// Cursor repositionings.
    pub cursor_moves: u64,
    /// Cells covered by all runs.
    pub cells: u64,
}

impl PaintStats {
    /// Add `other` into `self`.
    pub fn accumulate(&mut self, other: PaintStats) {
        self.runs += other.runs;
        self.cursor_moves += other.cursor_moves;
        self.cells += other.cells;
    }
}

/// Blank strings memoized by run length, sized to the frame width.
#[derive(Debug, Default)]
struct PaddingCache {
    width: u32,
    strings: Vec<Option<String>>,
}

impl PaddingCache {
    fn rebuild(&mut self, width: u32) {
        self.width = width;
        self.strings.clear();
        self.strings.resize(width as usize + 1, None);
    }

    fn get(&mut self, len: usize) -> &str {
        if len >= self.strings.len() {
            self.strings.resize(len + 1, None);
        }
        self.strings[len].get_or_insert_with(|| " ".repeat(len))
    }
}

/// Paints frames as runs of colored blanks, skipping unchanged cells.
#[derive(Debug, Default)]
pub struct DiffRenderer {
    padding: PaddingCache,
}

impl DiffRenderer {
    /// Renderer with an empty padding cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare the terminal for `width` x `height` frames: resize, clear, home the cursor and
    /// rebuild the padding cache.
    pub fn format(
        &mut self,
        width: u32,
        height: u32,
        sink: &mut dyn TerminalSink,
    ) -> ReelResult<()> {
        let (w, h) = terminal_dims(width, height)?;
        sink.resize(w, h)?;
        sink.clear()?;
        sink.move_to(0, 0)?;
        sink.flush()?;
        self.padding.rebuild(width);
        Ok(())
    }

    /// Paint `current` over a screen that shows `previous` (or nothing known).
    pub fn render(
        &mut self,
        current: &Frame,
        previous: Option<&Frame>,
        sink: &mut dyn TerminalSink,
    ) -> ReelResult<PaintStats> {
        let width = current.width();
        let height = current.height();
        terminal_dims(width, height)?;
        if let Some(prev) = previous
            && (prev.width() != width || prev.height() != height)
        {
            return Err(ReelError::validation(format!(
                "previous frame is {}x{}, current frame is {width}x{height}",
                prev.width(),
                prev.height()
            )));
        }
        if self.padding.width != width {
            self.padding.rebuild(width);
        }

        let mut stats = PaintStats::default();
        for y in 0..height {
            let row_start = y as usize * width as usize;
            let mut open: Option<(PaletteColor, usize)> = None;

            for x in 0..width {
                let index = row_start + x as usize;
                let color = current.color_at_index(index);
                let unchanged = previous.is_some_and(|p| p.color_at_index(index) == color);

                match open {
                    None => {
                        if unchanged {
                            continue;
                        }
                        sink.move_to(y as u16, x as u16)?;
                        stats.cursor_moves += 1;
                        open = Some((color, 1));
                    }
                    Some((run_color, len)) if run_color == color => {
                        open = Some((run_color, len + 1));
                    }
                    Some((run_color, len)) => {
                        self.flush_run(sink, run_color, len, &mut stats)?;
                        open = if unchanged { None } else { Some((color, 1)) };
                    }
                }
            }

            if let Some((run_color, len)) = open {
                self.flush_run(sink, run_color, len, &mut stats)?;
            }
        }

        Ok(stats)
    }

    fn flush_run(
        &mut self,
        sink: &mut dyn TerminalSink,
        color: PaletteColor,
        len: usize,
        stats: &mut PaintStats,
    ) -> ReelResult<()> {
        sink.set_background(color)?;
        sink.write_run(self.padding.get(len))?;
        stats.runs += 1;
        stats.cells += len as u64;
        Ok(())
    }
}

fn terminal_dims(width: u32, height: u32) -> ReelResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(ReelError::InvalidDimensions { width, height });
    }
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(ReelError::validation(format!(
            "{width}x{height} exceeds the terminal coordinate range"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::sink::{PaintCommand, RecordingSink};

    fn frame(width: u32, ix: &[u8]) -> Frame {
        let colors: Vec<PaletteColor> = ix.iter().map(|&i| PaletteColor::new(i).unwrap()).collect();
        Frame::from_colors(width, ix.len() as u32 / width, &colors).unwrap()
    }

    fn bg(i: u8) -> PaintCommand {
        PaintCommand::SetBackground(PaletteColor::new(i).unwrap())
    }

    fn render(current: &Frame, previous: Option<&Frame>) -> (Vec<PaintCommand>, PaintStats) {
        let mut sink = RecordingSink::new();
        let stats = DiffRenderer::new()
            .render(current, previous, &mut sink)
            .unwrap();
        (sink.take(), stats)
    }

    #[test]
    fn first_frame_paints_every_row_as_runs() {
        let cur = frame(4, &[1, 1, 2, 2, 3, 3, 3, 3]);
        let (cmds, stats) = render(&cur, None);
        assert_eq!(
            cmds,
            vec![
                PaintCommand::MoveTo { row: 0, col: 0 },
                bg(1),
                PaintCommand::WriteRun(2),
                bg(2),
                PaintCommand::WriteRun(2),
                PaintCommand::MoveTo { row: 1, col: 0 },
                bg(3),
                PaintCommand::WriteRun(4),
            ]
        );
        assert_eq!(
            stats,
            PaintStats {
                runs: 3,
                cursor_moves: 2,
                cells: 8
            }
        );
    }

    #[test]
    fn identical_frames_emit_nothing() {
        let cur = frame(3, &[1, 2, 3, 4, 5, 6]);
        let (cmds, stats) = render(&cur, Some(&cur.clone()));
        assert!(cmds.is_empty());
        assert_eq!(stats, PaintStats::default());
    }

    #[test]
    fn unchanged_pixels_close_runs_and_resume_with_a_move() {
        let prev = frame(5, &[0, 0, 0, 0, 0]);
        let cur = frame(5, &[0, 5, 5, 0, 6]);
        let (cmds, _) = render(&cur, Some(&prev));
        assert_eq!(
            cmds,
            vec![
                PaintCommand::MoveTo { row: 0, col: 1 },
                bg(5),
                PaintCommand::WriteRun(2),
                PaintCommand::MoveTo { row: 0, col: 4 },
                bg(6),
                PaintCommand::WriteRun(1),
            ]
        );
    }

    #[test]
    fn changed_neighbour_continues_without_cursor_move() {
        let prev = frame(3, &[0, 0, 0]);
        let cur = frame(3, &[1, 2, 0]);
        let (cmds, stats) = render(&cur, Some(&prev));
        assert_eq!(
            cmds,
            vec![
                PaintCommand::MoveTo { row: 0, col: 0 },
                bg(1),
                PaintCommand::WriteRun(1),
                bg(2),
                PaintCommand::WriteRun(1),
            ]
        );
        assert_eq!(stats.cursor_moves, 1);
    }

    #[test]
    fn open_run_extends_over_unchanged_pixels_of_same_color() {
        let prev = frame(3, &[0, 1, 1]);
        let cur = frame(3, &[1, 1, 1]);
        let (cmds, _) = render(&cur, Some(&prev));
        assert_eq!(
            cmds,
            vec![
                PaintCommand::MoveTo { row: 0, col: 0 },
                bg(1),
                PaintCommand::WriteRun(3),
            ]
        );
    }

    #[test]
    fn padding_cache_follows_frame_width() {
        let mut r = DiffRenderer::new();
        let mut sink = RecordingSink::new();
        r.format(4, 1, &mut sink).unwrap();
        assert_eq!(
            sink.take(),
            vec![
                PaintCommand::Resize {
                    width: 4,
                    height: 1
                },
                PaintCommand::Clear,
                PaintCommand::MoveTo { row: 0, col: 0 },
                PaintCommand::Flush,
            ]
        );

        let wide = frame(8, &[7; 8]);
        r.render(&wide, None, &mut sink).unwrap();
        assert_eq!(sink.commands().last(), Some(&PaintCommand::WriteRun(8)));
        assert_eq!(r.padding.width, 8);
    }

    #[test]
    fn mismatched_previous_frame_is_rejected() {
        let prev = frame(2, &[0, 0]);
        let cur = frame(3, &[0, 0, 0]);
        let mut sink = RecordingSink::new();
        let err = DiffRenderer::new()
            .render(&cur, Some(&prev), &mut sink)
            .unwrap_err();
        assert!(matches!(err, ReelError::Validation(_)));
        assert!(sink.commands().is_empty());
    }
}
