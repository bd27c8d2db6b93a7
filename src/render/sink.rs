use crate::foundation::error::ReelResult;
use crate::frame::palette::PaletteColor;

/// Terminal capability consumed by [`crate::DiffRenderer`].
///
/// Rows and columns are zero-based. Writing a run advances the cursor by the run's length. Any
/// error is fatal to the playback session.
pub trait TerminalSink {
    /// Resize the visible window to `width` columns by `height` rows.
    fn resize(&mut self, width: u16, height: u16) -> ReelResult<()>;
    /// Clear the whole screen.
    fn clear(&mut self) -> ReelResult<()>;
    /// Move the cursor to `(row, col)`.
    fn move_to(&mut self, row: u16, col: u16) -> ReelResult<()>;
    /// Set the background color used by subsequent writes.
    fn set_background(&mut self, color: PaletteColor) -> ReelResult<()>;
    /// Write `blanks` (a string of spaces) at the cursor.
    fn write_run(&mut self, blanks: &str) -> ReelResult<()>;

    /// Update the window title. Sinks without a title bar ignore this.
    fn set_title(&mut self, _title: &str) -> ReelResult<()> {
        Ok(())
    }

    /// Push queued output to the device. Called once per displayed frame.
    fn flush(&mut self) -> ReelResult<()> {
        Ok(())
    }
}

impl<T: TerminalSink + ?Sized> TerminalSink for &mut T {
    fn resize(&mut self, width: u16, height: u16) -> ReelResult<()> {
        (**self).resize(width, height)
    }

    fn clear(&mut self) -> ReelResult<()> {
        (**self).clear()
    }

    fn move_to(&mut self, row: u16, col: u16) -> ReelResult<()> {
        (**self).move_to(row, col)
    }

    fn set_background(&mut self, color: PaletteColor) -> ReelResult<()> {
        (**self).set_background(color)
    }

    fn write_run(&mut self, blanks: &str) -> ReelResult<()> {
        (**self).write_run(blanks)
    }

    fn set_title(&mut self, title: &str) -> ReelResult<()> {
        (**self).set_title(title)
    }

    fn flush(&mut self) -> ReelResult<()> {
        (**self).flush()
    }
}

/// One recorded sink call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaintCommand {
    /// [`TerminalSink::resize`].
    Resize {
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
    /// [`TerminalSink::clear`].
    Clear,
    /// [`TerminalSink::move_to`].
    MoveTo {
        /// Zero-based row.
        row: u16,
        /// Zero-based column.
        col: u16,
    },
    /// [`TerminalSink::set_background`].
    SetBackground(PaletteColor),
    /// Number of blank cells written.
    WriteRun(usize),
    /// [`TerminalSink::flush`].
    Flush,
}

/// Sink that records commands instead of driving a terminal.
///
/// Titles are kept separately so command assertions are not affected by status text. Like a
/// real terminal, a title only counts as shown once a flush follows it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Vec<PaintCommand>,
    queued_titles: Vec<String>,
    titles: Vec<String>,
}

impl RecordingSink {
    /// Empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded since the last [`RecordingSink::take`].
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Titles that reached the device, in order.
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Drop everything recorded so far.
    pub fn take(&mut self) -> Vec<PaintCommand> {
        self.queued_titles.clear();
        self.titles.clear();
        std::mem::take(&mut self.commands)
    }

    /// Commands other than [`PaintCommand::Flush`].
    pub fn paint_commands(&self) -> impl Iterator<Item = &PaintCommand> {
        self.commands
            .iter()
            .filter(|c| !matches!(c, PaintCommand::Flush))
    }
}

impl TerminalSink for RecordingSink {
    fn resize(&mut self, width: u16, height: u16) -> ReelResult<()> {
        self.commands.push(PaintCommand::Resize { width, height });
        Ok(())
    }

    fn clear(&mut self) -> ReelResult<()> {
        self.commands.push(PaintCommand::Clear);
        Ok(())
    }

    fn move_to(&mut self, row: u16, col: u16) -> ReelResult<()> {
        self.commands.push(PaintCommand::MoveTo { row, col });
        Ok(())
    }

    fn set_background(&mut self, color: PaletteColor) -> ReelResult<()> {
        self.commands.push(PaintCommand::SetBackground(color));
        Ok(())
    }

    fn write_run(&mut self, blanks: &str) -> ReelResult<()> {
        self.commands.push(PaintCommand::WriteRun(blanks.len()));
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> ReelResult<()> {
        self.queued_titles.push(title.to_string());
        Ok(())
    }

    fn flush(&mut self) -> ReelResult<()> {
        self.titles.append(&mut self.queued_titles);
        self.commands.push(PaintCommand::Flush);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_shown_only_after_a_flush() {
        let mut sink = RecordingSink::new();
        sink.set_title("first").unwrap();
        assert!(sink.titles().is_empty());
        sink.flush().unwrap();
        sink.set_title("second").unwrap();
        assert_eq!(sink.titles(), ["first".to_string()]);
        sink.flush().unwrap();
        assert_eq!(sink.titles(), ["first".to_string(), "second".to_string()]);
    }
}
