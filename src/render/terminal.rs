use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Print, ResetColor, SetBackgroundColor};
use crossterm::terminal::{Clear, ClearType, SetSize, SetTitle};
use crossterm::queue;

use crate::foundation::error::ReelResult;
use crate::frame::palette::PaletteColor;
use crate::render::sink::TerminalSink;

/// [`TerminalSink`] that queues crossterm escape sequences into a writer.
///
/// Output is buffered until [`TerminalSink::flush`], so one frame costs one write syscall.
/// Background changes to the color already in effect are dropped.
pub struct CrosstermSink<W: Write> {
    out: io::BufWriter<W>,
    background: Option<PaletteColor>,
}

impl CrosstermSink<io::Stdout> {
    /// Sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> CrosstermSink<W> {
    /// Sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            out: io::BufWriter::with_capacity(64 * 1024, writer),
            background: None,
        }
    }

    /// Reset colors and flush; the inner writer is returned.
    pub fn finish(mut self) -> ReelResult<W> {
        queue!(self.out, ResetColor)?;
        self.out.flush()?;
        self.out
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}

impl<W: Write> TerminalSink for CrosstermSink<W> {
    fn resize(&mut self, width: u16, height: u16) -> ReelResult<()> {
        queue!(self.out, SetSize(width, height))?;
        Ok(())
    }

    fn clear(&mut self) -> ReelResult<()> {
        queue!(self.out, ResetColor, Clear(ClearType::All))?;
        self.background = None;
        Ok(())
    }

    fn move_to(&mut self, row: u16, col: u16) -> ReelResult<()> {
        queue!(self.out, MoveTo(col, row))?;
        Ok(())
    }

    fn set_background(&mut self, color: PaletteColor) -> ReelResult<()> {
        if self.background != Some(color) {
            queue!(self.out, SetBackgroundColor(color.to_crossterm()))?;
            self.background = Some(color);
        }
        Ok(())
    }

    fn write_run(&mut self, blanks: &str) -> ReelResult<()> {
        queue!(self.out, Print(blanks))?;
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> ReelResult<()> {
        queue!(self.out, SetTitle(title))?;
        Ok(())
    }

    fn flush(&mut self) -> ReelResult<()> {
        self.out.flush()?;
        Ok(())
    }
}
