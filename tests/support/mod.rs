#![allow(dead_code)]

use blockreel::{Frame, PaintCommand, PaletteColor};

/// Minimal terminal model that replays recorded paint commands.
pub struct Screen {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Option<PaletteColor>>,
    /// How many times each cell was written.
    pub writes: Vec<u32>,
    row: usize,
    col: usize,
    background: Option<PaletteColor>,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> Self {
        let n = width as usize * height as usize;
        Self {
            width: width as usize,
            height: height as usize,
            cells: vec![None; n],
            writes: vec![0; n],
            row: 0,
            col: 0,
            background: None,
        }
    }

    pub fn apply(&mut self, commands: &[PaintCommand]) {
        for cmd in commands {
            match *cmd {
                PaintCommand::Resize { .. } | PaintCommand::Flush => {}
                PaintCommand::Clear => {
                    self.cells.fill(None);
                    self.background = None;
                }
                PaintCommand::MoveTo { row, col } => {
                    self.row = row as usize;
                    self.col = col as usize;
                }
                PaintCommand::SetBackground(color) => self.background = Some(color),
                PaintCommand::WriteRun(len) => {
                    let color = self.background.expect("write before any background");
                    for _ in 0..len {
                        assert!(self.col < self.width, "run wrapped past row end");
                        let i = self.row * self.width + self.col;
                        self.cells[i] = Some(color);
                        self.writes[i] += 1;
                        self.col += 1;
                    }
                }
            }
        }
    }

    pub fn shows(&self, frame: &Frame) -> bool {
        frame
            .colors()
            .zip(&self.cells)
            .all(|(want, got)| *got == Some(want))
    }

    pub fn reset_write_counts(&mut self) {
        self.writes.fill(0);
    }
}

pub fn frame_from(width: u32, indices: &[u8]) -> Frame {
    let colors: Vec<PaletteColor> = indices
        .iter()
        .map(|&i| PaletteColor::new(i).unwrap())
        .collect();
    Frame::from_colors(width, indices.len() as u32 / width, &colors).unwrap()
}
