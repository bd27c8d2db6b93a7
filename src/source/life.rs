use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};

use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::fingerprint::content_id;
use crate::frame::packed::Frame;
use crate::frame::palette::PaletteColor;
use crate::source::FrameSource;

/// Color of a live cell.
pub const ALIVE_COLOR: PaletteColor = PaletteColor::DARK_GRAY;
/// Color of a dead cell.
pub const DEAD_COLOR: PaletteColor = PaletteColor::GRAY;

/// Conway's Game of Life (B3/S23) on a bounded board; cells past the edge count as dead.
///
/// The board is a flat row-major `Vec<bool>`. The source ends once a tick leaves the board
/// unchanged; that final still frame is produced once.
#[derive(Clone, Debug)]
pub struct LifeSource {
    width: u32,
    height: u32,
    initial: Vec<bool>,
    board: Vec<bool>,
    changed: bool,
}

impl LifeSource {
    /// Board from a row-major cell list of exactly `width * height` entries.
    pub fn new(width: u32, height: u32, initial: Vec<bool>) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if initial.len() != expected {
            return Err(ReelError::LengthMismatch {
                got: initial.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            board: initial.clone(),
            initial,
            changed: true,
        })
    }

    /// Board with `width * height / 8` cells set at seeded random positions (duplicates allowed).
    pub fn random(width: u32, height: u32, seed: u64) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::InvalidDimensions { width, height });
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = vec![false; width as usize * height as usize];
        for _ in 0..board.len() / 8 {
            let x = rng.gen_range(0..width) as usize;
            let y = rng.gen_range(0..height) as usize;
            board[y * width as usize + x] = true;
        }
        Self::new(width, height, board)
    }

    /// Board width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Board height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether `(x, y)` is alive now. Cells off the board are dead.
    pub fn is_alive(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.board[self.index(x, y)]
    }

    /// Live cell count.
    pub fn population(&self) -> usize {
        self.board.iter().filter(|&&alive| alive).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn neighbours(&self, x: u32, y: u32) -> u8 {
        let mut count = 0;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = i64::from(x) + dx;
                let ny = i64::from(y) + dy;
                if nx < 0 || ny < 0 || nx >= i64::from(self.width) || ny >= i64::from(self.height)
                {
                    continue;
                }
                if self.board[self.index(nx as u32, ny as u32)] {
                    count += 1;
                }
            }
        }
        count
    }

    fn tick(&mut self) {
        let mut next = vec![false; self.board.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.index(x, y);
                next[i] = matches!((self.board[i], self.neighbours(x, y)), (true, 2 | 3) | (false, 3));
            }
        }
        self.changed = next != self.board;
        self.board = next;
    }

    fn to_frame(&self) -> ReelResult<Frame> {
        let colors: Vec<PaletteColor> = self
            .board
            .iter()
            .map(|&alive| if alive { ALIVE_COLOR } else { DEAD_COLOR })
            .collect();
        Frame::from_colors(self.width, self.height, &colors)
    }
}

impl FrameSource for LifeSource {
    fn has_next(&mut self) -> ReelResult<bool> {
        Ok(self.changed)
    }

    fn next_frame(&mut self) -> ReelResult<Frame> {
        let frame = self.to_frame()?;
        self.tick();
        Ok(frame)
    }

    fn reset(&mut self) {
        self.board.clone_from(&self.initial);
        self.changed = true;
    }

    fn advance(&mut self, count: u64) -> ReelResult<u64> {
        let mut skipped = 0;
        while skipped < count && self.changed {
            self.tick();
            skipped += 1;
        }
        Ok(skipped)
    }

    /// Digest of the initial board, one byte per cell.
    fn identity(&self) -> ReelResult<String> {
        let bytes: Vec<u8> = self.initial.iter().map(|&alive| u8::from(alive)).collect();
        Ok(content_id(&bytes))
    }
}
