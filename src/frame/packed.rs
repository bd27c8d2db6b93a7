use crate::foundation::error::{ReelError, ReelResult};
use crate::frame::palette::PaletteColor;

/// Color written into the unused low nibble of an odd-sized grid.
pub const FILLER_COLOR: PaletteColor = PaletteColor::BLACK;

/// An immutable grid of palette colors packed two per byte.
///
/// Pixel `(x, y)` has linear index `i = y * width + x` and lives in byte `i / 2`: the high nibble
/// for even `i`, the low nibble for odd `i`. The packed bytes are the on-disk cache format, so
/// changing this layout invalidates existing cache files.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// Number of packed bytes for a `width` x `height` grid: `ceil(width * height / 2)`.
    pub fn packed_len(width: u32, height: u32) -> usize {
        (width as usize * height as usize).div_ceil(2)
    }

    /// A frame filled with [`FILLER_COLOR`].
    pub fn blank(width: u32, height: u32) -> ReelResult<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![pack_pair(FILLER_COLOR, FILLER_COLOR); Self::packed_len(width, height)],
        })
    }

    /// Wrap an already packed buffer (as read back from a cache file).
    ///
    /// Every nibble is a valid color by construction, so only the length is checked.
    pub fn from_packed(width: u32, height: u32, pixels: Vec<u8>) -> ReelResult<Self> {
        check_dimensions(width, height)?;
        let expected = Self::packed_len(width, height);
        if pixels.len() != expected {
            return Err(ReelError::SizeMismatch {
                got: pixels.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Pack exactly `width * height` row-major colors.
    pub fn from_colors(width: u32, height: u32, colors: &[PaletteColor]) -> ReelResult<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if colors.len() != expected {
            return Err(ReelError::LengthMismatch {
                got: colors.len(),
                expected,
            });
        }

        let mut pixels = Vec::with_capacity(Self::packed_len(width, height));
        let mut pairs = colors.chunks_exact(2);
        for pair in pairs.by_ref() {
            pixels.push(pack_pair(pair[0], pair[1]));
        }
        if let [last] = pairs.remainder() {
            pixels.push(pack_pair(*last, FILLER_COLOR));
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `width * height`.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Color at `(x, y)`. Fails with [`ReelError::OutOfRange`] outside the frame.
    pub fn color_at(&self, x: u32, y: u32) -> ReelResult<PaletteColor> {
        if x >= self.width || y >= self.height {
            return Err(ReelError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.color_at_index(y as usize * self.width as usize + x as usize))
    }

    /// Color at a linear index. Callers guarantee `index < pixel_count()`.
    pub(crate) fn color_at_index(&self, index: usize) -> PaletteColor {
        let byte = self.pixels[index / 2];
        if index.is_multiple_of(2) {
            PaletteColor::from_nibble(byte >> 4)
        } else {
            PaletteColor::from_nibble(byte)
        }
    }

    /// Colors of row `y`, left to right. Fails with [`ReelError::OutOfRange`] past the last row.
    pub fn row(&self, y: u32) -> ReelResult<impl Iterator<Item = PaletteColor> + '_> {
        if y >= self.height {
            return Err(ReelError::OutOfRange {
                x: 0,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let start = y as usize * self.width as usize;
        Ok((start..start + self.width as usize).map(move |i| self.color_at_index(i)))
    }

    /// All colors in row-major order.
    pub fn colors(&self) -> impl Iterator<Item = PaletteColor> + '_ {
        (0..self.pixel_count()).map(move |i| self.color_at_index(i))
    }

    /// The packed buffer, byte-for-byte as persisted.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume the frame, keeping the packed buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }
}

fn check_dimensions(width: u32, height: u32) -> ReelResult<()> {
    if width == 0 || height == 0 {
        return Err(ReelError::InvalidDimensions { width, height });
    }
    Ok(())
}

fn pack_pair(even: PaletteColor, odd: PaletteColor) -> u8 {
    (even.index() << 4) | odd.index()
}
