use crate::foundation::error::{ReelError, ReelResult};

/// Index into the fixed 16-color terminal palette.
///
/// Always `< 16`, so two colors pack into one byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PaletteColor(u8);

/// Reference RGB values, in palette index order.
const PALETTE_RGB: [[u8; 3]; 16] = [
    [0, 0, 0],       // Black
    [0, 0, 139],     // DarkBlue
    [0, 100, 0],     // DarkGreen
    [0, 139, 139],   // DarkCyan
    [139, 0, 0],     // DarkRed
    [139, 0, 139],   // DarkMagenta
    [255, 165, 0],   // DarkYellow
    [128, 128, 128], // Gray
    [169, 169, 169], // DarkGray
    [0, 0, 255],     // Blue
    [0, 128, 0],     // Green
    [0, 255, 255],   // Cyan
    [255, 0, 0],     // Red
    [255, 0, 255],   // Magenta
    [255, 255, 0],   // Yellow
    [255, 255, 255], // White
];

impl PaletteColor {
    /// Black.
    pub const BLACK: Self = Self(0);
    /// Dark blue.
    pub const DARK_BLUE: Self = Self(1);
    /// Dark green.
    pub const DARK_GREEN: Self = Self(2);
    /// Dark cyan.
    pub const DARK_CYAN: Self = Self(3);
    /// Dark red.
    pub const DARK_RED: Self = Self(4);
    /// Dark magenta.
    pub const DARK_MAGENTA: Self = Self(5);
    /// Dark yellow (orange in the reference RGB table).
    pub const DARK_YELLOW: Self = Self(6);
    /// Gray.
    pub const GRAY: Self = Self(7);
    /// Dark gray.
    pub const DARK_GRAY: Self = Self(8);
    /// Blue.
    pub const BLUE: Self = Self(9);
    /// Green.
    pub const GREEN: Self = Self(10);
    /// Cyan.
    pub const CYAN: Self = Self(11);
    /// Red.
    pub const RED: Self = Self(12);
    /// Magenta.
    pub const MAGENTA: Self = Self(13);
    /// Yellow.
    pub const YELLOW: Self = Self(14);
    /// White.
    pub const WHITE: Self = Self(15);

    /// Number of palette entries.
    pub const COUNT: usize = 16;

    /// Fails with [`ReelError::InvalidColor`] for indices of 16 or more.
    pub fn new(index: u8) -> ReelResult<Self> {
        if usize::from(index) >= Self::COUNT {
            return Err(ReelError::InvalidColor(index));
        }
        Ok(Self(index))
    }

    /// Build from the low nibble of `bits`; the high nibble is ignored.
    pub(crate) fn from_nibble(bits: u8) -> Self {
        Self(bits & 0x0f)
    }

    /// Palette index, always `< 16`.
    pub fn index(self) -> u8 {
        self.0
    }

    /// Reference RGB value.
    pub fn rgb(self) -> [u8; 3] {
        PALETTE_RGB[usize::from(self.0)]
    }

    /// Closest palette entry by squared RGB distance. Ties go to the lower index.
    pub fn nearest(r: u8, g: u8, b: u8) -> Self {
        let mut best = 0usize;
        let mut best_dist = u32::MAX;
        for (i, [pr, pg, pb]) in PALETTE_RGB.iter().enumerate() {
            let dr = i32::from(*pr) - i32::from(r);
            let dg = i32::from(*pg) - i32::from(g);
            let db = i32::from(*pb) - i32::from(b);
            let dist = (dr * dr + dg * dg + db * db) as u32;
            if dist == 0 {
                return Self(i as u8);
            }
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        Self(best as u8)
    }

    /// Matching ANSI color for the terminal sink.
    pub fn to_crossterm(self) -> crossterm::style::Color {
        use crossterm::style::Color;
        match self.0 {
            0 => Color::Black,
            1 => Color::DarkBlue,
            2 => Color::DarkGreen,
            3 => Color::DarkCyan,
            4 => Color::DarkRed,
            5 => Color::DarkMagenta,
            6 => Color::DarkYellow,
            7 => Color::Grey,
            8 => Color::DarkGrey,
            9 => Color::Blue,
            10 => Color::Green,
            11 => Color::Cyan,
            12 => Color::Red,
            13 => Color::Magenta,
            14 => Color::Yellow,
            _ => Color::White,
        }
    }
}

impl TryFrom<u8> for PaletteColor {
    type Error = ReelError;

    fn try_from(index: u8) -> ReelResult<Self> {
        Self::new(index)
    }
}

/// Quantize tightly packed RGB8 pixels to palette colors.
pub fn quantize_rgb8(rgb: &[u8]) -> ReelResult<Vec<PaletteColor>> {
    if !rgb.len().is_multiple_of(3) {
        return Err(ReelError::validation(format!(
            "rgb8 buffer length {} is not a multiple of 3",
            rgb.len()
        )));
    }
    Ok(rgb
        .chunks_exact(3)
        .map(|px| PaletteColor::nearest(px[0], px[1], px[2]))
        .collect())
}
