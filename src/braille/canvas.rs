/// Dot bit of each (x, y) position inside a 2x4 Braille cell.
///
/// ```text
/// (0,0) (1,0)   0x01 0x08
/// (0,1) (1,1)   0x02 0x10
/// (0,2) (1,2)   0x04 0x20
/// (0,3) (1,3)   0x40 0x80
/// ```
const DOTS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

const BLANK: char = '\u{2800}';

/// Monochrome dot canvas drawn with Braille patterns (U+2800..U+28FF).
/// One terminal cell holds 2x4 dots, so a `w` x `h` cell canvas has
/// `2w` x `4h` addressable pixels.
#[derive(Clone, Debug)]
pub struct BrailleCanvas {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl BrailleCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    #[cfg(test)]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }

    /// Set a dot; negative or out-of-range coordinates are ignored.
    #[inline(always)]
    pub fn set(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= DOTS[y % 4][x % 2];
    }

    /// Braille character of one cell, blank if out of range
    pub fn char_at(&self, col: usize, row: usize) -> char {
        if col >= self.width || row >= self.height {
            return BLANK;
        }
        char::from_u32(BLANK as u32 + self.cells[row * self.width + col] as u32).unwrap_or(BLANK)
    }

    /// Non-blank cells as (col, row, char)
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &bits)| bits != 0)
            .map(|(i, _)| {
                let (col, row) = (i % self.width, i / self.width);
                (col, row, self.char_at(col, row))
            })
    }

    #[cfg(test)]
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|row| (0..self.width).map(|col| self.char_at(col, row)).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
