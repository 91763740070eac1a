//! Mapping between terminal cells and board squares.
//!
//! The board widget and the mouse handler both use [`BoardGeometry`], so a
//! click lands on the square that was drawn under it.

use chess::{File, PieceColor, Rank, Square};
use ratatui::layout::Rect;

/// Width reserved left of the grid for rank labels.
pub const RANK_LABEL_WIDTH: u16 = 3;
/// Rows reserved below the grid for file labels.
pub const FILE_LABEL_HEIGHT: u16 = 1;

/// Square sizes in cells, largest first. Width is about twice the height so
/// squares look square in a typical terminal font.
const SQUARE_SIZES: [(u16, u16); 4] = [(11, 5), (9, 4), (7, 3), (5, 2)];
const MIN_SQUARE: (u16, u16) = (3, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    /// The 8x8 grid, labels excluded.
    pub grid: Rect,
    pub square_width: u16,
    pub square_height: u16,
    /// Side drawn at the bottom.
    pub perspective: PieceColor,
}

impl BoardGeometry {
    /// Largest board that fits `area`, centered in it.
    pub fn for_area(area: Rect, perspective: PieceColor) -> Self {
        let usable_width = area.width.saturating_sub(RANK_LABEL_WIDTH);
        let usable_height = area.height.saturating_sub(FILE_LABEL_HEIGHT);
        let (square_width, square_height) = SQUARE_SIZES
            .iter()
            .copied()
            .find(|(w, h)| w * 8 <= usable_width && h * 8 <= usable_height)
            .unwrap_or(MIN_SQUARE);

        let width = square_width * 8;
        let height = square_height * 8;
        let x = area.x + RANK_LABEL_WIDTH + usable_width.saturating_sub(width) / 2;
        let y = area.y + usable_height.saturating_sub(height) / 2;
        Self {
            grid: Rect::new(x, y, width, height),
            square_width,
            square_height,
            perspective,
        }
    }

    /// Square under the terminal cell `(column, row)`, if any.
    pub fn square_at(&self, column: u16, row: u16) -> Option<Square> {
        let inside = column >= self.grid.x
            && column < self.grid.x + self.grid.width
            && row >= self.grid.y
            && row < self.grid.y + self.grid.height;
        if !inside {
            return None;
        }
        let col = usize::from((column - self.grid.x) / self.square_width);
        let row = usize::from((row - self.grid.y) / self.square_height);
        let (file, rank) = match self.perspective {
            PieceColor::White => (col, 7 - row),
            PieceColor::Black => (7 - col, row),
        };
        Some(Square::new(File::index(file), Rank::index(rank)))
    }

    /// Cells covered by `square`.
    pub fn square_rect(&self, square: Square) -> Rect {
        let file = square.file() as u16;
        let rank = square.rank() as u16;
        let (col, row) = match self.perspective {
            PieceColor::White => (file, 7 - rank),
            PieceColor::Black => (7 - file, rank),
        };
        Rect::new(
            self.grid.x + col * self.square_width,
            self.grid.y + row * self.square_height,
            self.square_width,
            self.square_height,
        )
    }

    /// Files left to right and ranks top to bottom as drawn.
    pub fn files(&self) -> [File; 8] {
        let mut files = File::ALL;
        if self.perspective == PieceColor::Black {
            files.reverse();
        }
        files
    }

    pub fn ranks(&self) -> [Rank; 8] {
        let mut ranks = Rank::ALL;
        if self.perspective == PieceColor::White {
            ranks.reverse();
        }
        ranks
    }
}
