use chess::{format_square, PieceColor, PieceKind, Square};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use crate::board_state::ClientBoardState;
use crate::ui::geometry::BoardGeometry;

#[derive(Clone, Copy, PartialEq, Eq)]
enum SquareHighlight {
    Selected,
    LegalTarget,
    LastMove,
    Warning,
    None,
}

impl SquareHighlight {
    fn bg_color(self, is_light_square: bool) -> Color {
        let (light, dark) = match self {
            Self::Selected => (Color::LightYellow, Color::Yellow),
            Self::LegalTarget => (Color::LightBlue, Color::Blue),
            Self::LastMove => (Color::Rgb(205, 210, 106), Color::Rgb(170, 162, 58)),
            Self::Warning => (Color::LightRed, Color::Red),
            Self::None => (Color::Rgb(240, 217, 181), Color::Rgb(181, 136, 99)),
        };
        if is_light_square {
            light
        } else {
            dark
        }
    }
}

pub struct BoardWidget<'a> {
    pub board: &'a ClientBoardState,
    pub geometry: BoardGeometry,
    pub title: &'a str,
}

impl BoardWidget<'_> {
    fn highlight(&self, square: Square, warnings: &[Square], highlighted: &[Square]) -> SquareHighlight {
        if self.board.selected_square() == Some(square) {
            SquareHighlight::Selected
        } else if warnings.contains(&square) {
            SquareHighlight::Warning
        } else if highlighted.contains(&square) {
            if self.board.selected_square().is_some() {
                SquareHighlight::LegalTarget
            } else {
                SquareHighlight::LastMove
            }
        } else {
            SquareHighlight::None
        }
    }
}

impl Widget for BoardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        block.render(area, buf);

        let geometry = self.geometry;
        let label_style = Style::default().fg(Color::Yellow);

        for (row, rank) in geometry.ranks().into_iter().enumerate() {
            let y = geometry.grid.y + row as u16 * geometry.square_height + geometry.square_height / 2;
            let x = geometry.grid.x.saturating_sub(2);
            if y < inner.bottom() && x >= inner.x {
                buf.set_string(x, y, (rank as u8 + 1).to_string(), label_style);
            }
        }
        let files_y = geometry.grid.y + geometry.grid.height;
        for (col, file) in geometry.files().into_iter().enumerate() {
            let x = geometry.grid.x + col as u16 * geometry.square_width + geometry.square_width / 2;
            if x < inner.right() && files_y < inner.bottom() {
                let label = char::from(b'a' + file as u8).to_string();
                buf.set_string(x, files_y, label, label_style);
            }
        }

        let warnings = self.board.warning_squares();
        let highlighted = self.board.highlighted_squares();
        for square in Square::ALL {
            let rect = geometry.square_rect(square).intersection(inner);
            if rect.is_empty() {
                continue;
            }
            let is_light_square = (square.file() as u8 + square.rank() as u8) % 2 == 1;
            let bg = self.highlight(square, &warnings, &highlighted).bg_color(is_light_square);
            buf.set_style(rect, Style::default().bg(bg));
        }

        for piece in self.board.pieces() {
            let rect = geometry.square_rect(piece.square).intersection(inner);
            if rect.is_empty() {
                continue;
            }
            let fg = match piece.color {
                PieceColor::White => Color::White,
                PieceColor::Black => Color::Black,
            };
            let glyph = piece_glyph(piece.kind, geometry.square_width);
            let width = glyph.chars().count() as u16;
            let x = rect.x + rect.width.saturating_sub(width) / 2;
            let y = rect.y + rect.height / 2;
            buf.set_string(x, y, glyph, Style::default().fg(fg).add_modifier(Modifier::BOLD));
        }
    }
}

/// Solid glyph plus letter when the square is wide enough, so the piece
/// reads the same on light and dark backgrounds.
fn piece_glyph(kind: PieceKind, square_width: u16) -> &'static str {
    let (glyph, labelled) = match kind {
        PieceKind::King => ("♚", "♚ K"),
        PieceKind::Queen => ("♛", "♛ Q"),
        PieceKind::Rook => ("♜", "♜ R"),
        PieceKind::Bishop => ("♝", "♝ B"),
        PieceKind::Knight => ("♞", "♞ N"),
        PieceKind::Pawn => ("♟", "♟ P"),
    };
    if square_width >= 7 {
        labelled
    } else {
        glyph
    }
}

/// Square name for the status line.
pub fn square_label(square: Option<Square>) -> String {
    square.map(format_square).unwrap_or_else(|| "-".to_string())
}
