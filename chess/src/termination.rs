//! Game termination classification.

use cozy_chess::{Board, Color, GameStatus, Piece, Square};

/// Halfmove clock value at which the seventy-five-move rule ends the game.
pub const SEVENTY_FIVE_MOVE_HALFMOVES: u32 = 150;

/// Halfmove clock value at which cozy-chess starts reporting a draw.
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Number of occurrences of a position that ends the game.
pub const FIVEFOLD_REPETITION: usize = 5;

/// How a position stands, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    InProgress,
    /// White delivered mate.
    CheckmateWhite,
    /// Black delivered mate.
    CheckmateBlack,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoveRule,
    FivefoldRepetition,
    /// A draw the rules library reports that none of the above covers. The
    /// fifty-move rule is a claim, not a termination, so it never lands here.
    OtherDraw,
}

/// Result token as written in game notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    InProgress,
    WhiteWins,
    BlackWins,
    Draw,
}

impl Termination {
    pub fn is_terminal(self) -> bool {
        self != Self::InProgress
    }

    pub fn outcome(self) -> Outcome {
        match self {
            Self::InProgress => Outcome::InProgress,
            Self::CheckmateWhite => Outcome::WhiteWins,
            Self::CheckmateBlack => Outcome::BlackWins,
            Self::Stalemate
            | Self::InsufficientMaterial
            | Self::SeventyFiveMoveRule
            | Self::FivefoldRepetition
            | Self::OtherDraw => Outcome::Draw,
        }
    }

    /// Short annotation stored with the move that ended the game.
    pub fn annotation(self) -> Option<&'static str> {
        match self {
            Self::InProgress => None,
            Self::CheckmateWhite | Self::CheckmateBlack => Some("checkmate"),
            Self::Stalemate => Some("stalemate"),
            Self::InsufficientMaterial => Some("insufficient material"),
            Self::SeventyFiveMoveRule => Some("seventy-five-move rule"),
            Self::FivefoldRepetition => Some("fivefold repetition"),
            Self::OtherDraw => Some("draw"),
        }
    }
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "*",
            Self::WhiteWins => "1-0",
            Self::BlackWins => "0-1",
            Self::Draw => "1/2-1/2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "*" => Some(Self::InProgress),
            "1-0" => Some(Self::WhiteWins),
            "0-1" => Some(Self::BlackWins),
            "1/2-1/2" => Some(Self::Draw),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Self::InProgress
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `board` given the hashes of every position reached so far
/// (including the current one) and the number of halfmoves since the last
/// capture or pawn move.
///
/// cozy-chess saturates its own halfmove clock at 100 and reports the board
/// drawn from then on, so the longer count is tracked by the caller and that
/// report is ignored.
pub fn classify(board: &Board, history: &[u64], halfmoves: u32) -> Termination {
    match board.status() {
        GameStatus::Won => {
            // The side to move has been mated.
            return match board.side_to_move() {
                Color::White => Termination::CheckmateBlack,
                Color::Black => Termination::CheckmateWhite,
            };
        }
        GameStatus::Drawn if board.checkers().is_empty() && !has_legal_move(board) => {
            return Termination::Stalemate;
        }
        _ => {}
    }

    if is_insufficient_material(board) {
        return Termination::InsufficientMaterial;
    }
    if halfmoves >= SEVENTY_FIVE_MOVE_HALFMOVES {
        return Termination::SeventyFiveMoveRule;
    }
    let current = board.hash();
    if history.iter().filter(|h| **h == current).count() >= FIVEFOLD_REPETITION {
        return Termination::FivefoldRepetition;
    }
    if board.status() == GameStatus::Drawn && u32::from(board.halfmove_clock()) < FIFTY_MOVE_HALFMOVES {
        return Termination::OtherDraw;
    }
    Termination::InProgress
}

fn has_legal_move(board: &Board) -> bool {
    board.generate_moves(|mvs| !mvs.is_empty())
}

/// Neither side can possibly mate: bare kings, a single minor piece, or
/// bishops that all stand on one square color.
pub fn is_insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    if !heavy.is_empty() {
        return false;
    }

    let knights = board.pieces(Piece::Knight);
    let bishops = board.pieces(Piece::Bishop);
    let minors = knights.len() + bishops.len();

    if minors <= 1 {
        return true;
    }
    if !knights.is_empty() {
        return false;
    }

    let mut colors = bishops.into_iter().map(is_light_square);
    match colors.next() {
        Some(first) => colors.all(|c| c == first),
        None => true,
    }
}

fn is_light_square(sq: Square) -> bool {
    (sq.file() as u8 + sq.rank() as u8) % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    #[test]
    fn test_checkmate_attributed_to_mating_side() {
        // Fool's mate: White is mated.
        let b = board("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        let t = classify(&b, &[b.hash()], 0);
        assert_eq!(t, Termination::CheckmateBlack);
        assert_eq!(t.outcome().as_str(), "0-1");
    }

    #[test]
    fn test_stalemate() {
        let b = board("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(classify(&b, &[b.hash()], 0), Termination::Stalemate);
        assert_eq!(Termination::Stalemate.outcome(), Outcome::Draw);
    }

    #[test]
    fn test_insufficient_material() {
        assert!(is_insufficient_material(&board("8/8/4k3/8/8/3K4/8/8 w - - 0 1")));
        assert!(is_insufficient_material(&board("8/8/4k3/8/8/3KN3/8/8 w - - 0 1")));
        // Same-colored bishops (c1 and f4 are both dark).
        assert!(is_insufficient_material(&board("8/8/4k3/8/5b2/3K4/8/2B5 w - - 0 1")));
        assert!(!is_insufficient_material(&board("8/8/4k3/8/8/3KNN2/8/8 w - - 0 1")));
        assert!(!is_insufficient_material(&board("8/8/4k3/8/8/3K4/4P3/8 w - - 0 1")));
    }

    #[test]
    fn test_fifty_move_mark_does_not_end_the_game() {
        let b = board("8/8/4k3/8/8/3K4/4R3/8 w - - 100 100");
        assert_eq!(classify(&b, &[b.hash()], 100), Termination::InProgress);
        assert_eq!(classify(&b, &[b.hash()], 149), Termination::InProgress);
        assert_eq!(classify(&b, &[b.hash()], 150), Termination::SeventyFiveMoveRule);
    }

    #[test]
    fn test_fivefold_repetition() {
        let b = board("8/8/4k3/8/8/3K4/4R3/8 w - - 10 40");
        let h = b.hash();
        assert_eq!(classify(&b, &[h, 1, h, 2, h, 3, h], 10), Termination::InProgress);
        assert_eq!(classify(&b, &[h, 1, h, 2, h, 3, h, 4, h], 10), Termination::FivefoldRepetition);
    }

    #[test]
    fn test_outcome_tokens() {
        for o in [Outcome::InProgress, Outcome::WhiteWins, Outcome::BlackWins, Outcome::Draw] {
            assert_eq!(Outcome::parse(o.as_str()), Some(o));
        }
        assert_eq!(Outcome::parse("2-0"), None);
    }
}
