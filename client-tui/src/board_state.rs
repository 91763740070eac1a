//! Client-side board state machine.
//!
//! Two positions are kept: `confirmed` is the last one the server
//! acknowledged, `shown` is what the user sees. They differ only while a
//! move is awaiting commit; every other transition keeps them equal.
//!
//! ```text
//! Idle --pick_up--> Dragging --drop (legal)--> AwaitingCommit --confirm/reject--> Idle
//!                            --drop (other)--> Idle
//! Idle --begin_suggestion--> AwaitingSuggestion --begin_commit--> AwaitingCommit
//! ```

use chess::{format_square, AppliedMove, PieceColor, PieceKind, PlacedPiece, Position, Rank, Square};
use chess_client::{GameView, MoveView, SubmitMoveResponse};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardStateError {
    #[error("Cannot {action} while {phase}")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },
    #[error("No piece of the side to move on {0}")]
    NotMovable(String),
    #[error("The game is over")]
    GameOver,
    #[error("No move to take back")]
    NothingToUndo,
    #[error("Server sent an unusable position: {0}")]
    BadPosition(String),
}

/// Who produced a move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOrigin {
    Human,
    Oracle,
}

/// A move submitted to the server and not yet acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveAttempt {
    pub token: String,
    pub origin: MoveOrigin,
    /// Ply the move occupies once recorded.
    pub expected_ply: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dragging { from: Square, targets: Vec<Square> },
    AwaitingCommit(MoveAttempt),
    AwaitingSuggestion,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging a piece",
            Self::AwaitingCommit(_) => "a move is awaiting the server",
            Self::AwaitingSuggestion => "waiting for a suggestion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The piece went back to its square; nothing changed.
    Snapback,
    /// The move was applied locally and must be committed.
    Speculative(MoveAttempt),
}

#[derive(Debug, Clone)]
pub struct ClientBoardState {
    confirmed: Position,
    shown: Position,
    phase: Phase,
    /// Server ply of `confirmed`. Equal to `confirmed.ply()` unless the
    /// history could not be replayed locally.
    ply: u32,
    flipped: bool,
}

impl ClientBoardState {
    pub fn new(position: Position) -> Self {
        Self {
            ply: position.ply(),
            shown: position.clone(),
            confirmed: position,
            phase: Phase::Idle,
            flipped: false,
        }
    }

    /// Rebuild from the server's view of a game and its recorded moves.
    pub fn from_game(game: &GameView, moves: &[MoveView]) -> Result<Self, BoardStateError> {
        let mut state = Self::new(load_position(game, moves)?);
        state.ply = game.ply;
        Ok(state)
    }

    /// Replace everything with the server's view, keeping the view flip.
    pub fn reload(&mut self, game: &GameView, moves: &[MoveView]) -> Result<(), BoardStateError> {
        let flipped = self.flipped;
        *self = Self::from_game(game, moves)?;
        self.flipped = flipped;
        Ok(())
    }

    /// Bring the confirmed position in line with `game` after a server-side
    /// change the client already mirrored (an undo). Falls back to the bare
    /// position when the local history disagrees.
    pub fn adopt(&mut self, game: &GameView) -> Result<(), BoardStateError> {
        if self.confirmed.to_fen() != game.fen {
            tracing::debug!(fen = %game.fen, "Local history diverged; adopting server position");
            self.confirmed = Position::from_fen(&game.fen)
                .map_err(|e| BoardStateError::BadPosition(e.to_string()))?;
        }
        self.shown = self.confirmed.clone();
        self.ply = game.ply;
        self.phase = Phase::Idle;
        Ok(())
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// The position on screen, including an unconfirmed move.
    pub fn position(&self) -> &Position {
        &self.shown
    }

    pub fn confirmed(&self) -> &Position {
        &self.confirmed
    }

    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.confirmed.side_to_move()
    }

    pub fn is_game_over(&self) -> bool {
        self.confirmed.classify_termination().is_terminal()
    }

    pub fn pick_up(&mut self, square: Square) -> Result<Vec<Square>, BoardStateError> {
        if !self.is_idle() {
            return Err(self.wrong_phase("pick up a piece"));
        }
        if self.is_game_over() {
            return Err(BoardStateError::GameOver);
        }
        match self.shown.piece_at(square) {
            Some((color, _)) if color == self.shown.side_to_move() => {}
            _ => return Err(BoardStateError::NotMovable(format_square(square))),
        }
        let targets = self.shown.legal_destinations(square);
        self.phase = Phase::Dragging {
            from: square,
            targets: targets.clone(),
        };
        Ok(targets)
    }

    /// Drop the dragged piece on `target` (`None` when released off the board).
    pub fn drop(&mut self, target: Option<Square>) -> Result<DropOutcome, BoardStateError> {
        let Phase::Dragging { from, targets } = &self.phase else {
            return Err(self.wrong_phase("drop a piece"));
        };
        let from = *from;
        let to = target.filter(|sq| targets.contains(sq));
        self.phase = Phase::Idle;

        let Some(to) = to else {
            return Ok(DropOutcome::Snapback);
        };
        let token = self.drag_token(from, to);
        if let Err(e) = self.shown.apply(&token) {
            tracing::debug!(%token, "Dropped move did not apply: {}", e);
            return Ok(DropOutcome::Snapback);
        }
        let attempt = MoveAttempt {
            token,
            origin: MoveOrigin::Human,
            expected_ply: self.ply,
        };
        self.phase = Phase::AwaitingCommit(attempt.clone());
        Ok(DropOutcome::Speculative(attempt))
    }

    /// Start committing a move that did not come from a drag: an oracle
    /// suggestion or a retried submission. The move is shown speculatively
    /// when it applies locally; otherwise the server has the final word.
    pub fn begin_commit(&mut self, token: &str, origin: MoveOrigin) -> Result<MoveAttempt, BoardStateError> {
        if !matches!(self.phase, Phase::Idle | Phase::AwaitingSuggestion) {
            return Err(self.wrong_phase("commit a move"));
        }
        if self.is_game_over() {
            return Err(BoardStateError::GameOver);
        }
        if let Err(e) = self.shown.apply(token) {
            tracing::debug!(%token, "Move not shown locally: {}", e);
        }
        let attempt = MoveAttempt {
            token: token.trim().to_string(),
            origin,
            expected_ply: self.ply,
        };
        self.phase = Phase::AwaitingCommit(attempt.clone());
        Ok(attempt)
    }

    pub fn begin_suggestion(&mut self) -> Result<(), BoardStateError> {
        if !self.is_idle() {
            return Err(self.wrong_phase("request a suggestion"));
        }
        self.phase = Phase::AwaitingSuggestion;
        Ok(())
    }

    /// Leave `AwaitingSuggestion`. Returns false when not waiting.
    pub fn end_suggestion(&mut self) -> bool {
        if self.phase == Phase::AwaitingSuggestion {
            self.phase = Phase::Idle;
            true
        } else {
            false
        }
    }

    /// The server recorded the pending move. Adopts its position when the
    /// local speculation disagrees.
    pub fn confirm(&mut self, response: &SubmitMoveResponse) -> Result<MoveAttempt, BoardStateError> {
        let Phase::AwaitingCommit(attempt) = &self.phase else {
            return Err(self.wrong_phase("confirm a move"));
        };
        let attempt = attempt.clone();
        self.phase = Phase::Idle;

        let game = &response.game;
        if self.shown.to_fen() != game.fen {
            let mut rebuilt = self.confirmed.clone();
            let replayed = rebuilt.apply(&response.mv.uci).is_ok() && rebuilt.to_fen() == game.fen;
            self.shown = if replayed {
                rebuilt
            } else {
                tracing::debug!(fen = %game.fen, "Adopting server position after commit");
                Position::from_fen(&game.fen).map_err(|e| BoardStateError::BadPosition(e.to_string()))?
            };
        }
        self.confirmed = self.shown.clone();
        self.ply = game.ply;
        Ok(attempt)
    }

    /// The server refused the pending move: restore the confirmed position.
    pub fn reject(&mut self) -> Result<MoveAttempt, BoardStateError> {
        let Phase::AwaitingCommit(attempt) = &self.phase else {
            return Err(self.wrong_phase("reject a move"));
        };
        let attempt = attempt.clone();
        self.phase = Phase::Idle;
        self.shown = self.confirmed.clone();
        Ok(attempt)
    }

    /// Pop the last confirmed move locally. The caller asks the server to
    /// do the same and then calls [`adopt`](Self::adopt).
    pub fn undo_local(&mut self) -> Result<Option<AppliedMove>, BoardStateError> {
        if !self.is_idle() {
            return Err(self.wrong_phase("take back a move"));
        }
        if self.ply == 0 {
            return Err(BoardStateError::NothingToUndo);
        }
        let removed = self.confirmed.undo();
        self.shown = self.confirmed.clone();
        self.ply -= 1;
        Ok(removed)
    }

    pub fn toggle_flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Side shown at the bottom: the side to move, unless flipped by hand.
    pub fn perspective(&self) -> PieceColor {
        let side = self.confirmed.side_to_move();
        if self.flipped {
            side.opposite()
        } else {
            side
        }
    }

    pub fn pieces(&self) -> Vec<PlacedPiece> {
        self.shown.piece_map()
    }

    pub fn selected_square(&self) -> Option<Square> {
        match &self.phase {
            Phase::Dragging { from, .. } => Some(*from),
            _ => None,
        }
    }

    /// Legal targets while dragging, otherwise the last move shown.
    pub fn highlighted_squares(&self) -> Vec<Square> {
        match &self.phase {
            Phase::Dragging { from, targets } => std::iter::once(*from).chain(targets.iter().copied()).collect(),
            _ => self
                .shown
                .last_move()
                .map(|mv| vec![mv.from, mv.to])
                .unwrap_or_default(),
        }
    }

    /// King in check and the pieces giving check.
    pub fn warning_squares(&self) -> Vec<Square> {
        let Some(king) = self.shown.king_in_check() else {
            return Vec::new();
        };
        let attacker = self.shown.side_to_move().opposite();
        std::iter::once(king)
            .chain(self.shown.attackers_of(king, attacker))
            .collect()
    }

    fn drag_token(&self, from: Square, to: Square) -> String {
        let promotes = matches!(self.shown.piece_at(from), Some((_, PieceKind::Pawn)))
            && matches!(to.rank(), Rank::First | Rank::Eighth);
        let suffix = if promotes { "q" } else { "" };
        format!("{}{}{}", format_square(from), format_square(to), suffix)
    }

    fn wrong_phase(&self, action: &'static str) -> BoardStateError {
        BoardStateError::WrongPhase {
            action,
            phase: self.phase.name(),
        }
    }
}

fn load_position(game: &GameView, moves: &[MoveView]) -> Result<Position, BoardStateError> {
    match Position::replay(&game.start_fen, moves.iter().map(|m| m.uci.as_str())) {
        Ok(position) if position.to_fen() == game.fen => Ok(position),
        Ok(_) => {
            tracing::warn!(game_id = %game.id, "Replayed moves disagree with server position");
            Position::from_fen(&game.fen).map_err(|e| BoardStateError::BadPosition(e.to_string()))
        }
        Err(e) => {
            tracing::warn!(game_id = %game.id, "Could not replay moves: {}", e);
            Position::from_fen(&game.fen).map_err(|e| BoardStateError::BadPosition(e.to_string()))
        }
    }
}
