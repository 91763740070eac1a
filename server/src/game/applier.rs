//! Move commits and takebacks against a [`GameRecord`].
//!
//! Both operations work on a copy of the record and hand back the new record
//! together with the rows to persist. The caller swaps the copy in only after
//! the store accepted the write, so a failed write leaves no partial state.

use chess::uci::parse_coordinate;
use chess::{AppliedMove, Outcome};
use oracle::ConversationEntry;

use super::{GameError, GameRecord};
use crate::persistence::StoredMove;

/// Result of [`commit`].
#[derive(Debug)]
pub enum Commit {
    Applied(Box<PreparedMove>),
    /// The token repeats a recorded move: the one `expected_ply` names, or
    /// the last move when a coordinate token arrives without `expected_ply`.
    Replayed(u32),
}

#[derive(Debug)]
pub struct PreparedMove {
    pub record: GameRecord,
    pub stored: StoredMove,
    pub entry: ConversationEntry,
}

#[derive(Debug)]
pub struct PreparedUndo {
    pub record: GameRecord,
    /// Ply of the removed move.
    pub ply: u32,
    pub entry: ConversationEntry,
}

/// Validate and apply `token` to a copy of `record`.
///
/// Checks run in order: duplicate of a recorded move, finished game, stale
/// `expected_ply`, then move legality.
pub fn commit(
    record: &GameRecord,
    token: &str,
    expected_ply: Option<u32>,
    now: i64,
) -> Result<Commit, GameError> {
    let ply = record.ply();

    if let Some(expected) = expected_ply.filter(|&p| p < ply) {
        let recorded = &record.position().moves()[expected as usize];
        if same_move(recorded, token) {
            return Ok(Commit::Replayed(expected));
        }
    }

    // The last mover's source square is empty now, so the same coordinate
    // token can only be a resend.
    if expected_ply.is_none() && parse_coordinate(token).is_ok() {
        if let Some(last) = record.position().last_move() {
            if last.uci == token.trim().to_ascii_lowercase() {
                return Ok(Commit::Replayed(last.ply));
            }
        }
    }

    let outcome = record.outcome();
    if outcome.is_terminal() {
        return Err(GameError::GameOver(outcome.as_str().to_string()));
    }

    if let Some(expected) = expected_ply.filter(|&p| p != ply) {
        return Err(GameError::StaleMove {
            expected,
            actual: ply,
        });
    }

    let mut position = record.position().clone();
    let applied = position.apply(token).map_err(|error| GameError::Rejected {
        error,
        legal_moves: record.position().legal_move_tokens(),
    })?;

    let result = applied.termination.outcome();
    let stored = stored_move(record.id(), &applied, now);
    let entry = ConversationEntry::move_played(applied.color, &applied.uci);

    let mut next = record.clone();
    next.advance(position, result, now);

    tracing::info!(
        game_id = %record.id(),
        ply = applied.ply,
        san = %applied.san,
        result = %result,
        "Move applied"
    );

    Ok(Commit::Applied(Box::new(PreparedMove {
        record: next,
        stored,
        entry,
    })))
}

/// Pop the last move from a copy of `record`.
pub fn undo(record: &GameRecord, now: i64) -> Result<PreparedUndo, GameError> {
    let outcome = record.outcome();
    if outcome.is_terminal() {
        return Err(GameError::GameOver(outcome.as_str().to_string()));
    }

    let mut position = record.position().clone();
    let removed = position.undo().ok_or(GameError::NothingToUndo)?;

    let mut next = record.clone();
    next.advance(position, Outcome::InProgress, now);

    tracing::info!(game_id = %record.id(), ply = removed.ply, uci = %removed.uci, "Move taken back");

    Ok(PreparedUndo {
        record: next,
        ply: removed.ply,
        entry: ConversationEntry::takeback(&removed.uci),
    })
}

fn same_move(recorded: &AppliedMove, token: &str) -> bool {
    let token = token.trim();
    let strip = |s: &str| s.trim_end_matches(['+', '#']).to_string();
    recorded.uci.eq_ignore_ascii_case(token) || strip(&recorded.san) == strip(token)
}

pub fn stored_move(game_id: &str, applied: &AppliedMove, now: i64) -> StoredMove {
    StoredMove {
        game_id: game_id.to_string(),
        ply: applied.ply,
        color: applied.color.as_str().to_string(),
        piece: applied.piece.san_letter().map(String::from).unwrap_or_default(),
        capture: applied.captured.is_some(),
        source: chess::format_square(applied.from),
        destination: chess::format_square(applied.to),
        san: applied.san.clone(),
        uci: applied.uci.clone(),
        promotion: applied.promotion.map(|p| p.to_char_lower().to_string()),
        check_marker: applied.check.map(|c| c.as_str().to_string()),
        castle: applied.castle.map(|c| c.as_str().to_string()),
        comment: applied.termination.annotation().map(String::from),
        fen_before: applied.fen_before.clone(),
        fen_after: applied.fen_after.clone(),
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::{MoveError, STARTING_FEN};
    use chess_proto::CreateGameRequest;

    fn fresh() -> GameRecord {
        GameRecord::create("g1".into(), &CreateGameRequest::default(), "2024.03.01", 0).unwrap()
    }

    fn play(record: GameRecord, token: &str) -> GameRecord {
        match commit(&record, token, None, 1).unwrap() {
            Commit::Applied(prepared) => prepared.record,
            Commit::Replayed(_) => panic!("unexpected replay"),
        }
    }

    #[test]
    fn test_first_move() {
        let record = fresh();
        let Commit::Applied(prepared) = commit(&record, "e2e4", None, 1).unwrap() else {
            panic!("expected applied");
        };
        assert_eq!(prepared.stored.ply, 0);
        assert_eq!(prepared.stored.color, "white");
        assert_eq!(prepared.stored.san, "e4");
        assert_eq!(prepared.stored.fen_before, STARTING_FEN);
        assert_eq!(
            prepared.record.data().fen,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert_eq!(prepared.entry.content, "white: e2e4");
        // The source record is untouched.
        assert_eq!(record.ply(), 0);
    }

    #[test]
    fn test_san_token_and_details() {
        let record = play(play(play(fresh(), "e4"), "d5"), "exd5");
        let last = record.position().last_move().unwrap();
        let stored = stored_move("g1", last, 0);
        assert!(stored.capture);
        assert_eq!(stored.uci, "e4d5");
        assert_eq!(stored.piece, "");
        assert!(record.data().pgn.contains("1. e4 d5 2. exd5 *"));
    }

    #[test]
    fn test_fools_mate_sets_result_once() {
        let mut record = fresh();
        for token in ["f2f3", "e7e5", "g2g4"] {
            record = play(record, token);
        }
        let Commit::Applied(prepared) = commit(&record, "d8h4", None, 1).unwrap() else {
            panic!("expected applied");
        };
        assert_eq!(prepared.record.data().result, "0-1");
        assert_eq!(prepared.stored.check_marker.as_deref(), Some("#"));
        assert_eq!(prepared.stored.comment.as_deref(), Some("checkmate"));

        let over = commit(&prepared.record, "e2e4", None, 2);
        assert!(matches!(over, Err(GameError::GameOver(r)) if r == "0-1"));
        assert!(matches!(undo(&prepared.record, 2), Err(GameError::GameOver(_))));
    }

    #[test]
    fn test_rejection_carries_legal_moves() {
        match commit(&fresh(), "e2e5", None, 1) {
            Err(GameError::Rejected {
                error: MoveError::IllegalMove(_),
                legal_moves,
            }) => assert_eq!(legal_moves.len(), 20),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            commit(&fresh(), "zz", None, 1),
            Err(GameError::Rejected {
                error: MoveError::InvalidSyntax(_),
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_with_expected_ply_is_replayed() {
        let record = play(fresh(), "e2e4");
        assert!(matches!(
            commit(&record, "e2e4", Some(0), 2).unwrap(),
            Commit::Replayed(0)
        ));
        assert!(matches!(
            commit(&record, "e4", Some(0), 2).unwrap(),
            Commit::Replayed(0)
        ));
        assert!(matches!(
            commit(&record, "d2d4", Some(0), 2),
            Err(GameError::StaleMove {
                expected: 0,
                actual: 1
            })
        ));
        assert!(matches!(
            commit(&record, "e7e5", Some(3), 2),
            Err(GameError::StaleMove { .. })
        ));
    }

    #[test]
    fn test_resent_coordinate_move_without_expected_ply_is_replayed() {
        let record = play(fresh(), "e2e4");
        assert!(matches!(
            commit(&record, "e2e4", None, 2).unwrap(),
            Commit::Replayed(0)
        ));
        assert_eq!(record.ply(), 1);

        // Only the last move counts; SAN resends are not guessed at.
        let record = play(record, "e7e5");
        assert!(matches!(
            commit(&record, "e2e4", None, 3),
            Err(GameError::Rejected { .. })
        ));
        assert!(matches!(
            commit(&record, "e5", None, 3),
            Err(GameError::Rejected { .. })
        ));
    }

    #[test]
    fn test_resend_of_the_final_move_is_replayed_not_game_over() {
        let mut record = fresh();
        for token in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            record = play(record, token);
        }
        assert!(matches!(
            commit(&record, "d8h4", None, 5).unwrap(),
            Commit::Replayed(3)
        ));
        assert!(matches!(commit(&record, "a2a3", None, 5), Err(GameError::GameOver(_))));
    }

    #[test]
    fn test_undo_restores_start() {
        let record = play(fresh(), "e2e4");
        let prepared = undo(&record, 2).unwrap();
        assert_eq!(prepared.ply, 0);
        assert_eq!(prepared.record.data().fen, STARTING_FEN);
        assert_eq!(prepared.record.position().side_to_move(), chess::PieceColor::White);
        assert_eq!(prepared.entry.content, "takeback e2e4");
        assert!(matches!(undo(&prepared.record, 3), Err(GameError::NothingToUndo)));
    }
}
