//! Conversion functions from domain types to wire types.

use chess_proto::{
    ChatEntryView, GameView, MoveView, SubmitMoveResponse, SuggestionResponse, SuggestionView,
    UndoResponse,
};
use oracle::Suggestion;

use crate::persistence::{StoredChatEntry, StoredMove};
use crate::session::{GameSnapshot, MoveOutcome, SuggestionReply, UndoOutcome};

pub fn convert_snapshot(snap: &GameSnapshot) -> GameView {
    let data = &snap.data;
    GameView {
        id: data.id.clone(),
        event: data.event.clone(),
        white: data.white.clone(),
        black: data.black.clone(),
        round: data.round,
        date: data.date.clone(),
        result: data.result.clone(),
        start_fen: data.start_fen.clone(),
        fen: data.fen.clone(),
        pgn: data.pgn.clone(),
        side_to_move: snap.side_to_move.as_str().to_string(),
        ply: snap.ply,
        legal_moves: snap.legal_moves.clone(),
    }
}

pub fn convert_move(mv: &StoredMove) -> MoveView {
    let created_at = chrono::DateTime::from_timestamp(mv.created_at, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    MoveView {
        ply: mv.ply,
        color: mv.color.clone(),
        piece: mv.piece.clone(),
        capture: mv.capture,
        source: mv.source.clone(),
        destination: mv.destination.clone(),
        san: mv.san.clone(),
        uci: mv.uci.clone(),
        promotion: mv.promotion.clone(),
        check: mv.check_marker.clone(),
        castle: mv.castle.clone(),
        comment: mv.comment.clone(),
        fen_before: mv.fen_before.clone(),
        fen_after: mv.fen_after.clone(),
        created_at,
    }
}

pub fn convert_chat_entry(entry: &StoredChatEntry) -> ChatEntryView {
    ChatEntryView {
        seq: entry.seq,
        role: entry.role.clone(),
        name: entry.name.clone(),
        content: entry.content.clone(),
    }
}

pub fn convert_move_outcome(outcome: &MoveOutcome) -> SubmitMoveResponse {
    SubmitMoveResponse {
        mv: convert_move(&outcome.mv),
        game: convert_snapshot(&outcome.snapshot),
        replayed: outcome.replayed,
    }
}

pub fn convert_undo_outcome(outcome: &UndoOutcome) -> UndoResponse {
    UndoResponse {
        removed: convert_move(&outcome.removed),
        game: convert_snapshot(&outcome.snapshot),
    }
}

pub fn convert_suggestion(reply: SuggestionReply) -> SuggestionResponse {
    let suggestion = match reply.suggestion {
        Suggestion::Move(token) => SuggestionView::Move { token },
        Suggestion::Text(text) => SuggestionView::Text { text },
    };
    SuggestionResponse {
        for_ply: reply.for_ply,
        suggestion,
    }
}
