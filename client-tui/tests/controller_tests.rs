use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chess::{format_square, AppliedMove, PieceColor, Position, STARTING_FEN};
use chess_client::{
    ChatEntryView, ChessService, ClientError, ErrorCode, GameView, MockCall, MockChessService, MoveView,
    SubmitMoveResponse, SuggestionResponse, SuggestionView, UndoResponse,
};
use client_tui::board_state::Phase;
use client_tui::controller::{BoardController, ControllerSettings, RetryAction, Speaker};
use client_tui::events::InputEvent;

const GAME_ID: &str = "g1";

fn game_view(position: &Position) -> GameView {
    GameView {
        id: GAME_ID.into(),
        event: "Casual Game".into(),
        white: "White".into(),
        black: "Black".into(),
        round: 1,
        date: "2026.01.01".into(),
        result: position.classify_termination().outcome().as_str().into(),
        start_fen: position.start_fen().into(),
        fen: position.to_fen(),
        pgn: String::new(),
        side_to_move: position.side_to_move().as_str().into(),
        ply: position.ply(),
        legal_moves: position.legal_move_tokens(),
    }
}

fn move_view(mv: &AppliedMove) -> MoveView {
    MoveView {
        ply: mv.ply,
        color: mv.color.as_str().into(),
        piece: mv.piece.san_letter().map(String::from).unwrap_or_default(),
        capture: mv.captured.is_some(),
        source: format_square(mv.from),
        destination: format_square(mv.to),
        san: mv.san.clone(),
        uci: mv.uci.clone(),
        promotion: None,
        check: mv.check.map(|c| c.as_str().into()),
        castle: mv.castle.map(|c| c.as_str().into()),
        comment: mv.termination.annotation().map(String::from),
        fen_before: mv.fen_before.clone(),
        fen_after: mv.fen_after.clone(),
        created_at: "2026-01-01T00:00:00Z".into(),
    }
}

fn rejected(code: ErrorCode, message: &str) -> ClientError {
    ClientError::Rejected {
        code,
        message: message.into(),
        legal_moves: vec![],
    }
}

/// A mock that records moves and takebacks on a shared position the way the server does.
fn rules_server(position: Arc<Mutex<Position>>) -> MockChessService {
    let moves = Arc::clone(&position);
    let undos = position;
    MockChessService::new()
        .with_submit_move_response(move |req| {
            let mut pos = moves.lock().unwrap();
            if req.expected_ply != Some(pos.ply()) {
                return Err(rejected(ErrorCode::StaleMove, "stale"));
            }
            match pos.apply(&req.token) {
                Ok(mv) => Ok(SubmitMoveResponse {
                    mv: move_view(&mv),
                    game: game_view(&pos),
                    replayed: false,
                }),
                Err(e) => Err(ClientError::Rejected {
                    code: ErrorCode::IllegalMove,
                    message: e.to_string(),
                    legal_moves: pos.legal_move_tokens(),
                }),
            }
        })
        .with_undo_response(move || {
            let mut pos = undos.lock().unwrap();
            let removed = pos.undo().ok_or_else(|| rejected(ErrorCode::NothingToUndo, "nothing"))?;
            Ok(UndoResponse {
                removed: move_view(&removed),
                game: game_view(&pos),
            })
        })
        .with_append_chat_response(|req| {
            Ok(ChatEntryView {
                seq: 10,
                role: req.role.clone(),
                name: None,
                content: req.content.clone(),
            })
        })
}

fn suggestions(replies: Vec<SuggestionResponse>) -> impl Fn(&Option<String>) -> Result<SuggestionResponse, ClientError> {
    let next = AtomicUsize::new(0);
    move |_| {
        let i = next.fetch_add(1, Ordering::SeqCst).min(replies.len() - 1);
        Ok(replies[i].clone())
    }
}

fn move_reply(for_ply: u32, token: &str) -> SuggestionResponse {
    SuggestionResponse {
        for_ply,
        suggestion: SuggestionView::Move { token: token.into() },
    }
}

fn text_reply(for_ply: u32, text: &str) -> SuggestionResponse {
    SuggestionResponse {
        for_ply,
        suggestion: SuggestionView::Text { text: text.into() },
    }
}

fn settings(oracle_side: Option<PieceColor>) -> ControllerSettings {
    ControllerSettings {
        oracle_side,
        ..ControllerSettings::default()
    }
}

fn controller(mock: &MockChessService, settings: ControllerSettings, position: &Position) -> BoardController {
    let service: Arc<dyn ChessService> = Arc::new(mock.clone());
    let moves: Vec<MoveView> = position.moves().iter().map(move_view).collect();
    BoardController::new(service, settings, game_view(position), &moves, &[]).unwrap()
}

async fn next(controller: &mut BoardController) {
    tokio::time::timeout(Duration::from_secs(5), controller.process_next())
        .await
        .expect("no controller event arrived");
}

fn play(controller: &mut BoardController, from: &str, to: &str) {
    controller.handle_input(InputEvent::PickUp(chess::parse_square(from).unwrap()));
    controller.handle_input(InputEvent::Drop(chess::parse_square(to)));
}

fn submissions(mock: &MockChessService) -> Vec<(String, Option<u32>)> {
    mock.get_calls()
        .into_iter()
        .filter_map(|call| match call {
            MockCall::SubmitMove { token, expected_ply, .. } => Some((token, expected_ply)),
            _ => None,
        })
        .collect()
}

fn count_suggestion_requests(mock: &MockChessService) -> usize {
    mock.get_calls()
        .iter()
        .filter(|call| matches!(call, MockCall::RequestSuggestion { .. }))
        .count()
}

#[tokio::test]
async fn human_move_commits_with_expected_ply() {
    let mock = rules_server(Arc::new(Mutex::new(Position::new())));
    let mut controller = controller(&mock, settings(None), &Position::new());

    play(&mut controller, "e2", "e4");
    assert!(matches!(controller.board().phase(), Phase::AwaitingCommit(_)));

    next(&mut controller).await;
    assert!(controller.board().is_idle());
    assert_eq!(controller.board().ply(), 1);
    assert_eq!(controller.game().side_to_move, "black");
    assert_eq!(controller.board().perspective(), PieceColor::Black);
    assert_eq!(submissions(&mock), vec![("e2e4".to_string(), Some(0))]);
    assert_eq!(controller.chat().last().unwrap().text, "1. e4");
}

#[tokio::test]
async fn rejected_move_restores_the_board() {
    let mock = MockChessService::new().with_submit_move_response(|req| {
        Err(ClientError::Rejected {
            code: ErrorCode::IllegalMove,
            message: format!("Illegal move: {}", req.token),
            legal_moves: vec!["d2d4".into()],
        })
    });
    let mut controller = controller(&mock, settings(None), &Position::new());
    let pieces = controller.board().pieces();

    play(&mut controller, "e2", "e4");
    next(&mut controller).await;

    let board = controller.board();
    assert!(board.is_idle());
    assert_eq!(board.position().to_fen(), STARTING_FEN);
    assert_eq!(board.pieces(), pieces);
    assert!(board.highlighted_squares().is_empty());
    let last = controller.chat().last().unwrap();
    assert_eq!(last.speaker, Speaker::System);
    assert!(last.text.contains("Illegal move: e2e4"));
    assert!(controller.notice().is_none());
}

#[tokio::test]
async fn oracle_answers_on_its_turn() {
    let mock = rules_server(Arc::new(Mutex::new(Position::new())))
        .with_suggestion_response(suggestions(vec![move_reply(1, "e7e5")]));
    let mut controller = controller(&mock, settings(Some(PieceColor::Black)), &Position::new());

    play(&mut controller, "e2", "e4");
    next(&mut controller).await; // human move recorded, oracle asked
    assert!(controller.is_oracle_turn());
    assert_eq!(controller.board().phase(), &Phase::AwaitingSuggestion);

    next(&mut controller).await; // suggestion arrives and is committed
    assert!(matches!(controller.board().phase(), Phase::AwaitingCommit(_)));
    next(&mut controller).await;

    assert!(controller.board().is_idle());
    assert_eq!(controller.board().ply(), 2);
    assert!(!controller.is_oracle_turn());
    assert_eq!(
        submissions(&mock),
        vec![("e2e4".to_string(), Some(0)), ("e7e5".to_string(), Some(1))]
    );
    assert!(mock.get_calls().contains(&MockCall::RequestSuggestion {
        game_id: GAME_ID.into(),
        mode: None,
    }));
}

#[tokio::test]
async fn human_cannot_move_for_the_oracle() {
    let mock = rules_server(Arc::new(Mutex::new(Position::new())));
    let mut controller = controller(&mock, settings(Some(PieceColor::White)), &Position::new());
    controller.handle_input(InputEvent::PickUp(chess::parse_square("e2").unwrap()));
    assert!(controller.board().is_idle());
    assert_eq!(controller.status(), Some("The oracle is to move"));
}

#[tokio::test]
async fn illegal_oracle_move_is_retried_with_a_nudge() {
    let mock = rules_server(Arc::new(Mutex::new(Position::new())))
        .with_suggestion_response(suggestions(vec![move_reply(0, "e2e5"), move_reply(0, "e2e4")]));
    let mut controller = controller(&mock, settings(Some(PieceColor::White)), &Position::new());
    controller.kick_oracle();

    next(&mut controller).await; // e2e5 suggested
    next(&mut controller).await; // rejected, nudge appended
    assert_eq!(controller.board().position().to_fen(), STARTING_FEN);
    next(&mut controller).await; // nudge stored, oracle asked again
    next(&mut controller).await; // e2e4 suggested
    next(&mut controller).await; // recorded

    assert_eq!(controller.board().ply(), 1);
    assert!(controller.notice().is_none());
    let nudged = mock.get_calls().into_iter().any(|call| {
        matches!(call, MockCall::AppendChat { content, .. } if content.contains("e2e5 is not a legal move"))
    });
    assert!(nudged);
}

#[tokio::test]
async fn text_replies_exhaust_the_retry_budget() {
    let mock = rules_server(Arc::new(Mutex::new(Position::new())))
        .with_suggestion_response(suggestions(vec![text_reply(0, "The Sicilian is sharp.")]));
    let mut controller = controller(&mock, settings(Some(PieceColor::White)), &Position::new());
    controller.kick_oracle();

    // Three suggestions with a nudge between each.
    for _ in 0..5 {
        next(&mut controller).await;
    }
    assert_eq!(count_suggestion_requests(&mock), 3);
    let notice = controller.notice().unwrap();
    assert_eq!(notice.retry, RetryAction::Suggestion);

    // Only retry is accepted while the notice is up.
    controller.handle_input(InputEvent::Undo);
    assert!(controller.notice().is_some());

    controller.handle_input(InputEvent::Retry);
    assert!(controller.notice().is_none());
    next(&mut controller).await;
    assert_eq!(count_suggestion_requests(&mock), 4);
}

#[tokio::test]
async fn transport_failure_offers_retry_with_same_ply() {
    let position = Arc::new(Mutex::new(Position::new()));
    let server = rules_server(Arc::clone(&position));
    let failures = AtomicUsize::new(0);
    let backing = Arc::clone(&position);
    let mock = server.with_submit_move_response(move |req| {
        if failures.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(ClientError::Network("connection reset".into()));
        }
        let mut pos = backing.lock().unwrap();
        let mv = pos.apply(&req.token).unwrap();
        Ok(SubmitMoveResponse {
            mv: move_view(&mv),
            game: game_view(&pos),
            replayed: false,
        })
    });
    let mut controller = controller(&mock, settings(None), &Position::new());

    play(&mut controller, "g1", "f3");
    next(&mut controller).await;
    let notice = controller.notice().unwrap().clone();
    assert!(notice.message.contains("connection reset"));
    assert!(matches!(notice.retry, RetryAction::Commit(_)));
    assert_eq!(controller.board().position().to_fen(), STARTING_FEN);

    controller.handle_input(InputEvent::Retry);
    next(&mut controller).await;
    assert_eq!(controller.board().ply(), 1);
    assert_eq!(
        submissions(&mock),
        vec![("g1f3".to_string(), Some(0)), ("g1f3".to_string(), Some(0))]
    );
}

#[tokio::test]
async fn chat_is_appended_before_asking_for_a_suggestion() {
    let mock = rules_server(Arc::new(Mutex::new(Position::new())))
        .with_suggestion_response(suggestions(vec![move_reply(0, "e2e4")]));
    let mut controller = controller(&mock, settings(None), &Position::new());

    controller.handle_input(InputEvent::ChatSubmitted("  What should I play?  ".into()));
    next(&mut controller).await;
    next(&mut controller).await;

    let calls = mock.get_calls();
    assert_eq!(
        calls[0],
        MockCall::AppendChat {
            game_id: GAME_ID.into(),
            role: "user".into(),
            content: "What should I play?".into(),
        }
    );
    assert!(matches!(calls[1], MockCall::RequestSuggestion { .. }));
    let texts: Vec<&str> = controller.chat().iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["What should I play?", "Suggested move: e2e4"]);
    // A hint is not played for the human.
    assert_eq!(controller.board().ply(), 0);
    assert!(controller.board().is_idle());
}

#[tokio::test]
async fn stale_suggestion_is_discarded() {
    let mock = rules_server(Arc::new(Mutex::new(Position::new())))
        .with_suggestion_response(suggestions(vec![move_reply(7, "e2e4")]));
    let mut controller = controller(&mock, settings(None), &Position::new());

    controller.handle_input(InputEvent::ChatSubmitted("hint?".into()));
    next(&mut controller).await;
    next(&mut controller).await;

    assert!(controller.board().is_idle());
    assert!(controller.chat().iter().all(|l| !l.text.contains("e2e4")));
}

#[tokio::test]
async fn suggestion_waits_for_pending_commit() {
    let mock = rules_server(Arc::new(Mutex::new(Position::new())))
        .with_suggestion_response(suggestions(vec![move_reply(1, "e7e5")]));
    let mut controller = controller(&mock, settings(None), &Position::new());

    // Chat and move race; either way the suggestion is only requested once
    // the move is recorded.
    controller.handle_input(InputEvent::ChatSubmitted("hint?".into()));
    play(&mut controller, "e2", "e4");
    for _ in 0..3 {
        next(&mut controller).await;
    }

    assert_eq!(controller.board().ply(), 1);
    assert_eq!(count_suggestion_requests(&mock), 1);
    assert_eq!(controller.chat().last().unwrap().text, "Suggested move: e7e5");
}

#[tokio::test]
async fn undo_against_the_oracle_takes_back_both_plies() {
    let position = Position::replay(STARTING_FEN, ["e2e4", "e7e5"]).unwrap();
    let mock = rules_server(Arc::new(Mutex::new(position.clone())));
    let mut controller = controller(&mock, settings(Some(PieceColor::Black)), &position);

    controller.handle_input(InputEvent::Undo);
    assert_eq!(controller.board().ply(), 0);
    next(&mut controller).await;
    next(&mut controller).await;

    let undos = mock
        .get_calls()
        .iter()
        .filter(|call| matches!(call, MockCall::Undo { .. }))
        .count();
    assert_eq!(undos, 2);
    assert_eq!(controller.game().ply, 0);
    assert_eq!(controller.board().position().to_fen(), STARTING_FEN);
    assert!(!controller.is_oracle_turn());
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn undo_with_no_moves_is_refused_locally() {
    let mock = rules_server(Arc::new(Mutex::new(Position::new())));
    let mut controller = controller(&mock, settings(None), &Position::new());
    controller.handle_input(InputEvent::Undo);
    assert_eq!(controller.status(), Some("No move to take back"));
    assert!(mock.get_calls().is_empty());
}

#[tokio::test]
async fn start_creates_game_and_loads_chat() {
    let mock = MockChessService::new().with_create_game_response(|_| Ok(game_view(&Position::new())));
    let service: Arc<dyn ChessService> = Arc::new(mock.clone());
    let controller = BoardController::start(service, settings(None), &Default::default())
        .await
        .unwrap();
    assert_eq!(controller.game().id, GAME_ID);
    assert!(matches!(mock.get_calls()[0], MockCall::CreateGame(_)));
    assert_eq!(
        mock.get_calls()[1],
        MockCall::GetChat {
            game_id: GAME_ID.into()
        }
    );
}
