//! Board controller: owns the board state and turns input and network
//! completions into transitions.
//!
//! Network calls run on spawned tasks. Their results come back through an
//! unbounded queue that the render loop drains once per tick, so the board
//! state is only ever touched from the render loop. Results may arrive in
//! any order; suggestions carry the ply they were computed for and are
//! dropped when the game has moved on.

use std::future::Future;
use std::sync::Arc;

use chess::{PieceColor, Square};
use chess_client::{
    AppendChatRequest, ChatEntryView, ChessService, ClientError, CreateGameRequest, ErrorCode, GameView,
    MoveView, SubmitMoveRequest, SubmitMoveResponse, SuggestionResponse, SuggestionView, UndoResponse,
};
use tokio::sync::mpsc;

use crate::board_state::{BoardStateError, ClientBoardState, DropOutcome, MoveAttempt, MoveOrigin};
use crate::events::{ControllerEvent, InputEvent};

pub const DEFAULT_ORACLE_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Side the oracle plays; `None` for a game between two humans.
    pub oracle_side: Option<PieceColor>,
    /// Attempts the oracle gets to produce a legal move before the user is asked.
    pub oracle_retries: u32,
    /// Suggestion mode sent to the server; its default when `None`.
    pub suggestion_mode: Option<String>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            oracle_side: Some(PieceColor::Black),
            oracle_retries: DEFAULT_ORACLE_RETRIES,
            suggestion_mode: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Oracle,
    /// Moves and rule messages.
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub speaker: Speaker,
    pub text: String,
}

/// What "retry" does for the current notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryAction {
    Commit(MoveAttempt),
    Suggestion,
    Chat(String),
    Reload,
}

/// A failure the user must answer with retry or quit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub retry: RetryAction,
}

pub struct BoardController {
    service: Arc<dyn ChessService>,
    settings: ControllerSettings,
    game: GameView,
    board: ClientBoardState,
    chat: Vec<ChatLine>,
    notice: Option<Notice>,
    status: Option<String>,
    oracle_attempts: u32,
    suggestion_in_flight: bool,
    suggestion_deferred: bool,
    undos_in_flight: u32,
    reloading: bool,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    events_rx: mpsc::UnboundedReceiver<ControllerEvent>,
}

impl BoardController {
    /// Controller for a game whose state has already been fetched.
    pub fn new(
        service: Arc<dyn ChessService>,
        settings: ControllerSettings,
        game: GameView,
        moves: &[MoveView],
        chat: &[ChatEntryView],
    ) -> Result<Self, BoardStateError> {
        let board = ClientBoardState::from_game(&game, moves)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            service,
            settings,
            game,
            board,
            chat: chat.iter().map(chat_line).collect(),
            notice: None,
            status: None,
            oracle_attempts: 0,
            suggestion_in_flight: false,
            suggestion_deferred: false,
            undos_in_flight: 0,
            reloading: false,
            events_tx,
            events_rx,
        })
    }

    /// Create a new game on the server and start playing it.
    pub async fn start(
        service: Arc<dyn ChessService>,
        settings: ControllerSettings,
        request: &CreateGameRequest,
    ) -> anyhow::Result<Self> {
        let game = service.create_game(request).await?;
        tracing::info!(game_id = %game.id, "Created game");
        let chat = service.get_chat(&game.id).await?;
        let mut controller = Self::new(service, settings, game, &[], &chat)?;
        controller.kick_oracle();
        Ok(controller)
    }

    /// Continue a game stored on the server.
    pub async fn resume(
        service: Arc<dyn ChessService>,
        settings: ControllerSettings,
        game_id: &str,
    ) -> anyhow::Result<Self> {
        let game = service.get_game(game_id).await?;
        let moves = service.get_moves(game_id).await?;
        let chat = service.get_chat(game_id).await?;
        tracing::info!(game_id = %game.id, ply = game.ply, "Resuming game");
        let mut controller = Self::new(service, settings, game, &moves, &chat)?;
        controller.kick_oracle();
        Ok(controller)
    }

    pub fn board(&self) -> &ClientBoardState {
        &self.board
    }

    pub fn game(&self) -> &GameView {
        &self.game
    }

    pub fn chat(&self) -> &[ChatLine] {
        &self.chat
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn is_oracle_turn(&self) -> bool {
        self.settings.oracle_side == Some(self.board.side_to_move())
    }

    /// Waiting on the server for anything the user started.
    pub fn is_busy(&self) -> bool {
        !self.board.is_idle() || self.suggestion_in_flight || self.undos_in_flight > 0 || self.reloading
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        if self.notice.is_some() {
            if event == InputEvent::Retry {
                self.retry();
            } else {
                tracing::debug!(?event, "Input ignored while a notice is shown");
            }
            return;
        }
        match event {
            InputEvent::PickUp(square) => self.pick_up(square),
            InputEvent::Drop(target) => self.drop(target),
            InputEvent::Undo => self.undo(),
            InputEvent::Retry => self.status = Some("Nothing to retry".to_string()),
            InputEvent::ChatSubmitted(text) => self.append_chat(text),
            InputEvent::FlipView => self.board.toggle_flip(),
        }
    }

    /// Apply every queued network completion. Called once per render tick.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next network completion and apply it.
    pub async fn process_next(&mut self) {
        // The controller holds a sender, so the queue never closes while it lives.
        if let Some(event) = self.events_rx.recv().await {
            self.apply(event);
        }
    }

    /// Ask the oracle for a move if it is the oracle's turn.
    pub fn kick_oracle(&mut self) {
        if self.is_oracle_turn() && self.notice.is_none() && !self.board.is_game_over() {
            self.request_suggestion();
        }
    }

    fn apply(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::MoveCommitted { attempt, result } => match result {
                Ok(response) => self.on_move_committed(attempt, response),
                Err(e) => self.on_move_failed(attempt, e),
            },
            ControllerEvent::UndoFinished(result) => self.on_undo_finished(result),
            ControllerEvent::SuggestionArrived(result) => self.on_suggestion(result),
            ControllerEvent::ChatAppended { content, result } => match result {
                Ok(entry) => {
                    self.chat.push(chat_line(&entry));
                    self.request_suggestion();
                }
                Err(e) => self.show_notice(format!("Could not send message: {e}"), RetryAction::Chat(content)),
            },
            ControllerEvent::GameReloaded(result) => self.on_reloaded(result),
        }
    }

    fn pick_up(&mut self, square: Square) {
        if self.undos_in_flight > 0 || self.reloading {
            self.status = Some("Waiting for the server".to_string());
            return;
        }
        if self.is_oracle_turn() {
            self.status = Some("The oracle is to move".to_string());
            return;
        }
        match self.board.pick_up(square) {
            Ok(_) => self.status = None,
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn drop(&mut self, target: Option<Square>) {
        match self.board.drop(target) {
            Ok(DropOutcome::Speculative(attempt)) => self.submit(attempt),
            Ok(DropOutcome::Snapback) => self.resume_idle(),
            Err(e) => tracing::debug!("Drop ignored: {}", e),
        }
    }

    fn undo(&mut self) {
        if self.is_busy() {
            self.status = Some("Wait for the pending request to finish".to_string());
            return;
        }
        if self.board.is_game_over() {
            self.status = Some(BoardStateError::GameOver.to_string());
            return;
        }
        // Against the oracle, take back its reply as well so the user is to move again.
        let oracle_moved_last = self.settings.oracle_side == Some(self.board.side_to_move().opposite());
        let plies = if oracle_moved_last && self.board.ply() >= 2 { 2 } else { 1 };

        let mut taken = 0;
        for _ in 0..plies {
            match self.board.undo_local() {
                Ok(_) => taken += 1,
                Err(e) => {
                    self.status = Some(e.to_string());
                    break;
                }
            }
        }
        if taken > 0 {
            tracing::info!(game_id = %self.game.id, plies = taken, "Taking back");
            self.undos_in_flight = taken;
            self.send_undo();
        }
    }

    fn submit(&mut self, attempt: MoveAttempt) {
        tracing::info!(
            game_id = %self.game.id,
            token = %attempt.token,
            ply = attempt.expected_ply,
            origin = ?attempt.origin,
            "Submitting move"
        );
        self.status = None;
        let request = SubmitMoveRequest {
            token: attempt.token.clone(),
            expected_ply: Some(attempt.expected_ply),
        };
        self.spawn(|service, game_id| async move {
            let result = service.submit_move(&game_id, &request).await;
            ControllerEvent::MoveCommitted { attempt, result }
        });
    }

    fn send_undo(&self) {
        self.spawn(|service, game_id| async move {
            ControllerEvent::UndoFinished(service.undo(&game_id).await)
        });
    }

    fn append_chat(&mut self, text: String) {
        let content = text.trim().to_string();
        if content.is_empty() {
            return;
        }
        let request = AppendChatRequest {
            role: "user".to_string(),
            content: content.clone(),
            name: None,
        };
        self.spawn(|service, game_id| async move {
            let result = service.append_chat(&game_id, &request).await;
            ControllerEvent::ChatAppended { content, result }
        });
    }

    fn request_suggestion(&mut self) {
        if self.suggestion_in_flight || self.board.is_game_over() {
            return;
        }
        if !self.board.is_idle() || self.undos_in_flight > 0 || self.reloading {
            tracing::debug!("Suggestion deferred until the board is idle");
            self.suggestion_deferred = true;
            return;
        }
        if let Err(e) = self.board.begin_suggestion() {
            tracing::warn!("Cannot request suggestion: {}", e);
            return;
        }
        self.suggestion_in_flight = true;
        let mode = self.settings.suggestion_mode.clone();
        tracing::debug!(game_id = %self.game.id, ply = self.board.ply(), "Requesting suggestion");
        self.spawn(|service, game_id| async move {
            ControllerEvent::SuggestionArrived(service.request_suggestion(&game_id, mode).await)
        });
    }

    fn reload(&mut self) {
        self.reloading = true;
        self.spawn(|service, game_id| async move {
            let result = match service.get_game(&game_id).await {
                Ok(game) => service.get_moves(&game_id).await.map(|moves| (game, moves)),
                Err(e) => Err(e),
            };
            ControllerEvent::GameReloaded(result)
        });
    }

    fn retry(&mut self) {
        let Some(notice) = self.notice.take() else {
            return;
        };
        tracing::info!(action = ?notice.retry, "Retrying");
        match notice.retry {
            RetryAction::Commit(attempt) => match self.board.begin_commit(&attempt.token, attempt.origin) {
                Ok(attempt) => self.submit(attempt),
                Err(e) => {
                    self.status = Some(e.to_string());
                    self.reload();
                }
            },
            RetryAction::Suggestion => {
                self.oracle_attempts = 0;
                self.request_suggestion();
            }
            RetryAction::Chat(content) => self.append_chat(content),
            RetryAction::Reload => self.reload(),
        }
    }

    fn on_move_committed(&mut self, attempt: MoveAttempt, response: SubmitMoveResponse) {
        if let Err(e) = self.board.confirm(&response) {
            tracing::warn!("Could not adopt committed move: {}", e);
            self.reload();
            return;
        }
        tracing::info!(
            game_id = %self.game.id,
            ply = response.mv.ply,
            san = %response.mv.san,
            replayed = response.replayed,
            "Move committed"
        );
        if attempt.origin == MoveOrigin::Oracle {
            self.oracle_attempts = 0;
        }
        self.push(Speaker::System, describe_move(&response.mv));
        self.game = response.game;
        if self.board.is_game_over() {
            let reason = response.mv.comment.unwrap_or_else(|| "game over".to_string());
            self.status = Some(format!("Game over: {} ({reason})", self.game.result));
        }
        self.resume_idle();
    }

    fn on_move_failed(&mut self, attempt: MoveAttempt, error: ClientError) {
        if let Err(e) = self.board.reject() {
            tracing::warn!("Move failure arrived while not committing: {}", e);
        }
        tracing::info!(token = %attempt.token, "Move not recorded: {}", error);

        if error.is_rules_error() {
            self.push(Speaker::System, error.to_string());
            match attempt.origin {
                MoveOrigin::Human => {
                    self.status = Some("Try another move".to_string());
                    self.resume_idle();
                }
                MoveOrigin::Oracle => self.oracle_failed(format!(
                    "{} is not a legal move here. Reply with one of the legal moves.",
                    attempt.token
                )),
            }
            return;
        }
        match error.code() {
            Some(ErrorCode::GameOver | ErrorCode::StaleMove) => {
                self.push(Speaker::System, error.to_string());
                self.reload();
            }
            _ => self.show_notice(
                format!("Move {} failed: {error}", attempt.token),
                RetryAction::Commit(attempt),
            ),
        }
    }

    fn on_undo_finished(&mut self, result: Result<UndoResponse, ClientError>) {
        match result {
            Ok(response) => {
                self.undos_in_flight = self.undos_in_flight.saturating_sub(1);
                self.push(Speaker::System, format!("Took back {}", response.removed.san));
                if self.undos_in_flight > 0 {
                    self.send_undo();
                    return;
                }
                if let Err(e) = self.board.adopt(&response.game) {
                    tracing::warn!("Could not adopt position after takeback: {}", e);
                    self.reload();
                    return;
                }
                self.game = response.game;
                self.resume_idle();
            }
            Err(e) => {
                self.undos_in_flight = 0;
                if e.code().is_some() && !e.is_retryable() {
                    self.status = Some(e.to_string());
                    self.reload();
                } else {
                    self.show_notice(format!("Takeback failed: {e}"), RetryAction::Reload);
                }
            }
        }
    }

    fn on_suggestion(&mut self, result: Result<SuggestionResponse, ClientError>) {
        self.suggestion_in_flight = false;
        self.board.end_suggestion();
        let response = match result {
            Ok(response) => response,
            Err(e) if e.code() == Some(ErrorCode::GameOver) => {
                self.status = Some(e.to_string());
                return;
            }
            Err(e) => {
                self.show_notice(format!("Suggestion failed: {e}"), RetryAction::Suggestion);
                return;
            }
        };
        if response.for_ply != self.board.ply() {
            tracing::debug!(
                for_ply = response.for_ply,
                ply = self.board.ply(),
                "Discarding suggestion for an earlier position"
            );
            self.resume_idle();
            return;
        }
        match response.suggestion {
            SuggestionView::Move { token } if self.is_oracle_turn() => {
                self.push(Speaker::Oracle, token.clone());
                match self.board.begin_commit(&token, MoveOrigin::Oracle) {
                    Ok(attempt) => self.submit(attempt),
                    Err(e) => self.status = Some(e.to_string()),
                }
            }
            SuggestionView::Move { token } => {
                self.push(Speaker::Oracle, format!("Suggested move: {token}"));
                self.resume_idle();
            }
            SuggestionView::Text { text } => {
                self.push(Speaker::Oracle, text);
                if self.is_oracle_turn() {
                    self.oracle_failed("Reply with a single move.".to_string());
                } else {
                    self.resume_idle();
                }
            }
        }
    }

    fn on_reloaded(&mut self, result: Result<(GameView, Vec<MoveView>), ClientError>) {
        self.reloading = false;
        match result {
            Ok((game, moves)) => {
                if let Err(e) = self.board.reload(&game, &moves) {
                    self.show_notice(format!("Could not load game: {e}"), RetryAction::Reload);
                    return;
                }
                tracing::info!(game_id = %game.id, ply = game.ply, "Reloaded game");
                self.game = game;
                self.resume_idle();
            }
            Err(e) => self.show_notice(format!("Could not load game: {e}"), RetryAction::Reload),
        }
    }

    /// The oracle's turn produced no usable move. Nudge it through the
    /// conversation until the budget runs out, then ask the user.
    fn oracle_failed(&mut self, nudge: String) {
        self.oracle_attempts += 1;
        if self.oracle_attempts < self.settings.oracle_retries {
            tracing::info!(attempt = self.oracle_attempts, "Asking the oracle again");
            self.append_chat(nudge);
        } else {
            self.show_notice(
                format!(
                    "The oracle gave no legal move in {} attempts",
                    self.oracle_attempts
                ),
                RetryAction::Suggestion,
            );
        }
    }

    /// The board is idle again: run a deferred suggestion or the oracle's turn.
    fn resume_idle(&mut self) {
        if !self.board.is_idle() || self.notice.is_some() {
            return;
        }
        if self.suggestion_deferred {
            self.suggestion_deferred = false;
            self.request_suggestion();
            return;
        }
        self.kick_oracle();
    }

    fn show_notice(&mut self, message: String, retry: RetryAction) {
        tracing::warn!(game_id = %self.game.id, "{}", message);
        self.notice = Some(Notice { message, retry });
    }

    fn push(&mut self, speaker: Speaker, text: String) {
        self.chat.push(ChatLine { speaker, text });
    }

    fn spawn<F, Fut>(&self, request: F)
    where
        F: FnOnce(Arc<dyn ChessService>, String) -> Fut,
        Fut: Future<Output = ControllerEvent> + Send + 'static,
    {
        let task = request(Arc::clone(&self.service), self.game.id.clone());
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            if events_tx.send(task.await).is_err() {
                tracing::debug!("Controller dropped before a request finished");
            }
        });
    }
}

fn chat_line(entry: &ChatEntryView) -> ChatLine {
    let speaker = match entry.role.as_str() {
        "user" => Speaker::User,
        "system" => Speaker::System,
        _ => Speaker::Oracle,
    };
    ChatLine {
        speaker,
        text: entry.content.clone(),
    }
}

/// `1. e4` for White, `1... e5` for Black. The number is the fullmove
/// counter of the position the move was played from.
fn describe_move(mv: &MoveView) -> String {
    let number = mv
        .fen_before
        .split_whitespace()
        .nth(5)
        .and_then(|n| n.parse::<u32>().ok())
        .unwrap_or(mv.ply / 2 + 1);
    let dots = if mv.color == "black" { "..." } else { "." };
    format!("{number}{dots} {}", mv.san)
}
