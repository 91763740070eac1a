use tokio::sync::mpsc;
use tracing::Instrument;

use super::commands::GameCommand;
use super::state::{GameState, SuggestionDone};
use crate::persistence::GameStore;

/// The game actor loop. Owns the game state and applies commands one at a
/// time, so every write to a game is serialized.
pub(crate) async fn run_game_actor<S: GameStore>(
    state: GameState<S>,
    cmd_rx: mpsc::Receiver<GameCommand>,
) {
    let game_id = state.record.id().to_string();
    run_game_actor_inner(state, cmd_rx)
        .instrument(tracing::info_span!("game", id = %game_id))
        .await;
}

async fn run_game_actor_inner<S: GameStore>(
    mut state: GameState<S>,
    mut cmd_rx: mpsc::Receiver<GameCommand>,
) {
    tracing::info!(ply = state.record.ply(), "Game actor started");

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<SuggestionDone>();

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(GameCommand::Shutdown) | None => {
                        tracing::info!("Game actor shutting down");
                        break;
                    }
                    Some(cmd) => handle_command(&mut state, cmd, &done_tx).await,
                }
            }

            Some(done) = done_rx.recv() => {
                state.finish_suggestion(done).await;
            }
        }
    }

    tracing::info!("Game actor exited");
}

async fn handle_command<S: GameStore>(
    state: &mut GameState<S>,
    cmd: GameCommand,
    done_tx: &mpsc::UnboundedSender<SuggestionDone>,
) {
    match cmd {
        GameCommand::SubmitMove {
            token,
            expected_ply,
            reply,
        } => {
            let result = state.submit_move(&token, expected_ply).await;
            if let Err(ref e) = result {
                tracing::debug!(%token, error = %e, "Move not committed");
            }
            let _ = reply.send(result);
        }
        GameCommand::Undo { reply } => {
            let _ = reply.send(state.undo().await);
        }
        GameCommand::RequestSuggestion { mode, reply } => {
            state.start_suggestion(mode, reply, done_tx).await;
        }
        GameCommand::AppendChat { entry, reply } => {
            let _ = reply.send(state.append_chat(&entry).await);
        }
        GameCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.snapshot());
        }
        GameCommand::Shutdown => {}
    }
}
