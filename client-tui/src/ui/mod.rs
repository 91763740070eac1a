//! Terminal front end: owns the terminal, feeds input to the controller
//! and draws its state.

pub mod geometry;
pub mod input;
pub mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::controller::BoardController;
use geometry::BoardGeometry;
use input::{AppAction, InputMode};
use widgets::{BoardWidget, ChatPanel, GameInfoPanel, NoticeWidget};

/// Frame interval; the controller queue is drained once per frame.
const TICK: Duration = Duration::from_millis(33);

pub async fn run_app(controller: BoardController) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_ui_loop(&mut terminal, controller).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    result
}

async fn run_ui_loop<B: Backend>(terminal: &mut Terminal<B>, mut controller: BoardController) -> anyhow::Result<()> {
    let mut term_events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);
    let mut mode = InputMode::Board;
    let mut geometry: Option<BoardGeometry> = None;

    loop {
        let term_event = tokio::select! {
            biased;

            maybe_event = term_events.next() => match maybe_event {
                Some(Ok(event)) => Some(event),
                Some(Err(e)) => {
                    tracing::warn!("Terminal event error: {}", e);
                    None
                }
                None => return Ok(()),
            },

            _ = tick.tick() => None,
        };

        if let Some(event) = term_event {
            match input::handle_event(&event, &mut mode, geometry.as_ref()) {
                AppAction::Continue => {}
                AppAction::Quit => {
                    tracing::info!(game_id = %controller.game().id, "Quitting");
                    return Ok(());
                }
                AppAction::Forward(input) => controller.handle_input(input),
            }
        }

        controller.drain();
        terminal.draw(|frame| geometry = Some(draw(frame, &controller, &mode)))?;
    }
}

fn draw(frame: &mut Frame, controller: &BoardController, mode: &InputMode) -> BoardGeometry {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(46)])
        .split(frame.area());
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(13), Constraint::Min(6)])
        .split(columns[1]);

    let board_area = columns[0];
    let board = controller.board();
    let inner = ratatui::widgets::Block::default()
        .borders(ratatui::widgets::Borders::ALL)
        .inner(board_area);
    let geometry = BoardGeometry::for_area(inner, board.perspective());
    let title = format!(" {} vs {} ", controller.game().white, controller.game().black);
    frame.render_widget(
        BoardWidget {
            board,
            geometry,
            title: &title,
        },
        board_area,
    );

    frame.render_widget(GameInfoPanel { controller }, side[0]);
    let input = match mode {
        InputMode::Chat(text) => Some(text.as_str()),
        InputMode::Board => None,
    };
    frame.render_widget(
        ChatPanel {
            lines: controller.chat(),
            input,
        },
        side[1],
    );

    if let Some(notice) = controller.notice() {
        frame.render_widget(NoticeWidget { notice }, frame.area());
    }
    geometry
}
