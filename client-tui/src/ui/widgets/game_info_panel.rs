use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::board_state::Phase;
use crate::controller::BoardController;
use crate::ui::widgets::board::square_label;

pub struct GameInfoPanel<'a> {
    pub controller: &'a BoardController,
}

fn row(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(value),
    ])
}

impl Widget for GameInfoPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Game")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        block.render(area, buf);

        let game = self.controller.game();
        let board = self.controller.board();
        let turn = if board.is_game_over() {
            format!("finished {}", game.result)
        } else if self.controller.is_oracle_turn() {
            format!("{} (oracle)", board.side_to_move().title())
        } else {
            board.side_to_move().title().to_string()
        };
        let activity = match board.phase() {
            Phase::Idle if self.controller.is_busy() => "waiting for the server".to_string(),
            Phase::Idle => "ready".to_string(),
            Phase::Dragging { from, .. } => format!("moving from {}", square_label(Some(*from))),
            Phase::AwaitingCommit(attempt) => format!("submitting {}", attempt.token),
            Phase::AwaitingSuggestion => "oracle thinking".to_string(),
        };

        let mut lines = vec![
            row("Event: ", format!("{} (round {})", game.event, game.round)),
            row("White: ", game.white.clone()),
            row("Black: ", game.black.clone()),
            row("To move: ", turn),
            row("Ply: ", board.ply().to_string()),
            row("State: ", activity),
        ];
        if let Some(status) = self.controller.status() {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                status.to_string(),
                Style::default().fg(Color::LightRed),
            )));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "drag: move  u: undo  i: chat  f: flip  q: quit",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines).wrap(Wrap { trim: true }).render(inner, buf);
    }
}
