use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::controller::{ChatLine, Speaker};

pub struct ChatPanel<'a> {
    pub lines: &'a [ChatLine],
    /// Text being typed, when the input line is open.
    pub input: Option<&'a str>,
}

impl ChatPanel<'_> {
    fn speaker_span(speaker: Speaker) -> Span<'static> {
        let (label, color) = match speaker {
            Speaker::User => ("you ", Color::Green),
            Speaker::Oracle => ("oracle ", Color::Magenta),
            Speaker::System => ("· ", Color::DarkGray),
        };
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD))
    }
}

impl Widget for ChatPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Conversation (i to type)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        block.render(area, buf);

        let input_height = u16::from(self.input.is_some()) * 2;
        let history_height = inner.height.saturating_sub(input_height);

        let lines: Vec<Line> = self
            .lines
            .iter()
            .map(|line| {
                let text_style = match line.speaker {
                    Speaker::System => Style::default().fg(Color::Gray),
                    _ => Style::default().fg(Color::White),
                };
                Line::from(vec![
                    Self::speaker_span(line.speaker),
                    Span::styled(line.text.clone(), text_style),
                ])
            })
            .collect();

        // Keep the newest lines in view; wrapped lines may still push a few off.
        let scroll = (lines.len() as u16).saturating_sub(history_height);
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(Rect { height: history_height, ..inner }, buf);

        if let Some(input) = self.input {
            let y = inner.y + history_height;
            let prompt = Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled(format!("{input}_"), Style::default().fg(Color::White)),
            ]);
            let hint = Line::from(Span::styled(
                "Enter: send  Esc: cancel",
                Style::default().fg(Color::DarkGray),
            ));
            Paragraph::new(vec![prompt, hint]).render(
                Rect {
                    y,
                    height: input_height.min(inner.height),
                    ..inner
                },
                buf,
            );
        }
    }
}
