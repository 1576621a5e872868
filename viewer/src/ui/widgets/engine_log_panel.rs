use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use engine::uci::parse_uci_move;

use crate::engine_log::{Direction, EngineLog};

/// Scrolling view of engine traffic, newest at the bottom.
pub struct EngineLogPanel<'a> {
    pub log: &'a EngineLog,
}

impl<'a> EngineLogPanel<'a> {
    pub fn new(log: &'a EngineLog) -> Self {
        Self { log }
    }
}

impl Widget for EngineLogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!("Engine Log ({})", self.log.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let inner = block.inner(area);
        block.render(area, buf);

        if self.log.is_empty() {
            Paragraph::new("No engine traffic yet.").render(inner, buf);
            return;
        }

        let lines: Vec<Line> = self
            .log
            .tail(inner.height as usize)
            .map(|entry| {
                let (prefix, color) = match entry.direction {
                    Direction::ToEngine => ("→ ", Color::Cyan),
                    Direction::FromEngine => ("← ", Color::Green),
                    Direction::Notice => ("• ", Color::Yellow),
                };
                let mut spans = vec![Span::styled(
                    prefix,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )];
                if entry.direction == Direction::Notice {
                    spans.push(Span::styled(
                        entry.message.clone(),
                        Style::default().fg(Color::Yellow),
                    ));
                } else {
                    spans.extend(highlight(&entry.message));
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Highlight {
    Command,
    Keyword,
    Value,
    Normal,
}

impl Highlight {
    fn style(self) -> Style {
        match self {
            Highlight::Command => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            Highlight::Keyword => Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            Highlight::Value => Style::default().fg(Color::White),
            Highlight::Normal => Style::default().fg(Color::Gray),
        }
    }
}

fn classify(index: usize, token: &str) -> Highlight {
    if index == 0 {
        return Highlight::Command;
    }
    match token {
        "position" | "go" | "stop" | "quit" | "uci" | "isready" | "ucinewgame" => {
            Highlight::Command
        }
        "fen" | "startpos" | "moves" | "movetime" | "depth" | "seldepth" | "name" | "value"
        | "author" | "ponder" => Highlight::Keyword,
        "score" | "cp" | "mate" | "pv" | "nodes" | "nps" | "time" | "multipv" | "hashfull" => {
            Highlight::Keyword
        }
        _ if token.chars().all(|c| c.is_ascii_digit() || c == '-') => Highlight::Value,
        _ if parse_uci_move(token).is_ok() => Highlight::Value,
        _ => Highlight::Normal,
    }
}

fn highlight(message: &str) -> Vec<Span<'static>> {
    message
        .split_whitespace()
        .enumerate()
        .map(|(i, token)| Span::styled(format!("{} ", token), classify(i, token).style()))
        .collect()
}
