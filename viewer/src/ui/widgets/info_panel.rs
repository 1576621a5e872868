use board::{Board, PieceColor, Square};
use engine::uci::format_uci_move;
use engine::SessionState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::bridge::EngineAnnotations;

pub struct InfoPanel<'a> {
    pub board: &'a Board,
    pub selected: Option<Square>,
    pub annotations: &'a EngineAnnotations,
    pub session_state: SessionState,
    pub status: Option<&'a str>,
}

fn label(text: &str, color: Color) -> Span<'_> {
    Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

impl Widget for InfoPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("♟ Position Info ♟")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![];

        let engine_name = self
            .annotations
            .engine_name
            .as_deref()
            .unwrap_or("(unidentified)");
        let state_color = match self.session_state {
            SessionState::Ready => Color::Green,
            SessionState::Terminated | SessionState::Unstarted => Color::Red,
            _ => Color::Yellow,
        };
        lines.push(Line::from(vec![
            label("Engine: ", Color::Cyan),
            Span::raw(engine_name.to_string()),
        ]));
        lines.push(Line::from(vec![
            label("Link: ", Color::Cyan),
            Span::styled(
                self.session_state.to_string(),
                Style::default().fg(state_color),
            ),
        ]));

        let (turn_text, turn_color) = match self.board.side_to_move() {
            PieceColor::White => ("White to move", Color::White),
            PieceColor::Black => ("Black to move", Color::Gray),
        };
        lines.push(Line::from(vec![
            label("Turn: ", Color::Yellow),
            Span::styled(
                turn_text,
                Style::default().fg(turn_color).add_modifier(Modifier::BOLD),
            ),
        ]));

        if let Some(selected) = self.selected {
            lines.push(Line::from(vec![
                label("Selected: ", Color::Yellow),
                Span::styled(selected.to_string(), Style::default().fg(Color::Yellow)),
            ]));
        }

        lines.push(Line::raw(""));

        if let Some((from, to)) = self.annotations.best_move {
            lines.push(Line::from(vec![
                label("Best move: ", Color::Blue),
                Span::raw(format!("{}{}", from, to)),
            ]));
        }

        if let Some(info) = &self.annotations.info {
            let mut parts = Vec::new();
            if let Some(depth) = info.depth {
                parts.push(format!("depth {}", depth));
            }
            if let Some(score) = info.score {
                parts.push(format!("score {}", score));
            }
            if let Some(nodes) = info.nodes {
                parts.push(format!("nodes {}", nodes));
            }
            if let Some(nps) = info.nps {
                parts.push(format!("nps {}", nps));
            }
            lines.push(Line::from(vec![
                label("Search: ", Color::Green),
                Span::raw(parts.join("  ")),
            ]));
            if !info.pv.is_empty() {
                let pv: Vec<String> = info.pv.iter().take(8).map(format_uci_move).collect();
                lines.push(Line::from(vec![
                    label("PV: ", Color::Green),
                    Span::raw(pv.join(" ")),
                ]));
            }
        }

        if let Some(status) = self.annotations.status.as_deref() {
            lines.push(Line::from(vec![
                label("Engine says: ", Color::Magenta),
                Span::raw(status.to_string()),
            ]));
        }
        if let Some(status) = self.status {
            lines.push(Line::from(vec![
                label("Status: ", Color::Cyan),
                Span::raw(status.to_string()),
            ]));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
