use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

const ENGINE_KEYS: &[(&str, &str)] = &[
    ("u", "uci"),
    ("r", "isready"),
    ("n", "new game + position"),
    ("p", "send position"),
    ("g", "go"),
    ("s", "stop"),
    ("c", "(re)connect engine"),
];

const VIEWER_KEYS: &[(&str, &str)] = &[
    ("click", "select piece"),
    ("Esc", "clear selection"),
    ("f", "flip board"),
    ("w", "write transcript"),
];

pub struct ControlsPanel {
    engine_available: bool,
}

impl ControlsPanel {
    pub fn new(engine_available: bool) -> Self {
        Self { engine_available }
    }
}

impl Widget for ControlsPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("⌨ Controls ⌨")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        block.render(area, buf);

        // Engine keys are dimmed while the link is down, except reconnect.
        let engine_key = |key: &str| {
            if self.engine_available || key == "c" {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };
        let viewer_key = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);

        let mut lines: Vec<Line> = ENGINE_KEYS
            .iter()
            .map(|(key, label)| {
                Line::from(vec![
                    Span::styled(format!("{:<5} ", key), engine_key(key)),
                    Span::raw(*label),
                ])
            })
            .collect();
        lines.extend(VIEWER_KEYS.iter().map(|(key, label)| {
            Line::from(vec![
                Span::styled(format!("{:<5} ", key), viewer_key),
                Span::raw(*label),
            ])
        }));
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<5} ", "q"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw("quit"),
        ]));

        Paragraph::new(lines).render(inner, buf);
    }
}
