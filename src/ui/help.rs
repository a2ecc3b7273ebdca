//! Help overlay: global keys on the left, one section per query mode on the right.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::theme::Theme;

/// What one dashboard mode asks for and what it answers with
#[derive(Debug, Clone, Copy)]
pub struct ModeHelp {
    pub key: char,
    pub title: &'static str,
    pub inputs: &'static str,
    pub shows: &'static str,
}

const KEYS: [(&str, &[(&str, &str)]); 3] = [
    (
        "Panels",
        &[
            ("Tab / S-Tab", "Cycle Modes, Form, Chart"),
            ("j k / ↑ ↓", "Move or scroll the year table"),
            ("Esc", "Back to the previous panel"),
        ],
    ),
    (
        "Form",
        &[
            ("Enter / e", "Edit the field"),
            ("Enter", "Commit and run"),
            ("Esc", "Cancel the edit"),
            ("+ / -", "Step a number and run"),
        ],
    ),
    (
        "General",
        &[
            ("r", "Run again"),
            ("h / ?", "Toggle help"),
            ("q", "Quit"),
        ],
    ),
];

/// Help overlay, with the active mode highlighted
pub struct HelpOverlay<'a> {
    modes: &'a [ModeHelp],
    active: usize,
    theme: &'a Theme,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(modes: &'a [ModeHelp], active: usize, theme: &'a Theme) -> Self {
        HelpOverlay {
            modes,
            active,
            theme,
        }
    }

    fn heading(text: &str) -> Line<'static> {
        Line::from(Span::styled(
            format!(" {text}"),
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED),
        ))
    }

    fn key_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (section, items) in KEYS {
            lines.push(Self::heading(section));
            for (key, desc) in items {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {key:<12}"), Style::default().fg(self.theme.title)),
                    Span::raw(desc.to_string()),
                ]));
            }
            lines.push(Line::from(""));
        }
        lines
    }

    fn mode_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![Self::heading("Modes"), Line::from("")];
        for (i, mode) in self.modes.iter().enumerate() {
            let (marker, style) = if i == self.active {
                ("▶", self.theme.highlight_style())
            } else {
                (" ", Style::default().fg(self.theme.title))
            };
            lines.push(Line::from(Span::styled(
                format!("{marker} [{}] {}", mode.key, mode.title),
                style,
            )));
            lines.push(Line::from(format!("    asks:  {}", mode.inputs)));
            lines.push(Line::from(format!("    shows: {}", mode.shows)));
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            " Region names match loosely: a state name finds every sub-division containing it.",
            Style::default().add_modifier(Modifier::ITALIC),
        )));
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(80, 80, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" rainfall-tui Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title_style(self.theme.title_style())
            .style(self.theme.surface_style());
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let [keys_area, modes_area] =
            Layout::horizontal([Constraint::Length(40), Constraint::Min(20)]).areas(inner);

        frame.render_widget(
            Paragraph::new(self.key_lines()).style(self.theme.surface_style()),
            keys_area,
        );
        frame.render_widget(
            Paragraph::new(self.mode_lines())
                .wrap(Wrap { trim: false })
                .style(self.theme.surface_style()),
            modes_area,
        );
    }
}

/// Centered rect for popup dialogs
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}
