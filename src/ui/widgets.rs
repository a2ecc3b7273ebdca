//! UI widgets for the rainfall dashboard.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::theme::Theme;

/// Query mode list panel widget
pub struct ModeList<'a> {
    modes: &'a [&'a str],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> ModeList<'a> {
    pub fn new(modes: &'a [&'a str], selected: usize, theme: &'a Theme) -> Self {
        ModeList {
            modes,
            selected,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let items: Vec<ListItem> = self
            .modes
            .iter()
            .enumerate()
            .map(|(i, name)| ListItem::new(format!("{} {name}", i + 1)))
            .collect();

        let (border_style, title_style) = self.theme.panel_styles(focused);
        let block = Block::default()
            .title(" Mode ")
            .borders(Borders::ALL)
            .border_style(border_style)
            .title_style(title_style);

        let list = List::new(items)
            .block(block)
            .highlight_style(self.theme.highlight_style())
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

/// A single labelled input of the query form
pub struct FormRow<'a> {
    pub label: &'a str,
    pub value: &'a str,
}

/// Query form panel widget
pub struct QueryForm<'a> {
    rows: &'a [FormRow<'a>],
    selected: usize,
    editing: bool,
    theme: &'a Theme,
}

impl<'a> QueryForm<'a> {
    pub fn new(rows: &'a [FormRow<'a>], selected: usize, editing: bool, theme: &'a Theme) -> Self {
        QueryForm {
            rows,
            selected,
            editing,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let mut lines: Vec<Line> = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            let is_selected = focused && i == self.selected;
            let value = if is_selected && self.editing {
                format!("{}_", row.value)
            } else {
                row.value.to_string()
            };
            let value_style = if is_selected {
                self.theme.highlight_style()
            } else {
                self.theme.normal_style()
            };

            lines.push(Line::from(Span::styled(
                row.label.to_string(),
                Style::default().add_modifier(Modifier::DIM),
            )));
            lines.push(Line::from(vec![
                Span::raw(if is_selected { "> " } else { "  " }),
                Span::styled(value, value_style),
            ]));
        }

        let (border_style, title_style) = self.theme.panel_styles(focused);
        let title = if self.editing { " Query (editing) " } else { " Query " };
        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style)
                .title_style(title_style),
        );

        frame.render_widget(paragraph, area);
    }
}

/// Result details panel widget
pub struct ResultPanel<'a> {
    lines: Vec<Line<'a>>,
    theme: &'a Theme,
}

impl<'a> ResultPanel<'a> {
    pub fn new(lines: Vec<Line<'a>>, theme: &'a Theme) -> Self {
        ResultPanel { lines, theme }
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let (border_style, title_style) = self.theme.panel_styles(false);
        let paragraph = Paragraph::new(self.lines)
            .block(
                Block::default()
                    .title(" Result ")
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title_style(title_style),
            )
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);
    }
}

/// Scrollable per-year values of the current result
pub struct YearTable<'a> {
    header: &'a [String],
    rows: &'a [Vec<String>],
    offset: usize,
    theme: &'a Theme,
}

impl<'a> YearTable<'a> {
    pub fn new(
        header: &'a [String],
        rows: &'a [Vec<String>],
        offset: usize,
        theme: &'a Theme,
    ) -> Self {
        YearTable {
            header,
            rows,
            offset,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let (border_style, title_style) = self.theme.panel_styles(focused);
        let title = if self.rows.is_empty() {
            " Years ".to_string()
        } else {
            format!(" Years ({}) ", self.rows.len())
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style)
            .title_style(title_style);

        if self.rows.is_empty() {
            let empty = Paragraph::new(Span::styled("No data", self.theme.dimmed_title_style()))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let widths: Vec<Constraint> = std::iter::once(Constraint::Length(6))
            .chain(std::iter::repeat(Constraint::Fill(1)).take(self.header.len().saturating_sub(1)))
            .collect();
        let header = Row::new(self.header.iter().map(|h| Cell::from(h.as_str())))
            .style(self.theme.title_style());
        let rows = self
            .rows
            .iter()
            .skip(self.offset)
            .map(|row| Row::new(row.iter().map(|c| Cell::from(c.as_str()))));

        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    citation: &'a str,
    error: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(citation: &'a str, error: Option<&'a str>, theme: &'a Theme) -> Self {
        StatusBar {
            citation,
            error,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let line = match self.error {
            Some(e) => Line::from(Span::styled(format!("Error: {e}"), self.theme.warning_style())),
            None => Line::from(vec![
                Span::styled(
                    self.citation.to_string(),
                    Style::default().add_modifier(Modifier::ITALIC),
                ),
                Span::raw(" | [h] Help [q] Quit"),
            ]),
        };

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(self.theme.border_style()),
        );

        frame.render_widget(paragraph, area);
    }
}
