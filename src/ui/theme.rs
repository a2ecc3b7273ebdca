//! Theme configuration for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the application
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub border: Color,
    pub title: Color,
    pub rising: Color,
    pub falling: Color,
    pub warning: Color,
    pub fit_line: Color,
    pub chart_colors: Vec<Color>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            bg: Color::Reset,
            fg: Color::White,
            highlight_bg: Color::Rgb(60, 60, 80),
            highlight_fg: Color::White,
            border: Color::Rgb(100, 100, 120),
            title: Color::Cyan,
            rising: Color::Blue,
            falling: Color::Red,
            warning: Color::Yellow,
            fit_line: Color::DarkGray,
            // Named colors for better terminal compatibility
            chart_colors: vec![
                Color::Cyan,
                Color::Yellow,
                Color::Green,
                Color::Magenta,
                Color::LightRed,
                Color::LightBlue,
            ],
        }
    }
}

impl Theme {
    /// Base surface style used to paint widget backgrounds
    pub fn surface_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// (border_style, title_style) for a panel's focus state
    pub fn panel_styles(&self, focused: bool) -> (Style, Style) {
        if focused {
            (self.focused_border_style(), self.focused_border_style())
        } else {
            (self.border_style(), self.dimmed_title_style())
        }
    }

    pub fn normal_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn focused_border_style(&self) -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.title)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dimmed_title_style(&self) -> Style {
        Style::default()
            .fg(self.border)
            .add_modifier(Modifier::DIM)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Wetter trend in blue, drier in red
    pub fn slope_style(&self, slope: f64) -> Style {
        let color = if slope >= 0.0 { self.rising } else { self.falling };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Get a chart color by index (cycles through available colors)
    pub fn chart_color(&self, index: usize) -> Color {
        self.chart_colors[index % self.chart_colors.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_colors_are_distinct() {
        let theme = Theme::default();
        assert_ne!(theme.chart_color(0), theme.chart_color(1));
    }

    #[test]
    fn test_chart_color_cycles() {
        let theme = Theme::default();
        let len = theme.chart_colors.len();
        assert_eq!(theme.chart_color(0), theme.chart_color(len));
        assert_eq!(theme.chart_color(1), theme.chart_color(len + 1));
    }

    #[test]
    fn test_series_colors_differ_from_fit_line() {
        let theme = Theme::default();
        assert!(!theme.chart_colors.contains(&theme.fit_line));
    }

    #[test]
    fn test_slope_style_by_sign() {
        let theme = Theme::default();
        assert_eq!(theme.slope_style(12.0).fg, Some(theme.rising));
        assert_eq!(theme.slope_style(-3.5).fg, Some(theme.falling));
    }
}
