//! Rainfall chart widget: one line per region, optional trend line overlay.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use super::theme::Theme;
use crate::data::{AnnualSeries, LinearFit};

/// Axis bounds covering every plotted point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl Bounds {
    /// Bounds of `lines` with 5% vertical padding; `None` when there are no points
    pub fn of(lines: &[Vec<(f64, f64)>]) -> Option<Self> {
        let mut points = lines.iter().flatten().peekable();
        points.peek()?;

        let mut x = [f64::MAX, f64::MIN];
        let mut y = [f64::MAX, f64::MIN];
        for &(px, py) in points {
            x = [x[0].min(px), x[1].max(px)];
            y = [y[0].min(py), y[1].max(py)];
        }

        if x[0] >= x[1] {
            x = [x[0] - 0.5, x[0] + 0.5];
        }
        if y[0] >= y[1] {
            y = [y[0] - 1.0, y[0] + 1.0];
        }
        let pad = (y[1] - y[0]) * 0.05;
        Some(Bounds {
            x,
            y: [y[0] - pad, y[1] + pad],
        })
    }
}

/// Series chart widget
pub struct RainfallChart<'a> {
    series: &'a [(String, &'a AnnualSeries)], // (label, series)
    fit: Option<LinearFit>,
    title: &'a str,
    theme: &'a Theme,
}

impl<'a> RainfallChart<'a> {
    pub fn new(
        series: &'a [(String, &'a AnnualSeries)],
        fit: Option<LinearFit>,
        title: &'a str,
        theme: &'a Theme,
    ) -> Self {
        RainfallChart {
            series,
            fit,
            title,
            theme,
        }
    }

    fn block(&self, focused: bool) -> Block<'a> {
        let (border_style, title_style) = self.theme.panel_styles(focused);
        Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(border_style)
            .title_style(title_style)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let mut lines: Vec<Vec<(f64, f64)>> = self
            .series
            .iter()
            .map(|(_, s)| {
                s.points()
                    .iter()
                    .map(|p| (f64::from(p.year), p.rainfall_mm))
                    .collect()
            })
            .collect();

        let Some(data_bounds) = Bounds::of(&lines) else {
            self.render_empty(frame, area, focused);
            return;
        };

        // Trend line spans the plotted year range
        let fit_points = self.fit.map(|fit| {
            let [x0, x1] = data_bounds.x;
            vec![(x0, fit.predict(x0)), (x1, fit.predict(x1))]
        });
        if let Some(points) = &fit_points {
            lines.push(points.clone());
        }
        let bounds = Bounds::of(&lines).unwrap_or(data_bounds);

        let mut datasets: Vec<Dataset> = self
            .series
            .iter()
            .zip(lines.iter())
            .enumerate()
            .map(|(i, ((label, _), points))| {
                Dataset::default()
                    .name(label.clone())
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.chart_color(i)))
                    .data(points)
            })
            .collect();

        if let (Some(points), Some(_)) = (lines.last(), fit_points.as_ref()) {
            datasets.push(
                Dataset::default()
                    .name("trend")
                    .marker(Marker::Dot)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.fit_line))
                    .data(points),
            );
        }

        let [x_min, x_max] = bounds.x;
        let [y_min, y_max] = bounds.y;
        let x_labels = vec![
            Span::raw(format!("{x_min:.0}")),
            Span::raw(format!("{:.0}", (x_min + x_max) / 2.0)),
            Span::raw(format!("{x_max:.0}")),
        ];
        let y_labels = vec![
            Span::raw(format!("{y_min:.0}")),
            Span::raw(format!("{:.0}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{y_max:.0}")),
        ];

        let chart = Chart::new(datasets)
            .block(self.block(focused))
            .x_axis(
                Axis::default()
                    .title(Span::styled("year", Style::default().add_modifier(Modifier::DIM)))
                    .style(self.theme.normal_style())
                    .bounds(bounds.x)
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled("mm", Style::default().add_modifier(Modifier::DIM)))
                    .style(self.theme.normal_style())
                    .bounds(bounds.y)
                    .labels(y_labels),
            );

        frame.render_widget(chart, area);
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let block = self.block(focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let message = Paragraph::new("No data for that region / years.")
            .style(self.theme.warning_style())
            .alignment(Alignment::Center);
        frame.render_widget(message, inner);
    }
}
