//! Main application logic and TUI event loop.

use std::io;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::{Line, Span},
    Terminal,
};
use tracing::{debug, info};

use crate::cli::{AppConfig, FormDefaults};
use crate::data::{self, AnnualSeries, Dataset, LinearFit};
use crate::output::format_mm;
use crate::query::{self, ComparisonReport, TimeSeriesReport, TrendReport, CITATION};
use crate::ui::{
    chart::RainfallChart,
    widgets::{FormRow, ModeList, QueryForm, ResultPanel, StatusBar, YearTable},
    HelpOverlay, ModeHelp, Theme,
};

/// The three questions the dashboard can answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compare,
    Trend,
    TimeSeries,
}

impl Mode {
    const ALL: [Mode; 3] = [Mode::Compare, Mode::Trend, Mode::TimeSeries];

    fn title(self) -> &'static str {
        match self {
            Mode::Compare => "Compare rainfall (last N years)",
            Mode::Trend => "Region trend & timeseries",
            Mode::TimeSeries => "Timeseries for a region",
        }
    }

    fn index(self) -> usize {
        match self {
            Mode::Compare => 0,
            Mode::Trend => 1,
            Mode::TimeSeries => 2,
        }
    }

    fn next(self) -> Self {
        Mode::ALL[(self.index() + 1) % Mode::ALL.len()]
    }

    fn prev(self) -> Self {
        Mode::ALL[(self.index() + Mode::ALL.len() - 1) % Mode::ALL.len()]
    }

    fn help(self) -> ModeHelp {
        match self {
            Mode::Compare => ModeHelp {
                key: '1',
                title: self.title(),
                inputs: "region, compare with, last N years",
                shows: "both series, per-region averages over the shared years",
            },
            Mode::Trend => ModeHelp {
                key: '2',
                title: self.title(),
                inputs: "region, start year, end year (blank = open)",
                shows: "series with a least-squares line and its slope in mm/year",
            },
            Mode::TimeSeries => ModeHelp {
                key: '3',
                title: self.title(),
                inputs: "region, start year, end year (blank = open)",
                shows: "annual series and its mean",
            },
        }
    }

    fn fields(self) -> &'static [Field] {
        match self {
            Mode::Compare => &[Field::Region, Field::CompareWith, Field::LastN],
            Mode::Trend | Mode::TimeSeries => &[Field::Region, Field::StartYear, Field::EndYear],
        }
    }
}

/// Inputs of the query form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Region,
    CompareWith,
    LastN,
    StartYear,
    EndYear,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::Region => "Region (state/subdivision)",
            Field::CompareWith => "Second region",
            Field::LastN => "Last N years",
            Field::StartYear => "Start year",
            Field::EndYear => "End year",
        }
    }
}

/// Raw text of every form field, kept across mode switches
#[derive(Debug, Clone, PartialEq)]
struct FormState {
    region: String,
    compare_with: String,
    last_n: String,
    start_year: String,
    end_year: String,
}

impl From<&FormDefaults> for FormState {
    fn from(defaults: &FormDefaults) -> Self {
        FormState {
            region: defaults.region.clone(),
            compare_with: defaults.compare_with.clone(),
            last_n: defaults.last_n.to_string(),
            start_year: defaults.start_year.to_string(),
            end_year: defaults.end_year.to_string(),
        }
    }
}

impl FormState {
    fn get(&self, field: Field) -> &str {
        match field {
            Field::Region => &self.region,
            Field::CompareWith => &self.compare_with,
            Field::LastN => &self.last_n,
            Field::StartYear => &self.start_year,
            Field::EndYear => &self.end_year,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Region => &mut self.region,
            Field::CompareWith => &mut self.compare_with,
            Field::LastN => &mut self.last_n,
            Field::StartYear => &mut self.start_year,
            Field::EndYear => &mut self.end_year,
        }
    }

    /// Add `delta` to a numeric field. Returns false if the field is not a number
    /// or the result would overflow.
    fn step(&mut self, field: Field, delta: i64) -> bool {
        if matches!(field, Field::Region | Field::CompareWith) {
            return false;
        }
        let Ok(current) = self.get(field).trim().parse::<i64>() else {
            return false;
        };
        let Some(mut next) = current.checked_add(delta) else {
            return false;
        };
        if field == Field::LastN {
            next = next.max(0);
        }
        *self.get_mut(field) = next.to_string();
        true
    }
}

fn parse_last_n(text: &str) -> Result<usize> {
    text.trim()
        .parse::<usize>()
        .with_context(|| format!("Last N years must be a whole number, got {text:?}"))
}

/// Blank means unbounded
fn parse_year(label: &str, text: &str) -> Result<Option<i32>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let year = text
        .parse::<i32>()
        .with_context(|| format!("{label} must be a year, got {text:?}"))?;
    Ok(Some(year))
}

/// Last successful query output
#[derive(Debug, Clone)]
enum QueryResult {
    Comparison(ComparisonReport),
    Trend {
        report: TrendReport,
        fit: Option<LinearFit>,
    },
    TimeSeries(TimeSeriesReport),
}

/// Which panel is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPanel {
    Modes,
    Form,
    Chart,
}

impl FocusedPanel {
    fn next(self) -> Self {
        match self {
            FocusedPanel::Modes => FocusedPanel::Form,
            FocusedPanel::Form => FocusedPanel::Chart,
            FocusedPanel::Chart => FocusedPanel::Modes,
        }
    }

    fn prev(self) -> Self {
        match self {
            FocusedPanel::Modes => FocusedPanel::Chart,
            FocusedPanel::Form => FocusedPanel::Modes,
            FocusedPanel::Chart => FocusedPanel::Form,
        }
    }
}

/// Application state
pub struct App<'d> {
    theme: Theme,

    // Data
    dataset: &'d Dataset,
    result: Option<QueryResult>,
    /// Sub-divisions each queried region resolved to
    matched: Vec<Vec<String>>,

    // Query form
    mode: Mode,
    form: FormState,
    selected_field: usize,
    edit_buffer: Option<String>,

    // UI State
    /// First visible row of the year table
    table_scroll: usize,
    focused: FocusedPanel,
    show_help: bool,
    should_quit: bool,

    // Error message to display (non-fatal)
    error_message: Option<String>,
}

impl<'d> App<'d> {
    /// Create a new App and run the initial query
    pub fn new(config: &AppConfig, dataset: &'d Dataset) -> Self {
        let mut app = App {
            theme: Theme::default(),
            dataset,
            result: None,
            matched: Vec::new(),
            mode: Mode::Compare,
            form: FormState::from(&config.form),
            selected_field: 0,
            edit_buffer: None,
            table_scroll: 0,
            focused: FocusedPanel::Modes,
            show_help: false,
            should_quit: false,
            error_message: None,
        };
        app.run_query();
        app
    }

    /// Set an error message to display (non-fatal)
    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
    }

    fn current_field(&self) -> Field {
        let fields = self.mode.fields();
        fields[self.selected_field.min(fields.len() - 1)]
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.selected_field = self.selected_field.min(mode.fields().len() - 1);
        self.run_query();
    }

    /// Run the current mode's query; bad input is reported, the last result kept
    fn run_query(&mut self) {
        self.error_message = None;
        if let Err(e) = self.execute() {
            self.set_error(format!("{e:#}"));
        }
    }

    fn year_range(&self) -> Result<(Option<i32>, Option<i32>)> {
        let start = parse_year("Start year", &self.form.start_year)?;
        let end = parse_year("End year", &self.form.end_year)?;
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                bail!("Start year {s} is after end year {e}");
            }
        }
        Ok((start, end))
    }

    fn execute(&mut self) -> Result<()> {
        let region = self.form.region.trim().to_string();
        if region.is_empty() {
            bail!("Enter a region name");
        }

        match self.mode {
            Mode::Compare => {
                let other = self.form.compare_with.trim().to_string();
                if other.is_empty() {
                    bail!("Enter a second region to compare with");
                }
                let n = parse_last_n(&self.form.last_n)?;
                let report = query::compare_avg_annual_rainfall(self.dataset, &region, &other, n);
                self.matched = vec![
                    data::resolve(&region, self.dataset),
                    data::resolve(&other, self.dataset),
                ];
                self.result = Some(QueryResult::Comparison(report));
            }
            Mode::Trend => {
                let (start, end) = self.year_range()?;
                let report = query::rainfall_trend(self.dataset, &region, start, end);
                let fit = data::linear_fit(&report.series);
                self.matched = vec![data::resolve(&region, self.dataset)];
                self.result = Some(QueryResult::Trend { report, fit });
            }
            Mode::TimeSeries => {
                let (start, end) = self.year_range()?;
                let report = query::rainfall_time_series(self.dataset, &region, start, end);
                self.matched = vec![data::resolve(&region, self.dataset)];
                self.result = Some(QueryResult::TimeSeries(report));
            }
        }

        self.table_scroll = 0;
        debug!(mode = ?self.mode, region = %region, "query executed");
        Ok(())
    }

    /// Handle keyboard input
    pub fn handle_input(&mut self, key: KeyCode) {
        if self.edit_buffer.is_some() {
            self.handle_edit(key);
            return;
        }

        // Global shortcuts
        match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::F(1) => {
                self.show_help = !self.show_help;
                return;
            }
            KeyCode::Esc if self.show_help => {
                self.show_help = false;
                return;
            }
            KeyCode::Char('r') => {
                self.run_query();
                return;
            }
            KeyCode::Tab => {
                self.focused = self.focused.next();
                return;
            }
            KeyCode::BackTab => {
                self.focused = self.focused.prev();
                return;
            }
            _ => {}
        }

        // If help is shown, don't process other keys
        if self.show_help {
            return;
        }

        // Mode selection with number keys
        if let KeyCode::Char(c) = key {
            if let Some(n) = c.to_digit(10) {
                if n > 0 && (n as usize) <= Mode::ALL.len() {
                    self.set_mode(Mode::ALL[n as usize - 1]);
                    return;
                }
            }
        }

        match self.focused {
            FocusedPanel::Modes => self.handle_mode_navigation(key),
            FocusedPanel::Form => self.handle_form_navigation(key),
            FocusedPanel::Chart => match key {
                KeyCode::Down | KeyCode::Char('j') => {
                    let last = self.year_table().1.len().saturating_sub(1);
                    self.table_scroll = (self.table_scroll + 1).min(last);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.table_scroll = self.table_scroll.saturating_sub(1);
                }
                KeyCode::Esc => self.focused = FocusedPanel::Form,
                _ => {}
            },
        }
    }

    fn handle_mode_navigation(&mut self, key: KeyCode) {
        match key {
            KeyCode::Down | KeyCode::Char('j') => self.set_mode(self.mode.next()),
            KeyCode::Up | KeyCode::Char('k') => self.set_mode(self.mode.prev()),
            KeyCode::Enter | KeyCode::Char('l') => self.focused = FocusedPanel::Form,
            _ => {}
        }
    }

    fn handle_form_navigation(&mut self, key: KeyCode) {
        let num_fields = self.mode.fields().len();
        match key {
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_field = (self.selected_field + 1) % num_fields;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_field = self
                    .selected_field
                    .checked_sub(1)
                    .unwrap_or(num_fields - 1);
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                let value = self.form.get(self.current_field()).to_string();
                self.edit_buffer = Some(value);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                if self.form.step(self.current_field(), 1) {
                    self.run_query();
                }
            }
            KeyCode::Char('-') => {
                if self.form.step(self.current_field(), -1) {
                    self.run_query();
                }
            }
            KeyCode::Esc => self.focused = FocusedPanel::Modes,
            _ => {}
        }
    }

    fn handle_edit(&mut self, key: KeyCode) {
        let Some(buffer) = self.edit_buffer.as_mut() else {
            return;
        };
        match key {
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Enter => {
                let value = buffer.clone();
                self.edit_buffer = None;
                *self.form.get_mut(self.current_field()) = value;
                self.run_query();
            }
            KeyCode::Esc => self.edit_buffer = None,
            _ => {}
        }
    }

    fn chart_title(&self) -> String {
        match &self.result {
            Some(QueryResult::Comparison(r)) => {
                format!("{} vs {}: annual rainfall", r.region_x, r.region_y)
            }
            Some(QueryResult::Trend { report, .. }) => format!("{}: trend", report.region),
            Some(QueryResult::TimeSeries(r)) => format!("{}: annual rainfall", r.region),
            None => self.mode.title().to_string(),
        }
    }

    fn chart_series(&self) -> (Vec<(String, &AnnualSeries)>, Option<LinearFit>) {
        match &self.result {
            Some(QueryResult::Comparison(r)) => (
                vec![
                    (r.region_x.clone(), &r.series_x),
                    (r.region_y.clone(), &r.series_y),
                ],
                None,
            ),
            Some(QueryResult::Trend { report, fit }) => {
                (vec![(report.region.clone(), &report.series)], *fit)
            }
            Some(QueryResult::TimeSeries(r)) => (vec![(r.region.clone(), &r.series)], None),
            None => (Vec::new(), None),
        }
    }

    fn matched_line(&self) -> Line<'static> {
        let groups: Vec<String> = self
            .matched
            .iter()
            .map(|names| {
                if names.is_empty() {
                    "none".to_string()
                } else {
                    names.join(", ")
                }
            })
            .collect();
        Line::from(Span::styled(
            format!("Matched sub-divisions: {}", groups.join(" | ")),
            self.theme.dimmed_title_style(),
        ))
    }

    fn span_of_years(series: &AnnualSeries) -> String {
        match (series.first_year(), series.last_year()) {
            (Some(first), Some(last)) => format!(
                "Years {first}-{last} ({} points), mean {}",
                series.len(),
                format_mm(series.mean())
            ),
            _ => "No years in range".to_string(),
        }
    }

    /// Header and per-year rows of the current result
    fn year_table(&self) -> (Vec<String>, Vec<Vec<String>>) {
        fn cell(value: Option<f64>) -> String {
            value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
        }
        fn value_at(series: &AnnualSeries, year: i32) -> Option<f64> {
            series
                .points()
                .iter()
                .find(|p| p.year == year)
                .map(|p| p.rainfall_mm)
        }

        match &self.result {
            Some(QueryResult::Comparison(r)) => (
                vec!["Year".to_string(), r.region_x.clone(), r.region_y.clone()],
                r.years
                    .iter()
                    .map(|&year| {
                        vec![
                            year.to_string(),
                            cell(value_at(&r.series_x, year)),
                            cell(value_at(&r.series_y, year)),
                        ]
                    })
                    .collect(),
            ),
            Some(QueryResult::Trend { report, fit }) => (
                vec![
                    "Year".to_string(),
                    "Rainfall mm".to_string(),
                    "Fitted mm".to_string(),
                ],
                report
                    .series
                    .points()
                    .iter()
                    .map(|p| {
                        vec![
                            p.year.to_string(),
                            cell(Some(p.rainfall_mm)),
                            cell(fit.map(|f| f.predict(f64::from(p.year)))),
                        ]
                    })
                    .collect(),
            ),
            Some(QueryResult::TimeSeries(r)) => (
                vec!["Year".to_string(), "Rainfall mm".to_string()],
                r.series
                    .points()
                    .iter()
                    .map(|p| vec![p.year.to_string(), cell(Some(p.rainfall_mm))])
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        }
    }

    fn result_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        match &self.result {
            Some(QueryResult::Comparison(r)) => {
                let years = if r.years.is_empty() {
                    "none".to_string()
                } else {
                    r.years
                        .iter()
                        .map(i32::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                lines.push(Line::from(format!("Over years: {years}")));
                for (i, (name, avg)) in [(&r.region_x, r.avg_x_mm), (&r.region_y, r.avg_y_mm)]
                    .into_iter()
                    .enumerate()
                {
                    lines.push(Line::from(vec![
                        Span::styled(
                            name.clone(),
                            Style::default().fg(self.theme.chart_color(i)),
                        ),
                        Span::raw(format!(" average: {}", format_mm(avg))),
                    ]));
                }
            }
            Some(QueryResult::Trend { report, .. }) => {
                lines.push(Line::from(format!("Region: {}", report.region)));
                let slope = match report.trend_slope_mm_per_year {
                    Some(slope) => Span::styled(
                        format!("{slope:+.2} mm/year"),
                        self.theme.slope_style(slope),
                    ),
                    None => Span::styled(
                        "n/a (fewer than 3 years)".to_string(),
                        self.theme.warning_style(),
                    ),
                };
                lines.push(Line::from(vec![Span::raw("Trend (slope): "), slope]));
                lines.push(Line::from(Self::span_of_years(&report.series)));
            }
            Some(QueryResult::TimeSeries(r)) => {
                lines.push(Line::from(format!("Region: {}", r.region)));
                if r.series.is_empty() {
                    lines.push(Line::from(Span::styled(
                        "No data for that region / years.".to_string(),
                        self.theme.warning_style(),
                    )));
                } else {
                    lines.push(Line::from(Self::span_of_years(&r.series)));
                }
            }
            None => lines.push(Line::from("No query run yet")),
        }
        if !self.matched.is_empty() {
            lines.push(self.matched_line());
        }
        lines
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        let size = frame.area();

        // Main layout: body, status bar
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(size);

        // Body layout: sidebar (left) and content (right)
        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(40)])
            .split(main_chunks[0]);

        // Sidebar layout: modes, form
        let sidebar_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(8)])
            .split(body_chunks[0]);

        // Content layout: chart, result details
        let content_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(9)])
            .split(body_chunks[1]);

        // Details layout: result summary, year table
        let detail_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(content_chunks[1]);

        let mode_titles: Vec<&str> = Mode::ALL.iter().map(|m| m.title()).collect();
        ModeList::new(&mode_titles, self.mode.index(), &self.theme).render(
            frame,
            sidebar_chunks[0],
            self.focused == FocusedPanel::Modes,
        );

        let current = self.current_field();
        let rows: Vec<FormRow> = self
            .mode
            .fields()
            .iter()
            .map(|&field| FormRow {
                label: field.label(),
                value: match &self.edit_buffer {
                    Some(buffer) if field == current => buffer.as_str(),
                    _ => self.form.get(field),
                },
            })
            .collect();
        QueryForm::new(
            &rows,
            self.selected_field,
            self.edit_buffer.is_some(),
            &self.theme,
        )
        .render(frame, sidebar_chunks[1], self.focused == FocusedPanel::Form);

        let (series, fit) = self.chart_series();
        let title = self.chart_title();
        RainfallChart::new(&series, fit, &title, &self.theme).render(
            frame,
            content_chunks[0],
            self.focused == FocusedPanel::Chart,
        );

        ResultPanel::new(self.result_lines(), &self.theme).render(frame, detail_chunks[0]);

        let (header, rows) = self.year_table();
        YearTable::new(&header, &rows, self.table_scroll, &self.theme).render(
            frame,
            detail_chunks[1],
            self.focused == FocusedPanel::Chart,
        );

        StatusBar::new(CITATION, self.error_message.as_deref(), &self.theme)
            .render(frame, main_chunks[1]);

        if self.show_help {
            let modes = Mode::ALL.map(Mode::help);
            HelpOverlay::new(&modes, self.mode.index(), &self.theme).render(frame, size);
        }
    }
}

/// Restore terminal to normal state
fn restore_terminal() {
    // Best effort cleanup - ignore errors since we may be in a panic
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Run the TUI application
pub fn run(config: AppConfig, dataset: &Dataset) -> Result<()> {
    info!(path = ?config.data_path, "starting dashboard");

    let mut app = App::new(&config, dataset);

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        restore_terminal();
        return Err(e).context("Failed to setup terminal");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(t) => t,
        Err(e) => {
            restore_terminal();
            return Err(e).context("Failed to create terminal");
        }
    };

    let result = run_main_loop(&mut terminal, &mut app);

    // Always restore terminal, regardless of result
    restore_terminal();
    terminal.show_cursor().ok();

    result
}

/// Main application loop
fn run_main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_input(key.code);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
