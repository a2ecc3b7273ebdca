//! rainfall-tui: region-based rainfall queries over the IMD sub-divisional dataset
//!
//! Resolves fuzzy region names against the sub-division labels, aggregates their
//! annual totals and shows the result either in a keyboard-driven terminal
//! dashboard or as plain / JSON output.

mod app;
mod cli;
mod data;
mod logging;
mod output;
mod query;
mod ui;

use std::io::{self, Write};

use anyhow::{Context, Result};
use cli::{AppConfig, Cli, Commands};
use data::Dataset;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = AppConfig::from_global(cli.global);

    let command = cli.command.unwrap_or(Commands::Show {
        region: None,
        compare_with: None,
        last_n: None,
        start: None,
        end: None,
    });

    match command {
        Commands::Show {
            region,
            compare_with,
            last_n,
            start,
            end,
        } => {
            let config = config.with_show_args(region, compare_with, last_n, start, end);
            if let Some(path) = &config.log_file {
                logging::init_file(path, config.verbose)?;
            }
            let dataset = load_dataset(&config)?;
            app::run(config, &dataset)
        }
        command => {
            match &config.log_file {
                Some(path) => logging::init_file(path, config.verbose)?,
                None => logging::init_stderr(config.verbose)?,
            }
            let dataset = load_dataset(&config)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            run_query(&mut out, &config, &dataset, command)?;
            out.flush()?;
            Ok(())
        }
    }
}

fn load_dataset(config: &AppConfig) -> Result<Dataset> {
    let dataset = Dataset::load(&config.data_path).with_context(|| {
        format!(
            "Could not load rainfall data from {:?}; pass --data or set {}",
            config.data_path,
            cli::DATA_ENV_VAR
        )
    })?;

    let report = dataset.report();
    debug!(
        records = dataset.records().len(),
        rows_read = report.rows_read,
        rows_skipped = report.rows_skipped,
        missing_years = report.missing_years,
        missing_annual = report.missing_annual,
        "dataset ready"
    );
    Ok(dataset)
}

/// Execute a non-interactive subcommand against the loaded dataset
fn run_query<W: Write>(
    out: &mut W,
    config: &AppConfig,
    dataset: &Dataset,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Compare {
            region_x,
            region_y,
            last_n,
        } => {
            let report = query::compare_avg_annual_rainfall(dataset, &region_x, &region_y, last_n);
            if config.json {
                output::write_json(out, &report)
            } else {
                output::write_comparison(out, &report)
            }
        }
        Commands::Trend { region, start, end } => {
            let report = query::rainfall_trend(dataset, &region, start, end);
            if config.json {
                output::write_json(out, &report)
            } else {
                output::write_trend(out, &report)
            }
        }
        Commands::Series { region, start, end } => {
            let report = query::rainfall_time_series(dataset, &region, start, end);
            if config.json {
                output::write_json(out, &report)
            } else {
                output::write_time_series(out, &report)
            }
        }
        Commands::Summary { region, start, end } => {
            let summary = query::rainfall_summary(dataset, &region, start.zip(end));
            if config.json {
                output::write_json(out, &summary)
            } else {
                output::write_summary(out, &summary)
            }
        }
        Commands::Regions { query: filter } => {
            let names = match &filter {
                Some(q) => data::resolve(q, dataset),
                None => dataset.region_names().map(String::from).collect(),
            };
            let years = dataset.available_years();
            if config.json {
                output::write_json(
                    out,
                    &serde_json::json!({
                        "regions": names,
                        "first_year": years.first(),
                        "last_year": years.last(),
                        "citation": query::CITATION,
                    }),
                )
            } else {
                for name in &names {
                    writeln!(out, "{name}")?;
                }
                if let (Some(first), Some(last)) = (years.first(), years.last()) {
                    writeln!(out, "\n{} region(s), data from {first} to {last}", names.len())?;
                }
                Ok(())
            }
        }
        Commands::Show { .. } => anyhow::bail!("the dashboard does not produce query output"),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cli::GlobalArgs;
    use crate::data::testdata::sample_dataset;

    fn config(json: bool) -> AppConfig {
        AppConfig::from_global(GlobalArgs {
            data: Some(PathBuf::from("unused.csv")),
            json,
            ..GlobalArgs::default()
        })
    }

    fn run(json: bool, command: Commands) -> String {
        let mut buf = Vec::new();
        run_query(&mut buf, &config(json), &sample_dataset(), command).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_summary_not_found_is_not_an_error() {
        let text = run(
            false,
            Commands::Summary {
                region: "Atlantis".to_string(),
                start: None,
                end: None,
            },
        );
        assert!(text.starts_with("No rainfall data found for 'Atlantis'"));
    }

    #[test]
    fn test_regions_query() {
        let text = run(
            false,
            Commands::Regions {
                query: Some("goa".to_string()),
            },
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Konkan & Goa");
        assert_eq!(lines[1], "Goa");
        assert!(text.contains("2 region(s), data from 2012 to 2017"));
    }

    #[test]
    fn test_compare_json() {
        let text = run(
            true,
            Commands::Compare {
                region_x: "Maharashtra".to_string(),
                region_y: "Gujarat".to_string(),
                last_n: 5,
            },
        );
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["years"], serde_json::json!([2014]));
    }
}
