//! Plain-text and JSON rendering of query results for the non-interactive subcommands.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::data::AnnualSeries;
use crate::query::{ComparisonReport, RainfallSummary, TimeSeriesReport, TrendReport};

/// Pretty-printed JSON followed by a newline
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Format an optional millimetre value, `n/a` when absent
pub fn format_mm(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1} mm"))
}

fn write_series<W: Write>(out: &mut W, series: &AnnualSeries) -> Result<()> {
    if series.is_empty() {
        writeln!(out, "  (no data)")?;
        return Ok(());
    }
    writeln!(out, "  {:>6}  {:>12}", "Year", "Rainfall mm")?;
    for point in series.points() {
        writeln!(out, "  {:>6}  {:>12.1}", point.year, point.rainfall_mm)?;
    }
    Ok(())
}

pub fn write_comparison<W: Write>(out: &mut W, report: &ComparisonReport) -> Result<()> {
    let years: Vec<String> = report.years.iter().map(i32::to_string).collect();
    writeln!(out, "Over years: [{}]", years.join(", "))?;
    writeln!(out)?;
    writeln!(out, "{}: average {}", report.region_x, format_mm(report.avg_x_mm))?;
    write_series(out, &report.series_x)?;
    writeln!(out)?;
    writeln!(out, "{}: average {}", report.region_y, format_mm(report.avg_y_mm))?;
    write_series(out, &report.series_y)?;
    writeln!(out)?;
    writeln!(out, "{}", report.citation)?;
    Ok(())
}

pub fn write_trend<W: Write>(out: &mut W, report: &TrendReport) -> Result<()> {
    writeln!(out, "Region: {}", report.region)?;
    match report.trend_slope_mm_per_year {
        Some(slope) => writeln!(out, "Trend (slope): {slope:+.2} mm/year")?,
        None => writeln!(out, "Trend (slope): n/a (fewer than 3 years)")?,
    }
    write_series(out, &report.series)?;
    writeln!(out)?;
    writeln!(out, "{}", report.citation)?;
    Ok(())
}

pub fn write_time_series<W: Write>(out: &mut W, report: &TimeSeriesReport) -> Result<()> {
    writeln!(out, "Region: {}", report.region)?;
    if report.series.is_empty() {
        writeln!(out, "No data for that region / years.")?;
    } else {
        write_series(out, &report.series)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", report.citation)?;
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, summary: &RainfallSummary) -> Result<()> {
    writeln!(out, "{summary}")?;
    if let RainfallSummary::Found { citation, .. } = summary {
        writeln!(out, "{citation}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testdata::sample_dataset;
    use crate::query::{compare_avg_annual_rainfall, rainfall_time_series, rainfall_trend, CITATION};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_mm() {
        assert_eq!(format_mm(Some(1234.56)), "1234.6 mm");
        assert_eq!(format_mm(None), "n/a");
    }

    #[test]
    fn test_comparison_text_ends_with_citation() {
        let dataset = sample_dataset();
        let report = compare_avg_annual_rainfall(&dataset, "Maharashtra", "Gujarat", 5);
        let text = render(|out| write_comparison(out, &report));
        assert!(text.starts_with("Over years: [2014]"));
        assert!(text.contains("Maharashtra: average 700.0 mm"));
        assert!(text.trim_end().ends_with(CITATION));
    }

    #[test]
    fn test_trend_without_slope() {
        let dataset = sample_dataset();
        let report = rainfall_trend(&dataset, "marathwada", None, None);
        let text = render(|out| write_trend(out, &report));
        assert!(text.contains("n/a (fewer than 3 years)"));
    }

    #[test]
    fn test_empty_time_series_message() {
        let dataset = sample_dataset();
        let report = rainfall_time_series(&dataset, "Atlantis", None, None);
        let text = render(|out| write_time_series(out, &report));
        assert!(text.contains("No data for that region / years."));
    }

    #[test]
    fn test_json_output() {
        let dataset = sample_dataset();
        let report = rainfall_trend(&dataset, "konkan", None, None);
        let text = render(|out| write_json(out, &report));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["region"], "konkan");
        assert_eq!(value["series"].as_array().unwrap().len(), 3);
    }
}
