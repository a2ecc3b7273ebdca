//! Query entry points used by the CLI and the dashboard.
//!
//! Every result carries [`CITATION`] so each number shown can be traced back to
//! the source table.

use serde::Serialize;

use crate::data::{self, AnnualSeries, Dataset};

/// Source attribution attached to every result
pub const CITATION: &str =
    "Sub-Divisional Monthly Rainfall (IMD), source: data/Sub_Division_IMD_2017.csv";

/// Average annual rainfall of two regions over their last N years
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    #[serde(rename = "state_x")]
    pub region_x: String,
    #[serde(rename = "state_y")]
    pub region_y: String,
    pub years: Vec<i32>,
    #[serde(rename = "time_series_x")]
    pub series_x: AnnualSeries,
    #[serde(rename = "time_series_y")]
    pub series_y: AnnualSeries,
    pub avg_x_mm: Option<f64>,
    pub avg_y_mm: Option<f64>,
    pub citation: &'static str,
}

/// Series of one region plus its least-squares slope
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub region: String,
    pub series: AnnualSeries,
    pub trend_slope_mm_per_year: Option<f64>,
    pub citation: &'static str,
}

/// Series of one region
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesReport {
    pub region: String,
    pub series: AnnualSeries,
    pub citation: &'static str,
}

/// One-line answer for a region, or an explicit not-found marker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RainfallSummary {
    Found {
        region: String,
        average_mm: f64,
        first_year: i32,
        last_year: i32,
        citation: &'static str,
    },
    NotFound {
        region: String,
    },
}

impl std::fmt::Display for RainfallSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RainfallSummary::Found {
                region,
                average_mm,
                first_year,
                last_year,
                ..
            } => write!(
                f,
                "Average Annual Rainfall for {} ({first_year}-{last_year}): {average_mm:.1} mm",
                title_case(region)
            ),
            RainfallSummary::NotFound { region } => write!(
                f,
                "No rainfall data found for '{region}'. Please check the name or try a nearby subdivision."
            ),
        }
    }
}

/// Capitalize the first letter of each whitespace-separated word
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn compare_avg_annual_rainfall(
    dataset: &Dataset,
    region_x: &str,
    region_y: &str,
    last_n_years: usize,
) -> ComparisonReport {
    let result = data::compare(dataset, region_x, region_y, last_n_years);
    ComparisonReport {
        region_x: result.region_x,
        region_y: result.region_y,
        years: result.years,
        series_x: result.series_x,
        series_y: result.series_y,
        avg_x_mm: result.avg_x,
        avg_y_mm: result.avg_y,
        citation: CITATION,
    }
}

pub fn rainfall_trend(
    dataset: &Dataset,
    region: &str,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> TrendReport {
    TrendReport {
        region: region.to_string(),
        series: data::annual_series(dataset, region, start_year, end_year),
        trend_slope_mm_per_year: data::trend_slope(dataset, region, start_year, end_year),
        citation: CITATION,
    }
}

pub fn rainfall_time_series(
    dataset: &Dataset,
    region: &str,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> TimeSeriesReport {
    TimeSeriesReport {
        region: region.to_string(),
        series: data::annual_series(dataset, region, start_year, end_year),
        citation: CITATION,
    }
}

/// Average annual rainfall of a region.
///
/// With `period`, the mean covers only those inclusive bounds; otherwise every
/// year the region has data for.
pub fn rainfall_summary(
    dataset: &Dataset,
    region: &str,
    period: Option<(i32, i32)>,
) -> RainfallSummary {
    let found = match period {
        Some((start, end)) => data::average_over_period(dataset, region, start, end)
            .map(|average_mm| (average_mm, start, end)),
        None => {
            let series = data::annual_series(dataset, region, None, None);
            series
                .mean()
                .zip(series.first_year())
                .zip(series.last_year())
                .map(|((average_mm, first), last)| (average_mm, first, last))
        }
    };

    match found {
        Some((average_mm, first_year, last_year)) => RainfallSummary::Found {
            region: region.to_string(),
            average_mm,
            first_year,
            last_year,
            citation: CITATION,
        },
        None => RainfallSummary::NotFound {
            region: region.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testdata::sample_dataset;

    #[test]
    fn test_compare_report_carries_citation_and_averages() {
        let dataset = sample_dataset();
        let report = compare_avg_annual_rainfall(&dataset, "Maharashtra", "Gujarat", 5);
        assert_eq!(report.citation, CITATION);
        assert_eq!(report.years, vec![2014]);
        assert_eq!(report.avg_x_mm, Some(700.0));
        assert_eq!(report.avg_y_mm, Some(1100.0));
    }

    #[test]
    fn test_trend_report() {
        let dataset = sample_dataset();
        let report = rainfall_trend(&dataset, "konkan and goa", None, None);
        assert_eq!(report.series.len(), 3);
        let slope = report.trend_slope_mm_per_year.unwrap();
        assert!((slope + 50.0).abs() < 1e-9);
        assert_eq!(report.citation, CITATION);
    }

    #[test]
    fn test_trend_report_insufficient_points() {
        let dataset = sample_dataset();
        let report = rainfall_trend(&dataset, "marathwada", None, None);
        assert_eq!(report.series.len(), 2);
        assert_eq!(report.trend_slope_mm_per_year, None);
    }

    #[test]
    fn test_time_series_report_bounds() {
        let dataset = sample_dataset();
        let report = rainfall_time_series(&dataset, "gujarat", Some(2013), None);
        assert_eq!(report.series.years().collect::<Vec<_>>(), vec![2013, 2014]);
        assert_eq!(report.citation, CITATION);
    }

    #[test]
    fn test_summary_found() {
        let dataset = sample_dataset();
        let summary = rainfall_summary(&dataset, "konkan and goa", None);
        assert_eq!(
            summary,
            RainfallSummary::Found {
                region: "konkan and goa".to_string(),
                average_mm: 2000.0,
                first_year: 2015,
                last_year: 2017,
                citation: CITATION,
            }
        );
        assert_eq!(
            summary.to_string(),
            "Average Annual Rainfall for Konkan And Goa (2015-2017): 2000.0 mm"
        );
    }

    #[test]
    fn test_summary_over_period() {
        let dataset = sample_dataset();
        let summary = rainfall_summary(&dataset, "Madhya Maharashtra", Some((2015, 2016)));
        assert_eq!(
            summary.to_string(),
            "Average Annual Rainfall for Madhya Maharashtra (2015-2016): 850.0 mm"
        );

        let outside = rainfall_summary(&dataset, "Madhya Maharashtra", Some((1990, 1995)));
        assert!(matches!(outside, RainfallSummary::NotFound { .. }));
    }

    #[test]
    fn test_summary_not_found() {
        let dataset = sample_dataset();
        let summary = rainfall_summary(&dataset, "Atlantis", None);
        assert!(matches!(summary, RainfallSummary::NotFound { .. }));
        assert!(summary.to_string().starts_with("No rainfall data found for 'Atlantis'"));
    }

    #[test]
    fn test_comparison_json_keys() {
        let dataset = sample_dataset();
        let report = compare_avg_annual_rainfall(&dataset, "Maharashtra", "Gujarat", 5);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["state_x"], "Maharashtra");
        assert_eq!(json["avg_y_mm"], 1100.0);
        assert_eq!(json["time_series_x"][0]["Year"], 2014);
        assert_eq!(json["citation"], CITATION);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("konkan and goa"), "Konkan And Goa");
        assert_eq!(title_case("  GUJARAT  region"), "Gujarat Region");
    }
}
