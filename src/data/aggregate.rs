//! Annual series extraction and the statistics derived from it.
//!
//! All functions are pure with respect to the [`Dataset`] they are given.

use std::collections::BTreeMap;

use tracing::debug;

use super::models::{AnnualSeries, LinearFit, YearlyRainfall};
use super::resolver::resolve;
use super::storage::Dataset;

/// Minimum number of points for a trend to be reported
pub const MIN_TREND_POINTS: usize = 3;

/// Per-year mean annual rainfall across every region matched by `region_query`,
/// restricted to `[start_year, end_year]` where given.
///
/// Missing annual totals are left out of the mean; a year with no values at all
/// is dropped. Records without a year never contribute.
pub fn annual_series(
    dataset: &Dataset,
    region_query: &str,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> AnnualSeries {
    let regions = resolve(region_query, dataset);
    if regions.is_empty() {
        return AnnualSeries::default();
    }

    // year -> (sum, count)
    let mut by_year: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for record in dataset.records_for(&regions) {
        let (Some(year), Some(value)) = (record.year, record.annual_mm) else {
            continue;
        };
        let entry = by_year.entry(year).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let points: Vec<YearlyRainfall> = by_year
        .into_iter()
        .filter(|&(year, _)| start_year.map_or(true, |start| year >= start))
        .filter(|&(year, _)| end_year.map_or(true, |end| year <= end))
        .map(|(year, (sum, count))| YearlyRainfall {
            year,
            rainfall_mm: sum / count as f64,
        })
        .collect();

    debug!(
        query = region_query,
        regions = regions.len(),
        points = points.len(),
        "built annual series"
    );
    AnnualSeries::from_sorted(points)
}

/// The `n` most recent years of the unbounded series, ascending
pub fn last_n_years(dataset: &Dataset, region_query: &str, n: usize) -> AnnualSeries {
    let series = annual_series(dataset, region_query, None, None);
    let skip = series.len().saturating_sub(n);
    AnnualSeries::from_sorted(series.points()[skip..].to_vec())
}

/// Mean of the series over `[start_year, end_year]`, `None` when nothing is in range
pub fn average_over_period(
    dataset: &Dataset,
    region_query: &str,
    start_year: i32,
    end_year: i32,
) -> Option<f64> {
    annual_series(dataset, region_query, Some(start_year), Some(end_year)).mean()
}

/// Ordinary least-squares fit of rainfall against year.
///
/// Returns `None` for fewer than [`MIN_TREND_POINTS`] points.
pub fn linear_fit(series: &AnnualSeries) -> Option<LinearFit> {
    if series.len() < MIN_TREND_POINTS {
        return None;
    }

    let n = series.len() as f64;
    let mean_x = series.points().iter().map(|p| f64::from(p.year)).sum::<f64>() / n;
    let mean_y = series.points().iter().map(|p| p.rainfall_mm).sum::<f64>() / n;

    let (sxy, sxx) = series
        .points()
        .iter()
        .fold((0.0, 0.0), |(sxy, sxx), p| {
            let dx = f64::from(p.year) - mean_x;
            (sxy + dx * (p.rainfall_mm - mean_y), sxx + dx * dx)
        });
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Trend of the (optionally bounded) series in mm per year
pub fn trend_slope(
    dataset: &Dataset,
    region_query: &str,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> Option<f64> {
    let series = annual_series(dataset, region_query, start_year, end_year);
    linear_fit(&series).map(|fit| fit.slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testdata::sample_dataset;

    fn pairs(series: &AnnualSeries) -> Vec<(i32, f64)> {
        series
            .points()
            .iter()
            .map(|p| (p.year, p.rainfall_mm))
            .collect()
    }

    fn series(points: &[(i32, f64)]) -> AnnualSeries {
        AnnualSeries::from_sorted(
            points
                .iter()
                .map(|&(year, rainfall_mm)| YearlyRainfall { year, rainfall_mm })
                .collect(),
        )
    }

    #[test]
    fn test_konkan_scenario() {
        let dataset = sample_dataset();
        let s = annual_series(&dataset, "konkan and goa", None, None);
        assert_eq!(pairs(&s), vec![(2015, 2000.0), (2016, 2100.0), (2017, 1900.0)]);
        assert_eq!(average_over_period(&dataset, "konkan and goa", 2015, 2017), Some(2000.0));

        let slope = trend_slope(&dataset, "konkan and goa", None, None).unwrap();
        assert!((slope + 50.0).abs() < 1e-9, "slope was {slope}");
    }

    #[test]
    fn test_unknown_region_is_empty() {
        let dataset = sample_dataset();
        assert!(annual_series(&dataset, "Atlantis", None, None).is_empty());
        assert_eq!(average_over_period(&dataset, "Atlantis", 1900, 2100), None);
        assert_eq!(trend_slope(&dataset, "Atlantis", None, None), None);
    }

    #[test]
    fn test_missing_values_excluded_from_mean() {
        let dataset = sample_dataset();
        // 2016 is NA for Marathwada, so only Madhya Maharashtra counts that year
        let s = annual_series(&dataset, "Madhya Marathwada", None, None);
        assert_eq!(
            pairs(&s),
            vec![(2014, 700.0), (2015, 700.0), (2016, 900.0), (2017, 900.0)]
        );
    }

    #[test]
    fn test_all_missing_year_is_dropped() {
        let dataset = sample_dataset();
        let s = annual_series(&dataset, "marathwada", None, None);
        assert_eq!(pairs(&s), vec![(2015, 600.0), (2017, 800.0)]);

        let s = annual_series(&dataset, "kutch", None, None);
        assert_eq!(pairs(&s), vec![(2013, 500.0), (2014, 600.0)]);
    }

    #[test]
    fn test_records_without_year_never_contribute() {
        let dataset = sample_dataset();
        // "Goa" matches the Goa row too, but that row has no year
        let s = annual_series(&dataset, "goa", None, None);
        assert_eq!(pairs(&s), vec![(2015, 2000.0), (2016, 2100.0), (2017, 1900.0)]);
    }

    #[test]
    fn test_year_bounds_are_inclusive() {
        let dataset = sample_dataset();
        let s = annual_series(&dataset, "maharashtra", Some(2015), Some(2016));
        assert_eq!(pairs(&s), vec![(2015, 800.0), (2016, 900.0)]);

        let s = annual_series(&dataset, "maharashtra", Some(2016), None);
        assert_eq!(pairs(&s), vec![(2016, 900.0), (2017, 1000.0)]);

        let s = annual_series(&dataset, "maharashtra", None, Some(2014));
        assert_eq!(pairs(&s), vec![(2014, 700.0)]);

        assert!(annual_series(&dataset, "maharashtra", Some(2017), Some(2014)).is_empty());
    }

    #[test]
    fn test_years_strictly_increasing() {
        let dataset = sample_dataset();
        for query in ["", "goa", "maharashtra", "madhya marathwada", "gujarat"] {
            let s = annual_series(&dataset, query, None, None);
            let years: Vec<i32> = s.years().collect();
            assert!(
                years.windows(2).all(|w| w[0] < w[1]),
                "years not strictly increasing for {query:?}: {years:?}"
            );
        }
    }

    #[test]
    fn test_last_n_years() {
        let dataset = sample_dataset();
        let s = last_n_years(&dataset, "maharashtra", 2);
        assert_eq!(pairs(&s), vec![(2016, 900.0), (2017, 1000.0)]);

        // fewer years than requested returns everything
        let s = last_n_years(&dataset, "maharashtra", 10);
        assert_eq!(s.len(), 4);
        assert_eq!(s.first_year(), Some(2014));

        assert!(last_n_years(&dataset, "maharashtra", 0).is_empty());
        assert!(last_n_years(&dataset, "Atlantis", 5).is_empty());
    }

    #[test]
    fn test_linear_fit_synthetic() {
        let fit = linear_fit(&series(&[(2010, 100.0), (2011, 110.0), (2012, 120.0)])).unwrap();
        assert!((fit.slope - 10.0).abs() < 1e-9);
        assert!((fit.predict(2013.0) - 130.0).abs() < 1e-6);
    }

    #[test]
    fn test_linear_fit_needs_three_points() {
        assert_eq!(linear_fit(&AnnualSeries::default()), None);
        assert_eq!(linear_fit(&series(&[(2010, 100.0)])), None);
        assert_eq!(linear_fit(&series(&[(2010, 100.0), (2011, 300.0)])), None);
    }

    #[test]
    fn test_trend_slope_respects_bounds() {
        let dataset = sample_dataset();
        let slope = trend_slope(&dataset, "maharashtra", None, None).unwrap();
        assert!((slope - 100.0).abs() < 1e-9);
        // only two points left in range
        assert_eq!(trend_slope(&dataset, "maharashtra", Some(2016), None), None);
    }
}
