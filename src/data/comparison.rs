//! Side-by-side comparison of two regions over their most recent years.

use std::collections::BTreeSet;

use tracing::debug;

use super::aggregate::last_n_years;
use super::models::AnnualSeries;
use super::storage::Dataset;

/// Two regions aligned on a common set of years
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub region_x: String,
    pub region_y: String,
    /// Years both series are restricted to, ascending
    pub years: Vec<i32>,
    pub series_x: AnnualSeries,
    pub series_y: AnnualSeries,
    pub avg_x: Option<f64>,
    pub avg_y: Option<f64>,
}

/// Years to compare on.
///
/// Normally the intersection of both year sets. When the regions share no year
/// at all, fall back to the most recent `min(|x|, |y|)` years of their union so
/// the result still covers a window of comparable length.
fn aligned_years(x: &AnnualSeries, y: &AnnualSeries) -> Vec<i32> {
    let years_x: BTreeSet<i32> = x.years().collect();
    let years_y: BTreeSet<i32> = y.years().collect();

    let overlap: Vec<i32> = years_x.intersection(&years_y).copied().collect();
    if !overlap.is_empty() {
        return overlap;
    }

    let union: Vec<i32> = years_x.union(&years_y).copied().collect();
    let keep = years_x.len().min(years_y.len());
    union[union.len() - keep..].to_vec()
}

/// Compare the last `n` years of two region queries
pub fn compare(dataset: &Dataset, region_x: &str, region_y: &str, n: usize) -> ComparisonResult {
    let recent_x = last_n_years(dataset, region_x, n);
    let recent_y = last_n_years(dataset, region_y, n);

    let years = aligned_years(&recent_x, &recent_y);
    let wanted: BTreeSet<i32> = years.iter().copied().collect();

    let series_x = recent_x.retain_years(|year| wanted.contains(&year));
    let series_y = recent_y.retain_years(|year| wanted.contains(&year));

    debug!(region_x, region_y, n, ?years, "compared regions");

    ComparisonResult {
        region_x: region_x.to_string(),
        region_y: region_y.to_string(),
        years,
        avg_x: series_x.mean(),
        avg_y: series_y.mean(),
        series_x,
        series_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::YearlyRainfall;
    use crate::data::testdata::sample_dataset;

    fn series(years: &[i32]) -> AnnualSeries {
        AnnualSeries::from_sorted(
            years
                .iter()
                .map(|&year| YearlyRainfall {
                    year,
                    rainfall_mm: 1.0,
                })
                .collect(),
        )
    }

    #[test]
    fn test_overlapping_years_use_intersection() {
        let dataset = sample_dataset();
        // Maharashtra: 2014..=2017, Gujarat: 2012..=2014
        let result = compare(&dataset, "Maharashtra", "Gujarat", 5);
        assert_eq!(result.years, vec![2014]);
        assert_eq!(result.avg_x, Some(700.0));
        assert_eq!(result.avg_y, Some(1100.0));
        assert_eq!(result.series_x.len(), 1);
        assert_eq!(result.series_y.len(), 1);
        assert_eq!(result.region_x, "Maharashtra");
        assert_eq!(result.region_y, "Gujarat");
    }

    #[test]
    fn test_averages_cover_exactly_the_aligned_years() {
        let dataset = sample_dataset();
        // Maharashtra: 2014..=2017, Goa: 2015..=2017
        let result = compare(&dataset, "maharashtra", "goa", 5);
        assert_eq!(result.years, vec![2015, 2016, 2017]);
        assert_eq!(result.avg_x, Some(900.0));
        assert_eq!(result.avg_y, Some(2000.0));
    }

    #[test]
    fn test_disjoint_years_fall_back_to_recent_union() {
        let dataset = sample_dataset();
        // Konkan: 2015..=2017, Gujarat: 2012..=2014
        let result = compare(&dataset, "konkan", "gujarat", 3);
        assert_eq!(result.years, vec![2015, 2016, 2017]);
        assert_eq!(result.series_x.len(), 3);
        assert!(result.series_y.is_empty());
        assert_eq!(result.avg_x, Some(2000.0));
        assert_eq!(result.avg_y, None);
    }

    #[test]
    fn test_unknown_region_yields_empty_window() {
        let dataset = sample_dataset();
        let result = compare(&dataset, "Atlantis", "Gujarat", 5);
        assert!(result.years.is_empty());
        assert!(result.series_x.is_empty());
        assert!(result.series_y.is_empty());
        assert_eq!(result.avg_x, None);
        assert_eq!(result.avg_y, None);
    }

    #[test]
    fn test_aligned_years_fallback_length() {
        let years = aligned_years(&series(&[2001, 2003]), &series(&[2002, 2004, 2006]));
        assert_eq!(years, vec![2004, 2006]);
    }
}
