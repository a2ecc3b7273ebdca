//! Data models for the sub-divisional rainfall table and the series derived from it.

use serde::Serialize;

/// Calendar month column headers, in order.
pub const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// One row of the source table: a region's rainfall for one year
#[derive(Debug, Clone, PartialEq)]
pub struct RainfallRecord {
    /// Region label exactly as it appears in the source
    pub region: String,
    /// `None` when the year cell was blank or unparsable
    pub year: Option<i32>,
    #[allow(dead_code)] // Not aggregated; read in tests
    pub monthly_mm: [Option<f64>; 12],
    pub annual_mm: Option<f64>,
}

/// Mean annual rainfall of the matched regions for a single year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyRainfall {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "annual_rainfall_mm")]
    pub rainfall_mm: f64,
}

/// Year-ordered rainfall series.
///
/// Years are strictly increasing; constructors in this crate uphold that.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnnualSeries {
    points: Vec<YearlyRainfall>,
}

impl AnnualSeries {
    /// Build from points already sorted by strictly increasing year
    pub(crate) fn from_sorted(points: Vec<YearlyRainfall>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].year < w[1].year));
        AnnualSeries { points }
    }

    pub fn points(&self) -> &[YearlyRainfall] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.points.iter().map(|p| p.year)
    }

    pub fn first_year(&self) -> Option<i32> {
        self.points.first().map(|p| p.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.points.last().map(|p| p.year)
    }

    /// Arithmetic mean of the series values, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let total: f64 = self.points.iter().map(|p| p.rainfall_mm).sum();
        Some(total / self.points.len() as f64)
    }

    /// Keep only points whose year satisfies `keep`
    pub fn retain_years<F>(&self, mut keep: F) -> AnnualSeries
    where
        F: FnMut(i32) -> bool,
    {
        AnnualSeries {
            points: self.points.iter().copied().filter(|p| keep(p.year)).collect(),
        }
    }
}

/// Least-squares line `rainfall = slope * year + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Millimetres per year
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, year: f64) -> f64 {
        self.slope * year + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(i32, f64)]) -> AnnualSeries {
        AnnualSeries::from_sorted(
            points
                .iter()
                .map(|&(year, rainfall_mm)| YearlyRainfall { year, rainfall_mm })
                .collect(),
        )
    }

    #[test]
    fn test_mean_of_empty_series_is_none() {
        assert_eq!(AnnualSeries::default().mean(), None);
    }

    #[test]
    fn test_mean() {
        let s = series(&[(2015, 2000.0), (2016, 2100.0), (2017, 1900.0)]);
        assert_eq!(s.mean(), Some(2000.0));
        assert_eq!(s.first_year(), Some(2015));
        assert_eq!(s.last_year(), Some(2017));
    }

    #[test]
    fn test_retain_years() {
        let s = series(&[(2015, 1.0), (2016, 2.0), (2017, 3.0)]);
        let kept = s.retain_years(|y| y != 2016);
        assert_eq!(kept.years().collect::<Vec<_>>(), vec![2015, 2017]);
    }

    #[test]
    fn test_serializes_with_original_keys() {
        let s = series(&[(2010, 100.5)]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "Year": 2010, "annual_rainfall_mm": 100.5 }])
        );
    }
}
