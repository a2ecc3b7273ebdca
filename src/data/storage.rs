//! CSV storage layer for the IMD sub-divisional rainfall table.
//!
//! Expected layout (one row per sub-division and year):
//! - `SUBDIVISION`: region label, e.g. "Konkan & Goa"
//! - `YEAR`: calendar year
//! - `JAN` .. `DEC`: optional monthly totals in mm
//! - `ANNUAL`: annual total in mm
//!
//! Header names may carry stray whitespace and are matched case-insensitively.
//! The table is read once and never mutated afterwards.

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{RainfallRecord, MONTHS};
use super::normalize::normalize;

const REGION_COLUMNS: &[&str] = &["subdivision", "region", "state"];
const YEAR_COLUMNS: &[&str] = &["year"];
const ANNUAL_COLUMNS: &[&str] = &["annual"];

/// Failure to produce a usable [`Dataset`]
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to open rainfall data {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed rainfall table")]
    Csv(#[from] csv::Error),

    #[error("required column `{column}` not found in rainfall table header")]
    MissingColumn { column: &'static str },

    #[error("rainfall table contains no usable rows")]
    Empty,
}

/// What happened while reading the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Data rows in the source, excluding the header
    pub rows_read: usize,
    /// Rows dropped because the region cell was blank
    pub rows_skipped: usize,
    /// Records kept with a blank or unparsable year
    pub missing_years: usize,
    /// Records kept with a blank or unparsable annual total
    pub missing_annual: usize,
}

/// A distinct raw region label alongside its normalized form
#[derive(Debug, Clone)]
pub(crate) struct RegionName {
    pub raw: String,
    pub normalized: String,
}

/// In-memory, read-only rainfall table
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<RainfallRecord>,
    /// Distinct region labels in first-seen order
    regions: Vec<RegionName>,
    report: LoadReport,
}

/// Column positions resolved from the header row
struct Columns {
    region: usize,
    year: usize,
    annual: usize,
    months: [Option<usize>; 12],
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, DataLoadError> {
        let find = |aliases: &[&str]| {
            header
                .iter()
                .position(|name| aliases.iter().any(|a| name.trim().eq_ignore_ascii_case(a)))
        };

        let region = find(REGION_COLUMNS).ok_or(DataLoadError::MissingColumn {
            column: "SUBDIVISION",
        })?;
        let year = find(YEAR_COLUMNS).ok_or(DataLoadError::MissingColumn { column: "YEAR" })?;
        let annual =
            find(ANNUAL_COLUMNS).ok_or(DataLoadError::MissingColumn { column: "ANNUAL" })?;

        let mut months = [None; 12];
        for (slot, month) in months.iter_mut().zip(MONTHS) {
            *slot = find(&[month][..]);
        }

        Ok(Columns {
            region,
            year,
            annual,
            months,
        })
    }
}

/// Parse a year cell. Accepts "1901" as well as "1901.0".
fn parse_year(cell: Option<&str>) -> Option<i32> {
    let cell = cell?.trim();
    if let Ok(year) = cell.parse::<i32>() {
        return Some(year);
    }
    let value = cell.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

/// Parse a rainfall cell; blanks, "NA" and non-finite numbers are missing
fn parse_rainfall(cell: Option<&str>) -> Option<f64> {
    cell?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl Dataset {
    /// Load the table from a CSV file on disk
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let file = File::open(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            records = dataset.records.len(),
            regions = dataset.regions.len(),
            "loaded rainfall table"
        );
        Ok(dataset)
    }

    /// Load the table from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataLoadError> {
        let mut reader = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
        let columns = Columns::from_header(reader.headers()?)?;

        let mut report = LoadReport::default();
        let mut records = Vec::new();
        let mut regions: Vec<RegionName> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for row in reader.records() {
            let row = row?;
            report.rows_read += 1;

            // Raw label is kept as-is; it is the grouping key.
            let region = row.get(columns.region).unwrap_or_default();
            if region.trim().is_empty() {
                report.rows_skipped += 1;
                continue;
            }

            let year = parse_year(row.get(columns.year));
            if year.is_none() {
                report.missing_years += 1;
            }
            let annual_mm = parse_rainfall(row.get(columns.annual));
            if annual_mm.is_none() {
                report.missing_annual += 1;
            }

            let mut monthly_mm = [None; 12];
            for (value, column) in monthly_mm.iter_mut().zip(columns.months) {
                *value = column.and_then(|idx| parse_rainfall(row.get(idx)));
            }

            if seen.insert(region.to_string()) {
                regions.push(RegionName {
                    raw: region.to_string(),
                    normalized: normalize(region),
                });
            }

            records.push(RainfallRecord {
                region: region.to_string(),
                year,
                monthly_mm,
                annual_mm,
            });
        }

        if records.is_empty() {
            return Err(DataLoadError::Empty);
        }

        if report.rows_skipped > 0 {
            warn!(rows = report.rows_skipped, "skipped rows without a region name");
        }
        if report.missing_years > 0 || report.missing_annual > 0 {
            warn!(
                missing_years = report.missing_years,
                missing_annual = report.missing_annual,
                "some cells could not be parsed and are treated as missing"
            );
        }
        debug!(?report, "rainfall table parsed");

        Ok(Dataset {
            records,
            regions,
            report,
        })
    }

    /// All records in source order
    pub fn records(&self) -> &[RainfallRecord] {
        &self.records
    }

    pub(crate) fn regions(&self) -> &[RegionName] {
        &self.regions
    }

    /// Distinct raw region labels in first-seen order
    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.raw.as_str())
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Distinct non-missing years, ascending
    pub fn available_years(&self) -> Vec<i32> {
        self.records
            .iter()
            .filter_map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records whose raw region label is one of `region_names`
    pub fn records_for<S: AsRef<str>>(&self, region_names: &[S]) -> Vec<&RainfallRecord> {
        let wanted: HashSet<&str> = region_names.iter().map(AsRef::as_ref).collect();
        self.records
            .iter()
            .filter(|r| wanted.contains(r.region.as_str()))
            .collect()
    }
}
