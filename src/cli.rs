//! Command-line interface argument parsing for rainfall-tui.
//!
//! - `rainfall-tui show --region "Maharashtra" --compare-with "Gujarat"`
//! - `rainfall-tui compare Maharashtra Gujarat --last-n 5`
//! - `rainfall-tui trend "Konkan & Goa" --start 2008 --end 2017 --json`

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// File name of the IMD sub-divisional rainfall table
pub const DATA_FILE_NAME: &str = "Sub_Division_IMD_2017.csv";

/// Environment variable overriding the dataset location
pub const DATA_ENV_VAR: &str = "RAINFALL_DATA";

/// Region-based rainfall queries over the IMD sub-divisional dataset.
#[derive(Parser, Debug)]
#[command(name = "rainfall-tui")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Defaults to `show` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to the rainfall CSV.
    /// Defaults to $RAINFALL_DATA, then ./data/Sub_Division_IMD_2017.csv
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Write logs to this file (the dashboard only logs when this is set)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Launch the interactive dashboard
    Show {
        /// Region pre-filled in the form
        #[arg(short, long)]
        region: Option<String>,

        /// Second region for comparison mode
        #[arg(short, long)]
        compare_with: Option<String>,

        /// Number of trailing years for comparison mode
        #[arg(short = 'n', long)]
        last_n: Option<usize>,

        /// First year of the trend / time series range
        #[arg(long)]
        start: Option<i32>,

        /// Last year of the trend / time series range
        #[arg(long)]
        end: Option<i32>,
    },

    /// Compare average annual rainfall of two regions over the last N years
    Compare {
        region_x: String,
        region_y: String,

        #[arg(short = 'n', long, default_value = "5")]
        last_n: usize,
    },

    /// Annual series of a region with its linear trend
    Trend {
        region: String,

        #[arg(long)]
        start: Option<i32>,

        #[arg(long)]
        end: Option<i32>,
    },

    /// Annual series of a region
    Series {
        region: String,

        #[arg(long)]
        start: Option<i32>,

        #[arg(long)]
        end: Option<i32>,
    },

    /// One-line average annual rainfall for a region
    Summary {
        region: String,

        /// First year of the averaging period
        #[arg(long, requires = "end")]
        start: Option<i32>,

        /// Last year of the averaging period
        #[arg(long, requires = "start")]
        end: Option<i32>,
    },

    /// List region names matching a query (all regions when omitted)
    Regions { query: Option<String> },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Initial values of the dashboard's query form
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefaults {
    pub region: String,
    pub compare_with: String,
    pub last_n: usize,
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for FormDefaults {
    fn default() -> Self {
        FormDefaults {
            region: "Maharashtra".to_string(),
            compare_with: "Gujarat".to_string(),
            last_n: 5,
            start_year: 2008,
            end_year: 2017,
        }
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub json: bool,
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
    pub form: FormDefaults,
}

impl AppConfig {
    /// Build the configuration shared by every subcommand
    pub fn from_global(global: GlobalArgs) -> Self {
        let data_path = global
            .data
            .or_else(|| std::env::var_os(DATA_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(default_data_path);

        AppConfig {
            data_path,
            json: global.json,
            verbose: global.verbose,
            log_file: global.log_file,
            form: FormDefaults::default(),
        }
    }

    /// Apply `show` overrides to the form defaults
    pub fn with_show_args(
        mut self,
        region: Option<String>,
        compare_with: Option<String>,
        last_n: Option<usize>,
        start: Option<i32>,
        end: Option<i32>,
    ) -> Self {
        if let Some(region) = region {
            self.form.region = region;
        }
        if let Some(other) = compare_with {
            self.form.compare_with = other;
        }
        if let Some(n) = last_n {
            self.form.last_n = n;
        }
        if let Some(start) = start {
            self.form.start_year = start;
        }
        if let Some(end) = end {
            self.form.end_year = end;
        }
        self
    }
}

/// `./data/<file>` when present, otherwise the platform data directory
fn default_data_path() -> PathBuf {
    let local = PathBuf::from("data").join(DATA_FILE_NAME);
    if local.exists() {
        return local;
    }
    dirs::data_dir()
        .map(|dir| dir.join("rainfall-tui").join(DATA_FILE_NAME))
        .unwrap_or(local)
}
