// Immutable run configuration.
//
// Every component takes what it needs from this struct at construction;
// nothing reads connection parameters or paths from globals.

use std::path::PathBuf;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Destination SQLite database.
    pub db_path: PathBuf,

    /// Directory of per-date ranking CSV files.
    pub rankings_dir: PathBuf,

    /// Directory of year-sheet CSVs (one per sheet, stem = 4-digit year).
    pub sheets_dir: PathBuf,

    /// Match-history CSV (`year`, `tournament`, `tourney_date`, `tourney_id`).
    pub matches_file: PathBuf,

    /// Reconciled tournament set is also exported here as CSV.
    pub collection_out: PathBuf,

    /// Inclusive year range for sheet selection.
    pub year_min: u16,
    pub year_max: u16,

    /// Leaderboard cutoff per snapshot date.
    pub top_n: usize,
}

impl ImportConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base: PathBuf = base_dir.into();
        ImportConfig {
            db_path: base.join("tennis.db"),
            rankings_dir: base.join("rankings"),
            sheets_dir: base.join("sheets"),
            matches_file: base.join("allmatches.csv"),
            collection_out: base.join("collection.csv"),
            year_min: 1973,
            year_max: 1989,
            top_n: 200,
        }
    }

    pub fn with_year_range(mut self, min: u16, max: u16) -> Self {
        self.year_min = min;
        self.year_max = max;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// True if a sheet label denotes a year inside the configured range.
    pub fn year_in_range(&self, label: &str) -> bool {
        label.len() == 4
            && label.chars().all(|c| c.is_ascii_digit())
            && label
                .parse::<u16>()
                .map(|y| y >= self.year_min && y <= self.year_max)
                .unwrap_or(false)
    }
}
