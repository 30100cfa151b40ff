// Run summary - explicit per-row outcomes, aggregated.
//
// Recoverable per-row problems never raise; they land in these counters so a
// run can report exactly what it skipped and why.

use serde::Serialize;
use std::fmt;

/// Counters for one ranking-import run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RankingSummary {
    pub files_processed: usize,
    /// Files skipped whole: missing a required column or structurally broken.
    pub files_skipped: usize,
    pub rows_read: usize,
    /// Rows skipped because they failed CSV deserialization.
    pub rows_unparsed: usize,
    /// Distinct snapshot dates loaded across the whole run.
    pub dates_imported: usize,
    /// Rows dropped because their date field did not parse.
    pub malformed_dates: usize,
    /// Rows cut by the top-N truncation.
    pub rows_truncated: usize,
    /// Rows dropped because their (date, player) pair was already emitted.
    pub duplicate_players: usize,
    pub synthetic_ids_minted: usize,
    pub rows_emitted: usize,
    pub rows_inserted: usize,
    /// Rows the store ignored on natural-key conflict (prior run or file).
    pub rows_conflict_ignored: usize,
}

impl fmt::Display for RankingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ranking import summary")?;
        writeln!(f, "  files processed:    {}", self.files_processed)?;
        writeln!(f, "  files skipped:      {}", self.files_skipped)?;
        writeln!(f, "  rows read:          {}", self.rows_read)?;
        writeln!(f, "  rows unparsed:      {}", self.rows_unparsed)?;
        writeln!(f, "  dates imported:     {}", self.dates_imported)?;
        writeln!(f, "  malformed dates:    {}", self.malformed_dates)?;
        writeln!(f, "  rows truncated:     {}", self.rows_truncated)?;
        writeln!(f, "  duplicate players:  {}", self.duplicate_players)?;
        writeln!(f, "  synthetic ids:      {}", self.synthetic_ids_minted)?;
        writeln!(f, "  rows emitted:       {}", self.rows_emitted)?;
        writeln!(f, "  rows inserted:      {}", self.rows_inserted)?;
        write!(f, "  conflicts ignored:  {}", self.rows_conflict_ignored)
    }
}

/// Counters for one tournament-reconciliation run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct TournamentSummary {
    pub sheets_processed: usize,
    /// Sheets skipped whole: unreadable, empty, or missing a target column.
    pub sheets_skipped: usize,
    pub rows_in: usize,
    pub rows_out: usize,
    /// Rows dropped because every target field was blank.
    pub empty_rows_dropped: usize,
    /// Sheet dates that did not parse (row kept, date left empty).
    pub unparsed_dates: usize,
    /// Candidates that found a match-history representative.
    pub matched: usize,
    pub unmatched: usize,
    pub rows_loaded: usize,
}

impl fmt::Display for TournamentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tournament reconciliation summary")?;
        writeln!(f, "  sheets processed:   {}", self.sheets_processed)?;
        writeln!(f, "  sheets skipped:     {}", self.sheets_skipped)?;
        writeln!(f, "  rows in:            {}", self.rows_in)?;
        writeln!(f, "  rows out:           {}", self.rows_out)?;
        writeln!(f, "  empty rows dropped: {}", self.empty_rows_dropped)?;
        writeln!(f, "  unparsed dates:     {}", self.unparsed_dates)?;
        writeln!(f, "  matched:            {}", self.matched)?;
        writeln!(f, "  unmatched:          {}", self.unmatched)?;
        write!(f, "  rows loaded:        {}", self.rows_loaded)
    }
}

/// Combined summary for a whole run, serializable for automation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking: Option<RankingSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament: Option<TournamentSummary>,
}

impl RunSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
