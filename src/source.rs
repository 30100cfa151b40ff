// Row sources - CSV readers for the three source shapes.
//
// This is the read side only: rows come out as raw strings, untyped.
// Normalization and aggregation happen downstream.

use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};
use crate::normalize::normalize_header;
use crate::report::RankingSummary;
use log::{debug, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ============================================================================
// RANKING FILES
// ============================================================================

/// One row of a per-date ranking CSV, as found on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRankingRow {
    pub date: String,
    pub rank: String,
    pub points: String,
    /// Player identifier; some historical rows have none.
    #[serde(default)]
    pub id: String,
}

/// All `*.csv` files in the rankings directory, sorted by name so that runs
/// are deterministic and synthetic ids are minted in a stable order.
pub fn list_ranking_files(dir: &Path) -> ImportResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| ImportError::SourceRead {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Columns a ranking file must carry (`id` is optional).
pub const RANKING_COLUMNS: [&str; 3] = ["date", "rank", "points"];

/// Read one ranking file.
///
/// A file missing a required column is unusable as a whole and comes back as
/// SchemaMismatch so the caller can skip it and keep going. An individual
/// row that fails to parse is skipped and counted, never fatal.
pub fn read_ranking_file(
    path: &Path,
    summary: &mut RankingSummary,
) -> ImportResult<Vec<RawRankingRow>> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| ImportError::SourceRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let missing: Vec<String> = RANKING_COLUMNS
        .iter()
        .filter(|wanted| !headers.iter().any(|h| h.as_str() == **wanted))
        .map(|wanted| (*wanted).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::SchemaMismatch {
            source_name: path.display().to_string(),
            missing,
        });
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("{}: skipping unparseable row: {e}", path.display());
                summary.rows_unparsed += 1;
            }
        }
    }
    debug!("read {} ranking rows from {}", rows.len(), path.display());
    Ok(rows)
}

// ============================================================================
// YEAR SHEETS
// ============================================================================

/// Header labels a year sheet must carry (matched after normalization).
pub const SHEET_COLUMNS: [&str; 4] = ["TOURNAMENT", "START DATE", "PRIZE MONEY", "ATP CATEGORY"];

/// One row of a year sheet, fields still raw.
#[derive(Debug, Clone)]
pub struct RawSheetRow {
    pub tournament: String,
    pub start_date: String,
    pub prize_money: String,
    pub atp_category: String,
}

/// Year sheets in the sheets directory: CSV files whose stem is a 4-digit
/// year inside the configured range, sorted by year. Other files (cover
/// sheets, totals) are ignored.
pub fn list_year_sheets(dir: &Path, config: &ImportConfig) -> ImportResult<Vec<(String, PathBuf)>> {
    let mut sheets = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| ImportError::SourceRead {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(s) => s.to_string(),
            None => continue,
        };
        if config.year_in_range(&stem) {
            sheets.push((stem, path));
        } else {
            debug!("skipping non-year sheet {}", path.display());
        }
    }
    sheets.sort();
    Ok(sheets)
}

/// Find the index of a wanted column in a normalized header row.
///
/// Exact match first, then a space-stripped comparison so that
/// "STARTDATE" or "START  DATE" still resolve.
fn find_column(headers: &[String], wanted: &str) -> Option<usize> {
    if let Some(idx) = headers.iter().position(|h| h == wanted) {
        return Some(idx);
    }
    let wanted_packed: String = wanted.chars().filter(|c| !c.is_whitespace()).collect();
    headers
        .iter()
        .position(|h| h.chars().filter(|c| !c.is_whitespace()).collect::<String>() == wanted_packed)
}

/// Read one year sheet.
///
/// A sheet missing any of the four target columns is unusable as a whole
/// (downstream joins assume they exist), so that is a SchemaMismatch for the
/// sheet, not a per-row problem.
pub fn read_year_sheet(path: &Path, sheet_label: &str) -> ImportResult<Vec<RawSheetRow>> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| ImportError::SourceRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut indices = [0usize; 4];
    let mut missing = Vec::new();
    for (slot, wanted) in SHEET_COLUMNS.iter().enumerate() {
        match find_column(&headers, wanted) {
            Some(idx) => indices[slot] = idx,
            None => missing.push((*wanted).to_string()),
        }
    }
    if !missing.is_empty() {
        warn!("sheet {} missing columns {:?}", sheet_label, missing);
        return Err(ImportError::SchemaMismatch {
            source_name: sheet_label.to_string(),
            missing,
        });
    }

    let field = |record: &csv::StringRecord, idx: usize| -> String {
        record.get(idx).unwrap_or("").to_string()
    };

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(RawSheetRow {
            tournament: field(&record, indices[0]),
            start_date: field(&record, indices[1]),
            prize_money: field(&record, indices[2]),
            atp_category: field(&record, indices[3]),
        });
    }
    Ok(rows)
}

// ============================================================================
// MATCH HISTORY
// ============================================================================

/// One row of the match-history table.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMatchRow {
    pub year: String,
    pub tournament: String,
    pub tourney_date: String,
    #[serde(default)]
    pub tourney_id: String,
}

pub fn read_match_history(path: &Path) -> ImportResult<Vec<RawMatchRow>> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| ImportError::SourceRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: RawMatchRow = result?;
        rows.push(row);
    }
    debug!("read {} match rows from {}", rows.len(), path.display());
    Ok(rows)
}
