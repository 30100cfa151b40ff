// Tournament candidates - year-sheet rows normalized into TournamentRecord.

use crate::error::{ImportError, ImportResult};
use crate::normalize::{clean_prize_money, clean_text, parse_sheet_date};
use crate::report::TournamentSummary;
use crate::source::RawSheetRow;
use serde::Serialize;
use std::path::Path;

/// One tournament-year record: the unit the reconciler and loader work with.
///
/// `start_date` is `YYYY-MM-DD` or empty; `tourney_id` is empty until the
/// reconciler fills it from match history. `id` is 0 on candidates and
/// becomes a dense 1..K sequence after reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentRecord {
    pub id: i64,
    pub year: String,
    pub tournament: String,
    pub start_date: String,
    pub prize_money: String,
    pub atp_category: String,
    pub tourney_id: String,
}

/// Normalize one sheet's rows into candidates.
///
/// Per-row policy: a row where every target field is blank after cleanup is
/// dropped and counted; a start date that does not parse stays empty and is
/// counted, the row survives.
pub fn candidates_from_sheet(
    year: &str,
    rows: &[RawSheetRow],
    summary: &mut TournamentSummary,
) -> Vec<TournamentRecord> {
    summary.rows_in += rows.len();

    let mut candidates = Vec::new();
    for row in rows {
        let tournament = clean_text(&row.tournament);
        let raw_date = clean_text(&row.start_date);
        let prize_money = clean_prize_money(&row.prize_money);
        let atp_category = clean_text(&row.atp_category);

        if tournament.is_empty() && raw_date.is_empty() && prize_money.is_empty() && atp_category.is_empty() {
            summary.empty_rows_dropped += 1;
            continue;
        }

        let start_date = match parse_sheet_date(&raw_date) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => {
                if !raw_date.is_empty() {
                    summary.unparsed_dates += 1;
                }
                String::new()
            }
        };

        candidates.push(TournamentRecord {
            id: 0,
            year: year.to_string(),
            tournament,
            start_date,
            prize_money,
            atp_category,
            tourney_id: String::new(),
        });
    }
    candidates
}

/// Export the final reconciled set as `collection.csv`, same column order the
/// site consumes.
pub fn write_collection_csv(path: &Path, records: &[TournamentRecord]) -> ImportResult<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| ImportError::SourceRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    wtr.write_record([
        "id",
        "year",
        "tournament",
        "start_date",
        "prize_money",
        "atp_category",
        "tourney_id",
    ])?;
    for r in records {
        let id = r.id.to_string();
        wtr.write_record([
            id.as_str(),
            r.year.as_str(),
            r.tournament.as_str(),
            r.start_date.as_str(),
            r.prize_money.as_str(),
            r.atp_category.as_str(),
            r.tourney_id.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
