// Pipeline drivers - wire sources through the engines into the loader.
//
// Two runs: rankings (cumulative, conflict-ignore) and tournaments
// (reconcile against match history, then replace the table). Each is
// sequential per source file; fatal errors abort, per-row problems count.

use crate::config::ImportConfig;
use crate::db::{self, LoadStrategy};
use crate::error::{ImportError, ImportResult};
use crate::ranking::RankingAggregator;
use crate::reconcile::{self, MatchHistoryIndex};
use crate::report::{RankingSummary, TournamentSummary};
use crate::source;
use crate::tournament::{self, TournamentRecord};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::BTreeSet;

/// Import every ranking CSV in the configured directory.
///
/// One aggregator for the whole run: the synthetic-id counter spans files.
/// A file missing a required column (or structurally broken CSV) is skipped
/// whole and counted, like a sheet on the tournament side; the run only
/// fails when nothing loadable remains.
pub fn run_rankings(config: &ImportConfig) -> ImportResult<RankingSummary> {
    let files = source::list_ranking_files(&config.rankings_dir)?;
    if files.is_empty() {
        return Err(ImportError::NoData {
            context: format!("ranking files in {}", config.rankings_dir.display()),
        });
    }

    let mut conn = db::open_database(&config.db_path)?;
    let mut aggregator = RankingAggregator::new(config.top_n);
    let mut summary = RankingSummary::default();
    let mut seen_dates: BTreeSet<NaiveDate> = BTreeSet::new();

    let total = files.len();
    for (i, path) in files.iter().enumerate() {
        info!("ranking file {}/{}: {}", i + 1, total, path.display());
        let rows = match source::read_ranking_file(path, &mut summary) {
            Ok(rows) => rows,
            Err(e @ ImportError::SchemaMismatch { .. }) | Err(e @ ImportError::Csv(_)) => {
                warn!("skipping ranking file {}: {e}", path.display());
                summary.files_skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        let batch = aggregator.aggregate(&rows, &mut summary);
        seen_dates.extend(batch.dates.iter().copied());
        db::load_ranking_batch(&mut conn, &batch, &mut summary)?;
        summary.files_processed += 1;
    }

    summary.dates_imported = seen_dates.len();
    if summary.rows_emitted == 0 {
        return Err(ImportError::NoData {
            context: "ranking rows after normalization".to_string(),
        });
    }
    Ok(summary)
}

/// Collect tournament candidates from every in-range year sheet.
///
/// A sheet that is unreadable, empty, or missing a target column is skipped
/// whole and counted; the run only fails when nothing remains.
fn collect_candidates(
    config: &ImportConfig,
    summary: &mut TournamentSummary,
) -> ImportResult<Vec<TournamentRecord>> {
    let sheets = source::list_year_sheets(&config.sheets_dir, config)?;

    let mut candidates = Vec::new();
    for (year, path) in &sheets {
        let rows = match source::read_year_sheet(path, year) {
            Ok(rows) => rows,
            Err(e @ ImportError::SchemaMismatch { .. })
            | Err(e @ ImportError::SourceRead { .. })
            | Err(e @ ImportError::Csv(_)) => {
                warn!("skipping sheet {year}: {e}");
                summary.sheets_skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let mut sheet_candidates = tournament::candidates_from_sheet(year, &rows, summary);
        if sheet_candidates.is_empty() {
            warn!("sheet {year}: no usable rows after cleanup");
            summary.sheets_skipped += 1;
            continue;
        }
        info!("sheet {year}: {} rows collected", sheet_candidates.len());
        summary.sheets_processed += 1;
        candidates.append(&mut sheet_candidates);
    }

    if candidates.is_empty() {
        return Err(ImportError::NoData {
            context: format!("year sheets in {}", config.sheets_dir.display()),
        });
    }
    Ok(candidates)
}

/// Reconcile year-sheet tournaments against match history and load them.
pub fn run_tournaments(config: &ImportConfig) -> ImportResult<TournamentSummary> {
    let mut summary = TournamentSummary::default();

    let candidates = collect_candidates(config, &mut summary)?;
    let matches = source::read_match_history(&config.matches_file)?;
    let index = MatchHistoryIndex::build(&matches);
    let records = reconcile::reconcile(candidates, &index, &mut summary);

    tournament::write_collection_csv(&config.collection_out, &records)?;
    info!(
        "wrote {} reconciled rows to {}",
        records.len(),
        config.collection_out.display()
    );

    let mut conn = db::open_database(&config.db_path)?;
    db::load_tournaments(&mut conn, &records, LoadStrategy::Replace, &mut summary)?;
    Ok(summary)
}
