// Idempotent Loader - the pipeline's only writer.
//
// Owns no domain state: it takes finalized record sets and turns them into
// replayable bulk writes. Every load runs in one all-or-nothing transaction
// per destination table, so a failure midway leaves that table in its
// pre-run state.

use crate::error::{ImportError, ImportResult};
use crate::ranking::RankingBatch;
use crate::report::{RankingSummary, TournamentSummary};
use crate::schema::{self, TableSchema, RANKING, RANKING_DATE, RANKING_TABLE};
use crate::tournament::TournamentRecord;
use chrono::NaiveDate;
use log::info;
use rusqlite::{params, Connection, Transaction};
use std::collections::HashMap;
use std::path::Path;

// ============================================================================
// LOAD STRATEGIES
// ============================================================================

/// How a destination table is prepared before the bulk write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Drop and recreate. For tables with no cross-table dependents.
    Replace,

    /// Keep the schema (and anything holding foreign keys into it), clear
    /// the rows, bulk insert.
    TruncateReload,

    /// Create once if absent; inserts skip rows whose natural key already
    /// exists. For cumulative, cross-run data.
    CreateConflictIgnore,
}

fn prepare_table(tx: &Transaction, table: &TableSchema, strategy: LoadStrategy) -> ImportResult<()> {
    match strategy {
        LoadStrategy::Replace => {
            tx.execute(&table.drop_ddl(), [])?;
            tx.execute(&table.create_ddl(), [])?;
        }
        LoadStrategy::TruncateReload => {
            tx.execute(&table.create_ddl(), [])?;
            tx.execute(&table.truncate_ddl(), [])?;
        }
        LoadStrategy::CreateConflictIgnore => {
            tx.execute(&table.create_ddl(), [])?;
        }
    }
    Ok(())
}

// ============================================================================
// CONNECTION
// ============================================================================

pub fn open_database(path: &Path) -> ImportResult<Connection> {
    let conn = Connection::open(path)?;
    // WAL mode for crash recovery, FK enforcement for ranking -> ranking_date.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

// ============================================================================
// RANKING LOADS (cumulative, conflict-ignore)
// ============================================================================

/// Load one aggregated ranking batch.
///
/// `ranking_date` and `ranking` each get their own scoped transaction; both
/// use CreateConflictIgnore because ranking data accumulates across runs.
/// Re-running with the same input changes nothing (first writer wins on the
/// (date, player) natural key).
pub fn load_ranking_batch(
    conn: &mut Connection,
    batch: &RankingBatch,
    summary: &mut RankingSummary,
) -> ImportResult<()> {
    // Snapshot dates first, so entry inserts can resolve their foreign keys.
    {
        let tx = conn.transaction()?;
        prepare_table(&tx, &RANKING_DATE, LoadStrategy::CreateConflictIgnore)?;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO ranking_date (date) VALUES (?1)")?;
            for date in &batch.dates {
                stmt.execute(params![date.format("%Y-%m-%d").to_string()])?;
            }
        }
        tx.commit()?;
    }

    let date_ids = ranking_date_ids(conn, &batch.dates)?;

    let tx = conn.transaction()?;
    prepare_table(&tx, &RANKING, LoadStrategy::CreateConflictIgnore)?;
    let mut inserted = 0usize;
    let mut ignored = 0usize;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO ranking (rank, points, player_id, ranking_date_id)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for entry in &batch.entries {
            if let Err(errors) = schema::validate_ranking_entry(entry) {
                return Err(ImportError::Validation {
                    table: RANKING.name,
                    reason: errors[0].to_string(),
                });
            }
            let date_id = date_ids
                .get(&entry.snapshot_date)
                .copied()
                .ok_or_else(|| ImportError::Validation {
                    table: RANKING.name,
                    reason: format!("no ranking_date row for {}", entry.snapshot_date),
                })?;

            let changed = stmt.execute(params![entry.rank, entry.points, entry.player_id, date_id])?;
            if changed == 1 {
                inserted += 1;
            } else {
                ignored += 1;
            }
        }
    }
    tx.commit()?;

    summary.rows_inserted += inserted;
    summary.rows_conflict_ignored += ignored;
    info!(
        "loaded ranking batch: {} dates, {} inserted, {} conflict-ignored",
        batch.dates.len(),
        inserted,
        ignored
    );
    Ok(())
}

fn ranking_date_ids(
    conn: &Connection,
    dates: &[NaiveDate],
) -> ImportResult<HashMap<NaiveDate, i64>> {
    let mut ids = HashMap::with_capacity(dates.len());
    let mut stmt = conn.prepare("SELECT id FROM ranking_date WHERE date = ?1")?;
    for date in dates {
        let id: i64 = stmt.query_row(params![date.format("%Y-%m-%d").to_string()], |row| {
            row.get(0)
        })?;
        ids.insert(*date, id);
    }
    Ok(ids)
}

// ============================================================================
// TOURNAMENT LOAD
// ============================================================================

/// Load the reconciled tournament set into `ranking_table`.
///
/// Default wiring uses Replace (nothing references this table); the strategy
/// stays a parameter so callers that do grow dependents can switch to
/// TruncateReload without touching the write path.
pub fn load_tournaments(
    conn: &mut Connection,
    records: &[TournamentRecord],
    strategy: LoadStrategy,
    summary: &mut TournamentSummary,
) -> ImportResult<()> {
    let tx = conn.transaction()?;
    prepare_table(&tx, &RANKING_TABLE, strategy)?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO ranking_table
             (id, year, tournament, start_date, prize_money, atp_category, tourney_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for record in records {
            if let Err(errors) = schema::validate_tournament_record(record) {
                return Err(ImportError::Validation {
                    table: RANKING_TABLE.name,
                    reason: errors[0].to_string(),
                });
            }
            stmt.execute(params![
                record.id,
                record.year,
                record.tournament,
                record.start_date,
                record.prize_money,
                record.atp_category,
                record.tourney_id,
            ])?;
        }
    }
    tx.commit()?;

    summary.rows_loaded += records.len();
    info!("loaded {} tournament rows ({:?})", records.len(), strategy);
    Ok(())
}

// ============================================================================
// QUERIES
// ============================================================================

pub fn count_rows(conn: &Connection, table: &TableSchema) -> ImportResult<i64> {
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table.name), [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

/// Stored leaderboard for one snapshot date, ordered by rank.
pub fn rankings_for_date(
    conn: &Connection,
    date: NaiveDate,
) -> ImportResult<Vec<(i64, i64, String)>> {
    let mut stmt = conn.prepare(
        "SELECT r.rank, r.points, r.player_id
         FROM ranking r
         JOIN ranking_date d ON d.id = r.ranking_date_id
         WHERE d.date = ?1
         ORDER BY r.rank, r.id",
    )?;
    let rows = stmt
        .query_map(params![date.format("%Y-%m-%d").to_string()], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn all_tournaments(conn: &Connection) -> ImportResult<Vec<TournamentRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, year, tournament, start_date, prize_money, atp_category, tourney_id
         FROM ranking_table
         ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(TournamentRecord {
                id: row.get(0)?,
                year: row.get(1)?,
                tournament: row.get(2)?,
                start_date: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                prize_money: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                atp_category: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                tourney_id: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::RankingEntry;

    fn entry(date: (i32, u32, u32), rank: i64, points: i64, player: &str) -> RankingEntry {
        RankingEntry {
            snapshot_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            rank,
            points,
            player_id: player.to_string(),
        }
    }

    fn batch(entries: Vec<RankingEntry>) -> RankingBatch {
        let mut dates: Vec<NaiveDate> = entries.iter().map(|e| e.snapshot_date).collect();
        dates.sort();
        dates.dedup();
        RankingBatch { dates, entries }
    }

    fn record(id: i64, year: &str, tournament: &str) -> TournamentRecord {
        TournamentRecord {
            id,
            year: year.to_string(),
            tournament: tournament.to_string(),
            start_date: String::new(),
            prize_money: String::new(),
            atp_category: String::new(),
            tourney_id: String::new(),
        }
    }

    fn test_conn() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_ranking_load_idempotent() {
        let mut conn = test_conn();
        let mut summary = RankingSummary::default();

        let b = batch(vec![
            entry((2020, 1, 6), 1, 9895, "P001"),
            entry((2020, 1, 6), 2, 9000, "P002"),
        ]);

        load_ranking_batch(&mut conn, &b, &mut summary).unwrap();
        assert_eq!(summary.rows_inserted, 2);
        assert_eq!(summary.rows_conflict_ignored, 0);

        // Same input again: every row hits the natural-key conflict.
        load_ranking_batch(&mut conn, &b, &mut summary).unwrap();
        assert_eq!(summary.rows_inserted, 2);
        assert_eq!(summary.rows_conflict_ignored, 2);

        assert_eq!(count_rows(&conn, &RANKING).unwrap(), 2);
        assert_eq!(count_rows(&conn, &RANKING_DATE).unwrap(), 1);
    }

    #[test]
    fn test_ranking_first_writer_wins_across_batches() {
        let mut conn = test_conn();
        let mut summary = RankingSummary::default();

        let first = batch(vec![entry((2020, 1, 6), 1, 9895, "P001")]);
        let second = batch(vec![entry((2020, 1, 6), 2, 1, "P001")]);
        load_ranking_batch(&mut conn, &first, &mut summary).unwrap();
        load_ranking_batch(&mut conn, &second, &mut summary).unwrap();

        let rows = rankings_for_date(&conn, NaiveDate::from_ymd_opt(2020, 1, 6).unwrap()).unwrap();
        assert_eq!(rows, vec![(1, 9895, "P001".to_string())]);
    }

    #[test]
    fn test_ranking_dates_accumulate_across_runs() {
        let mut conn = test_conn();
        let mut summary = RankingSummary::default();

        load_ranking_batch(
            &mut conn,
            &batch(vec![entry((2020, 1, 6), 1, 100, "P1")]),
            &mut summary,
        )
        .unwrap();
        load_ranking_batch(
            &mut conn,
            &batch(vec![entry((2020, 1, 13), 1, 100, "P1")]),
            &mut summary,
        )
        .unwrap();

        assert_eq!(count_rows(&conn, &RANKING_DATE).unwrap(), 2);
        assert_eq!(count_rows(&conn, &RANKING).unwrap(), 2);
    }

    #[test]
    fn test_invalid_entry_rejected_before_write() {
        let mut conn = test_conn();
        let mut summary = RankingSummary::default();

        // Seed the tables with a good batch first, then attempt a bad one.
        let good = batch(vec![entry((2020, 1, 6), 1, 100, "P001")]);
        load_ranking_batch(&mut conn, &good, &mut summary).unwrap();

        let bad = batch(vec![
            entry((2020, 1, 13), 1, 100, "P001"),
            entry((2020, 1, 13), 2, -5, "P002"),
        ]);
        let err = load_ranking_batch(&mut conn, &bad, &mut summary).unwrap_err();
        assert!(matches!(err, ImportError::Validation { .. }));
        // The ranking transaction rolled back whole: not even the valid
        // first row of the bad batch was committed.
        assert_eq!(count_rows(&conn, &RANKING).unwrap(), 1);
    }

    #[test]
    fn test_tournament_replace_resets_table() {
        let mut conn = test_conn();
        let mut summary = TournamentSummary::default();

        load_tournaments(
            &mut conn,
            &[record(1, "1975", "Wimbledon"), record(2, "1975", "US Open")],
            LoadStrategy::Replace,
            &mut summary,
        )
        .unwrap();
        load_tournaments(
            &mut conn,
            &[record(1, "1976", "Wimbledon")],
            LoadStrategy::Replace,
            &mut summary,
        )
        .unwrap();

        let rows = all_tournaments(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, "1976");
    }

    #[test]
    fn test_tournament_truncate_reload_keeps_schema() {
        let mut conn = test_conn();
        let mut summary = TournamentSummary::default();

        load_tournaments(
            &mut conn,
            &[record(1, "1975", "Wimbledon")],
            LoadStrategy::TruncateReload,
            &mut summary,
        )
        .unwrap();
        load_tournaments(
            &mut conn,
            &[record(1, "1975", "Wimbledon")],
            LoadStrategy::TruncateReload,
            &mut summary,
        )
        .unwrap();

        // Idempotent: same input, same final row set.
        assert_eq!(count_rows(&conn, &RANKING_TABLE).unwrap(), 1);
    }

    #[test]
    fn test_tournament_conflict_ignore_accumulates() {
        let mut conn = test_conn();
        let mut summary = TournamentSummary::default();

        load_tournaments(
            &mut conn,
            &[record(1, "1975", "Wimbledon")],
            LoadStrategy::CreateConflictIgnore,
            &mut summary,
        )
        .unwrap();
        load_tournaments(
            &mut conn,
            &[record(1, "1975", "Wimbledon"), record(2, "1975", "US Open")],
            LoadStrategy::CreateConflictIgnore,
            &mut summary,
        )
        .unwrap();

        assert_eq!(count_rows(&conn, &RANKING_TABLE).unwrap(), 2);
    }

    #[test]
    fn test_failed_load_leaves_pre_run_state() {
        let mut conn = test_conn();
        let mut summary = TournamentSummary::default();

        load_tournaments(
            &mut conn,
            &[record(1, "1975", "Wimbledon")],
            LoadStrategy::Replace,
            &mut summary,
        )
        .unwrap();

        // Second record is invalid (id 0), so the whole load must fail and
        // the table must keep its pre-run content despite the Replace.
        let bad = vec![record(1, "1976", "Wimbledon"), record(0, "1976", "US Open")];
        let err = load_tournaments(&mut conn, &bad, LoadStrategy::Replace, &mut summary).unwrap_err();
        assert!(matches!(err, ImportError::Validation { .. }));
        assert_eq!(err.exit_code(), 1);

        let rows = all_tournaments(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, "1975");
    }
}
