// Ranking Aggregator - per-date leaderboards out of raw ranking rows.
//
// Owns RankingSnapshotDate / RankingEntry creation for a run. One aggregator
// instance lives for the whole run so the synthetic-id counter is never
// reset between files.

use crate::normalize::{parse_compact_date, safe_int};
use crate::report::RankingSummary;
use crate::source::RawRankingRow;
use chrono::NaiveDate;
use log::warn;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// SYNTHETIC IDS
// ============================================================================

/// Process-wide counter for placeholder player ids.
///
/// Ids are minted as fixed-width `TEMP0001`, `TEMP0002`, ... monotonically
/// across every file in the run, so a placeholder is unique run-wide.
#[derive(Debug)]
pub struct SyntheticIdCounter {
    next: u64,
}

impl SyntheticIdCounter {
    pub fn new() -> Self {
        SyntheticIdCounter { next: 1 }
    }

    pub fn mint(&mut self) -> String {
        let id = format!("TEMP{:04}", self.next);
        self.next += 1;
        id
    }

    /// How many ids have been handed out so far.
    pub fn minted(&self) -> u64 {
        self.next - 1
    }
}

impl Default for SyntheticIdCounter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// RANKING ENTRIES
// ============================================================================

/// One upsert tuple for the `ranking` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub snapshot_date: NaiveDate,
    pub rank: i64,
    pub points: i64,
    pub player_id: String,
}

/// Aggregated output for one batch of raw rows: the snapshot dates seen and
/// the retained entries, in (date, rank-order) emission order.
#[derive(Debug, Default)]
pub struct RankingBatch {
    pub dates: Vec<NaiveDate>,
    pub entries: Vec<RankingEntry>,
}

// ============================================================================
// AGGREGATOR
// ============================================================================

pub struct RankingAggregator {
    top_n: usize,
    counter: SyntheticIdCounter,
}

impl RankingAggregator {
    pub fn new(top_n: usize) -> Self {
        RankingAggregator {
            top_n,
            counter: SyntheticIdCounter::new(),
        }
    }

    /// Aggregate one batch of raw rows (usually one file) into per-date
    /// leaderboards.
    ///
    /// Guarantees on the output: at most `top_n` entries per date, no two
    /// entries of a date share a player id, dates ascend.
    ///
    /// Known quirk, kept deliberately: a row whose rank does not parse gets
    /// rank 0 and therefore sorts ahead of every real rank in the top-N cut.
    /// See `test_unparseable_rank_sorts_first`.
    pub fn aggregate(
        &mut self,
        rows: &[RawRankingRow],
        summary: &mut RankingSummary,
    ) -> RankingBatch {
        summary.rows_read += rows.len();

        // Partition by normalized snapshot date. Rows whose date does not
        // parse are dropped and counted, never fatal.
        let mut by_date: BTreeMap<NaiveDate, Vec<&RawRankingRow>> = BTreeMap::new();
        for row in rows {
            match parse_compact_date(&row.date) {
                Some(date) => by_date.entry(date).or_default().push(row),
                None => {
                    warn!("dropping row with malformed date '{}'", row.date);
                    summary.malformed_dates += 1;
                }
            }
        }

        let mut batch = RankingBatch::default();
        for (date, mut partition) in by_date {
            // Stable sort: ties keep source order.
            partition.sort_by_key(|row| safe_int(&row.rank, 0));
            if partition.len() > self.top_n {
                summary.rows_truncated += partition.len() - self.top_n;
                partition.truncate(self.top_n);
            }

            let mut seen_players: HashSet<String> = HashSet::new();
            for row in partition {
                let player_id = {
                    let supplied = row.id.trim();
                    if supplied.is_empty() {
                        summary.synthetic_ids_minted += 1;
                        self.counter.mint()
                    } else {
                        supplied.to_string()
                    }
                };

                // First writer wins within the date.
                if !seen_players.insert(player_id.clone()) {
                    summary.duplicate_players += 1;
                    continue;
                }

                batch.entries.push(RankingEntry {
                    snapshot_date: date,
                    rank: safe_int(&row.rank, 0),
                    points: safe_int(&row.points, 0),
                    player_id,
                });
            }

            batch.dates.push(date);
        }

        summary.rows_emitted += batch.entries.len();
        batch
    }

    pub fn synthetic_ids_minted(&self) -> u64 {
        self.counter.minted()
    }
}
