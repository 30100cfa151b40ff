// Tournament-Match Reconciler.
//
// Match history is authoritative for chronology: when it knows a tournament,
// its earliest match date replaces whatever the sheet said. The join is a
// left join on (year, tournament) - it never drops or duplicates candidates.

use crate::normalize::{clean_text, parse_compact_date};
use crate::report::TournamentSummary;
use crate::source::RawMatchRow;
use crate::tournament::TournamentRecord;
use chrono::NaiveDate;
use log::info;
use std::collections::HashMap;

// ============================================================================
// MATCH HISTORY INDEX
// ============================================================================

/// Representative match row for one (year, tournament) key.
///
/// `date` is None only when every match row for the key had an unparseable
/// date; the id still counts as known in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRepresentative {
    pub date: Option<NaiveDate>,
    pub tourney_id: String,
}

/// Read-only view of the match table keyed by (year, tournament), built once
/// per run and never persisted.
#[derive(Debug, Default)]
pub struct MatchHistoryIndex {
    by_key: HashMap<(String, String), MatchRepresentative>,
}

impl MatchHistoryIndex {
    /// Build the index: within each (year, tournament) group, the row with
    /// the chronologically earliest match date wins. A dated row always
    /// beats an undated one; equal dates keep the first row encountered.
    pub fn build(rows: &[RawMatchRow]) -> Self {
        let mut by_key: HashMap<(String, String), MatchRepresentative> = HashMap::new();

        for row in rows {
            let key = (row.year.trim().to_string(), clean_text(&row.tournament));
            let date = parse_compact_date(&row.tourney_date);
            let candidate = MatchRepresentative {
                date,
                tourney_id: row.tourney_id.trim().to_string(),
            };

            match by_key.get(&key) {
                None => {
                    by_key.insert(key, candidate);
                }
                Some(current) => {
                    let replace = match (current.date, candidate.date) {
                        (None, Some(_)) => true,
                        (Some(old), Some(new)) => new < old,
                        _ => false,
                    };
                    if replace {
                        by_key.insert(key, candidate);
                    }
                }
            }
        }

        info!("match-history index holds {} tournament keys", by_key.len());
        MatchHistoryIndex { by_key }
    }

    pub fn get(&self, year: &str, tournament: &str) -> Option<&MatchRepresentative> {
        self.by_key
            .get(&(year.trim().to_string(), clean_text(tournament)))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

// ============================================================================
// RECONCILER
// ============================================================================

/// Left-join candidates against the index and re-sequence ids.
///
/// - Matched candidate: tourney_id filled from the representative; its date,
///   when present, overrides the sheet date even if the sheet had one.
/// - Unmatched candidate: unchanged apart from the (still empty) tourney_id.
/// - Output order is input order; ids become a dense 1..K sequence.
/// - Output cardinality always equals input cardinality.
pub fn reconcile(
    mut candidates: Vec<TournamentRecord>,
    index: &MatchHistoryIndex,
    summary: &mut TournamentSummary,
) -> Vec<TournamentRecord> {
    for (i, record) in candidates.iter_mut().enumerate() {
        match index.get(&record.year, &record.tournament) {
            Some(rep) => {
                summary.matched += 1;
                record.tourney_id = rep.tourney_id.clone();
                if let Some(date) = rep.date {
                    record.start_date = date.format("%Y-%m-%d").to_string();
                }
            }
            None => {
                summary.unmatched += 1;
            }
        }
        record.id = (i + 1) as i64;
    }

    summary.rows_out += candidates.len();
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_row(year: &str, tournament: &str, date: &str, id: &str) -> RawMatchRow {
        RawMatchRow {
            year: year.to_string(),
            tournament: tournament.to_string(),
            tourney_date: date.to_string(),
            tourney_id: id.to_string(),
        }
    }

    fn candidate(year: &str, tournament: &str, start_date: &str) -> TournamentRecord {
        TournamentRecord {
            id: 0,
            year: year.to_string(),
            tournament: tournament.to_string(),
            start_date: start_date.to_string(),
            prize_money: String::new(),
            atp_category: String::new(),
            tourney_id: String::new(),
        }
    }

    #[test]
    fn test_index_picks_earliest_match() {
        let rows = vec![
            match_row("1975", "Wimbledon", "19750625", "W75-late"),
            match_row("1975", "Wimbledon", "19750623", "W75"),
            match_row("1975", "Wimbledon", "19750624", "W75-mid"),
        ];
        let index = MatchHistoryIndex::build(&rows);

        let rep = index.get("1975", "Wimbledon").unwrap();
        assert_eq!(rep.date, NaiveDate::from_ymd_opt(1975, 6, 23));
        assert_eq!(rep.tourney_id, "W75");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_index_dated_row_beats_undated() {
        let rows = vec![
            match_row("1975", "Hamburg", "notadate", "H75-bad"),
            match_row("1975", "Hamburg", "19750505", "H75"),
        ];
        let index = MatchHistoryIndex::build(&rows);
        let rep = index.get("1975", "Hamburg").unwrap();
        assert_eq!(rep.tourney_id, "H75");
        assert!(rep.date.is_some());
    }

    #[test]
    fn test_index_all_undated_still_yields_id() {
        let rows = vec![match_row("1975", "Hamburg", "bad", "H75")];
        let index = MatchHistoryIndex::build(&rows);
        let rep = index.get("1975", "Hamburg").unwrap();
        assert_eq!(rep.date, None);
        assert_eq!(rep.tourney_id, "H75");
    }

    #[test]
    fn test_index_key_normalization() {
        let rows = vec![match_row("1975", "US\u{00a0}Open ", "19750825", "U75")];
        let index = MatchHistoryIndex::build(&rows);
        assert!(index.get("1975", "US Open").is_some());
        assert!(index.get("1976", "US Open").is_none());
    }

    #[test]
    fn test_match_history_date_overrides_sheet_date() {
        let index = MatchHistoryIndex::build(&[match_row("1975", "Wimbledon", "19750623", "W75")]);
        let mut summary = TournamentSummary::default();

        // Sheet has its own date; the match-history date must win.
        let out = reconcile(
            vec![candidate("1975", "Wimbledon", "1975-06-20")],
            &index,
            &mut summary,
        );

        assert_eq!(out[0].start_date, "1975-06-23");
        assert_eq!(out[0].tourney_id, "W75");
        assert_eq!(summary.matched, 1);
    }

    #[test]
    fn test_unmatched_candidate_unchanged_except_empty_tourney_id() {
        let index = MatchHistoryIndex::build(&[]);
        let mut summary = TournamentSummary::default();

        let out = reconcile(
            vec![candidate("1975", "Nowhere Open", "1975-02-01")],
            &index,
            &mut summary,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start_date, "1975-02-01");
        assert_eq!(out[0].tourney_id, "");
        assert_eq!(summary.unmatched, 1);
    }

    #[test]
    fn test_undated_representative_keeps_sheet_date() {
        let index = MatchHistoryIndex::build(&[match_row("1975", "Hamburg", "bad", "H75")]);
        let mut summary = TournamentSummary::default();

        let out = reconcile(
            vec![candidate("1975", "Hamburg", "1975-05-01")],
            &index,
            &mut summary,
        );

        assert_eq!(out[0].start_date, "1975-05-01");
        assert_eq!(out[0].tourney_id, "H75");
    }

    #[test]
    fn test_reconcile_preserves_cardinality_and_densifies_ids() {
        let index = MatchHistoryIndex::build(&[match_row("1975", "Wimbledon", "19750623", "W75")]);
        let mut summary = TournamentSummary::default();

        let input = vec![
            candidate("1975", "Wimbledon", ""),
            candidate("1975", "Nowhere Open", ""),
            candidate("1976", "Wimbledon", ""), // different year: no match
        ];
        let out = reconcile(input, &index, &mut summary);

        assert_eq!(out.len(), 3);
        let ids: Vec<i64> = out.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        // Stable input order, not re-sorted.
        assert_eq!(out[1].tournament, "Nowhere Open");
        assert_eq!(summary.rows_out, 3);
    }
}
