// Declared destination schemas.
//
// Each table gets an explicit, versioned definition instead of a shape
// inferred from whatever rows happen to arrive. The loader validates
// normalized records against these before writing.

use crate::ranking::RankingEntry;
use crate::tournament::TournamentRecord;
use std::fmt;

// ============================================================================
// TABLE SCHEMAS
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ddl: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub version: u32,
    pub columns: &'static [ColumnDef],
    pub constraints: &'static [&'static str],
}

impl TableSchema {
    pub fn create_ddl(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.ddl))
            .collect();
        parts.extend(self.constraints.iter().map(|c| c.to_string()));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.name,
            parts.join(",\n    ")
        )
    }

    pub fn drop_ddl(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    pub fn truncate_ddl(&self) -> String {
        format!("DELETE FROM {}", self.name)
    }
}

pub const RANKING_DATE: TableSchema = TableSchema {
    name: "ranking_date",
    version: 1,
    columns: &[
        ColumnDef { name: "id", ddl: "INTEGER PRIMARY KEY AUTOINCREMENT" },
        ColumnDef { name: "date", ddl: "TEXT UNIQUE NOT NULL" },
    ],
    constraints: &[],
};

pub const RANKING: TableSchema = TableSchema {
    name: "ranking",
    version: 1,
    columns: &[
        ColumnDef { name: "id", ddl: "INTEGER PRIMARY KEY AUTOINCREMENT" },
        ColumnDef { name: "rank", ddl: "INTEGER NOT NULL" },
        ColumnDef { name: "points", ddl: "INTEGER NOT NULL" },
        ColumnDef { name: "player_id", ddl: "TEXT NOT NULL" },
        ColumnDef { name: "ranking_date_id", ddl: "INTEGER NOT NULL REFERENCES ranking_date(id)" },
    ],
    constraints: &["UNIQUE(ranking_date_id, player_id)"],
};

pub const RANKING_TABLE: TableSchema = TableSchema {
    name: "ranking_table",
    version: 1,
    columns: &[
        ColumnDef { name: "id", ddl: "INTEGER PRIMARY KEY" },
        ColumnDef { name: "year", ddl: "TEXT NOT NULL" },
        ColumnDef { name: "tournament", ddl: "TEXT NOT NULL" },
        ColumnDef { name: "start_date", ddl: "TEXT" },
        ColumnDef { name: "prize_money", ddl: "TEXT" },
        ColumnDef { name: "atp_category", ddl: "TEXT" },
        ColumnDef { name: "tourney_id", ddl: "TEXT" },
    ],
    constraints: &[],
};

// ============================================================================
// RECORD VALIDATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub table: &'static str,
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.table, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

fn push_error(
    errors: &mut Vec<ValidationError>,
    table: &'static str,
    field: &'static str,
    message: String,
) {
    errors.push(ValidationError { table, field, message });
}

/// Validate a ranking entry against the `ranking` schema.
///
/// rank 0 is allowed on purpose: it is the documented fallback for an
/// unparseable source rank.
pub fn validate_ranking_entry(entry: &RankingEntry) -> ValidationResult {
    let mut errors = Vec::new();

    if entry.player_id.trim().is_empty() {
        push_error(&mut errors, RANKING.name, "player_id", "must not be empty".to_string());
    }
    if entry.rank < 0 {
        push_error(&mut errors, RANKING.name, "rank", format!("must be >= 0, got {}", entry.rank));
    }
    if entry.points < 0 {
        push_error(&mut errors, RANKING.name, "points", format!("must be >= 0, got {}", entry.points));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a reconciled tournament record against the `ranking_table` schema.
pub fn validate_tournament_record(record: &TournamentRecord) -> ValidationResult {
    let mut errors = Vec::new();

    if record.id < 1 {
        push_error(&mut errors, RANKING_TABLE.name, "id", format!("must be >= 1, got {}", record.id));
    }
    if record.year.len() != 4 || !record.year.chars().all(|c| c.is_ascii_digit()) {
        push_error(
            &mut errors,
            RANKING_TABLE.name,
            "year",
            format!("must be a 4-digit year, got '{}'", record.year),
        );
    }
    if !record.start_date.is_empty()
        && chrono::NaiveDate::parse_from_str(&record.start_date, "%Y-%m-%d").is_err()
    {
        push_error(
            &mut errors,
            RANKING_TABLE.name,
            "start_date",
            format!("must be empty or YYYY-MM-DD, got '{}'", record.start_date),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
