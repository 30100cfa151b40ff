// TML Import - Core Library
// Reconciliation pipeline for tennis ranking and tournament data.

pub mod config;
pub mod error;
pub mod normalize;
pub mod source;
pub mod ranking;
pub mod tournament;
pub mod reconcile;
pub mod schema;
pub mod db;
pub mod report;
pub mod pipeline;

// Re-export commonly used types
pub use config::ImportConfig;
pub use error::{ImportError, ImportResult};
pub use ranking::{RankingAggregator, RankingBatch, RankingEntry, SyntheticIdCounter};
pub use reconcile::{reconcile, MatchHistoryIndex, MatchRepresentative};
pub use tournament::TournamentRecord;
pub use schema::{TableSchema, RANKING, RANKING_DATE, RANKING_TABLE};
pub use db::{load_ranking_batch, load_tournaments, open_database, LoadStrategy};
pub use report::{RankingSummary, RunSummary, TournamentSummary};
pub use pipeline::{run_rankings, run_tournaments};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
