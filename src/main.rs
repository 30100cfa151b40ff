// tml-import: load TML ranking and tournament data into SQLite.
//
// Usage:
//   tml-import rankings    --data-dir ./data
//   tml-import tournaments --data-dir ./data --year-min 1973 --year-max 1989
//   tml-import all         --data-dir ./data --summary-json

use log::error;
use std::env;
use std::process::ExitCode;

use tml_import::{run_rankings, run_tournaments, ImportConfig, ImportError, RunSummary};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = match args.get(1).map(String::as_str) {
        Some(c @ ("rankings" | "tournaments" | "all")) => c.to_string(),
        _ => {
            eprintln!("usage: tml-import <rankings|tournaments|all> [options]");
            eprintln!("options:");
            eprintln!("  --data-dir <dir>   base data directory (default: .)");
            eprintln!("  --year-min <year>  first sheet year (default: 1973)");
            eprintln!("  --year-max <year>  last sheet year (default: 1989)");
            eprintln!("  --top-n <n>        leaderboard cutoff (default: 200)");
            eprintln!("  --summary-json     print the run summary as JSON");
            return ExitCode::from(1);
        }
    };

    let config = build_config(&args);
    let summary_json = args.iter().any(|a| a == "--summary-json");

    match run(&command, &config, summary_json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("tml-import: {e:#}");
            let code = e
                .downcast_ref::<ImportError>()
                .map(|ie| ie.exit_code() as u8)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn build_config(args: &[String]) -> ImportConfig {
    let data_dir = parse_arg(args, "--data-dir", ".".to_string());
    let year_min = parse_arg(args, "--year-min", 1973u16);
    let year_max = parse_arg(args, "--year-max", 1989u16);
    let top_n = parse_arg(args, "--top-n", 200usize);

    ImportConfig::new(data_dir)
        .with_year_range(year_min, year_max)
        .with_top_n(top_n)
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn run(command: &str, config: &ImportConfig, summary_json: bool) -> anyhow::Result<()> {
    let mut summary = RunSummary::default();

    if command == "rankings" || command == "all" {
        summary.ranking = Some(run_rankings(config)?);
    }
    if command == "tournaments" || command == "all" {
        summary.tournament = Some(run_tournaments(config)?);
    }

    report(&summary, summary_json);
    Ok(())
}

fn report(summary: &RunSummary, as_json: bool) {
    if as_json {
        match summary.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("tml-import: cannot render summary: {e}"),
        }
        return;
    }
    if let Some(ranking) = &summary.ranking {
        println!("{ranking}");
    }
    if let Some(tournament) = &summary.tournament {
        println!("{tournament}");
    }
}
