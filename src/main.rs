use std::path::PathBuf;
use std::process::ExitCode;

use log::{error, info, warn};
use rec_resolver::{
    ConditionVocabulary, CentreRegistry, IdentityResolver, RecordingWalker, ResolverConfig,
    load_table,
};

fn main() -> ExitCode {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args_os().skip(1);
    let (Some(root), Some(table_path)) = (args.next(), args.next()) else {
        eprintln!("usage: rec-resolver <recording-root> <participant-table.(csv|parquet)>");
        return ExitCode::FAILURE;
    };
    let root = PathBuf::from(root);
    let table_path = PathBuf::from(table_path);

    // Reference data is loaded once and read-only for the rest of the run
    let participants = match load_table(&table_path) {
        Ok(table) => table,
        Err(err) => {
            error!("cannot load participant table: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "participant table ready: {} rows from {}",
        participants.len(),
        table_path.display()
    );

    let config = ResolverConfig::default();
    let vocabulary = ConditionVocabulary::default();
    let registry = CentreRegistry::default();
    let resolver = IdentityResolver::new(&config, &vocabulary, &registry, &participants);

    let walker = match RecordingWalker::new(&root) {
        Ok(walker) => walker,
        Err(err) => {
            error!("cannot walk {}: {err}", root.display());
            return ExitCode::FAILURE;
        }
    };

    let report = match rec_resolver::run(&walker, &resolver) {
        Ok(report) => report,
        Err(err) => {
            error!("batch pass failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    if !report.failures.is_empty() {
        warn!("{} file(s) could not be resolved", report.failures.len());
    }

    // Structured report on stdout for downstream tooling
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            error!("cannot serialize report: {err}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
