use std::{env, fs, path::PathBuf};

use anyhow::Context as _;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    filter::{Directive, LevelFilter},
};

const LOG_TARGETS: [&str; 3] = ["stackfall", "stackfall_engine", "stackfall_runtime"];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct LogArg {
    /// Directory for log files [default: <temp dir>/stackfall]
    #[clap(long)]
    pub(crate) log_dir: Option<PathBuf>,
    /// Log level for stackfall crates
    #[clap(long, default_value = "debug")]
    pub(crate) log_level: LevelFilter,
}

/// Routes tracing output to a per-session log file.
///
/// The terminal belongs to the TUI, so nothing is written to stdout or stderr.
/// Logs are flushed when the returned guard is dropped.
pub(crate) fn init(arg: &LogArg) -> anyhow::Result<WorkerGuard> {
    let log_dir = arg
        .log_dir
        .clone()
        .unwrap_or_else(|| env::temp_dir().join("stackfall"));
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let session_id = format!("{:08x}", rand::random::<u32>());
    let log_file = format!("{session_id}.log");

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let mut filter = EnvFilter::from_default_env();
    for target in LOG_TARGETS {
        let directive = format!("{target}={}", arg.log_level)
            .parse::<Directive>()
            .with_context(|| format!("Invalid log directive for {target}"))?;
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    let log_path = log_dir.join(&log_file);
    tracing::info!(
        session = %session_id,
        log = %log_path.display(),
        "stackfall starting up"
    );
    Ok(guard)
}
