use std::time::Duration;

use anyhow::Context as _;
use rand::Rng as _;
use stackfall_engine::{GameSession, QueueSeed};
use stackfall_runtime::Runtime;

use self::app::PlayApp;

mod app;
mod keymap;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Seed for the piece order, as 32 hex digits [default: random]
    #[clap(long)]
    pub(crate) seed: Option<QueueSeed>,
    /// Logic tick granularity in milliseconds
    #[clap(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub(crate) tick_ms: u64,
    /// Maximum redraws per second
    #[clap(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub(crate) fps: u32,
    /// Hide the landing preview of the falling piece
    #[clap(long)]
    pub(crate) no_ghost: bool,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        seed,
        tick_ms,
        fps,
        no_ghost,
    } = arg;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    tracing::info!(%seed, tick_ms, fps, ghost = !no_ghost, "starting session");

    let session = GameSession::with_seed(seed);
    let mut app = PlayApp::new(session, Duration::from_millis(*tick_ms), *fps, !no_ghost);

    Runtime::new()
        .run(&mut app)
        .context("Terminal session failed")?;

    let session = app.session();
    tracing::info!(
        level = session.level(),
        total_lines = session.total_lines_cleared(),
        pieces = session.pieces_dropped(),
        game_over = session.is_game_over(),
        "session closed"
    );
    Ok(())
}
