use clap::Parser;

use crate::logging::{self, LogArg};

use self::play::PlayArg;

mod play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[clap(flatten)]
    play: PlayArg,
    #[clap(flatten)]
    log: LogArg,
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let _log_guard = logging::init(&args.log)?;
    play::run(&args.play)
}
