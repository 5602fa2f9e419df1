use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env, Target};

use csbot_cli::{run, Cli};

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Stderr)
        .init();

    let cli = Cli::parse();
    let today = chrono::Local::now().date_naive();
    let stdout = std::io::stdout();
    run(cli, today, &mut stdout.lock())
}
