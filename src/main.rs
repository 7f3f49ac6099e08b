use std::io;

use clap::Parser as _;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use markfs::backend::SnapshotStore;
use markfs::backends::{DiskStore, MemoryStore};
use markfs::config::{Cli, ShellConfig, Storage};
use markfs::shell::{CommandOpener, Shell, UrlOpener};

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();
    setup_tracing(&cli);
    debug!("Parsed CLI arguments: {cli:?}");

    let config = ShellConfig::from(cli);
    let opener: Box<dyn UrlOpener> = match &config.opener {
        Some(program) => Box::new(CommandOpener::new(program)),
        None => Box::new(CommandOpener::platform_default()),
    };

    match config.storage {
        Storage::Memory => {
            let shell = Shell::open(MemoryStore::new(), config.storage_key, opener).await;
            repl(shell).await
        }
        Storage::Disk(dir) => {
            let shell = Shell::open(DiskStore::new(dir), config.storage_key, opener).await;
            repl(shell).await
        }
    }
}

fn setup_tracing(cli: &Cli) {
    if let Some(level) = cli.log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .without_time()
            .compact()
            .init();
    }
}

async fn repl<S: SnapshotStore>(mut shell: Shell<S>) -> io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(format!("{} ", shell.prompt()).as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            stdout.write_all(b"\n").await?;
            break;
        };
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }

        let output = shell.run(&line).await;
        if output.clear {
            // ANSI: clear screen, cursor home
            stdout.write_all(b"\x1b[2J\x1b[H").await?;
        }
        for text in &output.lines {
            stdout.write_all(format!("{text}\n").as_bytes()).await?;
        }
        if let Some(error) = &output.error {
            stdout.write_all(format!("{error}\n").as_bytes()).await?;
        }
    }

    stdout.flush().await
}
