//! wavestrip CLI: interactive waveform strip chart in the terminal.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use wavestrip_core::audio::RodioTransport;
use wavestrip_core::{ChartCommand, ChartEngine};

mod term;
use term::TermRenderer;

#[derive(Parser)]
#[command(
    name = "wavestrip",
    about = "Scrollable, zoomable waveform strip chart with a dB cutoff overlay",
    version,
)]
struct Cli {
    /// Audio file to load (WAV, MP3, or MP4/AAC)
    input: PathBuf,

    /// Initial dB cutoff for the threshold overlay
    #[arg(long)]
    cutoff_db: Option<f32>,

    /// Chart width in terminal columns
    #[arg(long, default_value_t = 80)]
    width: usize,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Init logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let engine = ChartEngine::spawn(RodioTransport::new, TermRenderer::new(cli.width));

    engine.send(ChartCommand::Load(cli.input.clone()));
    if let Some(db) = cli.cutoff_db {
        engine.send(ChartCommand::SetCutoff(db));
    }
    engine.send(ChartCommand::Play);

    println!(
        "Commands: play | in (+) | out (-) | next (]) | prev ([) | cutoff <db> | load <path> | quit (q)"
    );

    // One command per line; a malformed line fails only that command.
    // EOF behaves as quit.
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match ChartCommand::parse(&line) {
            Ok(ChartCommand::Quit) => break,
            Ok(cmd) => engine.send(cmd),
            Err(e) => eprintln!("{}", e),
        }
        if let Some(err) = engine.status.take_error() {
            eprintln!("{}", err);
        }
    }

    engine.shutdown();
    println!();
    Ok(())
}
