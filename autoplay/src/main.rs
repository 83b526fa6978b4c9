mod config;
mod game;
mod render;

use anyhow::{Context, Result};
use autochess_agents::{search_root, Evaluator, MaterialEvaluator};
use autochess_core::{perft, perft_divide, GameState};
use clap::Parser;
use config::{parse_position, AutoplayConfig, Cli, Command, RenderMode};
use game::AutoGame;
use render::{Frame, PlainRenderer, Renderer, TerminalRenderer};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    match Cli::parse().into_command() {
        Command::Play(args) => {
            let config = AutoplayConfig::try_from(args)?;
            init_logging(config.render, config.log_file.as_deref())?;
            play(&config)
        }
        Command::Perft { depth, fen, divide } => {
            init_logging(RenderMode::Plain, None)?;
            run_perft(&mut parse_position(fen.as_deref())?, depth, divide);
            Ok(())
        }
        Command::Eval { fen } => {
            init_logging(RenderMode::Plain, None)?;
            run_eval(&parse_position(fen.as_deref())?)
        }
        Command::Bestmove { fen, depth } => {
            init_logging(RenderMode::Plain, None)?;
            run_bestmove(&mut parse_position(fen.as_deref())?, depth)
        }
    }
}

/// Logs go to `log_file` when given. Otherwise the terminal UI runs without
/// logs and plain mode writes them to stderr.
fn init_logging(render: RenderMode, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match (render, log_file) {
        (_, Some(path)) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        (RenderMode::Terminal, None) => {}
        (_, None) => builder.without_time().with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn play(config: &AutoplayConfig) -> Result<()> {
    let summary = match config.render {
        RenderMode::Terminal => {
            let renderer = TerminalRenderer::new().context("failed to set up the terminal")?;
            // The renderer is dropped here, restoring the terminal before printing.
            AutoGame::new(config, renderer).run()?
        }
        RenderMode::Plain | RenderMode::Auto => {
            AutoGame::new(config, PlainRenderer::new(std::io::stdout().lock())).run()?
        }
    };

    println!("\n*** {summary} ***");
    if let Some(score) = summary.last_score {
        println!("Final eval: {score:+}");
    }
    Ok(())
}

fn run_perft(state: &mut GameState, depth: u8, divide: bool) {
    println!("Running perft({})...", depth);
    println!("Position: {}", state.to_fen());

    let start = Instant::now();
    let nodes = if divide {
        let results = perft_divide(state, depth);
        for (mv, count) in &results {
            println!("{}: {}", mv, count);
        }
        results.iter().map(|(_, count)| count).sum::<u64>()
    } else {
        perft(state, depth)
    };
    let elapsed = start.elapsed();

    println!("\nNodes: {}", nodes);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("NPS: {:.0}", nodes as f64 / elapsed.as_secs_f64().max(1e-9));
}

fn run_eval(state: &GameState) -> Result<()> {
    let evaluator = MaterialEvaluator::default();
    let termination = state.termination();

    PlainRenderer::new(std::io::stdout().lock()).render(&Frame {
        state,
        last_move: None,
        score: None,
        termination,
    })?;
    println!("Evaluation: {:+} (+ = White, - = Black)", evaluator.evaluate(state));
    Ok(())
}

fn run_bestmove(state: &mut GameState, depth: u8) -> Result<()> {
    println!("Position: {}", state.to_fen());
    println!("Searching to depth {}...", depth);

    let evaluator = MaterialEvaluator::default();
    let start = Instant::now();
    let result = search_root(state, depth, &evaluator)
        .context("cannot search a position without legal moves")?;
    let elapsed = start.elapsed();

    println!("\nBest move: {}", result.best_move);
    println!("Score: {:+}", result.score);
    println!("Depth: {}", result.depth);
    println!("Nodes: {}", result.nodes);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!(
        "NPS: {:.0}",
        result.nodes as f64 / elapsed.as_secs_f64().max(1e-9)
    );
    Ok(())
}
