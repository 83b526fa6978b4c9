use anyhow::{bail, Context, Result};
use autochess_core::{positions, GameState};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "autochess")]
#[command(about = "Watch a minimax engine play chess against itself", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub play: PlayArgs,
}

impl Cli {
    /// `play` when no subcommand is given.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Play(self.play))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a full game, rendering the board after every move (default)
    Play(PlayArgs),
    /// Count leaf nodes of the move tree
    Perft {
        depth: u8,
        #[arg(long)]
        fen: Option<String>,
        /// Print the count below each root move
        #[arg(long)]
        divide: bool,
    },
    /// Print the static evaluation of a position
    Eval {
        #[arg(long)]
        fen: Option<String>,
    },
    /// Search a single position and print the chosen move
    Bestmove {
        #[arg(long)]
        fen: Option<String>,
        #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
        depth: u8,
    },
}

pub const DEFAULT_DEPTH: u8 = 3;
pub const DEFAULT_DELAY_SECS: f64 = 1.5;

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// Search depth in plies
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    pub depth: u8,

    /// Seconds to wait between moves
    #[arg(long, default_value_t = DEFAULT_DELAY_SECS)]
    pub delay: f64,

    /// Starting position
    #[arg(long)]
    pub fen: Option<String>,

    /// Stop after this many half-moves
    #[arg(long)]
    pub max_plies: Option<usize>,

    #[arg(long, value_enum, default_value_t = RenderMode::Auto)]
    pub render: RenderMode,

    /// Write logs here instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Terminal UI when stdout is a terminal, plain text otherwise
    Auto,
    Terminal,
    Plain,
}

impl RenderMode {
    /// Replaces `Auto` with the mode that suits stdout.
    pub fn resolve(self) -> RenderMode {
        match self {
            RenderMode::Auto if std::io::stdout().is_terminal() => RenderMode::Terminal,
            RenderMode::Auto => RenderMode::Plain,
            mode => mode,
        }
    }
}

/// Validated settings for one auto-played game.
#[derive(Debug, Clone)]
pub struct AutoplayConfig {
    pub depth: u8,
    pub move_delay: Duration,
    pub start: GameState,
    pub max_plies: Option<usize>,
    pub render: RenderMode,
    pub log_file: Option<PathBuf>,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            move_delay: Duration::from_secs_f64(DEFAULT_DELAY_SECS),
            start: GameState::new(),
            max_plies: None,
            render: RenderMode::Auto,
            log_file: None,
        }
    }
}

impl TryFrom<PlayArgs> for AutoplayConfig {
    type Error = anyhow::Error;

    fn try_from(args: PlayArgs) -> Result<Self> {
        if !args.delay.is_finite() || args.delay < 0.0 {
            bail!("--delay must be a non-negative number of seconds, got {}", args.delay);
        }

        Ok(Self {
            depth: args.depth,
            move_delay: Duration::from_secs_f64(args.delay),
            start: parse_position(args.fen.as_deref())?,
            max_plies: args.max_plies,
            render: args.render.resolve(),
            log_file: args.log_file,
        })
    }
}

/// Parses `fen`, or returns the starting position.
pub fn parse_position(fen: Option<&str>) -> Result<GameState> {
    let fen = fen.unwrap_or(positions::STARTING);
    GameState::from_fen(fen).with_context(|| format!("invalid FEN '{fen}'"))
}
