use crate::config::AutoplayConfig;
use crate::render::{banner, Control, Frame, Renderer};
use anyhow::{Context, Result};
use autochess_agents::{Agent, Evaluator, MinimaxAgent, Score};
use autochess_core::{GameResult, GameState, Move, Termination};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StopReason {
    GameOver(Termination),
    /// The viewer quit before the game ended.
    Quit,
    PlyLimit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GameSummary {
    pub stop: StopReason,
    /// Half-moves played by this driver.
    pub plies: usize,
    pub last_score: Option<Score>,
}

impl GameSummary {
    pub fn result(&self) -> Option<GameResult> {
        match self.stop {
            StopReason::GameOver(termination) => Some(termination.result()),
            StopReason::Quit | StopReason::PlyLimit => None,
        }
    }
}

impl std::fmt::Display for GameSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.stop {
            StopReason::GameOver(termination) => write!(
                f,
                "{} {} ({termination}) after {} plies",
                banner(termination.result()),
                termination.result(),
                self.plies
            ),
            StopReason::Quit => write!(f, "Stopped by viewer after {} plies", self.plies),
            StopReason::PlyLimit => write!(f, "Ply limit reached after {} plies", self.plies),
        }
    }
}

/// Owns the one game state and drives the engine against itself.
pub struct AutoGame<R: Renderer> {
    state: GameState,
    agent: MinimaxAgent,
    renderer: R,
    move_delay: Duration,
    max_plies: Option<usize>,
    last_move: Option<Move>,
    last_score: Option<Score>,
    plies: usize,
}

impl<R: Renderer> AutoGame<R> {
    pub fn new(config: &AutoplayConfig, renderer: R) -> Self {
        Self {
            state: config.start.clone(),
            agent: MinimaxAgent::new(config.depth),
            renderer,
            move_delay: config.move_delay,
            max_plies: config.max_plies,
            last_move: None,
            last_score: None,
            plies: 0,
        }
    }

    /// Plays until the game ends, the viewer quits or the ply limit is hit.
    pub fn run(&mut self) -> Result<GameSummary> {
        info!("Starting {} at depth {}", self.agent.name(), self.agent.depth());
        self.draw(self.state.termination())?;

        let stop = loop {
            if let Some(termination) = self.state.termination() {
                break StopReason::GameOver(termination);
            }
            if self.max_plies.is_some_and(|limit| self.plies >= limit) {
                break StopReason::PlyLimit;
            }

            self.play_move()?;

            let termination = self.state.termination();
            self.draw(termination)?;

            if termination.is_none()
                && self.renderer.pause(self.move_delay)? == Control::Quit
            {
                break StopReason::Quit;
            }
        };

        let summary = GameSummary {
            stop,
            plies: self.plies,
            last_score: self.last_score,
        };
        match summary.result() {
            Some(result) => info!("GAME OVER: {result}"),
            None => info!("{summary}"),
        }
        self.renderer.finish(stop)?;
        Ok(summary)
    }

    fn play_move(&mut self) -> Result<()> {
        info!(
            "Turn {}: {} thinking...",
            self.state.fullmove_number, self.state.turn
        );

        let start = Instant::now();
        let result = self
            .agent
            .best_move(&mut self.state)
            .with_context(|| format!("no move to play in {}", self.state.to_fen()))?;
        self.state.make_move(result.best_move);
        let elapsed = start.elapsed();

        let score = self.agent.evaluator().evaluate(&self.state);
        info!(
            "{} ({:.2}s) | Eval {:+}",
            result.best_move,
            elapsed.as_secs_f64(),
            score
        );

        self.last_move = Some(result.best_move);
        self.last_score = Some(score);
        self.plies += 1;
        Ok(())
    }

    fn draw(&mut self, termination: Option<Termination>) -> Result<()> {
        let frame = Frame {
            state: &self.state,
            last_move: self.last_move,
            score: self.last_score,
            termination,
        };
        self.renderer.render(&frame).context("failed to draw the board")
    }
}
