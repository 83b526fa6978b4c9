//! Board presentation and pacing between moves.

use crate::game::StopReason;
use autochess_agents::Score;
use autochess_core::{File, GameResult, GameState, Move, Rank, Square, Termination};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// What the presentation layer gets to see after each move.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub state: &'a GameState,
    pub last_move: Option<Move>,
    /// Evaluation of `state` after `last_move`.
    pub score: Option<Score>,
    pub termination: Option<Termination>,
}

impl Frame<'_> {
    fn status_line(&self) -> String {
        let mut line = format!(
            "Move {} | {} to move",
            self.state.fullmove_number, self.state.turn
        );
        if let Some(mv) = self.last_move {
            line.push_str(&format!(" | Last {mv}"));
        }
        if let Some(score) = self.score {
            line.push_str(&format!(" | Eval {score:+}"));
        }
        line
    }
}

/// The headline shown when a game ends.
pub fn banner(result: GameResult) -> &'static str {
    match result {
        GameResult::WhiteWins => "White Wins!",
        GameResult::BlackWins => "Black Wins!",
        GameResult::Draw => "Draw!",
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Control {
    Continue,
    Quit,
}

pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>) -> io::Result<()>;

    /// Waits `delay` before the next move. Returns [`Control::Quit`] if the
    /// viewer asked to stop.
    fn pause(&mut self, delay: Duration) -> io::Result<Control> {
        std::thread::sleep(delay);
        Ok(Control::Continue)
    }

    /// Called once after the last frame with the reason the run stopped.
    fn finish(&mut self, _stop: StopReason) -> io::Result<()> {
        Ok(())
    }
}

fn square_at(file_idx: u8, rank_idx: u8) -> Option<Square> {
    Some(Square::new(File::new(file_idx)?, Rank::new(rank_idx)?))
}

/// Line-oriented text output for pipes and log files.
pub struct PlainRenderer<W: Write> {
    out: W,
}

impl<W: Write> PlainRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Renderer for PlainRenderer<W> {
    fn render(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        writeln!(self.out, "\n  a b c d e f g h")?;
        writeln!(self.out, "  ---------------")?;

        for rank_idx in (0..8).rev() {
            write!(self.out, "{} ", rank_idx + 1)?;
            for square in (0..8).filter_map(|file_idx| square_at(file_idx, rank_idx)) {
                match frame.state.board.piece_at(square) {
                    Some(piece) => write!(self.out, "{} ", piece.unicode())?,
                    None => write!(self.out, ". ")?,
                }
            }
            writeln!(self.out, "| {}", rank_idx + 1)?;
        }

        writeln!(self.out, "  ---------------")?;
        writeln!(self.out, "  a b c d e f g h\n")?;
        writeln!(self.out, "{}", frame.status_line())?;

        if let Some(termination) = frame.termination {
            writeln!(self.out, "{} ({termination})", banner(termination.result()))?;
        } else if frame.state.is_in_check() {
            writeln!(self.out, "Check!")?;
        }

        self.out.flush()
    }
}

const LIGHT_SQUARE: TermColor = TermColor::Rgb {
    r: 240,
    g: 217,
    b: 181,
};
const DARK_SQUARE: TermColor = TermColor::Rgb {
    r: 181,
    g: 136,
    b: 99,
};
const HIGHLIGHT: TermColor = TermColor::Rgb {
    r: 205,
    g: 210,
    b: 106,
};

/// Full-screen board on the terminal's alternate screen.
///
/// Raw mode is on while the renderer lives so keys can be read without
/// waiting for Enter; dropping it restores the terminal.
pub struct TerminalRenderer {
    stdout: io::Stdout,
}

impl TerminalRenderer {
    pub fn new() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        queue!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        stdout.flush()?;
        Ok(Self { stdout })
    }

    /// Blocks until a key is pressed.
    fn wait_for_key(&mut self) -> io::Result<()> {
        loop {
            if let Event::Key(KeyEvent {
                kind: KeyEventKind::Press,
                ..
            }) = event::read()?
            {
                return Ok(());
            }
        }
    }
}

/// A viewer who already pressed a quit key is not asked for another key.
fn prompts_before_exit(stop: StopReason) -> bool {
    stop != StopReason::Quit
}

fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        let out = &mut self.stdout;
        queue!(
            out,
            MoveTo(0, 0),
            Clear(ClearType::All),
            Print("Autochess - q to quit"),
            MoveTo(0, 2),
            Print("   a  b  c  d  e  f  g  h")
        )?;

        let moved = frame.last_move.map(|mv| [mv.from, mv.to]);

        for (row, rank_idx) in (0..8u8).rev().enumerate() {
            let y = 3 + row as u16;
            queue!(out, MoveTo(0, y), Print(format!("{} ", rank_idx + 1)))?;

            for file_idx in 0..8u8 {
                let Some(square) = square_at(file_idx, rank_idx) else {
                    continue;
                };
                let background = if moved.is_some_and(|squares| squares.contains(&square)) {
                    HIGHLIGHT
                } else if square.is_light() {
                    LIGHT_SQUARE
                } else {
                    DARK_SQUARE
                };
                let symbol = frame
                    .state
                    .board
                    .piece_at(square)
                    .map_or(' ', |piece| piece.unicode());

                queue!(
                    out,
                    SetBackgroundColor(background),
                    SetForegroundColor(TermColor::Black),
                    Print(format!(" {symbol} ")),
                    ResetColor
                )?;
            }

            queue!(out, Print(format!(" {}", rank_idx + 1)))?;
        }

        queue!(
            out,
            MoveTo(0, 11),
            Print("   a  b  c  d  e  f  g  h"),
            MoveTo(0, 13),
            Print(frame.status_line())
        )?;

        if let Some(termination) = frame.termination {
            queue!(
                out,
                MoveTo(0, 15),
                SetForegroundColor(TermColor::Red),
                Print(banner(termination.result())),
                ResetColor,
                Print(format!(" ({termination})"))
            )?;
        } else if frame.state.is_in_check() {
            queue!(out, MoveTo(0, 15), Print("Check!"))?;
        }

        out.flush()
    }

    fn pause(&mut self, delay: Duration) -> io::Result<Control> {
        let deadline = Instant::now() + delay;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(Control::Continue);
            }
            if event::poll(remaining)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && is_quit_key(&key) {
                        return Ok(Control::Quit);
                    }
                }
            }
        }
    }

    fn finish(&mut self, stop: StopReason) -> io::Result<()> {
        if !prompts_before_exit(stop) {
            return Ok(());
        }
        queue!(self.stdout, MoveTo(0, 17), Print("Press any key to exit"))?;
        self.stdout.flush()?;
        self.wait_for_key()
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        let _ = queue!(self.stdout, ResetColor, Show, LeaveAlternateScreen);
        let _ = self.stdout.flush();
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_plain(frame: &Frame<'_>) -> String {
        let mut out = Vec::new();
        PlainRenderer::new(&mut out).render(frame).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_plain_starting_position() {
        let state = GameState::new();
        let text = render_plain(&Frame {
            state: &state,
            last_move: None,
            score: None,
            termination: None,
        });

        assert!(text.contains("8 ♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜ | 8"));
        assert!(text.contains("4 . . . . . . . . | 4"));
        assert!(text.contains("1 ♖ ♘ ♗ ♕ ♔ ♗ ♘ ♖ | 1"));
        assert!(text.contains("Move 1 | White to move"));
        assert!(!text.contains("Eval"));
    }

    #[test]
    fn test_plain_status_and_banner() {
        let state = GameState::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 1 1").unwrap();
        let text = render_plain(&Frame {
            state: &state,
            last_move: Some("a1a8".parse().unwrap()),
            score: Some(10_000),
            termination: state.termination(),
        });

        assert!(text.contains("Last a1a8 | Eval +10000"));
        assert!(text.contains("White Wins! (checkmate, White wins)"));
    }

    #[test]
    fn test_plain_check_notice() {
        let state = GameState::from_fen("4k3/8/8/8/8/8/8/R3K2r w - - 0 1").unwrap();
        let text = render_plain(&Frame {
            state: &state,
            last_move: None,
            score: Some(0),
            termination: None,
        });
        assert!(text.contains("Check!"));
        assert!(text.contains("Eval +0"));
    }

    #[test]
    fn test_banner() {
        assert_eq!(banner(GameResult::WhiteWins), "White Wins!");
        assert_eq!(banner(GameResult::BlackWins), "Black Wins!");
        assert_eq!(banner(GameResult::Draw), "Draw!");
    }

    #[test]
    fn test_exit_prompt_skipped_after_quit() {
        assert!(!prompts_before_exit(StopReason::Quit));
        assert!(prompts_before_exit(StopReason::PlyLimit));
        assert!(prompts_before_exit(StopReason::GameOver(Termination::Stalemate)));
    }

    #[test]
    fn test_quit_keys() {
        let key = |code, modifiers| KeyEvent::new(code, modifiers);
        assert!(is_quit_key(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit_key(&key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit_key(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
