//! The capabilities the search needs from a rules engine.
//!
//! Search code is written against [`Position`] only, so it never looks inside
//! a move or a board. [`GameState`] is the chess implementation.

use autochess_core::{generate_legal_moves, Color, GameResult, GameState, Move, MoveList};
use std::fmt::{Debug, Display};

/// One of the two players. `First` is the maximizing side.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    pub fn is_maximizer(self) -> bool {
        self == Side::First
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Outcome {
    FirstSideWins,
    SecondSideWins,
    Draw,
    NotTerminal,
}

/// A two-player game state that can be walked in place.
///
/// `apply` and `undo` must be used as a stack: `undo` reverts the most recent
/// `apply` and implementations may panic otherwise.
pub trait Position {
    type Move: Copy + Eq + Debug + Display;
    type Moves: IntoIterator<Item = Self::Move>;

    /// Legal moves in a deterministic order. Empty only in terminal states.
    fn legal_moves(&self) -> Self::Moves;

    fn apply(&mut self, mv: Self::Move);

    fn undo(&mut self, mv: Self::Move);

    fn side_to_move(&self) -> Side;

    fn outcome(&self) -> Outcome;

    fn is_terminal(&self) -> bool {
        self.outcome() != Outcome::NotTerminal
    }

    /// [`is_terminal`](Self::is_terminal) for a position already known to
    /// have legal moves, so implementations can skip generating them again.
    fn is_terminal_with_moves(&self) -> bool {
        self.is_terminal()
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::First,
            Color::Black => Side::Second,
        }
    }
}

impl From<Option<GameResult>> for Outcome {
    fn from(result: Option<GameResult>) -> Self {
        match result {
            Some(GameResult::WhiteWins) => Outcome::FirstSideWins,
            Some(GameResult::BlackWins) => Outcome::SecondSideWins,
            Some(GameResult::Draw) => Outcome::Draw,
            None => Outcome::NotTerminal,
        }
    }
}

impl Position for GameState {
    type Move = Move;
    type Moves = MoveList;

    fn legal_moves(&self) -> MoveList {
        generate_legal_moves(self)
    }

    fn apply(&mut self, mv: Move) {
        self.make_move(mv);
    }

    fn undo(&mut self, mv: Move) {
        self.unmake_move(mv);
    }

    fn side_to_move(&self) -> Side {
        self.turn.into()
    }

    fn outcome(&self) -> Outcome {
        self.result().into()
    }

    fn is_terminal_with_moves(&self) -> bool {
        self.draw_by_rule().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::First.opponent(), Side::Second);
        assert_eq!(Side::Second.opponent(), Side::First);
        assert!(Side::First.is_maximizer());
        assert!(!Side::Second.is_maximizer());
    }

    #[test]
    fn test_chess_position() {
        let mut state = GameState::new();
        assert_eq!(Position::side_to_move(&state), Side::First);
        assert_eq!(state.outcome(), Outcome::NotTerminal);
        assert!(!state.is_terminal());
        assert_eq!(state.legal_moves().len(), 20);

        let e4 = "e2e4".parse().unwrap();
        state.apply(e4);
        assert_eq!(Position::side_to_move(&state), Side::Second);
        state.undo(e4);
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_chess_outcome() {
        let mate = GameState::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 1 1").unwrap();
        assert_eq!(mate.outcome(), Outcome::FirstSideWins);
        assert!(mate.is_terminal());
        assert!(mate.legal_moves().is_empty());

        let mated = GameState::from_fen("k7/8/8/8/8/8/5PPP/r5K1 w - - 0 1").unwrap();
        assert_eq!(mated.outcome(), Outcome::SecondSideWins);

        let stalemate = GameState::from_fen("k7/8/1Q6/8/8/8/8/7K b - - 0 1").unwrap();
        assert_eq!(stalemate.outcome(), Outcome::Draw);
    }

    #[test]
    fn test_terminal_with_moves() {
        assert!(!GameState::new().is_terminal_with_moves());

        // Bare kings still have moves but the game is drawn.
        let bare = GameState::from_fen("8/8/4k3/8/8/3K4/8/8 w - - 0 1").unwrap();
        assert!(!bare.legal_moves().is_empty());
        assert!(bare.is_terminal_with_moves());
        assert!(bare.is_terminal());
    }
}
