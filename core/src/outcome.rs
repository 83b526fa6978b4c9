//! Game-over detection.

use crate::game_state::GameState;
use crate::move_gen::generate_legal_moves;
use crate::types::{Color, PieceType, Square};
use std::fmt;

/// Why a game ended. Only conditions that end the game without either
/// player claiming anything are included.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Termination {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    /// 150 half-moves without a capture or pawn move.
    SeventyFiveMoves,
    FivefoldRepetition,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    pub fn winner(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::White),
            GameResult::BlackWins => Some(Color::Black),
            GameResult::Draw => None,
        }
    }
}

/// PGN-style score: `1-0`, `0-1` or `1/2-1/2`.
impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
        })
    }
}

impl Termination {
    pub fn result(self) -> GameResult {
        match self {
            Termination::Checkmate {
                winner: Color::White,
            } => GameResult::WhiteWins,
            Termination::Checkmate {
                winner: Color::Black,
            } => GameResult::BlackWins,
            _ => GameResult::Draw,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            Termination::Stalemate => f.write_str("stalemate"),
            Termination::InsufficientMaterial => f.write_str("insufficient material"),
            Termination::SeventyFiveMoves => f.write_str("seventy-five move rule"),
            Termination::FivefoldRepetition => f.write_str("fivefold repetition"),
        }
    }
}

/// Positions with this halfmove clock or more are drawn.
const SEVENTY_FIVE_MOVE_PLIES: u16 = 150;

impl GameState {
    /// Classifies the position, or `None` while the game goes on.
    pub fn termination(&self) -> Option<Termination> {
        if generate_legal_moves(self).is_empty() {
            return Some(if self.is_in_check() {
                Termination::Checkmate {
                    winner: self.turn.opponent(),
                }
            } else {
                Termination::Stalemate
            });
        }
        self.draw_by_rule()
    }

    /// The draws that apply even when the side to move has legal moves.
    pub fn draw_by_rule(&self) -> Option<Termination> {
        if self.is_insufficient_material() {
            return Some(Termination::InsufficientMaterial);
        }
        if self.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES {
            return Some(Termination::SeventyFiveMoves);
        }
        if self.repetition_count() >= 5 {
            return Some(Termination::FivefoldRepetition);
        }
        None
    }

    pub fn result(&self) -> Option<GameResult> {
        self.termination().map(Termination::result)
    }

    /// Neither side can possibly deliver mate.
    pub fn is_insufficient_material(&self) -> bool {
        Color::BOTH
            .iter()
            .all(|&color| self.has_insufficient_material(color))
    }

    /// `color` cannot mate by any sequence of legal moves.
    fn has_insufficient_material(&self, color: Color) -> bool {
        let board = &self.board;
        let pieces = |piece_type| board.pieces(piece_type, color);
        let any_color = |piece_type| {
            board.pieces(piece_type, Color::White) | board.pieces(piece_type, Color::Black)
        };

        if !(pieces(PieceType::Pawn) | pieces(PieceType::Rook) | pieces(PieceType::Queen))
            .is_empty()
        {
            return false;
        }

        if !pieces(PieceType::Knight).is_empty() {
            // A lone knight only mates if the opponent has pieces that can block.
            let opponent = color.opponent();
            let blockers = board.occupancy(opponent).count()
                - board.pieces(PieceType::King, opponent).count()
                - board.pieces(PieceType::Queen, opponent).count();
            return board.occupancy(color).count() <= 2 && blockers == 0;
        }

        if !pieces(PieceType::Bishop).is_empty() {
            let bishops = any_color(PieceType::Bishop);
            let all_same_shade = bishops.iter().all(Square::is_light)
                || !bishops.iter().any(Square::is_light);
            return all_same_shade
                && any_color(PieceType::Pawn).is_empty()
                && any_color(PieceType::Knight).is_empty();
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Move;

    fn state(fen: &str) -> GameState {
        GameState::from_fen(fen).unwrap()
    }

    #[test]
    fn test_starting_position_not_over() {
        assert_eq!(GameState::new().termination(), None);
        assert_eq!(GameState::new().result(), None);
    }

    #[test]
    fn test_fools_mate() {
        let mut game = GameState::new();
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.make_move(m.parse::<Move>().unwrap());
        }
        assert_eq!(
            game.termination(),
            Some(Termination::Checkmate {
                winner: Color::Black
            })
        );
        assert_eq!(game.result(), Some(GameResult::BlackWins));
        assert_eq!(game.result().unwrap().to_string(), "0-1");
    }

    #[test]
    fn test_stalemate_is_draw() {
        let game = state("k7/8/1Q6/8/8/8/8/7K b - - 0 1");
        assert_eq!(game.termination(), Some(Termination::Stalemate));
        assert_eq!(game.result(), Some(GameResult::Draw));
        // Stalemate depends on the moves, not on a rule.
        assert_eq!(game.draw_by_rule(), None);
    }

    #[test]
    fn test_draw_by_rule() {
        assert_eq!(GameState::new().draw_by_rule(), None);
        assert_eq!(
            state("8/8/4k3/8/8/3K4/8/8 w - - 0 1").draw_by_rule(),
            Some(Termination::InsufficientMaterial)
        );
        assert_eq!(
            state("8/8/4k3/8/8/3KR3/8/8 w - - 150 100").draw_by_rule(),
            Some(Termination::SeventyFiveMoves)
        );
    }

    #[test]
    fn test_insufficient_material() {
        assert!(state("8/8/4k3/8/8/3K4/8/8 w - - 0 1").is_insufficient_material());
        assert!(state("8/8/4k3/8/8/3KN3/8/8 w - - 0 1").is_insufficient_material());
        assert!(state("8/8/4k3/8/8/3KB3/8/8 w - - 0 1").is_insufficient_material());
        // Bishops on the same shade cannot mate.
        assert!(state("8/8/3bk3/8/8/3KB3/8/8 w - - 0 1").is_insufficient_material());

        assert!(!state("8/8/4k3/8/8/3KR3/8/8 w - - 0 1").is_insufficient_material());
        assert!(!state("8/8/4k3/8/8/3KP3/8/8 w - - 0 1").is_insufficient_material());
        // Opposite-shade bishops can mate in corner positions.
        assert!(!state("8/8/3kb3/8/8/3KB3/8/8 w - - 0 1").is_insufficient_material());
        // A knight can mate when the opponent has a piece that can block.
        assert!(!state("8/8/4kr2/8/8/3KN3/8/8 w - - 0 1").is_insufficient_material());
    }

    #[test]
    fn test_seventy_five_move_rule() {
        let game = state("8/8/4k3/8/8/3KR3/8/8 w - - 150 100");
        assert_eq!(game.termination(), Some(Termination::SeventyFiveMoves));
        let game = state("8/8/4k3/8/8/3KR3/8/8 w - - 149 100");
        assert_eq!(game.termination(), None);
    }

    #[test]
    fn test_fivefold_repetition() {
        let mut game = GameState::new();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        for _ in 0..3 {
            for m in shuffle {
                game.make_move(m.parse::<Move>().unwrap());
            }
        }
        assert_eq!(game.repetition_count(), 4);
        assert_eq!(game.termination(), None);

        for m in shuffle {
            game.make_move(m.parse::<Move>().unwrap());
        }
        assert_eq!(game.termination(), Some(Termination::FivefoldRepetition));
    }
}
