use crate::game::{Outcome, Position};
use autochess_core::{Color, GameState, PieceType};

/// Position desirability from the first side's point of view.
pub type Score = i32;

/// Score of a decided game. Larger than any material balance.
pub const WIN_SCORE: Score = 10_000;

/// Initial search bound, outside every score an evaluator can return.
pub const INFINITY: Score = 1_000_000;

/// Static evaluation of a position.
///
/// Implementations must be pure and symmetric: positive scores favor
/// [`Side::First`](crate::Side::First), negative scores favor the second side.
pub trait Evaluator<P: Position> {
    fn evaluate(&self, position: &P) -> Score;
}

impl<P: Position, F: Fn(&P) -> Score> Evaluator<P> for F {
    fn evaluate(&self, position: &P) -> Score {
        self(position)
    }
}

/// `+WIN_SCORE`, `-WIN_SCORE` or 0 for a finished game, `None` otherwise.
pub fn terminal_score(outcome: Outcome) -> Option<Score> {
    match outcome {
        Outcome::FirstSideWins => Some(WIN_SCORE),
        Outcome::SecondSideWins => Some(-WIN_SCORE),
        Outcome::Draw => Some(0),
        Outcome::NotTerminal => None,
    }
}

/// Per-piece material values. The king is worth nothing here because losing
/// it is covered by the checkmate score.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PieceWeights {
    pub pawn: Score,
    pub knight: Score,
    pub bishop: Score,
    pub rook: Score,
    pub queen: Score,
    pub king: Score,
}

impl PieceWeights {
    pub const STANDARD: PieceWeights = PieceWeights {
        pawn: 1,
        knight: 3,
        bishop: 3,
        rook: 5,
        queen: 9,
        king: 0,
    };

    pub fn weight(&self, piece_type: PieceType) -> Score {
        match piece_type {
            PieceType::Pawn => self.pawn,
            PieceType::Knight => self.knight,
            PieceType::Bishop => self.bishop,
            PieceType::Rook => self.rook,
            PieceType::Queen => self.queen,
            PieceType::King => self.king,
        }
    }
}

impl Default for PieceWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Material balance, White minus Black.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MaterialEvaluator {
    pub weights: PieceWeights,
}

impl MaterialEvaluator {
    pub fn new(weights: PieceWeights) -> Self {
        Self { weights }
    }

    /// Sum of piece weights for one color.
    pub fn material(&self, state: &GameState, color: Color) -> Score {
        PieceType::ALL
            .iter()
            .map(|&piece_type| {
                let count = state.board.pieces(piece_type, color).count() as Score;
                count * self.weights.weight(piece_type)
            })
            .sum()
    }
}

impl Evaluator<GameState> for MaterialEvaluator {
    fn evaluate(&self, state: &GameState) -> Score {
        if let Some(score) = terminal_score(state.outcome()) {
            return score;
        }
        self.material(state, Color::White) - self.material(state, Color::Black)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(fen: &str) -> Score {
        MaterialEvaluator::default().evaluate(&GameState::from_fen(fen).unwrap())
    }

    #[test]
    fn test_starting_position_is_balanced() {
        let evaluator = MaterialEvaluator::default();
        let state = GameState::new();

        // 8 pawns + 2 knights + 2 bishops + 2 rooks + queen
        assert_eq!(evaluator.material(&state, Color::White), 39);
        assert_eq!(evaluator.material(&state, Color::Black), 39);
        assert_eq!(evaluator.evaluate(&state), 0);
    }

    #[test]
    fn test_material_advantage() {
        // White queen against a black rook
        assert_eq!(eval("4k3/8/8/4r3/4Q3/8/8/4K3 w - - 0 1"), 4);
        // Same material with Black to move
        assert_eq!(eval("4k3/8/8/4r3/4Q3/8/8/4K3 b - - 0 1"), 4);
        assert_eq!(eval("4k3/3qq3/8/8/8/8/8/4K2R w - - 0 1"), -13);
    }

    #[test]
    fn test_evaluation_is_symmetric() {
        let white_up = eval("4k3/8/8/8/8/8/P2N4/4K3 w - - 0 1");
        let black_up = eval("4k3/p2n4/8/8/8/8/8/4K3 b - - 0 1");
        assert_eq!(white_up, 4);
        assert_eq!(white_up, -black_up);
    }

    #[test]
    fn test_terminal_scores() {
        // Black is mated
        assert_eq!(eval("R5k1/5ppp/8/8/8/8/8/6K1 b - - 1 1"), WIN_SCORE);
        // White is mated
        assert_eq!(eval("k7/8/8/8/8/8/5PPP/r5K1 w - - 0 1"), -WIN_SCORE);
        // Stalemate with a queen up is still a draw
        assert_eq!(eval("k7/8/1Q6/8/8/8/8/7K b - - 0 1"), 0);
        // Bare kings
        assert_eq!(eval("8/8/4k3/8/8/3K4/8/8 w - - 0 1"), 0);
    }

    #[test]
    fn test_custom_weights() {
        let evaluator = MaterialEvaluator::new(PieceWeights {
            queen: 10,
            ..PieceWeights::STANDARD
        });
        let state = GameState::from_fen("4k3/8/8/8/4Q3/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(evaluator.evaluate(&state), 10);
    }

    #[test]
    fn test_closure_evaluator() {
        let constant = |_: &GameState| 7;
        assert_eq!(constant.evaluate(&GameState::new()), 7);
    }

    #[test]
    fn test_win_dominates_material() {
        let max_material = 9 * PieceWeights::STANDARD.queen
            + 2 * (PieceWeights::STANDARD.rook
                + PieceWeights::STANDARD.bishop
                + PieceWeights::STANDARD.knight);
        assert!(WIN_SCORE > max_material);
        assert!(INFINITY > WIN_SCORE);
    }
}
