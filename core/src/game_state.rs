//! Full game state with in-place, reversible move application.
//!
//! `make_move` and `unmake_move` form a strict stack: every applied move
//! pushes an undo record and `unmake_move` pops it, restoring the previous
//! position exactly. A single `GameState` can therefore be walked through an
//! entire search tree without cloning.

use crate::board::Board;
use crate::move_gen::leaves_king_safe;
use crate::types::*;
use crate::zobrist::KEYS;

/// Everything `make_move` overwrites that cannot be recomputed on undo.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Undo {
    mv: Move,
    captured: Option<Piece>,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u16,
    hash: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub castling: CastlingRights,
    /// Square a pawn may capture onto en passant, if the last move was a double push.
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    /// Incremented after Black's move.
    pub fullmove_number: u16,
    hash: u64,
    history: Vec<Undo>,
}

impl GameState {
    /// Standard starting position, White to move.
    pub fn new() -> Self {
        Self::from_parts(
            Board::starting_position(),
            Color::White,
            CastlingRights::all(),
            None,
            0,
            1,
        )
    }

    /// Empty board with no castling rights; mostly useful for tests.
    pub fn empty() -> Self {
        Self::from_parts(Board::empty(), Color::White, CastlingRights::none(), None, 0, 1)
    }

    pub fn from_parts(
        board: Board,
        turn: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u16,
        fullmove_number: u16,
    ) -> Self {
        let mut state = Self {
            board,
            turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            hash: 0,
            history: Vec::new(),
        };
        state.hash = state.compute_hash();
        state
    }

    pub fn side_to_move(&self) -> Color {
        self.turn
    }

    /// Zobrist hash of the current position.
    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    /// The en passant file only counts when the capture is legal.
    fn compute_hash(&self) -> u64 {
        let mut hash = KEYS.side_to_move(self.turn)
            ^ KEYS.castling(self.castling)
            ^ KEYS.en_passant(self.legal_en_passant());
        for (square, piece) in self.board.occupied() {
            hash ^= KEYS.piece_square(piece, square);
        }
        hash
    }

    /// The en passant target if the side to move can legally capture onto it.
    pub fn legal_en_passant(&self) -> Option<Square> {
        let target = self.en_passant?;
        let pawn = Piece::new(PieceType::Pawn, self.turn);
        let behind = -self.turn.pawn_direction();

        [-1, 1]
            .into_iter()
            .filter_map(|df| target.offset(df, behind))
            .filter(|&from| self.board.piece_at(from) == Some(pawn))
            .any(|from| leaves_king_safe(self, Move::new(from, target)))
            .then_some(target)
    }

    /// Number of moves applied to this state since it was created.
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Moves applied so far, oldest first.
    pub fn moves_played(&self) -> impl Iterator<Item = Move> + '_ {
        self.history.iter().map(|undo| undo.mv)
    }

    /// Applies `mv` in place. The move must be legal in the current
    /// position; use [`crate::generate_legal_moves`] to obtain one.
    ///
    /// # Panics
    ///
    /// Panics if the source square is empty.
    pub fn make_move(&mut self, mv: Move) {
        let piece = self
            .board
            .piece_at(mv.from)
            .unwrap_or_else(|| panic!("make_move {mv}: no piece on {}", mv.from));

        let mut undo = Undo {
            mv,
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        };

        if is_castle(piece, mv) {
            let (rook_from, rook_to) = castle_rook_squares(mv);
            self.board.remove(mv.from);
            self.board.put(mv.to, piece);
            if let Some(rook) = self.board.remove(rook_from) {
                self.board.put(rook_to, rook);
            }
        } else {
            undo.captured = if self.is_en_passant(piece, mv) {
                self.board
                    .remove(Square::new(mv.to.file(), mv.from.rank()))
            } else {
                self.board.remove(mv.to)
            };
            self.board.remove(mv.from);
            let placed = mv
                .promotion
                .map_or(piece, |promotion| Piece::new(promotion, piece.color));
            self.board.put(mv.to, placed);
        }

        let is_pawn = piece.piece_type == PieceType::Pawn;
        self.en_passant = if is_pawn && mv.from.rank().index().abs_diff(mv.to.rank().index()) == 2
        {
            mv.from.offset(0, piece.color.pawn_direction())
        } else {
            None
        };

        if is_pawn || undo.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.castling = self.castling.update_after_move(mv.from, mv.to);
        if self.turn == Color::Black {
            self.fullmove_number += 1;
        }
        self.turn = self.turn.opponent();
        self.hash = self.compute_hash();
        self.history.push(undo);
    }

    /// Reverts the most recent [`make_move`](Self::make_move).
    ///
    /// # Panics
    ///
    /// Panics if no move has been applied, or if `mv` is not the move that
    /// was applied last.
    pub fn unmake_move(&mut self, mv: Move) {
        let undo = self
            .history
            .pop()
            .unwrap_or_else(|| panic!("unmake_move {mv} without a matching make_move"));
        assert_eq!(
            undo.mv, mv,
            "unmake_move must revert the most recently applied move"
        );

        self.turn = self.turn.opponent();
        if self.turn == Color::Black {
            self.fullmove_number -= 1;
        }

        let moved = self
            .board
            .remove(mv.to)
            .unwrap_or_else(|| panic!("unmake_move {mv}: destination square is empty"));
        let piece = if mv.is_promotion() {
            Piece::new(PieceType::Pawn, moved.color)
        } else {
            moved
        };
        self.board.put(mv.from, piece);

        if is_castle(piece, mv) {
            let (rook_from, rook_to) = castle_rook_squares(mv);
            if let Some(rook) = self.board.remove(rook_to) {
                self.board.put(rook_from, rook);
            }
        } else if let Some(captured) = undo.captured {
            let square = if piece.piece_type == PieceType::Pawn
                && undo.en_passant == Some(mv.to)
                && mv.from.file() != mv.to.file()
            {
                Square::new(mv.to.file(), mv.from.rank())
            } else {
                mv.to
            };
            self.board.put(square, captured);
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.hash = undo.hash;
    }

    fn is_en_passant(&self, piece: Piece, mv: Move) -> bool {
        piece.piece_type == PieceType::Pawn
            && self.en_passant == Some(mv.to)
            && mv.from.file() != mv.to.file()
    }

    /// How many times the current position has occurred, counting itself.
    /// Only positions since the last capture or pawn move can match.
    pub fn repetition_count(&self) -> usize {
        1 + self
            .history
            .iter()
            .rev()
            .take(self.halfmove_clock as usize)
            .filter(|undo| undo.hash == self.hash)
            .count()
    }

    pub fn is_attacked_by(&self, square: Square, attacker: Color) -> bool {
        self.board.is_attacked_by(square, attacker)
    }

    /// Returns true if the side to move is in check.
    pub fn is_in_check(&self) -> bool {
        self.is_side_in_check(self.turn)
    }

    pub fn is_side_in_check(&self, color: Color) -> bool {
        self.board
            .king_square(color)
            .is_some_and(|king| self.board.is_attacked_by(king, color.opponent()))
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_castle(piece: Piece, mv: Move) -> bool {
    piece.piece_type == PieceType::King && mv.from.file().index().abs_diff(mv.to.file().index()) == 2
}

/// Rook origin and destination for a castling king move.
pub(crate) fn castle_rook_squares(mv: Move) -> (Square, Square) {
    let rank = mv.from.rank();
    if mv.to.file() > mv.from.file() {
        (Square::new(File::H, rank), Square::new(File::F, rank))
    } else {
        (Square::new(File::A, rank), Square::new(File::D, rank))
    }
}


#[cfg(test)]
mod playout_tests {
    use super::*;
    use crate::move_gen::generate_legal_moves;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_random_playout_unwinds_to_start(choices in prop::collection::vec(any::<usize>(), 1..40)) {
            let original = GameState::new();
            let mut state = original.clone();
            let mut played = Vec::new();

            for choice in choices {
                let moves = generate_legal_moves(&state);
                if moves.is_empty() {
                    break;
                }
                let mv = moves.as_slice()[choice % moves.len()];
                state.make_move(mv);
                prop_assert!(state.board.is_consistent());
                played.push(mv);
            }

            for mv in played.into_iter().rev() {
                state.unmake_move(mv);
            }
            prop_assert_eq!(state, original);
        }
    }
}
