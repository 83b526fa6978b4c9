use crate::board::{DIAGONALS, KING_DELTAS, KNIGHT_DELTAS, STRAIGHTS};
use crate::game_state::{castle_rook_squares, is_castle, GameState};
use crate::types::{Color, File, Move, Piece, PieceType, Square};

const MAX_MOVES: usize = 256;

/// A list of moves with a fixed capacity, so generating moves at a search
/// node never touches the heap.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    count: usize,
}

impl MoveList {
    pub const fn new() -> Self {
        const A1: Square = match Square::from_index(0) {
            Some(sq) => sq,
            None => unreachable!(),
        };
        Self {
            moves: [Move::new(A1, A1); MAX_MOVES],
            count: 0,
        }
    }

    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.count < MAX_MOVES, "move list overflow");
        self.moves[self.count] = mv;
        self.count += 1;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.count]
    }

    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn contains(&self, mv: &Move) -> bool {
        self.as_slice().contains(mv)
    }

    fn retain(&mut self, mut keep: impl FnMut(Move) -> bool) {
        let mut kept = 0;
        for i in 0..self.count {
            let mv = self.moves[i];
            if keep(mv) {
                self.moves[kept] = mv;
                kept += 1;
            }
        }
        self.count = kept;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::iter::Take<std::array::IntoIter<Move, MAX_MOVES>>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter().take(self.count)
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = Move;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Move>>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter().copied()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all legal moves for the side to move.
///
/// The order is deterministic: pawns, knights, bishops, rooks, queens, king
/// steps and finally castling, each group by ascending source square.
pub fn generate_legal_moves(state: &GameState) -> MoveList {
    let mut moves = generate_pseudo_legal_moves(state);
    moves.retain(|mv| leaves_king_safe(state, mv));
    moves
}

/// Moves that obey piece movement but may leave the own king in check.
fn generate_pseudo_legal_moves(state: &GameState) -> MoveList {
    let mut moves = MoveList::new();
    let color = state.turn;

    generate_pawn_moves(state, color, &mut moves);
    generate_leaper_moves(state, color, PieceType::Knight, &KNIGHT_DELTAS, &mut moves);
    generate_slider_moves(state, color, PieceType::Bishop, &DIAGONALS, &mut moves);
    generate_slider_moves(state, color, PieceType::Rook, &STRAIGHTS, &mut moves);
    generate_slider_moves(state, color, PieceType::Queen, &DIAGONALS, &mut moves);
    generate_slider_moves(state, color, PieceType::Queen, &STRAIGHTS, &mut moves);
    generate_leaper_moves(state, color, PieceType::King, &KING_DELTAS, &mut moves);
    generate_castling_moves(state, color, &mut moves);

    moves
}

/// Plays `mv` on a scratch copy of the board and checks the mover's king.
pub(crate) fn leaves_king_safe(state: &GameState, mv: Move) -> bool {
    let mut board = state.board.clone();
    let Some(piece) = board.remove(mv.from) else {
        return false;
    };

    if piece.piece_type == PieceType::Pawn
        && state.en_passant == Some(mv.to)
        && mv.from.file() != mv.to.file()
    {
        board.remove(Square::new(mv.to.file(), mv.from.rank()));
    }
    if is_castle(piece, mv) {
        let (rook_from, rook_to) = castle_rook_squares(mv);
        if let Some(rook) = board.remove(rook_from) {
            board.put(rook_to, rook);
        }
    }
    board.put(mv.to, piece);

    board
        .king_square(piece.color)
        .map_or(true, |king| !board.is_attacked_by(king, piece.color.opponent()))
}

fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, color: Color) {
    if to.rank() == color.promotion_rank() {
        for promotion in PieceType::PROMOTIONS {
            moves.push(Move::new_promotion(from, to, promotion));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

fn generate_pawn_moves(state: &GameState, color: Color, moves: &mut MoveList) {
    let board = &state.board;
    let direction = color.pawn_direction();

    for from in board.pieces(PieceType::Pawn, color).iter() {
        // Pushes
        if let Some(one) = from.offset(0, direction) {
            if board.is_empty(one) {
                push_pawn_move(moves, from, one, color);

                if from.rank() == color.pawn_rank() {
                    if let Some(two) = one.offset(0, direction) {
                        if board.is_empty(two) {
                            moves.push(Move::new(from, two));
                        }
                    }
                }
            }
        }

        // Captures, including en passant
        for df in [-1, 1] {
            let Some(target) = from.offset(df, direction) else {
                continue;
            };
            if board.is_color(target, color.opponent()) {
                push_pawn_move(moves, from, target, color);
            } else if state.en_passant == Some(target) {
                moves.push(Move::new(from, target));
            }
        }
    }
}

/// Knights and the king: single jumps to any square not holding a friendly piece.
fn generate_leaper_moves(
    state: &GameState,
    color: Color,
    piece_type: PieceType,
    deltas: &[(i8, i8)],
    moves: &mut MoveList,
) {
    for from in state.board.pieces(piece_type, color).iter() {
        for &(df, dr) in deltas {
            if let Some(to) = from.offset(df, dr) {
                if !state.board.is_color(to, color) {
                    moves.push(Move::new(from, to));
                }
            }
        }
    }
}

fn generate_slider_moves(
    state: &GameState,
    color: Color,
    piece_type: PieceType,
    directions: &[(i8, i8)],
    moves: &mut MoveList,
) {
    for from in state.board.pieces(piece_type, color).iter() {
        for &(df, dr) in directions {
            let mut current = from;
            while let Some(to) = current.offset(df, dr) {
                match state.board.piece_at(to) {
                    None => moves.push(Move::new(from, to)),
                    Some(piece) => {
                        if piece.color != color {
                            moves.push(Move::new(from, to));
                        }
                        break;
                    }
                }
                current = to;
            }
        }
    }
}

fn generate_castling_moves(state: &GameState, color: Color, moves: &mut MoveList) {
    let rights = state.castling;
    if !rights.kingside(color) && !rights.queenside(color) {
        return;
    }

    let rank = color.back_rank();
    let king_from = Square::new(File::E, rank);
    let board = &state.board;
    let enemy = color.opponent();
    let rook = Some(Piece::new(PieceType::Rook, color));

    if board.piece_at(king_from) != Some(Piece::new(PieceType::King, color))
        || board.is_attacked_by(king_from, enemy)
    {
        return;
    }

    let at = |file: File| Square::new(file, rank);

    if rights.kingside(color)
        && board.piece_at(at(File::H)) == rook
        && board.is_empty(at(File::F))
        && board.is_empty(at(File::G))
        && !board.is_attacked_by(at(File::F), enemy)
        && !board.is_attacked_by(at(File::G), enemy)
    {
        moves.push(Move::new(king_from, at(File::G)));
    }

    if rights.queenside(color)
        && board.piece_at(at(File::A)) == rook
        && board.is_empty(at(File::D))
        && board.is_empty(at(File::C))
        && board.is_empty(at(File::B))
        && !board.is_attacked_by(at(File::D), enemy)
        && !board.is_attacked_by(at(File::C), enemy)
    {
        moves.push(Move::new(king_from, at(File::C)));
    }
}

/// Side to move is in check and has no legal reply.
pub fn is_checkmate(state: &GameState) -> bool {
    state.is_in_check() && generate_legal_moves(state).is_empty()
}

/// Side to move is not in check but has no legal move.
pub fn is_stalemate(state: &GameState) -> bool {
    !state.is_in_check() && generate_legal_moves(state).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_position_moves() {
        let state = GameState::new();
        let moves = generate_legal_moves(&state);
        assert_eq!(moves.len(), 20);

        // Pawns come first, then knights.
        assert_eq!(moves.as_slice()[0].to_string(), "a2a3");
        assert!(moves.iter().skip(16).all(|mv| {
            state.board.piece_at(mv.from).map(|p| p.piece_type) == Some(PieceType::Knight)
        }));
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        let state = GameState::from_fen(crate::positions::KIWIPETE).unwrap();
        let first = generate_legal_moves(&state);
        let second = generate_legal_moves(&state);
        assert_eq!(first.as_slice(), second.as_slice());
        assert_eq!(first.len(), 48);
    }

    #[test]
    fn test_move_list_into_iter() {
        let state = GameState::from_fen(crate::positions::KIWIPETE).unwrap();
        let moves = generate_legal_moves(&state);
        let borrowed: Vec<Move> = (&moves).into_iter().collect();
        let owned: Vec<Move> = moves.clone().into_iter().collect();

        assert_eq!(borrowed, moves.as_slice());
        assert_eq!(owned, moves.as_slice());
        assert_eq!(MoveList::new().into_iter().count(), 0);
    }

    #[test]
    fn test_pawn_promotion() {
        let state = GameState::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let moves = generate_legal_moves(&state);
        let a7: Square = "a7".parse().unwrap();

        let promotions: Vec<_> = moves.iter().filter(|m| m.from == a7).collect();
        assert_eq!(promotions.len(), 4);
        assert!(promotions.iter().all(|m| m.is_promotion()));
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        // Knight on e2 is pinned against the king by the rook on e8.
        let state = GameState::from_fen("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let e2: Square = "e2".parse().unwrap();
        assert!(generate_legal_moves(&state).iter().all(|m| m.from != e2));
    }

    #[test]
    fn test_castling_blocked_through_check() {
        // Bishop on a6 covers f1, so only queenside castling remains.
        let state = GameState::from_fen("4k3/8/b7/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = generate_legal_moves(&state);
        assert!(moves.contains(&"e1c1".parse().unwrap()));
        assert!(!moves.contains(&"e1g1".parse().unwrap()));
    }

    #[test]
    fn test_checkmate_and_stalemate() {
        let mate = GameState::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 1 1").unwrap();
        assert!(is_checkmate(&mate));
        assert!(!is_stalemate(&mate));

        let stalemate = GameState::from_fen("k7/8/1Q6/8/8/8/8/7K b - - 0 1").unwrap();
        assert!(is_stalemate(&stalemate));
        assert!(!is_checkmate(&stalemate));
    }
}
