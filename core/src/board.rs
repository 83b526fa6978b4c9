//! Piece placement, stored both as a mailbox for lookups and as
//! per-color/per-type bitboards for iteration.

use crate::types::*;

pub(crate) const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub(crate) const KING_DELTAS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub(crate) const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
pub(crate) const STRAIGHTS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    squares: [Option<Piece>; 64],
    pieces: [[BitBoard; 6]; 2],
    occupancy: [BitBoard; 2],
}

impl Board {
    pub const fn empty() -> Self {
        Self {
            squares: [None; 64],
            pieces: [[BitBoard::EMPTY; 6]; 2],
            occupancy: [BitBoard::EMPTY; 2],
        }
    }

    /// The standard initial setup.
    pub fn starting_position() -> Self {
        const BACK_RANK: [PieceType; 8] = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        let mut board = Self::empty();
        for color in Color::BOTH {
            for (file_idx, &piece_type) in BACK_RANK.iter().enumerate() {
                if let Some(file) = File::new(file_idx as u8) {
                    board.put(
                        Square::new(file, color.back_rank()),
                        Piece::new(piece_type, color),
                    );
                    board.put(
                        Square::new(file, color.pawn_rank()),
                        Piece::new(PieceType::Pawn, color),
                    );
                }
            }
        }
        board
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index() as usize]
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    pub fn is_color(&self, square: Square, color: Color) -> bool {
        self.piece_at(square).is_some_and(|p| p.color == color)
    }

    /// Places `piece` on `square`, replacing whatever stood there.
    pub fn put(&mut self, square: Square, piece: Piece) {
        self.remove(square);
        self.squares[square.index() as usize] = Some(piece);
        let (c, t) = (piece.color.index(), piece.piece_type.index());
        self.pieces[c][t] = self.pieces[c][t].with(square);
        self.occupancy[c] = self.occupancy[c].with(square);
    }

    /// Clears `square`, returning the piece that stood there.
    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        let piece = self.squares[square.index() as usize].take()?;
        let (c, t) = (piece.color.index(), piece.piece_type.index());
        self.pieces[c][t] = self.pieces[c][t].without(square);
        self.occupancy[c] = self.occupancy[c].without(square);
        Some(piece)
    }

    pub fn pieces(&self, piece_type: PieceType, color: Color) -> BitBoard {
        self.pieces[color.index()][piece_type.index()]
    }

    pub fn occupancy(&self, color: Color) -> BitBoard {
        self.occupancy[color.index()]
    }

    pub fn all_occupancy(&self) -> BitBoard {
        self.occupancy[0] | self.occupancy[1]
    }

    /// Iterates occupied squares in ascending index order.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.all_occupancy()
            .iter()
            .filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(PieceType::King, color).iter().next()
    }

    /// Returns true if any piece of `attacker` attacks `square`.
    pub fn is_attacked_by(&self, square: Square, attacker: Color) -> bool {
        // A pawn of `attacker` attacks from one rank behind, relative to its direction.
        let back = -attacker.pawn_direction();
        let pawns = self.pieces(PieceType::Pawn, attacker);
        if [-1, 1]
            .iter()
            .filter_map(|&df| square.offset(df, back))
            .any(|sq| pawns.contains(sq))
        {
            return true;
        }

        let knights = self.pieces(PieceType::Knight, attacker);
        if KNIGHT_DELTAS
            .iter()
            .filter_map(|&(df, dr)| square.offset(df, dr))
            .any(|sq| knights.contains(sq))
        {
            return true;
        }

        let king = self.pieces(PieceType::King, attacker);
        if KING_DELTAS
            .iter()
            .filter_map(|&(df, dr)| square.offset(df, dr))
            .any(|sq| king.contains(sq))
        {
            return true;
        }

        let queens = self.pieces(PieceType::Queen, attacker);
        let diagonal = self.pieces(PieceType::Bishop, attacker) | queens;
        let straight = self.pieces(PieceType::Rook, attacker) | queens;
        DIAGONALS
            .iter()
            .any(|&dir| self.first_piece_along(square, dir).is_some_and(|sq| diagonal.contains(sq)))
            || STRAIGHTS
                .iter()
                .any(|&dir| self.first_piece_along(square, dir).is_some_and(|sq| straight.contains(sq)))
    }

    /// First occupied square met walking from `from` (exclusive) along `dir`.
    fn first_piece_along(&self, from: Square, (df, dr): (i8, i8)) -> Option<Square> {
        let mut current = from;
        while let Some(next) = current.offset(df, dr) {
            if !self.is_empty(next) {
                return Some(next);
            }
            current = next;
        }
        None
    }

    /// Mailbox and bitboards agree.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let mut rebuilt = Board::empty();
        for (square, piece) in Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p))) {
            rebuilt.put(square, piece);
        }
        rebuilt == *self
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}
