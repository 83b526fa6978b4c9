//! Zobrist hashing, used to recognise repeated positions.

use crate::types::{CastlingRights, Color, Piece, Square};

pub struct ZobristKeys {
    piece_square: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

/// Keys are generated at compile time from a fixed seed, so hashes are
/// stable across runs.
pub static KEYS: ZobristKeys = ZobristKeys::generate(0x1234_5678_9ABC_DEF1);

const fn xorshift(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

impl ZobristKeys {
    const fn generate(seed: u64) -> Self {
        let mut rng = seed;
        let mut piece_square = [[[0u64; 64]; 6]; 2];
        let mut color = 0;
        while color < 2 {
            let mut piece = 0;
            while piece < 6 {
                let mut square = 0;
                while square < 64 {
                    rng = xorshift(rng);
                    piece_square[color][piece][square] = rng;
                    square += 1;
                }
                piece += 1;
            }
            color += 1;
        }

        rng = xorshift(rng);
        let black_to_move = rng;

        let mut castling = [0u64; 16];
        let mut i = 0;
        while i < 16 {
            rng = xorshift(rng);
            castling[i] = rng;
            i += 1;
        }

        let mut en_passant_file = [0u64; 8];
        let mut i = 0;
        while i < 8 {
            rng = xorshift(rng);
            en_passant_file[i] = rng;
            i += 1;
        }

        Self {
            piece_square,
            black_to_move,
            castling,
            en_passant_file,
        }
    }

    pub fn piece_square(&self, piece: Piece, square: Square) -> u64 {
        self.piece_square[piece.color.index()][piece.piece_type.index()][square.index() as usize]
    }

    pub fn side_to_move(&self, color: Color) -> u64 {
        match color {
            Color::White => 0,
            Color::Black => self.black_to_move,
        }
    }

    pub fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.bits() as usize]
    }

    pub fn en_passant(&self, square: Option<Square>) -> u64 {
        square.map_or(0, |sq| self.en_passant_file[sq.file().index() as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceType;

    #[test]
    fn test_keys_are_distinct() {
        let a1 = Square::from_index(0).unwrap();
        let b1 = Square::from_index(1).unwrap();
        let white_rook = Piece::new(PieceType::Rook, Color::White);
        let black_rook = Piece::new(PieceType::Rook, Color::Black);

        assert_ne!(KEYS.piece_square(white_rook, a1), KEYS.piece_square(white_rook, b1));
        assert_ne!(KEYS.piece_square(white_rook, a1), KEYS.piece_square(black_rook, a1));
        assert_ne!(KEYS.side_to_move(Color::Black), 0);
        assert_eq!(KEYS.en_passant(None), 0);
        assert_ne!(
            KEYS.castling(CastlingRights::all()),
            KEYS.castling(CastlingRights::none())
        );
    }
}
