//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use crate::board::Board;
use crate::game_state::GameState;
use crate::types::{CastlingRights, Color, File, Piece, PieceType, Rank, Square};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("invalid FEN format: {0}")]
    InvalidFormat(String),
    #[error("invalid piece character: '{0}'")]
    InvalidPiece(char),
    #[error("invalid side to move: {0}")]
    InvalidColor(String),
    #[error("invalid castling rights: {0}")]
    InvalidCastling(String),
    #[error("invalid en passant square: {0}")]
    InvalidEnPassant(String),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("{0} must have exactly one king")]
    KingCount(Color),
}

impl GameState {
    /// Parses a six-field FEN record.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let [placement, side, castling, en_passant, halfmove, fullmove] = fields[..] else {
            return Err(FenError::InvalidFormat(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        };

        let board = parse_placement(placement)?;
        for color in Color::BOTH {
            if board.pieces(PieceType::King, color).count() != 1 {
                return Err(FenError::KingCount(color));
            }
        }

        let turn = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenError::InvalidColor(side.to_string())),
        };
        let castling = parse_castling(castling)?;
        let en_passant = parse_en_passant(en_passant)?;
        let halfmove_clock = halfmove
            .parse::<u16>()
            .map_err(|_| FenError::InvalidNumber(halfmove.to_string()))?;
        let fullmove_number = fullmove
            .parse::<u16>()
            .map_err(|_| FenError::InvalidNumber(fullmove.to_string()))?;

        Ok(GameState::from_parts(
            board,
            turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        ))
    }

    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            placement_to_fen(&self.board),
            if self.turn == Color::White { "w" } else { "b" },
            castling_to_fen(self.castling),
            self.en_passant
                .map_or_else(|| "-".to_string(), |sq| sq.to_string()),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl std::str::FromStr for GameState {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameState::from_fen(s)
    }
}

fn parse_placement(placement: &str) -> Result<Board, FenError> {
    let mut board = Board::empty();
    let ranks: Vec<&str> = placement.split('/').collect();

    if ranks.len() != 8 {
        return Err(FenError::InvalidFormat(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    // FEN lists rank 8 first.
    for (rank, rank_str) in (0..8u8).rev().filter_map(Rank::new).zip(ranks) {
        let mut file_idx = 0u8;

        let too_long =
            || FenError::InvalidFormat(format!("too many squares in rank {}", rank.to_char()));

        for ch in rank_str.chars() {
            if let Some(empty) = ch.to_digit(10) {
                file_idx = file_idx
                    .checked_add(empty as u8)
                    .filter(|&n| n <= 8)
                    .ok_or_else(too_long)?;
                continue;
            }
            let piece = Piece::from_char(ch).ok_or(FenError::InvalidPiece(ch))?;
            let file = File::new(file_idx).ok_or_else(too_long)?;
            board.put(Square::new(file, rank), piece);
            file_idx += 1;
        }

        if file_idx != 8 {
            return Err(FenError::InvalidFormat(format!(
                "rank {} has {} squares, expected 8",
                rank.to_char(),
                file_idx
            )));
        }
    }

    Ok(board)
}

fn placement_to_fen(board: &Board) -> String {
    let mut fen = String::new();

    for rank in (0..8u8).rev().filter_map(Rank::new) {
        let mut empty = 0;
        for file in (0..8u8).filter_map(File::new) {
            match board.piece_at(Square::new(file, rank)) {
                Some(piece) => {
                    if empty > 0 {
                        fen.push_str(&empty.to_string());
                        empty = 0;
                    }
                    fen.push(piece.to_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            fen.push_str(&empty.to_string());
        }
        if rank != Rank::FIRST {
            fen.push('/');
        }
    }

    fen
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    if field == "-" {
        return Ok(CastlingRights::none());
    }

    field.chars().try_fold(CastlingRights::none(), |rights, ch| {
        let flag = match ch {
            'K' => CastlingRights::WHITE_KINGSIDE,
            'Q' => CastlingRights::WHITE_QUEENSIDE,
            'k' => CastlingRights::BLACK_KINGSIDE,
            'q' => CastlingRights::BLACK_QUEENSIDE,
            _ => return Err(FenError::InvalidCastling(field.to_string())),
        };
        Ok(rights.with(flag))
    })
}

fn castling_to_fen(castling: CastlingRights) -> String {
    let s: String = [
        (CastlingRights::WHITE_KINGSIDE, 'K'),
        (CastlingRights::WHITE_QUEENSIDE, 'Q'),
        (CastlingRights::BLACK_KINGSIDE, 'k'),
        (CastlingRights::BLACK_QUEENSIDE, 'q'),
    ]
    .iter()
    .filter(|(flag, _)| castling.has(*flag))
    .map(|(_, c)| c)
    .collect();

    if s.is_empty() {
        "-".to_string()
    } else {
        s
    }
}

fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    field
        .parse::<Square>()
        .map(Some)
        .map_err(|_| FenError::InvalidEnPassant(field.to_string()))
}

/// Well-known positions.
pub mod positions {
    pub const STARTING: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Dense middlegame exercising castling, en passant and promotions.
    pub const KIWIPETE: &str =
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    pub const AFTER_E4_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2";

    /// Rook-and-pawn endgame with en passant and check subtleties.
    pub const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

    pub const POSITION_4: &str =
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";

    pub const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_starting_position() {
        let state = GameState::from_fen(positions::STARTING).unwrap();
        assert_eq!(state, GameState::new());
        assert_eq!(state.to_fen(), positions::STARTING);
    }

    #[test]
    fn test_round_trip() {
        for fen in [
            positions::KIWIPETE,
            positions::AFTER_E4_E5,
            positions::POSITION_3,
            positions::POSITION_4,
            positions::POSITION_5,
        ] {
            assert_eq!(GameState::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_parse_kiwipete() {
        let state: GameState = positions::KIWIPETE.parse().unwrap();
        let e1: Square = "e1".parse().unwrap();
        assert_eq!(
            state.board.piece_at(e1),
            Some(Piece::new(PieceType::King, Color::White))
        );
        assert_eq!(state.castling, CastlingRights::all());
    }

    #[test]
    fn test_parse_en_passant() {
        let state = GameState::from_fen(positions::AFTER_E4_E5).unwrap();
        assert_eq!(state.en_passant, Some("e6".parse().unwrap()));
    }

    #[test]
    fn test_fen_after_moves() {
        let mut state = GameState::new();
        state.make_move("e2e4".parse().unwrap());
        assert_eq!(
            state.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn test_invalid_fen() {
        assert!(matches!(
            GameState::from_fen("invalid"),
            Err(FenError::InvalidFormat(_))
        ));
        assert_eq!(
            GameState::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"),
            Err(FenError::InvalidColor("x".to_string()))
        );
        assert_eq!(
            GameState::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1"),
            Err(FenError::InvalidPiece('X'))
        );
        assert!(GameState::from_fen("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1").is_err());
        assert_eq!(
            GameState::from_fen("8/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenError::KingCount(Color::Black))
        );
    }

    #[test]
    fn test_long_empty_run_is_rejected() {
        let rank = "9".repeat(29);
        let fen = format!("{rank}/8/8/8/8/8/8/K6k w - - 0 1");
        assert!(matches!(
            GameState::from_fen(&fen),
            Err(FenError::InvalidFormat(_))
        ));
        assert!(matches!(
            GameState::from_fen("44k/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenError::InvalidFormat(_))
        ));
    }
}
