//! Move-path enumeration for validating move generation and make/unmake.

use crate::game_state::GameState;
use crate::move_gen::generate_legal_moves;
use crate::types::Move;

/// Counts leaf nodes of the legal move tree to `depth` plies.
///
/// Walks the tree in place; `state` is unchanged on return.
pub fn perft(state: &mut GameState, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_legal_moves(state);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in moves.iter() {
        state.make_move(mv);
        nodes += perft(state, depth - 1);
        state.unmake_move(mv);
    }
    nodes
}

/// Per-root-move leaf counts, in move generation order.
pub fn perft_divide(state: &mut GameState, depth: u8) -> Vec<(Move, u64)> {
    let moves = generate_legal_moves(state);
    let mut results = Vec::with_capacity(moves.len());

    for mv in moves.iter() {
        state.make_move(mv);
        let nodes = perft(state, depth.saturating_sub(1));
        state.unmake_move(mv);
        results.push((mv, nodes));
    }

    results
}

/// Published leaf counts for the positions in [`crate::positions`].
pub mod expected {
    pub const STARTING: &[(u8, u64)] = &[(1, 20), (2, 400), (3, 8902), (4, 197_281)];
    pub const KIWIPETE: &[(u8, u64)] = &[(1, 48), (2, 2039), (3, 97_862)];
    pub const POSITION_3: &[(u8, u64)] = &[(1, 14), (2, 191), (3, 2812), (4, 43_238)];
    pub const POSITION_4: &[(u8, u64)] = &[(1, 6), (2, 264), (3, 9467)];
    pub const POSITION_5: &[(u8, u64)] = &[(1, 44), (2, 1486), (3, 62_379)];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::positions;

    fn check(fen: &str, table: &[(u8, u64)], max_depth: u8) {
        let mut state = GameState::from_fen(fen).unwrap();
        let original = state.clone();
        for &(depth, expected) in table.iter().filter(|(d, _)| *d <= max_depth) {
            assert_eq!(
                perft(&mut state, depth),
                expected,
                "perft({depth}) of {fen}"
            );
            assert_eq!(state, original, "perft({depth}) left {fen} modified");
        }
    }

    #[test]
    fn test_perft_starting_position() {
        check(positions::STARTING, expected::STARTING, 3);
    }

    #[test]
    fn test_perft_kiwipete() {
        check(positions::KIWIPETE, expected::KIWIPETE, 2);
    }

    #[test]
    fn test_perft_position_3() {
        check(positions::POSITION_3, expected::POSITION_3, 3);
    }

    #[test]
    fn test_perft_position_4() {
        check(positions::POSITION_4, expected::POSITION_4, 2);
    }

    #[test]
    fn test_perft_position_5() {
        check(positions::POSITION_5, expected::POSITION_5, 2);
    }

    #[test]
    fn test_perft_divide() {
        let mut state = GameState::new();
        let results = perft_divide(&mut state, 2);

        assert_eq!(results.len(), 20);
        assert!(results.iter().all(|(_, n)| *n == 20));
        assert_eq!(results.iter().map(|(_, n)| n).sum::<u64>(), 400);
    }
}
