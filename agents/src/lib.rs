pub mod evaluation;
pub mod game;
pub mod minimax;
pub mod search;

use autochess_core::{GameState, Move};

/// Something that picks moves for the side to move.
pub trait Agent {
    /// Chooses a move. `state` is walked during the search and handed back
    /// unchanged.
    fn best_move(&mut self, state: &mut GameState) -> Result<SearchResult<Move>, SearchError>;

    fn name(&self) -> &str;
}

pub use evaluation::*;
pub use game::{Outcome, Position, Side};
pub use minimax::MinimaxAgent;
pub use search::*;
