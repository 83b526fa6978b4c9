use crate::{
    evaluation::MaterialEvaluator,
    search::{search_root, SearchError, SearchResult},
    Agent,
};
use autochess_core::{GameState, Move};

/// Plays the minimax move at a fixed depth.
pub struct MinimaxAgent {
    name: String,
    depth: u8,
    evaluator: MaterialEvaluator,
}

impl MinimaxAgent {
    pub fn new(depth: u8) -> Self {
        Self::with_evaluator(depth, MaterialEvaluator::default())
    }

    pub fn with_evaluator(depth: u8, evaluator: MaterialEvaluator) -> Self {
        MinimaxAgent {
            name: format!("Minimax(depth={})", depth),
            depth,
            evaluator,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn evaluator(&self) -> &MaterialEvaluator {
        &self.evaluator
    }
}

impl Agent for MinimaxAgent {
    fn best_move(&mut self, state: &mut GameState) -> Result<SearchResult<Move>, SearchError> {
        search_root(state, self.depth, &self.evaluator)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_name() {
        assert_eq!(MinimaxAgent::new(3).name(), "Minimax(depth=3)");
    }

    #[test]
    fn test_agent_plays_legal_moves() {
        let mut agent = MinimaxAgent::new(2);
        let mut state = GameState::new();

        for _ in 0..6 {
            let before = state.clone();
            let result = agent.best_move(&mut state).unwrap();
            assert_eq!(state, before);
            assert_eq!(result.depth, 2);
            assert!(autochess_core::generate_legal_moves(&state).contains(&result.best_move));
            state.make_move(result.best_move);
        }
    }
}
