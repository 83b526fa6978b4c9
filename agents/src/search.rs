//! Fixed-depth minimax with alpha-beta pruning.
//!
//! The search walks a single [`Position`] in place: every `apply` is followed
//! by the matching `undo` before the next sibling is tried, including when a
//! branch is cut off, so the caller gets its position back unchanged.
//!
//! Scores are always from the first side's point of view. The first side
//! maximizes and the second side minimizes.

use crate::evaluation::{Evaluator, Score, INFINITY};
use crate::game::Position;
use thiserror::Error;
use tracing::{debug, trace, trace_span, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("position has no legal moves")]
    NoLegalMoves,
}

/// The move chosen at the root and what the search learned about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult<M> {
    pub best_move: M,
    /// Minimax value of `best_move` at the searched depth.
    pub score: Score,
    pub depth: u8,
    /// Positions visited below the root.
    pub nodes: u64,
}

struct Searcher<'a, E> {
    evaluator: &'a E,
    nodes: u64,
}

impl<'a, E> Searcher<'a, E> {
    fn new(evaluator: &'a E) -> Self {
        Self {
            evaluator,
            nodes: 0,
        }
    }

    fn minimax<P>(
        &mut self,
        position: &mut P,
        depth: u8,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
    ) -> Score
    where
        P: Position,
        E: Evaluator<P>,
    {
        self.nodes += 1;

        if depth == 0 {
            return self.evaluator.evaluate(position);
        }

        // Moves are generated once; only rule draws are checked on top.
        let mut moves = position.legal_moves().into_iter().peekable();
        if moves.peek().is_none() || position.is_terminal_with_moves() {
            return self.evaluator.evaluate(position);
        }

        if maximizing {
            let mut best = -INFINITY;
            for mv in moves {
                position.apply(mv);
                let score = self.minimax(position, depth - 1, alpha, beta, false);
                position.undo(mv);

                best = best.max(score);
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let mut best = INFINITY;
            for mv in moves {
                position.apply(mv);
                let score = self.minimax(position, depth - 1, alpha, beta, true);
                position.undo(mv);

                best = best.min(score);
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }
}

/// Minimax value of `position` searched `depth` plies deep.
///
/// `maximizing` says whether the side to move at this node is the first
/// side. With `depth == 0` this is exactly `evaluator.evaluate(position)`.
pub fn minimax<P, E>(
    position: &mut P,
    depth: u8,
    alpha: Score,
    beta: Score,
    maximizing: bool,
    evaluator: &E,
) -> Score
where
    P: Position,
    E: Evaluator<P>,
{
    Searcher::new(evaluator).minimax(position, depth, alpha, beta, maximizing)
}

/// Picks the best move for the side to move and reports its score.
///
/// Moves are tried in the order `legal_moves` returns them and only a
/// strictly better score replaces the current best, so ties go to the
/// earliest move. A `depth` of 0 is treated as 1: every root move is
/// applied and its child evaluated statically.
///
/// Returns [`SearchError::NoLegalMoves`] if the position has no moves.
pub fn search_root<P, E>(
    position: &mut P,
    depth: u8,
    evaluator: &E,
) -> Result<SearchResult<P::Move>, SearchError>
where
    P: Position,
    E: Evaluator<P>,
{
    let span = trace_span!("search_root", depth);
    let _guard = span.enter();

    let mut moves = position.legal_moves().into_iter().peekable();
    let Some(&first) = moves.peek() else {
        debug!("No legal moves");
        return Err(SearchError::NoLegalMoves);
    };

    // The side comes from the position itself, never from the caller.
    let maximizing = position.side_to_move().is_maximizer();
    let child_depth = depth.saturating_sub(1);
    let mut searcher = Searcher::new(evaluator);

    let mut alpha = -INFINITY;
    let mut beta = INFINITY;
    let mut best_score = if maximizing { -INFINITY } else { INFINITY };
    let mut best_move = None;

    for mv in moves {
        position.apply(mv);
        let score = searcher.minimax(position, child_depth, alpha, beta, !maximizing);
        position.undo(mv);
        trace!("{mv}: {score}");

        let improves = if maximizing {
            score > best_score
        } else {
            score < best_score
        };
        if improves {
            best_score = score;
            best_move = Some(mv);
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
        }
        if beta <= alpha {
            break;
        }
    }

    let best_move = best_move.unwrap_or_else(|| {
        warn!("No root move improved on the initial bound, using {first}");
        first
    });

    debug!(
        "depth {} best {} score {} nodes {}",
        depth, best_move, best_score, searcher.nodes
    );

    Ok(SearchResult {
        best_move,
        score: best_score,
        depth,
        nodes: searcher.nodes,
    })
}

/// The best move for the side to move, searched `depth` plies deep.
pub fn best_move<P, E>(position: &mut P, depth: u8, evaluator: &E) -> Result<P::Move, SearchError>
where
    P: Position,
    E: Evaluator<P>,
{
    search_root(position, depth, evaluator).map(|result| result.best_move)
}
