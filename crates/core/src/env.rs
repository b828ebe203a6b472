//! Consumed environment interface.
//!
//! The game-board transition engine (piece placement, chain resolution,
//! obstacle drops) is an external collaborator, reached only through
//! [`Environment`]. Implementations may cross a process boundary inside
//! [`Environment::transition`]; such implementations own their timeout and
//! surface failure as an error. Callers degrade on error - a failed
//! transition never aborts a search or an episode.

use crate::{Action, Board, CascadeError, StateKey, NUM_COLORS};
use rand::Rng;

/// The two cell colors of a falling piece.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PiecePair {
    pub first: i8,
    pub second: i8,
}

impl PiecePair {
    pub fn new(first: i8, second: i8) -> Self {
        Self { first, second }
    }

    /// Draw a pair from the injected random source. Piece generation is
    /// never ambient: tests supply a seeded generator.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            first: rng.gen_range(1..=NUM_COLORS),
            second: rng.gen_range(1..=NUM_COLORS),
        }
    }
}

/// Whether a transition is a search-internal lookahead or a real move.
///
/// `Simulation` transitions must not mutate controller-visible obstacle
/// scheduling; `Play` transitions may.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransitionMode {
    Simulation,
    Play,
}

/// Result of applying one action.
#[derive(Clone, Debug)]
pub struct Transition {
    /// The board after placement, clears, and any obstacle drop.
    pub board: Board,
    /// Score gained by this move.
    pub score_delta: i64,
    /// Length of the cascading clear triggered by this move (0 = none).
    pub chains: u32,
    /// Columns that received an obstacle cell this move (empty if none).
    pub obstacle_columns: Vec<usize>,
}

impl Transition {
    /// The degraded transition used when the adapter fails or times out:
    /// the prior board unchanged, with zeroed score/chain/obstacle signals.
    pub fn unchanged(board: Board) -> Self {
        Self {
            board,
            score_delta: 0,
            chains: 0,
            obstacle_columns: Vec::new(),
        }
    }
}

/// Which side caused a terminal overflow.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LossCause {
    /// The agent's own placement overflowed the loss column.
    SelfInflicted,
    /// An obstacle drop overflowed the loss column.
    ObstacleInflicted,
}

/// The game-board transition engine, consumed but never implemented by the
/// search core.
///
/// Implementations must keep `valid_moves` consistent with `num_actions`
/// (`num_actions == 4 × board width`), and `transition` deterministic given
/// the same board, action and piece pair.
pub trait Environment {
    /// Start a new episode, resetting any obstacle scheduling state.
    fn reset(&mut self) -> Board;

    /// Size of the action space (length of masks and policy vectors).
    fn num_actions(&self) -> usize;

    /// Legality mask of length `num_actions`.
    fn valid_moves(&self, board: &Board) -> Vec<bool>;

    /// Apply an action with the given piece pair.
    ///
    /// The only operation that may block on I/O; failures and timeouts are
    /// reported as `Err`, and callers recover locally.
    fn transition(
        &mut self,
        board: &Board,
        action: Action,
        pair: PiecePair,
        mode: TransitionMode,
    ) -> Result<Transition, CascadeError>;

    /// `Some(value)` if the board is terminal, `None` otherwise.
    fn terminal_reward(&self, board: &Board) -> Option<f32>;

    /// Attribute a terminal overflow to the agent or an obstacle.
    ///
    /// `obstacle_columns` and `placed_cells` describe the move that produced
    /// `board`. Returns `None` while the board is not terminal.
    fn loss_cause(
        &self,
        board: &Board,
        obstacle_columns: &[usize],
        placed_cells: &[(usize, usize)],
    ) -> Option<LossCause>;

    /// Opaque comparable key for the board's content.
    fn state_key(&self, board: &Board) -> StateKey;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_piece_pair_colors_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let pair = PiecePair::random(&mut rng);
            assert!((1..=NUM_COLORS).contains(&pair.first));
            assert!((1..=NUM_COLORS).contains(&pair.second));
        }
    }

    #[test]
    fn test_unchanged_transition_is_zeroed() {
        let board = Board::standard();
        let t = Transition::unchanged(board.clone());
        assert_eq!(t.board, board);
        assert_eq!(t.score_delta, 0);
        assert_eq!(t.chains, 0);
        assert!(t.obstacle_columns.is_empty());
    }
}
