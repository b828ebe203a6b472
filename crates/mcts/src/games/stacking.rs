//! Two-cell gravity-stacking environment for validation.
//!
//! Pieces stack in their target columns without clearing, so no chains ever
//! fire; every placement is worth a flat score. What it does model
//! faithfully: the placement legality rules, the center-column loss rule
//! with self/obstacle attribution, and a periodic obstacle drop that only
//! advances in [`TransitionMode::Play`].

use cascade_core::{
    Action, Board, CascadeError, Environment, LossCause, Orientation, PiecePair, StateKey,
    Transition, TransitionMode, OBSTACLE,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Score awarded per placement.
const PLACEMENT_SCORE: i64 = 10;

/// Simplified falling-block environment.
pub struct StackingEnv {
    height: usize,
    width: usize,
    loss_column: usize,
    /// Drop obstacles every this many real placements; 0 disables drops.
    obstacle_period: u32,
    /// Number of obstacle cells per drop.
    obstacle_cells: u32,
    placements: u32,
    rng: ChaCha8Rng,
}

impl StackingEnv {
    /// Environment with the standard 14×6 board and a gentle obstacle
    /// schedule.
    pub fn standard(seed: u64) -> Self {
        Self::new(Board::DEFAULT_HEIGHT, Board::DEFAULT_WIDTH, seed)
    }

    pub fn new(height: usize, width: usize, seed: u64) -> Self {
        Self {
            height,
            width,
            loss_column: width / 3,
            obstacle_period: 4,
            obstacle_cells: 2,
            placements: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Override the obstacle schedule; a period of 0 disables drops.
    pub fn with_obstacle_period(mut self, period: u32, cells: u32) -> Self {
        self.obstacle_period = period;
        self.obstacle_cells = cells;
        self
    }

    pub fn loss_column(&self) -> usize {
        self.loss_column
    }

    /// Highest column height that still accepts a placement.
    fn stack_limit(&self) -> usize {
        self.height - 3
    }

    /// Column height at or above which the loss column overflows.
    fn loss_height(&self) -> usize {
        self.height - 2
    }

    fn is_lost(&self, board: &Board) -> bool {
        board.column_height(self.loss_column) >= self.loss_height()
    }

    /// Target cells for a placement: (row, column, color) triples.
    fn placement_cells(
        &self,
        board: &Board,
        action: Action,
        pair: PiecePair,
    ) -> Result<[(usize, usize, i8); 2], CascadeError> {
        let col = action.column;
        let cells = match action.orientation {
            Orientation::Up => {
                let h = board.column_height(col);
                [(h, col, pair.first), (h + 1, col, pair.second)]
            }
            Orientation::Down => {
                let h = board.column_height(col);
                [(h, col, pair.second), (h + 1, col, pair.first)]
            }
            Orientation::Right => {
                if col + 1 >= self.width {
                    return Err(CascadeError::InvalidPlacement {
                        action: action.index(self.width),
                        column: col,
                    });
                }
                let h = board.column_height(col);
                let h_right = board.column_height(col + 1);
                [(h, col, pair.first), (h_right, col + 1, pair.second)]
            }
            Orientation::Left => {
                if col == 0 {
                    return Err(CascadeError::InvalidPlacement {
                        action: action.index(self.width),
                        column: col,
                    });
                }
                let h = board.column_height(col);
                let h_left = board.column_height(col - 1);
                [(h, col, pair.first), (h_left, col - 1, pair.second)]
            }
        };

        for &(row, column, _) in &cells {
            if row >= self.height {
                return Err(CascadeError::InvalidPlacement {
                    action: action.index(self.width),
                    column,
                });
            }
        }
        Ok(cells)
    }
}

impl Environment for StackingEnv {
    fn reset(&mut self) -> Board {
        self.placements = 0;
        Board::new(self.height, self.width)
    }

    fn num_actions(&self) -> usize {
        Action::num_actions(self.width)
    }

    fn valid_moves(&self, board: &Board) -> Vec<bool> {
        let mut valid = vec![false; self.num_actions()];
        let limit = self.stack_limit();
        for col in 0..self.width {
            let h = board.column_height(col);
            if h <= limit {
                valid[col] = true;
                valid[col + 2 * self.width] = true;
            }
            if col + 1 < self.width && h <= limit && board.column_height(col + 1) <= limit {
                valid[col + self.width] = true;
            }
            if col > 0 && h <= limit && board.column_height(col - 1) <= limit {
                valid[col + 3 * self.width] = true;
            }
        }
        valid
    }

    fn transition(
        &mut self,
        board: &Board,
        action: Action,
        pair: PiecePair,
        mode: TransitionMode,
    ) -> Result<Transition, CascadeError> {
        let cells = self.placement_cells(board, action, pair)?;
        let mut next = board.clone();
        for (row, col, color) in cells {
            next.set(row, col, color);
        }

        // An overflowing placement ends the game before any obstacle lands.
        if self.is_lost(&next) {
            return Ok(Transition {
                board: next,
                score_delta: PLACEMENT_SCORE,
                chains: 0,
                obstacle_columns: Vec::new(),
            });
        }

        let mut obstacle_columns = Vec::new();
        if mode == TransitionMode::Play {
            self.placements += 1;
            if self.obstacle_period > 0 && self.placements % self.obstacle_period == 0 {
                let mut columns: Vec<usize> = (0..self.width).collect();
                columns.shuffle(&mut self.rng);
                for &col in columns.iter().take(self.obstacle_cells as usize) {
                    let h = next.column_height(col);
                    if h < self.height - 1 {
                        next.set(h, col, OBSTACLE);
                        obstacle_columns.push(col);
                    }
                }
            }
        }

        Ok(Transition {
            board: next,
            score_delta: PLACEMENT_SCORE,
            chains: 0,
            obstacle_columns,
        })
    }

    fn terminal_reward(&self, board: &Board) -> Option<f32> {
        if self.is_lost(board) {
            Some(-1.0)
        } else {
            None
        }
    }

    fn loss_cause(
        &self,
        board: &Board,
        obstacle_columns: &[usize],
        placed_cells: &[(usize, usize)],
    ) -> Option<LossCause> {
        if !self.is_lost(board) {
            return None;
        }

        let self_place = placed_cells
            .iter()
            .any(|&(col, row)| col == self.loss_column && row >= self.stack_limit());
        if self_place {
            Some(LossCause::SelfInflicted)
        } else if obstacle_columns.contains(&self.loss_column) {
            Some(LossCause::ObstacleInflicted)
        } else {
            // Attribution guard: an overflow nobody claims counts against
            // the agent.
            Some(LossCause::SelfInflicted)
        }
    }

    fn state_key(&self, board: &Board) -> StateKey {
        board.content_key()
    }
}
