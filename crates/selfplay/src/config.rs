//! Episode controller configuration.
//!
//! The shaping constants are hand-tuned; defaults reproduce the tuning the
//! policies were trained with, so change them deliberately.

use cascade_mcts::MctsConfig;

/// Configuration for one self-play episode.
#[derive(Clone, Debug)]
pub struct EpisodeConfig {
    /// Search configuration used for every move.
    pub search: MctsConfig,

    /// Move index (0-based placement count) up to and including which the
    /// selection temperature is 1; later moves use temperature 0.
    pub temperature_threshold: u32,

    /// True-step count (placements plus obstacle-drop events) at which the
    /// episode is forced to end.
    pub step_limit: u32,

    /// True-step count below which an overflow counts as a fast death and
    /// draws the scaled early penalty.
    pub fast_death_threshold: u32,

    /// Flat bonus per move for staying alive.
    pub survival_bonus: f64,

    /// Bonus per chain link beyond two, awarded from this chain count up.
    pub chain_bonus_unit: f64,
    pub chain_bonus_min: u32,

    /// Scaled penalty base for overflowing before `fast_death_threshold`:
    /// ranges from this value toward 0 as the threshold approaches.
    pub early_overflow_penalty: f64,

    /// Extra penalty when a fast death was the agent's own doing.
    pub self_overflow_penalty: f64,

    /// Flat penalty for a self-inflicted overflow at or past
    /// `fast_death_threshold`.
    pub late_self_overflow_penalty: f64,

    /// Terminal bonus weights: survival length, cumulative score, and the
    /// squared mean/max chain shaping terms.
    pub step_bonus_weight: f64,
    pub score_bonus_weight: f64,
    pub mean_chain_weight: f64,
    pub max_chain_weight: f64,

    /// Discount factor for the backward return accumulation.
    pub gamma: f64,

    /// Scale applied inside the final tanh squash.
    pub squash_scale: f64,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            search: MctsConfig::default(),
            temperature_threshold: 10,
            step_limit: 100,
            fast_death_threshold: 50,
            survival_bonus: 5.0,
            chain_bonus_unit: 250.0,
            chain_bonus_min: 3,
            early_overflow_penalty: -1000.0,
            self_overflow_penalty: -750.0,
            late_self_overflow_penalty: -500.0,
            step_bonus_weight: 2.0,
            score_bonus_weight: 0.05,
            mean_chain_weight: 10.0,
            max_chain_weight: 30.0,
            gamma: 0.99,
            squash_scale: 0.5,
        }
    }
}

impl EpisodeConfig {
    /// Create a config with the given search simulation budget.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            search: MctsConfig::with_simulations(num_simulations),
            ..Default::default()
        }
    }

    /// Set the forced-termination step limit.
    pub fn with_step_limit(mut self, step_limit: u32) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Set the exploration temperature threshold.
    pub fn with_temperature_threshold(mut self, threshold: u32) -> Self {
        self.temperature_threshold = threshold;
        self
    }
}
