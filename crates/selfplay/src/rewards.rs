//! Reward shaping and return computation.
//!
//! Immediate rewards favor chains and survival; overflow penalties are
//! asymmetric in both timing (dying fast costs more) and cause (dying by
//! one's own placement costs more than dying to an obstacle). At episode
//! end the whole trace is discounted backward from a terminal bonus, then
//! normalized and squashed into (-1, 1) value targets.

use crate::EpisodeConfig;
use cascade_core::LossCause;

/// Immediate shaped reward for one move: score delta, chain bonus for
/// chains of at least `chain_bonus_min`, and the flat survival bonus.
pub fn step_reward(config: &EpisodeConfig, score_delta: i64, chains: u32) -> f64 {
    let chain_bonus = if chains >= config.chain_bonus_min {
        config.chain_bonus_unit * (f64::from(chains) - 2.0)
    } else {
        0.0
    };
    score_delta as f64 + chain_bonus + config.survival_bonus
}

/// Penalty for a move that ended the episode by overflow at the given
/// true-step count.
///
/// Before the fast-death threshold the base penalty scales linearly from
/// `early_overflow_penalty` toward zero, with an extra flat component when
/// the overflow was self-inflicted. From the threshold on, only
/// self-inflicted overflows are penalized.
pub fn overflow_penalty(config: &EpisodeConfig, true_steps: u32, cause: LossCause) -> f64 {
    if true_steps < config.fast_death_threshold {
        let progress = f64::from(true_steps) / f64::from(config.fast_death_threshold);
        let mut penalty = config.early_overflow_penalty * (1.0 - progress);
        if cause == LossCause::SelfInflicted {
            penalty += config.self_overflow_penalty;
        }
        penalty
    } else if cause == LossCause::SelfInflicted {
        config.late_self_overflow_penalty
    } else {
        0.0
    }
}

/// One-time bonus folded into the return computation at episode end.
pub fn terminal_bonus(
    config: &EpisodeConfig,
    true_steps: u32,
    total_score: i64,
    chain_events: &[u32],
) -> f64 {
    let survival = config.step_bonus_weight * f64::from(true_steps);
    let score = config.score_bonus_weight * total_score as f64;
    let chain = if chain_events.is_empty() {
        0.0
    } else {
        let mean = chain_events.iter().map(|&c| f64::from(c)).sum::<f64>()
            / chain_events.len() as f64;
        let max = f64::from(*chain_events.iter().max().expect("non-empty"));
        config.mean_chain_weight * mean * mean + config.max_chain_weight * max * max
    };
    survival + score + chain
}

/// Discounted returns: walk the immediate-reward trace backward with
/// `G ← r + γ·G`, seeding the accumulator with the terminal bonus.
pub fn discounted_returns(config: &EpisodeConfig, rewards: &[f64], bonus: f64) -> Vec<f64> {
    if rewards.is_empty() {
        return Vec::new();
    }
    let mut returns = vec![0.0; rewards.len()];
    let mut acc = bonus;
    for (i, &r) in rewards.iter().enumerate().rev() {
        acc = r + config.gamma * acc;
        returns[i] = acc;
    }
    returns
}

/// Normalize returns to zero mean / unit variance (mean-subtraction only
/// when the standard deviation degenerates), then squash through
/// `tanh(scale · x)` so every target lands in (-1, 1).
pub fn normalize_and_squash(config: &EpisodeConfig, returns: &[f64]) -> Vec<f64> {
    if returns.is_empty() {
        return Vec::new();
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
    let std = variance.sqrt();

    returns
        .iter()
        .map(|&r| {
            let centered = if std > 1e-8 {
                (r - mean) / std
            } else {
                r - mean
            };
            (centered * config.squash_scale).tanh()
        })
        .collect()
}
