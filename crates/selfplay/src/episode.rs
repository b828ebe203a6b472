//! The self-play episode controller.
//!
//! One episode: search, sample, transition, shape, repeat - then convert
//! the reward trace into training targets. The controller is infallible;
//! every failure mode degrades to a defined fallback so an episode always
//! produces its examples and summary.

use crate::{rewards, EpisodeConfig};
use cascade_core::{
    Action, Board, Environment, PiecePair, Policy, Predictor, Transition, TransitionMode, Value,
};
use cascade_mcts::Mcts;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

/// One training tuple: post-move board, masked search distribution, and the
/// squashed return target filled in at episode end.
#[derive(Clone, Debug)]
pub struct TrainingExample {
    pub board: Board,
    pub policy: Policy,
    pub value: Value,
}

/// Why the episode ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Termination {
    /// The loss column overflowed.
    Loss,
    /// The true-step limit forced termination.
    StepLimit,
}

/// Aggregate statistics for one episode.
#[derive(Clone, Debug)]
pub struct EpisodeSummary {
    pub total_score: i64,
    pub chain_events: Vec<u32>,
    pub true_steps: u32,
    pub max_chain: u32,
    pub mean_chain: f64,
    pub termination: Termination,
}

impl EpisodeSummary {
    fn new(
        total_score: i64,
        chain_events: Vec<u32>,
        true_steps: u32,
        termination: Termination,
    ) -> Self {
        let max_chain = chain_events.iter().copied().max().unwrap_or(0);
        let mean_chain = if chain_events.is_empty() {
            0.0
        } else {
            chain_events.iter().map(|&c| f64::from(c)).sum::<f64>() / chain_events.len() as f64
        };
        Self {
            total_score,
            chain_events,
            true_steps,
            max_chain,
            mean_chain,
            termination,
        }
    }
}

/// Drives full self-play episodes against an environment and predictor.
pub struct EpisodeController<E, P> {
    env: E,
    predictor: P,
    config: EpisodeConfig,
    rng: ChaCha8Rng,
}

impl<E: Environment, P: Predictor> EpisodeController<E, P> {
    pub fn new(env: E, predictor: P, config: EpisodeConfig, seed: u64) -> Self {
        Self {
            env,
            predictor,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Play one episode to termination.
    ///
    /// Returns the training tuples (two per move, a mirror pair sharing one
    /// return target) and the episode summary. Never fails: see the crate
    /// docs for the degradation rules.
    pub fn run_episode(&mut self) -> (Vec<TrainingExample>, EpisodeSummary) {
        // A fresh engine per episode; search statistics never leak across
        // episode boundaries.
        let engine_seed: u64 = self.rng.gen();
        let mut engine = Mcts::new(
            self.config.search.clone(),
            ChaCha8Rng::seed_from_u64(engine_seed),
        );

        let mut board = self.env.reset();
        let mut pair = PiecePair::random(&mut self.rng);

        let mut placements: u32 = 0;
        let mut true_steps: u32 = 0;
        let mut total_score: i64 = 0;
        let mut chain_events: Vec<u32> = Vec::new();
        let mut step_rewards: Vec<f64> = Vec::new();
        let mut pending: Vec<(Board, Policy)> = Vec::new();

        loop {
            engine.run_search(&mut self.env, &self.predictor, &board);

            // Exploration anneals to exploitation as the episode matures.
            let temperature = if placements <= self.config.temperature_threshold {
                1.0
            } else {
                0.0
            };
            let visit_probs = engine.action_probabilities(&self.env, &board, temperature);

            // Defense in depth: re-mask the search distribution before
            // sampling so illegal actions carry exactly zero mass.
            let mask = self.env.valid_moves(&board);
            let pi = masked_distribution(&visit_probs, &mask);

            let action_index = pi.sample(&mut self.rng);
            let action = Action::from_index(action_index, board.width())
                .expect("BUG: sampled action index out of range");

            let before = board.clone();
            let result = match self.env.transition(&board, action, pair, TransitionMode::Play) {
                Ok(transition) => transition,
                Err(error) => {
                    warn!(%error, "real transition failed, keeping prior state");
                    Transition::unchanged(before.clone())
                }
            };
            board = result.board;

            let placed = board.placed_cells_since(&before);
            placements += 1;
            true_steps += 1;
            if !result.obstacle_columns.is_empty() {
                // An obstacle drop is a separate true step.
                true_steps += 1;
            }

            let cause = self
                .env
                .loss_cause(&board, &result.obstacle_columns, &placed);

            let mut reward = rewards::step_reward(&self.config, result.score_delta, result.chains);
            if let Some(cause) = cause {
                if true_steps <= self.config.step_limit {
                    reward += rewards::overflow_penalty(&self.config, true_steps, cause);
                }
            }

            let mirrored_board = board.mirrored();
            let mirrored_pi = mirror_policy(&pi, board.width());
            pending.push((board.clone(), pi));
            pending.push((mirrored_board, mirrored_pi));
            step_rewards.push(reward);

            if cause.is_some() {
                debug!(true_steps, total_score, "episode terminated by overflow");
                return self.finish(
                    pending,
                    step_rewards,
                    total_score,
                    chain_events,
                    true_steps,
                    Termination::Loss,
                );
            }
            if true_steps >= self.config.step_limit {
                debug!(true_steps, total_score, "episode terminated by step limit");
                return self.finish(
                    pending,
                    step_rewards,
                    total_score,
                    chain_events,
                    true_steps,
                    Termination::StepLimit,
                );
            }

            if result.chains > 0 {
                chain_events.push(result.chains);
            }
            total_score += result.score_delta;
            pair = PiecePair::random(&mut self.rng);
        }
    }

    fn finish(
        &self,
        pending: Vec<(Board, Policy)>,
        step_rewards: Vec<f64>,
        total_score: i64,
        chain_events: Vec<u32>,
        true_steps: u32,
        termination: Termination,
    ) -> (Vec<TrainingExample>, EpisodeSummary) {
        let bonus = rewards::terminal_bonus(&self.config, true_steps, total_score, &chain_events);
        let raw = rewards::discounted_returns(&self.config, &step_rewards, bonus);
        let targets = rewards::normalize_and_squash(&self.config, &raw);

        let examples = if pending.len() == targets.len() * 2 {
            pending
                .into_iter()
                .enumerate()
                .map(|(i, (board, policy))| TrainingExample {
                    board,
                    policy,
                    // Mirror variants of one move share one target.
                    value: Value::from_tanh(targets[i / 2] as f32),
                })
                .collect()
        } else {
            warn!(
                examples = pending.len(),
                returns = targets.len(),
                "return/example count mismatch, assigning mean return"
            );
            let mean = if targets.is_empty() {
                0.0
            } else {
                targets.iter().sum::<f64>() / targets.len() as f64
            };
            pending
                .into_iter()
                .map(|(board, policy)| TrainingExample {
                    board,
                    policy,
                    value: Value::from_tanh(mean as f32),
                })
                .collect()
        };

        let summary = EpisodeSummary::new(total_score, chain_events, true_steps, termination);
        (examples, summary)
    }
}

/// Mask a search distribution by the legality mask and renormalize; an
/// all-zero result degrades to uniform-over-legal.
fn masked_distribution(probs: &[f32], mask: &[bool]) -> Policy {
    Policy::masked(probs, mask)
        .or_else(|| Policy::uniform_masked(mask))
        .unwrap_or_else(|| {
            warn!("no legal action available, sampling uniformly over all actions");
            Policy::uniform(probs.len().max(1)).expect("BUG: empty action space")
        })
}

/// Re-index a distribution through the left-right board reflection:
/// column `x → W−1−x`, right and left orientations swapped.
fn mirror_policy(pi: &Policy, width: usize) -> Policy {
    let mut out = vec![0.0f32; pi.len()];
    for (index, &p) in pi.as_slice().iter().enumerate() {
        let mirrored = Action::from_index(index, width)
            .expect("BUG: policy index out of action range")
            .mirrored(width)
            .index(width);
        out[mirrored] = p;
    }
    Policy::new(out).expect("BUG: mirrored policy is no longer a distribution")
}
