//! Monte Carlo Tree Search for cascade.
//!
//! This crate provides the search half of the self-play core: a hash-keyed,
//! recursive PUCT search over any [`cascade_core::Environment`], evaluated
//! by any [`cascade_core::Predictor`].
//!
//! # Features
//!
//! - **Hash-keyed statistics**: per-state visit/value/prior records keyed
//!   by the environment's opaque state key; absence of a key IS the
//!   unexpanded state
//! - **PUCT selection**: running mean value plus prior-weighted
//!   exploration bonus
//! - **Cycle safety**: a hard depth ceiling and a no-op-transition guard
//!   bound every recursion
//! - **Graceful degeneracy**: invalid priors and degenerate visit
//!   distributions fall back to uniform-over-legal, never to a panic
//!
//! # Example
//!
//! ```
//! use cascade_mcts::{games::StackingEnv, Mcts, MctsConfig};
//! use cascade_core::{Environment, UniformPredictor};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut env = StackingEnv::standard(42);
//! let board = env.reset();
//! let predictor = UniformPredictor::new(env.num_actions());
//!
//! let config = MctsConfig::with_simulations(25);
//! let mut mcts = Mcts::new(config, ChaCha8Rng::seed_from_u64(42));
//!
//! let action = mcts.choose_action(&mut env, &predictor, &board);
//! assert!(action < env.num_actions());
//! ```

pub mod config;
pub mod games;
mod node;
pub mod search;

pub use config::MctsConfig;
pub use node::NodeStats;
pub use search::Mcts;
