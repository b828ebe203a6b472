//! Self-play episode controller for cascade.
//!
//! Drives one episode at a time: repeated MCTS searches move-by-move, real
//! transitions through the environment adapter, asymmetric reward shaping,
//! and the conversion of the whole reward trace into discounted, normalized,
//! squashed training targets.
//!
//! The controller never fails: numeric degeneracy, adapter failures and
//! accounting mismatches all degrade to defined fallbacks, so a transient
//! environment hiccup can shorten or pad an episode but never abort it.

mod config;
mod episode;
mod rewards;

pub use config::EpisodeConfig;
pub use episode::{EpisodeController, EpisodeSummary, Termination, TrainingExample};
