//! Cascade Core - domain types and collaborator interfaces
//!
//! This crate provides the vocabulary shared by the search engine and the
//! self-play controller, plus the two interfaces the core consumes but does
//! not implement:
//!
//! - [`Environment`] - the game-board transition engine (possibly out of
//!   process), reached only through this trait
//! - [`Predictor`] - the learned policy/value estimator
//!
//! # Types
//!
//! - [`Board`] - H×W grid of cells (empty / piece color / obstacle)
//! - [`Action`] / [`Orientation`] - column + one of four placement geometries
//! - [`Policy`] - probability distribution over actions (sums to 1.0)
//! - [`Value`] - value estimate in [-1, 1]

mod action;
mod board;
mod env;
mod error;
mod predictor;
mod types;

pub use action::{Action, Orientation};
pub use board::{Board, StateKey, EMPTY, NUM_COLORS, OBSTACLE};
pub use env::{Environment, LossCause, PiecePair, Transition, TransitionMode};
pub use error::{CascadeError, Result};
pub use predictor::{Evaluation, Predictor, UniformPredictor};
pub use types::{Policy, Value};
