//! Test environments for search and self-play validation.
//!
//! The real board engine (chain resolution, obstacle scheduling) lives
//! outside this workspace; the environment here is a deliberately simple
//! stand-in that still exercises every interface the core consumes.

pub mod stacking;

pub use stacking::StackingEnv;
