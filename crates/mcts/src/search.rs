//! Monte Carlo Tree Search implementation.
//!
//! Each simulated descent walks expanded nodes by PUCT selection, expands
//! the first unseen state with a single predictor evaluation, and folds the
//! returned value back up the path as a running mean. Values are always
//! expressed from the perspective of the node currently acting: every level
//! of the recursion negates the value it passes to its caller, a convention
//! inherited from the two-player search formulation and load-bearing here.

use cascade_core::{
    Action, Board, Environment, PiecePair, Policy, Predictor, StateKey, TransitionMode,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::config::MctsConfig;
use crate::node::NodeStats;

/// Smoothing added per legal action when summing visit counts for the
/// exploration term, so the bonus is non-zero at a freshly expanded node.
const VISIT_SMOOTHING: f32 = 1e-8;

/// Hash-keyed PUCT search engine.
///
/// All statistics (per-state visit/value/prior records and the terminal
/// cache) are scoped to one `Mcts` value. The self-play controller creates
/// a fresh engine per episode so statistics never leak across episodes.
pub struct Mcts {
    config: MctsConfig,
    nodes: FxHashMap<StateKey, NodeStats>,
    terminal: FxHashMap<StateKey, f32>,
    rng: ChaCha8Rng,
}

impl Mcts {
    /// Create a new engine. The generator drives simulation piece pairs and
    /// action sampling; seed it explicitly for reproducible searches.
    pub fn new(config: MctsConfig, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            nodes: FxHashMap::default(),
            terminal: FxHashMap::default(),
            rng,
        }
    }

    /// Run the configured number of simulated descents from `root`.
    pub fn run_search<E: Environment, P: Predictor>(
        &mut self,
        env: &mut E,
        predictor: &P,
        root: &Board,
    ) {
        for _ in 0..self.config.num_simulations {
            self.search(env, predictor, root, 0);
        }
    }

    /// One simulated descent from `board` at the given recursion depth.
    ///
    /// Returns the search value of `board` from the perspective of the side
    /// acting at `board`'s parent (hence the negations below). Exceeding the
    /// depth ceiling returns a neutral 0.0 without mutating statistics.
    pub fn search<E: Environment, P: Predictor>(
        &mut self,
        env: &mut E,
        predictor: &P,
        board: &Board,
        depth: u32,
    ) -> f32 {
        if depth > self.config.max_depth {
            return 0.0;
        }

        let key = env.state_key(board);

        if let Some(&cached) = self.terminal.get(&key) {
            return cached;
        }
        if let Some(reward) = env.terminal_reward(board) {
            let value = -reward;
            self.terminal.insert(key, value);
            return value;
        }

        // First visit: expand, evaluate once, and stop descending.
        if !self.nodes.contains_key(&key) {
            return self.expand(env, predictor, board, key);
        }

        let mask = env.valid_moves(board);
        let selected = self
            .nodes
            .get(&key)
            .and_then(|node| select_puct(node, &mask, self.config.c_puct));
        let Some(action_index) = selected else {
            // Expanded but nothing playable: dead end.
            self.terminal.insert(key, -1.0);
            return -1.0;
        };

        let action = Action::from_index(action_index, board.width())
            .expect("BUG: selected action index out of range");
        let pair = PiecePair::random(&mut self.rng);

        let next = match env.transition(board, action, pair, TransitionMode::Simulation) {
            Ok(transition) => transition.board,
            Err(error) => {
                warn!(%error, "simulation transition failed, treating state as dead end");
                self.terminal.insert(key, -1.0);
                return -1.0;
            }
        };

        // A transition that does not change the state hash can recurse
        // forever; close the node instead.
        if env.state_key(&next) == key {
            self.terminal.insert(key, -1.0);
            return -1.0;
        }

        let value = self.search(env, predictor, &next, depth + 1);

        let node = self
            .nodes
            .get_mut(&key)
            .expect("BUG: expanded node vanished during descent");
        node.record(action_index, value);

        -value
    }

    fn expand<E: Environment, P: Predictor>(
        &mut self,
        env: &E,
        predictor: &P,
        board: &Board,
        key: StateKey,
    ) -> f32 {
        let mask = env.valid_moves(board);
        if !mask.iter().any(|&legal| legal) {
            self.terminal.insert(key, -1.0);
            return -1.0;
        }

        let eval = predictor.evaluate(board);
        let priors = match Policy::masked(&eval.policy, &mask) {
            Some(priors) => priors,
            None => {
                warn!("masked prior has no mass, falling back to uniform over legal actions");
                Policy::uniform_masked(&mask).expect("BUG: mask has legal actions")
            }
        };

        self.nodes.insert(key, NodeStats::new(priors.into_inner()));
        -eval.value.clamp(-1.0, 1.0)
    }

    /// Action distribution derived from root visit counts.
    ///
    /// Temperature 0 returns a one-hot vector at the most-visited action
    /// (uniform over legal actions when nothing has been visited);
    /// temperature > 0 raises counts to `1/temperature` and renormalizes.
    /// Degenerate results (NaN, zero sum) are replaced by the uniform
    /// fallback and reported as a warning.
    pub fn action_probabilities<E: Environment>(
        &self,
        env: &E,
        board: &Board,
        temperature: f32,
    ) -> Vec<f32> {
        let num_actions = env.num_actions();
        let key = env.state_key(board);
        let zeros;
        let counts: &[u32] = match self.nodes.get(&key) {
            Some(node) => node.visit_counts(),
            None => {
                zeros = vec![0u32; num_actions];
                &zeros
            }
        };
        let total: u64 = counts.iter().map(|&c| c as u64).sum();

        let mut probs = if temperature == 0.0 {
            if total > 0 {
                let mut best = 0;
                for (a, &c) in counts.iter().enumerate() {
                    if c > counts[best] {
                        best = a;
                    }
                }
                let mut out = vec![0.0; num_actions];
                out[best] = 1.0;
                out
            } else {
                self.uniform_fallback(env, board)
            }
        } else if total > 0 {
            let inv_t = 1.0 / temperature as f64;
            let powered: Vec<f64> = counts.iter().map(|&c| (c as f64).powf(inv_t)).collect();
            let sum: f64 = powered.iter().sum();
            if sum.is_finite() && sum > 0.0 {
                powered.iter().map(|&p| (p / sum) as f32).collect()
            } else {
                self.uniform_fallback(env, board)
            }
        } else {
            self.uniform_fallback(env, board)
        };

        let sum: f32 = probs.iter().sum();
        if probs.iter().any(|p| p.is_nan()) || sum == 0.0 {
            warn!(temperature, "invalid visit distribution, substituting uniform");
            probs = self.uniform_fallback(env, board);
        }

        probs
    }

    /// Run the simulation budget, then sample an action from the resulting
    /// greedy (temperature 0) distribution.
    pub fn choose_action<E: Environment, P: Predictor>(
        &mut self,
        env: &mut E,
        predictor: &P,
        board: &Board,
    ) -> usize {
        self.run_search(env, predictor, board);
        let probs = self.action_probabilities(env, board, 0.0);
        sample_from(&probs, &mut self.rng)
    }

    fn uniform_fallback<E: Environment>(&self, env: &E, board: &Board) -> Vec<f32> {
        let mask = env.valid_moves(board);
        match Policy::uniform_masked(&mask) {
            Some(policy) => policy.into_inner(),
            None => {
                let n = env.num_actions();
                vec![1.0 / n as f32; n]
            }
        }
    }

    /// Statistics for a state, if it has been expanded.
    pub fn node_stats(&self, key: &StateKey) -> Option<&NodeStats> {
        self.nodes.get(key)
    }

    /// Cached terminal value for a state, if it has been marked terminal.
    pub fn cached_terminal(&self, key: &StateKey) -> Option<f32> {
        self.terminal.get(key).copied()
    }

    /// Number of expanded states in this engine.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// PUCT selection over the legal actions of an expanded node:
/// `Q(s,a) + c_puct · P(s,a) · sqrt(Σ_b N(s,b)) / (1 + N(s,a))`.
/// Ties resolve to the first-encountered (lowest) action index.
fn select_puct(node: &NodeStats, mask: &[bool], c_puct: f32) -> Option<usize> {
    let mut total = 0.0f32;
    for (a, &legal) in mask.iter().enumerate() {
        if legal {
            total += node.visits(a) as f32 + VISIT_SMOOTHING;
        }
    }
    let sqrt_total = total.sqrt();

    let mut best: Option<(usize, f32)> = None;
    for (a, &legal) in mask.iter().enumerate() {
        if !legal {
            continue;
        }
        let exploration = c_puct * node.prior(a) * sqrt_total / (1.0 + node.visits(a) as f32);
        let score = node.q(a) + exploration;
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((a, score));
        }
    }

    best.map(|(a, _)| a)
}

/// Sample an index from a probability distribution by cumulative sum.
fn sample_from<R: Rng>(probs: &[f32], rng: &mut R) -> usize {
    let r: f32 = rng.gen();
    let mut cumulative = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        cumulative += p;
        if r < cumulative {
            return i;
        }
    }

    // Floating point slack: fall back to the last action with mass.
    probs.iter().rposition(|&p| p > 0.0).unwrap_or(0)
}
