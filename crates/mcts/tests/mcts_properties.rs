//! Property-based tests for the MCTS engine.
//!
//! These verify the distribution invariants over arbitrary reachable
//! positions: length and sum, zero mass on illegal actions, NaN-freedom at
//! every temperature including degenerate zero-visit roots, and determinism
//! under a fixed seed.

use cascade_core::{Action, Board, Environment, PiecePair, TransitionMode, UniformPredictor};
use cascade_mcts::{games::StackingEnv, Mcts, MctsConfig};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Tolerance for distribution sum validation.
const POLICY_SUM_TOLERANCE: f32 = 1e-5;

// =============================================================================
// Strategies for generating test inputs
// =============================================================================

fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Small simulation budgets for fast tests.
fn arb_simulations() -> impl Strategy<Value = usize> {
    5usize..40
}

/// Generate a reachable position by playing random legal moves.
fn arb_position() -> impl Strategy<Value = Board> {
    (0usize..12, arb_seed()).prop_map(|(num_moves, seed)| {
        let mut env = StackingEnv::standard(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut board = env.reset();

        for _ in 0..num_moves {
            if env.terminal_reward(&board).is_some() {
                break;
            }
            let mask = env.valid_moves(&board);
            let legal: Vec<usize> = mask
                .iter()
                .enumerate()
                .filter(|(_, &m)| m)
                .map(|(i, _)| i)
                .collect();
            if legal.is_empty() {
                break;
            }
            let index = legal[rand::Rng::gen_range(&mut rng, 0..legal.len())];
            let action = Action::from_index(index, board.width()).unwrap();
            let pair = PiecePair::random(&mut rng);
            match env.transition(&board, action, pair, TransitionMode::Play) {
                Ok(t) => board = t.board,
                Err(_) => break,
            }
        }

        board
    })
}

fn searched_engine(
    board: &Board,
    seed: u64,
    simulations: usize,
) -> (StackingEnv, Mcts) {
    let mut env = StackingEnv::standard(seed);
    let predictor = UniformPredictor::new(env.num_actions());
    let mut mcts = Mcts::new(
        MctsConfig::with_simulations(simulations),
        ChaCha8Rng::seed_from_u64(seed),
    );
    mcts.run_search(&mut env, &predictor, board);
    (env, mcts)
}

// =============================================================================
// Distribution invariants: length, sum, no NaN
// =============================================================================

proptest! {
    /// The visit distribution has length num_actions, sums to 1 (±1e-5) and
    /// carries no NaN, for every temperature including 0.
    #[test]
    fn prop_distribution_sums_to_one(
        seed in arb_seed(),
        simulations in arb_simulations(),
        board in arb_position()
    ) {
        let (env, mcts) = searched_engine(&board, seed, simulations);

        for temperature in [0.0f32, 0.5, 1.0, 2.0] {
            let probs = mcts.action_probabilities(&env, &board, temperature);
            prop_assert_eq!(probs.len(), env.num_actions());
            prop_assert!(probs.iter().all(|p| !p.is_nan()));

            let sum: f32 = probs.iter().sum();
            prop_assert!(
                (sum - 1.0).abs() < POLICY_SUM_TOLERANCE,
                "sum {} at temperature {}",
                sum,
                temperature
            );
        }
    }

    /// Probability mass never lands on an illegal action.
    #[test]
    fn prop_distribution_only_legal_mass(
        seed in arb_seed(),
        simulations in arb_simulations(),
        board in arb_position()
    ) {
        let (env, mcts) = searched_engine(&board, seed, simulations);
        let mask = env.valid_moves(&board);

        for temperature in [0.0f32, 1.0] {
            let probs = mcts.action_probabilities(&env, &board, temperature);
            for (i, &legal) in mask.iter().enumerate() {
                if !legal {
                    prop_assert!(
                        probs[i] == 0.0,
                        "mass {} on illegal action {} at temperature {}",
                        probs[i],
                        i,
                        temperature
                    );
                }
            }
        }
    }

    /// A root with zero visits (no search run) still yields a valid
    /// distribution at every temperature.
    #[test]
    fn prop_zero_visit_distribution_is_valid(
        seed in arb_seed(),
        board in arb_position()
    ) {
        let env = StackingEnv::standard(seed);
        let mcts = Mcts::new(MctsConfig::default(), ChaCha8Rng::seed_from_u64(seed));

        for temperature in [0.0f32, 0.5, 1.0] {
            let probs = mcts.action_probabilities(&env, &board, temperature);
            prop_assert_eq!(probs.len(), env.num_actions());
            let sum: f32 = probs.iter().sum();
            prop_assert!((sum - 1.0).abs() < POLICY_SUM_TOLERANCE);
            prop_assert!(probs.iter().all(|p| !p.is_nan()));
        }
    }
}

// =============================================================================
// Sampled actions satisfy the legality mask
// =============================================================================

proptest! {
    #[test]
    fn prop_chosen_action_is_legal(
        seed in arb_seed(),
        simulations in arb_simulations(),
        board in arb_position()
    ) {
        let mut env = StackingEnv::standard(seed);
        if env.terminal_reward(&board).is_some() {
            return Ok(());
        }

        let predictor = UniformPredictor::new(env.num_actions());
        let mut mcts = Mcts::new(
            MctsConfig::with_simulations(simulations),
            ChaCha8Rng::seed_from_u64(seed),
        );

        let action = mcts.choose_action(&mut env, &predictor, &board);
        let mask = env.valid_moves(&board);
        prop_assert!(action < mask.len());
        prop_assert!(mask[action], "chose illegal action {}", action);
    }
}

// =============================================================================
// Determinism
// =============================================================================

proptest! {
    /// The same seed produces identical search results.
    #[test]
    fn prop_deterministic(
        seed in arb_seed(),
        simulations in arb_simulations(),
        board in arb_position()
    ) {
        let run = |temperature: f32| {
            let (env, mcts) = searched_engine(&board, seed, simulations);
            mcts.action_probabilities(&env, &board, temperature)
        };

        prop_assert_eq!(run(1.0), run(1.0));
        prop_assert_eq!(run(0.0), run(0.0));
    }
}
