//! End-to-end episodes against the validation environment.

use cascade_core::{Environment, UniformPredictor};
use cascade_mcts::games::StackingEnv;
use cascade_selfplay::{
    EpisodeConfig, EpisodeController, EpisodeSummary, Termination, TrainingExample,
};

fn run_episode(seed: u64, simulations: usize) -> (Vec<TrainingExample>, EpisodeSummary) {
    let env = StackingEnv::standard(seed);
    let predictor = UniformPredictor::new(env.num_actions());
    let config = EpisodeConfig::with_simulations(simulations);
    let mut controller = EpisodeController::new(env, predictor, config, seed);
    controller.run_episode()
}

#[test]
fn test_episode_produces_valid_paired_examples() {
    let (examples, _) = run_episode(1, 5);

    assert!(!examples.is_empty());
    assert_eq!(examples.len() % 2, 0, "examples come in mirror pairs");

    for pair in examples.chunks(2) {
        let (original, mirrored) = (&pair[0], &pair[1]);
        assert_eq!(original.board.mirrored(), mirrored.board);
        assert_eq!(original.value, mirrored.value);
    }

    for example in &examples {
        assert_eq!(example.policy.len(), 24);
        assert!((example.policy.sum() - 1.0).abs() < 1e-5);
        assert!(example.policy.iter().all(|p| !p.is_nan()));

        let v = example.value.get();
        assert!(v > -1.0 && v < 1.0, "targets stay inside (-1, 1)");
    }
}

#[test]
fn test_summary_is_consistent() {
    let (examples, summary) = run_episode(3, 5);

    // With obstacle drops a move can add two true steps, so the limit may
    // be overshot by at most one.
    assert!(summary.true_steps <= 101);
    assert!(summary.true_steps >= 1);
    if summary.termination == Termination::StepLimit {
        assert!(summary.true_steps >= 100);
    }

    assert_eq!(
        summary.max_chain,
        summary.chain_events.iter().copied().max().unwrap_or(0)
    );
    // The validation environment never chains.
    assert!(summary.chain_events.is_empty());
    assert_eq!(summary.mean_chain, 0.0);
    assert!(summary.total_score >= 0);

    // At most one move (two examples) per true step.
    assert!(examples.len() <= 2 * summary.true_steps as usize);
}

#[test]
fn test_same_seed_reproduces_episode() {
    let (examples_a, summary_a) = run_episode(11, 8);
    let (examples_b, summary_b) = run_episode(11, 8);

    assert_eq!(summary_a.true_steps, summary_b.true_steps);
    assert_eq!(summary_a.total_score, summary_b.total_score);
    assert_eq!(summary_a.termination, summary_b.termination);
    assert_eq!(examples_a.len(), examples_b.len());

    for (a, b) in examples_a.iter().zip(&examples_b) {
        assert_eq!(a.board, b.board);
        assert_eq!(a.value, b.value);
        assert_eq!(a.policy.as_slice(), b.policy.as_slice());
    }
}

#[test]
fn test_controller_runs_consecutive_episodes() {
    let env = StackingEnv::standard(5);
    let predictor = UniformPredictor::new(env.num_actions());
    let config = EpisodeConfig::with_simulations(3);
    let mut controller = EpisodeController::new(env, predictor, config, 5);

    let (first_examples, first_summary) = controller.run_episode();
    let (second_examples, second_summary) = controller.run_episode();

    // The environment resets between episodes; both are complete.
    assert!(!first_examples.is_empty());
    assert!(!second_examples.is_empty());
    assert!(first_summary.true_steps >= 1);
    assert!(second_summary.true_steps >= 1);
}
