//! Self-play episode generation for cascade training.
//!
//! Runs independent self-play episodes against the validation environment
//! with a uniform predictor and saves them in MessagePack format for the
//! training pipeline, then prints aggregate statistics.

use anyhow::{Context, Result};
use cascade_core::{Environment, UniformPredictor};
use cascade_mcts::games::StackingEnv;
use cascade_selfplay::{
    EpisodeConfig, EpisodeController, EpisodeSummary, Termination, TrainingExample,
};
use clap::Parser;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

/// Cascade self-play episode generation tool.
#[derive(Parser)]
#[command(name = "cascade-selfplay")]
#[command(about = "Generate self-play episodes for cascade training")]
struct Cli {
    /// Number of episodes to generate.
    #[arg(short, long, default_value = "10")]
    episodes: usize,

    /// Output directory for episode files.
    #[arg(short, long, default_value = "data/episodes")]
    output: PathBuf,

    /// Number of MCTS simulations per move.
    #[arg(short, long, default_value = "50")]
    simulations: usize,

    /// Random seed for reproducibility.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Move index up to which sampling stays at temperature 1.
    #[arg(long, default_value = "10")]
    temperature_threshold: u32,

    /// Forced-termination true-step limit.
    #[arg(long, default_value = "100")]
    step_limit: u32,
}

/// A single training tuple in serialized form.
#[derive(Serialize, Deserialize, Debug)]
struct ExampleRecord {
    /// Row-major board cells, bottom row first.
    board: Vec<i8>,

    /// Search distribution as a sparse map: {action index: probability}.
    policy: HashMap<u16, f32>,

    /// Squashed return target in (-1, 1).
    value: f32,
}

/// A complete episode.
#[derive(Serialize, Deserialize, Debug)]
struct EpisodeRecord {
    /// Training tuples, two per move (mirror pairs), in move order.
    examples: Vec<ExampleRecord>,

    total_score: i64,
    chain_events: Vec<u32>,
    true_steps: u32,
    max_chain: u32,
    mean_chain: f64,
    terminated_by_loss: bool,

    /// Optional metadata.
    metadata: HashMap<String, serde_json::Value>,
}

/// Generate a single episode against the validation environment.
fn generate_episode(config: &EpisodeConfig, seed: u64) -> (Vec<TrainingExample>, EpisodeSummary) {
    let env = StackingEnv::standard(seed);
    let predictor = UniformPredictor::new(env.num_actions());
    let mut controller = EpisodeController::new(env, predictor, config.clone(), seed);
    controller.run_episode()
}

/// Convert an episode to its serialized record. Policies are stored sparse:
/// only actions with non-zero probability.
fn to_record(examples: Vec<TrainingExample>, summary: &EpisodeSummary, seed: u64) -> EpisodeRecord {
    let examples = examples
        .into_iter()
        .map(|example| {
            let policy = example
                .policy
                .iter()
                .enumerate()
                .filter(|(_, &p)| p > 0.0)
                .map(|(index, &p)| (index as u16, p))
                .collect();
            ExampleRecord {
                board: example.board.cells().to_vec(),
                policy,
                value: example.value.get(),
            }
        })
        .collect();

    let mut metadata = HashMap::new();
    metadata.insert("seed".to_string(), serde_json::json!(seed));

    EpisodeRecord {
        examples,
        total_score: summary.total_score,
        chain_events: summary.chain_events.clone(),
        true_steps: summary.true_steps,
        max_chain: summary.max_chain,
        mean_chain: summary.mean_chain,
        terminated_by_loss: summary.termination == Termination::Loss,
        metadata,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory: {:?}", cli.output))?;

    let config = EpisodeConfig::with_simulations(cli.simulations)
        .with_step_limit(cli.step_limit)
        .with_temperature_threshold(cli.temperature_threshold);

    println!(
        "Generating {} episodes with {} simulations/move",
        cli.episodes, cli.simulations
    );
    println!("Output directory: {:?}", cli.output);
    println!("Seed: {}", cli.seed);

    let start = Instant::now();

    // Episodes are independent: each gets its own environment, predictor
    // and seeds, so they parallelize cleanly.
    let records: Vec<EpisodeRecord> = (0..cli.episodes)
        .into_par_iter()
        .map(|i| {
            let episode_seed = cli.seed.wrapping_add(i as u64 * 1000);
            let (examples, summary) = generate_episode(&config, episode_seed);
            to_record(examples, &summary, episode_seed)
        })
        .collect();

    for (i, record) in records.iter().enumerate() {
        let filename = cli.output.join(format!("episode_{:06}.msgpack", i));
        let file = File::create(&filename)
            .with_context(|| format!("Failed to create file: {:?}", filename))?;
        let mut writer = BufWriter::new(file);
        rmp_serde::encode::write_named(&mut writer, record)
            .with_context(|| format!("Failed to serialize episode {}", i))?;
    }

    let elapsed = start.elapsed();
    let episodes = records.len().max(1) as f64;
    let total_examples: usize = records.iter().map(|r| r.examples.len()).sum();
    let avg_score: f64 = records.iter().map(|r| r.total_score as f64).sum::<f64>() / episodes;
    let avg_steps: f64 = records.iter().map(|r| r.true_steps as f64).sum::<f64>() / episodes;
    let avg_max_chain: f64 = records.iter().map(|r| r.max_chain as f64).sum::<f64>() / episodes;
    let no_chain_rate = records
        .iter()
        .filter(|r| r.chain_events.is_empty())
        .count() as f64
        / episodes;
    let losses = records.iter().filter(|r| r.terminated_by_loss).count();

    println!("\nCompleted in {:.2}s", elapsed.as_secs_f64());
    println!("Episodes generated: {}", records.len());
    println!("Training examples: {}", total_examples);
    println!("Average score: {:.2}", avg_score);
    println!("Average true steps: {:.2}", avg_steps);
    println!("Average max chain: {:.2}", avg_max_chain);
    println!("No-chain rate: {:.1}%", no_chain_rate * 100.0);
    println!(
        "Terminations: {} by loss, {} by step limit",
        losses,
        records.len() - losses
    );
    println!("Files saved to: {:?}", cli.output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_episode() {
        let config = EpisodeConfig::with_simulations(5); // Low for testing
        let (examples, summary) = generate_episode(&config, 42);

        assert!(!examples.is_empty());
        assert_eq!(examples.len() % 2, 0);
        assert!(summary.true_steps <= 100);
    }

    #[test]
    fn test_record_policy_is_sparse_and_normalized() {
        let config = EpisodeConfig::with_simulations(5);
        let (examples, summary) = generate_episode(&config, 7);
        let record = to_record(examples, &summary, 7);

        assert!(!record.examples.is_empty());
        for example in &record.examples {
            assert_eq!(example.board.len(), 14 * 6);
            assert!(!example.policy.is_empty());
            let sum: f32 = example.policy.values().sum();
            assert!((sum - 1.0).abs() < 0.01);
            assert!(example.value > -1.0 && example.value < 1.0);
        }
    }
}
