pub mod generate;
pub mod report;

use clap::Args;
use shufflebucket_tests::EvaluationConfig;

/// Generator options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GenerationArgs {
    /// JSON file with `generator`, `chunk_bits` and `battery` sections; flags override it
    #[arg(long)]
    pub config: Option<String>,

    /// Largest chunk requested from the generator per call
    #[arg(long)]
    pub chunk_bits: Option<usize>,

    /// Collatz steps allowed per chunk before generation stalls
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

/// Build the evaluation config from an optional JSON file plus flag overrides.
/// Exits the process if the file cannot be read or parsed.
pub fn load_config(args: &GenerationArgs) -> EvaluationConfig {
    let mut config = match args.config.as_deref() {
        Some(path) => {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Failed to read config {path}: {e}");
                std::process::exit(1);
            });
            serde_json::from_str(&text).unwrap_or_else(|e| {
                eprintln!("Invalid config {path}: {e}");
                std::process::exit(1);
            })
        }
        None => EvaluationConfig::default(),
    };
    if let Some(chunk_bits) = args.chunk_bits {
        config.chunk_bits = chunk_bits;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.generator.max_iterations = max_iterations;
    }
    log::debug!("effective config: {config:?}");
    config
}

/// Print a generation failure and exit; no test may run on a partial sequence.
pub fn fail_generation(seed: u64, err: shufflebucket_core::GenerationError) -> ! {
    eprintln!("Generation failed for seed {seed}: {err}");
    std::process::exit(2);
}
