//! CLI for shufflebucket — Collatz bucket-filling bitstreams under a Diehard-style battery.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shufflebucket")]
#[command(about = "shufflebucket — Collatz bucket-filling bitstreams and their randomness battery")]
#[command(version = shufflebucket_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a balanced bitstream from a seed
    Generate {
        /// Starting seed
        #[arg(long, default_value = "1923")]
        seed: u64,

        /// Number of bits to produce
        #[arg(long, default_value = "32")]
        bits: usize,

        /// Output format
        #[arg(long, default_value = "bits", value_parser = ["bits", "hex", "raw"])]
        format: String,

        #[command(flatten)]
        generation: commands::GenerationArgs,
    },

    /// Run the randomness test battery over a generated dataset
    Report {
        /// Starting seed
        #[arg(long, default_value = "1923")]
        seed: u64,

        /// Number of bits to generate and test (10,000 quick, 100,000 standard, 1,000,000 thorough)
        #[arg(long, default_value = "100000")]
        bits: usize,

        #[command(flatten)]
        generation: commands::GenerationArgs,

        /// Block size for the longest-run test
        #[arg(long)]
        block_size: Option<usize>,

        /// Segment width for the poker test
        #[arg(long)]
        poker_m: Option<usize>,

        /// Comma-separated autocorrelation lags
        #[arg(long, value_delimiter = ',')]
        lags: Option<Vec<usize>>,

        /// Matrix rows for the binary matrix rank test
        #[arg(long)]
        matrix_rows: Option<usize>,

        /// Matrix columns for the binary matrix rank test (at most 64)
        #[arg(long)]
        matrix_cols: Option<usize>,

        /// Run the tests concurrently
        #[arg(long)]
        parallel: bool,

        /// Write the full report as JSON
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            seed,
            bits,
            format,
            generation,
        } => commands::generate::run(seed, bits, &format, &generation),
        Commands::Report {
            seed,
            bits,
            generation,
            block_size,
            poker_m,
            lags,
            matrix_rows,
            matrix_cols,
            parallel,
            output,
        } => commands::report::run(commands::report::ReportCommandConfig {
            seed,
            bits,
            generation: &generation,
            block_size,
            poker_m,
            lags,
            matrix_rows,
            matrix_cols,
            parallel,
            output: output.as_deref(),
        }),
    }
}
