use std::time::Instant;

use shufflebucket_tests::{Evaluation, TestResult};

use super::GenerationArgs;

pub struct ReportCommandConfig<'a> {
    pub seed: u64,
    pub bits: usize,
    pub generation: &'a GenerationArgs,
    pub block_size: Option<usize>,
    pub poker_m: Option<usize>,
    pub lags: Option<Vec<usize>>,
    pub matrix_rows: Option<usize>,
    pub matrix_cols: Option<usize>,
    pub parallel: bool,
    pub output: Option<&'a str>,
}

pub fn run(cmd: ReportCommandConfig<'_>) {
    let mut config = super::load_config(cmd.generation);
    let battery = &mut config.battery;
    if let Some(block_size) = cmd.block_size {
        battery.block_size = block_size;
    }
    if let Some(poker_m) = cmd.poker_m {
        battery.poker_m = poker_m;
    }
    if let Some(lags) = cmd.lags {
        battery.lags = lags;
    }
    if let Some(rows) = cmd.matrix_rows {
        battery.matrix_rows = rows;
    }
    if let Some(cols) = cmd.matrix_cols {
        battery.matrix_cols = cols;
    }
    battery.parallel |= cmd.parallel;

    println!("{}", "=".repeat(70));
    println!("  Collatz bucket generator — randomness test battery");
    println!("{}", "=".repeat(70));
    println!("Seed: {}", cmd.seed);
    println!("Bits: {}", cmd.bits);
    println!("{}\n", "=".repeat(70));

    let t0 = Instant::now();
    let evaluation = shufflebucket_tests::evaluate_seed(cmd.seed, cmd.bits, &config)
        .unwrap_or_else(|e| super::fail_generation(cmd.seed, e));
    let elapsed = t0.elapsed().as_secs_f64();

    println!(
        "Generated {} bits ({} zeros, {} ones)\n",
        evaluation.num_bits, evaluation.zeros, evaluation.ones
    );
    print_results(&evaluation);

    let report = &evaluation.report;
    println!("{}", "=".repeat(70));
    println!(
        "  Summary: {}/{} tests passed ({:.1}%), quality score {:.0}/100 [{elapsed:.2}s]",
        report.passed_count(),
        report.len(),
        report.pass_rate(),
        report.quality_score()
    );
    println!("{}", "=".repeat(70));

    if let Some(path) = cmd.output {
        match serde_json::to_string_pretty(&evaluation) {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => println!("\nReport saved to: {path}"),
                Err(e) => eprintln!("Failed to write report to {path}: {e}"),
            },
            Err(e) => eprintln!("Failed to serialize report: {e}"),
        }
    }
}

fn print_results(evaluation: &Evaluation) {
    for (key, result) in evaluation.report.iter() {
        let status = if result.passed { "PASS" } else { "FAIL" };
        println!("  [{status}] {key} — {}", result.name);
        println!("   {}", "-".repeat(66));
        print_statistics(result);
        println!("   details: {}", result.details);
        if let Some(kind) = result.failure {
            println!("   note: {kind}");
        }
        println!();
    }
}

fn print_statistics(result: &TestResult) {
    if let Some(stat) = result.statistic {
        println!("   statistic: {stat:.4}");
    }
    if let Some(critical) = result.critical_value {
        println!("   critical value: {critical:.3}");
    }
    match result.p_value {
        Some(p) => println!("   p-value: {p:.6} (grade {})", result.grade),
        None => println!("   grade: {}", result.grade),
    }
}
