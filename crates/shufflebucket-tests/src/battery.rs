//! Runs every test over one bit sequence and aggregates the verdicts.

use std::panic::{AssertUnwindSafe, catch_unwind};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use shufflebucket_core::{DEFAULT_CHUNK_BITS, DatasetExpander, GenerationError, GeneratorConfig};

use crate::{
    DEFAULT_BLOCK_SIZE, DEFAULT_POKER_M, FailureKind, TestMetrics, TestResult, autocorrelation_test,
    binary_matrix_rank_test, frequency_test, longest_run_test, poker_test, runs_test,
};

/// Parameters of the test battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub block_size: usize,
    pub poker_m: usize,
    /// One autocorrelation test per lag, in order.
    pub lags: Vec<usize>,
    pub matrix_rows: usize,
    pub matrix_cols: usize,
    /// Run each test on its own scoped thread.
    pub parallel: bool,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            poker_m: DEFAULT_POKER_M,
            lags: vec![1, 2],
            matrix_rows: 32,
            matrix_cols: 32,
            parallel: false,
        }
    }
}

/// One named slot in a [`BatteryReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryEntry {
    pub key: String,
    pub result: TestResult,
}

/// Test results keyed by name, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryReport {
    pub bits_tested: usize,
    pub entries: Vec<BatteryEntry>,
}

impl BatteryReport {
    pub fn get(&self, key: &str) -> Option<&TestResult> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.result)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TestResult)> {
        self.entries.iter().map(|e| (e.key.as_str(), &e.result))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn passed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.result.passed).count()
    }

    /// Percentage of tests passed (0-100).
    pub fn pass_rate(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.passed_count() as f64 * 100.0 / self.entries.len() as f64
    }

    pub fn all_passed(&self) -> bool {
        !self.entries.is_empty() && self.passed_count() == self.entries.len()
    }

    pub fn quality_score(&self) -> f64 {
        let results: Vec<&TestResult> = self.entries.iter().map(|e| &e.result).collect();
        quality_score_of(&results)
    }
}

type TestFn<'a> = Box<dyn Fn() -> TestResult + Send + Sync + 'a>;

fn planned_tests<'a>(bits: &'a [u8], config: &'a BatteryConfig) -> Vec<(String, TestFn<'a>)> {
    let mut plan: Vec<(String, TestFn<'a>)> = Vec::with_capacity(5 + config.lags.len());
    plan.push(("Frequency".to_string(), Box::new(move || frequency_test(bits))));
    plan.push(("Runs".to_string(), Box::new(move || runs_test(bits))));
    plan.push((
        "Longest Run".to_string(),
        Box::new(move || longest_run_test(bits, config.block_size)),
    ));
    plan.push((
        format!("Poker (m={})", config.poker_m),
        Box::new(move || poker_test(bits, config.poker_m)),
    ));
    for &lag in &config.lags {
        plan.push((
            format!("Autocorrelation (d={lag})"),
            Box::new(move || autocorrelation_test(bits, lag)),
        ));
    }
    plan.push((
        "Binary Matrix Rank".to_string(),
        Box::new(move || binary_matrix_rank_test(bits, config.matrix_rows, config.matrix_cols)),
    ));
    plan
}

fn panicked(key: &str) -> TestResult {
    TestResult {
        name: key.to_string(),
        passed: false,
        statistic: None,
        critical_value: None,
        p_value: None,
        grade: 'F',
        failure: Some(FailureKind::Panicked),
        details: "Test panicked".to_string(),
        metrics: TestMetrics::None,
    }
}

fn run_plan(plan: &[(String, TestFn<'_>)], parallel: bool) -> Vec<TestResult> {
    if parallel {
        std::thread::scope(|s| {
            let handles: Vec<_> = plan
                .iter()
                .map(|(key, test)| (key, s.spawn(move || test())))
                .collect();
            handles
                .into_iter()
                .map(|(key, handle)| handle.join().unwrap_or_else(|_| panicked(key)))
                .collect()
        })
    } else {
        plan.iter()
            .map(|(key, test)| {
                catch_unwind(AssertUnwindSafe(|| test())).unwrap_or_else(|_| panicked(key))
            })
            .collect()
    }
}

/// Run the complete battery over `bits`.
///
/// Tests are independent and read-only, so with `config.parallel` each one
/// gets a scoped thread; the report keeps execution order either way. A test
/// that panics is recorded as a failure instead of aborting the battery.
pub fn run_battery(bits: &[u8], config: &BatteryConfig) -> BatteryReport {
    let plan = planned_tests(bits, config);
    let results = run_plan(&plan, config.parallel);

    let entries: Vec<BatteryEntry> = plan
        .into_iter()
        .zip(results)
        .map(|((key, _), result)| {
            debug!(
                "{key}: {} ({})",
                if result.passed { "pass" } else { "fail" },
                result.details
            );
            BatteryEntry { key, result }
        })
        .collect();

    let report = BatteryReport {
        bits_tested: bits.len(),
        entries,
    };
    info!(
        "battery over {} bits: {}/{} passed",
        report.bits_tested,
        report.passed_count(),
        report.len()
    );
    report
}

fn quality_score_of(results: &[&TestResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results
        .iter()
        .map(|r| match r.grade {
            'A' => 100.0,
            'B' => 75.0,
            'C' => 50.0,
            'D' => 25.0,
            _ => 0.0,
        })
        .sum();
    total / results.len() as f64
}

/// Calculate overall quality score (0-100) from test results.
///
/// Each grade maps to a score: A=100, B=75, C=50, D=25, F=0.
/// Returns the average across all tests.
pub fn calculate_quality_score(results: &[TestResult]) -> f64 {
    let refs: Vec<&TestResult> = results.iter().collect();
    quality_score_of(&refs)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Seed evaluation
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything needed to go from a seed to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub generator: GeneratorConfig,
    pub chunk_bits: usize,
    pub battery: BatteryConfig,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            chunk_bits: DEFAULT_CHUNK_BITS,
            battery: BatteryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub seed: u64,
    pub num_bits: usize,
    pub ones: usize,
    pub zeros: usize,
    pub report: BatteryReport,
}

/// Expand `seed` into `num_bits` bits and run the battery over them.
///
/// Generation failures are returned before any test runs, so no verdict is
/// ever computed over a malformed sequence.
pub fn evaluate_seed(
    seed: u64,
    num_bits: usize,
    config: &EvaluationConfig,
) -> Result<Evaluation, GenerationError> {
    let expander = DatasetExpander::new(config.generator, config.chunk_bits)?;
    let bits = expander.expand(seed, num_bits)?;
    info!(
        "seed {seed}: generated {} bits ({} ones, {} zeros)",
        bits.len(),
        bits.ones(),
        bits.zeros()
    );
    let report = run_battery(&bits, &config.battery);
    Ok(Evaluation {
        seed,
        num_bits,
        ones: bits.ones(),
        zeros: bits.zeros(),
        report,
    })
}
