//! Diehard-style randomness test battery for bit sequences.
//!
//! Six classical tests (frequency, runs, longest run in block, poker,
//! autocorrelation, binary matrix rank) that each read a slice of 0/1 values
//! and return a [`TestResult`]. Verdicts come from fixed critical values: the
//! chi-square table in [`chi_square`] or `|z| < 1.96` for the z-tests. A
//! p-value and letter grade (A through F) are reported alongside.
//!
//! [`run_battery`] runs the whole set, optionally on scoped threads, and
//! [`evaluate_seed`] chains generation and testing for a single seed.

pub mod battery;
pub mod chi_square;

use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;
use std::fmt;

use serde::Serialize;
use statrs::function::erf::erfc;

pub use battery::{
    BatteryConfig, BatteryEntry, BatteryReport, Evaluation, EvaluationConfig,
    calculate_quality_score, evaluate_seed, run_battery,
};
pub use chi_square::{ChiSquareOutcome, chi_square_test, critical_value};

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Two-sided 5% critical value for the z-tests.
pub const Z_CRITICAL: f64 = 1.96;

/// Why a test failed without producing a verdict from its statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Minimum sample size not met.
    InsufficientData,
    /// An input assumption of the test does not hold.
    PrerequisiteViolation,
    /// A variance or denominator came out non-positive.
    DegenerateStatistic,
    /// Block size, segment width, lag or matrix shape out of range.
    InvalidParameter,
    /// The test panicked; the battery caught it.
    Panicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData => write!(f, "insufficient data"),
            Self::PrerequisiteViolation => write!(f, "prerequisite not met"),
            Self::DegenerateStatistic => write!(f, "degenerate statistic"),
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::Panicked => write!(f, "test panicked"),
        }
    }
}

/// Test-specific counts behind a verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestMetrics {
    None,
    Frequency {
        ones: usize,
        zeros: usize,
        expected: f64,
    },
    Runs {
        total_runs: usize,
        expected_runs: f64,
        variance: f64,
    },
    LongestRun {
        num_blocks: usize,
        block_size: usize,
        observed: Vec<u64>,
        expected: Vec<f64>,
    },
    Poker {
        m: usize,
        segments: usize,
        unique_patterns: usize,
        total_patterns: usize,
    },
    Autocorrelation {
        lag: usize,
        matches: usize,
        mismatches: usize,
        expected: f64,
    },
    MatrixRank {
        num_matrices: usize,
        rows: usize,
        cols: usize,
        observed: Vec<u64>,
        expected: Vec<f64>,
        rank_distribution: BTreeMap<usize, u64>,
    },
}

/// Result of a single randomness test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    /// Chi-square statistic or z-score.
    pub statistic: Option<f64>,
    pub critical_value: Option<f64>,
    pub p_value: Option<f64>,
    pub grade: char,
    pub failure: Option<FailureKind>,
    pub details: String,
    pub metrics: TestMetrics,
}

impl TestResult {
    /// Assign a letter grade based on p-value.
    ///
    /// - A: p >= 0.1
    /// - B: p >= 0.01
    /// - C: p >= 0.001
    /// - D: p >= 0.0001
    /// - F: otherwise or None
    pub fn grade_from_p(p: Option<f64>) -> char {
        match p {
            Some(p) if p >= 0.1 => 'A',
            Some(p) if p >= 0.01 => 'B',
            Some(p) if p >= 0.001 => 'C',
            Some(p) if p >= 0.0001 => 'D',
            _ => 'F',
        }
    }

    fn failed(name: &str, kind: FailureKind, details: String) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            statistic: None,
            critical_value: None,
            p_value: None,
            grade: 'F',
            failure: Some(kind),
            details,
            metrics: TestMetrics::None,
        }
    }

    fn from_chi_square(
        name: &str,
        outcome: ChiSquareOutcome,
        details: String,
        metrics: TestMetrics,
    ) -> Self {
        Self {
            name: name.to_string(),
            passed: outcome.passed,
            statistic: Some(outcome.statistic),
            critical_value: Some(outcome.critical_value),
            p_value: outcome.p_value,
            grade: Self::grade_from_p(outcome.p_value),
            failure: None,
            details,
            metrics,
        }
    }

    fn from_z_score(name: &str, z: f64, details: String, metrics: TestMetrics) -> Self {
        let p = erfc(z.abs() / SQRT_2);
        Self {
            name: name.to_string(),
            passed: z.abs() < Z_CRITICAL,
            statistic: Some(z),
            critical_value: Some(Z_CRITICAL),
            p_value: Some(p),
            grade: Self::grade_from_p(Some(p)),
            failure: None,
            details,
            metrics,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Return a failing `TestResult` when data is too short.
fn insufficient(name: &str, unit: &str, needed: usize, got: usize) -> TestResult {
    TestResult::failed(
        name,
        FailureKind::InsufficientData,
        format!("Insufficient data: need {needed} {unit}, got {got}"),
    )
}

fn invalid(name: &str, details: String) -> TestResult {
    TestResult::failed(name, FailureKind::InvalidParameter, details)
}

fn degenerate(name: &str, details: String) -> TestResult {
    TestResult::failed(name, FailureKind::DegenerateStatistic, details)
}

fn count_ones(bits: &[u8]) -> usize {
    bits.iter().filter(|&&b| b == 1).count()
}

/// Length of the longest run of ones.
fn longest_run_of_ones(bits: &[u8]) -> usize {
    let mut max_run = 0;
    let mut current = 0;
    for &bit in bits {
        if bit == 1 {
            current += 1;
            max_run = max_run.max(current);
        } else {
            current = 0;
        }
    }
    max_run
}

// ═══════════════════════════════════════════════════════════════════════════════
// 1. FREQUENCY
// ═══════════════════════════════════════════════════════════════════════════════

/// Monobit frequency: ones vs zeros, chi-square with one degree of freedom.
pub fn frequency_test(bits: &[u8]) -> TestResult {
    let name = "Frequency Test (Monobit)";
    let n = bits.len();
    if n == 0 {
        return insufficient(name, "bits", 1, 0);
    }
    let ones = count_ones(bits);
    let zeros = n - ones;
    let expected = n as f64 / 2.0;
    let Some(outcome) = chi_square_test(&[ones as u64, zeros as u64], &[expected, expected])
    else {
        return degenerate(name, "Chi-square undefined".to_string());
    };
    TestResult::from_chi_square(
        name,
        outcome,
        format!(
            "{:.2}% ones, {:.2}% zeros",
            ones as f64 * 100.0 / n as f64,
            zeros as f64 * 100.0 / n as f64
        ),
        TestMetrics::Frequency {
            ones,
            zeros,
            expected,
        },
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 2. RUNS
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs test: number of maximal runs of identical bits against the
/// Wald–Wolfowitz expectation.
pub fn runs_test(bits: &[u8]) -> TestResult {
    let name = "Runs Test";
    let n = bits.len();
    if n < 2 {
        return insufficient(name, "bits", 2, n);
    }
    let k = count_ones(bits) as f64;
    let nf = n as f64;
    let proportion = k / nf;
    if (proportion - 0.5).abs() >= 0.1 {
        return TestResult::failed(
            name,
            FailureKind::PrerequisiteViolation,
            format!("Prerequisite not met: proportion of ones {proportion:.4} not within 0.1 of 0.5"),
        );
    }

    let total_runs = 1 + bits.windows(2).filter(|w| w[0] != w[1]).count();
    let product = 2.0 * k * (nf - k);
    let expected_runs = product / nf + 1.0;
    let variance = product * (product - nf) / (nf * nf * (nf - 1.0));
    if variance <= 0.0 || !variance.is_finite() {
        return degenerate(name, format!("Non-positive variance {variance}"));
    }

    let z = (total_runs as f64 - expected_runs) / variance.sqrt();
    TestResult::from_z_score(
        name,
        z,
        format!("runs={total_runs}, expected={expected_runs:.2}"),
        TestMetrics::Runs {
            total_runs,
            expected_runs,
            variance,
        },
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 3. LONGEST RUN IN BLOCK
// ═══════════════════════════════════════════════════════════════════════════════

/// Category probabilities for longest run ≤4, 5, 6, 7, 8, ≥9 in 128-bit blocks.
const LONGEST_RUN_PROBS: [f64; 6] = [0.2148, 0.3672, 0.2305, 0.1875, 0.0879, 0.0121];

/// Default block length for [`longest_run_test`].
pub const DEFAULT_BLOCK_SIZE: usize = 128;

/// Longest run of ones per block, bucketed and compared to theory.
pub fn longest_run_test(bits: &[u8], block_size: usize) -> TestResult {
    let name = "Longest Run in Block";
    if block_size == 0 {
        return invalid(name, "Block size must be positive".to_string());
    }
    let Some(needed) = block_size.checked_mul(10) else {
        return invalid(name, format!("Block size {block_size} too large"));
    };
    let n = bits.len();
    let num_blocks = n / block_size;
    if num_blocks < 10 {
        return insufficient(name, "bits", needed, n);
    }

    let mut observed = vec![0u64; 6];
    for block in bits.chunks_exact(block_size) {
        let bin = match longest_run_of_ones(block) {
            0..=4 => 0,
            r => (r - 4).min(5),
        };
        observed[bin] += 1;
    }
    let expected: Vec<f64> = LONGEST_RUN_PROBS
        .iter()
        .map(|p| p * num_blocks as f64)
        .collect();

    let Some(outcome) = chi_square_test(&observed, &expected) else {
        return degenerate(name, "Chi-square undefined".to_string());
    };
    TestResult::from_chi_square(
        name,
        outcome,
        format!("blocks={num_blocks}, M={block_size}, observed={observed:?}"),
        TestMetrics::LongestRun {
            num_blocks,
            block_size,
            observed,
            expected,
        },
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 4. POKER
// ═══════════════════════════════════════════════════════════════════════════════

/// Default segment width for [`poker_test`].
pub const DEFAULT_POKER_M: usize = 4;

/// Widest segment the poker test tallies.
pub const MAX_POKER_M: usize = 16;

/// Poker test: distribution of non-overlapping m-bit segment values.
///
/// Only the low bit of each input byte is read.
pub fn poker_test(bits: &[u8], m: usize) -> TestResult {
    let name = format!("Poker Test (m={m})");
    if m == 0 || m > MAX_POKER_M {
        return invalid(&name, format!("Segment width must be 1..={MAX_POKER_M}, got {m}"));
    }
    let total_patterns = 1usize << m;
    let segments = bits.len() / m;
    let required = 5 * total_patterns;
    if segments < required {
        return insufficient(&name, "segments", required, segments);
    }

    let mut counts = vec![0u64; total_patterns];
    for segment in bits.chunks_exact(m) {
        let value = segment.iter().fold(0usize, |acc, &b| (acc << 1) | (b & 1) as usize);
        counts[value] += 1;
    }
    let unique_patterns = counts.iter().filter(|&&c| c > 0).count();
    let expected = vec![segments as f64 / total_patterns as f64; total_patterns];

    let Some(outcome) = chi_square_test(&counts, &expected) else {
        return degenerate(&name, "Chi-square undefined".to_string());
    };
    TestResult::from_chi_square(
        &name,
        outcome,
        format!("segments={segments}, patterns={unique_patterns}/{total_patterns}"),
        TestMetrics::Poker {
            m,
            segments,
            unique_patterns,
            total_patterns,
        },
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 5. AUTOCORRELATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Autocorrelation at lag `d`: agreement between `bit[i]` and `bit[i+d]`.
pub fn autocorrelation_test(bits: &[u8], lag: usize) -> TestResult {
    let name = format!("Autocorrelation Test (d={lag})");
    if lag == 0 {
        return invalid(&name, "Lag must be positive".to_string());
    }
    let comparable = bits.len().saturating_sub(lag);
    if comparable < 100 {
        return insufficient(&name, "comparisons", 100, comparable);
    }

    let matches = bits
        .iter()
        .zip(&bits[lag..])
        .filter(|(a, b)| a == b)
        .count();
    let mismatches = comparable - matches;
    let expected = comparable as f64 / 2.0;
    let variance = comparable as f64 / 4.0;
    let z = (matches as f64 - expected) / variance.sqrt();

    TestResult::from_z_score(
        &name,
        z,
        format!("matches={matches}, mismatches={mismatches}, expected={expected:.1}"),
        TestMetrics::Autocorrelation {
            lag,
            matches,
            mismatches,
            expected,
        },
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 6. BINARY MATRIX RANK
// ═══════════════════════════════════════════════════════════════════════════════

/// Probabilities of full rank, full rank - 1, and anything lower for 32x32.
const MATRIX_RANK_PROBS: [f64; 3] = [0.2888, 0.5776, 0.1336];

/// Widest matrix row that fits a packed `u64`.
pub const MAX_MATRIX_COLS: usize = 64;

/// Pack a row-major bit slice into one `u64` per row, column `c` at bit `c`.
fn pack_rows(bits: &[u8], cols: usize) -> Vec<u64> {
    bits.chunks_exact(cols)
        .map(|row| {
            row.iter()
                .enumerate()
                .fold(0u64, |acc, (c, &b)| acc | (((b & 1) as u64) << c))
        })
        .collect()
}

/// GF(2) Gaussian elimination on packed rows. Returns the rank.
///
/// Each column takes the first row at or below the current rank with a 1 in
/// that column as pivot, swaps it up and XORs it into every other row with a
/// 1 there. Columns without a pivot leave the rank unchanged.
pub fn gf2_rank(matrix: &mut [u64], cols: usize) -> usize {
    let rows = matrix.len();
    let mut rank = 0;
    for col in 0..cols.min(MAX_MATRIX_COLS) {
        if rank == rows {
            break;
        }
        let mask = 1u64 << col;
        let Some(pivot) = (rank..rows).find(|&r| matrix[r] & mask != 0) else {
            continue;
        };
        matrix.swap(rank, pivot);
        let pivot_row = matrix[rank];
        for (r, row) in matrix.iter_mut().enumerate() {
            if r != rank && *row & mask != 0 {
                *row ^= pivot_row;
            }
        }
        rank += 1;
    }
    rank
}

/// Binary matrix rank: rank distribution of disjoint `rows x cols` matrices.
pub fn binary_matrix_rank_test(bits: &[u8], rows: usize, cols: usize) -> TestResult {
    let name = "Binary Matrix Rank";
    if rows == 0 || cols == 0 || cols > MAX_MATRIX_COLS {
        return invalid(
            name,
            format!("Matrix shape {rows}x{cols} unsupported (cols must be 1..={MAX_MATRIX_COLS})"),
        );
    }
    let Some((matrix_size, needed)) = rows
        .checked_mul(cols)
        .and_then(|size| Some((size, size.checked_mul(10)?)))
    else {
        return invalid(name, format!("Matrix shape {rows}x{cols} too large"));
    };
    let n = bits.len();
    let num_matrices = n / matrix_size;
    if num_matrices < 10 {
        return insufficient(name, "bits", needed, n);
    }

    let full_rank = rows.min(cols);
    let mut rank_distribution = BTreeMap::new();
    let mut observed = vec![0u64; 3];
    for chunk in bits.chunks_exact(matrix_size) {
        let mut matrix = pack_rows(chunk, cols);
        let rank = gf2_rank(&mut matrix, cols);
        *rank_distribution.entry(rank).or_insert(0u64) += 1;
        let bin = if rank == full_rank {
            0
        } else if rank + 1 == full_rank {
            1
        } else {
            2
        };
        observed[bin] += 1;
    }
    let expected: Vec<f64> = MATRIX_RANK_PROBS
        .iter()
        .map(|p| p * num_matrices as f64)
        .collect();

    let Some(outcome) = chi_square_test(&observed, &expected) else {
        return degenerate(name, "Chi-square undefined".to_string());
    };
    TestResult::from_chi_square(
        name,
        outcome,
        format!(
            "N={num_matrices}, full={}, full-1={}, lower={}",
            observed[0], observed[1], observed[2]
        ),
        TestMetrics::MatrixRank {
            num_matrices,
            rows,
            cols,
            observed,
            expected,
            rank_distribution,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate pseudo-random bits for testing (simple LCG).
    fn pseudo_random_bits(n: usize) -> Vec<u8> {
        let mut state: u64 = 0xDEAD_BEEF_CAFE_BABE;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                ((state >> 33) & 1) as u8
            })
            .collect()
    }

    fn alternating(n: usize) -> Vec<u8> {
        (0..n).map(|i| (i % 2) as u8).collect()
    }

    fn identity_matrix_bits(size: usize, count: usize) -> Vec<u8> {
        let mut bits = Vec::with_capacity(size * size * count);
        for _ in 0..count {
            for r in 0..size {
                for c in 0..size {
                    bits.push((r == c) as u8);
                }
            }
        }
        bits
    }

    #[test]
    fn test_grade_from_p() {
        assert_eq!(TestResult::grade_from_p(Some(0.5)), 'A');
        assert_eq!(TestResult::grade_from_p(Some(0.05)), 'B');
        assert_eq!(TestResult::grade_from_p(Some(0.005)), 'C');
        assert_eq!(TestResult::grade_from_p(Some(0.0005)), 'D');
        assert_eq!(TestResult::grade_from_p(Some(0.00000001)), 'F');
        assert_eq!(TestResult::grade_from_p(None), 'F');
    }

    #[test]
    fn test_longest_run_of_ones() {
        assert_eq!(longest_run_of_ones(&[0, 1, 1, 0, 1, 1, 1, 0]), 3);
        assert_eq!(longest_run_of_ones(&[0, 0, 0]), 0);
        assert_eq!(longest_run_of_ones(&[1, 1]), 2);
    }

    #[test]
    fn test_frequency_balanced_passes() {
        let result = frequency_test(&alternating(1000));
        assert!(result.passed);
        assert_eq!(result.statistic, Some(0.0));
        assert_eq!(result.critical_value, Some(3.841));
        assert_eq!(
            result.metrics,
            TestMetrics::Frequency {
                ones: 500,
                zeros: 500,
                expected: 500.0
            }
        );
    }

    #[test]
    fn test_frequency_biased_fails() {
        let mut bits = vec![1u8; 600];
        bits.extend(vec![0u8; 400]);
        let result = frequency_test(&bits);
        // (100² + 100²) / 500 = 40
        assert!((result.statistic.unwrap() - 40.0).abs() < 1e-9);
        assert!(!result.passed);
    }

    #[test]
    fn test_frequency_empty_fails() {
        let result = frequency_test(&[]);
        assert!(!result.passed);
        assert_eq!(result.failure, Some(FailureKind::InsufficientData));
    }

    #[test]
    fn test_runs_alternating_fails() {
        let result = runs_test(&alternating(1000));
        match result.metrics {
            TestMetrics::Runs {
                total_runs,
                expected_runs,
                ..
            } => {
                assert_eq!(total_runs, 1000);
                assert!((expected_runs - 501.0).abs() < 1e-9);
            }
            ref other => panic!("unexpected metrics {other:?}"),
        }
        let z = result.statistic.unwrap();
        assert!(z > 30.0, "z={z}");
        assert!(!result.passed);
        assert_eq!(result.failure, None);
    }

    #[test]
    fn test_runs_prerequisite() {
        let mut bits = vec![1u8; 700];
        bits.extend(vec![0u8; 300]);
        let result = runs_test(&bits);
        assert!(!result.passed);
        assert_eq!(result.failure, Some(FailureKind::PrerequisiteViolation));
        assert!(result.details.contains("Prerequisite not met"));
        assert_eq!(result.statistic, None);
    }

    #[test]
    fn test_runs_degenerate_variance() {
        // n=2, k=1: product=2, variance = 2*(2-2)/(4*1) = 0
        let result = runs_test(&[0, 1]);
        assert_eq!(result.failure, Some(FailureKind::DegenerateStatistic));
        assert!(!result.passed);
    }

    #[test]
    fn test_runs_pseudo_random() {
        let result = runs_test(&pseudo_random_bits(20_000));
        assert!(result.statistic.is_some());
        assert_eq!(result.critical_value, Some(Z_CRITICAL));
    }

    #[test]
    fn test_longest_run_insufficient() {
        let bits = pseudo_random_bits(10 * 128 - 1);
        let result = longest_run_test(&bits, 128);
        assert!(!result.passed);
        assert_eq!(result.failure, Some(FailureKind::InsufficientData));
        assert!(result.details.contains("Insufficient"));
        assert_eq!(result.statistic, None);
    }

    #[test]
    fn test_longest_run_buckets() {
        // Every block is all ones: longest run 128 lands in the >=9 bin.
        let result = longest_run_test(&vec![1u8; 128 * 10], 128);
        match &result.metrics {
            TestMetrics::LongestRun { observed, .. } => {
                assert_eq!(observed, &vec![0, 0, 0, 0, 0, 10]);
            }
            other => panic!("unexpected metrics {other:?}"),
        }
        assert!(!result.passed);
    }

    #[test]
    fn test_longest_run_zero_block() {
        let result = longest_run_test(&[0, 1], 0);
        assert_eq!(result.failure, Some(FailureKind::InvalidParameter));
    }

    #[test]
    fn test_longest_run_huge_block() {
        let result = longest_run_test(&[0, 1], usize::MAX / 5);
        assert_eq!(result.failure, Some(FailureKind::InvalidParameter));
        // Large but representable: plain insufficiency.
        let result = longest_run_test(&[0, 1], usize::MAX / 10);
        assert_eq!(result.failure, Some(FailureKind::InsufficientData));
    }

    #[test]
    fn test_poker_counts_patterns() {
        // Cycle through all 16 nibbles 10 times: perfectly uniform.
        let bits: Vec<u8> = (0..160u8)
            .flat_map(|v| (0..4).rev().map(move |s| (v % 16 >> s) & 1))
            .collect();
        let result = poker_test(&bits, 4);
        assert!(result.passed);
        assert_eq!(result.statistic, Some(0.0));
        assert_eq!(result.name, "Poker Test (m=4)");
        assert_eq!(
            result.metrics,
            TestMetrics::Poker {
                m: 4,
                segments: 160,
                unique_patterns: 16,
                total_patterns: 16
            }
        );
    }

    #[test]
    fn test_poker_ignores_high_bits() {
        let bits: Vec<u8> = (0..4 * 80).map(|i| if i % 3 == 0 { 0xFF } else { 0x02 }).collect();
        let masked: Vec<u8> = bits.iter().map(|b| b & 1).collect();
        assert_eq!(poker_test(&bits, 4), poker_test(&masked, 4));
    }

    #[test]
    fn test_poker_insufficient_and_invalid() {
        let result = poker_test(&pseudo_random_bits(4 * 79), 4);
        assert_eq!(result.failure, Some(FailureKind::InsufficientData));
        assert_eq!(poker_test(&[], 0).failure, Some(FailureKind::InvalidParameter));
        assert_eq!(poker_test(&[], 17).failure, Some(FailureKind::InvalidParameter));
    }

    #[test]
    fn test_autocorrelation_counts_sum() {
        let bits = pseudo_random_bits(5000);
        for lag in [1usize, 2, 7, 100] {
            let result = autocorrelation_test(&bits, lag);
            match result.metrics {
                TestMetrics::Autocorrelation {
                    matches,
                    mismatches,
                    ..
                } => assert_eq!(matches + mismatches, bits.len() - lag),
                ref other => panic!("unexpected metrics {other:?}"),
            }
        }
    }

    #[test]
    fn test_autocorrelation_alternating() {
        let bits = alternating(1000);
        // Lag 1 never matches, lag 2 always matches.
        let d1 = autocorrelation_test(&bits, 1);
        let d2 = autocorrelation_test(&bits, 2);
        assert!(!d1.passed && d1.statistic.unwrap() < -30.0);
        assert!(!d2.passed && d2.statistic.unwrap() > 30.0);
    }

    #[test]
    fn test_autocorrelation_insufficient() {
        let result = autocorrelation_test(&pseudo_random_bits(100), 1);
        assert_eq!(result.failure, Some(FailureKind::InsufficientData));
        let result = autocorrelation_test(&pseudo_random_bits(10), 50);
        assert_eq!(result.failure, Some(FailureKind::InsufficientData));
        assert_eq!(
            autocorrelation_test(&[], 0).failure,
            Some(FailureKind::InvalidParameter)
        );
    }

    #[test]
    fn test_gf2_rank_identity() {
        let bits = identity_matrix_bits(32, 1);
        let mut matrix = pack_rows(&bits, 32);
        assert_eq!(gf2_rank(&mut matrix, 32), 32);
    }

    #[test]
    fn test_gf2_rank_dependent_rows() {
        let mut matrix = vec![0b0011, 0b0101, 0b0110, 0b0000];
        // row2 = row0 ^ row1
        assert_eq!(gf2_rank(&mut matrix, 4), 2);
        let mut zero = vec![0u64; 8];
        assert_eq!(gf2_rank(&mut zero, 8), 0);
        let mut ones = vec![u64::MAX; 3];
        assert_eq!(gf2_rank(&mut ones, 64), 1);
    }

    #[test]
    fn test_gf2_rank_skips_missing_pivot() {
        // Column 0 empty; columns 1 and 2 carry the rank.
        let mut matrix = vec![0b010, 0b110, 0b000];
        assert_eq!(gf2_rank(&mut matrix, 3), 2);
    }

    #[test]
    fn test_matrix_rank_identity_matrices() {
        let result = binary_matrix_rank_test(&identity_matrix_bits(32, 12), 32, 32);
        match &result.metrics {
            TestMetrics::MatrixRank {
                observed,
                rank_distribution,
                num_matrices,
                ..
            } => {
                assert_eq!(*num_matrices, 12);
                assert_eq!(observed, &vec![12, 0, 0]);
                assert_eq!(rank_distribution.get(&32), Some(&12));
            }
            other => panic!("unexpected metrics {other:?}"),
        }
        // All full rank is far from the 0.2888 expectation.
        assert!(!result.passed);
    }

    #[test]
    fn test_matrix_rank_insufficient_and_invalid() {
        let result = binary_matrix_rank_test(&pseudo_random_bits(9 * 1024), 32, 32);
        assert_eq!(result.failure, Some(FailureKind::InsufficientData));
        assert_eq!(
            binary_matrix_rank_test(&[], 32, 65).failure,
            Some(FailureKind::InvalidParameter)
        );
    }

    #[test]
    fn test_matrix_rank_oversized_shape() {
        // rows * cols overflows
        let result = binary_matrix_rank_test(&[0; 2048], usize::MAX / 2 + 1, 2);
        assert_eq!(result.failure, Some(FailureKind::InvalidParameter));
        // rows * cols fits but ten matrices do not
        let result = binary_matrix_rank_test(&[0; 2048], usize::MAX / 64, 8);
        assert_eq!(result.failure, Some(FailureKind::InvalidParameter));
    }

    #[test]
    fn test_matrix_rank_pseudo_random() {
        let result = binary_matrix_rank_test(&pseudo_random_bits(100 * 1024), 32, 32);
        assert_eq!(result.failure, None);
        assert!(result.statistic.is_some());
        assert_eq!(result.critical_value, Some(5.991));
    }
}
