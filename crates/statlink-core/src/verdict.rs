//! Verdict engine.
//!
//! Aligns the oracle's expected values against the decoded device values
//! element by element and classifies the run. A reply of the wrong byte
//! length is its own failure class — numeric comparison still runs over the
//! overlapping prefix for diagnostics, but the outcome stays
//! [`Outcome::LengthMismatch`].

use std::time::Duration;

use serde::Serialize;

use crate::codec::FLOAT_BYTES;
use crate::config::HarnessConfig;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Byte count matched and every element passed tolerance.
    Pass,
    /// Received byte count differs from `4 * len(oracle)` (including a
    /// response that is not a whole number of floats).
    LengthMismatch,
    /// Lengths matched but at least one element failed tolerance.
    NumericMismatch,
}

/// One element-by-element comparison.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ElementCheck {
    pub index: usize,
    pub expected: f64,
    pub actual: f64,
    pub diff: f64,
    pub within: bool,
}

/// Structured result of one conformance run. Rendering is the caller's job.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub outcome: Outcome,
    pub expected_bytes: usize,
    pub received_bytes: usize,
    /// Count of elements that failed tolerance.
    pub mismatches: usize,
    /// Every compared element, in stream order.
    pub elements: Vec<ElementCheck>,
    pub elapsed: Duration,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }
}

/// Tolerance rule: `|a - b| <= max(rel_tol * max(|a|, |b|), abs_tol)`.
pub fn within_tolerance(a: f64, b: f64, rel_tol: f64, abs_tol: f64) -> bool {
    (a - b).abs() <= (rel_tol * a.abs().max(b.abs())).max(abs_tol)
}

/// Compare the oracle sequence against the decoded device sequence.
///
/// `received_bytes` is the raw byte count off the wire, which may not be
/// `4 * actual.len()` when the reply was truncated mid-float.
pub fn compare(
    expected: &[f64],
    actual: &[f64],
    received_bytes: usize,
    elapsed: Duration,
    cfg: &HarnessConfig,
) -> Verdict {
    let overlap = expected.len().min(actual.len());
    let mut elements = Vec::with_capacity(overlap);
    let mut mismatches = 0;

    for (index, (&e, &a)) in expected.iter().zip(actual).enumerate() {
        let within = within_tolerance(e, a, cfg.rel_tol, cfg.abs_tol);
        if !within {
            mismatches += 1;
        }
        elements.push(ElementCheck {
            index,
            expected: e,
            actual: a,
            diff: (e - a).abs(),
            within,
        });
    }

    let expected_bytes = expected.len() * FLOAT_BYTES;
    let outcome = if received_bytes != expected_bytes {
        Outcome::LengthMismatch
    } else if mismatches > 0 {
        Outcome::NumericMismatch
    } else {
        Outcome::Pass
    };

    Verdict {
        outcome,
        expected_bytes,
        received_bytes,
        mismatches,
        elements,
        elapsed,
    }
}
