//! Harness configuration.
//!
//! Everything that used to be a tunable constant lives here and travels with
//! the run: window size, serial parameters, read pacing, and the numeric
//! tolerance rule. [`HarnessConfig::default`] gives the values the reference
//! device target was exercised with.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Which skewness estimator the oracle reports.
///
/// The device-side revisions disagree: most compute the biased population
/// third standardized moment, one applies the sample-size bias correction.
/// The harness never guesses — the variant is explicit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkewnessBias {
    /// `m3 / m2^1.5` over the window (population moment). Canonical.
    #[default]
    Biased,
    /// `g1 * sqrt(n(n-1)) / (n-2)` — bias-corrected sample skewness.
    Corrected,
}

impl std::fmt::Display for SkewnessBias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Biased => write!(f, "biased"),
            Self::Corrected => write!(f, "corrected"),
        }
    }
}

/// Configuration for one conformance run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Samples per tumbling window.
    pub window_size: usize,
    /// Serial baud rate (8 data bits, no parity, 1 stop bit are fixed).
    pub baud_rate: u32,
    /// Bounded timeout for each receiver read. A read that returns no bytes
    /// within this window is normal, not an error.
    pub read_timeout: Duration,
    /// Receiver read buffer size per call.
    pub read_chunk: usize,
    /// Relative tolerance for element comparison.
    pub rel_tol: f64,
    /// Absolute tolerance floor; dominates for small-magnitude moments.
    pub abs_tol: f64,
    /// Skewness estimator variant.
    pub skewness: SkewnessBias,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            baud_rate: 115_200,
            read_timeout: Duration::from_secs(1),
            read_chunk: 4096,
            rel_tol: 1e-4,
            abs_tol: 1e-3,
            skewness: SkewnessBias::Biased,
        }
    }
}

impl HarnessConfig {
    /// Reject values no run can work with. Called at every harness entry point.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.window_size == 0 {
            return Err(HarnessError::InvalidConfig("window_size must be nonzero"));
        }
        if self.read_chunk == 0 {
            return Err(HarnessError::InvalidConfig("read_chunk must be nonzero"));
        }
        if self.rel_tol < 0.0 || self.abs_tol < 0.0 {
            return Err(HarnessError::InvalidConfig("tolerances must be non-negative"));
        }
        Ok(())
    }
}
