//! Windowed-statistics reference oracle.
//!
//! Computes, independently of the device under test, the exact value sequence
//! a conforming device must emit: one 21-value block per full tumbling window
//! (per channel min, max, mean, population variance, skewness, non-excess
//! kurtosis, then the three pairwise Pearson correlations), followed by the
//! three whole-stream channel medians.
//!
//! Moments are accumulated with the single-pass central-moment recurrence
//! (M1..M4 plus pairwise comoments), which is numerically equivalent to the
//! closed-form two-pass formulas — the tests hold both variants against each
//! other.

use crate::config::{HarnessConfig, SkewnessBias};
use crate::error::HarnessError;
use crate::sample::Sample;

/// Values per StatBlock: 6 moments x 3 channels + 3 correlations.
pub const STATS_PER_WINDOW: usize = 21;
/// Trailing per-channel medians.
pub const MEDIAN_VALUES: usize = 3;

/// Variance below this is treated as zero: skewness, kurtosis, and any
/// correlation involving the channel are emitted as 0 rather than NaN.
const VAR_EPS: f64 = 1e-10;

/// Expected ResultStream length for `n_samples` non-sentinel samples.
pub fn result_len(n_samples: usize, window_size: usize) -> usize {
    STATS_PER_WINDOW * (n_samples / window_size) + MEDIAN_VALUES
}

// ---------------------------------------------------------------------------
// Single-channel running moments
// ---------------------------------------------------------------------------

/// Min/max plus central moments M1..M4 of one channel, updated in one pass.
#[derive(Debug, Clone)]
pub struct RunningMoments {
    n: u64,
    m1: f64,
    m2: f64,
    m3: f64,
    m4: f64,
    min: f64,
    max: f64,
}

impl Default for RunningMoments {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningMoments {
    pub fn new() -> Self {
        Self {
            n: 0,
            m1: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn push(&mut self, x: f64) {
        let n1 = self.n as f64;
        self.n += 1;
        let n = self.n as f64;
        let delta = x - self.m1;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term1 = delta * delta_n * n1;
        self.m1 += delta_n;
        self.m4 += term1 * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term1;

        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    pub fn len(&self) -> usize {
        self.n as usize
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn mean(&self) -> f64 {
        self.m1
    }

    /// Population variance (divisor N).
    pub fn variance(&self) -> f64 {
        if self.n == 0 { 0.0 } else { self.m2 / self.n as f64 }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Third standardized moment. Zero-variance windows yield 0.
    pub fn skewness(&self, bias: SkewnessBias) -> f64 {
        if self.variance() < VAR_EPS || self.n == 0 {
            return 0.0;
        }
        let n = self.n as f64;
        let g1 = n.sqrt() * self.m3 / self.m2.powf(1.5);
        match bias {
            SkewnessBias::Biased => g1,
            SkewnessBias::Corrected => {
                if self.n <= 2 {
                    0.0
                } else {
                    g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
                }
            }
        }
    }

    /// Non-excess (Pearson) fourth standardized moment: a normal
    /// distribution scores ~3. Zero-variance windows yield 0.
    pub fn kurtosis(&self) -> f64 {
        if self.variance() < VAR_EPS || self.n == 0 {
            return 0.0;
        }
        self.n as f64 * self.m4 / (self.m2 * self.m2)
    }
}

// ---------------------------------------------------------------------------
// Pairwise comoment
// ---------------------------------------------------------------------------

/// Online covariance accumulator for one channel pair.
#[derive(Debug, Clone, Default)]
struct CoMoment {
    n: u64,
    mean_a: f64,
    mean_b: f64,
    c: f64,
}

impl CoMoment {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn push(&mut self, a: f64, b: f64) {
        self.n += 1;
        let n = self.n as f64;
        let da = a - self.mean_a;
        self.mean_a += da / n;
        self.mean_b += (b - self.mean_b) / n;
        self.c += da * (b - self.mean_b);
    }

    /// Population covariance (divisor N).
    fn covariance(&self) -> f64 {
        if self.n == 0 { 0.0 } else { self.c / self.n as f64 }
    }
}

// ---------------------------------------------------------------------------
// Three-channel tumbling window
// ---------------------------------------------------------------------------

/// Accumulator for one tumbling window across all three channels.
#[derive(Debug, Clone, Default)]
pub struct WindowStats {
    pub x: RunningMoments,
    pub y: RunningMoments,
    pub z: RunningMoments,
    xy: CoMoment,
    xz: CoMoment,
    yz: CoMoment,
}

impl WindowStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.z.clear();
        self.xy.clear();
        self.xz.clear();
        self.yz.clear();
    }

    pub fn push(&mut self, s: &Sample) {
        self.x.push(s.x);
        self.y.push(s.y);
        self.z.push(s.z);
        self.xy.push(s.x, s.y);
        self.xz.push(s.x, s.z);
        self.yz.push(s.y, s.z);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn correlation_xy(&self) -> f64 {
        correlation(self.xy.covariance(), &self.x, &self.y)
    }

    pub fn correlation_xz(&self) -> f64 {
        correlation(self.xz.covariance(), &self.x, &self.z)
    }

    pub fn correlation_yz(&self) -> f64 {
        correlation(self.yz.covariance(), &self.y, &self.z)
    }

    /// Emit this window's StatBlock in wire order.
    pub fn emit(&self, bias: SkewnessBias) -> [f64; STATS_PER_WINDOW] {
        let mut out = [0.0; STATS_PER_WINDOW];
        for (i, ch) in [&self.x, &self.y, &self.z].into_iter().enumerate() {
            out[6 * i] = ch.min();
            out[6 * i + 1] = ch.max();
            out[6 * i + 2] = ch.mean();
            out[6 * i + 3] = ch.variance();
            out[6 * i + 4] = ch.skewness(bias);
            out[6 * i + 5] = ch.kurtosis();
        }
        out[18] = self.correlation_xy();
        out[19] = self.correlation_xz();
        out[20] = self.correlation_yz();
        out
    }
}

/// Pearson coefficient with the zero-variance guard.
fn correlation(cov: f64, a: &RunningMoments, b: &RunningMoments) -> f64 {
    if a.variance() < VAR_EPS || b.variance() < VAR_EPS {
        return 0.0;
    }
    cov / (a.std_dev() * b.std_dev())
}

// ---------------------------------------------------------------------------
// Full-stream oracle
// ---------------------------------------------------------------------------

/// Compute the expected ResultStream for a non-sentinel sample sequence:
/// `floor(N / window_size)` StatBlocks followed by the three channel medians.
///
/// Fewer samples than one window is fine (zero blocks, medians only); an
/// empty stream is not.
pub fn result_stream(samples: &[Sample], cfg: &HarnessConfig) -> Result<Vec<f64>, HarnessError> {
    cfg.validate()?;
    if samples.is_empty() {
        return Err(HarnessError::EmptyStream);
    }

    let mut out = Vec::with_capacity(result_len(samples.len(), cfg.window_size));
    let mut win = WindowStats::new();
    for s in samples {
        win.push(s);
        if win.len() == cfg.window_size {
            out.extend_from_slice(&win.emit(cfg.skewness));
            win.clear();
        }
    }

    out.push(median(samples.iter().map(|s| s.x)));
    out.push(median(samples.iter().map(|s| s.y)));
    out.push(median(samples.iter().map(|s| s.z)));
    Ok(out)
}

/// Median of a non-empty sequence: middle element, or the average of the two
/// middle elements for even counts.
fn median(values: impl Iterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
