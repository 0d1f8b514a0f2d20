pub mod check;
pub mod generate;
pub mod run;

use std::time::Duration;

use statlink_core::{HarnessConfig, SendingEvent, SkewnessBias};

/// Build a harness config from the shared command-line overrides.
pub fn harness_config(
    window: usize,
    baud: u32,
    abs_tol: f64,
    rel_tol: f64,
    corrected_skewness: bool,
) -> HarnessConfig {
    HarnessConfig {
        window_size: window,
        baud_rate: baud,
        abs_tol,
        rel_tol,
        skewness: if corrected_skewness {
            SkewnessBias::Corrected
        } else {
            SkewnessBias::Biased
        },
        ..HarnessConfig::default()
    }
}

/// Uniform schedule covering `payload_len` bytes exactly: full chunks plus a
/// final remainder chunk. A zero chunk size means no pacing.
pub fn uniform_schedule(payload_len: usize, chunk: usize, wait_secs: f64) -> Vec<SendingEvent> {
    if chunk == 0 {
        return Vec::new();
    }
    let wait = Duration::from_secs_f64(wait_secs);
    let mut events = Vec::with_capacity(payload_len.div_ceil(chunk));
    let mut remaining = payload_len;
    while remaining > 0 {
        let chunk_bytes = chunk.min(remaining);
        events.push(SendingEvent { chunk_bytes, wait });
        remaining -= chunk_bytes;
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_schedule_covers_payload_exactly() {
        let events = uniform_schedule(100, 32, 0.01);
        assert_eq!(events.len(), 4);
        assert_eq!(events.iter().map(|e| e.chunk_bytes).sum::<usize>(), 100);
        assert_eq!(events[3].chunk_bytes, 4);
    }

    #[test]
    fn zero_chunk_means_no_pacing() {
        assert!(uniform_schedule(100, 0, 0.01).is_empty());
    }

    #[test]
    fn config_overrides_apply() {
        let cfg = harness_config(50, 9600, 1e-2, 1e-5, true);
        assert_eq!(cfg.window_size, 50);
        assert_eq!(cfg.baud_rate, 9600);
        assert_eq!(cfg.skewness, SkewnessBias::Corrected);
    }
}
