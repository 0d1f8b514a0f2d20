use std::path::Path;

use statlink_core::error::HarnessError;
use statlink_core::{HarnessConfig, TestVector, oracle};

/// Print the oracle's expected ResultStream for a vector file, one value per
/// line with a 1-based index. No device involved.
pub fn run(vector_path: &str, cfg: &HarnessConfig) -> Result<bool, HarnessError> {
    let vector = TestVector::load(Path::new(vector_path))?;
    let values = oracle::result_stream(&vector.samples, cfg)?;

    for (i, v) in values.iter().enumerate() {
        println!("{:<5} {:>16.6e}", i + 1, v);
    }
    println!();
    println!(
        "{} samples, {} windows of {}, {} values",
        vector.samples.len(),
        vector.samples.len() / cfg.window_size,
        cfg.window_size,
        values.len()
    );
    Ok(true)
}
