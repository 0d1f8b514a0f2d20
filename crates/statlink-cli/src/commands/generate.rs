use std::fs;

use statlink_core::error::HarnessError;
use statlink_core::{TestVector, codec, sample};

/// Write a synthetic vector file: random samples, the sentinel line, and an
/// optional uniform sending schedule.
pub fn run(
    count: usize,
    out: Option<&str>,
    chunk: Option<usize>,
    wait: Option<f64>,
) -> Result<bool, HarnessError> {
    if count == 0 {
        return Err(HarnessError::EmptyStream);
    }

    let mut vector = TestVector {
        samples: sample::synthetic(count),
        schedule: Vec::new(),
    };
    if let (Some(chunk), Some(wait)) = (chunk, wait) {
        let payload_len = codec::encode_stream(&vector.samples).len();
        vector.schedule = super::uniform_schedule(payload_len, chunk, wait);
    }

    let text = vector.render();
    match out {
        Some(path) => {
            fs::write(path, text)?;
            eprintln!(
                "wrote {path}: {count} samples, {} schedule events",
                vector.schedule.len()
            );
        }
        None => print!("{text}"),
    }
    Ok(true)
}
