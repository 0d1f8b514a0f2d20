use std::fs;
use std::io;
use std::path::Path;

use log::info;

use statlink_core::error::HarnessError;
use statlink_core::{HarnessConfig, Outcome, SerialLink, TestVector, Verdict, codec, harness, sample};

pub struct RunCommandConfig<'a> {
    pub port: &'a str,
    pub count: Option<usize>,
    pub vector: Option<&'a str>,
    pub chunk: Option<usize>,
    pub wait: Option<f64>,
    pub show_all: bool,
    pub output: Option<&'a str>,
    pub harness: HarnessConfig,
}

pub fn run(cfg: RunCommandConfig<'_>) -> Result<bool, HarnessError> {
    let mut vector = match (cfg.vector, cfg.count) {
        (Some(path), _) => TestVector::load(Path::new(path))?,
        (None, Some(count)) => TestVector {
            samples: sample::synthetic(count),
            schedule: Vec::new(),
        },
        (None, None) => {
            return Err(HarnessError::InvalidConfig(
                "either --count or --vector is required",
            ));
        }
    };

    if let (Some(chunk), Some(wait)) = (cfg.chunk, cfg.wait) {
        let payload_len = codec::encode_stream(&vector.samples).len();
        vector.schedule = super::uniform_schedule(payload_len, chunk, wait);
    }

    info!(
        "opening {} at {} baud, {} samples, {} schedule events",
        cfg.port,
        cfg.harness.baud_rate,
        vector.samples.len(),
        vector.schedule.len()
    );
    let mut link = SerialLink::open(cfg.port, &cfg.harness)?;
    let verdict = harness::run_vector(&mut link, &vector, &cfg.harness)?;

    print_verdict(&verdict, cfg.show_all);

    if let Some(path) = cfg.output {
        let json = serde_json::to_string_pretty(&verdict).map_err(io::Error::other)?;
        fs::write(path, json)?;
        println!("wrote {path}");
    }

    Ok(verdict.passed())
}

fn print_verdict(v: &Verdict, show_all: bool) {
    println!(
        "{:>5} {:>16} {:>16} {:>12}  {}",
        "idx", "expected", "actual", "diff", "ok"
    );
    for e in &v.elements {
        if show_all || !e.within {
            println!(
                "{:>5} {:>16.6e} {:>16.6e} {:>12.3e}  {}",
                e.index,
                e.expected,
                e.actual,
                e.diff,
                if e.within { "ok" } else { "MISMATCH" }
            );
        }
    }
    println!();
    println!(
        "bytes {}/{} received | {} mismatches | {:.3}s",
        v.received_bytes,
        v.expected_bytes,
        v.mismatches,
        v.elapsed.as_secs_f64()
    );
    match v.outcome {
        Outcome::Pass => println!("PASS"),
        Outcome::LengthMismatch => println!("FAIL (length mismatch)"),
        Outcome::NumericMismatch => println!("FAIL ({} numeric mismatches)", v.mismatches),
    }
}
