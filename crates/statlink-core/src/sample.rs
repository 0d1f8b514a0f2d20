//! Sample streams: the 3-channel triple, synthetic generation, and the
//! test-vector file format.
//!
//! A vector file is plain text: a sample count, that many `x y z` lines of
//! decimal floats (the last of which must be the `(0, 0, 0)` sentinel), and
//! optionally an event count followed by that many `bytes wait_seconds`
//! lines describing a sending schedule. The loader strips the sentinel; the
//! codec re-appends it on encode.

use std::fs;
use std::path::Path;
use std::time::Duration;

use rand::Rng;

use crate::error::HarnessError;
use crate::pacing::SendingEvent;

/// One 3-channel sample. Computed in f64, transmitted as f32.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Sample {
    /// End-of-stream marker. Excluded from every statistic.
    pub const SENTINEL: Sample = Sample {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_sentinel(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

/// Generate `count` uniform random samples in `[0, 1)` per channel.
pub fn synthetic(count: usize) -> Vec<Sample> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| {
            Sample::new(
                rng.random::<f64>(),
                rng.random::<f64>(),
                rng.random::<f64>(),
            )
        })
        .collect()
}

/// A parsed test vector: samples with the sentinel already stripped, plus an
/// optional sending schedule.
#[derive(Debug, Clone, Default)]
pub struct TestVector {
    pub samples: Vec<Sample>,
    pub schedule: Vec<SendingEvent>,
}

impl TestVector {
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Parse vector-file text. All failures are configuration errors carrying
    /// the offending 1-based line number.
    pub fn parse(text: &str) -> Result<Self, HarnessError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let (line, count_str) = lines.next().ok_or(HarnessError::VectorFormat {
            line: 1,
            msg: "missing sample count".into(),
        })?;
        let count: usize = count_str.parse().map_err(|_| HarnessError::VectorFormat {
            line,
            msg: format!("expected a sample count, got {count_str:?}"),
        })?;

        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            let (line, text) = lines.next().ok_or_else(|| HarnessError::VectorFormat {
                line: 0,
                msg: format!("file ends before {count} samples were read"),
            })?;
            let fields = parse_floats(line, text, 3)?;
            samples.push(Sample::new(fields[0], fields[1], fields[2]));
        }

        match samples.pop() {
            Some(last) if last.is_sentinel() => {}
            _ => return Err(HarnessError::MissingSentinel),
        }
        if samples.is_empty() {
            return Err(HarnessError::EmptyStream);
        }

        let mut schedule = Vec::new();
        if let Some((line, count_str)) = lines.next() {
            let events: usize = count_str.parse().map_err(|_| HarnessError::VectorFormat {
                line,
                msg: format!("expected an event count, got {count_str:?}"),
            })?;
            schedule.reserve(events);
            for _ in 0..events {
                let (line, text) = lines.next().ok_or_else(|| HarnessError::VectorFormat {
                    line: 0,
                    msg: format!("file ends before {events} sending events were read"),
                })?;
                let fields = parse_floats(line, text, 2)?;
                if fields[0] < 0.0 || fields[0].fract() != 0.0 {
                    return Err(HarnessError::VectorFormat {
                        line,
                        msg: format!("chunk size must be a non-negative integer, got {}", fields[0]),
                    });
                }
                if fields[1] < 0.0 {
                    return Err(HarnessError::VectorFormat {
                        line,
                        msg: format!("wait must be non-negative, got {}", fields[1]),
                    });
                }
                schedule.push(SendingEvent {
                    chunk_bytes: fields[0] as usize,
                    wait: Duration::from_secs_f64(fields[1]),
                });
            }
            if let Some((line, text)) = lines.next() {
                return Err(HarnessError::VectorFormat {
                    line,
                    msg: format!("unexpected trailing content {text:?}"),
                });
            }
        }

        Ok(Self { samples, schedule })
    }

    /// Render back to the file format. The sentinel line is re-appended.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", self.samples.len() + 1));
        for s in &self.samples {
            out.push_str(&format!("{} {} {}\n", s.x, s.y, s.z));
        }
        out.push_str("0 0 0\n");
        if !self.schedule.is_empty() {
            out.push_str(&format!("{}\n", self.schedule.len()));
            for ev in &self.schedule {
                out.push_str(&format!("{} {}\n", ev.chunk_bytes, ev.wait.as_secs_f64()));
            }
        }
        out
    }
}

fn parse_floats(line: usize, text: &str, want: usize) -> Result<Vec<f64>, HarnessError> {
    let fields: Vec<f64> = text
        .split_whitespace()
        .map(|f| f.parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| HarnessError::VectorFormat {
            line,
            msg: format!("expected {want} decimal floats, got {text:?}"),
        })?;
    if fields.len() != want {
        return Err(HarnessError::VectorFormat {
            line,
            msg: format!("expected {want} fields, got {}", fields.len()),
        });
    }
    Ok(fields)
}
