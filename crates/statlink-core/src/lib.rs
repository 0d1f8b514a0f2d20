//! # statlink-core
//!
//! **Oracle and harness for serial windowed-statistics devices.**
//!
//! The device under test consumes a stream of 3-channel little-endian f32
//! samples over a serial link and replies, over the same link, with one
//! 21-value statistics block per 100-sample tumbling window plus three
//! trailing whole-stream channel medians. This crate is everything needed to
//! prove a device conforms: the reference oracle, the wire codec, paced
//! transmission, a concurrent response drain, and a tolerance-based verdict.
//!
//! ## Quick Start
//!
//! ```no_run
//! use statlink_core::{HarnessConfig, SerialLink, harness, sample};
//!
//! let cfg = HarnessConfig::default();
//! let mut link = SerialLink::open("/dev/ttyACM0", &cfg)?;
//! let samples = sample::synthetic(1000);
//! let verdict = harness::run(&mut link, &samples, &[], &cfg)?;
//! println!("pass: {}", verdict.passed());
//! # Ok::<(), statlink_core::HarnessError>(())
//! ```
//!
//! ## Architecture
//!
//! Sample Source → {Oracle, Codec(encode)} → Paced Transmitter → link →
//! device → link → Concurrent Receiver → Codec(decode) → Verdict Engine
//!
//! The receiver runs on its own thread from before the first byte is written
//! and drains continuously — a receiver that only runs after transmission
//! loses bytes to bounded OS receive buffers on large streams.

pub mod codec;
pub mod config;
pub mod error;
pub mod harness;
pub mod link;
pub mod oracle;
pub mod pacing;
pub mod receiver;
pub mod sample;
pub mod verdict;

pub use config::{HarnessConfig, SkewnessBias};
pub use error::HarnessError;
pub use link::{Link, LinkRx, SerialLink};
pub use oracle::{MEDIAN_VALUES, STATS_PER_WINDOW, result_len, result_stream};
pub use pacing::SendingEvent;
pub use sample::{Sample, TestVector, synthetic};
pub use verdict::{ElementCheck, Outcome, Verdict};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
