//! One conformance run, end to end.
//!
//! Order of operations is the correctness-critical part: the receiver thread
//! starts before the first byte is transmitted, and it is joined (after its
//! final catch-up read) only once the transmitter's last write and waits have
//! completed. The two tasks share nothing but the split link halves and one
//! stop channel.

use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use log::{debug, info};

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::link::Link;
use crate::pacing::SendingEvent;
use crate::sample::{Sample, TestVector};
use crate::verdict::Verdict;
use crate::{codec, oracle, pacing, receiver, verdict};

/// Execute one run: oracle, encode, paced transmit with concurrent drain,
/// decode, verdict. The link is exclusively owned for the duration.
pub fn run(
    link: &mut dyn Link,
    samples: &[Sample],
    schedule: &[SendingEvent],
    cfg: &HarnessConfig,
) -> Result<Verdict, HarnessError> {
    cfg.validate()?;
    let expected = oracle::result_stream(samples, cfg)?;
    let payload = codec::encode_stream(samples);
    pacing::validate_schedule(schedule, payload.len())?;
    debug!(
        "run: {} samples, {} expected values, {} payload bytes, {} schedule events",
        samples.len(),
        expected.len(),
        payload.len(),
        schedule.len()
    );

    link.clear_buffers()?;
    let mut rx = link.rx_handle()?;
    let read_chunk = cfg.read_chunk;

    let started = Instant::now();
    let (stop_tx, stop_rx) = mpsc::channel();

    let received = thread::scope(|s| {
        let drainer = s.spawn(move || receiver::drain(rx.as_mut(), &stop_rx, read_chunk));
        let sent = pacing::transmit(link, &payload, schedule);
        // Stop the receiver whether or not transmission succeeded, so the
        // scope can never deadlock on a spinning drain loop.
        let _ = stop_tx.send(());
        let drained = match drainer.join() {
            Ok(result) => result,
            Err(_) => Err(HarnessError::ReceiverPanicked),
        };
        sent.and(drained)
    })?;
    let elapsed = started.elapsed();

    link.clear_buffers()?;

    // A reply truncated mid-float still gets its whole-float prefix compared;
    // the verdict carries the raw byte count for the length check.
    let whole = received.len() - received.len() % codec::FLOAT_BYTES;
    let actual = codec::decode_values(&received[..whole])?;
    let v = verdict::compare(&expected, &actual, received.len(), elapsed, cfg);
    info!(
        "run finished: {:?}, {}/{} bytes, {} mismatches, {:.3}s",
        v.outcome,
        v.received_bytes,
        v.expected_bytes,
        v.mismatches,
        elapsed.as_secs_f64()
    );
    Ok(v)
}

/// Run a parsed test vector (samples plus its optional schedule).
pub fn run_vector(
    link: &mut dyn Link,
    vector: &TestVector,
    cfg: &HarnessConfig,
) -> Result<Verdict, HarnessError> {
    run(link, &vector.samples, &vector.schedule, cfg)
}
