//! Paced transmission.
//!
//! A sending schedule chops the encoded payload into timed chunks to emulate
//! a slow or bursty link. The schedule must cover the payload exactly; a
//! schedule that under- or overruns it is a harness bug and is rejected
//! before a single byte is written.

use std::thread;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;
use crate::link::Link;

/// One schedule entry: flush `chunk_bytes`, then block for `wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendingEvent {
    pub chunk_bytes: usize,
    pub wait: Duration,
}

/// Check that a schedule's chunk sizes sum exactly to the payload length.
/// An empty schedule means one contiguous write and is always valid.
pub fn validate_schedule(
    schedule: &[SendingEvent],
    payload_len: usize,
) -> Result<(), HarnessError> {
    if schedule.is_empty() {
        return Ok(());
    }
    let scheduled: usize = schedule.iter().map(|e| e.chunk_bytes).sum();
    if scheduled != payload_len {
        return Err(HarnessError::ScheduleMismatch {
            scheduled,
            payload: payload_len,
        });
    }
    Ok(())
}

/// Write the payload to the link, honoring the schedule. Validation happens
/// first, so a bad schedule never reaches the wire.
pub fn transmit(
    link: &mut dyn Link,
    payload: &[u8],
    schedule: &[SendingEvent],
) -> Result<(), HarnessError> {
    validate_schedule(schedule, payload.len())?;

    if schedule.is_empty() {
        link.send(payload)?;
        debug!("transmitted {} bytes contiguously", payload.len());
        return Ok(());
    }

    let mut offset = 0;
    for (i, ev) in schedule.iter().enumerate() {
        link.send(&payload[offset..offset + ev.chunk_bytes])?;
        offset += ev.chunk_bytes;
        debug!(
            "event {i}: wrote {} bytes ({offset}/{} total), waiting {:?}",
            ev.chunk_bytes,
            payload.len(),
            ev.wait
        );
        thread::sleep(ev.wait);
    }
    Ok(())
}
