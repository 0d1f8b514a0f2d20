//! Concurrent response drain.
//!
//! The device may start replying at any point during transmission, and the
//! OS-side receive buffer is small. The drain loop therefore runs on its own
//! thread from before the first byte is written, pulling whatever is
//! available on every bounded-timeout read. Stopping is cooperative: after
//! the transmitter signals done, one final bounded read catches in-flight
//! bytes before the buffer is handed back.

use std::sync::mpsc::{Receiver, TryRecvError};

use log::{debug, trace};

use crate::error::HarnessError;
use crate::link::LinkRx;

/// Drain the receive half into a growing buffer until `stop` fires, then
/// perform one final bounded read and return everything collected.
///
/// A read that returns zero bytes only means no data is currently available;
/// it never terminates the loop on its own.
pub fn drain(
    rx: &mut dyn LinkRx,
    stop: &Receiver<()>,
    read_chunk: usize,
) -> Result<Vec<u8>, HarnessError> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; read_chunk];

    loop {
        // Snapshot the stop state *before* reading, so a signal that arrives
        // mid-read still gets the final catch-up pass below.
        let stopped = !matches!(stop.try_recv(), Err(TryRecvError::Empty));

        let n = rx.recv(&mut buf)?;
        if n > 0 {
            trace!("drained {n} bytes ({} total)", out.len() + n);
            out.extend_from_slice(&buf[..n]);
        }

        if stopped {
            let n = rx.recv(&mut buf)?;
            if n > 0 {
                out.extend_from_slice(&buf[..n]);
            }
            debug!("receiver stopped after {} bytes", out.len());
            return Ok(out);
        }
    }
}
