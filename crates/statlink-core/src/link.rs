//! Link abstraction over the serial line.
//!
//! The harness never talks to `serialport` directly: it goes through the
//! [`Link`] seam so the test suite can substitute the in-memory loopback in
//! [`mem`]. A link is exclusively owned by one run; the receive side is split
//! off as an independent [`LinkRx`] handle so the drain loop can run on its
//! own thread while the transmitter keeps writing.

use std::io::{Read, Write};

use serialport::{ClearBuffer, DataBits, Parity, SerialPort, StopBits};

use crate::config::HarnessConfig;
use crate::error::HarnessError;

/// Receive half of a link. `recv` blocks for at most the link's configured
/// read timeout; `Ok(0)` means nothing arrived, which is not an error.
pub trait LinkRx: Send {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, HarnessError>;
}

/// A full-duplex link to the device under test.
pub trait Link {
    /// Blocking write of the whole buffer.
    fn send(&mut self, buf: &[u8]) -> Result<(), HarnessError>;

    /// Discard anything pending in the input and output buffers. Invoked
    /// before and after every run.
    fn clear_buffers(&mut self) -> Result<(), HarnessError>;

    /// Split off an independently owned receive half.
    fn rx_handle(&self) -> Result<Box<dyn LinkRx>, HarnessError>;
}

// ---------------------------------------------------------------------------
// Serial link
// ---------------------------------------------------------------------------

/// Serial link at the configured baud rate, 8 data bits, no parity, 1 stop
/// bit, with a bounded read timeout.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    pub fn open(path: &str, cfg: &HarnessConfig) -> Result<Self, HarnessError> {
        let port = serialport::new(path, cfg.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(cfg.read_timeout)
            .open()?;
        Ok(Self { port })
    }
}

impl Link for SerialLink {
    fn send(&mut self, buf: &[u8]) -> Result<(), HarnessError> {
        self.port.write_all(buf)?;
        self.port.flush()?;
        Ok(())
    }

    fn clear_buffers(&mut self) -> Result<(), HarnessError> {
        self.port.clear(ClearBuffer::All)?;
        Ok(())
    }

    fn rx_handle(&self) -> Result<Box<dyn LinkRx>, HarnessError> {
        Ok(Box::new(SerialRx {
            port: self.port.try_clone()?,
        }))
    }
}

struct SerialRx {
    port: Box<dyn SerialPort>,
}

impl LinkRx for SerialRx {
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, HarnessError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory loopback
// ---------------------------------------------------------------------------

/// In-memory loopback link for harness self-tests.
///
/// The device-to-harness direction has a bounded capacity: bytes written while
/// the buffer is full are dropped and counted, the same way a UART without
/// flow control overruns a receive buffer nobody drains. This is what makes
/// the no-byte-loss property of the concurrent receiver testable.
pub mod mem {
    use std::collections::VecDeque;
    use std::sync::{Arc, Condvar, Mutex};
    use std::time::{Duration, Instant};

    use super::{Link, LinkRx};
    use crate::error::HarnessError;

    struct PipeState {
        data: VecDeque<u8>,
        dropped: usize,
    }

    /// One direction of byte flow with a capacity cap.
    struct Pipe {
        state: Mutex<PipeState>,
        readable: Condvar,
        capacity: usize,
    }

    impl Pipe {
        fn new(capacity: usize) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(PipeState {
                    data: VecDeque::new(),
                    dropped: 0,
                }),
                readable: Condvar::new(),
                capacity,
            })
        }

        /// Write without blocking; bytes beyond capacity are lost.
        fn write(&self, bytes: &[u8]) {
            let mut st = self.state.lock().unwrap();
            for &b in bytes {
                if st.data.len() < self.capacity {
                    st.data.push_back(b);
                } else {
                    st.dropped += 1;
                }
            }
            drop(st);
            self.readable.notify_all();
        }

        /// Read up to `buf.len()` bytes, waiting at most `timeout` for the
        /// first byte. Returns 0 on timeout.
        fn read(&self, buf: &mut [u8], timeout: Duration) -> usize {
            let deadline = Instant::now() + timeout;
            let mut st = self.state.lock().unwrap();
            while st.data.is_empty() {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return 0;
                }
                let (guard, _) = self.readable.wait_timeout(st, remaining).unwrap();
                st = guard;
            }
            let n = buf.len().min(st.data.len());
            for slot in buf.iter_mut().take(n) {
                *slot = st.data.pop_front().unwrap_or(0);
            }
            n
        }

        fn drain(&self) {
            self.state.lock().unwrap().data.clear();
        }

        fn dropped(&self) -> usize {
            self.state.lock().unwrap().dropped
        }
    }

    /// Harness-side endpoint.
    pub struct MemoryLink {
        to_device: Arc<Pipe>,
        from_device: Arc<Pipe>,
        read_timeout: Duration,
    }

    /// Device-side endpoint, held by a scripted fake device.
    pub struct DeviceEnd {
        rx: Arc<Pipe>,
        tx: Arc<Pipe>,
        read_timeout: Duration,
    }

    /// Create a connected link pair. `rx_capacity` bounds the
    /// device-to-harness buffer; the opposite direction is unbounded.
    pub fn pair(rx_capacity: usize, read_timeout: Duration) -> (MemoryLink, DeviceEnd) {
        let to_device = Pipe::new(usize::MAX);
        let from_device = Pipe::new(rx_capacity);
        (
            MemoryLink {
                to_device: Arc::clone(&to_device),
                from_device: Arc::clone(&from_device),
                read_timeout,
            },
            DeviceEnd {
                rx: to_device,
                tx: from_device,
                read_timeout,
            },
        )
    }

    impl Link for MemoryLink {
        fn send(&mut self, buf: &[u8]) -> Result<(), HarnessError> {
            self.to_device.write(buf);
            Ok(())
        }

        fn clear_buffers(&mut self) -> Result<(), HarnessError> {
            self.to_device.drain();
            self.from_device.drain();
            Ok(())
        }

        fn rx_handle(&self) -> Result<Box<dyn LinkRx>, HarnessError> {
            Ok(Box::new(MemoryRx {
                pipe: Arc::clone(&self.from_device),
                read_timeout: self.read_timeout,
            }))
        }
    }

    pub struct MemoryRx {
        pipe: Arc<Pipe>,
        read_timeout: Duration,
    }

    impl LinkRx for MemoryRx {
        fn recv(&mut self, buf: &mut [u8]) -> Result<usize, HarnessError> {
            Ok(self.pipe.read(buf, self.read_timeout))
        }
    }

    impl DeviceEnd {
        /// Read from the harness-to-device direction, waiting at most the
        /// pair's read timeout. Returns 0 on timeout.
        pub fn read(&self, buf: &mut [u8]) -> usize {
            self.rx.read(buf, self.read_timeout)
        }

        /// Emit bytes toward the harness. What does not fit in the bounded
        /// buffer is dropped.
        pub fn write(&self, bytes: &[u8]) {
            self.tx.write(bytes);
        }

        /// Bytes lost to the bounded buffer so far.
        pub fn dropped(&self) -> usize {
            self.tx.dropped()
        }
    }

}
