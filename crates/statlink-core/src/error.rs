//! Error taxonomy for the harness.
//!
//! Configuration errors are raised before any byte touches the link. Protocol
//! problems in the device's reply (wrong byte count) are *not* errors — they
//! become a [`crate::verdict::Outcome::LengthMismatch`] verdict — except for a
//! response that cannot even be framed as whole 32-bit floats, which surfaces
//! as [`HarnessError::TruncatedFrame`] from the codec. Link I/O failures are
//! fatal; a read timeout is not a failure and never reaches this type.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Zero non-sentinel samples. The channel medians are undefined.
    #[error("sample stream is empty; channel medians are undefined")]
    EmptyStream,

    /// A vector file whose last sample is not the (0, 0, 0) terminator.
    #[error("vector file does not end with the (0, 0, 0) sentinel triple")]
    MissingSentinel,

    /// Malformed vector file content, with a 1-based line number.
    #[error("vector file line {line}: {msg}")]
    VectorFormat { line: usize, msg: String },

    /// A sending schedule whose chunk sizes do not sum to the payload length.
    #[error(
        "sending schedule covers {scheduled} bytes but the encoded payload is {payload} bytes"
    )]
    ScheduleMismatch { scheduled: usize, payload: usize },

    /// A harness configuration value that cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// A response buffer whose length is not a multiple of 4.
    #[error("response length {len} is not a multiple of 4 (truncated frame)")]
    TruncatedFrame { len: usize },

    /// The receiver thread died; its buffer is unrecoverable.
    #[error("receiver task panicked mid-run")]
    ReceiverPanicked,

    /// Fatal link I/O failure (not a timeout).
    #[error("link i/o: {0}")]
    Io(#[from] io::Error),

    /// Serial port open/control failure.
    #[error("serial port: {0}")]
    Serial(#[from] serialport::Error),
}

impl HarnessError {
    /// True for errors detected before any I/O is attempted.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::EmptyStream
                | Self::MissingSentinel
                | Self::VectorFormat { .. }
                | Self::ScheduleMismatch { .. }
                | Self::InvalidConfig(_)
        )
    }
}
