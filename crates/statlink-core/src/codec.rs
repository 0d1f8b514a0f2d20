//! Binary wire codec.
//!
//! Device-facing input is a run of little-endian 32-bit float triples closed
//! by the `(0, 0, 0)` sentinel triple; the response is a flat run of
//! little-endian 32-bit floats. Decoding rejects buffers that are not a whole
//! number of floats instead of silently truncating.

use crate::error::HarnessError;
use crate::sample::Sample;

/// Bytes per wire value.
pub const FLOAT_BYTES: usize = 4;

/// Encode a sample stream for transmission, sentinel triple appended last.
pub fn encode_stream(samples: &[Sample]) -> Vec<u8> {
    let mut out = Vec::with_capacity((samples.len() + 1) * 3 * FLOAT_BYTES);
    for s in samples {
        push_value(&mut out, s.x);
        push_value(&mut out, s.y);
        push_value(&mut out, s.z);
    }
    push_value(&mut out, Sample::SENTINEL.x);
    push_value(&mut out, Sample::SENTINEL.y);
    push_value(&mut out, Sample::SENTINEL.z);
    out
}

/// Encode a flat value sequence in response layout. The scripted fake
/// devices in the test suite use this to fabricate replies.
pub fn encode_values(values: &[f64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * FLOAT_BYTES);
    for &v in values {
        push_value(&mut out, v);
    }
    out
}

/// Decode a response buffer into its float values (widened to f64).
///
/// A length that is not a multiple of 4 is a truncated frame, never a
/// best-effort partial decode.
pub fn decode_values(buf: &[u8]) -> Result<Vec<f64>, HarnessError> {
    if buf.len() % FLOAT_BYTES != 0 {
        return Err(HarnessError::TruncatedFrame { len: buf.len() });
    }
    Ok(buf
        .chunks_exact(FLOAT_BYTES)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
        .collect())
}

fn push_value(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&(v as f32).to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_round_trip_within_f32_rounding() {
        let samples = vec![
            Sample::new(1.1, 2.2, 3.3),
            Sample::new(-4.4, 5.5, -6.6),
            Sample::new(0.0, 7.7, 0.0),
        ];
        let encoded = encode_stream(&samples);
        assert_eq!(encoded.len(), (samples.len() + 1) * 3 * FLOAT_BYTES);

        let decoded = decode_values(&encoded).unwrap();
        assert_eq!(decoded.len(), (samples.len() + 1) * 3);
        for (i, s) in samples.iter().enumerate() {
            for (j, v) in [s.x, s.y, s.z].into_iter().enumerate() {
                let got = decoded[3 * i + j];
                assert!((got - v).abs() <= v.abs() * 1e-6, "at {i}/{j}: {got} vs {v}");
            }
        }
        // Sentinel triple is last.
        assert_eq!(&decoded[decoded.len() - 3..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_stream_encodes_only_the_sentinel() {
        let encoded = encode_stream(&[]);
        assert_eq!(encoded.len(), 3 * FLOAT_BYTES);
        assert!(encoded.iter().all(|&b| b == 0));
    }

    #[test]
    fn values_are_little_endian_f32() {
        let encoded = encode_values(&[1.0]);
        assert_eq!(encoded, 1.0f32.to_le_bytes());
    }

    #[test]
    fn non_multiple_of_four_is_a_length_error() {
        for len in [1, 2, 3, 5, 7, 1023] {
            let buf = vec![0u8; len];
            match decode_values(&buf) {
                Err(HarnessError::TruncatedFrame { len: got }) => assert_eq!(got, len),
                other => panic!("len {len}: expected TruncatedFrame, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert!(decode_values(&[]).unwrap().is_empty());
    }
}
