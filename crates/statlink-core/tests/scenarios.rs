//! End-to-end scenarios for statlink-core.
//!
//! Each test wires the full pipeline — oracle → codec → paced transmit with
//! concurrent drain → decode → verdict — against a scripted fake device on
//! the in-memory loopback link.

use std::thread;
use std::time::Duration;

use statlink_core::link::mem::{self, DeviceEnd};
use statlink_core::{
    HarnessConfig, MEDIAN_VALUES, Outcome, STATS_PER_WINDOW, Sample, SendingEvent, TestVector,
    codec, harness, oracle,
};

fn cfg() -> HarnessConfig {
    HarnessConfig {
        read_timeout: Duration::from_millis(100),
        // Large enough that the post-stop catch-up read takes a whole reply
        // in one call even when the device answers late.
        read_chunk: 4096,
        ..HarnessConfig::default()
    }
}

/// Consume the whole harness payload, then write the reply in one piece.
fn echo_after_input(device: &DeviceEnd, input_len: usize, reply: &[u8]) {
    let mut consumed = 0;
    let mut buf = [0u8; 256];
    while consumed < input_len {
        consumed += device.read(&mut buf);
    }
    device.write(reply);
}

/// The conforming device reply: the oracle's values narrowed to f32.
fn conforming_reply(samples: &[Sample], cfg: &HarnessConfig) -> Vec<u8> {
    codec::encode_values(&oracle::result_stream(samples, cfg).expect("oracle"))
}

#[test]
fn scenario_constant_window_passes() {
    // 100 identical (1,1,1) triples: one StatBlock with min=max=mean=1,
    // variance 0, guarded skewness/kurtosis/correlations of 0; medians (1,1,1).
    let cfg = cfg();
    let samples = vec![Sample::new(1.0, 1.0, 1.0); 100];

    let expected = oracle::result_stream(&samples, &cfg).unwrap();
    assert_eq!(expected.len(), STATS_PER_WINDOW + MEDIAN_VALUES);
    let (min, max, mean, var, skew, kurt) = (
        expected[0],
        expected[1],
        expected[2],
        expected[3],
        expected[4],
        expected[5],
    );
    assert_eq!((min, max, mean), (1.0, 1.0, 1.0));
    assert_eq!((var, skew, kurt), (0.0, 0.0, 0.0));
    assert_eq!(&expected[18..21], &[0.0, 0.0, 0.0], "guarded correlations");
    assert_eq!(&expected[21..], &[1.0, 1.0, 1.0], "medians");

    let (mut link, device) = mem::pair(4096, cfg.read_timeout);
    let input_len = codec::encode_stream(&samples).len();
    let reply = conforming_reply(&samples, &cfg);
    thread::scope(|s| {
        s.spawn(|| echo_after_input(&device, input_len, &reply));
        let v = harness::run(&mut link, &samples, &[], &cfg).unwrap();
        assert_eq!(v.outcome, Outcome::Pass, "verdict: {v:?}");
        assert_eq!(v.received_bytes, v.expected_bytes);
    });
}

#[test]
fn scenario_linear_ramp_two_windows() {
    // 250 samples with x = y = z = i: two full windows (trailing 50 dropped),
    // identical per-channel stats, all correlations 1, medians 124.5.
    let cfg = cfg();
    let samples: Vec<Sample> = (0..250)
        .map(|i| Sample::new(i as f64, i as f64, i as f64))
        .collect();

    let expected = oracle::result_stream(&samples, &cfg).unwrap();
    assert_eq!(expected.len(), 2 * STATS_PER_WINDOW + MEDIAN_VALUES);
    for block in 0..2 {
        let b = &expected[block * STATS_PER_WINDOW..(block + 1) * STATS_PER_WINDOW];
        // x, y, z channel stats are identical.
        assert_eq!(&b[0..6], &b[6..12]);
        assert_eq!(&b[0..6], &b[12..18]);
        for corr in &b[18..21] {
            assert!((corr - 1.0).abs() < 1e-12, "correlation {corr}");
        }
        let lo = (block * 100) as f64;
        assert_eq!(b[0], lo);
        assert_eq!(b[1], lo + 99.0);
    }
    assert_eq!(&expected[expected.len() - 3..], &[124.5, 124.5, 124.5]);

    let (mut link, device) = mem::pair(4096, cfg.read_timeout);
    let input_len = codec::encode_stream(&samples).len();
    let reply = conforming_reply(&samples, &cfg);
    thread::scope(|s| {
        s.spawn(|| echo_after_input(&device, input_len, &reply));
        let v = harness::run(&mut link, &samples, &[], &cfg).unwrap();
        assert_eq!(v.outcome, Outcome::Pass, "verdict: {v:?}");
    });
}

#[test]
fn scenario_schedule_underrun_fails_before_io() {
    let cfg = cfg();
    let (mut link, device) = mem::pair(4096, cfg.read_timeout);
    let samples = vec![Sample::new(1.0, 1.0, 1.0); 100];
    // Covers fewer bytes than the encoded payload.
    let schedule = [SendingEvent {
        chunk_bytes: 8,
        wait: Duration::ZERO,
    }];

    let err = harness::run(&mut link, &samples, &schedule, &cfg).unwrap_err();
    assert!(err.is_configuration(), "got {err}");
    let mut buf = [0u8; 16];
    assert_eq!(device.read(&mut buf), 0, "no bytes may have been written");
}

#[test]
fn scenario_truncated_reply_is_length_mismatch() {
    let cfg = cfg();
    let samples = vec![Sample::new(2.0, 3.0, 4.0); 100];
    let (mut link, device) = mem::pair(4096, cfg.read_timeout);
    let input_len = codec::encode_stream(&samples).len();

    // Exact prefix, 8 bytes short: a length failure, not a numeric one.
    let mut reply = conforming_reply(&samples, &cfg);
    reply.truncate(reply.len() - 8);

    thread::scope(|s| {
        s.spawn(|| echo_after_input(&device, input_len, &reply));
        let v = harness::run(&mut link, &samples, &[], &cfg).unwrap();
        assert_eq!(v.outcome, Outcome::LengthMismatch);
        assert_eq!(v.mismatches, 0, "the received prefix matched exactly");
        assert_eq!(v.received_bytes, v.expected_bytes - 8);
    });
}

#[test]
fn scenario_nonconforming_values_are_numeric_mismatch() {
    let cfg = cfg();
    let samples: Vec<Sample> = (0..100)
        .map(|i| Sample::new(i as f64, (i * 2) as f64, 0.5))
        .collect();
    let (mut link, device) = mem::pair(4096, cfg.read_timeout);
    let input_len = codec::encode_stream(&samples).len();

    // Right length, one corrupted element.
    let mut values = oracle::result_stream(&samples, &cfg).unwrap();
    values[2] += 1.0;
    let reply = codec::encode_values(&values);

    thread::scope(|s| {
        s.spawn(|| echo_after_input(&device, input_len, &reply));
        let v = harness::run(&mut link, &samples, &[], &cfg).unwrap();
        assert_eq!(v.outcome, Outcome::NumericMismatch);
        assert_eq!(v.mismatches, 1);
        assert!(!v.elements[2].within);
    });
}

#[test]
fn bursty_reply_through_tiny_buffer_loses_nothing() {
    // Regression target for the no-concurrent-receiver failure mode: the
    // device-to-harness buffer holds 64 bytes while the reply is ~2 KiB,
    // emitted in bursts during the transmitter's scheduled wait. Only a drain
    // loop that runs concurrently keeps the buffer from overflowing.
    let cfg = HarnessConfig {
        window_size: 4,
        read_timeout: Duration::from_millis(100),
        read_chunk: 64,
        ..HarnessConfig::default()
    };
    let samples: Vec<Sample> = (0..100)
        .map(|i| Sample::new(i as f64, 1.0 + i as f64, 2.0 * i as f64))
        .collect();
    let reply = conforming_reply(&samples, &cfg);
    assert!(reply.len() > 2000, "reply must dwarf the 64-byte buffer");

    let (mut link, device) = mem::pair(64, cfg.read_timeout);
    let payload_len = codec::encode_stream(&samples).len();
    // One contiguous chunk, then a wait long enough for the whole reply.
    let schedule = [SendingEvent {
        chunk_bytes: payload_len,
        wait: Duration::from_millis(250),
    }];

    thread::scope(|s| {
        s.spawn(|| {
            // Start replying as soon as the stream starts arriving.
            let mut buf = [0u8; 256];
            while device.read(&mut buf) == 0 {}
            for burst in reply.chunks(48) {
                device.write(burst);
                thread::sleep(Duration::from_millis(2));
            }
        });
        let v = harness::run(&mut link, &samples, &schedule, &cfg).unwrap();
        assert_eq!(v.outcome, Outcome::Pass, "verdict: {v:?}");
        assert_eq!(v.received_bytes, reply.len());
    });
    assert_eq!(device.dropped(), 0, "concurrent drain must prevent overruns");
}

#[test]
fn vector_file_drives_a_full_run() {
    let cfg = HarnessConfig {
        window_size: 2,
        read_timeout: Duration::from_millis(100),
        read_chunk: 4096,
        ..HarnessConfig::default()
    };
    let text = "5\n1 2 3\n4 5 6\n7 8 9\n10 11 12\n0 0 0\n2\n36 0.02\n24 0\n";
    let vector = TestVector::parse(text).unwrap();
    assert_eq!(vector.samples.len(), 4);
    assert_eq!(vector.schedule.len(), 2);

    let (mut link, device) = mem::pair(4096, cfg.read_timeout);
    let input_len = codec::encode_stream(&vector.samples).len();
    assert_eq!(
        input_len, 60,
        "schedule in the vector must cover the payload"
    );
    let reply = conforming_reply(&vector.samples, &cfg);

    thread::scope(|s| {
        s.spawn(|| echo_after_input(&device, input_len, &reply));
        let v = harness::run_vector(&mut link, &vector, &cfg).unwrap();
        assert_eq!(v.outcome, Outcome::Pass, "verdict: {v:?}");
    });
}
