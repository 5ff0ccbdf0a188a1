//! Sampling over a real pseudo-terminal instead of an in-memory pipe

mod common;

use common::*;
use tokio::io::AsyncReadExt;
use tokio::time::{sleep, timeout};
use tokio_serial::SerialStream;
use um25c_lib::constants::DEFAULT_BAUD_RATE;
use um25c_lib::serial;

#[tokio::test]
async fn test_shutdown_while_tty_read_stalls() {
    // The meter end sees our requests but never answers
    let (mut meter_end, host_end) = SerialStream::pair().expect("failed to create pty pair");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    let config = SamplerConfig::new("Volt", 1.0).unwrap();
    let mut sampler = Sampler::new(Um25c::new(host_end), config, shutdown);

    tokio::spawn(async move {
        sleep(Duration::from_millis(200)).await;
        trigger.request();
    });

    let mut out = Vec::new();
    let summary = timeout(Duration::from_secs(5), sampler.run(&mut out))
        .await
        .expect("run() did not return after shutdown with a stalled tty read")
        .unwrap();
    assert_eq!(summary.samples, 0);
    assert_eq!(summary.stop, StopReason::Interrupted);
    assert!(out.is_empty());

    let mut request = [0u8; 1];
    timeout(Duration::from_secs(1), meter_end.read_exact(&mut request))
        .await
        .expect("request byte never reached the meter end")
        .unwrap();
    assert_eq!(request, [0xF0]);
}

#[tokio::test]
async fn test_open_missing_device_fails() {
    assert!(matches!(
        serial::open("/dev/um25c-does-not-exist", DEFAULT_BAUD_RATE),
        Err(UmError::Serial(_))
    ));
}
