//! SpiDevice tests.
//!
//! The non-ignored tests run anywhere; tests marked `#[ignore]` need a real
//! spidev node (enable the SPI interface and run with `--ignored`, usually
//! as root). Hardware tests use bus 0 / chip-select 0 and are loopback-safe:
//! they only read registers or clock dummy bytes.

use std::sync::{Arc, Mutex};

use sbc_io::{Error, SpiDevice};

#[test]
fn opening_a_nonexistent_node_fails_with_init_error() {
    // No board routes bus 250; the node cannot exist.
    let mut dev = SpiDevice::new(250, 250);
    match dev.open() {
        Err(Error::SpiInit { path, .. }) => {
            assert_eq!(path.to_string_lossy(), "/dev/spidev250.250");
        }
        other => panic!("expected SpiInit, got {other:?}"),
    }
    assert!(!dev.is_open());
}

#[test]
fn init_error_mentions_enabling_the_interface() {
    let mut dev = SpiDevice::new(251, 0);
    let err = dev.open().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("/dev/spidev251.0"));
    assert!(message.contains("SPI interface enabled"));
}

#[test]
fn close_before_open_and_double_close_are_noops() {
    let mut dev = SpiDevice::new(0, 0);
    dev.close();
    dev.close();
    assert!(!dev.is_open());
}

#[test]
fn device_path_formats_bus_and_chip_select() {
    assert_eq!(
        SpiDevice::new(1, 2).path().to_string_lossy(),
        "/dev/spidev1.2"
    );
}

// --- Hardware tests (require a real spidev node) ---

fn open_test_device() -> Option<SpiDevice> {
    let mut dev = SpiDevice::new(0, 0);
    match dev.open() {
        Ok(()) => Some(dev),
        Err(_) => {
            println!("No /dev/spidev0.0, skipping hardware test");
            None
        }
    }
}

#[test]
#[ignore] // Requires hardware
fn transaction_returns_exactly_as_many_bytes_as_sent() {
    let Some(mut dev) = open_test_device() else {
        return;
    };
    for len in [1usize, 4, 32, 256] {
        let tx = vec![0u8; len];
        let rx = dev.transaction(&tx).unwrap();
        assert_eq!(rx.len(), len);
    }
}

#[test]
#[ignore] // Requires hardware
fn observer_runs_before_each_transfer() {
    let Some(mut dev) = open_test_device() else {
        return;
    };
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    dev.set_transaction_observer(Some(Box::new(move |tx| {
        sink.lock().unwrap().push(tx.to_vec());
    })));
    dev.transaction(&[0x9F, 0x00, 0x00, 0x00]).unwrap();
    assert_eq!(seen.lock().unwrap().as_slice(), &[vec![0x9F, 0x00, 0x00, 0x00]]);
}

#[test]
#[ignore] // Requires hardware
fn clock_mode_round_trips() {
    let Some(mut dev) = open_test_device() else {
        return;
    };
    let original = dev.clock_mode().unwrap();
    dev.set_clock_mode(sbc_io::SPI_MODE_1).unwrap();
    assert_eq!(dev.clock_mode().unwrap() & 0x03, sbc_io::SPI_MODE_1);
    dev.set_clock_mode(original).unwrap();
}

#[test]
#[ignore] // Requires hardware
fn speed_round_trips() {
    let Some(mut dev) = open_test_device() else {
        return;
    };
    let original = dev.speed_hz().unwrap();
    dev.set_speed_hz(500_000).unwrap();
    assert_eq!(dev.speed_hz().unwrap(), 500_000);
    dev.set_speed_hz(original).unwrap();
}
