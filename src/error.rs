use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while driving SPI devices and sysfs GPIO pins.
///
/// Variants fall into four groups: configuration errors (the operation is
/// invalid for the resource's current state), unavailable resources (device
/// node or sysfs entry missing or not ready in time), syscall-level I/O
/// failures, and invalid arguments. Nothing is retried; every failure
/// surfaces immediately.
#[derive(Error, Debug)]
pub enum Error {
    /// The spidev node could not be opened. Usually means the SPI interface
    /// is disabled on the host or the bus/chip-select numbers are wrong.
    #[error(
        "cannot open SPI device {}: {source}. Is the SPI interface enabled? \
         (On Raspberry Pi: `sudo raspi-config`, Interface Options, SPI.)",
        .path.display()
    )]
    SpiInit {
        /// The device node that was opened.
        path: PathBuf,
        /// The underlying open(2) failure.
        source: io::Error,
    },
    /// A sysfs entry did not become accessible within the wait window.
    #[error("waited too long for file permissions on {}", .path.display())]
    AccessTimeout {
        /// The path that never became accessible.
        path: PathBuf,
    },
    /// Syscall-level failure during a transfer or register access.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The pin is configured as an input; its value cannot be driven.
    #[error("gpio{pin} is not an output pin")]
    NotAnOutput {
        /// The pin whose value was written.
        pin: u32,
    },
    /// The pin has been closed (or was never opened); value and fd
    /// operations are rejected.
    #[error("gpio{pin} is closed")]
    PinClosed {
        /// The pin that was accessed.
        pin: u32,
    },
    /// The SPI device has been closed (or was never opened).
    #[error("SPI device spidev{bus}.{chip_select} is not open")]
    DeviceClosed {
        /// Bus number of the device.
        bus: u8,
        /// Chip-select number of the device.
        chip_select: u8,
    },
    /// A word handed to the codec does not fit in a wire byte.
    #[error("word 0x{value:04X} at index {index} is out of range (0-255)")]
    WordOutOfRange {
        /// Position of the offending word in the input.
        index: usize,
        /// The offending value.
        value: u16,
    },
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
