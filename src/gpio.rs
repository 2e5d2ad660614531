//! GPIO pin control through the sysfs pseudo-filesystem.
//!
//! A [`Pin`] owns the sysfs representation of one pin: it is exported on
//! [`open`](Pin::open), configured, and returned to a neutral state and
//! unexported on [`close`](Pin::close) or drop. Edge events are not
//! delivered by this crate; configure a trigger with
//! [`set_interrupt`](Pin::set_interrupt) and poll the descriptor from
//! [`fileno`](Pin::fileno) with poll/select/epoll externally.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, warn};

use crate::consts;
use crate::error::{Error, Result};
use crate::wait::{wait_until_access, AccessMode};

/// How long to wait for the kernel (and udev) to finish creating a pin's
/// sysfs entries after export.
const EXPORT_TIMEOUT: Duration = Duration::from_secs(1);

/// Signal direction of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    fn as_sysfs(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// Voltage transition that raises an edge event on an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Edge {
    #[default]
    None,
    Rising,
    Falling,
    Both,
}

impl Edge {
    fn as_sysfs(self) -> &'static str {
        match self {
            Edge::None => "none",
            Edge::Rising => "rising",
            Edge::Falling => "falling",
            Edge::Both => "both",
        }
    }
}

/// Pull resistor wiring of a pin. Informational only: the sysfs interface
/// cannot program pulls, but boards often fix them in hardware and callers
/// want to carry that fact alongside the pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    Up,
    Down,
}

/// Locations of the sysfs GPIO control tree.
///
/// The defaults point at the real kernel paths; tests point a [`Pin`] at a
/// mock tree instead via [`Pin::with_sysfs_paths`].
#[derive(Debug, Clone)]
pub struct SysfsPaths {
    /// Directory holding the `export` and `unexport` control files.
    pub class_dir: PathBuf,
    /// Directory holding the per-pin `gpio{N}` subdirectories.
    pub device_dir: PathBuf,
}

impl Default for SysfsPaths {
    fn default() -> Self {
        SysfsPaths {
            class_dir: PathBuf::from(consts::GPIO_CLASS_DIR),
            device_dir: PathBuf::from(consts::GPIO_DEVICE_DIR),
        }
    }
}

/// Callback invoked with the attribute name and written text for every
/// sysfs write a pin performs. For logging and test instrumentation; has no
/// effect on the writes themselves.
pub type WriteObserver = Box<dyn FnMut(&str, &str) + Send>;

/// One GPIO pin addressed by its kernel number.
///
/// Construction touches no hardware. The lifecycle is
/// Unexported → [`open`](Pin::open) → Configured → [`close`](Pin::close) →
/// Unexported; `Drop` performs the close best-effort so the pin is released
/// on every exit path. Exclusively owns its value-file handle; callers must
/// serialize concurrent use.
pub struct Pin {
    number: u32,
    direction: Direction,
    interrupt: Edge,
    pull: Option<Pull>,
    value_file: Option<File>,
    paths: SysfsPaths,
    observer: Option<WriteObserver>,
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pin")
            .field("number", &self.number)
            .field("direction", &self.direction)
            .field("interrupt", &self.interrupt)
            .field("pull", &self.pull)
            .field("open", &self.value_file.is_some())
            .finish()
    }
}

impl Pin {
    /// Creates a pin with the given direction and no edge trigger.
    pub fn new(number: u32, direction: Direction) -> Self {
        Pin {
            number,
            direction,
            interrupt: Edge::None,
            pull: None,
            value_file: None,
            paths: SysfsPaths::default(),
            observer: None,
        }
    }

    /// Creates an input pin with an edge trigger to be applied on open.
    pub fn with_interrupt(number: u32, interrupt: Edge) -> Self {
        let mut pin = Pin::new(number, Direction::In);
        pin.interrupt = interrupt;
        pin
    }

    /// Records the pull resistor wired to this pin. Informational only.
    pub fn with_pull(mut self, pull: Pull) -> Self {
        self.pull = Some(pull);
        self
    }

    /// Points the pin at an alternate sysfs tree, e.g. a mock tree in tests.
    pub fn with_sysfs_paths(mut self, paths: SysfsPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Registers a callback invoked with every sysfs write this pin
    /// performs, or clears it with `None`.
    pub fn set_write_observer(&mut self, observer: Option<WriteObserver>) {
        self.observer = observer;
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// The configured direction. Reflects the last value written, not a
    /// fresh read of sysfs.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The configured edge trigger. Cached like [`direction`](Pin::direction).
    pub fn interrupt(&self) -> Edge {
        self.interrupt
    }

    pub fn pull(&self) -> Option<Pull> {
        self.pull
    }

    pub fn is_closed(&self) -> bool {
        self.value_file.is_none()
    }

    /// Exports the pin and configures it.
    ///
    /// Export is asynchronous in the kernel, so this waits (bounded by a
    /// one-second timeout) for the value file to become writable before
    /// opening it read-write, then writes the direction and, for inputs,
    /// the edge trigger. Fails with [`Error::AccessTimeout`] if the entries
    /// never become accessible, or [`Error::Io`] if any write fails.
    pub fn open(&mut self) -> Result<()> {
        self.write_class("export")?;
        let value_path = self.pin_path("value");
        wait_until_access(&value_path, AccessMode::Write, EXPORT_TIMEOUT)?;
        let file = OpenOptions::new().read(true).write(true).open(&value_path)?;
        self.value_file = Some(file);
        self.write_pin_file("direction", self.direction.as_sysfs())?;
        if self.direction == Direction::In {
            self.write_pin_file("edge", self.interrupt.as_sysfs())?;
        }
        debug!(
            "gpio{} exported as {}",
            self.number,
            self.direction.as_sysfs()
        );
        Ok(())
    }

    /// Returns the pin to a neutral, shareable state and unexports it.
    ///
    /// An output pin is first forced low, strictly before the direction
    /// reset, so a close never leaves the line driving high. The sysfs
    /// direction and edge are reset to `in`/`none`; the cached
    /// configuration is kept so a reopened pin comes back as configured.
    /// A no-op when the pin is already closed.
    pub fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        if self.direction == Direction::Out {
            self.set(0)?;
        }
        self.value_file = None;
        self.write_pin_file("direction", Direction::In.as_sysfs())?;
        self.write_pin_file("edge", Edge::None.as_sysfs())?;
        self.write_class("unexport")?;
        debug!("gpio{} released", self.number);
        Ok(())
    }

    /// Reads the current value: 1 if the line is high, 0 if low.
    ///
    /// The value file represents state, not a stream; every read starts
    /// from the beginning of the file. An empty read is treated as 0.
    pub fn get(&mut self) -> Result<u8> {
        let pin = self.number;
        let file = self.value_file.as_mut().ok_or(Error::PinClosed { pin })?;
        file.seek(SeekFrom::Start(0))?;
        let mut raw = String::new();
        file.read_to_string(&mut raw)?;
        let text = raw.trim();
        if text.is_empty() {
            return Ok(0);
        }
        text.parse().map_err(|e| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("gpio{pin} value file held {text:?}: {e}"),
            ))
        })
    }

    /// Drives the line to the given value, flushing immediately.
    ///
    /// Permitted only while the direction is [`Direction::Out`]; otherwise
    /// fails with [`Error::NotAnOutput`] and performs no write.
    pub fn set(&mut self, value: u8) -> Result<()> {
        if self.direction != Direction::Out {
            return Err(Error::NotAnOutput { pin: self.number });
        }
        let pin = self.number;
        let text = if value == 0 { "0" } else { "1" };
        let file = self.value_file.as_mut().ok_or(Error::PinClosed { pin })?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        if let Some(observer) = self.observer.as_mut() {
            observer("value", text);
        }
        Ok(())
    }

    /// Writes the new direction to sysfs immediately and caches it.
    pub fn set_direction(&mut self, direction: Direction) -> Result<()> {
        self.write_pin_file("direction", direction.as_sysfs())?;
        self.direction = direction;
        Ok(())
    }

    /// Writes the new edge trigger to sysfs immediately and caches it.
    pub fn set_interrupt(&mut self, interrupt: Edge) -> Result<()> {
        self.write_pin_file("edge", interrupt.as_sysfs())?;
        self.interrupt = interrupt;
        Ok(())
    }

    /// The raw descriptor of the value file, for poll/select/epoll-style
    /// waiting on edge events. Rejected when the pin is closed.
    pub fn fileno(&self) -> Result<RawFd> {
        self.value_file
            .as_ref()
            .map(|file| file.as_raw_fd())
            .ok_or(Error::PinClosed { pin: self.number })
    }

    fn pin_path(&self, name: &str) -> PathBuf {
        self.paths
            .device_dir
            .join(format!("gpio{}", self.number))
            .join(name)
    }

    // Writes the pin number to an export/unexport control file.
    fn write_class(&mut self, name: &str) -> Result<()> {
        let text = self.number.to_string();
        let path = self.paths.class_dir.join(name);
        let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
        file.write_all(text.as_bytes())?;
        if let Some(observer) = self.observer.as_mut() {
            observer(name, &text);
        }
        Ok(())
    }

    // Writes one per-pin attribute file (direction, edge).
    fn write_pin_file(&mut self, name: &str, value: &str) -> Result<()> {
        let path = self.pin_path(name);
        let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
        file.write_all(value.as_bytes())?;
        if let Some(observer) = self.observer.as_mut() {
            observer(name, value);
        }
        Ok(())
    }
}

impl Drop for Pin {
    fn drop(&mut self) {
        if !self.is_closed() {
            if let Err(e) = self.close() {
                warn!("gpio{}: teardown failed: {}", self.number, e);
            }
        }
    }
}
