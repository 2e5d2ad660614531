//! # sbc-io
//!
//! Low-level SPI and GPIO access for Linux single-board computers
//! (Raspberry Pi and friends), built directly on the kernel interfaces:
//! spidev character devices driven through ioctl, and the sysfs GPIO tree.
//!
//! ## Features
//!
//! *   Full-duplex SPI transactions over `/dev/spidevB.C`
//!     ([`SpiDevice::transaction`]), with the kernel transfer descriptor
//!     modeled as an explicit fixed-layout struct ([`SpiTransfer`]).
//! *   Clock mode and maximum speed accessors ([`SpiDevice::clock_mode`],
//!     [`SpiDevice::speed_hz`] and their setters).
//! *   sysfs GPIO pin lifecycle: export, direction, edge trigger, value
//!     read/write, unexport ([`Pin`]), with a bounded wait for the kernel
//!     to finish creating the sysfs entries ([`wait::wait_until_access`]).
//! *   Safe teardown guarantees: output pins are driven low before release,
//!     handles are closed exactly once, and `Drop` releases on every exit
//!     path.
//! *   Raw descriptor access for external poll/select event loops
//!     ([`Pin::fileno`]).
//!
//! Everything is synchronous and blocking; nothing retries. Handles are not
//! internally synchronized, so share them across threads only behind a lock.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use sbc_io::{
//!     gpio::{Direction, Pin},
//!     spi::SpiDevice,
//!     Result, SPI_MODE_0,
//! };
//!
//! fn main() -> Result<()> {
//!     // Read a flash chip's JEDEC id on bus 0, chip-select 0.
//!     let mut spi = SpiDevice::new(0, 0);
//!     spi.open()?;
//!     spi.set_clock_mode(SPI_MODE_0)?;
//!     spi.set_speed_hz(500_000)?;
//!     let reply = spi.transaction(&[0x9F, 0x00, 0x00, 0x00])?;
//!     println!("JEDEC id: {:02X?}", &reply[1..]);
//!
//!     // Blink once on GPIO 17.
//!     let mut led = Pin::new(17, Direction::Out);
//!     led.open()?;
//!     led.set(1)?;
//!     led.set(0)?;
//!     led.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Permissions
//!
//! The spidev nodes and the sysfs GPIO files are root-owned on most
//! distributions. Either run as root or add udev rules granting your user
//! access (`SUBSYSTEM=="spidev", GROUP="spi"` and the `gpio` group for
//! `/sys/class/gpio`).
//!
//! ## Non-goals
//!
//! No bus arbitration or chip-select scheduling across devices, no DMA, and
//! no interrupt-driven GPIO event loop: configure an edge trigger and poll
//! [`Pin::fileno`] with your own poll/select/epoll machinery.

// Executes a libc call, turning the -1 convention into io::Result.
macro_rules! syscall {
    ($fn:ident($($arg:expr),* $(,)?)) => {{
        let res = unsafe { libc::$fn($($arg, )*) };
        if res == -1 {
            Err(std::io::Error::last_os_error())
        } else {
            Ok(res)
        }
    }};
}

mod consts;
mod error;

pub mod codec;
pub mod gpio;
pub mod spi;
pub mod wait;

pub use error::{Error, Result};
pub use gpio::{Direction, Edge, Pin, Pull, SysfsPaths};
pub use spi::{SpiDevice, SpiTransfer};

// Re-export the SPI mode constants callers pass to `set_clock_mode`.
pub use consts::{SPI_CPHA, SPI_CPOL, SPI_MODE_0, SPI_MODE_1, SPI_MODE_2, SPI_MODE_3};
