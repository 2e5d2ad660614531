//! SPI bus access through the Linux spidev character devices.
//!
//! [`SpiDevice`] owns the file descriptor of one `/dev/spidevB.C` node and
//! performs full-duplex transactions with `SPI_IOC_MESSAGE(1)`. The kernel's
//! transfer control block is mirrored by [`SpiTransfer`], the only place in
//! the crate that depends on a raw memory layout.

use std::fmt;
use std::fs::File;
use std::marker::PhantomData;
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;

use log::{debug, trace};

use crate::codec;
use crate::consts;
use crate::error::{Error, Result};

/// Callback handed the raw send buffer just before each transfer is
/// submitted. Observation has no effect on the transfer itself; it exists
/// for logging and test instrumentation.
pub type TransactionObserver = Box<dyn FnMut(&[u8]) + Send>;

/// One full-duplex transfer descriptor, laid out exactly like the kernel's
/// `struct spi_ioc_transfer` from `<linux/spi/spidev.h>`: declared field
/// order, explicit widths, 32 bytes total. The buffer pointers are carried
/// as 64-bit integers regardless of host pointer width, so the layout is
/// identical on 32-bit and 64-bit boards.
///
/// A descriptor is transient: build it fresh per transaction and keep it
/// (and the buffers it points into) alive across the ioctl that consumes
/// it. The borrows taken by [`SpiTransfer::duplex`] enforce exactly that;
/// the buffers cannot be freed or moved while the descriptor exists.
///
/// Zero `speed_hz`, `delay_usecs` or `bits_per_word` mean "use the values
/// configured on the device".
#[derive(Debug, Default)]
#[repr(C)]
pub struct SpiTransfer<'tx, 'rx> {
    /// Userspace address of the send buffer.
    pub tx_buf: u64,
    /// Userspace address of the receive buffer.
    pub rx_buf: u64,
    /// Bytes clocked in each direction.
    pub len: u32,
    /// Per-transfer speed override in Hz; 0 keeps the device setting.
    pub speed_hz: u32,
    /// Delay after this transfer before the chip select changes.
    pub delay_usecs: u16,
    /// Per-transfer word size override; 0 keeps the device setting.
    pub bits_per_word: u8,
    /// Deselect the device between this transfer and the next.
    pub cs_change: u8,
    pub tx_nbits: u8,
    pub rx_nbits: u8,
    pub word_delay_usecs: u8,
    pub pad: u8,
    tx: PhantomData<&'tx [u8]>,
    rx: PhantomData<&'rx mut [u8]>,
}

impl<'tx, 'rx> SpiTransfer<'tx, 'rx> {
    /// Builds a descriptor transmitting `tx` while receiving into `rx`.
    ///
    /// Both buffers are clocked simultaneously and must be the same length.
    ///
    /// # Panics
    ///
    /// Panics if the buffer lengths differ; a mismatch would let the kernel
    /// write past the end of `rx`.
    pub fn duplex(tx: &'tx [u8], rx: &'rx mut [u8]) -> Self {
        assert_eq!(
            tx.len(),
            rx.len(),
            "duplex buffers must be the same length"
        );
        SpiTransfer {
            tx_buf: tx.as_ptr() as usize as u64,
            rx_buf: rx.as_mut_ptr() as usize as u64,
            len: rx.len() as u32,
            ..Default::default()
        }
    }
}

/// An SPI slave at `/dev/spidev{bus}.{chip_select}`.
///
/// Construction performs no I/O; call [`open`](SpiDevice::open) before use.
/// The handle exclusively owns its file descriptor and releases it exactly
/// once, on [`close`](SpiDevice::close) or drop. Not internally
/// synchronized: concurrent use from several threads must be serialized by
/// the caller.
pub struct SpiDevice {
    bus: u8,
    chip_select: u8,
    file: Option<File>,
    observer: Option<TransactionObserver>,
}

impl fmt::Debug for SpiDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpiDevice")
            .field("bus", &self.bus)
            .field("chip_select", &self.chip_select)
            .field("open", &self.file.is_some())
            .finish()
    }
}

impl SpiDevice {
    /// Creates a handle for the given bus and chip-select numbers without
    /// touching the device node.
    pub fn new(bus: u8, chip_select: u8) -> Self {
        SpiDevice {
            bus,
            chip_select,
            file: None,
            observer: None,
        }
    }

    /// The device node this handle targets.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(format!(
            "{}{}.{}",
            consts::SPIDEV_PREFIX,
            self.bus,
            self.chip_select
        ))
    }

    pub fn bus(&self) -> u8 {
        self.bus
    }

    pub fn chip_select(&self) -> u8 {
        self.chip_select
    }

    /// Opens the device node read-write.
    ///
    /// Fails with [`Error::SpiInit`] when the node is missing or
    /// inaccessible, which usually means the SPI interface is not enabled on
    /// the host or the bus/chip-select numbers are wrong.
    pub fn open(&mut self) -> Result<()> {
        let path = self.path();
        let file = File::options()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| Error::SpiInit {
                path: path.clone(),
                source,
            })?;
        debug!("opened {}", path.display());
        self.file = Some(file);
        Ok(())
    }

    /// Releases the file descriptor. A no-op when the device is already
    /// closed or was never opened.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            debug!("closed spidev{}.{}", self.bus, self.chip_select);
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn fd(&self) -> Result<libc::c_int> {
        match &self.file {
            Some(file) => Ok(file.as_raw_fd()),
            None => Err(Error::DeviceClosed {
                bus: self.bus,
                chip_select: self.chip_select,
            }),
        }
    }

    /// Registers a callback invoked with the raw send buffer before every
    /// transfer, or clears it with `None`.
    pub fn set_transaction_observer(&mut self, observer: Option<TransactionObserver>) {
        self.observer = observer;
    }

    /// Performs one full-duplex transaction: transmits `tx` and returns the
    /// same number of bytes clocked back from the slave.
    ///
    /// SPI pairs every written byte with a read byte in the same clocking,
    /// so callers wanting read-only semantics still send dummy bytes of the
    /// desired length.
    pub fn transaction(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        let fd = self.fd()?;
        let mut rx = vec![0u8; tx.len()];
        if let Some(observer) = self.observer.as_mut() {
            observer(tx);
        }
        trace!("spidev{}.{} tx {:02X?}", self.bus, self.chip_select, tx);
        let mut transfer = SpiTransfer::duplex(tx, &mut rx);
        syscall!(ioctl(
            fd,
            consts::SPI_IOC_MESSAGE_1,
            &mut transfer as *mut SpiTransfer
        ))?;
        trace!("spidev{}.{} rx {:02X?}", self.bus, self.chip_select, rx);
        Ok(rx)
    }

    /// Word-oriented variant of [`transaction`](SpiDevice::transaction) for
    /// callers holding command sequences wider than a byte. Any word above
    /// `0xFF` fails with [`Error::WordOutOfRange`] before anything is sent.
    pub fn transaction_words(&mut self, words: &[u16]) -> Result<Vec<u16>> {
        let tx = codec::encode(words)?;
        let rx = self.transaction(&tx)?;
        Ok(codec::decode(&rx))
    }

    /// Reads the current clock mode (`SPI_MODE_0..=3` plus flag bits).
    pub fn clock_mode(&self) -> Result<u8> {
        let fd = self.fd()?;
        let mut mode: u8 = 0;
        syscall!(ioctl(fd, consts::SPI_IOC_RD_MODE, &mut mode as *mut u8))?;
        Ok(mode)
    }

    /// Applies a new clock mode immediately. The kernel rejects modes the
    /// bus controller cannot drive; that failure surfaces as [`Error::Io`].
    pub fn set_clock_mode(&mut self, mode: u8) -> Result<()> {
        let fd = self.fd()?;
        debug!(
            "spidev{}.{} clock mode <- 0x{:02X}",
            self.bus, self.chip_select, mode
        );
        syscall!(ioctl(fd, consts::SPI_IOC_WR_MODE, &mode as *const u8))?;
        Ok(())
    }

    /// Reads the current maximum clock speed in Hz.
    pub fn speed_hz(&self) -> Result<u32> {
        let fd = self.fd()?;
        let mut speed: u32 = 0;
        syscall!(ioctl(
            fd,
            consts::SPI_IOC_RD_MAX_SPEED_HZ,
            &mut speed as *mut u32
        ))?;
        Ok(speed)
    }

    /// Applies a new maximum clock speed immediately. Speeds the bus
    /// controller cannot reach are rejected by the kernel.
    pub fn set_speed_hz(&mut self, speed_hz: u32) -> Result<()> {
        let fd = self.fd()?;
        debug!(
            "spidev{}.{} speed <- {} Hz",
            self.bus, self.chip_select, speed_hz
        );
        syscall!(ioctl(
            fd,
            consts::SPI_IOC_WR_MAX_SPEED_HZ,
            &speed_hz as *const u32
        ))?;
        Ok(())
    }
}

impl Drop for SpiDevice {
    fn drop(&mut self) {
        self.close();
    }
}
