//! Internal constants: ioctl request numbers, device paths, and mode bits.

use core::mem::size_of;

/// Prefix of the spidev character device nodes (`/dev/spidevB.C`).
pub const SPIDEV_PREFIX: &str = "/dev/spidev";

/// Directory holding the sysfs GPIO `export`/`unexport` control files.
pub const GPIO_CLASS_DIR: &str = "/sys/class/gpio";
/// Directory holding the per-pin `gpio{N}/{value,direction,edge}` files.
pub const GPIO_DEVICE_DIR: &str = "/sys/devices/virtual/gpio";

// --- SPI mode bits (from <linux/spi/spidev.h>) ---
/// Clock phase: sample on the trailing edge.
pub const SPI_CPHA: u8 = 0x01;
/// Clock polarity: clock idles high.
pub const SPI_CPOL: u8 = 0x02;

/// CPOL 0, CPHA 0.
pub const SPI_MODE_0: u8 = 0;
/// CPOL 0, CPHA 1.
pub const SPI_MODE_1: u8 = SPI_CPHA;
/// CPOL 1, CPHA 0.
pub const SPI_MODE_2: u8 = SPI_CPOL;
/// CPOL 1, CPHA 1.
pub const SPI_MODE_3: u8 = SPI_CPOL | SPI_CPHA;

// --- ioctl request encoding (asm-generic/ioctl.h) ---
// A request packs dir:2 | size:14 | type:8 | nr:8, high to low.
const IOC_NRBITS: u64 = 8;
const IOC_TYPEBITS: u64 = 8;
const IOC_SIZEBITS: u64 = 14;

const IOC_NRSHIFT: u64 = 0;
const IOC_TYPESHIFT: u64 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u64 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u64 = IOC_SIZESHIFT + IOC_SIZEBITS;

const IOC_WRITE: u64 = 1;
const IOC_READ: u64 = 2;

const fn ioc(dir: u64, ty: u64, nr: u64, size: u64) -> libc::c_ulong {
    ((dir << IOC_DIRSHIFT) | (ty << IOC_TYPESHIFT) | (nr << IOC_NRSHIFT) | (size << IOC_SIZESHIFT))
        as libc::c_ulong
}

/// The spidev ioctl magic number, ASCII `'k'`.
const SPI_IOC_MAGIC: u64 = b'k' as u64;

/// Read the one-byte clock mode register.
pub const SPI_IOC_RD_MODE: libc::c_ulong = ioc(IOC_READ, SPI_IOC_MAGIC, 1, 1);
/// Write the one-byte clock mode register.
pub const SPI_IOC_WR_MODE: libc::c_ulong = ioc(IOC_WRITE, SPI_IOC_MAGIC, 1, 1);
/// Read the four-byte maximum bus speed register (Hz, host byte order).
pub const SPI_IOC_RD_MAX_SPEED_HZ: libc::c_ulong = ioc(IOC_READ, SPI_IOC_MAGIC, 4, 4);
/// Write the four-byte maximum bus speed register (Hz, host byte order).
pub const SPI_IOC_WR_MAX_SPEED_HZ: libc::c_ulong = ioc(IOC_WRITE, SPI_IOC_MAGIC, 4, 4);

/// Submit `n` full-duplex transfer descriptors in one call
/// (`SPI_IOC_MESSAGE(n)` in the kernel header).
pub const fn spi_ioc_message(n: usize) -> libc::c_ulong {
    ioc(
        IOC_WRITE,
        SPI_IOC_MAGIC,
        0,
        (n * size_of::<crate::spi::SpiTransfer<'static, 'static>>()) as u64,
    )
}

/// The single-segment transfer request used by every transaction.
pub const SPI_IOC_MESSAGE_1: libc::c_ulong = spi_ioc_message(1);
