use sbc_io::{Result, SpiDevice, SPI_MODE_0};

fn main() -> Result<()> {
    env_logger::init();

    let mut spi = SpiDevice::new(0, 0);
    println!("Opening {}...", spi.path().display());
    spi.open()?;
    spi.set_clock_mode(SPI_MODE_0)?;
    spi.set_speed_hz(1_000_000)?;
    println!(
        "Bus configured: mode 0x{:02X}, {} Hz max",
        spi.clock_mode()?,
        spi.speed_hz()?
    );

    // JEDEC "read identification" (0x9F) followed by three dummy clocks.
    let reply = spi.transaction(&[0x9F, 0x00, 0x00, 0x00])?;
    println!(
        "JEDEC id: manufacturer 0x{:02X}, device 0x{:02X}{:02X}",
        reply[1], reply[2], reply[3]
    );
    Ok(())
}
