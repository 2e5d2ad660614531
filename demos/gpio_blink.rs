use sbc_io::{Direction, Pin, Result};
use std::{thread, time::Duration};

// BCM pin number of the LED (GPIO 17 is header pin 11 on a Raspberry Pi).
const LED_PIN: u32 = 17;

fn main() -> Result<()> {
    env_logger::init();

    let mut led = Pin::new(LED_PIN, Direction::Out);
    println!("Exporting gpio{LED_PIN}...");
    led.open()?;

    println!("Blinking gpio{LED_PIN} 10 times...");
    for _ in 0..10 {
        led.set(1)?;
        thread::sleep(Duration::from_millis(250));
        led.set(0)?;
        thread::sleep(Duration::from_millis(250));
    }

    // close() forces the line low, resets direction/edge and unexports.
    led.close()?;
    println!("Done.");
    Ok(())
}
