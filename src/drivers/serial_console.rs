use avr_device::atmega2560::USART0;

use crate::hal::uart::{Uart, UartError};

/// Operator console: the one serial link, carrying the prompt, the
/// sample lines, and the single-character commands.
pub struct SerialConsole {
    uart: Uart<USART0>,
}

impl SerialConsole {
    pub fn new() -> Self {
        Self { uart: Uart::new() }
    }

    /// Send every byte in order, then wait out the transmit shift
    /// register so the line is fully on the wire when this returns.
    pub fn transmit(&mut self, s: &str) -> Result<(), UartError> {
        for byte in s.bytes() {
            self.uart.write_byte(byte)?;
        }
        self.uart.flush()
    }

    pub fn write_line(&mut self, s: &str) -> Result<(), UartError> {
        for byte in s.bytes() {
            self.uart.write_byte(byte)?;
        }
        for byte in b"\r\n" {
            self.uart.write_byte(*byte)?;
        }
        self.uart.flush()
    }

    /// Wait out the shift register after unflushed writes (`uwrite!`
    /// and `write_fixed4` leave bytes unflushed).
    pub fn flush(&mut self) -> Result<(), UartError> {
        self.uart.flush()
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        self.uart.read().ok()
    }

    /// True when a received byte is waiting; used to cancel a
    /// measurement burst without consuming the byte.
    pub fn rx_ready(&self) -> bool {
        self.uart.rx_ready()
    }

    /// Bounded blocking read.
    pub fn read_byte_timeout(&mut self, spins: u32) -> Result<u8, UartError> {
        self.uart.read_byte_timeout(spins)
    }

    /// Write a non-negative value with four decimal places, printf
    /// `%.4f` style. Integer math after one scale; float `Display`
    /// would drag kilobytes of core::fmt into the image.
    pub fn write_fixed4(&mut self, value: f32) -> Result<(), UartError> {
        let whole = value as u32;
        let frac = ((value - whole as f32) * 10_000.0 + 0.5) as u32;
        let (whole, frac) = if frac >= 10_000 {
            (whole + 1, 0)
        } else {
            (whole, frac)
        };

        ufmt::uwrite!(self, "{}", whole)?;
        self.uart.write_byte(b'.')?;
        let mut divisor = 1_000;
        while divisor > 0 {
            self.uart.write_byte(b'0' + (frac / divisor % 10) as u8)?;
            divisor /= 10;
        }
        Ok(())
    }
}

impl Default for SerialConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ufmt::uWrite for SerialConsole {
    type Error = UartError;

    fn write_str(&mut self, s: &str) -> Result<(), UartError> {
        for byte in s.bytes() {
            self.uart.write_byte(byte)?;
        }
        Ok(())
    }
}

impl core::fmt::Write for SerialConsole {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            self.uart.write_byte(byte).map_err(|_| core::fmt::Error)?;
        }
        Ok(())
    }
}
