#![allow(clippy::missing_safety_doc)]

use avr_device::atmega2560::{USART0, USART1};
use core::convert::Infallible;
use core::marker::PhantomData;

use crate::config::{CPU_FREQ_HZ, SERIAL_SPIN_LIMIT, UART_BAUD};

// Double-speed baud divisor, rounded. 57600 at 16MHz lands 0.8% off
// with U2X, against 3.5% for the normal-speed divisor.
const UBRR_VALUE: u16 = ((CPU_FREQ_HZ + 4 * UART_BAUD) / (8 * UART_BAUD) - 1) as u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartError {
    /// A bounded register wait ran out; the link is wedged.
    Stalled,
}

pub struct Uart<USART> {
    usart: PhantomData<USART>,
}

impl<USART: UartRegisterBlock> Uart<USART> {
    pub fn new() -> Self {
        let p = unsafe { &*USART::ptr() };

        p.ubrr0.write(|w| unsafe { w.bits(UBRR_VALUE) });
        p.ucsr0a.write(|w| w.u2x0().set_bit());
        // 8 data bits, no parity, 1 stop bit
        p.ucsr0c.write(|w| unsafe { w.bits(0x06) });
        // TX and RX enabled, no interrupts
        p.ucsr0b.write(|w| w.rxen0().set_bit().txen0().set_bit());

        Self { usart: PhantomData }
    }

    /// Queue one byte, spinning (bounded) while the data register is full.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), UartError> {
        let p = unsafe { &*USART::ptr() };

        spin_while(|| p.ucsr0a.read().udre0().bit_is_clear())?;
        // TXC tracks only bytes loaded from here on; flush() waits on it
        p.ucsr0a.write(|w| w.u2x0().set_bit().txc0().set_bit());
        p.udr0.write(|w| unsafe { w.bits(byte) });
        Ok(())
    }

    /// Wait (bounded) until the transmit shift register reports idle.
    /// Only meaningful after at least one `write_byte`.
    pub fn flush(&mut self) -> Result<(), UartError> {
        let p = unsafe { &*USART::ptr() };
        spin_while(|| p.ucsr0a.read().txc0().bit_is_clear())
    }

    pub fn read(&mut self) -> nb::Result<u8, Infallible> {
        let p = unsafe { &*USART::ptr() };
        if p.ucsr0a.read().rxc0().bit_is_set() {
            Ok(p.udr0.read().bits())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// True when a received byte is waiting in the data register.
    pub fn rx_ready(&self) -> bool {
        let p = unsafe { &*USART::ptr() };
        p.ucsr0a.read().rxc0().bit_is_set()
    }

    /// Bounded blocking read.
    pub fn read_byte_timeout(&mut self, spins: u32) -> Result<u8, UartError> {
        let p = unsafe { &*USART::ptr() };
        for _ in 0..spins {
            if p.ucsr0a.read().rxc0().bit_is_set() {
                return Ok(p.udr0.read().bits());
            }
        }
        Err(UartError::Stalled)
    }
}

impl<USART: UartRegisterBlock> Default for Uart<USART> {
    fn default() -> Self {
        Self::new()
    }
}

fn spin_while(mut condition: impl FnMut() -> bool) -> Result<(), UartError> {
    let mut budget = SERIAL_SPIN_LIMIT;
    while condition() {
        budget -= 1;
        if budget == 0 {
            return Err(UartError::Stalled);
        }
    }
    Ok(())
}

// Trait for USART register block access
pub trait UartRegisterBlock {
    fn ptr() -> *const avr_device::atmega2560::usart0::RegisterBlock;
}

impl UartRegisterBlock for USART0 {
    fn ptr() -> *const avr_device::atmega2560::usart0::RegisterBlock {
        USART0::ptr()
    }
}

// Same register layout at a different base address
impl UartRegisterBlock for USART1 {
    fn ptr() -> *const avr_device::atmega2560::usart0::RegisterBlock {
        USART1::ptr() as *const _
    }
}
