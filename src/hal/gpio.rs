use avr_device::atmega2560::{PORTA, PORTB, PORTC, PORTD};
use core::convert::Infallible;
use core::marker::PhantomData;

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

/// Register access for one I/O port.
pub trait PortRegs {
    fn ddr_modify<F: FnOnce(u8) -> u8>(f: F);
    fn out_modify<F: FnOnce(u8) -> u8>(f: F);
    fn levels() -> u8;
}

macro_rules! impl_port {
    ($PORT:ident, $ddr:ident, $out:ident, $pin:ident) => {
        impl PortRegs for $PORT {
            fn ddr_modify<F: FnOnce(u8) -> u8>(f: F) {
                let p = unsafe { &*$PORT::ptr() };
                p.$ddr.modify(|r, w| unsafe { w.bits(f(r.bits())) });
            }

            fn out_modify<F: FnOnce(u8) -> u8>(f: F) {
                let p = unsafe { &*$PORT::ptr() };
                p.$out.modify(|r, w| unsafe { w.bits(f(r.bits())) });
            }

            fn levels() -> u8 {
                let p = unsafe { &*$PORT::ptr() };
                p.$pin.read().bits()
            }
        }
    };
}

impl_port!(PORTA, ddra, porta, pina);
impl_port!(PORTB, ddrb, portb, pinb);
impl_port!(PORTC, ddrc, portc, pinc);
impl_port!(PORTD, ddrd, portd, pind);

pub struct Pin<PORT, const P: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT, const P: u8, MODE> Default for Pin<PORT, P, MODE> {
    fn default() -> Self {
        Self {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

impl<PORT: PortRegs, const P: u8, MODE: PinMode> Pin<PORT, P, MODE> {
    pub fn into_output(self) -> Pin<PORT, P, Output> {
        PORT::ddr_modify(|r| r | (1 << P));
        Pin::default()
    }

    pub fn into_input(self) -> Pin<PORT, P, Input> {
        // input, pull-up off
        PORT::ddr_modify(|r| r & !(1 << P));
        PORT::out_modify(|r| r & !(1 << P));
        Pin::default()
    }
}

impl<PORT: PortRegs, const P: u8> Pin<PORT, P, Output> {
    #[inline]
    pub fn set_high(&mut self) {
        PORT::out_modify(|r| r | (1 << P));
    }

    #[inline]
    pub fn set_low(&mut self) {
        PORT::out_modify(|r| r & !(1 << P));
    }
}

impl<PORT: PortRegs, const P: u8> Pin<PORT, P, Input> {
    #[inline]
    pub fn is_high(&self) -> bool {
        PORT::levels() & (1 << P) != 0
    }

    #[inline]
    pub fn is_low(&self) -> bool {
        !self.is_high()
    }
}

impl<PORT: PortRegs, const P: u8> embedded_hal::digital::v2::InputPin for Pin<PORT, P, Input> {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(PORT::levels() & (1 << P) != 0)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(PORT::levels() & (1 << P) == 0)
    }
}

// Bench board pin assignments
pub mod board {
    use super::*;
    use avr_device::atmega2560::PORTB;

    /// Shaft encoder input
    pub type Encoder = Pin<PORTB, 0, Input>;

    /// Motor PWM output (OC1A)
    pub type MotorPwm = Pin<PORTB, 5, Output>;
}
