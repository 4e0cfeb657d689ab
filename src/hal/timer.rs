use avr_device::atmega2560::{TC0, TC3, TC4};
use core::marker::PhantomData;

#[derive(Clone, Copy)]
pub enum Prescaler {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div64 = 3,
    Div256 = 4,
    Div1024 = 5,
}

/// Register access for the 16-bit timers used as free-running counters.
pub trait TimerRegs {
    fn stop_and_clear();
    fn set_prescaler(prescaler: Prescaler);
    fn count() -> u16;
    fn overflow_pending() -> bool;
    fn clear_overflow();
}

macro_rules! impl_timer_regs {
    ($TC:ident, $tccra:ident, $tccrb:ident, $tcnt:ident, $tifr:ident, $tov:ident) => {
        impl TimerRegs for $TC {
            fn stop_and_clear() {
                let p = unsafe { &*$TC::ptr() };
                // normal mode, clock stopped
                p.$tccra.write(|w| unsafe { w.bits(0) });
                p.$tccrb.write(|w| unsafe { w.bits(0) });
                p.$tcnt.write(|w| unsafe { w.bits(0) });
                p.$tifr.write(|w| w.$tov().set_bit());
            }

            fn set_prescaler(prescaler: Prescaler) {
                let p = unsafe { &*$TC::ptr() };
                p.$tccrb.write(|w| unsafe { w.bits(prescaler as u8) });
            }

            fn count() -> u16 {
                let p = unsafe { &*$TC::ptr() };
                p.$tcnt.read().bits()
            }

            fn overflow_pending() -> bool {
                let p = unsafe { &*$TC::ptr() };
                p.$tifr.read().$tov().bit_is_set()
            }

            fn clear_overflow() {
                let p = unsafe { &*$TC::ptr() };
                p.$tifr.write(|w| w.$tov().set_bit());
            }
        }
    };
}

impl_timer_regs!(TC3, tccr3a, tccr3b, tcnt3, tifr3, tov3);
impl_timer_regs!(TC4, tccr4a, tccr4b, tcnt4, tifr4, tov4);

/// A 16-bit hardware counter widened to a free-running 32-bit counter.
/// Reads fold the overflow flag, so they must happen at least once per
/// 16-bit rollover; the sampling loops read far more often than that.
pub struct WideTimer<T> {
    hi: u16,
    _timer: PhantomData<T>,
}

impl<T: TimerRegs> WideTimer<T> {
    pub fn new() -> Self {
        T::stop_and_clear();
        Self {
            hi: 0,
            _timer: PhantomData,
        }
    }

    /// Stop, zero, and forget accumulated rollovers.
    pub fn reset(&mut self) {
        T::stop_and_clear();
        self.hi = 0;
    }

    /// Begin counting from the last-set value.
    pub fn start(&mut self, prescaler: Prescaler) {
        T::set_prescaler(prescaler);
    }

    pub fn stop(&mut self) {
        T::set_prescaler(Prescaler::Stop);
    }

    /// Current 32-bit tick count.
    pub fn ticks(&mut self) -> u32 {
        let mut low = T::count();
        if T::overflow_pending() {
            T::clear_overflow();
            self.hi = self.hi.wrapping_add(1);
            // the rollover may have landed just after the first read
            low = T::count();
        }
        ((self.hi as u32) << 16) | low as u32
    }
}

impl<T: TimerRegs> Default for WideTimer<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Millisecond delay using Timer0
pub fn delay_ms(ms: u16) {
    let tc0 = unsafe { &*TC0::ptr() };

    // Configure for 1ms ticks (16MHz/64 = 250kHz, 250 ticks = 1ms)
    tc0.tccr0a.write(|w| unsafe { w.bits(0) });
    tc0.tccr0b.write(|w| unsafe { w.bits(0x03) });

    for _ in 0..ms {
        tc0.tcnt0.write(|w| unsafe { w.bits(0) });
        while tc0.tcnt0.read().bits() < 250 {}
    }

    tc0.tccr0b.write(|w| unsafe { w.bits(0) });
}
