//! PWM HAL implementation
//!
//! Hardware PWM on Timer1 in fast PWM mode with ICR1 as the period
//! register. One channel (OC1A) drives the bench motor.

use avr_device::atmega2560::TC1;
use core::marker::PhantomData;

/// PWM frequency presets
#[derive(Clone, Copy)]
pub enum PwmFreq {
    Hz50 = 50,     // Typical for servos
    Hz200 = 200,   // Good for motors
    Hz400 = 400,   // Fast mode
    Hz1000 = 1000, // Ultra fast (careful with this one)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmError {
    /// Duty percentages outside 0..=100 would write a compare value
    /// past the period register.
    DutyOutOfRange,
}

/// Compare value for a duty percentage over `top`. The +1 mirrors the
/// period length of fast PWM, which spans TOP + 1 counts.
pub fn duty_compare(top: u16, percent: u8) -> u16 {
    ((top as u32 + 1) * percent as u32 / 100) as u16
}

/// PWM peripheral driver
pub struct Pwm<T> {
    _timer: PhantomData<T>,

    // Cached TOP value for duty recomputation
    top: u16,
}

// Timer1 implementation
impl Pwm<TC1> {
    /// Create new PWM instance using Timer1
    pub fn new() -> Self {
        // Disable timer interrupts during initialization
        let p = unsafe { &*TC1::ptr() };
        p.timsk1.write(|w| unsafe { w.bits(0) });

        Self {
            _timer: PhantomData,
            top: 0,
        }
    }

    /// One-time setup: latch the period and the initial duty cycle.
    /// The counter stays stopped until `start`.
    pub fn configure(&mut self, freq: PwmFreq, initial_duty: u8) -> Result<(), PwmError> {
        // Timer parameters for 16MHz clock, /8 prescale
        let top: u16 = match freq {
            PwmFreq::Hz50 => 39_999,  // 16MHz / (50Hz * 8) - 1
            PwmFreq::Hz200 => 9_999,  // 16MHz / (200Hz * 8) - 1
            PwmFreq::Hz400 => 4_999,  // 16MHz / (400Hz * 8) - 1
            PwmFreq::Hz1000 => 1_999, // 16MHz / (1000Hz * 8) - 1
        };
        self.top = top;

        let p = unsafe { &*TC1::ptr() };
        // Fast PWM (mode 14), ICR1 top, OC1A non-inverting
        p.tccr1a.write(|w| unsafe { w.bits(0x82) });
        // WGM13 | WGM12, clock stopped
        p.tccr1b.write(|w| unsafe { w.bits(0x18) });
        p.icr1.write(|w| unsafe { w.bits(top) });

        self.set_duty_percent(initial_duty)
    }

    /// Start PWM output with the /8 prescale the period math assumes.
    pub fn start(&mut self) {
        let p = unsafe { &*TC1::ptr() };
        p.tccr1b.write(|w| unsafe { w.bits(0x18 | 0x02) });
    }

    pub fn stop(&mut self) {
        let p = unsafe { &*TC1::ptr() };
        p.tccr1b.write(|w| unsafe { w.bits(0x18) });
    }

    /// Set the OC1A duty cycle. OCR1A is double buffered in PWM modes;
    /// the new compare value latches at the next period boundary.
    pub fn set_duty_percent(&mut self, percent: u8) -> Result<(), PwmError> {
        if percent > 100 {
            return Err(PwmError::DutyOutOfRange);
        }
        let compare = duty_compare(self.top, percent);

        let p = unsafe { &*TC1::ptr() };
        p.ocr1a.write(|w| unsafe { w.bits(compare) });
        Ok(())
    }

    /* Second channel, parked until the bench grows a second motor
    pub fn set_duty_percent_b(&mut self, percent: u8) -> Result<(), PwmError> {
        if percent > 100 {
            return Err(PwmError::DutyOutOfRange);
        }
        let compare = duty_compare(self.top, percent);
        let p = unsafe { &*TC1::ptr() };
        // enable OC1B non-inverting alongside OC1A
        p.tccr1a.modify(|r, w| unsafe { w.bits(r.bits() | 0x20) });
        p.ocr1b.write(|w| unsafe { w.bits(compare) });
        Ok(())
    }
    */

    /// Current compare register value.
    pub fn compare(&self) -> u16 {
        let p = unsafe { &*TC1::ptr() };
        p.ocr1a.read().bits()
    }

    /// Configured period (TOP) value.
    pub fn top(&self) -> u16 {
        self.top
    }
}

impl Default for Pwm<TC1> {
    fn default() -> Self {
        Self::new()
    }
}
