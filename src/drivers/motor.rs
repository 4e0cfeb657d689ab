use avr_device::atmega2560::TC1;

use crate::config::INITIAL_DUTY_PERCENT;
use crate::hal::gpio::board;
use crate::hal::pwm::{Pwm, PwmError, PwmFreq};

/// Bench motor behind one fast-PWM channel.
pub struct Motor {
    pwm: Pwm<TC1>,
}

impl Motor {
    /// Latch period and boot duty. The output stays idle until the
    /// arming keypress calls `start`.
    pub fn new() -> Result<Self, PwmError> {
        // the compare output only reaches the motor once PB5 drives the line
        let _pin = board::MotorPwm::default().into_output();

        let mut pwm = Pwm::new();
        pwm.configure(PwmFreq::Hz1000, INITIAL_DUTY_PERCENT)?;
        Ok(Self { pwm })
    }

    /// Start PWM output at the configured duty.
    pub fn start(&mut self) {
        self.pwm.start();
    }

    pub fn stop(&mut self) {
        self.pwm.stop();
    }

    pub fn set_duty_percent(&mut self, percent: u8) -> Result<(), PwmError> {
        self.pwm.set_duty_percent(percent)
    }

    /// Compare register read-back, for bench checks.
    pub fn duty_compare(&self) -> u16 {
        self.pwm.compare()
    }
}
