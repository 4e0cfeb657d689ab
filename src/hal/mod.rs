pub mod gpio;
pub mod pwm;
pub mod timer;
pub mod uart;
pub mod watchdog;

// Re-export commonly used types
pub use gpio::board;
pub use gpio::{Input, Output, Pin};
pub use pwm::{Pwm, PwmError, PwmFreq};
pub use timer::{delay_ms, Prescaler, TimerRegs, WideTimer};
pub use uart::{Uart, UartError};
pub use watchdog::{Watchdog, WatchdogTimeout};
