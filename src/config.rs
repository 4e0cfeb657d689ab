//! Configuration constants for the motor bench firmware

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate (8N1, double-speed generation)
pub const UART_BAUD: u32 = 57_600;

/// Duty cycle latched at boot, before the first command
pub const INITIAL_DUTY_PERCENT: u8 = 10;

/// Rising edges that close one encoder measurement window
pub const EDGES_PER_WINDOW: u8 = 8;

/// Capacity of the recorded tick history
pub const SAMPLE_CAPACITY: usize = 1000;

/// Sample count at which the duty cycle steps automatically
pub const AUTO_STEP_SAMPLE: usize = 500;

/// Duty cycle applied by the automatic step
pub const AUTO_STEP_DUTY_PERCENT: u8 = 70;

/// Edge-timer ticks to revolutions, calibrated against the bench
/// encoder disc. Measured value (2.5^-8); keep in sync with
/// `EDGE_TIMER_PRESCALER` if the timer clock changes.
pub const RPM_TICK_SCALE: f32 = 0.000_655_36;

/// Seconds per elapsed-timer tick, calibrated the same way (6.4^-6).
pub const ELAPSED_TICK_SECONDS: f32 = 0.000_014_551_915;

/// Edge-timer ticks after which an incomplete window is abandoned.
/// A stopped shaft must not wedge the command loop, and the bound has
/// to come in well under the watchdog period.
pub const EDGE_WINDOW_TIMEOUT_TICKS: u32 = 2_000_000;

/// Receive line capacity; reaching it ends the line like a CR does
pub const RX_LINE_CAPACITY: usize = 64;

/// Spin bound for serial register waits. Exhausting it reports the
/// link as stalled instead of blocking forever.
pub const SERIAL_SPIN_LIMIT: u32 = 200_000;
