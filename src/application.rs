//! The RPM sample loop: arming, measurement bursts, duty commands.

use arrayvec::ArrayVec;
use core::convert::Infallible;
use embedded_hal::digital::v2::InputPin;

use crate::config::{
    AUTO_STEP_SAMPLE, EDGE_WINDOW_TIMEOUT_TICKS, ELAPSED_TICK_SECONDS, RPM_TICK_SCALE,
    RX_LINE_CAPACITY, SAMPLE_CAPACITY,
};
use crate::drivers::encoder::EncoderReader;
use crate::drivers::motor::Motor;
use crate::drivers::serial_console::SerialConsole;
use crate::hal::pwm::PwmError;
use crate::hal::timer::{Prescaler, TimerRegs, WideTimer};
use crate::hal::uart::UartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Serial(UartError),
    Pwm(PwmError),
}

impl From<UartError> for Error {
    fn from(e: UartError) -> Self {
        Error::Serial(e)
    }
}

impl From<PwmError> for Error {
    fn from(e: PwmError) -> Self {
        Error::Pwm(e)
    }
}

/// Single-byte operator commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fixed duty step
    Duty(u8),
    /// Carriage return: end the current input line
    EndLine,
    /// `q` is reserved; accepted and ignored
    Reserved,
}

impl Command {
    /// Case-sensitive command table. Unrecognized bytes map to `None`
    /// and are silently ignored.
    pub fn parse(byte: u8) -> Option<Command> {
        match byte {
            b'w' => Some(Command::Duty(10)),
            b'e' => Some(Command::Duty(30)),
            b'r' => Some(Command::Duty(50)),
            b't' => Some(Command::Duty(75)),
            b'y' => Some(Command::Duty(100)),
            b'q' => Some(Command::Reserved),
            b'\r' => Some(Command::EndLine),
            _ => None,
        }
    }
}

/// `trunc(ticks * scale) / 60`, truncating before the divide the way
/// the integer RPM readout does.
pub fn rpm_from_window(window_ticks: u32) -> u32 {
    (window_ticks as f32 * RPM_TICK_SCALE) as u32 / 60
}

/// Recorded ticks to seconds, for the transmitted interval field.
pub fn interval_seconds(interval_ticks: u32) -> f32 {
    interval_ticks as f32 * ELAPSED_TICK_SECONDS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Stored { index: usize },
    /// Capacity reached; nothing was appended.
    Full,
}

/// Recorded elapsed-timer readings, one per completed window.
pub struct SampleHistory {
    ticks: [u32; SAMPLE_CAPACITY],
    cursor: usize,
}

impl SampleHistory {
    pub const fn new() -> Self {
        Self {
            ticks: [0; SAMPLE_CAPACITY],
            cursor: 0,
        }
    }

    pub fn record(&mut self, tick: u32) -> RecordOutcome {
        if self.cursor >= SAMPLE_CAPACITY {
            return RecordOutcome::Full;
        }
        self.ticks[self.cursor] = tick;
        self.cursor += 1;
        RecordOutcome::Stored {
            index: self.cursor - 1,
        }
    }

    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        if index < self.cursor {
            Some(self.ticks[index])
        } else {
            None
        }
    }
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// One measurement result. The interval field carries absolute elapsed
/// ticks for the first sample and the modular delta afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub interval_ticks: u32,
    pub rpm: u32,
}

/// Everything the supervisor must act on after a completed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowReport {
    pub sample: Sample,
    /// False exactly when the RPM truncated to zero; the bookkeeping
    /// above still happened.
    pub transmit: bool,
    /// The duty cycle must step to the automatic value before the
    /// sample line goes out.
    pub auto_step: bool,
    /// The history just hit capacity; reported once.
    pub history_full: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstOutcome {
    Window(WindowReport),
    /// A pending received byte cancelled the window before any
    /// bookkeeping.
    Interrupted,
    /// The edge window timed out short of the target edge count; no
    /// sample, no history append.
    Stalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unarmed,
    Sampling,
}

/// Session state for the sample loop. Owned by the supervisor and
/// threaded through explicitly; nothing here lives in a static.
pub struct TachApp {
    phase: Phase,
    history: SampleHistory,
    last_tick: Option<u32>,
    history_full_noted: bool,
    line: ArrayVec<u8, RX_LINE_CAPACITY>,
}

impl TachApp {
    pub fn new() -> Self {
        Self {
            phase: Phase::Unarmed,
            history: SampleHistory::new(),
            last_tick: None,
            history_full_noted: false,
            line: ArrayVec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn sample_count(&self) -> usize {
        self.history.len()
    }

    /// Characters accumulated on the current input line.
    pub fn line_len(&self) -> usize {
        self.line.len()
    }

    /// First-keypress side effect: motor on, both timers running,
    /// detector primed. The byte itself is consumed by the caller and
    /// never reaches command dispatch.
    pub fn arm<E, L, PIN>(
        &mut self,
        motor: &mut Motor,
        elapsed_timer: &mut WideTimer<L>,
        edge_timer: &mut WideTimer<E>,
        encoder: &mut EncoderReader<PIN>,
    ) where
        E: TimerRegs,
        L: TimerRegs,
        PIN: InputPin<Error = Infallible>,
    {
        motor.start();
        elapsed_timer.reset();
        elapsed_timer.start(Prescaler::Div1024);
        edge_timer.reset();
        edge_timer.start(Prescaler::Div8);
        encoder.prime();
        self.phase = Phase::Sampling;
    }

    /// One measurement burst: count edges over a fresh edge-timer
    /// window, then do the sample bookkeeping. A pending received byte
    /// or a window timeout abandons the burst instead of blocking.
    pub fn run_burst<E, L, PIN>(
        &mut self,
        encoder: &mut EncoderReader<PIN>,
        edge_timer: &mut WideTimer<E>,
        elapsed_timer: &mut WideTimer<L>,
        console: &SerialConsole,
    ) -> BurstOutcome
    where
        E: TimerRegs,
        L: TimerRegs,
        PIN: InputPin<Error = Infallible>,
    {
        edge_timer.reset();
        edge_timer.start(Prescaler::Div8);
        encoder.begin_window();

        loop {
            if console.rx_ready() {
                return BurstOutcome::Interrupted;
            }
            let window_ticks = edge_timer.ticks();
            // keep the elapsed counter folding its rollovers too
            let _ = elapsed_timer.ticks();
            if window_ticks >= EDGE_WINDOW_TIMEOUT_TICKS {
                return BurstOutcome::Stalled;
            }
            if encoder.poll() {
                break;
            }
        }

        let window_ticks = edge_timer.ticks();
        let now_ticks = elapsed_timer.ticks();
        BurstOutcome::Window(self.finish_window(window_ticks, now_ticks))
    }

    /// Bookkeeping for one completed window. Pure in the tick inputs:
    /// the same readings always produce the same report.
    pub fn finish_window(&mut self, window_ticks: u32, now_ticks: u32) -> WindowReport {
        let rpm = rpm_from_window(window_ticks);

        // First sample records absolute elapsed ticks; afterwards the
        // wraparound-safe delta over the counter's 32-bit width.
        let interval_ticks = match self.last_tick {
            None => now_ticks,
            Some(previous) => now_ticks.wrapping_sub(previous),
        };
        self.last_tick = Some(now_ticks);

        let mut auto_step = false;
        let mut history_full = false;
        match self.history.record(now_ticks) {
            RecordOutcome::Stored { index } => {
                auto_step = index + 1 == AUTO_STEP_SAMPLE;
            }
            RecordOutcome::Full => {
                history_full = !self.history_full_noted;
                self.history_full_noted = true;
            }
        }

        WindowReport {
            sample: Sample {
                interval_ticks,
                rpm,
            },
            transmit: rpm != 0,
            auto_step,
            history_full,
        }
    }

    /// One received byte between bursts: dispatch it if it is a
    /// command, and accumulate it into the current input line.
    pub fn consume_byte(
        &mut self,
        byte: u8,
        motor: &mut Motor,
        console: &mut SerialConsole,
    ) -> Result<(), Error> {
        match Command::parse(byte) {
            Some(Command::Duty(percent)) => motor.set_duty_percent(percent)?,
            Some(Command::EndLine) => {
                // CR ends the line without being stored
                self.line.clear();
                console.transmit("\r\n")?;
                return Ok(());
            }
            Some(Command::Reserved) | None => {}
        }

        if self.line.try_push(byte).is_err() {
            // a full line ends the same way a CR does
            self.line.clear();
            console.transmit("\r\n")?;
        }
        Ok(())
    }
}

impl Default for TachApp {
    fn default() -> Self {
        Self::new()
    }
}
