use crate::drivers::SerialConsole;
use core::fmt::Write;

pub struct TestRunner {
    console: SerialConsole,
    total_tests: u32,
    passed_tests: u32,
    current_suite: &'static str,
}

pub trait TestCase {
    fn run(&self) -> TestResult;
    fn name(&self) -> &'static str;
}

#[derive(PartialEq)]
pub enum TestResult {
    Pass,
    Fail(TestError),
}

#[derive(PartialEq)]
pub enum TestError {
    AssertionFailed(&'static str),
    Timeout,
    HardwareFault,
}

impl TestRunner {
    pub fn new() -> Self {
        Self {
            console: SerialConsole::new(),
            total_tests: 0,
            passed_tests: 0,
            current_suite: "",
        }
    }

    pub fn run_suite(&mut self, name: &'static str, tests: &[&dyn TestCase]) {
        self.current_suite = name;
        self.console
            .write_fmt(format_args!("\n=== Test Suite: {} ===\n", name))
            .ok();

        for test in tests {
            self.total_tests += 1;
            self.console
                .write_fmt(format_args!("Running {}: ", test.name()))
                .ok();

            match test.run() {
                TestResult::Pass => {
                    self.passed_tests += 1;
                    self.console.write_str("PASS\n").ok();
                }
                TestResult::Fail(err) => {
                    self.console
                        .write_fmt(format_args!("FAIL - {:?}\n", err))
                        .ok();
                }
            }
        }

        self.print_summary();
    }

    fn print_summary(&mut self) {
        self.console
            .write_fmt(format_args!("\nTest Summary for {}:\n", self.current_suite))
            .ok();

        self.console
            .write_fmt(format_args!(
                "Passed: {}/{} ({}%)\n",
                self.passed_tests,
                self.total_tests,
                (self.passed_tests * 100) / self.total_tests
            ))
            .ok();
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TestError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TestError::AssertionFailed(msg) => f.write_str(msg),
            TestError::Timeout => f.write_str("Timeout"),
            TestError::HardwareFault => f.write_str("HardwareFault"),
        }
    }
}

#[macro_export]
macro_rules! assert_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return TestResult::Fail(TestError::AssertionFailed(concat!(
                "assertion failed: `left == right`\n",
                "  left: `",
                stringify!($left),
                "`\n",
                "  right: `",
                stringify!($right),
                "`"
            )));
        }
    };
}

#[macro_export]
macro_rules! assert_within {
    ($value:expr, $target:expr, $tolerance:expr) => {
        if ($value - $target).abs() > $tolerance {
            return TestResult::Fail(TestError::AssertionFailed(concat!(
                "assertion failed: `value within tolerance of target`\n",
                "  value: `",
                stringify!($value),
                "`\n",
                "  target: `",
                stringify!($target),
                "`\n",
                "  tolerance: `",
                stringify!($tolerance),
                "`"
            )));
        }
    };
}

#[macro_export]
macro_rules! assert_timeout {
    ($cond:expr, $timeout:expr) => {
        let mut timeout = $timeout;
        while !$cond {
            if timeout == 0 {
                return TestResult::Fail(TestError::Timeout);
            }
            timeout -= 1;
            crate::hal::delay_ms(1);
        }
    };
}

/// Replays a scripted level sequence through the `InputPin` seam,
/// repeating the final level once the script runs out.
pub struct ScriptedPin<'a> {
    levels: &'a [bool],
    index: core::cell::Cell<usize>,
}

impl<'a> ScriptedPin<'a> {
    pub fn new(levels: &'a [bool]) -> Self {
        Self {
            levels,
            index: core::cell::Cell::new(0),
        }
    }

    fn next_level(&self) -> bool {
        let i = self.index.get();
        if i < self.levels.len() {
            self.index.set(i + 1);
            self.levels[i]
        } else {
            *self.levels.last().unwrap_or(&false)
        }
    }
}

impl embedded_hal::digital::v2::InputPin for ScriptedPin<'_> {
    type Error = core::convert::Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.next_level())
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.next_level())
    }
}

pub struct DutyCompareTest;
impl TestCase for DutyCompareTest {
    fn name(&self) -> &'static str {
        "Duty Compare Computation"
    }

    fn run(&self) -> TestResult {
        use crate::hal::pwm::duty_compare;

        // 1kHz TOP is 1999, so (top + 1) * p / 100 is exact
        assert_eq!(duty_compare(1999, 0), 0);
        assert_eq!(duty_compare(1999, 10), 200);
        assert_eq!(duty_compare(1999, 33), 660);
        assert_eq!(duty_compare(1999, 50), 1000);
        assert_eq!(duty_compare(1999, 75), 1500);
        assert_eq!(duty_compare(1999, 100), 2000);

        TestResult::Pass
    }
}

pub struct EdgeCountTest;
impl TestCase for EdgeCountTest {
    fn name(&self) -> &'static str {
        "Edge Counting"
    }

    fn run(&self) -> TestResult {
        use crate::drivers::EdgeDetector;

        // three rising edges; falls and repeats are not counted
        let levels = [
            false, true, true, false, true, false, false, true, false,
        ];
        let mut detector = EdgeDetector::new();
        let mut rising = 0u8;
        for level in levels {
            if detector.sample(level) {
                rising += 1;
            }
        }
        assert_eq!(rising, 3);
        assert_eq!(detector.edges(), 3);

        TestResult::Pass
    }
}

pub struct WindowCompletionTest;
impl TestCase for WindowCompletionTest {
    fn name(&self) -> &'static str {
        "Window Completes At Eighth Edge"
    }

    fn run(&self) -> TestResult {
        use crate::drivers::EncoderReader;

        // alternating low/high: every high sample is one rising edge
        let mut levels = [false; 20];
        for (i, slot) in levels.iter_mut().enumerate() {
            *slot = i % 2 == 1;
        }

        let mut reader = EncoderReader::new(ScriptedPin::new(&levels));
        reader.prime();
        reader.begin_window();

        let mut polls = 0u8;
        loop {
            polls += 1;
            if reader.poll() {
                break;
            }
            if polls > 32 {
                return TestResult::Fail(TestError::Timeout);
            }
        }
        // prime() consumed the leading low level, so the rising edges
        // land on polls 1, 3, ..., 15: the 15th sample carries the 8th
        // edge, not a sample sooner or later
        assert_eq!(polls, 15);
        assert_eq!(reader.edges(), 8);

        TestResult::Pass
    }
}

pub struct RpmFormulaTest;
impl TestCase for RpmFormulaTest {
    fn name(&self) -> &'static str {
        "RPM Formula Truncation"
    }

    fn run(&self) -> TestResult {
        use crate::application::rpm_from_window;

        // trunc(T * scale) / 60, truncating before the divide
        assert_eq!(rpm_from_window(0), 0);
        assert_eq!(rpm_from_window(50_000), 0); // 32.768 -> 32 -> 0
        assert_eq!(rpm_from_window(100_000), 1); // 65.536 -> 65 -> 1
        assert_eq!(rpm_from_window(200_000), 2); // 131.072 -> 131 -> 2
        assert_eq!(rpm_from_window(1_000_000), 10); // 655.36 -> 655 -> 10
        assert_eq!(rpm_from_window(10_000_000), 109); // 6553.6 -> 6553 -> 109

        TestResult::Pass
    }
}

pub struct IntervalScaleTest;
impl TestCase for IntervalScaleTest {
    fn name(&self) -> &'static str {
        "Interval Tick Scaling"
    }

    fn run(&self) -> TestResult {
        use crate::application::interval_seconds;

        // 10_000 ticks * 6.4^-6 s/tick, checked in tenth-microseconds
        let scaled = (interval_seconds(10_000) * 10_000_000.0) as i32;
        assert_within!(scaled, 1_455_191, 2);

        TestResult::Pass
    }
}

pub struct DeltaIdempotenceTest;
impl TestCase for DeltaIdempotenceTest {
    fn name(&self) -> &'static str {
        "Delta Replay Is Idempotent"
    }

    fn run(&self) -> TestResult {
        use crate::application::TachApp;

        let readings = [1_000u32, 4_000, 9_000];

        let mut first_run = [0u32; 3];
        {
            let mut app = TachApp::new();
            for (i, now) in readings.iter().enumerate() {
                first_run[i] = app.finish_window(150_000, *now).sample.interval_ticks;
            }
        }

        let mut second_run = [0u32; 3];
        {
            let mut app = TachApp::new();
            for (i, now) in readings.iter().enumerate() {
                second_run[i] = app.finish_window(150_000, *now).sample.interval_ticks;
            }
        }

        assert_eq!(first_run, second_run);
        // first sample is absolute, the rest are deltas
        assert_eq!(first_run[0], 1_000);
        assert_eq!(first_run[1], 3_000);
        assert_eq!(first_run[2], 5_000);

        TestResult::Pass
    }
}

pub struct WrapDeltaTest;
impl TestCase for WrapDeltaTest {
    fn name(&self) -> &'static str {
        "Delta Survives Counter Wrap"
    }

    fn run(&self) -> TestResult {
        use crate::application::TachApp;

        let mut app = TachApp::new();
        app.finish_window(200_000, 0xFFFF_FF00);
        let wrapped = app.finish_window(200_000, 0x0000_0100);
        assert_eq!(wrapped.sample.interval_ticks, 0x200);

        TestResult::Pass
    }
}

pub struct ZeroRpmSuppressionTest;
impl TestCase for ZeroRpmSuppressionTest {
    fn name(&self) -> &'static str {
        "Zero RPM Suppression"
    }

    fn run(&self) -> TestResult {
        use crate::application::TachApp;

        let mut app = TachApp::new();
        let report = app.finish_window(50_000, 1_234);

        // no line, but the tick is recorded and the cursor advanced
        assert_eq!(report.sample.rpm, 0);
        assert_eq!(report.transmit, false);
        assert_eq!(report.sample.interval_ticks, 1_234);
        assert_eq!(app.sample_count(), 1);

        TestResult::Pass
    }
}

pub struct CommandMapTest;
impl TestCase for CommandMapTest {
    fn name(&self) -> &'static str {
        "Command Mapping"
    }

    fn run(&self) -> TestResult {
        use crate::application::Command;

        assert_eq!(Command::parse(b'w'), Some(Command::Duty(10)));
        assert_eq!(Command::parse(b'e'), Some(Command::Duty(30)));
        assert_eq!(Command::parse(b'r'), Some(Command::Duty(50)));
        assert_eq!(Command::parse(b't'), Some(Command::Duty(75)));
        assert_eq!(Command::parse(b'y'), Some(Command::Duty(100)));
        assert_eq!(Command::parse(b'q'), Some(Command::Reserved));
        assert_eq!(Command::parse(b'\r'), Some(Command::EndLine));
        // case-sensitive; everything else falls through
        assert_eq!(Command::parse(b'W'), None);
        assert_eq!(Command::parse(b'a'), None);
        assert_eq!(Command::parse(b'x'), None);
        assert_eq!(Command::parse(0x00), None);

        TestResult::Pass
    }
}

pub struct AutoStepTest;
impl TestCase for AutoStepTest {
    fn name(&self) -> &'static str {
        "Auto Step At Sample 500"
    }

    fn run(&self) -> TestResult {
        use crate::application::TachApp;
        use crate::config::AUTO_STEP_SAMPLE;

        let mut app = TachApp::new();
        let mut tick = 0u32;
        for count in 1..=(AUTO_STEP_SAMPLE + 1) {
            tick += 100;
            let report = app.finish_window(200_000, tick);
            assert_eq!(report.auto_step, count == AUTO_STEP_SAMPLE);
        }

        TestResult::Pass
    }
}

pub struct HistoryFullTest;
impl TestCase for HistoryFullTest {
    fn name(&self) -> &'static str {
        "History Full Is One-Shot"
    }

    fn run(&self) -> TestResult {
        use crate::application::TachApp;
        use crate::config::SAMPLE_CAPACITY;

        let mut app = TachApp::new();
        let mut tick = 0u32;
        for _ in 0..SAMPLE_CAPACITY {
            tick += 1_000;
            let report = app.finish_window(200_000, tick);
            assert_eq!(report.history_full, false);
        }
        assert_eq!(app.sample_count(), SAMPLE_CAPACITY);

        let first_over = app.finish_window(200_000, tick + 1_000);
        assert_eq!(first_over.history_full, true);

        // notice is one-shot; live samples keep flowing off last_tick
        let second_over = app.finish_window(200_000, tick + 2_000);
        assert_eq!(second_over.history_full, false);
        assert_eq!(second_over.sample.interval_ticks, 1_000);
        assert_eq!(app.sample_count(), SAMPLE_CAPACITY);

        TestResult::Pass
    }
}

pub struct FirstSampleAbsoluteTest;
impl TestCase for FirstSampleAbsoluteTest {
    fn name(&self) -> &'static str {
        "First Sample Records Absolute Ticks"
    }

    fn run(&self) -> TestResult {
        use crate::application::TachApp;

        let mut app = TachApp::new();

        let first = app.finish_window(200_000, 12_345);
        assert_eq!(first.sample.interval_ticks, 12_345);
        assert_eq!(first.sample.rpm, 2);
        assert_eq!(first.transmit, true);

        let second = app.finish_window(200_000, 22_345);
        assert_eq!(second.sample.interval_ticks, 10_000);

        TestResult::Pass
    }
}

// On-target checks; these need the real registers.

pub struct PwmCompareTest;
impl TestCase for PwmCompareTest {
    fn name(&self) -> &'static str {
        "PWM Compare Readback"
    }

    fn run(&self) -> TestResult {
        use crate::hal::pwm::{Pwm, PwmFreq};

        let mut pwm = Pwm::new();
        if pwm.configure(PwmFreq::Hz1000, 10).is_err() {
            return TestResult::Fail(TestError::HardwareFault);
        }
        assert_eq!(pwm.top(), 1999);
        assert_eq!(pwm.compare(), 200);

        if pwm.set_duty_percent(75).is_err() {
            return TestResult::Fail(TestError::HardwareFault);
        }
        assert_eq!(pwm.compare(), 1500);

        // out-of-range duty must be rejected, compare untouched
        assert_eq!(pwm.set_duty_percent(101).is_err(), true);
        assert_eq!(pwm.compare(), 1500);

        TestResult::Pass
    }
}

pub struct TimerMonotonicTest;
impl TestCase for TimerMonotonicTest {
    fn name(&self) -> &'static str {
        "Wide Timer Counts Up"
    }

    fn run(&self) -> TestResult {
        use crate::hal::timer::{Prescaler, WideTimer};
        use avr_device::atmega2560::TC3;

        let mut timer = WideTimer::<TC3>::new();
        timer.start(Prescaler::Div8);
        let start = timer.ticks();
        assert_timeout!(timer.ticks() > start, 10);
        timer.stop();

        TestResult::Pass
    }
}
