#![no_std]
#![no_main]

use panic_halt as _;

use motor_bench_firmware::hal::delay_ms;
use motor_bench_firmware::testing::{
    AutoStepTest, CommandMapTest, DeltaIdempotenceTest, DutyCompareTest, EdgeCountTest,
    FirstSampleAbsoluteTest, HistoryFullTest, IntervalScaleTest, PwmCompareTest, RpmFormulaTest,
    TestCase, TestRunner, TimerMonotonicTest, WindowCompletionTest, WrapDeltaTest,
    ZeroRpmSuppressionTest,
};

#[avr_device::entry]
fn main() -> ! {
    let mut runner = TestRunner::new();

    let logic_tests: [&dyn TestCase; 12] = [
        &DutyCompareTest,
        &EdgeCountTest,
        &WindowCompletionTest,
        &RpmFormulaTest,
        &IntervalScaleTest,
        &DeltaIdempotenceTest,
        &WrapDeltaTest,
        &ZeroRpmSuppressionTest,
        &CommandMapTest,
        &AutoStepTest,
        &HistoryFullTest,
        &FirstSampleAbsoluteTest,
    ];

    let hardware_tests: [&dyn TestCase; 2] = [&PwmCompareTest, &TimerMonotonicTest];

    runner.run_suite("Sample Loop Logic", &logic_tests);
    delay_ms(1000);

    runner.run_suite("Hardware", &hardware_tests);

    loop {
        delay_ms(1000);
    }
}
