#![no_std]
#![no_main]

use panic_halt as _;

use avr_device::atmega2560::{Peripherals, TC3, TC4};

use motor_bench_firmware::application::{
    interval_seconds, BurstOutcome, Error, Phase, TachApp, WindowReport,
};
use motor_bench_firmware::config::AUTO_STEP_DUTY_PERCENT;
use motor_bench_firmware::drivers::{EncoderReader, Motor, SerialConsole};
use motor_bench_firmware::hal::gpio::board;
use motor_bench_firmware::hal::timer::WideTimer;
use motor_bench_firmware::hal::{Watchdog, WatchdogTimeout};

#[avr_device::entry]
fn main() -> ! {
    // Claim the device once; the drivers reach their registers through
    // the register-block pointers like the rest of the HAL.
    let _dp = Peripherals::take().unwrap();

    let mut console = SerialConsole::new();
    let mut motor = Motor::new().unwrap();
    let mut encoder = EncoderReader::new(board::Encoder::default().into_input());
    let mut edge_timer = WideTimer::<TC3>::new();
    let mut elapsed_timer = WideTimer::<TC4>::new();
    let mut watchdog = Watchdog::new();
    let mut app = TachApp::new();

    watchdog.start(WatchdogTimeout::Ms2000);

    // Push whatever the terminal was showing out of the way
    for _ in 0..8 {
        let _ = console.transmit("\r\n");
    }
    let _ = console.write_line("============ Motor Bench ============");
    let _ = console.write_line("Press any key to start the motor");
    let _ = console.write_line("");

    loop {
        watchdog.feed();

        match app.phase() {
            Phase::Unarmed => {
                // the first byte arms the bench; it is consumed here and
                // never dispatched as a command
                if console.read_byte().is_some() {
                    app.arm(&mut motor, &mut elapsed_timer, &mut edge_timer, &mut encoder);
                }
            }
            Phase::Sampling => {
                match app.run_burst(&mut encoder, &mut edge_timer, &mut elapsed_timer, &console) {
                    BurstOutcome::Window(report) => {
                        if deliver(&mut console, &mut motor, &report).is_err() {
                            // serial wedged or duty rejected: safe duty,
                            // keep polling; the watchdog covers the rest
                            let _ = motor.set_duty_percent(0);
                        }
                    }
                    BurstOutcome::Interrupted | BurstOutcome::Stalled => {}
                }

                // commands are consumed opportunistically between bursts
                if let Some(byte) = console.read_byte() {
                    if app.consume_byte(byte, &mut motor, &mut console).is_err() {
                        let _ = motor.set_duty_percent(0);
                    }
                }
            }
        }
    }
}

/// Apply the automatic duty step before the line goes out, then the
/// sample line, then any one-shot notices.
fn deliver(console: &mut SerialConsole, motor: &mut Motor, report: &WindowReport) -> Result<(), Error> {
    if report.auto_step {
        motor.set_duty_percent(AUTO_STEP_DUTY_PERCENT)?;
    }
    if report.transmit {
        console.write_fixed4(interval_seconds(report.sample.interval_ticks))?;
        ufmt::uwrite!(console, "\t{}\r\n", report.sample.rpm)?;
        console.flush()?;
    }
    if report.history_full {
        console.write_line("history full; recording stopped")?;
    }
    Ok(())
}
