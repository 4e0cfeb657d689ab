#![no_std]
#![no_main]

use panic_halt as _;

use motor_bench_firmware::drivers::Motor;
use motor_bench_firmware::hal::delay_ms;

#[avr_device::entry]
fn main() -> ! {
    let mut motor = Motor::new().unwrap();
    motor.start();

    // Simple duty ramp, up and back down
    let mut duty: u8 = 0;
    let mut increasing = true;

    loop {
        if increasing {
            duty += 5;
            if duty >= 100 {
                duty = 100;
                increasing = false;
            }
        } else {
            duty -= 5;
            if duty == 0 {
                increasing = true;
            }
        }

        let _ = motor.set_duty_percent(duty);
        delay_ms(100);
    }
}
