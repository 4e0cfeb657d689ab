use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Configure for ATmega2560
    println!("cargo:rustc-link-arg=-mmcu=atmega2560");

    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=16000000");

    // Debug vs Release configurations
    if env::var("PROFILE").unwrap() == "debug" {
        println!("cargo:rustc-cfg=feature=\"debug\"");
    }

    // Ensure target is correct
    let target = env::var("TARGET").unwrap();
    if !target.contains("avr") {
        panic!("This crate only supports AVR targets!");
    }

    // Output helpful build information
    println!("cargo:warning=Building for ATmega2560 at 16MHz");
    println!("cargo:warning=Output directory: {}", out_dir.display());
}
