pub mod encoder;
pub mod motor;
pub mod serial_console;

pub use encoder::{EdgeDetector, EncoderReader};
pub use motor::Motor;
pub use serial_console::SerialConsole;
