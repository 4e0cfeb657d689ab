use core::convert::Infallible;
use embedded_hal::digital::v2::InputPin;

use crate::config::EDGES_PER_WINDOW;

/// Rising-edge detector over sampled pin levels. Counts only 0->1
/// transitions; 0->0, 1->1 and 1->0 leave the count alone.
pub struct EdgeDetector {
    last_level: bool,
    edges: u8,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self {
            last_level: false,
            edges: 0,
        }
    }

    /// Feed one level sample. True when this sample is a rising edge.
    pub fn sample(&mut self, level: bool) -> bool {
        let rising = level && !self.last_level;
        self.last_level = level;
        if rising {
            self.edges += 1;
        }
        rising
    }

    pub fn edges(&self) -> u8 {
        self.edges
    }

    /// A window is complete exactly at the configured edge count.
    pub fn window_complete(&self) -> bool {
        self.edges >= EDGES_PER_WINDOW
    }

    /// Start a new window. The latched level carries over so the first
    /// sample of a window cannot fake an edge.
    pub fn begin_window(&mut self) {
        self.edges = 0;
    }

    pub fn latch_level(&mut self, level: bool) {
        self.last_level = level;
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// The shaft encoder input: one digital pin behind an edge detector.
pub struct EncoderReader<PIN> {
    pin: PIN,
    detector: EdgeDetector,
}

impl<PIN> EncoderReader<PIN>
where
    PIN: InputPin<Error = Infallible>,
{
    pub fn new(pin: PIN) -> Self {
        Self {
            pin,
            detector: EdgeDetector::new(),
        }
    }

    /// Latch the current line level without counting; called at arm
    /// time so an idle-high line does not register a phantom edge.
    pub fn prime(&mut self) {
        let level = self.level();
        self.detector.latch_level(level);
    }

    pub fn begin_window(&mut self) {
        self.detector.begin_window();
    }

    /// Sample the pin once. True when the window just completed.
    pub fn poll(&mut self) -> bool {
        let level = self.level();
        self.detector.sample(level);
        self.detector.window_complete()
    }

    pub fn edges(&self) -> u8 {
        self.detector.edges()
    }

    fn level(&self) -> bool {
        match self.pin.is_high() {
            Ok(level) => level,
            Err(e) => match e {},
        }
    }
}
