use avr_device::atmega2560::WDT;

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum WatchdogTimeout {
    Ms16 = 0,
    Ms32 = 1,
    Ms64 = 2,
    Ms125 = 3,
    Ms250 = 4,
    Ms500 = 5,
    Ms1000 = 6,
    Ms2000 = 7,
}

pub struct Watchdog {
    _private: (),
}

impl Watchdog {
    #[inline]
    pub fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    pub fn start(&mut self, timeout: WatchdogTimeout) {
        avr_device::asm::wdr();
        let p = unsafe { &*WDT::ptr() };
        // Timed sequence: change-enable, then reset mode and timeout
        p.wdtcsr.write(|w| unsafe { w.bits(0x18) });
        p.wdtcsr.write(|w| unsafe { w.bits(0x08 | timeout as u8) });
    }

    #[inline]
    pub fn feed(&mut self) {
        avr_device::asm::wdr();
    }

    #[inline]
    pub fn disable(&mut self) {
        avr_device::asm::wdr();
        let p = unsafe { &*WDT::ptr() };
        p.wdtcsr.write(|w| unsafe { w.bits(0x18) });
        p.wdtcsr.write(|w| unsafe { w.bits(0x00) });
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}
