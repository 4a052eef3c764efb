use core::{cell::Cell, time::Duration};

use microudp::Clock;

use crate::csr::{self, TimerRegisters};

/// A monotonic clock on the free-running `timer0` down-counter.
///
/// The counter wraps every 2^32 cycles; [`now`](Clock::now) must be called
/// at least that often for elapsed time to stay monotonic.
pub struct Timer0<'a> {
    regs: &'a TimerRegisters,
    frequency: u32,
    last: Cell<u32>,
    ticks: Cell<u64>,
}

impl Timer0<'static> {
    /// Takes over the timer whose CSR block is at `csr_base`.
    ///
    /// # Safety
    ///
    /// `csr_base` must be the address of a LiteX timer CSR block that
    /// nothing else uses.
    #[must_use]
    pub unsafe fn new(csr_base: usize, frequency: u32) -> Self {
        Self::from_registers(unsafe { csr::block(csr_base) }, frequency)
    }
}

impl<'a> Timer0<'a> {
    /// Restarts the timer as a free-running counter of `frequency` Hz.
    ///
    /// # Panics
    ///
    /// Panics if `frequency` is zero.
    #[must_use]
    pub fn from_registers(regs: &'a TimerRegisters, frequency: u32) -> Self {
        assert_ne!(frequency, 0, "timer frequency must be non-zero");
        regs.en.set(0);
        regs.load.set(u32::MAX);
        regs.reload.set(u32::MAX);
        regs.en.set(1);
        regs.update_value.set(1);
        let last = regs.value.get();
        log::debug!("timer0: free-running at {frequency} Hz");
        Self {
            regs,
            frequency,
            last: Cell::new(last),
            ticks: Cell::new(0),
        }
    }

    fn read(&self) -> u32 {
        self.regs.update_value.set(1);
        self.regs.value.get()
    }
}

impl Clock for Timer0<'_> {
    fn now(&self) -> Duration {
        let value = self.read();
        // the counter runs down
        let elapsed = self.last.replace(value).wrapping_sub(value);
        let ticks = self.ticks.get() + u64::from(elapsed);
        self.ticks.set(ticks);

        let frequency = u64::from(self.frequency);
        let secs = ticks / frequency;
        let nanos = (ticks % frequency) * 1_000_000_000 / frequency;
        Duration::new(secs, u32::try_from(nanos).unwrap_or(0))
    }
}
