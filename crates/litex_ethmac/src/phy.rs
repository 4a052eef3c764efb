use core::time::Duration;

use microudp::Clock;
use strum::FromRepr;

use crate::csr::{self, Csr};

/// How long each step of the PHY reset sequence lasts.
pub const RESET_STEP: Duration = Duration::from_millis(200);

/// Interface mode reported by the PHY mode detector.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
pub enum PhyMode {
    Gmii = 0,
    Mii = 1,
}

/// The clock/reset generator and mode detector of a LiteEth PHY.
pub struct LiteEthPhy<'a> {
    crg_reset: &'a Csr,
    mode_detection: Option<&'a Csr>,
}

impl LiteEthPhy<'static> {
    /// Creates the driver for the PHY whose reset register is at
    /// `crg_reset`.
    ///
    /// # Safety
    ///
    /// `crg_reset` must be the address of the PHY clock/reset generator's
    /// reset register.
    #[must_use]
    pub unsafe fn new(crg_reset: usize) -> Self {
        Self::from_registers(unsafe { csr::block(crg_reset) })
    }

    /// Adds the mode detection register at `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must be the address of the PHY's mode detection register.
    #[must_use]
    pub unsafe fn with_mode_detection(self, addr: usize) -> Self {
        self.with_mode_register(unsafe { csr::block(addr) })
    }
}

impl<'a> LiteEthPhy<'a> {
    #[must_use]
    pub fn from_registers(crg_reset: &'a Csr) -> Self {
        Self {
            crg_reset,
            mode_detection: None,
        }
    }

    #[must_use]
    pub fn with_mode_register(mut self, mode_detection: &'a Csr) -> Self {
        self.mode_detection = Some(mode_detection);
        self
    }

    /// Resets the PHY.
    ///
    /// Some PHYs only come up reliably after a second reset, so the sequence
    /// is: release, assert, release, each held for [`RESET_STEP`].
    pub fn reset<C>(&self, clock: &C)
    where
        C: Clock + ?Sized,
    {
        log::debug!("ethphy: reset");
        for value in [0, 1, 0] {
            self.crg_reset.set(value);
            clock.delay(RESET_STEP);
        }
    }

    /// Returns the detected interface mode, or `None` if the PHY has no mode
    /// detector.
    #[must_use]
    pub fn mode(&self) -> Option<PhyMode> {
        let value = self.mode_detection?.get();
        let mode = PhyMode::from_repr(value & 1)?;
        log::debug!("ethphy: mode {mode:?}");
        Some(mode)
    }
}
