//! Control and status register blocks.
//!
//! The layouts assume a SoC built with a 32-bit CSR data width, where every
//! register occupies one aligned 32-bit word.

use core::ptr;

use bitflags::bitflags;
use vcell::VolatileCell;

pub type Csr = VolatileCell<u32>;

bitflags! {
    /// Event bits of an SRAM writer or reader event manager.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Event: u32 {
        /// The DMA engine is done with a buffer.
        const SRAM = 1 << 0;
    }
}

/// Receive side: the SRAM writer fills buffers from the wire.
#[repr(C)]
pub struct SramWriterRegisters {
    pub slot: Csr,
    pub length: Csr,
    pub errors: Csr,
    pub ev_status: Csr,
    pub ev_pending: Csr,
    pub ev_enable: Csr,
}

/// Transmit side: the SRAM reader sends buffers to the wire.
#[repr(C)]
pub struct SramReaderRegisters {
    pub start: Csr,
    pub ready: Csr,
    pub level: Csr,
    pub slot: Csr,
    pub length: Csr,
    pub ev_status: Csr,
    pub ev_pending: Csr,
    pub ev_enable: Csr,
}

#[repr(C)]
pub struct EthMacRegisters {
    pub writer: SramWriterRegisters,
    pub reader: SramReaderRegisters,
}

#[repr(C)]
pub struct TimerRegisters {
    pub load: Csr,
    pub reload: Csr,
    pub en: Csr,
    pub update_value: Csr,
    pub value: Csr,
    pub ev_status: Csr,
    pub ev_pending: Csr,
    pub ev_enable: Csr,
}

/// Returns the register block mapped at `addr`.
///
/// # Safety
///
/// `addr` must be the address of a mapped block laid out as `T`, valid for
/// the whole program.
pub(crate) unsafe fn block<T>(addr: usize) -> &'static T {
    unsafe { &*ptr::with_exposed_provenance::<T>(addr) }
}
