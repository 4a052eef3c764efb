use core::{
    ptr,
    sync::atomic::{self, Ordering},
};

use microudp::{EthMac, FrameBuffer, Framing, Slot};

use crate::csr::{self, EthMacRegisters, Event};

/// Addresses of the four DMA frame buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferMap {
    pub rx: [usize; 2],
    pub tx: [usize; 2],
}

impl BufferMap {
    /// Two receive slots followed by two transmit slots, `slot_size` bytes
    /// apart, starting at `base`.
    #[must_use]
    pub const fn contiguous(base: usize, slot_size: usize) -> Self {
        Self {
            rx: [base, base + slot_size],
            tx: [base + 2 * slot_size, base + 3 * slot_size],
        }
    }
}

/// The LiteEth MAC with its SRAM writer and reader.
///
/// `HW_FRAMING` is `true` when the gateware generates and checks the
/// preamble and CRC itself.
pub struct LiteEthMac<'a, const HW_FRAMING: bool> {
    regs: &'a EthMacRegisters,
    rx: [*const FrameBuffer; 2],
    tx: [*mut FrameBuffer; 2],
    dcache_flush: Option<fn()>,
}

impl<const HW_FRAMING: bool> LiteEthMac<'static, HW_FRAMING> {
    /// Creates the driver for the MAC whose CSR block is at `csr_base`.
    ///
    /// # Safety
    ///
    /// `csr_base` must be the address of the MAC's CSR block, and every
    /// address in `buffers` that of a frame buffer of the same MAC. Only one
    /// driver may exist for a MAC.
    #[must_use]
    pub unsafe fn new(csr_base: usize, buffers: &BufferMap) -> Self {
        log::debug!("ethmac: CSR at {csr_base:#x}, buffers {buffers:x?}");
        unsafe { Self::from_registers(csr::block(csr_base), buffers) }
    }
}

impl<'a, const HW_FRAMING: bool> LiteEthMac<'a, HW_FRAMING> {
    /// # Safety
    ///
    /// Every address in `buffers` must be that of a frame buffer of the MAC
    /// behind `regs`, valid for `'a` and accessed through nothing else.
    #[must_use]
    pub unsafe fn from_registers(regs: &'a EthMacRegisters, buffers: &BufferMap) -> Self {
        Self {
            regs,
            rx: buffers.rx.map(ptr::with_exposed_provenance),
            tx: buffers.tx.map(ptr::with_exposed_provenance_mut),
            dcache_flush: None,
        }
    }

    /// Flushes the data cache with `flush` before each received frame is
    /// read, for CPUs whose cache does not snoop the DMA writes.
    #[must_use]
    pub fn with_dcache_flush(mut self, flush: fn()) -> Self {
        self.dcache_flush = Some(flush);
        self
    }

    /// Number of frames the receiver dropped for lack of a free buffer.
    #[must_use]
    pub fn rx_errors(&self) -> u32 {
        self.regs.writer.errors.get()
    }
}

impl<const HW_FRAMING: bool> EthMac for LiteEthMac<'_, HW_FRAMING> {
    const FRAMING: Framing = if HW_FRAMING {
        Framing::Hardware
    } else {
        Framing::Software
    };

    fn clear_events(&mut self) {
        self.regs.reader.ev_pending.set(Event::SRAM.bits());
        self.regs.writer.ev_pending.set(Event::SRAM.bits());
    }

    fn rx_pending(&mut self) -> bool {
        Event::from_bits_truncate(self.regs.writer.ev_pending.get()).contains(Event::SRAM)
    }

    fn rx_slot(&mut self) -> Slot {
        Slot::from_register(self.regs.writer.slot.get())
    }

    fn rx_len(&mut self) -> usize {
        usize::try_from(self.regs.writer.length.get()).unwrap_or(usize::MAX)
    }

    fn rx_ack(&mut self) {
        self.regs.writer.ev_pending.set(Event::SRAM.bits());
    }

    fn invalidate_rx(&mut self, _slot: Slot) {
        // buffer reads must not move above the event check
        atomic::fence(Ordering::Acquire);
        if let Some(flush) = self.dcache_flush {
            flush();
        }
    }

    fn rx_buffer(&self, slot: Slot) -> &FrameBuffer {
        unsafe { &*self.rx[slot.index()] }
    }

    fn tx_buffer(&mut self, slot: Slot) -> &mut FrameBuffer {
        unsafe { &mut *self.tx[slot.index()] }
    }

    fn tx_load(&mut self, slot: Slot, len: usize) {
        self.regs.reader.slot.set(slot as u32);
        self.regs
            .reader
            .length
            .set(u32::try_from(len).unwrap_or(u32::MAX));
    }

    fn tx_ready(&mut self) -> bool {
        self.regs.reader.ready.get() & 1 != 0
    }

    fn tx_start(&mut self) {
        // frame stores must land before the reader is started
        atomic::fence(Ordering::Release);
        self.regs.reader.start.set(1);
    }
}
