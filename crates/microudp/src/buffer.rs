use crate::device::Slot;

/// Active slot and valid length for one direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Active {
    pub(crate) slot: Slot,
    pub(crate) len: usize,
}

/// Software view of the ping-pong buffers.
///
/// The buffers themselves live at fixed addresses owned by the
/// [`EthMac`](crate::EthMac); this tracks which one of each pair software
/// currently works on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BufferSet {
    pub(crate) rx: Active,
    pub(crate) tx: Active,
}

impl BufferSet {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Records the frame the hardware reported as received.
    pub(crate) fn set_rx(&mut self, slot: Slot, len: usize) {
        self.rx = Active { slot, len };
    }

    /// Moves on to the other transmit buffer after a hand-off.
    pub(crate) fn flip_tx(&mut self) {
        self.tx.slot = self.tx.slot.toggle();
    }
}
