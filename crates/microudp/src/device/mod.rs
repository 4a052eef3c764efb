//! Interface to the MAC device and the timing source.

use core::{cell::Cell, time::Duration};

use strum::FromRepr;

use crate::params::{CRC_LEN, FRAME_BUFFER_SIZE, MIN_FRAME_LEN, PREAMBLE_LEN};

#[cfg(test)]
pub(crate) mod mock;

/// One DMA frame buffer.
pub type FrameBuffer = [u8; FRAME_BUFFER_SIZE];

/// Index of one of the two buffers of a direction.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromRepr)]
pub enum Slot {
    #[default]
    Zero = 0,
    One = 1,
}

impl Slot {
    /// Decodes a slot register value. Only the low bit is significant.
    #[must_use]
    pub fn from_register(value: u32) -> Self {
        Self::from_repr(value & 1).unwrap_or_default()
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }
}

/// Whether the MAC or the stack handles the preamble and the CRC trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// The MAC generates and strips the preamble and CRC.
    Hardware,
    /// Frames in the buffers start with the 8-byte preamble and end with the
    /// CRC32 trailer.
    Software,
}

impl Framing {
    #[must_use]
    pub const fn preamble_len(self) -> usize {
        match self {
            Self::Hardware => 0,
            Self::Software => PREAMBLE_LEN,
        }
    }

    #[must_use]
    pub const fn crc_len(self) -> usize {
        match self {
            Self::Hardware => 0,
            Self::Software => CRC_LEN,
        }
    }

    /// Minimum length of a frame in a buffer, excluding the CRC trailer.
    ///
    /// Every transmitted frame is padded to this length, and received ARP
    /// frames shorter than it are dropped.
    #[must_use]
    pub const fn min_frame_len(self) -> usize {
        self.preamble_len() + MIN_FRAME_LEN
    }
}

/// A MAC with two receive and two transmit buffers.
///
/// The receive side corresponds to the DMA writer, which fills a buffer from
/// the wire and raises an event; the transmit side to the DMA reader, which
/// sends a buffer to the wire once started.
///
/// At most one buffer per direction is owned by software at any time. A
/// receive buffer belongs to software from the moment its event is seen
/// until [`rx_ack`](Self::rx_ack); a transmit buffer from the previous
/// [`tx_start`](Self::tx_start) until it is loaded again.
pub trait EthMac {
    /// Framing capability of the hardware, fixed for the device type.
    const FRAMING: Framing;

    /// Clears any pending receive and transmit events.
    fn clear_events(&mut self);

    /// Returns `true` if a received frame is waiting.
    fn rx_pending(&mut self) -> bool;

    /// Slot holding the pending received frame.
    fn rx_slot(&mut self) -> Slot;

    /// Length of the pending received frame, as reported by the hardware.
    fn rx_len(&mut self) -> usize;

    /// Acknowledges the pending receive event, handing the buffer back.
    fn rx_ack(&mut self);

    /// Makes DMA writes to the receive buffer of `slot` visible to the CPU.
    ///
    /// Hosts with a data cache that is not coherent with the DMA engine must
    /// invalidate it here.
    fn invalidate_rx(&mut self, slot: Slot) {
        let _ = slot;
    }

    fn rx_buffer(&self, slot: Slot) -> &FrameBuffer;

    fn tx_buffer(&mut self, slot: Slot) -> &mut FrameBuffer;

    /// Programs the slot and length of the next frame to send.
    fn tx_load(&mut self, slot: Slot, len: usize);

    /// Returns `true` if the transmitter can accept a start request.
    fn tx_ready(&mut self) -> bool;

    /// Starts sending the loaded frame.
    fn tx_start(&mut self);
}

/// A monotonic time source.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed point.
    fn now(&self) -> Duration;

    /// Busy-waits for `duration`.
    fn delay(&self, duration: Duration) {
        let start = self.now();
        while self.now().saturating_sub(start) < duration {
            core::hint::spin_loop();
        }
    }
}

/// A clock that advances by a fixed tick each time it is read.
///
/// On hosts without a usable timer this turns time-based timeouts into poll
/// counts: with a 100 ns tick a 200 ms ARP timeout allows two million polls.
/// The real-time length of such a timeout depends on the CPU speed.
#[derive(Debug)]
pub struct PollClock {
    tick: Duration,
    now: Cell<Duration>,
}

impl PollClock {
    #[must_use]
    pub const fn new(tick: Duration) -> Self {
        Self {
            tick,
            now: Cell::new(Duration::ZERO),
        }
    }
}

impl Clock for PollClock {
    fn now(&self) -> Duration {
        let now = self.now.get();
        self.now.set(now.saturating_add(self.tick));
        now
    }
}
