//! Fixed parameters of the stack and its runtime configuration.

use core::time::Duration;

/// Size of each of the four DMA frame buffers.
pub const FRAME_BUFFER_SIZE: usize = 1532;

/// Length of the software preamble.
pub const PREAMBLE_LEN: usize = 8;

/// Software preamble: seven `0x55` followed by the start-of-frame delimiter.
pub const PREAMBLE: [u8; PREAMBLE_LEN] = [0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0xd5];

/// Length of the Ethernet CRC trailer.
pub const CRC_LEN: usize = 4;

/// Minimum length of a transmitted frame when the MAC adds preamble and CRC.
pub const MIN_FRAME_LEN: usize = 60;

/// Number of ARP request broadcasts before giving up.
pub const ARP_ATTEMPTS: usize = 5;

/// How long each ARP attempt waits for a reply.
pub const ARP_TIMEOUT: Duration = Duration::from_millis(200);

/// Runtime configuration of a [`NetStack`](crate::NetStack).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of ARP request broadcasts per resolution.
    pub arp_attempts: usize,
    /// Time spent polling for a reply after each broadcast.
    pub arp_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arp_attempts: ARP_ATTEMPTS,
            arp_timeout: ARP_TIMEOUT,
        }
    }
}
