use core::net::Ipv4Addr;

/// Failure of [`NetStack::resolve`](crate::NetStack::resolve) or
/// [`NetStack::send`](crate::NetStack::send).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NetError {
    /// No ARP reply arrived for the address within the configured attempts.
    #[error("no ARP reply from {0}")]
    ArpTimeout(Ipv4Addr),
    /// The destination MAC address has not been resolved.
    #[error("destination MAC address is unresolved")]
    Unresolved,
    /// The payload does not fit in a transmit buffer.
    #[error("UDP payload too large: {len} bytes (capacity {capacity})")]
    PayloadTooLarge { len: usize, capacity: usize },
}
