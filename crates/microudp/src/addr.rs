use core::fmt;

/// Length of a MAC address in bytes.
pub const MAC_ADDR_LEN: usize = 6;

/// An Ethernet MAC address.
///
/// The all-zero address is reserved as the "unresolved" sentinel of the ARP
/// cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::From)]
pub struct MacAddr([u8; MAC_ADDR_LEN]);

impl MacAddr {
    pub const UNSPECIFIED: Self = Self([0; MAC_ADDR_LEN]);
    pub const BROADCAST: Self = Self([0xff; MAC_ADDR_LEN]);

    #[must_use]
    pub const fn new(octets: [u8; MAC_ADDR_LEN]) -> Self {
        Self(octets)
    }

    #[must_use]
    pub const fn octets(self) -> [u8; MAC_ADDR_LEN] {
        self.0
    }

    #[must_use]
    pub fn is_unspecified(self) -> bool {
        self == Self::UNSPECIFIED
    }
}

impl From<MacAddr> for [u8; MAC_ADDR_LEN] {
    fn from(addr: MacAddr) -> Self {
        addr.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
