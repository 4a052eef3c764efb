use core::net::Ipv4Addr;

use dataview::{DataView, Pod};
use strum::FromRepr;

use crate::{
    Clock, EthMac, NetError, NetStack,
    addr::{MAC_ADDR_LEN, MacAddr},
    buffer::Active,
    ethernet::{self, ETH_HEADER_LEN, EthType},
};

/// The single ARP cache entry.
///
/// An entry whose `mac` is unspecified is waiting for (or never got) a reply
/// for `ip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpEntry {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
}

impl ArpEntry {
    pub const INVALID: Self = Self::pending(Ipv4Addr::UNSPECIFIED);

    const fn pending(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            mac: MacAddr::UNSPECIFIED,
        }
    }

    #[must_use]
    pub fn is_resolved(self) -> bool {
        !self.mac.is_unspecified()
    }
}

#[repr(C, packed)]
#[derive(Debug, Pod)]
pub(crate) struct Arp {
    /// Hardware type
    htype: [u8; 2],
    /// Protocol type
    ptype: [u8; 2],
    /// Hardware address length
    hlen: u8,
    /// Protocol address length
    plen: u8,
    /// Operation code
    opcode: [u8; 2],
    /// Sender hardware address
    sender_haddr: [u8; MAC_ADDR_LEN],
    /// Sender protocol address
    sender_paddr: [u8; 4],
    /// Target hardware address
    target_haddr: [u8; MAC_ADDR_LEN],
    /// Target protocol address
    target_paddr: [u8; 4],
}

const ARP_LEN: usize = size_of::<Arp>();
const _: () = assert!(ARP_LEN == 28);

const HLEN: u8 = 6;
const PLEN: u8 = 4;

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
enum ArpHardware {
    Ethernet = 1,
}

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
enum ArpOp {
    Request = 1,
    Reply = 2,
}

impl Arp {
    fn htype(&self) -> Option<ArpHardware> {
        ArpHardware::from_repr(u16::from_be_bytes(self.htype))
    }

    fn set_htype(&mut self, ty: ArpHardware) {
        self.htype = (ty as u16).to_be_bytes();
    }

    fn ptype(&self) -> Option<EthType> {
        EthType::from_repr(u16::from_be_bytes(self.ptype))
    }

    fn set_ptype(&mut self, ty: EthType) {
        self.ptype = (ty as u16).to_be_bytes();
    }

    fn has_ethernet_ipv4_sizes(&self) -> bool {
        self.hlen == HLEN && self.plen == PLEN
    }

    fn set_sizes(&mut self) {
        self.hlen = HLEN;
        self.plen = PLEN;
    }

    fn opcode(&self) -> Option<ArpOp> {
        ArpOp::from_repr(u16::from_be_bytes(self.opcode))
    }

    fn set_opcode(&mut self, op: ArpOp) {
        self.opcode = (op as u16).to_be_bytes();
    }

    fn sender_haddr(&self) -> MacAddr {
        MacAddr::new(self.sender_haddr)
    }

    fn set_sender_haddr(&mut self, addr: MacAddr) {
        self.sender_haddr = addr.octets();
    }

    fn sender_paddr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.sender_paddr)
    }

    fn set_sender_paddr(&mut self, addr: Ipv4Addr) {
        self.sender_paddr = addr.octets();
    }

    fn set_target_haddr(&mut self, addr: MacAddr) {
        self.target_haddr = addr.octets();
    }

    fn target_paddr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.target_paddr)
    }

    fn set_target_paddr(&mut self, addr: Ipv4Addr) {
        self.target_paddr = addr.octets();
    }
}

impl<D, C> NetStack<'_, D, C>
where
    D: EthMac,
    C: Clock,
{
    /// Handles the received ARP frame in the active RX buffer.
    pub(crate) fn process_arp(&mut self) {
        let framing = D::FRAMING;
        let Active { slot, len } = self.buffers.rx;
        if len < framing.min_frame_len() {
            log::trace!("drop: short ARP frame ({len} bytes)");
            return;
        }

        let frame = &self.device.rx_buffer(slot)[..len];
        let body = &frame[framing.preamble_len() + ETH_HEADER_LEN..];
        let Some((arp, _padding)) = body.split_at_checked(ARP_LEN) else {
            return;
        };
        let arp = DataView::from(arp).get::<Arp>(0);
        if arp.htype() != Some(ArpHardware::Ethernet)
            || arp.ptype() != Some(EthType::Ipv4)
            || !arp.has_ethernet_ipv4_sizes()
        {
            log::trace!("drop: not an Ethernet/IPv4 ARP frame");
            return;
        }

        let sender_mac = arp.sender_haddr();
        let sender_ip = arp.sender_paddr();
        let target_ip = arp.target_paddr();
        match arp.opcode() {
            Some(ArpOp::Reply) => {
                if sender_ip == self.arp.ip {
                    log::debug!("ARP: {sender_ip} is at {sender_mac}");
                    self.arp.mac = sender_mac;
                }
            }
            Some(ArpOp::Request) => {
                if target_ip == self.ip {
                    self.send_arp(ArpOp::Reply, sender_mac, sender_mac, sender_ip);
                }
            }
            None => log::trace!("drop: unknown ARP opcode"),
        }
    }

    /// Builds an ARP frame in the active TX buffer and sends it.
    fn send_arp(
        &mut self,
        op: ArpOp,
        dhost: MacAddr,
        target_haddr: MacAddr,
        target_paddr: Ipv4Addr,
    ) {
        let framing = D::FRAMING;
        let len = framing.min_frame_len();
        let frame = self.device.tx_buffer(self.buffers.tx.slot);
        let body = ethernet::fill_header(
            &mut frame[..len],
            framing,
            dhost,
            self.mac,
            EthType::Arp,
        );

        let (arp, padding) = body.split_at_mut(ARP_LEN);
        let arp = DataView::from_mut(arp).get_mut::<Arp>(0);
        arp.set_htype(ArpHardware::Ethernet);
        arp.set_ptype(EthType::Ipv4);
        arp.set_sizes();
        arp.set_opcode(op);
        arp.set_sender_haddr(self.mac);
        arp.set_sender_paddr(self.ip);
        arp.set_target_haddr(target_haddr);
        arp.set_target_paddr(target_paddr);
        padding.fill(0);

        self.buffers.tx.len = len;
        self.send_packet();
    }

    /// Resolves the MAC address of `ip` into the ARP cache.
    ///
    /// Returns immediately if the cache already holds `ip`. Otherwise the
    /// cache is pointed at `ip` and a request is broadcast up to
    /// [`Config::arp_attempts`](crate::Config::arp_attempts) times, each time
    /// servicing received frames until a reply arrives or
    /// [`Config::arp_timeout`](crate::Config::arp_timeout) elapses.
    pub fn resolve(&mut self, ip: Ipv4Addr) -> Result<(), NetError> {
        if self.arp.ip == ip && self.arp.is_resolved() {
            return Ok(());
        }
        self.arp = ArpEntry::pending(ip);

        for attempt in 1..=self.config.arp_attempts {
            log::debug!("ARP: who has {ip}? (attempt {attempt})");
            self.send_arp(ArpOp::Request, MacAddr::BROADCAST, MacAddr::UNSPECIFIED, ip);

            let start = self.clock.now();
            loop {
                self.service();
                if self.arp.is_resolved() {
                    return Ok(());
                }
                if self.clock.now().saturating_sub(start) >= self.config.arp_timeout {
                    break;
                }
            }
        }

        log::warn!("ARP: no reply from {ip}");
        Err(NetError::ArpTimeout(ip))
    }
}
