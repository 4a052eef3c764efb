use core::net::Ipv4Addr;

use dataview::{DataView, Pod, PodMethods as _};
use strum::FromRepr;

use crate::{checksum::ones_complement_checksum, udp};

#[repr(C)]
#[derive(Debug, Pod)]
pub(crate) struct Ipv4 {
    vhl: u8,
    tos: u8,
    len: [u8; 2],
    id: [u8; 2],
    off: [u8; 2],
    ttl: u8,
    protocol: u8,
    sum: [u8; 2],
    src: [u8; 4],
    dst: [u8; 4],
}

pub(crate) const IPV4_HEADER_LEN: usize = size_of::<Ipv4>();
const _: () = assert!(IPV4_HEADER_LEN == 20);

/// Version 4, five 32-bit words of header (no options).
pub(crate) const VHL_IPV4: u8 = 0x45;
pub(crate) const DONT_FRAGMENT: u16 = 0x4000;
pub(crate) const DEFAULT_TTL: u8 = 64;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
pub(crate) enum IpProtocol {
    Udp = 17,
}

impl Ipv4 {
    pub(crate) fn vhl(&self) -> u8 {
        self.vhl
    }

    pub(crate) fn set_vhl(&mut self, vhl: u8) {
        self.vhl = vhl;
    }

    pub(crate) fn set_tos(&mut self, tos: u8) {
        self.tos = tos;
    }

    pub(crate) fn len(&self) -> u16 {
        u16::from_be_bytes(self.len)
    }

    pub(crate) fn set_len(&mut self, len: u16) {
        self.len = len.to_be_bytes();
    }

    pub(crate) fn set_id(&mut self, id: u16) {
        self.id = id.to_be_bytes();
    }

    pub(crate) fn set_off(&mut self, off: u16) {
        self.off = off.to_be_bytes();
    }

    pub(crate) fn set_ttl(&mut self, ttl: u8) {
        self.ttl = ttl;
    }

    pub(crate) fn protocol(&self) -> Option<IpProtocol> {
        IpProtocol::from_repr(self.protocol)
    }

    pub(crate) fn set_protocol(&mut self, protocol: IpProtocol) {
        self.protocol = protocol as u8;
    }

    pub(crate) fn src(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.src)
    }

    pub(crate) fn set_src(&mut self, src: Ipv4Addr) {
        self.src = src.octets();
    }

    pub(crate) fn dst(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dst)
    }

    pub(crate) fn set_dst(&mut self, dst: Ipv4Addr) {
        self.dst = dst.octets();
    }

    /// Computes the header checksum and stores it.
    pub(crate) fn compute_sum(&mut self) {
        self.sum = [0; 2];
        self.sum = ones_complement_checksum(0, self.as_bytes(), true).to_be_bytes();
    }
}

/// Validates an IPv4 packet addressed to `local_ip` and passes its UDP
/// payload on.
///
/// Header checksums are not verified; integrity relies on the Ethernet CRC.
pub(crate) fn handle_receive(
    local_ip: Ipv4Addr,
    eth_body: &[u8],
    callback: Option<&mut udp::Callback<'_>>,
) {
    let Some((ipv4, ipv4_body)) = eth_body.split_at_checked(IPV4_HEADER_LEN) else {
        return;
    };
    if ipv4_body.len() < udp::UDP_HEADER_LEN {
        log::trace!("drop: short IPv4/UDP frame");
        return;
    }

    let ipv4 = DataView::from(ipv4).get::<Ipv4>(0);
    if ipv4.vhl() != VHL_IPV4 {
        log::trace!("drop: IPv4 version/length {:#04x}", ipv4.vhl());
        return;
    }
    if usize::from(ipv4.len()) < IPV4_HEADER_LEN + udp::UDP_HEADER_LEN {
        log::trace!("drop: IPv4 total length {}", ipv4.len());
        return;
    }
    if ipv4.protocol() != Some(IpProtocol::Udp) {
        log::trace!("drop: IP protocol {}", ipv4.protocol);
        return;
    }
    if ipv4.dst() != local_ip {
        log::trace!("drop: IPv4 destination {}", ipv4.dst());
        return;
    }

    udp::handle_receive(ipv4, ipv4_body, callback);
}
