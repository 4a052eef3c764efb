use core::net::{Ipv4Addr, SocketAddrV4};

use dataview::{DataView, Pod, PodMethods as _};

use crate::{
    Clock, EthMac, NetError, NetStack,
    checksum::ones_complement_checksum,
    ethernet::{self, ETH_HEADER_LEN, EthType},
    ipv4::{DEFAULT_TTL, DONT_FRAGMENT, IPV4_HEADER_LEN, IpProtocol, Ipv4, VHL_IPV4},
    params::FRAME_BUFFER_SIZE,
};

/// A received UDP datagram, borrowed from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datagram<'a> {
    pub src: SocketAddrV4,
    pub dst_port: u16,
    pub payload: &'a [u8],
}

/// Receiver of the datagrams addressed to this host.
pub(crate) type Callback<'a> = dyn FnMut(Datagram<'_>) + 'a;

#[repr(C)]
#[derive(Debug, Pod)]
struct Udp {
    src_port: [u8; 2],
    dst_port: [u8; 2],
    len: [u8; 2],
    sum: [u8; 2],
}

pub(crate) const UDP_HEADER_LEN: usize = size_of::<Udp>();

/// Bytes covered by the UDP checksum in addition to the UDP segment.
#[repr(C)]
#[derive(Debug, Pod)]
struct PseudoHeader {
    src: [u8; 4],
    dst: [u8; 4],
    zero: u8,
    protocol: u8,
    len: [u8; 2],
}

const _: () = {
    assert!(UDP_HEADER_LEN == 8);
    assert!(size_of::<PseudoHeader>() == 12);
    assert!(FRAME_BUFFER_SIZE <= u16::MAX as usize);
};

impl Udp {
    fn src_port(&self) -> u16 {
        u16::from_be_bytes(self.src_port)
    }

    fn set_src_port(&mut self, port: u16) {
        self.src_port = port.to_be_bytes();
    }

    fn dst_port(&self) -> u16 {
        u16::from_be_bytes(self.dst_port)
    }

    fn set_dst_port(&mut self, port: u16) {
        self.dst_port = port.to_be_bytes();
    }

    fn len(&self) -> u16 {
        u16::from_be_bytes(self.len)
    }

    fn set_len(&mut self, len: u16) {
        self.len = len.to_be_bytes();
    }

    fn set_sum(&mut self, sum: u16) {
        self.sum = sum.to_be_bytes();
    }
}

impl PseudoHeader {
    fn new(src: Ipv4Addr, dst: Ipv4Addr, protocol: IpProtocol, len: u16) -> Self {
        Self {
            src: src.octets(),
            dst: dst.octets(),
            zero: 0,
            protocol: protocol as u8,
            len: len.to_be_bytes(),
        }
    }
}

/// Converts an in-buffer length to a 16-bit header field.
#[expect(clippy::cast_possible_truncation)]
fn wire_len(len: usize) -> u16 {
    debug_assert!(len <= FRAME_BUFFER_SIZE);
    len as u16
}

pub(crate) fn handle_receive(
    ipv4: &Ipv4,
    ipv4_body: &[u8],
    callback: Option<&mut Callback<'_>>,
) {
    let Some((udp, udp_body)) = ipv4_body.split_at_checked(UDP_HEADER_LEN) else {
        return;
    };
    let udp = DataView::from(udp).get::<Udp>(0);
    let Some(len) = usize::from(udp.len()).checked_sub(UDP_HEADER_LEN) else {
        log::trace!("drop: UDP length {}", udp.len());
        return;
    };
    let Some((payload, _)) = udp_body.split_at_checked(len) else {
        log::trace!("drop: UDP length {} exceeds frame", udp.len());
        return;
    };

    if let Some(callback) = callback {
        callback(Datagram {
            src: SocketAddrV4::new(ipv4.src(), udp.src_port()),
            dst_port: udp.dst_port(),
            payload,
        });
    }
}

impl<'cb, D, C> NetStack<'cb, D, C>
where
    D: EthMac,
    C: Clock,
{
    const PAYLOAD_OFFSET: usize =
        D::FRAMING.preamble_len() + ETH_HEADER_LEN + IPV4_HEADER_LEN + UDP_HEADER_LEN;

    /// Largest UDP payload that fits in a transmit buffer.
    pub const TX_PAYLOAD_CAPACITY: usize =
        FRAME_BUFFER_SIZE - Self::PAYLOAD_OFFSET - D::FRAMING.crc_len();

    /// Returns the payload area of the active transmit buffer.
    ///
    /// Write the datagram payload here, then call [`send`](Self::send) with
    /// its length.
    pub fn tx_payload(&mut self) -> &mut [u8] {
        let frame = self.device.tx_buffer(self.buffers.tx.slot);
        &mut frame[Self::PAYLOAD_OFFSET..][..Self::TX_PAYLOAD_CAPACITY]
    }

    /// Sends the first `len` bytes of [`tx_payload`](Self::tx_payload) as a
    /// UDP datagram to the address in the ARP cache.
    ///
    /// The source address is this host's; only the ports are chosen by the
    /// caller.
    pub fn send(&mut self, src_port: u16, dst_port: u16, len: usize) -> Result<(), NetError> {
        let remote = self.arp;
        if !remote.is_resolved() {
            return Err(NetError::Unresolved);
        }
        if len > Self::TX_PAYLOAD_CAPACITY {
            return Err(NetError::PayloadTooLarge {
                len,
                capacity: Self::TX_PAYLOAD_CAPACITY,
            });
        }

        let framing = D::FRAMING;
        let end = Self::PAYLOAD_OFFSET + len;
        let frame_len = usize::max(end, framing.min_frame_len());
        let ip_len = wire_len(IPV4_HEADER_LEN + UDP_HEADER_LEN + len);
        let udp_len = wire_len(UDP_HEADER_LEN + len);

        let frame = &mut self.device.tx_buffer(self.buffers.tx.slot)[..frame_len];
        frame[end..].fill(0);
        let body = ethernet::fill_header(frame, framing, remote.mac, self.mac, EthType::Ipv4);

        let (ipv4, ipv4_body) = body.split_at_mut(IPV4_HEADER_LEN);
        let ipv4 = DataView::from_mut(ipv4).get_mut::<Ipv4>(0);
        ipv4.set_vhl(VHL_IPV4);
        ipv4.set_tos(0);
        ipv4.set_len(ip_len);
        ipv4.set_id(0);
        ipv4.set_off(DONT_FRAGMENT);
        ipv4.set_ttl(DEFAULT_TTL);
        ipv4.set_protocol(IpProtocol::Udp);
        ipv4.set_src(self.ip);
        ipv4.set_dst(remote.ip);
        ipv4.compute_sum();

        let segment = &mut ipv4_body[..UDP_HEADER_LEN + len];
        let udp = DataView::from_mut(&mut *segment).get_mut::<Udp>(0);
        udp.set_src_port(src_port);
        udp.set_dst_port(dst_port);
        udp.set_len(udp_len);
        udp.set_sum(0);

        let pseudo = PseudoHeader::new(self.ip, remote.ip, IpProtocol::Udp, udp_len);
        let seed = ones_complement_checksum(0, pseudo.as_bytes(), false);
        let sum = ones_complement_checksum(u32::from(seed), segment, true);
        DataView::from_mut(segment).get_mut::<Udp>(0).set_sum(sum);

        self.buffers.tx.len = frame_len;
        self.send_packet();
        Ok(())
    }

    /// Registers the receiver of incoming datagrams, replacing any previous
    /// one.
    pub fn set_callback(&mut self, callback: &'cb mut Callback<'cb>) {
        self.callback = Some(callback);
    }

    pub fn clear_callback(&mut self) {
        self.callback = None;
    }
}
