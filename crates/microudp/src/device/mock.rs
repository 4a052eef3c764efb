//! A scripted MAC for tests.

use std::{
    collections::VecDeque,
    net::{Ipv4Addr, SocketAddrV4},
};

use super::{EthMac, FrameBuffer, Framing, Slot};
use crate::{
    MacAddr,
    checksum::ones_complement_checksum,
    crc::crc32,
    params::{CRC_LEN, FRAME_BUFFER_SIZE, MIN_FRAME_LEN, PREAMBLE},
};

/// Mock MAC; `HW` selects hardware (`true`) or software framing.
pub(crate) struct MockMac<const HW: bool> {
    rx_bufs: [FrameBuffer; 2],
    tx_bufs: [FrameBuffer; 2],
    rx_queue: VecDeque<Vec<u8>>,
    rx_current: Option<(Slot, usize)>,
    rx_next_slot: Slot,
    rx_len_override: Option<usize>,
    tx_loaded: Option<(Slot, usize)>,
    tx_busy: usize,
    arp_peer: Option<(Ipv4Addr, MacAddr)>,
    arp_ignore: usize,

    /// Every frame handed to the transmitter, as it was in the buffer.
    pub(crate) sent: Vec<Vec<u8>>,
    pub(crate) tx_slots: Vec<Slot>,
    pub(crate) tx_lengths: Vec<usize>,
    pub(crate) ready_polls: usize,
    pub(crate) acked: usize,
    pub(crate) invalidated: Vec<Slot>,
    pub(crate) events_cleared: usize,
}

impl<const HW: bool> MockMac<HW> {
    pub(crate) fn new() -> Self {
        Self {
            rx_bufs: [[0; FRAME_BUFFER_SIZE]; 2],
            tx_bufs: [[0; FRAME_BUFFER_SIZE]; 2],
            rx_queue: VecDeque::new(),
            rx_current: None,
            rx_next_slot: Slot::Zero,
            rx_len_override: None,
            tx_loaded: None,
            tx_busy: 0,
            arp_peer: None,
            arp_ignore: 0,
            sent: Vec::new(),
            tx_slots: Vec::new(),
            tx_lengths: Vec::new(),
            ready_polls: 0,
            acked: 0,
            invalidated: Vec::new(),
            events_cleared: 0,
        }
    }

    /// Answers ARP requests for `ip` with `mac`.
    pub(crate) fn with_arp_peer(mut self, ip: Ipv4Addr, mac: MacAddr) -> Self {
        self.arp_peer = Some((ip, mac));
        self
    }

    /// Leaves the first `count` requests to the ARP peer unanswered.
    pub(crate) fn ignoring_requests(mut self, count: usize) -> Self {
        self.arp_ignore = count;
        self
    }

    /// Reports the transmitter busy for the first `polls` ready checks.
    pub(crate) fn busy_for(mut self, polls: usize) -> Self {
        self.tx_busy = polls;
        self
    }

    /// Queues a link-layer packet, padded to the minimum frame size.
    pub(crate) fn inject(&mut self, packet: &[u8]) {
        let mut packet = packet.to_vec();
        if packet.len() < MIN_FRAME_LEN {
            packet.resize(MIN_FRAME_LEN, 0);
        }
        self.inject_raw(seal(Self::FRAMING, &packet));
    }

    pub(crate) fn inject_unpadded(&mut self, packet: &[u8]) {
        self.inject_raw(seal(Self::FRAMING, packet));
    }

    /// Queues a frame exactly as the DMA writer would store it.
    pub(crate) fn inject_raw(&mut self, frame: Vec<u8>) {
        self.rx_queue.push_back(frame);
    }

    /// Makes the next received frame report `len` instead of its length.
    pub(crate) fn override_rx_len(&mut self, len: usize) {
        self.rx_len_override = Some(len);
    }

    fn answer_arp(&mut self, frame: &[u8]) {
        let Some((ip, mac)) = self.arp_peer else {
            return;
        };
        let packet = unseal(Self::FRAMING, frame);
        let is_request = packet[12..14] == [0x08, 0x06] && packet[20..22] == [0x00, 0x01];
        if !is_request || packet[38..42] != ip.octets() {
            return;
        }
        if self.arp_ignore > 0 {
            self.arp_ignore -= 1;
            return;
        }
        let requester_mac = MacAddr::new(packet[22..28].try_into().unwrap());
        let requester_ip = Ipv4Addr::from(<[u8; 4]>::try_from(&packet[28..32]).unwrap());
        self.inject(&arp_packet(
            2,
            requester_mac,
            mac,
            ip,
            requester_mac,
            requester_ip,
        ));
    }
}

impl<const HW: bool> EthMac for MockMac<HW> {
    const FRAMING: Framing = if HW {
        Framing::Hardware
    } else {
        Framing::Software
    };

    fn clear_events(&mut self) {
        self.events_cleared += 1;
    }

    fn rx_pending(&mut self) -> bool {
        if self.rx_current.is_none()
            && let Some(frame) = self.rx_queue.pop_front()
        {
            let slot = self.rx_next_slot;
            let len = frame.len().min(FRAME_BUFFER_SIZE);
            self.rx_bufs[slot.index()][..len].copy_from_slice(&frame[..len]);
            let reported = self.rx_len_override.take().unwrap_or(frame.len());
            self.rx_current = Some((slot, reported));
            self.rx_next_slot = slot.toggle();
        }
        self.rx_current.is_some()
    }

    fn rx_slot(&mut self) -> Slot {
        self.rx_current.unwrap().0
    }

    fn rx_len(&mut self) -> usize {
        self.rx_current.unwrap().1
    }

    fn rx_ack(&mut self) {
        assert!(self.rx_current.take().is_some(), "ack without event");
        self.acked += 1;
    }

    fn invalidate_rx(&mut self, slot: Slot) {
        self.invalidated.push(slot);
    }

    fn rx_buffer(&self, slot: Slot) -> &FrameBuffer {
        &self.rx_bufs[slot.index()]
    }

    fn tx_buffer(&mut self, slot: Slot) -> &mut FrameBuffer {
        &mut self.tx_bufs[slot.index()]
    }

    fn tx_load(&mut self, slot: Slot, len: usize) {
        self.tx_loaded = Some((slot, len));
        self.tx_slots.push(slot);
        self.tx_lengths.push(len);
    }

    fn tx_ready(&mut self) -> bool {
        self.ready_polls += 1;
        if self.tx_busy > 0 {
            self.tx_busy -= 1;
            return false;
        }
        true
    }

    fn tx_start(&mut self) {
        let (slot, len) = self.tx_loaded.take().expect("start without load");
        let frame = self.tx_bufs[slot.index()][..len].to_vec();
        self.answer_arp(&frame);
        self.sent.push(frame);
    }
}

/// Adds the preamble and CRC trailer required by `framing`.
pub(crate) fn seal(framing: Framing, packet: &[u8]) -> Vec<u8> {
    if framing == Framing::Hardware {
        return packet.to_vec();
    }
    let mut frame = PREAMBLE.to_vec();
    frame.extend_from_slice(packet);
    frame.extend_from_slice(&crc32(packet).to_le_bytes());
    frame
}

/// Strips and checks the preamble and CRC trailer required by `framing`.
pub(crate) fn unseal(framing: Framing, frame: &[u8]) -> &[u8] {
    if framing == Framing::Hardware {
        return frame;
    }
    let (preamble, rest) = frame.split_at(PREAMBLE.len());
    assert_eq!(preamble, PREAMBLE);
    let (packet, crc) = rest.split_at(rest.len() - CRC_LEN);
    assert_eq!(crc, crc32(packet).to_le_bytes());
    packet
}

/// Builds a padded Ethernet/ARP packet.
pub(crate) fn arp_packet(
    op: u16,
    dhost: MacAddr,
    sender_mac: MacAddr,
    sender_ip: Ipv4Addr,
    target_mac: MacAddr,
    target_ip: Ipv4Addr,
) -> Vec<u8> {
    let mut packet = Vec::with_capacity(MIN_FRAME_LEN);
    packet.extend_from_slice(&dhost.octets());
    packet.extend_from_slice(&sender_mac.octets());
    packet.extend_from_slice(&[0x08, 0x06]);
    packet.extend_from_slice(&[0x00, 0x01, 0x08, 0x00, 6, 4]);
    packet.extend_from_slice(&op.to_be_bytes());
    packet.extend_from_slice(&sender_mac.octets());
    packet.extend_from_slice(&sender_ip.octets());
    packet.extend_from_slice(&target_mac.octets());
    packet.extend_from_slice(&target_ip.octets());
    packet.resize(MIN_FRAME_LEN, 0);
    packet
}

/// Builds an unpadded Ethernet/IPv4/UDP packet with valid checksums.
pub(crate) fn udp_packet(
    dhost: MacAddr,
    shost: MacAddr,
    src: SocketAddrV4,
    dst: SocketAddrV4,
    payload: &[u8],
) -> Vec<u8> {
    let udp_len = u16::try_from(8 + payload.len()).unwrap();
    let ip_len = udp_len + 20;

    let mut packet = Vec::new();
    packet.extend_from_slice(&dhost.octets());
    packet.extend_from_slice(&shost.octets());
    packet.extend_from_slice(&[0x08, 0x00]);

    let mut ip = vec![0x45, 0x00];
    ip.extend_from_slice(&ip_len.to_be_bytes());
    ip.extend_from_slice(&[0x12, 0x34, 0x40, 0x00, 64, 17, 0, 0]);
    ip.extend_from_slice(&src.ip().octets());
    ip.extend_from_slice(&dst.ip().octets());
    let sum = ones_complement_checksum(0, &ip, true);
    ip[10..12].copy_from_slice(&sum.to_be_bytes());
    packet.extend_from_slice(&ip);

    let mut udp = Vec::new();
    udp.extend_from_slice(&src.port().to_be_bytes());
    udp.extend_from_slice(&dst.port().to_be_bytes());
    udp.extend_from_slice(&udp_len.to_be_bytes());
    udp.extend_from_slice(&[0, 0]);
    udp.extend_from_slice(payload);
    let mut pseudo = Vec::new();
    pseudo.extend_from_slice(&src.ip().octets());
    pseudo.extend_from_slice(&dst.ip().octets());
    pseudo.extend_from_slice(&[0, 17]);
    pseudo.extend_from_slice(&udp_len.to_be_bytes());
    let seed = ones_complement_checksum(0, &pseudo, false);
    let sum = ones_complement_checksum(u32::from(seed), &udp, true);
    udp[6..8].copy_from_slice(&sum.to_be_bytes());
    packet.extend_from_slice(&udp);

    packet
}
