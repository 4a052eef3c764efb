use core::net::Ipv4Addr;

use crate::{
    Clock, Config, EthMac, MacAddr,
    arp::ArpEntry,
    buffer::{Active, BufferSet},
    ethernet::{self, ETH_HEADER_LEN, EthType},
    ipv4,
    udp::Callback,
};

/// The network stack of one host.
///
/// Owns the MAC device, the clock, the host addresses, the ARP cache and
/// the receive callback. Everything runs on the caller's stack: nothing
/// happens between calls.
pub struct NetStack<'cb, D, C> {
    pub(crate) device: D,
    pub(crate) clock: C,
    pub(crate) config: Config,
    pub(crate) mac: MacAddr,
    pub(crate) ip: Ipv4Addr,
    pub(crate) arp: ArpEntry,
    pub(crate) buffers: BufferSet,
    pub(crate) callback: Option<&'cb mut Callback<'cb>>,
}

impl<'cb, D, C> NetStack<'cb, D, C>
where
    D: EthMac,
    C: Clock,
{
    /// Creates a stack and [`start`](Self::start)s it with the given host
    /// addresses.
    pub fn new(device: D, clock: C, config: Config, mac: MacAddr, ip: Ipv4Addr) -> Self {
        let mut stack = Self {
            device,
            clock,
            config,
            mac,
            ip,
            arp: ArpEntry::INVALID,
            buffers: BufferSet::default(),
            callback: None,
        };
        stack.start(mac, ip);
        stack
    }

    /// Resets the stack.
    ///
    /// Pending device events are cleared, both directions go back to slot
    /// 0, the ARP cache is invalidated and the receive callback is removed.
    pub fn start(&mut self, mac: MacAddr, ip: Ipv4Addr) {
        self.device.clear_events();
        self.buffers.reset();
        self.mac = mac;
        self.ip = ip;
        self.arp = ArpEntry::INVALID;
        self.callback = None;
        log::debug!("started as {ip} ({mac})");
    }

    /// Handles at most one received frame.
    ///
    /// Must be called regularly; received frames are not processed
    /// otherwise.
    pub fn service(&mut self) {
        if !self.device.rx_pending() {
            return;
        }
        let slot = self.device.rx_slot();
        let len = self.device.rx_len();
        self.buffers.set_rx(slot, len);
        self.device.invalidate_rx(slot);
        self.process_frame();
        self.device.rx_ack();
    }

    /// Validates the frame in the active RX buffer and dispatches it by
    /// EtherType.
    fn process_frame(&mut self) {
        let framing = D::FRAMING;
        let Active { slot, len } = self.buffers.rx;
        let Some(frame) = self.device.rx_buffer(slot).get(..len) else {
            log::trace!("drop: length {len} exceeds the buffer");
            return;
        };
        log::trace!("rx slot={slot:?} len={len}");

        let Some((eth, _)) = ethernet::parse(frame, framing) else {
            return;
        };
        let ty = eth.ty();
        log::trace!("rx {} -> {} {ty:?}", eth.shost(), eth.dhost());
        let Some(len) = ethernet::strip_crc(frame, framing) else {
            return;
        };
        if len < framing.preamble_len() + ETH_HEADER_LEN {
            return;
        }
        self.buffers.rx.len = len;

        match ty {
            Some(EthType::Arp) => self.process_arp(),
            Some(EthType::Ipv4) => self.process_ip(),
            None => log::trace!("drop: unknown EtherType"),
        }
    }

    fn process_ip(&mut self) {
        let Active { slot, len } = self.buffers.rx;
        let frame = &self.device.rx_buffer(slot)[..len];
        let eth_body = &frame[D::FRAMING.preamble_len() + ETH_HEADER_LEN..];
        ipv4::handle_receive(self.ip, eth_body, self.callback.as_deref_mut());
    }

    /// Hands the active TX buffer to the MAC and moves on to the other one.
    ///
    /// Blocks until the MAC accepts the frame, not until it is on the wire.
    pub(crate) fn send_packet(&mut self) {
        let Active { slot, len } = self.buffers.tx;
        let len = ethernet::append_crc(self.device.tx_buffer(slot), len, D::FRAMING);
        self.buffers.tx.len = len;
        log::trace!("tx slot={slot:?} len={len}");

        self.device.tx_load(slot, len);
        while !self.device.tx_ready() {
            core::hint::spin_loop();
        }
        self.device.tx_start();
        self.buffers.flip_tx();
    }

    #[must_use]
    pub fn mac(&self) -> MacAddr {
        self.mac
    }

    #[must_use]
    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    #[must_use]
    pub fn arp_entry(&self) -> ArpEntry {
        self.arp
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}
