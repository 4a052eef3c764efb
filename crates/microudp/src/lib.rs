//! A minimal polled Ethernet/ARP/IPv4/UDP stack for bare-metal SoCs.
//!
//! The stack drives a MAC that exposes two receive and two transmit frame
//! buffers in a ping-pong arrangement. There are no interrupts: the
//! embedding firmware calls [`NetStack::service`] often enough for received
//! frames to be handled, and [`NetStack::resolve`] polls it internally while
//! waiting for an ARP reply.
//!
//! ```ignore
//! let mut stack = NetStack::new(mac_device, clock, Config::default(), my_mac, my_ip);
//! stack.resolve(peer_ip)?;
//! let payload = stack.tx_payload();
//! payload[..5].copy_from_slice(b"hello");
//! stack.send(6000, 6000, 5)?;
//! ```
#![cfg_attr(not(test), no_std)]

pub use self::{
    addr::MacAddr,
    arp::ArpEntry,
    device::{Clock, EthMac, FrameBuffer, Framing, PollClock, Slot},
    error::NetError,
    params::Config,
    stack::NetStack,
    udp::Datagram,
};

mod addr;
mod arp;
mod buffer;
pub mod checksum;
pub mod crc;
pub mod device;
mod error;
mod ethernet;
mod ipv4;
pub mod params;
mod stack;
mod udp;
