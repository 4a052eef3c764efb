//! LiteX SoC support for [`microudp`]: the LiteEth MAC, its PHY and the
//! `timer0` clock, driven through their memory-mapped CSRs.
//!
//! ```ignore
//! let timer = unsafe { Timer0::new(CSR_TIMER0_BASE, SYSTEM_CLOCK_FREQUENCY) };
//! let phy = unsafe { LiteEthPhy::new(CSR_ETHPHY_CRG_RESET_ADDR) };
//! phy.reset(&timer);
//!
//! let buffers = BufferMap::contiguous(ETHMAC_BASE, ETHMAC_SLOT_SIZE);
//! let mac = unsafe { LiteEthMac::<true>::new(CSR_ETHMAC_BASE, &buffers) };
//! let mut stack = NetStack::new(mac, timer, Config::default(), my_mac, my_ip);
//! ```
#![cfg_attr(not(test), no_std)]

pub use self::{
    mac::{BufferMap, LiteEthMac},
    phy::{LiteEthPhy, PhyMode},
    timer::Timer0,
};

pub mod csr;
mod mac;
pub mod phy;
mod timer;
