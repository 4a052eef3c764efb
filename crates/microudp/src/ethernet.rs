use dataview::{DataView, Pod};
use strum::FromRepr;

use crate::{
    addr::{MAC_ADDR_LEN, MacAddr},
    crc::crc32,
    device::{FrameBuffer, Framing},
    params::{CRC_LEN, PREAMBLE, PREAMBLE_LEN},
};

#[repr(C, packed)]
#[derive(Debug, Pod)]
pub(crate) struct Eth {
    dhost: [u8; MAC_ADDR_LEN],
    shost: [u8; MAC_ADDR_LEN],
    ty: [u8; 2],
}

pub(crate) const ETH_HEADER_LEN: usize = size_of::<Eth>();

const _: () = {
    assert!(ETH_HEADER_LEN == 14);
    assert!(align_of::<Eth>() == 1);
};

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
pub(crate) enum EthType {
    Ipv4 = 0x0800,
    Arp = 0x0806,
}

impl Eth {
    pub(crate) fn dhost(&self) -> MacAddr {
        MacAddr::new(self.dhost)
    }

    pub(crate) fn set_dhost(&mut self, addr: MacAddr) {
        self.dhost = addr.octets();
    }

    pub(crate) fn shost(&self) -> MacAddr {
        MacAddr::new(self.shost)
    }

    pub(crate) fn set_shost(&mut self, addr: MacAddr) {
        self.shost = addr.octets();
    }

    pub(crate) fn ty(&self) -> Option<EthType> {
        EthType::from_repr(u16::from_be_bytes(self.ty))
    }

    pub(crate) fn set_ty(&mut self, ty: EthType) {
        self.ty = (ty as u16).to_be_bytes();
    }
}

/// Writes the link-layer header at the start of `frame` and returns the
/// bytes following it.
///
/// With software framing the preamble is written first.
pub(crate) fn fill_header(
    frame: &mut [u8],
    framing: Framing,
    dhost: MacAddr,
    shost: MacAddr,
    ty: EthType,
) -> &mut [u8] {
    let (preamble, rest) = frame.split_at_mut(framing.preamble_len());
    preamble.copy_from_slice(&PREAMBLE[..framing.preamble_len()]);

    let (eth, body) = rest.split_at_mut(ETH_HEADER_LEN);
    let eth = DataView::from_mut(eth).get_mut::<Eth>(0);
    eth.set_dhost(dhost);
    eth.set_shost(shost);
    eth.set_ty(ty);
    body
}

/// Splits a received frame into its Ethernet header and the bytes that
/// follow it.
///
/// Returns `None` if the preamble is wrong or the frame is too short.
pub(crate) fn parse(frame: &[u8], framing: Framing) -> Option<(&Eth, &[u8])> {
    let (preamble, rest) = frame.split_at_checked(framing.preamble_len())?;
    if preamble != &PREAMBLE[..framing.preamble_len()] {
        log::trace!("drop: bad preamble {preamble:02x?}");
        return None;
    }
    let (eth, body) = rest.split_at_checked(ETH_HEADER_LEN)?;
    Some((DataView::from(eth).get::<Eth>(0), body))
}

/// Checks the CRC trailer of a received frame and returns the frame length
/// without it.
///
/// The CRC covers everything after the preamble. With hardware framing the
/// MAC has already done this and the length is returned unchanged.
pub(crate) fn strip_crc(frame: &[u8], framing: Framing) -> Option<usize> {
    if framing == Framing::Hardware {
        return Some(frame.len());
    }
    let (data, trailer) = frame.split_at_checked(frame.len().checked_sub(CRC_LEN)?)?;
    let covered = data.get(PREAMBLE_LEN..)?;
    let received = u32::from_le_bytes(trailer.try_into().ok()?);
    let computed = crc32(covered);
    if received != computed {
        log::trace!("drop: CRC {received:#010x}, expected {computed:#010x}");
        return None;
    }
    Some(data.len())
}

/// Appends the CRC trailer to the first `len` bytes of `frame` when the
/// framing requires it, and returns the new length.
pub(crate) fn append_crc(frame: &mut FrameBuffer, len: usize, framing: Framing) -> usize {
    if framing == Framing::Hardware {
        return len;
    }
    let crc = crc32(&frame[PREAMBLE_LEN..len]);
    frame[len..len + CRC_LEN].copy_from_slice(&crc.to_le_bytes());
    len + CRC_LEN
}
