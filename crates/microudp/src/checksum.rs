//! Internet (ones' complement) checksum used by the IPv4 and UDP headers.

/// Accumulates `bytes` as big-endian 16-bit words onto `seed`.
///
/// The running sum is folded until it fits in 16 bits. An odd trailing byte
/// is summed as if followed by a zero pad byte; the pad never has to exist in
/// the buffer.
///
/// When `finalize` is set the ones' complement of the sum is returned, with
/// `0` replaced by `0xffff` because a zero UDP checksum means "no checksum".
/// Otherwise the folded partial sum is returned so that it can seed the next
/// call.
#[must_use]
pub fn ones_complement_checksum(seed: u32, bytes: &[u8], finalize: bool) -> u16 {
    let mut sum = bytes
        .chunks(2)
        .map(|chunk| match chunk {
            [a, b] => u16::from_be_bytes([*a, *b]),
            [a] => u16::from_be_bytes([*a, 0]),
            _ => unreachable!(),
        })
        .fold(u64::from(seed), |sum, word| sum + u64::from(word));

    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }

    #[expect(clippy::cast_possible_truncation)]
    let sum = sum as u16;
    if !finalize {
        return sum;
    }
    match !sum {
        0 => 0xffff,
        n => n,
    }
}
