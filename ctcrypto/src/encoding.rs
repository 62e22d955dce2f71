use alloc::vec::Vec;
use num::BigUint;
use zeroize::Zeroize;

use crate::limb::{Limb, LIMB_BITS};

const LIMB_BYTES: usize = LIMB_BITS / 8;

/// Copies `x` into a little-endian limb vector of exactly `len` limbs.
///
/// `x` must fit; limbs above its top are zero. The intermediate digit vector
/// is wiped, since `x` may be a private key component.
pub(crate) fn limbs_from_biguint(x: &BigUint, len: usize) -> Vec<Limb> {
    let mut digits = x.to_u64_digits();
    debug_assert!(digits.len() <= len, "value does not fit in {} limbs", len);
    let mut limbs = alloc::vec![0 as Limb; len];
    for (l, d) in limbs.iter_mut().zip(digits.iter()) {
        *l = *d;
    }
    digits.zeroize();
    limbs
}

pub(crate) fn limbs_to_biguint(limbs: &[Limb]) -> BigUint {
    let mut bytes = alloc::vec![0u8; limbs.len() * LIMB_BYTES];
    limbs_to_be_bytes(&mut bytes, limbs);
    let x = BigUint::from_bytes_be(&bytes);
    bytes.zeroize();
    x
}

/// Writes `limbs` as a big-endian, zero-padded byte string filling `out`.
///
/// Bytes of `limbs` that do not fit in `out` are dropped from the top, so
/// the caller sizes `out` to the key's byte length for values below the
/// modulus. Runs in time depending only on the two lengths.
pub(crate) fn limbs_to_be_bytes(out: &mut [u8], limbs: &[Limb]) {
    let total = limbs.len() * LIMB_BYTES;
    for (i, byte) in out.iter_mut().rev().enumerate() {
        *byte = if i < total {
            (limbs[i / LIMB_BYTES] >> (8 * (i % LIMB_BYTES))) as u8
        } else {
            0
        };
    }
}

/// Reads a big-endian byte string into `limbs`, which must be wide enough.
pub(crate) fn limbs_from_be_bytes(limbs: &mut [Limb], bytes: &[u8]) {
    debug_assert!(bytes.len() <= limbs.len() * LIMB_BYTES);
    limbs.fill(0);
    for (i, byte) in bytes.iter().rev().enumerate() {
        limbs[i / LIMB_BYTES] |= (*byte as Limb) << (8 * (i % LIMB_BYTES));
    }
}

/// Splits a message digest into consecutive `a`-bit integers.
///
/// The digest is read as a big-endian bit stream, most significant bit
/// first, through a sliding byte window: bytes are pulled into the window
/// only when fewer than `a` unread bits remain. Yields chunks until the
/// digest runs out of whole chunks.
#[derive(Clone, Debug)]
pub(crate) struct BitChunks<'a> {
    bytes: core::slice::Iter<'a, u8>,
    window: u64,
    bits: u32,
    width: u32,
    mask: u64,
}

impl<'a> BitChunks<'a> {
    /// `width` must be in `1..=32`.
    pub(crate) fn new(msg: &'a [u8], width: u32) -> Self {
        assert!((1..=32).contains(&width), "chunk width {} out of range", width);
        Self {
            bytes: msg.iter(),
            window: 0,
            bits: 0,
            width,
            mask: (1u64 << width) - 1,
        }
    }
}

impl Iterator for BitChunks<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while self.bits < self.width {
            let byte = self.bytes.next()?;
            self.window = (self.window << 8) | *byte as u64;
            self.bits += 8;
        }
        self.bits -= self.width;
        Some(((self.window >> self.bits) & self.mask) as u32)
    }
}

/// This is a bit-by-bit chunk splitter used now only for testing
/// agreement with the sliding window implementation (above).
#[cfg(test)]
pub(crate) fn bit_chunks_slow(msg: &[u8], width: u32) -> Vec<u32> {
    use bit_vec::BitVec;

    let bitvector = BitVec::from_bytes(msg);
    let width = width as usize;
    let mut result = Vec::new();
    let mut index = 0;
    while index + width <= bitvector.len() {
        let mut chunk = 0u32;
        for _ in 0..width {
            chunk = (chunk << 1) | bitvector[index] as u32;
            index += 1;
        }
        result.push(chunk);
    }
    result
}
