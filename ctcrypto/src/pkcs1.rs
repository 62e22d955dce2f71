//! EME-PKCS1-v1_5 encryption padding.
//!
//! Block layout: `0x00 || 0x02 || PS || 0x00 || M`, where `PS` is at least
//! eight non-zero random bytes. Decoding is side-channel silent: every byte
//! of the block is inspected and validity accumulates in a [`Choice`].

use alloc::vec::Vec;
use rand_core::RngCore;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater, CtOption};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Framing overhead: two header bytes, eight padding bytes, the separator.
pub const PKCS1_OVERHEAD: usize = 11;

/// Builds an encryption block of `key_size` bytes around `message`.
pub fn encrypt(
    key_size: usize,
    rng: &mut impl RngCore,
    message: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if key_size < PKCS1_OVERHEAD || message.len() > key_size - PKCS1_OVERHEAD {
        log::debug!(
            "PKCS#1 message of {} bytes does not fit a {}-byte block",
            message.len(),
            key_size
        );
        return Err(Error::MessageTooLong);
    }
    let padding = key_size - message.len() - 3;
    let mut em = Zeroizing::new(alloc::vec![0u8; key_size]);
    em[1] = 2;
    rng.fill_bytes(&mut em[2..2 + padding]);
    for byte in em[2..2 + padding].iter_mut() {
        while *byte == 0 {
            let mut fresh = [0u8; 1];
            rng.fill_bytes(&mut fresh);
            *byte = fresh[0];
        }
    }
    em[key_size - message.len()..].copy_from_slice(message);
    Ok(em)
}

/// Decodes a block whose message length is known to be `message.len()`.
///
/// On success the message is copied into `message`; on failure `message` is
/// left untouched. Either way every byte of both buffers is accessed.
pub fn sec_decrypt(message: &mut [u8], padded: &[u8]) -> Choice {
    let length = message.len();
    // Public sizes only.
    if padded.len() < PKCS1_OVERHEAD || length > padded.len() - PKCS1_OVERHEAD {
        return Choice::from(0);
    }
    let separator = padded.len() - length - 1;

    let mut ok = padded[0].ct_eq(&0) & padded[1].ct_eq(&2);
    for byte in &padded[2..separator] {
        ok &= !byte.ct_eq(&0);
    }
    ok &= padded[separator].ct_eq(&0);

    for (dst, src) in message.iter_mut().zip(&padded[separator + 1..]) {
        dst.conditional_assign(src, ok);
    }
    ok
}

/// Decodes a block carrying a message of unknown length.
///
/// `valid` is the caller's verdict on the block itself (the root check) and
/// is folded into the padding verdict. The separator search and the shift
/// that moves the message to the front of the output buffer are both
/// branch-free; only the final length and the combined verdict are
/// revealed by the return value.
pub fn decrypt_variable(padded: &[u8], valid: Choice) -> Option<Vec<u8>> {
    let len = padded.len();
    if len < PKCS1_OVERHEAD {
        return None;
    }

    let mut ok = valid & padded[0].ct_eq(&0) & padded[1].ct_eq(&2);
    let mut found = Choice::from(0);
    let mut separator = 0u64;
    for (i, byte) in padded.iter().enumerate().skip(2) {
        let is_zero = byte.ct_eq(&0);
        separator.conditional_assign(&(i as u64), is_zero & !found);
        found |= is_zero;
    }
    ok &= found;
    ok &= separator.ct_gt(&(PKCS1_OVERHEAD as u64 - 2));

    // The message starts at separator + 1 >= PKCS1_OVERHEAD. Shift the
    // candidate region left by (separator + 1 - PKCS1_OVERHEAD), one power
    // of two at a time.
    let mut buf = Zeroizing::new(padded[PKCS1_OVERHEAD..].to_vec());
    let shift = (separator + 1).wrapping_sub(PKCS1_OVERHEAD as u64);
    let mut shifted = Zeroizing::new(alloc::vec![0u8; buf.len()]);
    let mut step = 1usize;
    let mut bit = 0;
    while step < buf.len() {
        let cnd = Choice::from(((shift >> bit) & 1) as u8);
        shifted.fill(0);
        shifted[..buf.len() - step].copy_from_slice(&buf[step..]);
        for (dst, src) in buf.iter_mut().zip(shifted.iter()) {
            dst.conditional_assign(src, cnd);
        }
        step <<= 1;
        bit += 1;
    }

    let message_len = len.wrapping_sub(separator as usize + 1);
    let result = CtOption::new(message_len as u64, ok);
    Option::<u64>::from(result).map(|message_len| buf[..message_len as usize].to_vec())
}
