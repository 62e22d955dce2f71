use alloc::vec::Vec;
use num::BigUint;
use rand_core::RngCore;
use subtle::{Choice, ConditionallySelectable, CtOption};
use zeroize::Zeroizing;

use crate::encoding::{limbs_from_biguint, limbs_to_be_bytes, limbs_to_biguint};
use crate::error::Result;
use crate::pkcs1;
use crate::rsa::root::{compute_root_tr, CrtKey};
use crate::rsa::{RsaPrivateKey, RsaPublicKey};
use crate::workspace::RsaWorkspace;

/// Checks on public data only: the input is below `n` and the private key
/// has the byte length of `n`. Variable time is fine here.
fn accepts(public: &RsaPublicKey, key: &RsaPrivateKey, x: &BigUint) -> bool {
    if key.size() != public.size() {
        log::debug!(
            "rejecting RSA key pair: {} byte private key for a {} byte modulus",
            key.size(),
            public.size()
        );
        return false;
    }
    if x >= public.n() {
        log::debug!("rejecting RSA input: not below the modulus");
        return false;
    }
    true
}

/// Runs the blinded root computation on `ciphertext` and leaves the
/// encoded message block in `ws.em`.
fn recover_block(
    public: &RsaPublicKey,
    key: &RsaPrivateKey,
    rng: &mut impl RngCore,
    ws: &mut RsaWorkspace,
    ciphertext: &BigUint,
) -> Choice {
    let crt = CrtKey::new(public, key, ws);
    // The root computation expects its input normalised to the limb width
    // of n, however short the ciphertext is.
    ws.x.copy_from_slice(&limbs_from_biguint(ciphertext, ws.nn));
    let ok = compute_root_tr(&crt, ws, rng);
    limbs_to_be_bytes(&mut ws.em, &ws.x);
    ok
}

/// Decryption without the range check on `ciphertext`, for side-channel
/// testing. The caller guarantees `ciphertext < n` and a private key of
/// the modulus' byte length.
pub(crate) fn rsa_sec_decrypt_unchecked(
    public: &RsaPublicKey,
    key: &RsaPrivateKey,
    rng: &mut impl RngCore,
    message: &mut [u8],
    ciphertext: &BigUint,
) -> bool {
    let mut ws = RsaWorkspace::new(public, key);
    let mut ok = recover_block(public, key, rng, &mut ws, ciphertext);
    let mut decoded = Zeroizing::new(alloc::vec![0u8; message.len()]);
    ok &= pkcs1::sec_decrypt(&mut decoded, &ws.em);
    for (dst, src) in message.iter_mut().zip(decoded.iter()) {
        dst.conditional_assign(src, ok);
    }
    bool::from(ok)
}

/// Decrypts a PKCS#1 v1.5 ciphertext whose message length is known in
/// advance, writing the message into `message`.
///
/// Returns `false` when the ciphertext is out of range, when the private key
/// is not sized for `public`, when the recomputed ciphertext does not match
/// (a computation fault), or when the padding is malformed or carries a
/// message of another length. The last two cases are indistinguishable in timing and result; `message` is left
/// untouched on any failure.
pub fn rsa_sec_decrypt(
    public: &RsaPublicKey,
    key: &RsaPrivateKey,
    rng: &mut impl RngCore,
    message: &mut [u8],
    ciphertext: &BigUint,
) -> bool {
    if !accepts(public, key, ciphertext) {
        return false;
    }
    rsa_sec_decrypt_unchecked(public, key, rng, message, ciphertext)
}

/// Decrypts a PKCS#1 v1.5 ciphertext carrying a message of any length.
///
/// The root computation and the unpadding are side-channel silent; the
/// message length is necessarily revealed by the returned vector.
pub fn rsa_decrypt_tr(
    public: &RsaPublicKey,
    key: &RsaPrivateKey,
    rng: &mut impl RngCore,
    ciphertext: &BigUint,
) -> Option<Vec<u8>> {
    if !accepts(public, key, ciphertext) {
        return None;
    }
    let mut ws = RsaWorkspace::new(public, key);
    let ok = recover_block(public, key, rng, &mut ws, ciphertext);
    pkcs1::decrypt_variable(&ws.em, ok)
}

/// Computes `x^d mod n` with blinding and a result check, for callers that
/// do their own encoding (signature generation, raw decryption).
pub fn rsa_compute_root_tr(
    public: &RsaPublicKey,
    key: &RsaPrivateKey,
    rng: &mut impl RngCore,
    x: &BigUint,
) -> Option<BigUint> {
    if !accepts(public, key, x) {
        return None;
    }
    let mut ws = RsaWorkspace::new(public, key);
    let crt = CrtKey::new(public, key, &ws);
    ws.x.copy_from_slice(&limbs_from_biguint(x, ws.nn));
    let ok = compute_root_tr(&crt, &mut ws, rng);
    Option::from(CtOption::new(limbs_to_biguint(&ws.x), ok))
}

/// PKCS#1 v1.5 encryption of `message` under `public`.
pub fn rsa_encrypt(
    public: &RsaPublicKey,
    rng: &mut impl RngCore,
    message: &[u8],
) -> Result<BigUint> {
    let em = pkcs1::encrypt(public.size(), rng, message)?;
    let m = BigUint::from_bytes_be(&em);
    Ok(m.modpow(public.e(), public.n()))
}
