//! Side-channel silent RSA root computation.
//!
//! The private exponentiation runs on fixed-width limbs with the CRT split,
//! under multiplicative blinding, and its result is re-encrypted and compared
//! with the input before anyone sees it. Instruction sequence and memory
//! accesses depend only on the limb widths of `n`, `p`, `q` and on the
//! public exponent.

use alloc::vec::Vec;
use rand_core::RngCore;
use subtle::Choice;
use zeroize::Zeroizing;

use crate::encoding::{limbs_from_be_bytes, limbs_from_biguint};
use crate::limb::{
    add_assign, cnd_add_assign, ct_eq, ct_is_zero, ct_lt, limbs_for_bits, mod_reduce, mul, sub,
    Limb, MontgomeryModulus, LIMB_BITS,
};
use crate::rsa::{RsaPrivateKey, RsaPublicKey};
use crate::workspace::{CrtScratch, RsaWorkspace};

/// Key material converted to limbs, with Montgomery contexts for `n`, `p`
/// and `q`. Built at the start of a private-key operation and wiped when it
/// goes out of scope.
pub(crate) struct CrtKey {
    n: MontgomeryModulus,
    p: MontgomeryModulus,
    q: MontgomeryModulus,
    e: Vec<Limb>,
    e_bits: usize,
    n_bits: usize,
    a: Zeroizing<Vec<Limb>>,
    b: Zeroizing<Vec<Limb>>,
    c: Zeroizing<Vec<Limb>>,
    p_minus_2: Zeroizing<Vec<Limb>>,
    q_minus_2: Zeroizing<Vec<Limb>>,
}

impl CrtKey {
    pub(crate) fn new(public: &RsaPublicKey, key: &RsaPrivateKey, ws: &RsaWorkspace) -> Self {
        let e_bits = public.e().bits() as usize;
        Self {
            n: MontgomeryModulus::new(&limbs_from_biguint(public.n(), ws.nn)),
            p: MontgomeryModulus::new(&Zeroizing::new(limbs_from_biguint(key.p(), ws.pn))),
            q: MontgomeryModulus::new(&Zeroizing::new(limbs_from_biguint(key.q(), ws.qn))),
            e: limbs_from_biguint(public.e(), limbs_for_bits(e_bits)),
            e_bits,
            n_bits: public.n().bits() as usize,
            a: Zeroizing::new(limbs_from_biguint(key.a(), ws.pn)),
            b: Zeroizing::new(limbs_from_biguint(key.b(), ws.qn)),
            c: Zeroizing::new(limbs_from_biguint(key.c(), ws.pn)),
            p_minus_2: Zeroizing::new(limbs_from_biguint(&(key.p() - 2u32), ws.pn)),
            q_minus_2: Zeroizing::new(limbs_from_biguint(&(key.q() - 2u32), ws.qn)),
        }
    }
}

/// `out = x^(exp_p, exp_q) mod n` through the CRT, without blinding.
///
/// `exp_p` and `exp_q` are the exponents reduced for `p` and `q`; the
/// exponentiations always scan their full limb widths. `x < n`.
fn crt_root(
    key: &CrtKey,
    scratch: &mut CrtScratch,
    out: &mut [Limb],
    x: &[Limb],
    exp_p: &[Limb],
    exp_q: &[Limb],
) {
    let pn = key.p.limb_len();
    let qn = key.q.limb_len();

    let mut reduced = Zeroizing::new(alloc::vec![0 as Limb; pn.max(qn)]);
    mod_reduce(&mut reduced[..pn], x, key.p.modulus());
    key.p
        .sec_powm(&mut scratch.mod_p, &reduced[..pn], exp_p, pn * LIMB_BITS);
    mod_reduce(&mut reduced[..qn], x, key.q.modulus());
    key.q
        .sec_powm(&mut scratch.mod_q, &reduced[..qn], exp_q, qn * LIMB_BITS);

    // h = c (m1 - m2) mod p
    mod_reduce(&mut reduced[..pn], &scratch.mod_q, key.p.modulus());
    let mut diff = Zeroizing::new(alloc::vec![0 as Limb; pn]);
    let borrow = sub(&mut diff, &scratch.mod_p, &reduced[..pn]);
    cnd_add_assign(Choice::from(borrow as u8), &mut diff, key.p.modulus());
    let mut h = Zeroizing::new(alloc::vec![0 as Limb; pn]);
    key.p.mul_mod(&mut h, &diff, &key.c);

    // m = m2 + h q < n
    mul(&mut scratch.wide, &h, key.q.modulus());
    let carry = add_assign(&mut scratch.wide, &scratch.mod_q);
    debug_assert_eq!(carry, 0);
    let nn = out.len();
    debug_assert!(scratch.wide[nn..].iter().all(|&l| l == 0));
    out.copy_from_slice(&scratch.wide[..nn]);
}

/// Draws a uniform `r` in `[1, n)` into `out`, using `bytes` (the key size)
/// as the sampling buffer.
///
/// Candidates are rejected on the public bound only; nothing about an
/// accepted `r` is revealed by the number of rounds.
fn random_nonzero_below(
    rng: &mut impl RngCore,
    out: &mut [Limb],
    n: &[Limb],
    n_bits: usize,
    bytes: &mut [u8],
) {
    let excess = bytes.len() * 8 - n_bits;
    loop {
        rng.fill_bytes(bytes);
        bytes[0] &= 0xff >> excess;
        limbs_from_be_bytes(out, bytes);
        if bool::from(ct_lt(out, n) & !ct_is_zero(out)) {
            return;
        }
    }
}

/// Picks a blinding factor. On return `ws.r = r^e mod n` and
/// `ws.ri = r^-1 mod n`.
///
/// The inverse is computed with Fermat's little theorem on each prime, so it
/// runs on the same constant-time exponentiation as the root itself. An `r`
/// sharing a prime with `n` (or a fault in the CRT parameters) yields a wrong
/// inverse, which the final result check rejects like any other fault.
fn blind(key: &CrtKey, ws: &mut RsaWorkspace, rng: &mut impl RngCore) {
    random_nonzero_below(rng, &mut ws.r, key.n.modulus(), key.n_bits, &mut ws.em);
    crt_root(
        key,
        &mut ws.crt,
        &mut ws.ri,
        &ws.r,
        &key.p_minus_2,
        &key.q_minus_2,
    );
    key.n.sec_powm(&mut ws.tmp, &ws.r, &key.e, key.e_bits);
    ws.r.copy_from_slice(&ws.tmp);
}

/// Re-encrypts `m` and compares with `c`: `m^e mod n == c`.
///
/// The comparison covers every limb; the result is only returned.
pub(crate) fn check_root(key: &CrtKey, tmp: &mut [Limb], m: &[Limb], c: &[Limb]) -> Choice {
    key.n.sec_powm(tmp, m, &key.e, key.e_bits);
    ct_eq(tmp, c)
}

/// Computes the RSA root of `ws.x` in place, with blinding and a result
/// check.
///
/// `ws.x` must hold a value below `n`, normalised to the limb width of `n`,
/// and `p q` must have the byte length of `n`.
/// The returned [`Choice`] is set when the recomputed ciphertext matches the
/// input; otherwise `ws.x` holds garbage and must not be released.
pub(crate) fn compute_root_tr(
    key: &CrtKey,
    ws: &mut RsaWorkspace,
    rng: &mut impl RngCore,
) -> Choice {
    let c = Zeroizing::new(ws.x.clone());
    blind(key, ws, rng);

    key.n.mul_mod(&mut ws.tmp, &c, &ws.r);
    crt_root(key, &mut ws.crt, &mut ws.x, &ws.tmp, &key.a, &key.b);
    key.n.mul_mod(&mut ws.tmp, &ws.x, &ws.ri);
    ws.x.copy_from_slice(&ws.tmp);

    check_root(key, &mut ws.tmp, &ws.x, &c)
}
