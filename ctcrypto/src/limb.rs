//! Fixed-width multi-precision arithmetic on little-endian limb slices.
//!
//! Every routine in this module runs in time that depends only on the
//! *lengths* of its operands, never on their values. Loops iterate over limb
//! and bit positions, and data-dependent decisions go through
//! [`subtle::Choice`] masks instead of branches. The limb counts themselves
//! (the size of a modulus or of a prime factor) are treated as public.

use alloc::vec;
use alloc::vec::Vec;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroizing;

/// A single machine word of a multi-precision integer.
pub type Limb = u64;

type Wide = u128;

/// Number of bits in a [`Limb`].
pub const LIMB_BITS: usize = Limb::BITS as usize;

/// Width of the fixed window used by [`MontgomeryModulus::sec_powm`].
const WINDOW_BITS: usize = 4;
const WINDOW_SIZE: usize = 1 << WINDOW_BITS;

/// Number of limbs needed to hold `bits` bits.
pub const fn limbs_for_bits(bits: usize) -> usize {
    (bits + LIMB_BITS - 1) / LIMB_BITS
}

/// `r += a`, propagating the carry through all of `r`. Returns the carry out.
pub fn add_assign(r: &mut [Limb], a: &[Limb]) -> Limb {
    debug_assert!(a.len() <= r.len());
    let mut carry: Limb = 0;
    for (i, ri) in r.iter_mut().enumerate() {
        let ai = a.get(i).copied().unwrap_or(0);
        let s = *ri as Wide + ai as Wide + carry as Wide;
        *ri = s as Limb;
        carry = (s >> LIMB_BITS) as Limb;
    }
    carry
}

/// `r = a - b` over equal lengths. Returns the borrow out (0 or 1).
pub fn sub(r: &mut [Limb], a: &[Limb], b: &[Limb]) -> Limb {
    debug_assert!(r.len() == a.len() && a.len() == b.len());
    let mut borrow: Limb = 0;
    for i in 0..r.len() {
        let d = (a[i] as Wide)
            .wrapping_sub(b[i] as Wide)
            .wrapping_sub(borrow as Wide);
        r[i] = d as Limb;
        borrow = ((d >> LIMB_BITS) as Limb) & 1;
    }
    borrow
}

/// If `cnd` is set, `r += a`. Returns the (masked) carry out.
pub fn cnd_add_assign(cnd: Choice, r: &mut [Limb], a: &[Limb]) -> Limb {
    debug_assert_eq!(r.len(), a.len());
    let mask = Limb::conditional_select(&0, &Limb::MAX, cnd);
    let mut carry: Limb = 0;
    for i in 0..r.len() {
        let s = r[i] as Wide + (a[i] & mask) as Wide + carry as Wide;
        r[i] = s as Limb;
        carry = (s >> LIMB_BITS) as Limb;
    }
    carry
}

/// If `cnd` is set, `r -= a`. Returns the (masked) borrow out.
pub fn cnd_sub_assign(cnd: Choice, r: &mut [Limb], a: &[Limb]) -> Limb {
    debug_assert_eq!(r.len(), a.len());
    let mask = Limb::conditional_select(&0, &Limb::MAX, cnd);
    let mut borrow: Limb = 0;
    for i in 0..r.len() {
        let d = (r[i] as Wide)
            .wrapping_sub((a[i] & mask) as Wide)
            .wrapping_sub(borrow as Wide);
        r[i] = d as Limb;
        borrow = ((d >> LIMB_BITS) as Limb) & 1;
    }
    borrow
}

/// Copies `src` into `dst` when `cnd` is set, touching every limb either way.
pub fn cnd_copy(cnd: Choice, dst: &mut [Limb], src: &[Limb]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.iter_mut().zip(src) {
        d.conditional_assign(s, cnd);
    }
}

/// `a < b` for equal-length operands, as a [`Choice`].
pub fn ct_lt(a: &[Limb], b: &[Limb]) -> Choice {
    debug_assert_eq!(a.len(), b.len());
    let mut borrow: Limb = 0;
    for i in 0..a.len() {
        let d = (a[i] as Wide)
            .wrapping_sub(b[i] as Wide)
            .wrapping_sub(borrow as Wide);
        borrow = ((d >> LIMB_BITS) as Limb) & 1;
    }
    Choice::from(borrow as u8)
}

/// Equality over equal-length operands, without early exit.
pub fn ct_eq(a: &[Limb], b: &[Limb]) -> Choice {
    debug_assert_eq!(a.len(), b.len());
    a.ct_eq(b)
}

/// `true` when every limb is zero.
pub fn ct_is_zero(a: &[Limb]) -> Choice {
    let acc = a.iter().fold(0, |acc, x| acc | x);
    acc.ct_eq(&0)
}

/// Schoolbook product `r = a * b`, with `r.len() == a.len() + b.len()`.
pub fn mul(r: &mut [Limb], a: &[Limb], b: &[Limb]) {
    debug_assert_eq!(r.len(), a.len() + b.len());
    r.fill(0);
    for (i, &bi) in b.iter().enumerate() {
        let mut carry: Limb = 0;
        for (j, &aj) in a.iter().enumerate() {
            let s = r[i + j] as Wide + aj as Wide * bi as Wide + carry as Wide;
            r[i + j] = s as Limb;
            carry = (s >> LIMB_BITS) as Limb;
        }
        r[i + a.len()] = carry;
    }
}

/// `r = x mod m` by binary long division, one bit of `x` at a time.
///
/// `m` must be non-zero; `r.len() == m.len()`. The running remainder stays
/// below `m`, so a single conditional subtraction per bit suffices.
pub fn mod_reduce(r: &mut [Limb], x: &[Limb], m: &[Limb]) {
    debug_assert_eq!(r.len(), m.len());
    let mut t = Zeroizing::new(vec![0 as Limb; m.len()]);
    r.fill(0);
    for i in (0..x.len() * LIMB_BITS).rev() {
        let bit = (x[i / LIMB_BITS] >> (i % LIMB_BITS)) & 1;
        let mut top = bit;
        for limb in r.iter_mut() {
            let next = *limb >> (LIMB_BITS - 1);
            *limb = (*limb << 1) | top;
            top = next;
        }
        let borrow = sub(&mut t, r, m);
        cnd_copy(Choice::from((top | (borrow ^ 1)) as u8), r, &t);
    }
}

/// An odd modulus prepared for Montgomery multiplication.
///
/// The modulus may be secret (an RSA prime), so it lives in zeroizing
/// storage together with `R^2 mod m`.
pub struct MontgomeryModulus {
    m: Zeroizing<Vec<Limb>>,
    /// `-m^-1 mod 2^64`
    m_inv: Limb,
    r2: Zeroizing<Vec<Limb>>,
}

impl MontgomeryModulus {
    /// Prepares `m`, which must be odd and have at least one limb.
    pub fn new(m: &[Limb]) -> Self {
        assert!(!m.is_empty(), "empty modulus");
        debug_assert_eq!(m[0] & 1, 1, "Montgomery modulus must be odd");
        let n = m.len();

        // Newton iteration, doubling the number of correct low bits each round.
        let mut inv: Limb = 1;
        for _ in 0..6 {
            inv = inv.wrapping_mul(2u64.wrapping_sub(m[0].wrapping_mul(inv)));
        }

        let mut r2_wide = Zeroizing::new(vec![0 as Limb; 2 * n + 1]);
        r2_wide[2 * n] = 1;
        let mut r2 = Zeroizing::new(vec![0 as Limb; n]);
        mod_reduce(&mut r2, &r2_wide, m);

        Self {
            m: Zeroizing::new(m.to_vec()),
            m_inv: inv.wrapping_neg(),
            r2,
        }
    }

    /// Limb width of the modulus.
    pub fn limb_len(&self) -> usize {
        self.m.len()
    }

    pub fn modulus(&self) -> &[Limb] {
        &self.m
    }

    /// `out = a * b * R^-1 mod m` for `a, b < m` (CIOS).
    pub fn mont_mul(&self, out: &mut [Limb], a: &[Limb], b: &[Limb]) {
        let n = self.m.len();
        debug_assert!(out.len() == n && a.len() == n && b.len() == n);
        let m = &self.m;
        let mut t = Zeroizing::new(vec![0 as Limb; n + 2]);

        for &bi in b.iter() {
            let mut carry: Limb = 0;
            for j in 0..n {
                let s = t[j] as Wide + a[j] as Wide * bi as Wide + carry as Wide;
                t[j] = s as Limb;
                carry = (s >> LIMB_BITS) as Limb;
            }
            let s = t[n] as Wide + carry as Wide;
            t[n] = s as Limb;
            t[n + 1] = (s >> LIMB_BITS) as Limb;

            let u = t[0].wrapping_mul(self.m_inv);
            let s = t[0] as Wide + u as Wide * m[0] as Wide;
            let mut carry = (s >> LIMB_BITS) as Limb;
            for j in 1..n {
                let s = t[j] as Wide + u as Wide * m[j] as Wide + carry as Wide;
                t[j - 1] = s as Limb;
                carry = (s >> LIMB_BITS) as Limb;
            }
            let s = t[n] as Wide + carry as Wide;
            t[n - 1] = s as Limb;
            t[n] = t[n + 1] + (s >> LIMB_BITS) as Limb;
            t[n + 1] = 0;
        }

        // t < 2m here; subtract once more when t >= m.
        let borrow = sub(out, &t[..n], m);
        let keep_t = Choice::from((borrow & (t[n] ^ 1)) as u8);
        cnd_copy(keep_t, out, &t[..n]);
    }

    /// Maps `a < m` into the Montgomery domain.
    pub fn to_mont(&self, out: &mut [Limb], a: &[Limb]) {
        self.mont_mul(out, a, &self.r2);
    }

    /// Maps a Montgomery residue back to the ordinary representation.
    pub fn from_mont(&self, out: &mut [Limb], a: &[Limb]) {
        let mut one = Zeroizing::new(vec![0 as Limb; self.limb_len()]);
        one[0] = 1;
        self.mont_mul(out, a, &one);
    }

    /// `out = a * b mod m` for ordinary (non-Montgomery) `a, b < m`.
    pub fn mul_mod(&self, out: &mut [Limb], a: &[Limb], b: &[Limb]) {
        let mut am = Zeroizing::new(vec![0 as Limb; self.limb_len()]);
        self.to_mont(&mut am, a);
        self.mont_mul(out, &am, b);
    }

    /// Side-channel silent `out = base^exp mod m` for `base < m`.
    ///
    /// Exactly `exp_bits` exponent bits are processed (rounded up to the
    /// window size) whatever their values: every window performs the same
    /// squarings followed by one multiplication by a table entry, and the
    /// entry is fetched by scanning the whole table.
    pub fn sec_powm(&self, out: &mut [Limb], base: &[Limb], exp: &[Limb], exp_bits: usize) {
        let n = self.limb_len();
        debug_assert!(exp_bits <= exp.len() * LIMB_BITS);
        let mut table = Zeroizing::new(vec![0 as Limb; WINDOW_SIZE * n]);
        {
            let (first, rest) = table.split_at_mut(n);
            let mut one = vec![0 as Limb; n];
            one[0] = 1;
            self.to_mont(first, &one);
            self.to_mont(&mut rest[..n], base);
        }
        for i in 2..WINDOW_SIZE {
            let (done, todo) = table.split_at_mut(i * n);
            self.mont_mul(&mut todo[..n], &done[(i - 1) * n..], &done[n..2 * n]);
        }

        let mut acc = Zeroizing::new(table[..n].to_vec());
        let mut tmp = Zeroizing::new(vec![0 as Limb; n]);
        let mut entry = Zeroizing::new(vec![0 as Limb; n]);
        let windows = (exp_bits + WINDOW_BITS - 1) / WINDOW_BITS;

        for w in (0..windows).rev() {
            for _ in 0..WINDOW_BITS {
                self.mont_mul(&mut tmp, &acc, &acc);
                acc.copy_from_slice(&tmp);
            }
            let pos = w * WINDOW_BITS;
            let bits = (exp[pos / LIMB_BITS] >> (pos % LIMB_BITS)) & (WINDOW_SIZE as Limb - 1);
            entry.fill(0);
            for (i, candidate) in table.chunks_exact(n).enumerate() {
                cnd_copy(bits.ct_eq(&(i as Limb)), &mut entry, candidate);
            }
            self.mont_mul(&mut tmp, &acc, &entry);
            acc.copy_from_slice(&tmp);
        }

        self.from_mont(out, &acc);
    }
}
