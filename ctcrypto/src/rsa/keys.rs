use core::fmt;

use num::{BigInt, BigUint, Integer, One, Zero};
use rand_core::RngCore;

use crate::error::{Error, Result};

/// Smallest supported modulus. PKCS#1 v1.5 needs 11 bytes of framing around
/// a non-empty message.
pub const RSA_MINIMUM_N_BITS: u64 = 89;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPublicKey {
    n: BigUint,
    e: BigUint,
    size: usize,
}

impl RsaPublicKey {
    /// Validates and prepares a public key.
    ///
    /// `n` must be odd and at least [`RSA_MINIMUM_N_BITS`] long; `e` must be
    /// odd and greater than one.
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        let size = check_size(&n)?;
        if e <= BigUint::one() || e.is_even() {
            log::warn!("rejecting RSA public exponent: not an odd value above 1");
            return Err(Error::InvalidKey("public exponent must be odd and > 1"));
        }
        if e >= n {
            return Err(Error::InvalidKey("public exponent must be below the modulus"));
        }
        Ok(Self { n, e, size })
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn e(&self) -> &BigUint {
        &self.e
    }

    /// Byte length of the modulus.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// RSA private key in CRT form.
///
/// `a = d mod (p-1)`, `b = d mod (q-1)` and `c = q^-1 mod p`. The key is
/// only ever borrowed by the decryption routines.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    p: BigUint,
    q: BigUint,
    d: BigUint,
    a: BigUint,
    b: BigUint,
    c: BigUint,
    size: usize,
}

impl RsaPrivateKey {
    /// Validates CRT components supplied by the caller.
    pub fn new(
        p: BigUint,
        q: BigUint,
        d: BigUint,
        a: BigUint,
        b: BigUint,
        c: BigUint,
    ) -> Result<Self> {
        let three = BigUint::from(3u8);
        if p < three || q < three || p.is_even() || q.is_even() {
            log::warn!("rejecting RSA private key: prime factors must be odd and > 1");
            return Err(Error::InvalidKey("prime factors must be odd and > 1"));
        }
        if a >= p || b >= q || c >= p {
            return Err(Error::InvalidKey("CRT components not reduced"));
        }
        if (&c * &q) % &p != BigUint::one() {
            log::warn!("rejecting RSA private key: CRT coefficient is not q^-1 mod p");
            return Err(Error::InvalidKey("CRT coefficient is not q^-1 mod p"));
        }
        let size = check_size(&(&p * &q))?;
        Ok(Self {
            p,
            q,
            d,
            a,
            b,
            c,
            size,
        })
    }

    /// Derives the full CRT key from the two primes and the public exponent.
    pub fn from_primes(p: BigUint, q: BigUint, e: &BigUint) -> Result<Self> {
        let one = BigUint::one();
        if p <= one || q <= one || p == q {
            return Err(Error::InvalidKey("primes must be distinct and > 1"));
        }
        let p1 = &p - &one;
        let q1 = &q - &one;
        let phi = &p1 * &q1;
        let d = mod_inverse(e, &phi).ok_or(Error::InvalidKey("e not invertible mod phi(n)"))?;
        let a = &d % &p1;
        let b = &d % &q1;
        let c = mod_inverse(&q, &p).ok_or(Error::InvalidKey("q not invertible mod p"))?;
        Self::new(p, q, d, a, b, c)
    }

    /// `true` when this key's primes multiply to the public modulus.
    pub fn matches(&self, public: &RsaPublicKey) -> bool {
        &self.p * &self.q == public.n && self.size == public.size
    }

    /// Byte length of `p * q`.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    pub fn d(&self) -> &BigUint {
        &self.d
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    pub fn c(&self) -> &BigUint {
        &self.c
    }

    #[cfg(test)]
    pub(crate) fn with_corrupted_c(&self) -> Self {
        let mut key = self.clone();
        key.c = (&key.c + 1u32) % &key.p;
        key
    }
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Byte size of a usable modulus.
fn check_size(n: &BigUint) -> Result<usize> {
    if n.is_even() {
        log::warn!("rejecting RSA modulus: even");
        return Err(Error::InvalidKey("modulus must be odd"));
    }
    if n.bits() < RSA_MINIMUM_N_BITS {
        log::warn!("rejecting RSA modulus: {} bits is too small", n.bits());
        return Err(Error::InvalidKey("modulus too small"));
    }
    Ok(((n.bits() + 7) / 8) as usize)
}

fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let m_int = BigInt::from(m.clone());
    let (mut r0, mut r1) = (m_int.clone(), BigInt::from(a % m));
    let (mut t0, mut t1) = (BigInt::zero(), BigInt::one());
    while !r1.is_zero() {
        let q = &r0 / &r1;
        (r0, r1) = (r1.clone(), &r0 - &q * &r1);
        (t0, t1) = (t1.clone(), &t0 - &q * &t1);
    }
    if !r0.is_one() {
        return None;
    }
    t0.mod_floor(&m_int).to_biguint()
}

const SMALL_PRIMES: [u32; 24] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

const MILLER_RABIN_ROUNDS: usize = 25;

/// Upper bound on prime candidates tried per factor.
const MAX_PRIME_CANDIDATES: usize = 100_000;

fn random_bits(rng: &mut impl RngCore, bits: u64) -> BigUint {
    let len = ((bits + 7) / 8) as usize;
    let mut bytes = alloc::vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    let excess = len as u64 * 8 - bits;
    bytes[0] &= 0xff >> excess;
    BigUint::from_bytes_be(&bytes)
}

fn random_below(rng: &mut impl RngCore, bound: &BigUint) -> BigUint {
    loop {
        let x = random_bits(rng, bound.bits());
        if &x < bound {
            return x;
        }
    }
}

fn is_probable_prime(rng: &mut impl RngCore, n: &BigUint) -> bool {
    for sp in SMALL_PRIMES {
        if (n % sp).is_zero() {
            return *n == BigUint::from(sp);
        }
    }
    let one = BigUint::one();
    let n1 = n - &one;
    let s = n1.trailing_zeros().unwrap_or(0);
    let d = &n1 >> s;
    let span = n - 3u32;
    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let base = random_below(rng, &span) + 2u32;
        let mut x = base.modpow(&d, n);
        if x == one || x == n1 {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&BigUint::from(2u8), n);
            if x == n1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// A random prime of exactly `bits` bits with the two top bits set, such
/// that `p - 1` is coprime to `e`.
fn random_prime(rng: &mut impl RngCore, bits: u64, e: &BigUint) -> Result<BigUint> {
    let top = BigUint::from(3u8) << (bits - 2);
    for attempt in 0..MAX_PRIME_CANDIDATES {
        let candidate = random_bits(rng, bits) | &top | BigUint::one();
        if !is_probable_prime(rng, &candidate) {
            continue;
        }
        if !(&candidate - 1u32).gcd(e).is_one() {
            log::trace!("prime candidate {} rejected: p-1 shares a factor with e", attempt);
            continue;
        }
        return Ok(candidate);
    }
    Err(Error::KeyGeneration)
}

/// Generates a key pair with a modulus of exactly `n_bits` bits.
pub fn generate_keypair(
    rng: &mut impl RngCore,
    n_bits: u64,
    e: &BigUint,
) -> Result<(RsaPublicKey, RsaPrivateKey)> {
    if n_bits < RSA_MINIMUM_N_BITS {
        return Err(Error::InvalidKey("modulus too small"));
    }
    if e <= &BigUint::one() || e.is_even() {
        return Err(Error::InvalidKey("public exponent must be odd and > 1"));
    }
    let p_bits = (n_bits + 1) / 2;
    let q_bits = n_bits - p_bits;
    loop {
        let p = random_prime(rng, p_bits, e)?;
        let q = random_prime(rng, q_bits, e)?;
        if p == q {
            continue;
        }
        let n = &p * &q;
        debug_assert_eq!(n.bits(), n_bits);
        let public = RsaPublicKey::new(n, e.clone())?;
        let private = RsaPrivateKey::from_primes(p, q, e)?;
        log::debug!("generated {}-bit RSA key", n_bits);
        return Ok((public, private));
    }
}
