//! Scratch arena for RSA private-key operations
//!
//! This module provides the per-call limb buffers used by the blinded root
//! computation. Buffers are sized from the key when the workspace is
//! created and are wiped when it is dropped, so every exit path of a
//! decryption releases them zeroized.

use alloc::vec::Vec;
use zeroize::Zeroize;

use crate::limb::{limbs_for_bits, Limb};
use crate::rsa::{RsaPrivateKey, RsaPublicKey};

/// Limb buffers for one RSA private-key operation
pub(crate) struct RsaWorkspace {
    /// Limb width of the modulus `n`
    pub(crate) nn: usize,
    /// Limb width of the prime `p`
    pub(crate) pn: usize,
    /// Limb width of the prime `q`
    pub(crate) qn: usize,
    /// Input value, later the root (`nn` limbs)
    pub(crate) x: Vec<Limb>,
    /// Blinding factor `r` (`nn` limbs)
    pub(crate) r: Vec<Limb>,
    /// Unblinding factor `r^-1 mod n` (`nn` limbs)
    pub(crate) ri: Vec<Limb>,
    /// General temporary (`nn` limbs)
    pub(crate) tmp: Vec<Limb>,
    /// Buffers for the two half-size exponentiations
    pub(crate) crt: CrtScratch,
    /// Encoded message block, `size` bytes
    pub(crate) em: Vec<u8>,
}

/// Scratch for the exponentiations modulo `p` and `q`
pub(crate) struct CrtScratch {
    /// Product space for the CRT recombination (`pn + qn` limbs)
    pub(crate) wide: Vec<Limb>,
    /// Result modulo `p` (`pn` limbs)
    pub(crate) mod_p: Vec<Limb>,
    /// Result modulo `q` (`qn` limbs)
    pub(crate) mod_q: Vec<Limb>,
}

impl RsaWorkspace {
    /// Create a workspace sized for the given key pair
    pub(crate) fn new(public: &RsaPublicKey, key: &RsaPrivateKey) -> Self {
        let nn = limbs_for_bits(public.n().bits() as usize);
        let pn = limbs_for_bits(key.p().bits() as usize);
        let qn = limbs_for_bits(key.q().bits() as usize);
        Self {
            nn,
            pn,
            qn,
            x: alloc::vec![0; nn],
            r: alloc::vec![0; nn],
            ri: alloc::vec![0; nn],
            tmp: alloc::vec![0; nn],
            crt: CrtScratch {
                wide: alloc::vec![0; pn + qn],
                mod_p: alloc::vec![0; pn],
                mod_q: alloc::vec![0; qn],
            },
            em: alloc::vec![0; public.size()],
        }
    }
}

impl Zeroize for RsaWorkspace {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.r.zeroize();
        self.ri.zeroize();
        self.tmp.zeroize();
        self.crt.wide.zeroize();
        self.crt.mod_p.zeroize();
        self.crt.mod_q.zeroize();
        self.em.zeroize();
    }
}

impl Drop for RsaWorkspace {
    fn drop(&mut self) {
        self.zeroize();
    }
}
