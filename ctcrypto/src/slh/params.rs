use crate::error::{Error, Result};
use crate::slh::SLH_DSA_128_SIZE;

/// FORS shape: `k` trees of height `a`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForsParams {
    k: u32,
    a: u32,
}

/// Parameters of SLH-DSA-SHAKE-128s.
pub const FORS_128S: ForsParams = ForsParams { k: 14, a: 12 };

/// Parameters of SLH-DSA-SHAKE-128f.
pub const FORS_128F: ForsParams = ForsParams { k: 33, a: 6 };

impl ForsParams {
    pub fn new(k: u32, a: u32) -> Result<Self> {
        if !(1..=32).contains(&a) {
            return Err(Error::InvalidParams("tree height must be in 1..=32"));
        }
        if k == 0 {
            return Err(Error::InvalidParams("at least one tree is required"));
        }
        // Leaf indices (i << a) + chunk must fit in 32 bits.
        if (k as u64) << a > 1u64 << 32 {
            return Err(Error::InvalidParams("leaf indices overflow 32 bits"));
        }
        Ok(Self { k, a })
    }

    pub const fn k(&self) -> u32 {
        self.k
    }

    pub const fn a(&self) -> u32 {
        self.a
    }

    /// Bytes of message digest consumed, `ceil(k * a / 8)`.
    pub const fn msg_size(&self) -> usize {
        (self.k as usize * self.a as usize + 7) / 8
    }

    /// Bytes of one tree's share of a signature: the secret leaf and `a`
    /// authentication nodes.
    pub const fn block_size(&self) -> usize {
        (self.a as usize + 1) * SLH_DSA_128_SIZE
    }

    pub const fn signature_size(&self) -> usize {
        self.k as usize * self.block_size()
    }

    /// Panics unless `msg` holds `k * a` bits and `signature` is exactly one
    /// FORS signature long. Misuse is a programming error.
    pub(crate) fn assert_fits(&self, msg: &[u8], signature: &[u8]) {
        assert!(
            self.k as usize * self.a as usize <= 8 * msg.len(),
            "FORS digest of {} bytes is shorter than {} bits",
            msg.len(),
            self.k * self.a
        );
        assert_eq!(
            signature.len(),
            self.signature_size(),
            "FORS signature buffer has the wrong size"
        );
    }
}
