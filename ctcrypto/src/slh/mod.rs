//! SLH-DSA (FIPS 205) building blocks for the SHAKE-128 parameter sets:
//! addressed tree hashing, Merkle authentication paths and the FORS
//! few-time signature.
//!
//! ```
//! use ctcrypto::slh::fors::{fors_sign, fors_verify};
//! use ctcrypto::slh::hash::TreeContext;
//! use ctcrypto::slh::merkle::{MerkleContextPublic, MerkleContextSecret};
//! use ctcrypto::slh::params::FORS_128F;
//!
//! let public: MerkleContextPublic = MerkleContextPublic {
//!     tree: TreeContext::new(&[1u8; 16], 0, 0),
//!     keypair: 0,
//! };
//! let ctx = MerkleContextSecret::new(public, &[2u8; 16]);
//!
//! let digest = [0x5au8; 25];
//! let mut signature = vec![0u8; FORS_128F.signature_size()];
//! let mut fors_public = [0u8; 16];
//! fors_sign(&ctx, &FORS_128F, &digest, &mut signature, &mut fors_public);
//!
//! let mut recomputed = [0u8; 16];
//! fors_verify(&ctx.public, &FORS_128F, &digest, &signature, &mut recomputed);
//! assert_eq!(recomputed, fors_public);
//! ```

pub mod address;
pub mod fors;
pub mod hash;
pub mod merkle;
pub mod params;

/// Hash output and seed size, in bytes.
pub const SLH_DSA_128_SIZE: usize = 16;

/// One tree node.
pub type Node = [u8; SLH_DSA_128_SIZE];
