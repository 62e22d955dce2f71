//! Unofficial no-std rust implementation of two side-channel sensitive
//! public-key primitives:
//!
//!  - RSA decryption with [blinding], CRT root computation and a result
//!    check, written so that timing and memory access do not depend on the
//!    private key or on the validity of the [PKCS#1 v1.5] padding;
//!  - the FORS few-time signature of [SLH-DSA] (FIPS 205), together with the
//!    addressed SHAKE256 tree hash and Merkle authentication paths it is
//!    built from.
//!
//! [blinding]: https://en.wikipedia.org/wiki/Blinding_(cryptography)
//! [PKCS#1 v1.5]: https://www.rfc-editor.org/rfc/rfc8017#section-7.2
//! [SLH-DSA]: https://csrc.nist.gov/pubs/fips/205/final
//!
//! # Usage (no-std with custom RNG)
//!
//! The crate only needs `alloc`. You must provide your own RNG
//! implementation via `rand_core::RngCore`; it is used for blinding factors,
//! padding and key generation.
//!
//! ```ignore
//! use ctcrypto::rsa;
//!
//! let mut rng = your_device_rng();
//! let (public, private) = rsa::generate_keypair(&mut rng, 2048, &65537u32.into())?;
//!
//! let ciphertext = rsa::rsa_encrypt(&public, &mut rng, b"48 byte premaster secret ...")?;
//! let mut premaster = [0u8; 48];
//! if !rsa::rsa_sec_decrypt(&public, &private, &mut rng, &mut premaster, &ciphertext) {
//!     // Continue with a random premaster; do not report why.
//! }
//! ```
//!
//! Decryption reports a single `bool`: a ciphertext out of range, a fault
//! during the private-key computation and malformed padding all look the
//! same to the caller.
//!
//! For FORS, see [`slh`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub(crate) mod encoding;
pub mod error;
pub mod limb; // pub for side-channel measurement harnesses
pub mod pkcs1;
pub mod rsa;
pub mod slh;
pub(crate) mod workspace;

pub use error::{Error, Result};
