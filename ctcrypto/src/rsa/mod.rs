//! RSA with side-channel resistant private-key operations.
//!
//! Decryption blinds the input with a fresh random factor, computes the root
//! through the CRT on fixed-width limbs, removes the blinding and checks the
//! result by re-encrypting it. Everything after the public range check ends
//! in one undifferentiated success flag.
//!
//! ```
//! use ctcrypto::rsa::{generate_keypair, rsa_encrypt, rsa_sec_decrypt};
//! use num::BigUint;
//! use rand_chacha::ChaCha20Rng;
//! use rand_core::SeedableRng;
//!
//! let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
//! let (public, private) = generate_keypair(&mut rng, 512, &BigUint::from(65537u32)).unwrap();
//!
//! let ciphertext = rsa_encrypt(&public, &mut rng, b"premaster").unwrap();
//! let mut message = [0u8; 9];
//! assert!(rsa_sec_decrypt(&public, &private, &mut rng, &mut message, &ciphertext));
//! assert_eq!(&message, b"premaster");
//! ```

mod decrypt;
mod keys;
pub(crate) mod root;

#[cfg(test)]
use decrypt::rsa_sec_decrypt_unchecked;
pub use decrypt::{rsa_compute_root_tr, rsa_decrypt_tr, rsa_encrypt, rsa_sec_decrypt};
pub use keys::{generate_keypair, RsaPrivateKey, RsaPublicKey, RSA_MINIMUM_N_BITS};
