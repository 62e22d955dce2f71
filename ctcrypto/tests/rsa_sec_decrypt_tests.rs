use ctcrypto::rsa::{
    generate_keypair, rsa_compute_root_tr, rsa_decrypt_tr, rsa_encrypt, rsa_sec_decrypt,
    RsaPrivateKey, RsaPublicKey,
};
use ctcrypto::Error;
use num::BigUint;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_core::{impls, RngCore};

const N: &[u8] = b"cf8fd481fd71ffa08d0e549c22084da074a0027ca3e3902224c484e5e8c008f8\
                   59d3e6fcf8e98db792e8465a5d638cfc99a0003ad6b01d059eb87e36446dd4e3";
const D: &[u8] = b"6206545f5bb9c5f72606d990af45ea9b57d8e5b3c596c85047bb03e4acaa5cd1\
                   4b63e0a60a9302359158b4b6fc57868eb8a9285c354a7183e4b58226ab2f80f9";
const P: &[u8] = b"f235bfb76a1a771eacb22aebdd4da4c95145553eb0c792105936e709393ced5d";
const Q: &[u8] = b"db61143954cd9391c3d372d19ac9f21b6b28fdc48b4a64587b618ebce8bb673f";
const A: &[u8] = b"40a1b716ea69458019f5311edf5ee8aa0fd5c0798a12b71745b730cf75469cd";
const B: &[u8] = b"b5f3aaa672639f4582b9d9bd67389f89863395667270dd115623f01356a43859";
const C: &[u8] = b"aa1756c367be2652eadb0d2a3b1508506b7421ed09fa3e59b89be4b4e89f9b2c";
const CIPHERTEXT: &[u8] = b"3ad7d25746eaa54f4141c44d9a1d27197ec74529ee25dd46206410258f504b80\
                            bbe0b174bac9b5a08273d0478cfe0bff6b8276fed126257bfbb00476a1125bd8";
const PLAINTEXT: &[u8] = b"attack at dawn, bring snacks";

fn hex_int(digits: &[u8]) -> BigUint {
    let digits: Vec<u8> = digits.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
    BigUint::parse_bytes(&digits, 16).unwrap()
}

fn fixed_key() -> (RsaPublicKey, RsaPrivateKey) {
    let public = RsaPublicKey::new(hex_int(N), BigUint::from(0x10001u32)).unwrap();
    let private = RsaPrivateKey::new(
        hex_int(P),
        hex_int(Q),
        hex_int(D),
        hex_int(A),
        hex_int(B),
        hex_int(C),
    )
    .unwrap();
    assert!(private.matches(&public));
    (public, private)
}

/// Deterministic byte stream: each request starts at the current counter.
struct CounterRng(u8);

impl RngCore for CounterRng {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for (i, byte) in dest.iter_mut().enumerate() {
            *byte = self.0.wrapping_add(i as u8);
        }
        self.0 = self.0.wrapping_add(1);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[test]
fn test_fixed_vector_decrypts() {
    let (public, private) = fixed_key();
    let ciphertext = hex_int(CIPHERTEXT);

    // Different blinding streams, same result.
    for start in [1u8, 7, 0x40, 0x99] {
        let mut rng = CounterRng(start);
        let mut message = [0u8; 28];
        assert!(
            rsa_sec_decrypt(&public, &private, &mut rng, &mut message, &ciphertext),
            "decryption failed with counter start {}",
            start
        );
        assert_eq!(&message[..], PLAINTEXT);
    }

    let mut rng = CounterRng(3);
    assert_eq!(
        rsa_decrypt_tr(&public, &private, &mut rng, &ciphertext),
        Some(PLAINTEXT.to_vec())
    );
}

#[test]
fn test_fixed_vector_tampered() {
    let (public, private) = fixed_key();
    let ciphertext = hex_int(CIPHERTEXT);
    let mut rng = CounterRng(5);

    for bit in [0u64, 1, 100, 300, 500] {
        let mut tampered = ciphertext.clone();
        tampered.set_bit(bit, !ciphertext.bit(bit));
        assert!(&tampered < public.n());

        let mut message = [0u8; 28];
        assert!(
            !rsa_sec_decrypt(&public, &private, &mut rng, &mut message, &tampered),
            "bit {} flip accepted",
            bit
        );
        assert_eq!(message, [0u8; 28]);
    }
}

#[test]
fn test_fixed_vector_wrong_length() {
    let (public, private) = fixed_key();
    let ciphertext = hex_int(CIPHERTEXT);
    let mut rng = CounterRng(9);

    let mut short = [0u8; 27];
    assert!(!rsa_sec_decrypt(&public, &private, &mut rng, &mut short, &ciphertext));
    let mut long = [0u8; 29];
    assert!(!rsa_sec_decrypt(&public, &private, &mut rng, &mut long, &ciphertext));
}

#[test]
fn test_out_of_range_rejected() {
    let (public, private) = fixed_key();
    let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
    let mut message = [0u8; 28];
    let n = public.n().clone();
    assert!(!rsa_sec_decrypt(&public, &private, &mut rng, &mut message, &n));
    assert!(!rsa_sec_decrypt(&public, &private, &mut rng, &mut message, &(&n * 2u32)));
    assert_eq!(rsa_compute_root_tr(&public, &private, &mut rng, &n), None);
}

#[test]
fn test_generated_keys_roundtrip() {
    let mut rng = ChaCha20Rng::from_seed([2u8; 32]);
    let e = BigUint::from(65537u32);
    for bits in [128u64, 257, 512, 1024] {
        let (public, private) = generate_keypair(&mut rng, bits, &e).unwrap();
        assert_eq!(public.n().bits(), bits);
        assert!(private.matches(&public));

        let limit = public.size() - 11;
        let message: Vec<u8> = (0..limit as u8).collect();
        let ciphertext = rsa_encrypt(&public, &mut rng, &message).unwrap();
        let mut out = vec![0u8; limit];
        assert!(rsa_sec_decrypt(&public, &private, &mut rng, &mut out, &ciphertext));
        assert_eq!(out, message);

        assert_eq!(
            rsa_encrypt(&public, &mut rng, &vec![1u8; limit + 1]),
            Err(Error::MessageTooLong)
        );
    }
}

#[test]
fn test_small_exponent_key() {
    let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
    let (public, private) = generate_keypair(&mut rng, 384, &BigUint::from(3u8)).unwrap();
    let ciphertext = rsa_encrypt(&public, &mut rng, b"e = 3").unwrap();
    assert_eq!(
        rsa_decrypt_tr(&public, &private, &mut rng, &ciphertext),
        Some(b"e = 3".to_vec())
    );
}

#[test]
fn test_mismatched_key_fails() {
    let mut rng = ChaCha20Rng::from_seed([4u8; 32]);
    let e = BigUint::from(65537u32);
    let (public, _) = generate_keypair(&mut rng, 512, &e).unwrap();
    let (other_public, other_private) = generate_keypair(&mut rng, 512, &e).unwrap();
    assert!(!other_private.matches(&public));

    let ciphertext = rsa_encrypt(&other_public, &mut rng, b"for the other key").unwrap();
    let mut message = [0u8; 17];
    assert!(rsa_sec_decrypt(
        &other_public,
        &other_private,
        &mut rng,
        &mut message,
        &ciphertext
    ));
    if &ciphertext < public.n() {
        let mut wrong = [0u8; 17];
        assert!(!rsa_sec_decrypt(&public, &other_private, &mut rng, &mut wrong, &ciphertext));
    }
}

#[test]
fn test_private_key_smaller_than_modulus_fails() {
    let mut rng = ChaCha20Rng::from_seed([5u8; 32]);
    let e = BigUint::from(65537u32);
    let (public, _) = generate_keypair(&mut rng, 1024, &e).unwrap();
    let (_, small_private) = generate_keypair(&mut rng, 512, &e).unwrap();

    let ciphertext = rsa_encrypt(&public, &mut rng, b"meant for 1024 bits").unwrap();
    let mut message = [0x55u8; 19];
    assert!(!rsa_sec_decrypt(&public, &small_private, &mut rng, &mut message, &ciphertext));
    assert_eq!(message, [0x55u8; 19]);
    assert_eq!(rsa_decrypt_tr(&public, &small_private, &mut rng, &ciphertext), None);
    assert_eq!(rsa_compute_root_tr(&public, &small_private, &mut rng, &ciphertext), None);
}

#[test]
fn test_private_key_larger_than_modulus_fails() {
    let mut rng = ChaCha20Rng::from_seed([6u8; 32]);
    let e = BigUint::from(65537u32);
    let (public, _) = generate_keypair(&mut rng, 512, &e).unwrap();
    let (_, large_private) = generate_keypair(&mut rng, 640, &e).unwrap();

    let ciphertext = rsa_encrypt(&public, &mut rng, b"meant for 512 bits").unwrap();
    let mut message = [0x55u8; 18];
    assert!(!rsa_sec_decrypt(&public, &large_private, &mut rng, &mut message, &ciphertext));
    assert_eq!(message, [0x55u8; 18]);
    assert_eq!(rsa_decrypt_tr(&public, &large_private, &mut rng, &ciphertext), None);
    assert_eq!(rsa_compute_root_tr(&public, &large_private, &mut rng, &ciphertext), None);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn sec_decrypt_inverts_encrypt(seed in any::<[u8; 32]>(),
                                   message in proptest::collection::vec(any::<u8>(), 0..=53)) {
        let (public, private) = fixed_key();
        let mut rng = ChaCha20Rng::from_seed(seed);
        let ciphertext = rsa_encrypt(&public, &mut rng, &message).unwrap();

        let mut out = vec![0u8; message.len()];
        prop_assert!(rsa_sec_decrypt(&public, &private, &mut rng, &mut out, &ciphertext));
        prop_assert_eq!(&out, &message);
        prop_assert_eq!(rsa_decrypt_tr(&public, &private, &mut rng, &ciphertext), Some(message));
    }

    #[test]
    fn compute_root_is_inverse_of_public_operation(seed in any::<[u8; 32]>(),
                                                   x in proptest::collection::vec(any::<u8>(), 1..64)) {
        let (public, private) = fixed_key();
        let mut rng = ChaCha20Rng::from_seed(seed);
        let x = BigUint::from_bytes_be(&x);
        let root = rsa_compute_root_tr(&public, &private, &mut rng, &x).unwrap();
        prop_assert_eq!(root.modpow(public.e(), public.n()), x);
    }
}
