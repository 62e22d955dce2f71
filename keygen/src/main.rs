//! Test fixture generation tool
//!
//! Generates an RSA key pair and a FORS public key deterministically from a
//! ChaCha20 seed and prints them as Rust const arrays, ready to paste into
//! test files or firmware.
//!
//! Usage:
//!   cargo run --release -p ctcrypto-keygen -- --bits 2048
//!   cargo run --release -p ctcrypto-keygen -- --seed <64 hex digits> --exponent 3

use anyhow::{bail, Context, Result};
use clap::Parser;
use ctcrypto::rsa::{generate_keypair, rsa_encrypt, rsa_sec_decrypt, RSA_MINIMUM_N_BITS};
use ctcrypto::slh::fors::fors_sign;
use ctcrypto::slh::hash::TreeContext;
use ctcrypto::slh::merkle::{MerkleContextPublic, MerkleContextSecret};
use ctcrypto::slh::params::FORS_128F;
use ctcrypto::slh::SLH_DSA_128_SIZE;
use itertools::Itertools;
use num::BigUint;
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Deterministic key and test vector generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RSA modulus size in bits
    #[arg(short, long, default_value = "2048")]
    bits: u64,

    /// ChaCha20 seed as 64 hex digits (default: 0x42 repeated)
    #[arg(short, long)]
    seed: Option<String>,

    /// RSA public exponent
    #[arg(short, long, default_value = "65537")]
    exponent: u64,
}

fn parse_seed(seed: Option<&str>) -> Result<[u8; 32]> {
    let mut out = [0x42u8; 32];
    if let Some(seed) = seed {
        hex::decode_to_slice(seed.trim(), &mut out).context("seed must be 64 hex digits")?;
    }
    Ok(out)
}

fn print_const(name: &str, bytes: &[u8]) {
    println!("const {}: [u8; {}] = [", name, bytes.len());
    for row in bytes.chunks(16) {
        println!("    {},", row.iter().map(|b| format!("0x{:02X}", b)).join(", "));
    }
    println!("];\n");
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.bits < RSA_MINIMUM_N_BITS {
        bail!("modulus must be at least {} bits", RSA_MINIMUM_N_BITS);
    }

    // IMPORTANT: fixtures only. Real keys need an OS or hardware RNG.
    let mut rng = ChaCha20Rng::from_seed(parse_seed(args.seed.as_deref())?);

    println!("=== ctcrypto fixture generator ===\n");
    println!("Generating {}-bit RSA key pair...", args.bits);
    let e = BigUint::from(args.exponent);
    let (public, private) =
        generate_keypair(&mut rng, args.bits, &e).context("RSA key generation failed")?;

    // Sanity check before printing anything secret.
    let probe = &b"fixture self-test"[..17.min(public.size() - 11)];
    let ciphertext = rsa_encrypt(&public, &mut rng, probe)?;
    let mut decrypted = vec![0u8; probe.len()];
    if !rsa_sec_decrypt(&public, &private, &mut rng, &mut decrypted, &ciphertext) {
        bail!("generated key failed its decryption self-test");
    }
    println!("Key generation complete ({} byte modulus).\n", public.size());

    println!("// RSA public key");
    print_const("RSA_N", &public.n().to_bytes_be());
    print_const("RSA_E", &public.e().to_bytes_be());
    println!("// RSA private key (CRT form). Keep out of public repositories.");
    print_const("RSA_D", &private.d().to_bytes_be());
    print_const("RSA_P", &private.p().to_bytes_be());
    print_const("RSA_Q", &private.q().to_bytes_be());
    print_const("RSA_A", &private.a().to_bytes_be());
    print_const("RSA_B", &private.b().to_bytes_be());
    print_const("RSA_C", &private.c().to_bytes_be());

    println!("Generating FORS key (SLH-DSA-SHAKE-128f)...\n");
    let mut public_seed = [0u8; SLH_DSA_128_SIZE];
    let mut secret_seed = [0u8; SLH_DSA_128_SIZE];
    rng.fill_bytes(&mut public_seed);
    rng.fill_bytes(&mut secret_seed);
    let ctx: MerkleContextSecret = MerkleContextSecret::new(
        MerkleContextPublic {
            tree: TreeContext::new(&public_seed, 0, 0),
            keypair: 0,
        },
        &secret_seed,
    );

    // The FORS public key does not depend on the digest signed.
    let digest = vec![0u8; FORS_128F.msg_size()];
    let mut signature = vec![0u8; FORS_128F.signature_size()];
    let mut fors_public = [0u8; SLH_DSA_128_SIZE];
    fors_sign(&ctx, &FORS_128F, &digest, &mut signature, &mut fors_public);

    print_const("FORS_PUBLIC_SEED", &public_seed);
    print_const("FORS_SECRET_SEED", &secret_seed);
    print_const("FORS_PUBLIC", &fors_public);

    println!("Security Notes:");
    println!("- Keys derived from a known seed are public. Use them for tests only.");
    Ok(())
}
