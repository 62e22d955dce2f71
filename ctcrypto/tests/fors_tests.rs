use ctcrypto::slh::fors::{fors_gen, fors_sign, fors_tree_root, fors_verify};
use ctcrypto::slh::hash::TreeContext;
use ctcrypto::slh::merkle::{MerkleContextPublic, MerkleContextSecret};
use ctcrypto::slh::params::{ForsParams, FORS_128F, FORS_128S};
use ctcrypto::slh::{Node, SLH_DSA_128_SIZE};
use proptest::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn seeds() -> ([u8; 16], [u8; 16]) {
    let mut public_seed = [0u8; 16];
    let mut secret_seed = [0u8; 16];
    for i in 0..16 {
        public_seed[i] = i as u8;
        secret_seed[i] = 0x10 + i as u8;
    }
    (public_seed, secret_seed)
}

fn context(layer: u32, tree: u64, keypair: u32) -> MerkleContextSecret {
    let (public_seed, secret_seed) = seeds();
    let public = MerkleContextPublic {
        tree: TreeContext::new(&public_seed, layer, tree),
        keypair,
    };
    MerkleContextSecret::new(public, &secret_seed)
}

fn sign(ctx: &MerkleContextSecret, params: &ForsParams, msg: &[u8]) -> (Vec<u8>, Node) {
    let mut signature = vec![0u8; params.signature_size()];
    let mut public = [0u8; SLH_DSA_128_SIZE];
    fors_sign(ctx, params, msg, &mut signature, &mut public);
    (signature, public)
}

fn verify(ctx: &MerkleContextPublic, params: &ForsParams, msg: &[u8], signature: &[u8]) -> Node {
    let mut public = [0u8; SLH_DSA_128_SIZE];
    fors_verify(ctx, params, msg, signature, &mut public);
    public
}

#[test]
fn test_known_digest() {
    let ctx = context(0, 0, 5);
    let params = ForsParams::new(2, 3).unwrap();
    let (signature, public) = sign(&ctx, &params, &[0x9c]);
    assert_eq!(hex::encode(public), "0304989ee23136362e82653eb5485f56");
    assert_eq!(verify(&ctx.public, &params, &[0x9c], &signature), public);

    // The first block reveals the secret value of leaf 4.
    assert_eq!(&signature[..16], &fors_gen(&ctx, 4).0[..]);
    // The second block belongs to leaf 15, in tree 1.
    let block = params.block_size();
    assert_eq!(&signature[block..block + 16], &fors_gen(&ctx, 15).0[..]);
}

#[test]
fn test_known_digest_with_layer_and_tree() {
    let ctx = context(3, 0x0102_0304_0506_0708, 7);
    let params = ForsParams::new(3, 4).unwrap();
    let (signature, public) = sign(&ctx, &params, &[0xa5, 0xc3]);
    assert_eq!(hex::encode(public), "2154709162427d792d5f116dbd9cc9e1");
    assert_eq!(verify(&ctx.public, &params, &[0xa5, 0xc3], &signature), public);
}

#[test]
fn test_128s_roundtrip() {
    let ctx = context(0, 42, 1);
    let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
    let mut msg = [0u8; 21];
    rng.fill_bytes(&mut msg);

    let (signature, public) = sign(&ctx, &FORS_128S, &msg);
    assert_eq!(signature.len(), 2912);
    assert_eq!(verify(&ctx.public, &FORS_128S, &msg, &signature), public);

    msg[20] ^= 0x80;
    assert_ne!(verify(&ctx.public, &FORS_128S, &msg, &signature), public);
}

#[test]
fn test_keys_are_bound_to_their_address() {
    let params = ForsParams::new(4, 4).unwrap();
    let msg = [0x12, 0x34];
    let (_, base) = sign(&context(0, 0, 0), &params, &msg);
    let (_, other_keypair) = sign(&context(0, 0, 1), &params, &msg);
    let (_, other_tree) = sign(&context(0, 1, 0), &params, &msg);
    let (_, other_layer) = sign(&context(1, 0, 0), &params, &msg);
    assert_ne!(base, other_keypair);
    assert_ne!(base, other_tree);
    assert_ne!(base, other_layer);
}

#[test]
fn test_tree_roots_do_not_depend_on_message() {
    let ctx = context(0, 0, 9);
    let params = ForsParams::new(3, 5).unwrap();
    let roots: Vec<Node> = (0..3).map(|i| fors_tree_root(&ctx, &params, i)).collect();
    assert_ne!(roots[0], roots[1]);

    let (_, first) = sign(&ctx, &params, &[0x00, 0x00]);
    let (_, second) = sign(&ctx, &params, &[0xff, 0xfe]);
    assert_eq!(first, second);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn verify_recovers_signer_key(msg in proptest::collection::vec(any::<u8>(), 25),
                                  keypair in any::<u32>()) {
        let ctx = context(0, 0, keypair);
        let (signature, public) = sign(&ctx, &FORS_128F, &msg);
        prop_assert_eq!(verify(&ctx.public, &FORS_128F, &msg, &signature), public);
    }

    #[test]
    fn tampered_signature_changes_digest(byte in 0usize..7 * 7 * 16, bit in 0u8..8) {
        let ctx = context(2, 3, 4);
        let params = ForsParams::new(7, 6).unwrap();
        let msg = [0xde, 0xad, 0xbe, 0xef, 0x01, 0x23];
        let (mut signature, public) = sign(&ctx, &params, &msg);
        signature[byte] ^= 1 << bit;
        prop_assert_ne!(verify(&ctx.public, &params, &msg, &signature), public);
    }
}
