//! Forest of random subsets (FORS) few-time signatures.
//!
//! A FORS key is `k` Merkle trees of height `a` whose leaves hash secret
//! values derived from the secret seed. Tree `i` owns leaves
//! `i << a .. (i + 1) << a`. A message digest is cut into `k` chunks of
//! `a` bits; chunk `i` selects one leaf of tree `i`, whose secret value and
//! authentication path are revealed. The public key compresses the `k`
//! roots into one node.

use crate::encoding::BitChunks;
use crate::slh::address::{AddressHash, AddressType};
use crate::slh::hash::{slh_shake, Xof};
use crate::slh::merkle::{
    merkle_root, merkle_sign, merkle_verify, MerkleContextPublic, MerkleContextSecret,
};
use crate::slh::params::ForsParams;
use crate::slh::{Node, SLH_DSA_128_SIZE};

/// Secret value and leaf hash of FORS leaf `idx`.
pub fn fors_gen<H: Xof>(ctx: &MerkleContextSecret<H>, idx: u32) -> (Node, Node) {
    let prf = AddressHash::new(AddressType::ForsPrf, ctx.public.keypair, 0, idx);
    let sk = slh_shake(&ctx.public.tree, &prf, &ctx.secret_seed);
    let leaf = slh_shake(&ctx.public.tree, &prf.with_type(AddressType::ForsTree), &sk);
    (sk, leaf)
}

fn fors_leaf<H: Xof>(ctx: &MerkleContextSecret<H>, idx: u32) -> Node {
    fors_gen(ctx, idx).1
}

/// Inner node `(height, index)` from its two children.
pub fn fors_node<H: Xof>(
    ctx: &MerkleContextPublic<H>,
    height: u32,
    index: u32,
    left: &Node,
    right: &Node,
) -> Node {
    let ah = AddressHash::new(AddressType::ForsTree, ctx.keypair, height, index);
    let mut state = ctx.tree.snapshot();
    state.absorb(&ah.to_bytes());
    state.absorb(left);
    state.absorb(right);
    let mut out = [0u8; SLH_DSA_128_SIZE];
    state.squeeze(&mut out);
    out
}

/// Accumulator for the tree roots, keyed by the FORS-roots address.
fn roots_accumulator<H: Xof>(ctx: &MerkleContextPublic<H>) -> H {
    let mut acc = ctx.tree.snapshot();
    acc.absorb(&AddressHash::new(AddressType::ForsRoots, ctx.keypair, 0, 0).to_bytes());
    acc
}

/// Leaf indices selected by `msg`, one per tree.
fn leaf_indices<'a>(params: &ForsParams, msg: &'a [u8]) -> impl Iterator<Item = u32> + 'a {
    let a = params.a();
    BitChunks::new(msg, a)
        .take(params.k() as usize)
        .enumerate()
        // Fits in 32 bits: k << a <= 2^32.
        .map(move |(i, chunk)| (((i as u64) << a) + chunk as u64) as u32)
}

/// Signs the digest `msg`, writing the signature into `signature` and the
/// FORS public key into `public`.
///
/// Panics if `msg` is shorter than `k * a` bits or `signature` is not
/// [`ForsParams::signature_size`] bytes.
pub fn fors_sign<H: Xof>(
    ctx: &MerkleContextSecret<H>,
    params: &ForsParams,
    msg: &[u8],
    signature: &mut [u8],
    public: &mut Node,
) {
    params.assert_fits(msg, signature);
    let a = params.a();
    let mut acc = roots_accumulator(&ctx.public);

    let blocks = signature.chunks_exact_mut(params.block_size());
    for (idx, block) in leaf_indices(params, msg).zip(blocks) {
        let (sk, mut hash) = fors_gen(ctx, idx);
        let (sk_out, path) = block.split_at_mut(SLH_DSA_128_SIZE);
        sk_out.copy_from_slice(&sk);
        merkle_sign(ctx, fors_leaf, fors_node, a, idx, path);
        // The root falls out of the path just produced.
        merkle_verify(&ctx.public, fors_node, a, idx, path, &mut hash);
        acc.absorb(&hash);
    }
    acc.squeeze(public);
}

/// Recomputes the FORS public key from `signature` on `msg`.
///
/// The result equals the signer's public key exactly when the signature is
/// genuine; comparing it is up to the caller.
pub fn fors_verify<H: Xof>(
    ctx: &MerkleContextPublic<H>,
    params: &ForsParams,
    msg: &[u8],
    signature: &[u8],
    public: &mut Node,
) {
    params.assert_fits(msg, signature);
    let a = params.a();
    let mut acc = roots_accumulator(ctx);

    let blocks = signature.chunks_exact(params.block_size());
    for (idx, block) in leaf_indices(params, msg).zip(blocks) {
        let (sk, path) = block.split_at(SLH_DSA_128_SIZE);
        let mut secret = [0u8; SLH_DSA_128_SIZE];
        secret.copy_from_slice(sk);
        let ah = AddressHash::new(AddressType::ForsTree, ctx.keypair, 0, idx);
        let mut hash = slh_shake(&ctx.tree, &ah, &secret);
        merkle_verify(ctx, fors_node, a, idx, path, &mut hash);
        acc.absorb(&hash);
    }
    acc.squeeze(public);
}

/// Root of FORS tree `tree`.
pub fn fors_tree_root<H: Xof>(
    ctx: &MerkleContextSecret<H>,
    params: &ForsParams,
    tree: u32,
) -> Node {
    assert!(tree < params.k(), "FORS tree {} out of range", tree);
    let start = (tree as u64) << params.a();
    merkle_root(ctx, fors_leaf, fors_node, params.a(), start as u32)
}
