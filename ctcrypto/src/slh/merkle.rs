//! Merkle tree roots and authentication paths.
//!
//! The tree shape is fixed here; what a leaf is and how two children are
//! combined is supplied by the caller. Node `(h, i)` covers leaves
//! `i << h .. (i + 1) << h`.

use alloc::vec::Vec;
use sha3::Shake256;
use zeroize::Zeroizing;

use crate::slh::hash::{TreeContext, Xof};
use crate::slh::{Node, SLH_DSA_128_SIZE};

/// What verification needs: the tree context and the keypair address.
#[derive(Clone)]
pub struct MerkleContextPublic<H: Xof = Shake256> {
    pub tree: TreeContext<H>,
    pub keypair: u32,
}

/// The public context plus the secret seed, for building trees.
#[derive(Clone)]
pub struct MerkleContextSecret<H: Xof = Shake256> {
    pub public: MerkleContextPublic<H>,
    pub(crate) secret_seed: Zeroizing<[u8; SLH_DSA_128_SIZE]>,
}

impl<H: Xof> MerkleContextSecret<H> {
    pub fn new(public: MerkleContextPublic<H>, secret_seed: &[u8; SLH_DSA_128_SIZE]) -> Self {
        Self {
            public,
            secret_seed: Zeroizing::new(*secret_seed),
        }
    }
}

/// Root of the subtree of the given `height` whose leftmost leaf is
/// `start`. A height of zero yields the leaf itself.
pub fn merkle_root<H, L, N>(
    ctx: &MerkleContextSecret<H>,
    leaf: L,
    node: N,
    height: u32,
    start: u32,
) -> Node
where
    H: Xof,
    L: Fn(&MerkleContextSecret<H>, u32) -> Node,
    N: Fn(&MerkleContextPublic<H>, u32, u32, &Node, &Node) -> Node,
{
    assert!(height <= 32);
    assert_eq!(
        start as u64 & ((1u64 << height) - 1),
        0,
        "subtree start is not aligned to its height"
    );

    let mut stack: Vec<Node> = Vec::with_capacity(height as usize + 1);
    for i in 0..1u64 << height {
        let idx = start as u64 + i;
        stack.push(leaf(ctx, idx as u32));
        // A completed left sibling sits below for every trailing one.
        for h in 1..=i.trailing_ones().min(height) {
            let right = stack.pop();
            let left = stack.pop();
            if let (Some(left), Some(right)) = (left, right) {
                stack.push(node(&ctx.public, h, (idx >> h) as u32, &left, &right));
            }
        }
    }
    debug_assert_eq!(stack.len(), 1);
    stack.pop().unwrap_or_default()
}

/// Fills `path` with the authentication path of leaf `idx` in a tree of
/// the given `height`, bottom node first.
pub fn merkle_sign<H, L, N>(
    ctx: &MerkleContextSecret<H>,
    leaf: L,
    node: N,
    height: u32,
    idx: u32,
    path: &mut [u8],
) where
    H: Xof,
    L: Fn(&MerkleContextSecret<H>, u32) -> Node,
    N: Fn(&MerkleContextPublic<H>, u32, u32, &Node, &Node) -> Node,
{
    assert_eq!(path.len(), height as usize * SLH_DSA_128_SIZE);
    for (h, out) in path.chunks_exact_mut(SLH_DSA_128_SIZE).enumerate() {
        let h = h as u32;
        let sibling = (((idx as u64) >> h) ^ 1) << h;
        out.copy_from_slice(&merkle_root(ctx, &leaf, &node, h, sibling as u32));
    }
}

/// Climbs from leaf `idx`, whose hash is in `hash`, to the root using
/// `path`. On return `hash` holds the root.
pub fn merkle_verify<H, N>(
    ctx: &MerkleContextPublic<H>,
    node: N,
    height: u32,
    mut idx: u32,
    path: &[u8],
    hash: &mut Node,
) where
    H: Xof,
    N: Fn(&MerkleContextPublic<H>, u32, u32, &Node, &Node) -> Node,
{
    assert_eq!(path.len(), height as usize * SLH_DSA_128_SIZE);
    for (h, sibling) in (1..=height).zip(path.chunks_exact(SLH_DSA_128_SIZE)) {
        let mut other = [0u8; SLH_DSA_128_SIZE];
        other.copy_from_slice(sibling);
        let right = idx & 1 == 1;
        idx >>= 1;
        *hash = if right {
            node(ctx, h, idx, &other, &*hash)
        } else {
            node(ctx, h, idx, &*hash, &other)
        };
    }
}
