//! Domain-separated tree hashing.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

use crate::slh::address::{tree_address, AddressHash};
use crate::slh::{Node, SLH_DSA_128_SIZE};

/// Extendable-output hash used for tree hashing.
///
/// A state can be duplicated with [`Xof::snapshot`]: the copy continues
/// from the absorbed input independently of the original.
pub trait Xof: Clone {
    fn init() -> Self;

    fn absorb(&mut self, data: &[u8]);

    /// Finishes absorbing and fills `out`.
    fn squeeze(self, out: &mut [u8]);

    fn snapshot(&self) -> Self {
        self.clone()
    }
}

impl Xof for Shake256 {
    fn init() -> Self {
        Shake256::default()
    }

    fn absorb(&mut self, data: &[u8]) {
        Update::update(self, data);
    }

    fn squeeze(self, out: &mut [u8]) {
        self.finalize_xof().read(out);
    }
}

/// XOF state that has absorbed the public seed and the layer/tree part of
/// the address. Every hash in that tree starts from a snapshot of it.
#[derive(Clone)]
pub struct TreeContext<H: Xof = Shake256> {
    state: H,
}

impl<H: Xof> TreeContext<H> {
    pub fn new(public_seed: &[u8; SLH_DSA_128_SIZE], layer: u32, tree: u64) -> Self {
        let mut state = H::init();
        state.absorb(public_seed);
        state.absorb(&tree_address(layer, tree));
        Self { state }
    }

    pub fn snapshot(&self) -> H {
        self.state.snapshot()
    }
}

/// `H(PK.seed || ADRS || input)` truncated to one node.
pub fn slh_shake<H: Xof>(ctx: &TreeContext<H>, ah: &AddressHash, input: &Node) -> Node {
    let mut state = ctx.snapshot();
    state.absorb(&ah.to_bytes());
    state.absorb(input);
    let mut out = [0u8; SLH_DSA_128_SIZE];
    state.squeeze(&mut out);
    out
}
