//! Hash addresses.
//!
//! An SLH-DSA address identifies one hash evaluation in the hypertree. The
//! layer/tree half is absorbed once into the tree context; the
//! type/keypair/height/index half travels with every hash call. Both are
//! encoded big-endian when built, so the bytes handed to the XOF are the same
//! on every host.

/// Address types, with their FIPS 205 codes.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressType {
    WotsHash = 0,
    WotsPk = 1,
    Tree = 2,
    ForsTree = 3,
    ForsRoots = 4,
    WotsPrf = 5,
    ForsPrf = 6,
}

/// Encoded `{type, keypair, height, index}` part of an address.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AddressHash([u8; AddressHash::SIZE]);

impl AddressHash {
    pub const SIZE: usize = 16;

    pub fn new(addr_type: AddressType, keypair: u32, height: u32, index: u32) -> Self {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&(addr_type as u32).to_be_bytes());
        bytes[4..8].copy_from_slice(&keypair.to_be_bytes());
        bytes[8..12].copy_from_slice(&height.to_be_bytes());
        bytes[12..16].copy_from_slice(&index.to_be_bytes());
        Self(bytes)
    }

    /// Same address with another type.
    pub fn with_type(mut self, addr_type: AddressType) -> Self {
        self.0[0..4].copy_from_slice(&(addr_type as u32).to_be_bytes());
        self
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        self.0
    }

    fn field(&self, i: usize) -> u32 {
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.0[4 * i..4 * i + 4]);
        u32::from_be_bytes(word)
    }

    pub fn keypair(&self) -> u32 {
        self.field(1)
    }

    pub fn height(&self) -> u32 {
        self.field(2)
    }

    pub fn index(&self) -> u32 {
        self.field(3)
    }
}

impl core::fmt::Debug for AddressHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AddressHash")
            .field("type", &self.field(0))
            .field("keypair", &self.keypair())
            .field("height", &self.height())
            .field("index", &self.index())
            .finish()
    }
}

/// Encoded `{layer, tree}` part of an address: `layer (4) || 0 (4) ||
/// tree (8)`, all big-endian.
pub fn tree_address(layer: u32, tree: u64) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[0..4].copy_from_slice(&layer.to_be_bytes());
    bytes[8..16].copy_from_slice(&tree.to_be_bytes());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_layout() {
        let ah = AddressHash::new(AddressType::ForsTree, 0x0102_0304, 5, 0xa0b0_c0d0);
        assert_eq!(
            ah.to_bytes(),
            [0, 0, 0, 3, 1, 2, 3, 4, 0, 0, 0, 5, 0xa0, 0xb0, 0xc0, 0xd0]
        );
        assert_eq!(ah.keypair(), 0x0102_0304);
        assert_eq!(ah.height(), 5);
        assert_eq!(ah.index(), 0xa0b0_c0d0);
    }

    #[test]
    fn test_with_type_only_changes_type() {
        let prf = AddressHash::new(AddressType::ForsPrf, 9, 0, 77);
        let tree = prf.with_type(AddressType::ForsTree);
        assert_eq!(&tree.to_bytes()[..4], &[0, 0, 0, 3]);
        assert_eq!(&tree.to_bytes()[4..], &prf.to_bytes()[4..]);
        assert_ne!(tree, prf);
    }

    #[test]
    fn test_distinct_tuples_encode_distinctly() {
        let a = AddressHash::new(AddressType::ForsTree, 1, 2, 3);
        let b = AddressHash::new(AddressType::ForsTree, 1, 3, 2);
        let c = AddressHash::new(AddressType::ForsRoots, 1, 2, 3);
        assert_ne!(a.to_bytes(), b.to_bytes());
        assert_ne!(a.to_bytes(), c.to_bytes());
    }

    #[test]
    fn test_tree_address_layout() {
        assert_eq!(
            tree_address(3, 0x0102_0304_0506_0708),
            [0, 0, 0, 3, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8]
        );
    }
}
