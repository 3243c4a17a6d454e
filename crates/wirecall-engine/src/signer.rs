//! Signer capability
//!
//! The engine needs a sender identity for anything that writes state. Key
//! custody and the actual signing stay behind the node; the engine only
//! carries the account address to submit from.

use wirecall_primitives::Address;

/// Sender identity capability
pub trait Signer: Send + Sync {
    /// The account address transactions are sent from
    fn address(&self) -> Address;
}

/// A signer backed by a fixed, node-managed account
#[derive(Debug, Clone, Copy)]
pub struct StaticSigner {
    address: Address,
}

impl StaticSigner {
    /// Create a signer for the given account
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl Signer for StaticSigner {
    fn address(&self) -> Address {
        self.address
    }
}
