//! # wirecall-primitives
//!
//! Primitive types shared across the wirecall engine: the 20-byte account
//! address, the 32-byte hash, the 256-bit unsigned integer, and Keccak-256.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{Address, AddressError};
pub use hash::{keccak256, H256, HashError};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Gas amount type
pub type Gas = u64;

/// Number of wei in one gwei
pub const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Number of wei in one ether
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;
