//! # wirecall-engine
//!
//! Contract execution engine. Drives methods loaded by `wirecall-abi`
//! against a node: queries are dispatched, decoded and formatted;
//! transactions are estimated with a safety margin and submitted; a
//! continuous session polls a call until it becomes viable, then executes
//! it exactly once.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wirecall_engine::{ContractEngine, HttpTransport};
//! use wirecall_primitives::Address;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = Arc::new(HttpTransport::new("http://localhost:8545")?);
//!     let contract = Address::from_hex("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")?;
//!
//!     let engine = ContractEngine::new(
//!         transport,
//!         contract,
//!         wirecall_abi::erc20_methods(),
//!     );
//!
//!     let outcome = engine
//!         .execute("totalSupply", &[])
//!         .await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
mod error;
pub mod gas;
mod monitor;
mod signer;
mod transport;
pub mod types;

pub use engine::ContractEngine;
pub use error::EngineError;
pub use monitor::{SessionHandle, SessionState};
pub use signer::{Signer, StaticSigner};
pub use transport::{HttpTransport, MockTransport, Transport, TransportError};
pub use types::{CallRequest, ExecutionOutcome, ExecutionRequest, GasEstimate};
