//! # wirecall-abi
//!
//! Contract ABI handling: type resolution, parameter coercion, call encoding,
//! result decoding and result formatting.
//!
//! ## Pipeline
//!
//! - **load_abi**: parse an ABI JSON document into [`Method`] descriptors
//! - **coerce_args**: turn user-supplied strings into typed [`Value`]s
//! - **encode_call**: selector plus head/tail encoded argument body
//! - **decode_output**: typed values back out of a raw return buffer
//! - **format_outputs**: human-readable rendering of decoded values
//!
//! ## Quick Start
//!
//! ```rust
//! use wirecall_abi::{coerce_args, encode_call, load_abi};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let abi = r#"[{
//!         "type": "function",
//!         "name": "transfer",
//!         "inputs": [
//!             {"name": "to", "type": "address"},
//!             {"name": "amount", "type": "uint256"}
//!         ],
//!         "outputs": [{"name": "", "type": "bool"}],
//!         "stateMutability": "nonpayable"
//!     }]"#;
//!
//!     let methods = load_abi(abi)?;
//!     let transfer = &methods[0];
//!     assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
//!
//!     let args = coerce_args(
//!         &transfer.inputs,
//!         &[
//!             "0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d".to_string(),
//!             "1000".to_string(),
//!         ],
//!     )?;
//!     let call = encode_call(transfer, &args)?;
//!     assert_eq!(call.to_bytes().len(), 4 + 64);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod coerce;
mod decode;
mod encode;
mod error;
mod format;
mod method;
mod resolver;
pub mod types;

pub use coerce::{coerce, coerce_args};
pub use decode::{decode_output, decode_params};
pub use encode::{encode_call, encode_params, function_selector, EncodedCall};
pub use error::{AbiError, ParameterError};
pub use format::{format_outputs, format_value, FormatOptions, NamePattern};
pub use method::{erc20_methods, load_abi, Method, Mutability, Param};
pub use resolver::parse_type;
pub use types::{Component, ParamType, Value, I256};
