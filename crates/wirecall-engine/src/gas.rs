//! Gas estimation policy
//!
//! The node's raw estimate is never submitted as-is: the limit carries a 20%
//! safety margin, rounded up, so a transaction does not run out of gas when
//! state shifts slightly between estimation and inclusion.

use wirecall_primitives::WEI_PER_GWEI;

use crate::error::EngineError;
use crate::transport::Transport;
use crate::types::{CallRequest, GasEstimate};

/// Apply the 20% safety margin to a raw estimate, rounding up
pub fn with_margin(gas: u64) -> u64 {
    let scaled = (gas as u128) * 6 + 4;
    (scaled / 5) as u64
}

/// Convert a wei amount to gwei, rounding down
pub fn wei_to_gwei(wei: u128) -> u128 {
    wei / WEI_PER_GWEI
}

/// Estimate gas for a request and fetch the current gas price.
///
/// An estimation rejection is surfaced as [`EngineError::Estimation`] carrying
/// the node's message; for a reverting call that message is the closest thing
/// to a reason the caller will get before submitting.
pub async fn estimate(
    transport: &dyn Transport,
    request: &CallRequest,
) -> Result<GasEstimate, EngineError> {
    let raw = transport
        .estimate_gas(request)
        .await
        .map_err(|e| EngineError::Estimation(e.to_string()))?;
    let gas_price_wei = transport.gas_price().await?;
    Ok(GasEstimate {
        gas_limit: with_margin(raw),
        gas_price_wei,
        gas_price_gwei: wei_to_gwei(gas_price_wei),
    })
}
