//! Contract artifacts and handles bound to deployed instances.

mod artifact;
mod handle;

pub use artifact::ContractArtifact;
pub use handle::ContractHandle;

use stakemint_common::receipt::Receipt;

use crate::error::{HarnessError, HarnessResult};

/// Turn a failed receipt into an execution error for `method`.
pub fn require_success(receipt: &Receipt, method: &str) -> HarnessResult<()> {
    if receipt.is_success() {
        return Ok(());
    }
    Err(HarnessError::Execution {
        method: method.to_string(),
        reason: receipt
            .revert_reason
            .clone()
            .unwrap_or_else(|| format!("receipt status {}", receipt.status)),
    })
}
