//! BlockWarp trait for advancing chain state by several blocks.

use async_trait::async_trait;

use super::client::{ClientError, ExecutionClient};

/// Maximum number of blocks that can be warped in a single call.
/// Prevents accidental runaway loops.
pub const MAX_WARP_BLOCKS: u64 = 100_000;

/// Fast chain advancement on top of [`ExecutionClient::advance_block`].
#[async_trait]
pub trait BlockWarp: ExecutionClient {
    /// Largest advancement accepted by a single warp.
    fn max_warp_blocks(&self) -> u64 {
        MAX_WARP_BLOCKS
    }

    /// Advance chain by N empty blocks, returns new height.
    async fn warp_blocks(&mut self, n: u64) -> Result<u64, ClientError> {
        let max = self.max_warp_blocks();
        if n > max {
            return Err(ClientError::ExceedsMaxWarp { requested: n, max });
        }
        for _ in 0..n {
            self.advance_block().await?;
        }
        Ok(self.current_block_height())
    }

    /// Advance chain to a specific height by creating empty blocks.
    ///
    /// Returns error if target is behind current height.
    async fn warp_to_height(&mut self, target: u64) -> Result<(), ClientError> {
        let current = self.current_block_height();
        if target < current {
            return Err(ClientError::TargetBehindCurrent { target, current });
        }
        self.warp_blocks(target - current).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warp_error_display() {
        let err = ClientError::TargetBehindCurrent {
            target: 50,
            current: 100,
        };
        assert!(format!("{}", err).contains("50"));
        assert!(format!("{}", err).contains("100"));
    }

    #[test]
    fn test_max_warp_constant() {
        assert_eq!(MAX_WARP_BLOCKS, 100_000);
    }
}
