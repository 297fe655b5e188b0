//! Execution environment: the client capability surface and its in-process
//! implementation.

mod block_warp;
mod client;
mod config;
mod simulated;
mod vm;

pub use block_warp::{BlockWarp, MAX_WARP_BLOCKS};
pub use client::{ClientError, ExecutionClient};
pub use config::SimulatedChainConfig;
pub use simulated::{SimulatedBlock, SimulatedChain};
pub use vm::{CallEnv, ContractCode};
