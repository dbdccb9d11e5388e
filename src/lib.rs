//! Block and transaction statistics for a Bitcoin-style node.
//!
//! The pipeline walks back from the chain tip to a cutoff time, annotates
//! each block with its generation time, collects every transaction and
//! reduces the lot into a [`stats::Report`].

pub mod annotator;
pub mod collector;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod rpc;
pub mod stats;
pub mod walker;

#[cfg(test)]
mod testing;

pub use error::{Error, RpcError};
pub use pipeline::Pipeline;
pub use rpc::{NodeRpc, RpcClient};
pub use stats::Report;
