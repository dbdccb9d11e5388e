use crate::error::RpcError;
use crate::model::Block;
use crate::rpc::NodeRpc;
use log::debug;

/// Walk backward from the chain tip and return every block whose time is at
/// or after `cutoff`, in descending height order.
///
/// The walk stops at the first block older than `cutoff` (which is not
/// returned) or after height 0. Any failed call aborts the walk.
pub async fn walk_since<R: NodeRpc + ?Sized>(
    rpc: &R,
    cutoff: i64,
) -> Result<Vec<Block>, RpcError> {
    let mut height = rpc.get_block_count().await?;
    let mut blocks = Vec::new();

    loop {
        let hash = rpc.get_block_hash(height).await?;
        let block = rpc.get_block(&hash).await?;

        if block.time < cutoff {
            debug!(
                "Block {} at {} precedes cutoff {}, stopping",
                height, block.time, cutoff
            );
            break;
        }

        debug!(
            "Block {} | {} | time {} | {} txs",
            height,
            block.hash,
            block.time,
            block.tx.len()
        );
        blocks.push(block);

        if height == 0 {
            break;
        }
        height -= 1;
    }

    Ok(blocks)
}
