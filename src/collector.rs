use crate::error::RpcError;
use crate::model::{AnnotatedBlock, Transaction};
use crate::rpc::NodeRpc;
use futures::stream::{self, StreamExt, TryStreamExt};
use log::debug;

/// Fetch and decode every transaction referenced by `blocks`.
///
/// Output order is block order, then the order of each block's `tx` list,
/// whatever `concurrency` is. At most `concurrency` fetches are in flight;
/// the first failure aborts the whole collection.
pub async fn collect_transactions<R: NodeRpc + ?Sized>(
    rpc: &R,
    blocks: &[AnnotatedBlock],
    concurrency: usize,
) -> Result<Vec<Transaction>, RpcError> {
    let wanted = blocks
        .iter()
        .flat_map(|a| a.block.tx.iter().map(move |txid| (txid, &a.block.hash)));

    stream::iter(wanted)
        .map(|(txid, block_hash)| fetch_transaction(rpc, txid, block_hash))
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

async fn fetch_transaction<R: NodeRpc + ?Sized>(
    rpc: &R,
    txid: &str,
    block_hash: &str,
) -> Result<Transaction, RpcError> {
    let raw = rpc.get_raw_transaction(txid, Some(block_hash)).await?;
    let transaction = rpc.decode_raw_transaction(&raw).await?;
    debug!(
        "Transaction {} | {} inputs | {} outputs",
        transaction.txid,
        transaction.vin.len(),
        transaction.vout.len()
    );
    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{block, coinbase, spend, MockNode};

    fn annotated(blocks: Vec<crate::model::Block>) -> Vec<AnnotatedBlock> {
        blocks
            .into_iter()
            .map(|block| AnnotatedBlock {
                block,
                generation_time: 600,
            })
            .collect()
    }

    fn node() -> MockNode {
        MockNode::new(
            vec![],
            vec![
                coinbase("c1", &[50]),
                spend("a", &[1, 2]),
                spend("b", &[3, 4, 5]),
                coinbase("c2", &[50]),
                spend("c", &[6]),
            ],
        )
    }

    fn txids(transactions: &[Transaction]) -> Vec<&str> {
        transactions.iter().map(|t| t.txid.as_str()).collect()
    }

    #[tokio::test]
    async fn keeps_block_then_tx_order() {
        let node = node();
        let blocks = annotated(vec![
            block(2, 1200, &["c2", "c"]),
            block(1, 600, &["c1", "a", "b"]),
        ]);

        let transactions = collect_transactions(&node, &blocks, 1).await.unwrap();

        assert_eq!(txids(&transactions), vec!["c2", "c", "c1", "a", "b"]);
    }

    #[tokio::test]
    async fn concurrent_fetch_preserves_order() {
        let node = node();
        let blocks = annotated(vec![
            block(1, 600, &["c1", "a", "b"]),
            block(2, 1200, &["c2", "c"]),
        ]);

        for concurrency in [0, 2, 3, 16] {
            let transactions = collect_transactions(&node, &blocks, concurrency)
                .await
                .unwrap();
            assert_eq!(txids(&transactions), vec!["c1", "a", "b", "c2", "c"]);
        }
    }

    #[tokio::test]
    async fn duplicates_are_kept() {
        let node = node();
        let blocks = annotated(vec![block(1, 600, &["a"]), block(2, 1200, &["a"])]);

        let transactions = collect_transactions(&node, &blocks, 1).await.unwrap();

        assert_eq!(txids(&transactions), vec!["a", "a"]);
    }

    #[tokio::test]
    async fn first_failure_aborts_collection() {
        let mut node = node();
        node.broken = Some("a".into());
        let blocks = annotated(vec![
            block(1, 600, &["c1", "a", "b"]),
            block(2, 1200, &["c2", "c"]),
        ]);

        let err = collect_transactions(&node, &blocks, 1).await.unwrap_err();

        assert_eq!(err.method(), "getrawtransaction");
        // sequential collection never asks for anything after the failure
        let requested = node.requested_txids.lock().unwrap().clone();
        assert_eq!(requested, vec!["c1".to_string(), "a".to_string()]);
    }

    #[tokio::test]
    async fn no_blocks_means_no_calls() {
        let node = node();

        let transactions = collect_transactions(&node, &[], 4).await.unwrap();

        assert!(transactions.is_empty());
        assert!(node.requested_txids.lock().unwrap().is_empty());
    }
}
