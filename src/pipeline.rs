use crate::annotator::annotate;
use crate::collector::collect_transactions;
use crate::error::{Error, Result};
use crate::rpc::{ChainInfo, NodeRpc};
use crate::stats::Report;
use crate::walker::walk_since;
use log::info;

/// Runs the block and transaction collection against one node.
pub struct Pipeline<R> {
    rpc: R,
    concurrency: usize,
}

impl<R: NodeRpc> Pipeline<R> {
    pub fn new(rpc: R) -> Self {
        Self {
            rpc,
            concurrency: 1,
        }
    }

    /// Number of transaction fetches allowed in flight at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Check that the node answers before collecting anything.
    pub async fn connect(&self) -> Result<ChainInfo> {
        let info = self
            .rpc
            .get_blockchain_info()
            .await
            .map_err(Error::Connection)?;
        info!("Connected to {} node at height {}", info.chain, info.blocks);
        Ok(info)
    }

    /// Collect everything mined since `since` and reduce it into a report.
    ///
    /// `clock` is read once, after collection, to close the averaging window.
    pub async fn run<C>(&self, since: i64, clock: C) -> Result<Report>
    where
        C: FnOnce() -> i64,
    {
        self.connect().await?;

        info!("Collecting blocks since {}", since);
        let blocks = walk_since(&self.rpc, since).await?;
        info!("Found {} blocks", blocks.len());

        let blocks = annotate(blocks);
        if blocks.is_empty() {
            return Err(Error::EmptyRange { since });
        }

        info!("Collecting transaction data from {} blocks", blocks.len());
        let transactions = collect_transactions(&self.rpc, &blocks, self.concurrency).await?;
        info!("Found {} transactions", transactions.len());

        Report::compute(&blocks, &transactions, since, clock())
    }
}
