use crate::error::{Error, Result};
use crate::model::{Amount, AnnotatedBlock, Transaction};

/// Size of the top and bottom windows exposed by [`Report`].
pub const RANKING_WINDOW: usize = 10;

/// Transaction id with its value as used for ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedTransaction {
    pub txid: String,
    /// Output total without the first output, see [`Transaction::total_vout`].
    pub value: Amount,
    pub coinbase: bool,
}

/// Statistics over one collected block range.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub since: i64,
    pub now: i64,
    pub block_count: usize,
    pub tx_count: usize,
    /// `(now - since) / block_count`, truncated to whole seconds.
    pub average_block_time: i64,
    pub average_tx_per_block: f64,
    /// Value moved by non-coinbase transactions, first outputs excluded.
    pub organic_value: Amount,
    /// `tx_count - block_count`. Approximate: assumes exactly one coinbase
    /// transaction per block and no duplicates.
    pub organic_tx_count: usize,
    /// All blocks, longest generation time first.
    pub ranked_blocks: Vec<AnnotatedBlock>,
    /// All transactions, highest value first.
    pub ranked_transactions: Vec<RankedTransaction>,
}

impl Report {
    /// Reduce annotated blocks and their transactions into a report.
    ///
    /// Fails with [`Error::EmptyRange`] when there is no block to average over.
    pub fn compute(
        blocks: &[AnnotatedBlock],
        transactions: &[Transaction],
        since: i64,
        now: i64,
    ) -> Result<Report> {
        let block_count = blocks.len();
        let tx_count = transactions.len();
        if block_count == 0 {
            return Err(Error::EmptyRange { since });
        }

        let average_block_time = now.saturating_sub(since) / block_count as i64;
        let average_tx_per_block = tx_count as f64 / block_count as f64;

        let organic_value: Amount = transactions
            .iter()
            .filter(|tx| !tx.is_coinbase())
            .map(Transaction::total_vout)
            .sum();

        // sort_by is stable, so ties keep their input order
        let mut ranked_blocks = blocks.to_vec();
        ranked_blocks.sort_by(|a, b| b.generation_time.cmp(&a.generation_time));

        let mut ranked_transactions: Vec<RankedTransaction> = transactions
            .iter()
            .map(|tx| RankedTransaction {
                txid: tx.txid.clone(),
                value: tx.total_vout(),
                coinbase: tx.is_coinbase(),
            })
            .collect();
        ranked_transactions.sort_by(|a, b| b.value.cmp(&a.value));

        Ok(Report {
            since,
            now,
            block_count,
            tx_count,
            average_block_time,
            average_tx_per_block,
            organic_value,
            organic_tx_count: tx_count.saturating_sub(block_count),
            ranked_blocks,
            ranked_transactions,
        })
    }

    /// Up to ten blocks with the longest generation time, longest first.
    pub fn longest_blocks(&self) -> &[AnnotatedBlock] {
        let end = self.ranked_blocks.len().min(RANKING_WINDOW);
        &self.ranked_blocks[..end]
    }

    /// Up to ten blocks with the shortest generation time, in ranking order
    /// (shortest last). Overlaps [`Report::longest_blocks`] below twenty blocks.
    pub fn shortest_blocks(&self) -> &[AnnotatedBlock] {
        let start = self.ranked_blocks.len().saturating_sub(RANKING_WINDOW);
        &self.ranked_blocks[start..]
    }

    /// Up to ten transactions with the highest value.
    pub fn top_transactions(&self) -> &[RankedTransaction] {
        let end = self.ranked_transactions.len().min(RANKING_WINDOW);
        &self.ranked_transactions[..end]
    }

    /// Highest valued transaction, if any moved a positive value.
    pub fn largest_transaction(&self) -> Option<&RankedTransaction> {
        self.ranked_transactions
            .first()
            .filter(|tx| !tx.value.is_zero())
    }
}
