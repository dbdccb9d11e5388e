//! In-memory node used by the unit tests.

use crate::error::RpcError;
use crate::model::{Amount, Block, Transaction, TxIn, TxOut};
use crate::rpc::{ChainInfo, NodeRpc};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn block(height: u64, time: i64, tx: &[&str]) -> Block {
    Block {
        hash: format!("hash{height}"),
        height,
        time,
        tx: tx.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn coinbase(txid: &str, outputs: &[u64]) -> Transaction {
    Transaction {
        txid: txid.into(),
        vin: vec![TxIn {
            coinbase: Some("04ffff001d".into()),
            txid: None,
            vout: None,
        }],
        vout: outs(outputs),
    }
}

pub fn spend(txid: &str, outputs: &[u64]) -> Transaction {
    Transaction {
        txid: txid.into(),
        vin: vec![TxIn {
            coinbase: None,
            txid: Some(format!("prev-{txid}")),
            vout: Some(0),
        }],
        vout: outs(outputs),
    }
}

fn outs(coins: &[u64]) -> Vec<TxOut> {
    coins
        .iter()
        .enumerate()
        .map(|(n, c)| TxOut {
            value: Amount::from_coins(*c),
            n: n as u32,
        })
        .collect()
}

fn not_found(method: &'static str, what: &str) -> RpcError {
    RpcError::Server {
        method,
        code: -5,
        message: format!("{what} not found"),
    }
}

/// Chain held in memory, indexed by height. Raw transaction hex is the txid
/// prefixed with `raw:`.
#[derive(Default)]
pub struct MockNode {
    chain: Vec<Block>,
    transactions: HashMap<String, Transaction>,
    pub offline: bool,
    /// Block hash or txid the node refuses to serve.
    pub broken: Option<String>,
    pub requested_heights: Mutex<Vec<u64>>,
    pub requested_txids: Arc<Mutex<Vec<String>>>,
}

impl MockNode {
    /// `chain[h]` is the block at height `h`.
    pub fn new(chain: Vec<Block>, transactions: Vec<Transaction>) -> Self {
        Self {
            chain,
            transactions: transactions
                .into_iter()
                .map(|tx| (tx.txid.clone(), tx))
                .collect(),
            ..Default::default()
        }
    }

    pub fn heights(&self) -> Vec<u64> {
        self.requested_heights.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeRpc for MockNode {
    async fn get_blockchain_info(&self) -> Result<ChainInfo, RpcError> {
        if self.offline {
            return Err(RpcError::MissingResult {
                method: "getblockchaininfo",
            });
        }
        Ok(ChainInfo {
            chain: "regtest".into(),
            blocks: self.chain.len().saturating_sub(1) as u64,
        })
    }

    async fn get_block_count(&self) -> Result<u64, RpcError> {
        Ok(self.chain.len().saturating_sub(1) as u64)
    }

    async fn get_block_hash(&self, height: u64) -> Result<String, RpcError> {
        self.requested_heights.lock().unwrap().push(height);
        self.chain
            .get(height as usize)
            .map(|b| b.hash.clone())
            .ok_or_else(|| not_found("getblockhash", &format!("height {height}")))
    }

    async fn get_block(&self, hash: &str) -> Result<Block, RpcError> {
        if self.broken.as_deref() == Some(hash) {
            return Err(not_found("getblock", hash));
        }
        self.chain
            .iter()
            .find(|b| b.hash == hash)
            .cloned()
            .ok_or_else(|| not_found("getblock", hash))
    }

    async fn get_raw_transaction(
        &self,
        txid: &str,
        _block_hash: Option<&str>,
    ) -> Result<String, RpcError> {
        self.requested_txids.lock().unwrap().push(txid.to_string());
        if self.broken.as_deref() != Some(txid) && self.transactions.contains_key(txid) {
            Ok(format!("raw:{txid}"))
        } else {
            Err(not_found("getrawtransaction", txid))
        }
    }

    async fn decode_raw_transaction(&self, hex: &str) -> Result<Transaction, RpcError> {
        hex.strip_prefix("raw:")
            .and_then(|txid| self.transactions.get(txid))
            .cloned()
            .ok_or_else(|| not_found("decoderawtransaction", hex))
    }
}
