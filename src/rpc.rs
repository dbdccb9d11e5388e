use crate::error::RpcError;
use crate::model::{Block, Transaction};
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Subset of `getblockchaininfo` used as connectivity check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: u64,
}

/// Node calls the statistics pipeline depends on.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn get_blockchain_info(&self) -> Result<ChainInfo, RpcError>;

    async fn get_block_count(&self) -> Result<u64, RpcError>;

    async fn get_block_hash(&self, height: u64) -> Result<String, RpcError>;

    async fn get_block(&self, hash: &str) -> Result<Block, RpcError>;

    /// Raw transaction hex. `block_hash` lets nodes without a transaction
    /// index look up confirmed transactions.
    async fn get_raw_transaction(
        &self,
        txid: &str,
        block_hash: Option<&str>,
    ) -> Result<String, RpcError>;

    async fn decode_raw_transaction(&self, hex: &str) -> Result<Transaction, RpcError>;
}

// JSON-RPC request
#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

// JSON-RPC response
#[derive(Deserialize, Debug)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

// JSON-RPC error
#[derive(Deserialize, Debug)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// JSON-RPC 1.0 client over HTTP with basic auth.
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
    user: Option<String>,
    password: Option<String>,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            user: None,
            password: None,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn with_auth(mut self, user: Option<String>, password: Option<String>) -> Self {
        self.user = user;
        self.password = password;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "1.0",
            method,
            params,
            id,
        };
        debug!("-> {} #{} {:?}", method, id, request.params);

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(user) = &self.user {
            builder = builder.basic_auth(user, self.password.as_ref());
        }

        let response = builder
            .send()
            .await
            .map_err(|source| RpcError::Transport { method, source })?;

        // RPC errors come back as HTTP 500 with a JSON error object.
        let status = response.status();
        if !status.is_success() && status != StatusCode::INTERNAL_SERVER_ERROR {
            return Err(RpcError::Http { method, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| RpcError::Transport { method, source })?;
        let response: JsonRpcResponse = match serde_json::from_slice(&body) {
            Ok(response) => response,
            Err(_) if !status.is_success() => return Err(RpcError::Http { method, status }),
            Err(source) => return Err(RpcError::Decode { method, source }),
        };

        if let Some(err) = response.error {
            return Err(RpcError::Server {
                method,
                code: err.code,
                message: err.message,
            });
        }

        let result = response
            .result
            .ok_or(RpcError::MissingResult { method })?;
        serde_json::from_value(result).map_err(|source| RpcError::Decode { method, source })
    }
}

#[async_trait]
impl NodeRpc for RpcClient {
    async fn get_blockchain_info(&self) -> Result<ChainInfo, RpcError> {
        self.call("getblockchaininfo", vec![]).await
    }

    async fn get_block_count(&self) -> Result<u64, RpcError> {
        self.call("getblockcount", vec![]).await
    }

    async fn get_block_hash(&self, height: u64) -> Result<String, RpcError> {
        self.call("getblockhash", vec![json!(height)]).await
    }

    async fn get_block(&self, hash: &str) -> Result<Block, RpcError> {
        self.call("getblock", vec![json!(hash), json!(1)]).await
    }

    async fn get_raw_transaction(
        &self,
        txid: &str,
        block_hash: Option<&str>,
    ) -> Result<String, RpcError> {
        let mut params = vec![json!(txid)];
        if let Some(hash) = block_hash {
            params.push(json!(false));
            params.push(json!(hash));
        }
        self.call("getrawtransaction", params).await
    }

    async fn decode_raw_transaction(&self, hex: &str) -> Result<Transaction, RpcError> {
        self.call("decoderawtransaction", vec![json!(hex)]).await
    }
}
