use thiserror::Error;

/// Failure of a single JSON-RPC call.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{method}: transport error: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method}: node answered with HTTP {status}")]
    Http {
        method: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("{method}: RPC error {code}: {message}")]
    Server {
        method: &'static str,
        code: i64,
        message: String,
    },
    #[error("{method}: missing result")]
    MissingResult { method: &'static str },
    #[error("{method}: could not decode result: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl RpcError {
    /// Name of the RPC method that failed.
    pub fn method(&self) -> &'static str {
        match self {
            RpcError::Transport { method, .. }
            | RpcError::Http { method, .. }
            | RpcError::Server { method, .. }
            | RpcError::MissingResult { method }
            | RpcError::Decode { method, .. } => method,
        }
    }
}

/// Pipeline level errors. Every one of them is fatal for the run.
#[derive(Debug, Error)]
pub enum Error {
    /// The connectivity check failed before any data was collected.
    #[error("could not connect to node: {0}")]
    Connection(#[source] RpcError),
    /// A call failed while walking the chain or collecting transactions.
    #[error("RPC call failed: {0}")]
    RpcCall(#[from] RpcError),
    /// No annotated block lies in the requested window.
    #[error("no blocks found since {since}")]
    EmptyRange { since: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
