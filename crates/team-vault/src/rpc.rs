//! JSON-RPC 2.0 access to a ledger node.
//!
//! [`RpcClient`] is the only network seam in the crate. The orchestrator and
//! balance tracker depend on the trait; [`HttpRpcClient`] is the production
//! implementation over reqwest.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chain_sol::{Blockhash, Pubkey};
#[cfg(test)]
use mockall::automock;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// Whether the same request might succeed if sent again later.
    pub fn is_transient(&self) -> bool {
        match self {
            RpcError::Transport(_) | RpcError::Timeout(_) => true,
            RpcError::Http { status, .. } => {
                matches!(status, 408 | 425 | 429) || (*status >= 500 && !matches!(status, 501 | 505))
            }
            RpcError::Rpc { code, message } => {
                // -32004 block not available, -32005 node unhealthy,
                // -32008 no snapshot, -32014 block status not yet available,
                // -32016 min context slot not reached.
                matches!(code, -32004 | -32005 | -32008 | -32014 | -32016)
                    || message.to_ascii_lowercase().contains("blockhash not found")
            }
            RpcError::InvalidResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RpcError::Timeout(e.to_string())
        } else if let Some(status) = e.status() {
            RpcError::Http {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else if e.is_decode() {
            RpcError::InvalidResponse(e.to_string())
        } else {
            RpcError::Transport(e.to_string())
        }
    }
}

/// How settled the state behind a response must be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("unknown commitment level {other:?}")),
        }
    }
}

/// The three ledger calls the client needs.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Balance of `address` in lamports.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError>;

    async fn get_latest_blockhash(&self) -> Result<Blockhash, RpcError>;

    /// Submit a signed wire transaction; returns the Base58 signature the
    /// node acknowledged.
    async fn send_transaction(&self, transaction: &[u8]) -> Result<String, RpcError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct LatestBlockhash {
    blockhash: String,
}

/// [`RpcClient`] over HTTP.
pub struct HttpRpcClient {
    client: reqwest::Client,
    url: String,
    commitment: Commitment,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        commitment: Commitment,
    ) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            commitment,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "rpc request");

        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| body_error(method, e))?;

        if let Some(error) = body.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        body.result
            .ok_or_else(|| RpcError::InvalidResponse(format!("{method}: missing result")))
    }
}

/// A body that stalls past the deadline is a timeout, anything else that
/// fails to decode is a bad response.
fn body_error(method: &str, e: reqwest::Error) -> RpcError {
    if e.is_timeout() {
        RpcError::from(e)
    } else {
        RpcError::InvalidResponse(format!("{method}: {e}"))
    }
}

#[async_trait]
impl RpcClient for HttpRpcClient {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError> {
        let balance: WithContext<u64> = self
            .call(
                "getBalance",
                json!([address.to_string(), { "commitment": self.commitment.as_str() }]),
            )
            .await?;
        Ok(balance.value)
    }

    async fn get_latest_blockhash(&self) -> Result<Blockhash, RpcError> {
        let latest: WithContext<LatestBlockhash> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment.as_str() }]),
            )
            .await?;
        latest.value.blockhash.parse().map_err(|e| {
            RpcError::InvalidResponse(format!("getLatestBlockhash: {e}"))
        })
    }

    async fn send_transaction(&self, transaction: &[u8]) -> Result<String, RpcError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(transaction);
        self.call(
            "sendTransaction",
            json!([
                encoded,
                {
                    "encoding": "base64",
                    "preflightCommitment": self.commitment.as_str(),
                }
            ]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::io::Write;

    fn client(url: String) -> HttpRpcClient {
        HttpRpcClient::new(url, Duration::from_secs(5), Commitment::Confirmed).unwrap()
    }

    #[tokio::test]
    async fn get_balance_reads_context_value() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "jsonrpc": "2.0",
                "method": "getBalance",
                "params": ["HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk", {"commitment": "confirmed"}],
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":1500000000}}"#)
            .create_async()
            .await;

        let address: Pubkey = "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk".parse().unwrap();
        let lamports = client(server.url()).get_balance(&address).await.unwrap();

        assert_eq!(lamports, 1_500_000_000);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_latest_blockhash_decodes_base58() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "getLatestBlockhash"})))
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":9},"value":{"blockhash":"4yEEpiX9ZcbgyBZxsREv3Hx9AkQLfdjgFoaofk2nbHe3","lastValidBlockHeight":150}}}"#,
            )
            .create_async()
            .await;

        let blockhash = client(server.url()).get_latest_blockhash().await.unwrap();
        assert_eq!(
            blockhash.to_string(),
            "4yEEpiX9ZcbgyBZxsREv3Hx9AkQLfdjgFoaofk2nbHe3"
        );
    }

    #[tokio::test]
    async fn send_transaction_posts_base64() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "sendTransaction",
                "params": ["AQID", {"encoding": "base64", "preflightCommitment": "confirmed"}],
            })))
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW"}"#)
            .create_async()
            .await;

        let signature = client(server.url())
            .send_transaction(&[1, 2, 3])
            .await
            .unwrap();

        assert!(signature.starts_with("5VERv8NM"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn json_rpc_error_is_surfaced_with_code() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32005,"message":"Node is unhealthy"}}"#)
            .create_async()
            .await;

        let err = client(server.url()).get_latest_blockhash().await.unwrap_err();
        assert_eq!(
            err,
            RpcError::Rpc {
                code: -32005,
                message: "Node is unhealthy".into()
            }
        );
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn http_status_errors_keep_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let err = client(server.url()).send_transaction(&[0]).await.unwrap_err();
        assert_eq!(
            err,
            RpcError::Http {
                status: 429,
                body: "slow down".into()
            }
        );
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn malformed_body_is_permanent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body("not json")
            .create_async()
            .await;

        let err = client(server.url()).get_latest_blockhash().await.unwrap_err();
        assert!(matches!(err, RpcError::InvalidResponse(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn stalled_body_is_a_transient_timeout() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_header("content-type", "application/json")
            .with_chunked_body(|w| {
                w.write_all(br#"{"jsonrpc":"2.0","#)?;
                w.flush()?;
                std::thread::sleep(Duration::from_millis(800));
                w.write_all(br#""id":1,"result":{"context":{"slot":1},"value":1}}"#)
            })
            .create_async()
            .await;

        let rpc =
            HttpRpcClient::new(server.url(), Duration::from_millis(200), Commitment::Confirmed)
                .unwrap();
        let address = Pubkey::new_from_array([7; 32]);
        let err = rpc.get_balance(&address).await.unwrap_err();

        assert!(matches!(err, RpcError::Timeout(_)), "{err:?}");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transient() {
        // Port 9 (discard) on loopback is not expected to be listening.
        let err = client("http://127.0.0.1:9".into())
            .get_latest_blockhash()
            .await
            .unwrap_err();
        assert!(err.is_transient(), "{err:?}");
    }

    #[test]
    fn transient_classification() {
        assert!(RpcError::Http { status: 503, body: String::new() }.is_transient());
        assert!(RpcError::Http { status: 408, body: String::new() }.is_transient());
        assert!(!RpcError::Http { status: 501, body: String::new() }.is_transient());
        assert!(!RpcError::Http { status: 400, body: String::new() }.is_transient());
        assert!(RpcError::Rpc { code: -32004, message: String::new() }.is_transient());
        assert!(RpcError::Rpc {
            code: -32002,
            message: "Transaction simulation failed: Blockhash not found".into()
        }
        .is_transient());
        assert!(!RpcError::Rpc {
            code: -32002,
            message: "insufficient funds for rent".into()
        }
        .is_transient());
    }

    #[test]
    fn commitment_parses_case_insensitively() {
        assert_eq!("Finalized".parse::<Commitment>().unwrap(), Commitment::Finalized);
        assert_eq!(Commitment::default().to_string(), "confirmed");
        assert!("max".parse::<Commitment>().is_err());
    }
}
