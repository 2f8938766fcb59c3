//! Wallet connector
//!
//! The provider is an injected capability: the connector never looks for
//! one on its own, so pages run the same against a JSON-RPC node, an
//! in-process fake, or nothing at all.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TrackerError};

/// Where users are sent when no wallet provider is installed
pub const INSTALL_URL: &str =
    "https://chrome.google.com/webstore/detail/metamask/nkbihfbeogaeaoehlefnkodbefgpgknn";

/// Account-access capability of a wallet provider
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the provider for account access (`eth_requestAccounts`)
    async fn request_accounts(&self) -> Result<Vec<String>>;
}

/// Why an account request did not produce an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No provider injected
    Unavailable,
    /// Provider or user refused, or returned no accounts
    Rejected { cause: String },
}

impl std::fmt::Display for WalletError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletError::Unavailable => f.write_str("wallet provider not available"),
            WalletError::Rejected { cause } => write!(f, "wallet request rejected: {cause}"),
        }
    }
}

impl From<WalletError> for TrackerError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Unavailable => TrackerError::WalletUnavailable,
            WalletError::Rejected { cause } => TrackerError::WalletRejected(cause),
        }
    }
}

/// Result of the user-facing connect action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(String),
    /// No provider: show the install prompt instead of failing
    InstallPrompt,
    Failed(String),
}

impl From<std::result::Result<String, WalletError>> for ConnectOutcome {
    fn from(result: std::result::Result<String, WalletError>) -> Self {
        match result {
            Ok(address) => ConnectOutcome::Connected(address),
            Err(WalletError::Unavailable) => ConnectOutcome::InstallPrompt,
            Err(WalletError::Rejected { cause }) => ConnectOutcome::Failed(cause),
        }
    }
}

/// Requests an account from an optional provider
#[derive(Clone, Default)]
pub struct WalletConnector {
    provider: Option<Arc<dyn WalletProvider>>,
}

impl WalletConnector {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self { provider }
    }

    /// Connector with no provider installed
    pub fn unavailable() -> Self {
        Self { provider: None }
    }

    pub fn with_provider(provider: impl WalletProvider + 'static) -> Self {
        Self {
            provider: Some(Arc::new(provider)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// First account granted by the provider
    pub async fn request_account(&self) -> std::result::Result<String, WalletError> {
        let Some(provider) = &self.provider else {
            return Err(WalletError::Unavailable);
        };

        match provider.request_accounts().await {
            Ok(accounts) => accounts.into_iter().next().ok_or_else(|| WalletError::Rejected {
                cause: "provider returned no accounts".to_string(),
            }),
            Err(e) => Err(WalletError::Rejected {
                cause: e.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: [Value; 0],
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Vec<String>>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// EIP-1193 style provider reached over JSON-RPC (a local node or signer)
pub struct JsonRpcWalletProvider {
    http: reqwest::Client,
    url: String,
}

impl JsonRpcWalletProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_requestAccounts",
            params: [],
        };

        let response = self.http.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TrackerError::http(status.as_u16(), text));
        }

        let body: RpcResponse = response.json().await?;
        accounts_from_rpc(body)
    }
}

fn accounts_from_rpc(body: RpcResponse) -> Result<Vec<String>> {
    if let Some(err) = body.error {
        return Err(TrackerError::WalletRejected(format!(
            "{} (code {})",
            err.message, err.code
        )));
    }
    body.result
        .ok_or_else(|| TrackerError::MalformedResponse("JSON-RPC answer without result".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider(Result<Vec<String>>);

    #[async_trait]
    impl WalletProvider for FixedProvider {
        async fn request_accounts(&self) -> Result<Vec<String>> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_missing_provider_is_unavailable() {
        let connector = WalletConnector::unavailable();
        assert!(!connector.is_available());
        let result = connector.request_account().await;
        assert_eq!(result, Err(WalletError::Unavailable));
        assert_eq!(ConnectOutcome::from(result), ConnectOutcome::InstallPrompt);
    }

    #[tokio::test]
    async fn test_first_account_wins() {
        let connector = WalletConnector::with_provider(FixedProvider(Ok(vec![
            "0xaaa".to_string(),
            "0xbbb".to_string(),
        ])));
        assert_eq!(connector.request_account().await, Ok("0xaaa".to_string()));
    }

    #[tokio::test]
    async fn test_rejection_and_empty_list() {
        let connector = WalletConnector::with_provider(FixedProvider(Err(
            TrackerError::WalletRejected("User rejected the request.".into()),
        )));
        let result = connector.request_account().await;
        assert!(matches!(
            &result,
            Err(WalletError::Rejected { cause }) if cause.contains("User rejected")
        ));
        assert!(matches!(ConnectOutcome::from(result), ConnectOutcome::Failed(_)));

        let connector = WalletConnector::with_provider(FixedProvider(Ok(vec![])));
        assert!(matches!(
            connector.request_account().await,
            Err(WalletError::Rejected { .. })
        ));
    }

    #[test]
    fn test_rpc_body_handling() {
        let body: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":["0xabc"]}"#)
                .expect("rpc body should parse");
        assert_eq!(accounts_from_rpc(body).expect("accounts"), vec!["0xabc"]);

        let body: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":4001,"message":"User rejected"}}"#,
        )
        .expect("rpc error should parse");
        let err = accounts_from_rpc(body).unwrap_err();
        assert_eq!(err, TrackerError::WalletRejected("User rejected (code 4001)".into()));

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_requestAccounts",
            params: [],
        };
        let json = serde_json::to_string(&request).expect("request should serialize");
        assert_eq!(
            json,
            r#"{"jsonrpc":"2.0","id":1,"method":"eth_requestAccounts","params":[]}"#
        );
    }
}
