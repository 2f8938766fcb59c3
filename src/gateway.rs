//! Remote data gateway
//!
//! Wraps every outbound HTTP call the pages make:
//! - Backend reads (`/balance`, `/transactions`, `/market_overview`, `/chart`)
//! - Backend write (`/quick_exchange`)
//! - Quotes from the public price API, directly or through the proxy
//!
//! No caching and no retries: a failed call is reported once and the
//! caller decides what the page shows.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{Config, PriceSource};
use crate::error::{Result, TrackerError};
use crate::types::{
    Account, Balance, ChartPoint, CoinQuote, ExchangeReceipt, ExchangeRequest, MarketOverview,
    Transaction,
};

/// Data access the synchronizers depend on
#[async_trait]
pub trait MarketGateway: Send + Sync {
    async fn fetch_balance(&self) -> Result<Balance>;
    async fn fetch_transactions(&self, account: &Account) -> Result<Vec<Transaction>>;
    async fn fetch_market_overview(&self) -> Result<MarketOverview>;
    /// `Ok(None)` when the price API has no entry for `coin_id`
    async fn fetch_quote(&self, coin_id: &str) -> Result<Option<CoinQuote>>;
    async fn submit_exchange(&self, request: &ExchangeRequest) -> Result<ExchangeReceipt>;
    async fn fetch_chart(&self) -> Result<Vec<ChartPoint>>;
    /// Upstream price JSON for `coin_id`, passed through untouched
    async fn proxy_quote(&self, coin_id: &str) -> Result<Value>;
}

/// Per-coin entry of the simple price endpoint
#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: f64,
    #[serde(default)]
    usd_24h_change: Option<f64>,
}

/// HTTP implementation of [`MarketGateway`]
#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    api_base_url: String,
    price_api_url: String,
    proxy_base_url: String,
    price_source: PriceSource,
}

impl HttpGateway {
    /// Create gateway from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: config.api_base_url.clone(),
            price_api_url: config.price_api_url.clone(),
            proxy_base_url: config.proxy_base_url.clone(),
            price_source: config.price_source,
        }
    }

    /// Quote URL for `coin_id` under the configured price source
    pub fn quote_url(&self, coin_id: &str) -> Result<Url> {
        match self.price_source {
            PriceSource::Direct => self.upstream_quote_url(coin_id),
            PriceSource::Proxy => parse_url(
                &format!("{}/api/coingecko", self.proxy_base_url),
                &[("coinId", coin_id)],
            ),
        }
    }

    fn upstream_quote_url(&self, coin_id: &str) -> Result<Url> {
        parse_url(
            &format!("{}/simple/price", self.price_api_url),
            &[
                ("ids", coin_id),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ],
        )
    }

    fn backend_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        parse_url(&format!("{}{path}", self.api_base_url), params)
    }

    /// Perform GET request and decode the JSON body
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        log::debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Perform POST request with a JSON body
    pub async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        log::debug!("POST {url}");
        let response = self.http.post(url).json(body).send().await?;

        Self::handle_response(response).await
    }

    /// Handle response, checking status before decoding
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(TrackerError::http(status.as_u16(), error_text));
        }

        response.json().await.map_err(TrackerError::from)
    }
}

#[async_trait]
impl MarketGateway for HttpGateway {
    async fn fetch_balance(&self) -> Result<Balance> {
        let url = self.backend_url("/balance", &[])?;
        self.fetch_json(url).await
    }

    async fn fetch_transactions(&self, account: &Account) -> Result<Vec<Transaction>> {
        let url = self.backend_url("/transactions", &[("wallet_address", account.as_query())])?;
        let body: Value = self.fetch_json(url).await?;
        normalize_list(body, "transactions")
    }

    async fn fetch_market_overview(&self) -> Result<MarketOverview> {
        let url = self.backend_url("/market_overview", &[])?;
        self.fetch_json(url).await
    }

    async fn fetch_quote(&self, coin_id: &str) -> Result<Option<CoinQuote>> {
        let url = self.quote_url(coin_id)?;
        let body: Value = self.fetch_json(url).await?;
        quote_from_response(body, coin_id)
    }

    async fn submit_exchange(&self, request: &ExchangeRequest) -> Result<ExchangeReceipt> {
        let url = self.backend_url("/quick_exchange", &[])?;
        self.post_json(url, request).await
    }

    async fn fetch_chart(&self) -> Result<Vec<ChartPoint>> {
        let url = self.backend_url("/chart", &[])?;
        let body: Value = self.fetch_json(url).await?;
        normalize_list(body, "points")
    }

    async fn proxy_quote(&self, coin_id: &str) -> Result<Value> {
        // Upstream URL even in proxy mode
        let url = self.upstream_quote_url(coin_id)?;
        self.fetch_json(url).await
    }
}

fn parse_url(base: &str, params: &[(&str, &str)]) -> Result<Url> {
    let url = if params.is_empty() {
        Url::parse(base)
    } else {
        Url::parse_with_params(base, params)
    };
    url.map_err(|e| TrackerError::Config(format!("invalid URL '{base}': {e}")))
}

/// Accept a bare array or an object wrapping the array under `field`.
///
/// An object without `field` (or with `null` there) is an empty list.
pub fn normalize_list<T: DeserializeOwned>(body: Value, field: &str) -> Result<Vec<T>> {
    let items = match body {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Null) | None => return Ok(Vec::new()),
            Some(inner @ Value::Array(_)) => inner,
            Some(other) => {
                return Err(TrackerError::MalformedResponse(format!(
                    "'{field}' is not an array: {other}"
                )));
            }
        },
        other => {
            return Err(TrackerError::MalformedResponse(format!(
                "expected array or object, got {other}"
            )));
        }
    };

    serde_json::from_value(items).map_err(|e| TrackerError::MalformedResponse(e.to_string()))
}

/// Pick `coin_id` out of a `{ id: { usd, usd_24h_change } }` body
pub fn quote_from_response(body: Value, coin_id: &str) -> Result<Option<CoinQuote>> {
    let mut prices: HashMap<String, SimplePrice> = serde_json::from_value(body)
        .map_err(|e| TrackerError::MalformedResponse(e.to_string()))?;

    Ok(prices.remove(coin_id).map(|entry| CoinQuote {
        price: entry.usd,
        change_24h: entry.usd_24h_change.unwrap_or(0.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tx(id: &str) -> Value {
        json!({
            "coin": "BTC",
            "transaction_amount": 0.5,
            "transaction_id": id,
            "date": "2023-01-01T12:00:00",
            "status": "Completed",
            "fees": 0.12
        })
    }

    #[test]
    fn test_normalize_wrapped_list() {
        let body = json!({ "transactions": [tx("tx1"), tx("tx2")] });
        let list: Vec<Transaction> = normalize_list(body, "transactions").expect("wrapped list");
        let ids: Vec<_> = list.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["tx1", "tx2"]);
    }

    #[test]
    fn test_normalize_bare_list() {
        let body = json!([tx("tx1"), tx("tx2"), tx("tx3")]);
        let expected: Vec<Transaction> =
            serde_json::from_value(body.clone()).expect("fixture should parse");
        let list: Vec<Transaction> = normalize_list(body, "transactions").expect("bare list");
        assert_eq!(list, expected);
    }

    #[test]
    fn test_normalize_missing_field_is_empty() {
        let list: Vec<Transaction> =
            normalize_list(json!({ "message": "nothing" }), "transactions").expect("empty list");
        assert!(list.is_empty());

        let list: Vec<Transaction> =
            normalize_list(json!({ "transactions": null }), "transactions").expect("empty list");
        assert!(list.is_empty());
    }

    #[test]
    fn test_normalize_rejects_other_shapes() {
        let err = normalize_list::<Transaction>(json!("oops"), "transactions").unwrap_err();
        assert!(matches!(err, TrackerError::MalformedResponse(_)));

        let err =
            normalize_list::<Transaction>(json!({ "transactions": 3 }), "transactions").unwrap_err();
        assert!(matches!(err, TrackerError::MalformedResponse(_)));

        let err = normalize_list::<Transaction>(json!([{ "coin": "BTC" }]), "transactions")
            .unwrap_err();
        assert!(matches!(err, TrackerError::MalformedResponse(_)));
    }

    #[test]
    fn test_quote_from_response() {
        let body = json!({ "bitcoin": { "usd": 52291.0, "usd_24h_change": -1.25 } });
        let quote = quote_from_response(body, "bitcoin").expect("quote should parse");
        assert_eq!(
            quote,
            Some(CoinQuote {
                price: 52291.0,
                change_24h: -1.25
            })
        );

        let body = json!({ "ethereum": { "usd": 3000.0 } });
        assert_eq!(quote_from_response(body.clone(), "bitcoin").expect("parse"), None);
        let quote = quote_from_response(body, "ethereum").expect("parse");
        assert_eq!(quote.map(|q| q.change_24h), Some(0.0));

        assert!(quote_from_response(json!([1, 2]), "bitcoin").is_err());
    }

    #[test]
    fn test_quote_urls() {
        let mut config = Config::from_lookup(|_| None);
        let gateway = HttpGateway::new(&config);
        let url = gateway.quote_url("bitcoin").expect("direct url");
        assert_eq!(
            url.as_str(),
            "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd&include_24hr_change=true"
        );

        config.price_source = PriceSource::Proxy;
        let gateway = HttpGateway::new(&config);
        let url = gateway.quote_url("dogecoin").expect("proxy url");
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/api/coingecko?coinId=dogecoin");
    }

    #[test]
    fn test_backend_urls() {
        let gateway = HttpGateway::new(&Config::from_lookup(|_| None));
        let url = gateway
            .backend_url("/transactions", &[("wallet_address", "0xabc")])
            .expect("backend url");
        assert_eq!(url.as_str(), "http://localhost:8000/transactions?wallet_address=0xabc");
        assert_eq!(
            gateway.backend_url("/balance", &[]).expect("backend url").as_str(),
            "http://localhost:8000/balance"
        );
    }
}
