//! In-process gateway for synchronizer tests

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures::channel::oneshot;
use serde_json::{Value, json};

use crate::error::{Result, TrackerError};
use crate::gateway::MarketGateway;
use crate::types::{
    Account, Balance, ChartPoint, CoinQuote, ExchangeReceipt, ExchangeRequest, MarketOverview,
    Timestamp, Transaction,
};

/// Canned responses plus a call log; `gate` holds a call until released
pub struct FakeGateway {
    calls: Mutex<Vec<String>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    pub balance: Mutex<Result<Balance>>,
    pub transactions: Mutex<HashMap<String, Result<Vec<Transaction>>>>,
    pub overview: Mutex<Result<MarketOverview>>,
    pub quotes: Mutex<HashMap<String, Result<Option<CoinQuote>>>>,
    pub exchange: Mutex<Result<ExchangeReceipt>>,
    pub chart: Mutex<Result<Vec<ChartPoint>>>,
}

pub fn tx(id: &str, coin: &str, status: &str, wallet: Option<&str>) -> Transaction {
    Transaction {
        coin: coin.to_string(),
        transaction_amount: 1.5,
        transaction_id: id.to_string(),
        date: "2023-01-01T12:00:00".to_string(),
        status: status.to_string(),
        fees: 0.12,
        wallet: wallet.map(String::from),
    }
}

pub fn quote(price: f64) -> CoinQuote {
    CoinQuote {
        price,
        change_24h: 1.0,
    }
}

fn take<T: Clone>(slot: &Mutex<T>) -> T {
    slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

impl Default for FakeGateway {
    fn default() -> Self {
        let quotes = [
            ("bitcoin", 50_000.0),
            ("ethereum", 3_000.0),
            ("dogecoin", 0.1),
            ("cardano", 0.5),
        ]
        .into_iter()
        .map(|(id, price)| (id.to_string(), Ok(Some(quote(price)))))
        .collect();

        let transactions = HashMap::from([(
            "demo".to_string(),
            Ok(vec![tx("tx1", "BTC", "Completed", None)]),
        )]);

        Self {
            calls: Mutex::new(Vec::new()),
            gates: Mutex::new(HashMap::new()),
            balance: Mutex::new(Ok(Balance {
                total_balance_btc: 0.5,
                total_balance_usd: 26_000.0,
            })),
            transactions: Mutex::new(transactions),
            overview: Mutex::new(Ok(MarketOverview::default())),
            quotes: Mutex::new(quotes),
            exchange: Mutex::new(Ok(ExchangeReceipt {
                message: "Exchanged 1 BTC for USDT".to_string(),
            })),
            chart: Mutex::new(Ok(vec![ChartPoint {
                timestamp: Timestamp::Unix(0),
                price: 1.0,
            }])),
        }
    }
}

impl FakeGateway {
    /// Hold the next call named `call` until the returned sender fires
    pub fn gate(&self, call: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(call.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        take(&self.calls)
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn fetch_quote_entry(&self, coin_id: &str) -> Result<Option<CoinQuote>> {
        self.quotes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(coin_id)
            .cloned()
            .unwrap_or(Err(TrackerError::http(404, "unknown coin")))
    }

    async fn record(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call.clone());
        let gate = self
            .gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&call);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

#[async_trait]
impl MarketGateway for FakeGateway {
    async fn fetch_balance(&self) -> Result<Balance> {
        self.record("balance".to_string()).await;
        take(&self.balance)
    }

    async fn fetch_transactions(&self, account: &Account) -> Result<Vec<Transaction>> {
        self.record(format!("transactions:{account}")).await;
        self.transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account.as_query())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_market_overview(&self) -> Result<MarketOverview> {
        self.record("overview".to_string()).await;
        take(&self.overview)
    }

    async fn fetch_quote(&self, coin_id: &str) -> Result<Option<CoinQuote>> {
        self.record(format!("quote:{coin_id}")).await;
        self.fetch_quote_entry(coin_id)
    }

    async fn submit_exchange(&self, request: &ExchangeRequest) -> Result<ExchangeReceipt> {
        self.record(format!("exchange:{}", request.wallet_address)).await;
        take(&self.exchange)
    }

    async fn fetch_chart(&self) -> Result<Vec<ChartPoint>> {
        self.record("chart".to_string()).await;
        take(&self.chart)
    }

    async fn proxy_quote(&self, coin_id: &str) -> Result<Value> {
        self.record(format!("proxy:{coin_id}")).await;
        let quote = self.fetch_quote_entry(coin_id)?;
        Ok(quote.map_or_else(
            || json!({}),
            |q| json!({ coin_id: { "usd": q.price, "usd_24h_change": q.change_24h } }),
        ))
    }
}
