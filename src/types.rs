//! Common types for the dashboard
//!
//! Shapes returned by the backend and the price API, plus the small
//! closed sets (coins, chart symbols) the pages pick from.

use serde::{Deserialize, Deserializer, Serialize};

/// Account used to scope transaction and balance requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Account {
    /// No wallet connected
    #[default]
    Demo,
    /// Connected wallet address
    Wallet(String),
}

impl Account {
    /// Value sent as `wallet_address`
    pub fn as_query(&self) -> &str {
        match self {
            Account::Demo => "demo",
            Account::Wallet(address) => address,
        }
    }

    /// Parse a query value; empty or `demo` means the demo account
    pub fn from_query(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("demo") {
            Account::Demo
        } else {
            Account::Wallet(value.to_string())
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Account::Wallet(_))
    }

    /// `0x1234...abcd` style label
    pub fn short_label(&self) -> String {
        match self {
            Account::Demo => "Demo Account".to_string(),
            Account::Wallet(address) => shorten_address(address),
        }
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Keep the first 6 and last 4 characters of an address
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Balance snapshot from `/balance`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub total_balance_btc: f64,
    pub total_balance_usd: f64,
}

/// A transaction row from `/transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub coin: String,
    pub transaction_amount: f64,
    pub transaction_id: String,
    pub date: String,
    pub status: String,
    pub fees: f64,
    /// Owning wallet, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
}

/// Top mover entry of the market overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainerLoser {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub change_24h: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
}

/// Market overview from `/market_overview`; `None` means unknown, not an error
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketOverview {
    #[serde(default)]
    pub top_gainer: Option<GainerLoser>,
    #[serde(default)]
    pub top_loser: Option<GainerLoser>,
}

/// Live quote for the selected symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinQuote {
    pub price: f64,
    pub change_24h: f64,
}

/// Coins offered by the quick exchange form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExchangeCoin {
    Btc,
    Eth,
    Usdt,
}

impl ExchangeCoin {
    pub const ALL: [ExchangeCoin; 3] = [ExchangeCoin::Btc, ExchangeCoin::Eth, ExchangeCoin::Usdt];

    pub fn as_str(self) -> &'static str {
        match self {
            ExchangeCoin::Btc => "BTC",
            ExchangeCoin::Eth => "ETH",
            ExchangeCoin::Usdt => "USDT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl std::fmt::Display for ExchangeCoin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /quick_exchange`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub wallet_address: String,
    #[serde(rename = "haveCoin")]
    pub have_coin: ExchangeCoin,
    #[serde(rename = "haveAmount")]
    pub have_amount: f64,
    #[serde(rename = "wantCoin")]
    pub want_coin: ExchangeCoin,
}

/// Answer of `POST /quick_exchange`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeReceipt {
    pub message: String,
}

/// Point timestamp from `/chart`, either epoch seconds or text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Unix(i64),
    Text(String),
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timestamp::Unix(secs) => match chrono::DateTime::from_timestamp(*secs, 0) {
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
                None => write!(f, "{secs}"),
            },
            Timestamp::Text(text) => f.write_str(text),
        }
    }
}

/// One point of the `/chart` price history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: Timestamp,
    pub price: f64,
}

/// Chart symbol to price-API coin id
const SYMBOL_COIN_IDS: [(&str, &str, &str); 4] = [
    ("BTCUSDT", "bitcoin", "Bitcoin (BTC)"),
    ("ETHUSDT", "ethereum", "Ethereum (ETH)"),
    ("DOGEUSDT", "dogecoin", "Dogecoin (DOGE)"),
    ("ADAUSDT", "cardano", "Cardano (ADA)"),
];

/// Trading-pair symbol shown by the chart widget (e.g. `BTCUSDT`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartSymbol(String);

impl ChartSymbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Price-API id for this symbol, `None` when unmapped
    pub fn coin_id(&self) -> Option<&'static str> {
        SYMBOL_COIN_IDS
            .iter()
            .find(|(symbol, _, _)| *symbol == self.0)
            .map(|(_, id, _)| *id)
    }

    /// Human label for pickers; unmapped symbols show as-is
    pub fn label(&self) -> String {
        SYMBOL_COIN_IDS
            .iter()
            .find(|(symbol, _, _)| *symbol == self.0)
            .map_or_else(|| self.0.clone(), |(_, _, label)| (*label).to_string())
    }

    /// Every symbol with a known coin id
    pub fn supported() -> impl Iterator<Item = ChartSymbol> {
        SYMBOL_COIN_IDS.iter().map(|(symbol, _, _)| ChartSymbol::new(*symbol))
    }
}

impl Default for ChartSymbol {
    fn default() -> Self {
        ChartSymbol::new("BTCUSDT")
    }
}

impl std::fmt::Display for ChartSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coins selectable on the dashboard market chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Coin {
    #[default]
    Btc,
    Eth,
    Doge,
    Ada,
}

impl Coin {
    pub const ALL: [Coin; 4] = [Coin::Btc, Coin::Eth, Coin::Doge, Coin::Ada];

    pub fn as_str(self) -> &'static str {
        match self {
            Coin::Btc => "BTC",
            Coin::Eth => "ETH",
            Coin::Doge => "DOGE",
            Coin::Ada => "ADA",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value.trim()))
    }

    /// Chart pair for this coin
    pub fn chart_symbol(self) -> ChartSymbol {
        ChartSymbol::new(format!("{}USDT", self.as_str()))
    }

    /// Exchange form coin, when the form offers it
    pub fn exchange_coin(self) -> Option<ExchangeCoin> {
        ExchangeCoin::parse(self.as_str())
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}
