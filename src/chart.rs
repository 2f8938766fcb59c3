//! Embedded price chart
//!
//! The chart itself is drawn by a third-party widget script. This module
//! owns what we control: the widget configuration, a one-shot readiness
//! signal for the script, and a summary of the backend price history.

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;

use crate::error::{Result, TrackerError};
use crate::types::{ChartPoint, ChartSymbol};

/// Chart flavour picked on the portfolio page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Price,
    Change,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::Price, ChartKind::Change];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Price => "price",
            ChartKind::Change => "change",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Price => "Price Chart",
            ChartKind::Change => "24h Change",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == value.trim())
    }

    /// Candle interval handed to the widget
    pub fn interval(self) -> &'static str {
        match self {
            ChartKind::Price => "60",
            ChartKind::Change => "D",
        }
    }
}

/// Options passed to the widget constructor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetConfig {
    pub container_id: String,
    pub width: &'static str,
    pub height: u32,
    pub symbol: String,
    pub interval: &'static str,
    pub timezone: &'static str,
    pub theme: &'static str,
    pub style: &'static str,
    pub locale: &'static str,
    pub toolbar_bg: &'static str,
    pub hide_side_toolbar: bool,
    pub allow_symbol_change: bool,
    pub withdateranges: bool,
    pub enable_publishing: bool,
}

impl WidgetConfig {
    pub fn new(symbol: &ChartSymbol, kind: ChartKind) -> Self {
        Self {
            container_id: container_id(symbol, kind),
            width: "100%",
            height: 400,
            symbol: format!("BINANCE:{symbol}"),
            interval: kind.interval(),
            timezone: "Etc/UTC",
            theme: "dark",
            style: "1",
            locale: "en",
            toolbar_bg: "#f1f3f6",
            hide_side_toolbar: false,
            allow_symbol_change: true,
            withdateranges: true,
            enable_publishing: false,
        }
    }
}

/// Container id unique per symbol and kind
pub fn container_id(symbol: &ChartSymbol, kind: ChartKind) -> String {
    let clean: String = symbol
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    format!("tv_chart_container_{clean}_{}", kind.as_str())
}

type ReadyFuture = Shared<BoxFuture<'static, Result<()>>>;

/// Awaitable readiness of the widget script; clones observe the same outcome
#[derive(Clone)]
pub struct ReadySignal {
    inner: ReadyFuture,
}

/// Completes a [`ReadySignal`]; consumed on use so it fires at most once
pub struct ReadyResolver {
    tx: oneshot::Sender<Result<()>>,
}

/// Create a connected resolver/signal pair
pub fn ready_pair() -> (ReadyResolver, ReadySignal) {
    let (tx, rx) = oneshot::channel::<Result<()>>();
    let inner = rx
        .map(|outcome| {
            outcome.unwrap_or_else(|_| {
                Err(TrackerError::Chart(
                    "script loader dropped before completing".into(),
                ))
            })
        })
        .boxed()
        .shared();
    (ReadyResolver { tx }, ReadySignal { inner })
}

impl ReadyResolver {
    pub fn resolve(self, outcome: Result<()>) {
        // Nobody listening is fine: the signal was dropped with its page
        let _ = self.tx.send(outcome);
    }
}

impl ReadySignal {
    /// Wait until the script has loaded or failed
    pub async fn wait(&self) -> Result<()> {
        self.inner.clone().await
    }

    /// Outcome if already known, without waiting
    pub fn try_ready(&self) -> Option<Result<()>> {
        self.inner.clone().now_or_never()
    }
}

/// What the page should show in the chart slot
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedState {
    Pending,
    Ready(WidgetConfig),
    Unavailable(String),
}

/// Widget script plus its readiness
#[derive(Clone)]
pub struct ChartEmbed {
    script_url: String,
    ready: ReadySignal,
}

impl ChartEmbed {
    pub fn new(script_url: impl Into<String>, ready: ReadySignal) -> Self {
        Self {
            script_url: script_url.into(),
            ready,
        }
    }

    pub fn script_url(&self) -> &str {
        &self.script_url
    }

    pub fn ready(&self) -> &ReadySignal {
        &self.ready
    }

    /// Widget state for `symbol`, built fresh on every call
    pub fn state_for(&self, symbol: &ChartSymbol, kind: ChartKind) -> EmbedState {
        match self.ready.try_ready() {
            None => EmbedState::Pending,
            Some(Ok(())) => EmbedState::Ready(WidgetConfig::new(symbol, kind)),
            Some(Err(e)) => EmbedState::Unavailable(e.to_string()),
        }
    }
}

/// Fetch the widget script once and resolve readiness with the outcome
pub async fn load_script(http: reqwest::Client, url: String, resolver: ReadyResolver) {
    let outcome = match http.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            log::info!("chart script available at {url}");
            Ok(())
        }
        Ok(response) => Err(TrackerError::Chart(format!(
            "script answered HTTP {}",
            response.status()
        ))),
        Err(e) => Err(TrackerError::Chart(e.to_string())),
    };
    if let Err(e) = &outcome {
        log::warn!("Failed to load chart script: {e}");
    }
    resolver.resolve(outcome);
}

/// First/last/min/max of a price history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySummary {
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
}

impl HistorySummary {
    /// `None` for an empty history
    pub fn from_points(points: &[ChartPoint]) -> Option<Self> {
        let first = points.first()?.price;
        let last = points.last()?.price;
        let (min, max) = points
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.price), hi.max(p.price)));
        Some(Self {
            first,
            last,
            min,
            max,
        })
    }

    /// Percent change from first to last point
    pub fn change_percent(&self) -> f64 {
        if self.first == 0.0 {
            0.0
        } else {
            (self.last - self.first) / self.first * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;

    #[test]
    fn test_widget_config() {
        let symbol = ChartSymbol::new("ETHUSDT");
        let config = WidgetConfig::new(&symbol, ChartKind::Change);
        assert_eq!(config.container_id, "tv_chart_container_ETHUSDT_change");
        assert_eq!(config.symbol, "BINANCE:ETHUSDT");
        assert_eq!(config.interval, "D");
        assert_eq!(WidgetConfig::new(&symbol, ChartKind::Price).interval, "60");

        let json = serde_json::to_value(&config).expect("config should serialize");
        assert_eq!(json["container_id"], "tv_chart_container_ETHUSDT_change");
        assert_eq!(json["height"], 400);
    }

    #[test]
    fn test_container_id_strips_symbols() {
        let symbol = ChartSymbol::new("BTC/USDT-PERP");
        assert_eq!(
            container_id(&symbol, ChartKind::Price),
            "tv_chart_container_BTCUSDTPERP_price"
        );
    }

    #[tokio::test]
    async fn test_ready_signal_resolves_once_for_all_clones() {
        let (resolver, signal) = ready_pair();
        let other = signal.clone();
        assert!(signal.try_ready().is_none());

        resolver.resolve(Ok(()));
        assert_eq!(signal.wait().await, Ok(()));
        assert_eq!(other.try_ready(), Some(Ok(())));
    }

    #[tokio::test]
    async fn test_dropped_resolver_is_error() {
        let (resolver, signal) = ready_pair();
        drop(resolver);
        assert!(matches!(signal.wait().await, Err(TrackerError::Chart(_))));
    }

    #[test]
    fn test_embed_states() {
        let symbol = ChartSymbol::default();
        let (resolver, signal) = ready_pair();
        let embed = ChartEmbed::new("https://example.test/tv.js", signal);
        assert_eq!(embed.state_for(&symbol, ChartKind::Price), EmbedState::Pending);

        resolver.resolve(Err(TrackerError::Chart("blocked".into())));
        assert!(matches!(
            embed.state_for(&symbol, ChartKind::Price),
            EmbedState::Unavailable(_)
        ));
    }

    #[test]
    fn test_history_summary() {
        let points: Vec<ChartPoint> = [40000.0, 38000.0, 37000.0, 35000.0, 34000.0, 36000.0, 35352.0]
            .into_iter()
            .enumerate()
            .map(|(i, price)| ChartPoint {
                timestamp: Timestamp::Unix(i64::try_from(i).unwrap_or_default()),
                price,
            })
            .collect();
        let summary = HistorySummary::from_points(&points).expect("non-empty history");
        assert_eq!(summary.min, 34000.0);
        assert_eq!(summary.max, 40000.0);
        assert!((summary.change_percent() - (-11.62)).abs() < 0.01);
        assert!(HistorySummary::from_points(&[]).is_none());
    }
}
