//! Portfolio page: quote for the selected symbol and the market overview

use std::sync::{Arc, Mutex};

use crate::chart::ChartKind;
use crate::error::TrackerError;
use crate::gateway::MarketGateway;
use crate::notify::Notifier;
use crate::types::{ChartSymbol, CoinQuote, MarketOverview};

use super::{LoadState, PageStatus, Source, lock};

#[derive(Debug, Default)]
struct PortfolioState {
    mounted: bool,
    symbol: ChartSymbol,
    chart_kind: ChartKind,
    overview: Source<(), MarketOverview>,
    quote: Source<ChartSymbol, Option<CoinQuote>>,
}

/// Everything the portfolio page renders
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioView {
    pub status: PageStatus,
    pub symbol: ChartSymbol,
    pub chart_kind: ChartKind,
    pub overview: LoadState<MarketOverview>,
    /// Always belongs to `symbol`; `Resolved(None)` means no quote for it
    pub quote: LoadState<Option<CoinQuote>>,
}

/// Portfolio synchronizer; clones share state
#[derive(Clone)]
pub struct PortfolioSync {
    gateway: Arc<dyn MarketGateway>,
    notifier: Notifier,
    state: Arc<Mutex<PortfolioState>>,
}

impl PortfolioSync {
    pub fn new(gateway: Arc<dyn MarketGateway>, notifier: Notifier) -> Self {
        Self {
            gateway,
            notifier,
            state: Arc::new(Mutex::new(PortfolioState::default())),
        }
    }

    /// Fetch the overview and the quote for the current symbol in parallel
    pub async fn mount(&self) {
        let symbol = {
            let mut state = lock(&self.state);
            state.mounted = true;
            state.symbol.clone()
        };
        futures::join!(self.load_overview(), self.load_quote(symbol));
    }

    /// Page visit: mount when needed (first visit or a failed source), else
    /// treat `symbol` as a selection
    pub async fn visit(&self, symbol: Option<ChartSymbol>) {
        let needs_mount = {
            let mut state = lock(&self.state);
            let needs = !state.mounted
                || state.overview.state().error().is_some()
                || state.quote.state().error().is_some();
            if needs {
                if let Some(symbol) = &symbol {
                    state.symbol = symbol.clone();
                }
            }
            needs
        };
        if needs_mount {
            self.mount().await;
        } else if let Some(symbol) = symbol {
            self.select_symbol(symbol).await;
        }
    }

    /// Switch symbol; the quote refetches and earlier answers are dropped
    pub async fn select_symbol(&self, symbol: ChartSymbol) {
        let unchanged = {
            let mut state = lock(&self.state);
            let unchanged = state.symbol == symbol
                && state.quote.key() == Some(&symbol)
                && state.quote.state().error().is_none();
            state.symbol = symbol.clone();
            unchanged
        };
        if !unchanged {
            self.load_quote(symbol).await;
        }
    }

    pub fn set_chart_kind(&self, kind: ChartKind) {
        lock(&self.state).chart_kind = kind;
    }

    pub fn symbol(&self) -> ChartSymbol {
        lock(&self.state).symbol.clone()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn snapshot(&self) -> PortfolioView {
        let state = lock(&self.state);
        let overview = state.overview.state().clone();
        let quote = state.quote.state().clone();
        let status = if overview.is_loading() || quote.is_loading() {
            PageStatus::Loading
        } else if overview.data().is_none() && quote.data().and_then(Option::as_ref).is_none() {
            PageStatus::Unavailable
        } else {
            PageStatus::Ready
        };
        PortfolioView {
            status,
            symbol: state.symbol.clone(),
            chart_kind: state.chart_kind,
            overview,
            quote,
        }
    }

    async fn load_overview(&self) {
        let ticket = lock(&self.state).overview.begin(());
        let result = self.gateway.fetch_market_overview().await;
        if let Err(e) = &result {
            log::warn!("market overview fetch failed: {e}");
        }
        let failed = result.is_err();
        if lock(&self.state).overview.resolve(&ticket, result).is_current() && failed {
            self.notifier.error(TrackerError::user_message("market overview"));
        }
    }

    async fn load_quote(&self, symbol: ChartSymbol) {
        let Some(coin_id) = symbol.coin_id() else {
            log::debug!("{symbol} has no price id, skipping quote");
            lock(&self.state).quote.resolve_now(symbol, None);
            return;
        };
        let ticket = lock(&self.state).quote.begin(symbol);
        let result = self.gateway.fetch_quote(coin_id).await;
        if let Err(e) = &result {
            log::warn!("quote fetch failed for {coin_id}: {e}");
        }
        let failed = result.is_err();
        if lock(&self.state).quote.resolve(&ticket, result).is_current() && failed {
            self.notifier.error(TrackerError::user_message("coin data"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::fake::{FakeGateway, quote};

    fn setup() -> (Arc<FakeGateway>, PortfolioSync) {
        let gateway = Arc::new(FakeGateway::default());
        let sync = PortfolioSync::new(gateway.clone(), Notifier::new());
        (gateway, sync)
    }

    fn price(view: &PortfolioView) -> Option<f64> {
        view.quote.data().copied().flatten().map(|q| q.price)
    }

    #[tokio::test]
    async fn test_mount_fetches_overview_and_default_quote() {
        let (gateway, sync) = setup();
        assert_eq!(sync.snapshot().status, PageStatus::Loading);

        sync.mount().await;
        let view = sync.snapshot();
        assert_eq!(view.status, PageStatus::Ready);
        assert_eq!(view.symbol.as_str(), "BTCUSDT");
        assert_eq!(price(&view), Some(50_000.0));
        assert_eq!(gateway.calls(), vec!["overview", "quote:bitcoin"]);
    }

    #[tokio::test]
    async fn test_each_mapped_symbol_fetches_once() {
        let (gateway, sync) = setup();
        for (symbol, id) in [
            ("BTCUSDT", "bitcoin"),
            ("ETHUSDT", "ethereum"),
            ("DOGEUSDT", "dogecoin"),
            ("ADAUSDT", "cardano"),
        ] {
            sync.select_symbol(ChartSymbol::new(symbol)).await;
            assert_eq!(gateway.count(&format!("quote:{id}")), 1, "{symbol}");
        }
        // Reselecting the settled symbol is not a change
        sync.select_symbol(ChartSymbol::new("ADAUSDT")).await;
        assert_eq!(gateway.count("quote:cardano"), 1);
    }

    #[tokio::test]
    async fn test_first_visit_with_symbol_fetches_once() {
        let (gateway, sync) = setup();
        sync.visit(Some(ChartSymbol::new("ethusdt"))).await;
        assert_eq!(gateway.calls(), vec!["overview", "quote:ethereum"]);
        assert_eq!(price(&sync.snapshot()), Some(3_000.0));

        sync.visit(None).await;
        sync.visit(Some(ChartSymbol::new("ETHUSDT"))).await;
        assert_eq!(gateway.calls().len(), 2);

        sync.visit(Some(ChartSymbol::new("ADAUSDT"))).await;
        assert_eq!(gateway.calls(), vec!["overview", "quote:ethereum", "quote:cardano"]);
    }

    #[tokio::test]
    async fn test_unmapped_symbol_skips_network() {
        let (gateway, sync) = setup();
        sync.select_symbol(ChartSymbol::new("SOLUSDT")).await;
        let view = sync.snapshot();
        assert_eq!(view.quote, LoadState::Resolved(None));
        assert_eq!(gateway.count("quote"), 0);
    }

    #[tokio::test]
    async fn test_latest_symbol_wins_when_it_answers_first() {
        let (gateway, sync) = setup();
        let release_eth = gateway.gate("quote:ethereum");
        let release_doge = gateway.gate("quote:dogecoin");

        let release = async {
            let _ = release_doge.send(());
            tokio::task::yield_now().await;
            let _ = release_eth.send(());
        };
        futures::join!(
            sync.select_symbol(ChartSymbol::new("ETHUSDT")),
            sync.select_symbol(ChartSymbol::new("DOGEUSDT")),
            release
        );

        let view = sync.snapshot();
        assert_eq!(view.symbol.as_str(), "DOGEUSDT");
        assert_eq!(price(&view), Some(0.1));
    }

    #[tokio::test]
    async fn test_latest_symbol_wins_when_it_answers_last() {
        let (gateway, sync) = setup();
        let release_eth = gateway.gate("quote:ethereum");
        let release_doge = gateway.gate("quote:dogecoin");

        let observed = Mutex::new(Vec::new());
        let release = async {
            let _ = release_eth.send(());
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            // ETH answered but must not show under DOGE
            observed
                .lock()
                .expect("lock")
                .push(sync.snapshot());
            let _ = release_doge.send(());
        };
        futures::join!(
            sync.select_symbol(ChartSymbol::new("ETHUSDT")),
            sync.select_symbol(ChartSymbol::new("DOGEUSDT")),
            release
        );

        let interim = observed.into_inner().expect("lock").remove(0);
        assert_eq!(interim.symbol.as_str(), "DOGEUSDT");
        assert_eq!(interim.quote, LoadState::Loading);
        assert_eq!(interim.status, PageStatus::Loading);

        assert_eq!(price(&sync.snapshot()), Some(0.1));
    }

    #[tokio::test]
    async fn test_quote_failure_keeps_overview() {
        let (gateway, sync) = setup();
        gateway
            .quotes
            .lock()
            .expect("lock")
            .insert("bitcoin".into(), Err(TrackerError::http(429, "rate limited")));

        sync.mount().await;
        let view = sync.snapshot();
        assert_eq!(view.status, PageStatus::Ready);
        assert!(view.quote.error().is_some());
        assert!(view.overview.data().is_some());
        let notices = sync.notifier().drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].text, "Failed to load coin data.");
    }

    #[tokio::test]
    async fn test_both_core_sources_failing_is_unavailable() {
        let (gateway, sync) = setup();
        *gateway.overview.lock().expect("lock") = Err(TrackerError::http(500, "down"));
        gateway
            .quotes
            .lock()
            .expect("lock")
            .insert("bitcoin".into(), Err(TrackerError::http(500, "down")));

        sync.mount().await;
        assert_eq!(sync.snapshot().status, PageStatus::Unavailable);

        // A working symbol brings the page back
        gateway
            .quotes
            .lock()
            .expect("lock")
            .insert("ethereum".into(), Ok(Some(quote(2_500.0))));
        sync.select_symbol(ChartSymbol::new("ETHUSDT")).await;
        assert_eq!(sync.snapshot().status, PageStatus::Ready);
    }

    #[tokio::test]
    async fn test_reselecting_failed_symbol_retries() {
        let (gateway, sync) = setup();
        gateway
            .quotes
            .lock()
            .expect("lock")
            .insert("ethereum".into(), Err(TrackerError::http(429, "rate limited")));
        sync.select_symbol(ChartSymbol::new("ETHUSDT")).await;
        assert!(sync.snapshot().quote.error().is_some());

        gateway
            .quotes
            .lock()
            .expect("lock")
            .insert("ethereum".into(), Ok(Some(quote(3_100.0))));
        sync.select_symbol(ChartSymbol::new("ETHUSDT")).await;
        assert_eq!(gateway.count("quote:ethereum"), 2);
        assert_eq!(price(&sync.snapshot()), Some(3_100.0));
    }

    #[test]
    fn test_chart_kind_is_local() {
        let (gateway, sync) = setup();
        sync.set_chart_kind(ChartKind::Change);
        assert_eq!(sync.snapshot().chart_kind, ChartKind::Change);
        assert!(gateway.calls().is_empty());
    }
}
