//! HTTP surface: rendered pages, form actions and the price proxy

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Form, Query, State},
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::chart::{ChartEmbed, ChartKind};
use crate::config::Config;
use crate::dashboard::{
    Chrome, render_dashboard, render_portfolio, render_settings, render_transactions,
};
use crate::error::{Result, TrackerError};
use crate::gateway::MarketGateway;
use crate::notify::Notifier;
use crate::settings::{Language, Settings, SettingsStore};
use crate::sync::{DashboardSync, ExchangeForm, PortfolioSync, TransactionsSync};
use crate::types::{Account, ChartSymbol, Coin, ExchangeCoin};
use crate::wallet::{ConnectOutcome, WalletConnector};

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    gateway: Arc<dyn MarketGateway>,
    wallet: WalletConnector,
    settings: Arc<SettingsStore>,
    chart: ChartEmbed,
    notifier: Notifier,
    dashboard: DashboardSync,
    portfolio: PortfolioSync,
    transactions: TransactionsSync,
}

impl AppState {
    pub fn new(
        config: Config,
        gateway: Arc<dyn MarketGateway>,
        wallet: WalletConnector,
        settings: SettingsStore,
        chart: ChartEmbed,
    ) -> Self {
        let notifier = Notifier::new();
        Self {
            dashboard: DashboardSync::new(gateway.clone(), wallet.clone(), notifier.clone()),
            portfolio: PortfolioSync::new(gateway.clone(), notifier.clone()),
            transactions: TransactionsSync::new(gateway.clone(), notifier.clone()),
            config: Arc::new(config),
            gateway,
            wallet,
            settings: Arc::new(settings),
            chart,
            notifier,
        }
    }

    /// Theme and pending toasts for the next rendered page
    fn chrome(&self, with_chart: bool) -> Chrome {
        Chrome {
            dark_mode: self.settings.dark_mode(),
            notices: self.notifier.drain(),
            chart_script: with_chart.then(|| self.chart.script_url().to_string()),
        }
    }
}

/// CORS from the configured origins; none configured allows any origin
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    if allowed_origins.is_empty() {
        log::warn!("CORS: allowing all origins. Set ALLOWED_ORIGINS to restrict.");
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| TrackerError::Config(format!("invalid CORS origin '{origin}': {e}")))
        })
        .collect::<Result<Vec<_>>>()?;
    log::info!("CORS configured for origins: {}", allowed_origins.join(","));
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Build the application router
pub fn router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config.allowed_origins)?;
    Ok(Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/health", get(health))
        // Dashboard
        .route("/dashboard", get(dashboard_page))
        .route("/dashboard/coin", post(select_coin))
        .route("/dashboard/connect", post(connect_dashboard_wallet))
        .route("/dashboard/install/dismiss", post(dismiss_install))
        .route("/dashboard/exchange", post(submit_exchange))
        // Other pages
        .route("/portfolio", get(portfolio_page))
        .route("/transactions", get(transactions_page))
        .route("/settings", get(settings_page).post(save_settings))
        .route("/settings/connect", post(connect_settings_wallet))
        // Price proxy
        .route("/api/coingecko", get(price_proxy))
        .layer(cors)
        .with_state(state))
}

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.bind_addr.clone();
    let app = router(state)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Server listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => log::info!("Received Ctrl+C signal"),
        () = terminate => log::info!("Received SIGTERM signal"),
    }
    log::info!("Shutting down");
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let chart = match state.chart.ready().try_ready() {
        None => "pending",
        Some(Ok(())) => "ready",
        Some(Err(_)) => "unavailable",
    };
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "chart_script": chart,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<usize>,
}

async fn dashboard_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    state.dashboard.ensure_mounted().await;
    let view = state.dashboard.snapshot();
    Html(render_dashboard(
        &view,
        &state.chart,
        query.page.unwrap_or(1),
        state.config.dashboard_page_size,
        &state.chrome(true),
    ))
}

#[derive(Debug, Deserialize)]
struct CoinForm {
    coin: String,
}

async fn select_coin(State(state): State<AppState>, Form(form): Form<CoinForm>) -> Redirect {
    match Coin::parse(&form.coin) {
        Some(coin) => state.dashboard.select_chart_coin(coin),
        None => state.notifier.warning(format!("Unknown coin {}", form.coin)),
    }
    Redirect::to("/dashboard")
}

async fn connect_dashboard_wallet(State(state): State<AppState>) -> Redirect {
    if let ConnectOutcome::Connected(address) = state.dashboard.connect_wallet().await {
        state.transactions.remember_wallet(Account::Wallet(address));
    }
    Redirect::to("/dashboard")
}

async fn dismiss_install(State(state): State<AppState>) -> Redirect {
    state.dashboard.dismiss_install_prompt();
    Redirect::to("/dashboard")
}

#[derive(Debug, Deserialize)]
struct ExchangeFields {
    #[serde(rename = "haveCoin")]
    have_coin: String,
    #[serde(rename = "haveAmount", default)]
    have_amount: String,
    #[serde(rename = "wantCoin")]
    want_coin: String,
}

impl ExchangeFields {
    fn into_form(self) -> Result<ExchangeForm> {
        let coin = |value: &str| {
            ExchangeCoin::parse(value)
                .ok_or_else(|| TrackerError::Validation(format!("Unsupported coin {value}")))
        };
        Ok(ExchangeForm {
            have_coin: coin(&self.have_coin)?,
            have_amount: self.have_amount.trim().parse().ok(),
            want_coin: coin(&self.want_coin)?,
        })
    }
}

async fn submit_exchange(
    State(state): State<AppState>,
    Form(fields): Form<ExchangeFields>,
) -> Redirect {
    match fields.into_form() {
        // Outcome is reported through notices
        Ok(form) => {
            let _ = state.dashboard.submit_exchange(form).await;
        }
        Err(e) => state.notifier.error(e.to_string()),
    }
    Redirect::to("/dashboard")
}

#[derive(Debug, Deserialize)]
struct PortfolioQuery {
    symbol: Option<String>,
    chart: Option<String>,
}

async fn portfolio_page(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> Html<String> {
    if let Some(kind) = query.chart.as_deref().and_then(ChartKind::parse) {
        state.portfolio.set_chart_kind(kind);
    }
    let symbol = query
        .symbol
        .filter(|s| !s.trim().is_empty())
        .map(ChartSymbol::new);
    state.portfolio.visit(symbol).await;
    let view = state.portfolio.snapshot();
    Html(render_portfolio(&view, &state.chart, &state.chrome(true)))
}

#[derive(Debug, Deserialize)]
struct TransactionsQuery {
    wallet: Option<String>,
    search: Option<String>,
    page: Option<usize>,
}

async fn transactions_page(
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> Html<String> {
    let connected = state.dashboard.account();
    if connected.is_connected() {
        state.transactions.remember_wallet(connected);
    }
    if let Ok(settings) = state.settings.load() {
        if !settings.wallet_address.is_empty() {
            state
                .transactions
                .remember_wallet(Account::Wallet(settings.wallet_address));
        }
    }

    state
        .transactions
        .visit(query.wallet.as_deref().map(Account::from_query))
        .await;
    if let Some(search) = &query.search {
        state.transactions.set_search(search.trim());
    }
    if let Some(page) = query.page {
        state.transactions.set_page(page);
    }
    let view = state.transactions.snapshot();
    Html(render_transactions(
        &view,
        state.config.transactions_page_size,
        &state.chrome(false),
    ))
}

async fn settings_page(State(state): State<AppState>) -> Html<String> {
    let settings = state.settings.load().unwrap_or_else(|e| {
        log::warn!("could not read settings: {e}");
        state.notifier.error("Failed to load settings.");
        Settings::default()
    });
    Html(render_settings(&settings, &state.chrome(false)))
}

#[derive(Debug, Deserialize)]
struct SettingsFields {
    #[serde(rename = "userName", default)]
    user_name: String,
    #[serde(rename = "userEmail", default)]
    user_email: String,
    #[serde(rename = "walletAddress", default)]
    wallet_address: String,
    #[serde(rename = "darkMode", default)]
    dark_mode: Option<String>,
    #[serde(default)]
    language: String,
}

impl From<SettingsFields> for Settings {
    fn from(fields: SettingsFields) -> Self {
        Settings {
            user_name: fields.user_name,
            user_email: fields.user_email,
            wallet_address: fields.wallet_address,
            dark_mode: fields.dark_mode.is_some_and(|v| v == "true" || v == "on"),
            language: Language::parse(&fields.language).unwrap_or_default(),
        }
    }
}

async fn save_settings(
    State(state): State<AppState>,
    Form(fields): Form<SettingsFields>,
) -> Response {
    let settings = Settings::from(fields);
    match state.settings.save(&settings) {
        Ok(()) => {
            state.notifier.success("Settings saved successfully.");
            Redirect::to("/settings").into_response()
        }
        Err(e) => {
            log::warn!("settings not saved: {e}");
            let text = match &e {
                TrackerError::Validation(msg) => msg.clone(),
                _ => "Failed to save settings.".to_string(),
            };
            state.notifier.error(text);
            // Re-render with what was typed so nothing is lost
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render_settings(&settings, &state.chrome(false))),
            )
                .into_response()
        }
    }
}

async fn connect_settings_wallet(State(state): State<AppState>) -> Redirect {
    match state.settings.connect_wallet(&state.wallet).await {
        Ok(address) => {
            state.notifier.success("Wallet connected successfully.");
            state.transactions.remember_wallet(Account::Wallet(address));
        }
        Err(TrackerError::WalletUnavailable) => {
            state.notifier.warning("MetaMask not found! Please install it.");
        }
        Err(e @ TrackerError::Storage(_)) => {
            log::warn!("connected wallet not saved: {e}");
            state.notifier.error("Failed to save settings.");
        }
        Err(e) => {
            log::warn!("wallet connection failed: {e}");
            state.notifier.error("Failed to connect MetaMask.");
        }
    }
    Redirect::to("/settings")
}

#[derive(Debug, Deserialize)]
struct ProxyQuery {
    #[serde(rename = "coinId")]
    coin_id: Option<String>,
}

async fn price_proxy(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Response {
    let Some(coin_id) = query.coin_id.filter(|id| !id.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing coinId" })),
        )
            .into_response();
    };
    match state.gateway.proxy_quote(coin_id.trim()).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            log::error!("Error fetching price data for {coin_id}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch data" })),
            )
                .into_response()
        }
    }
}
