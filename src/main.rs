//! Portfolio dashboard server entry point

use std::sync::Arc;

use portfolio_dashboard::{
    AppState, ChartEmbed, Config, FileStore, HttpGateway, JsonRpcWalletProvider, SettingsStore,
    WalletConnector, load_script, ready_pair, serve,
};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    if let Err(e) = run(config).await {
        log::error!("Server error: {e}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> portfolio_dashboard::Result<()> {
    config.validate()?;
    log::info!(
        "Starting portfolio dashboard v{} (backend {}, prices {})",
        env!("CARGO_PKG_VERSION"),
        config.api_base_url,
        config.quote_base_url()
    );

    let wallet = match &config.wallet_rpc_url {
        Some(url) => {
            log::info!("Wallet provider at {url}");
            WalletConnector::with_provider(JsonRpcWalletProvider::new(url.clone()))
        }
        None => {
            log::warn!("WALLET_RPC_URL not set, wallet connect will prompt for install");
            WalletConnector::unavailable()
        }
    };

    let settings = SettingsStore::new(FileStore::open(&config.settings_path)?);
    let gateway = Arc::new(HttpGateway::new(&config));

    let (resolver, signal) = ready_pair();
    tokio::spawn(load_script(
        reqwest::Client::new(),
        config.chart_script_url.clone(),
        resolver,
    ));
    let chart = ChartEmbed::new(config.chart_script_url.clone(), signal);

    serve(AppState::new(config, gateway, wallet, settings, chart)).await
}
