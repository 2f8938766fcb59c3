//! Dashboard page: balance, recent activity, market chart, quick exchange

use std::sync::{Arc, Mutex};

use crate::error::{Result, TrackerError};
use crate::gateway::MarketGateway;
use crate::notify::Notifier;
use crate::types::{
    Account, Balance, ChartPoint, Coin, ExchangeCoin, ExchangeReceipt, ExchangeRequest,
    Transaction,
};
use crate::wallet::{ConnectOutcome, WalletConnector};

use super::{LoadState, PageStatus, Source, lock};

/// Quick exchange form values
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeForm {
    pub have_coin: ExchangeCoin,
    /// `None` when the field is empty or not a number
    pub have_amount: Option<f64>,
    pub want_coin: ExchangeCoin,
}

impl Default for ExchangeForm {
    fn default() -> Self {
        Self {
            have_coin: ExchangeCoin::Btc,
            have_amount: Some(1.0),
            want_coin: ExchangeCoin::Usdt,
        }
    }
}

impl ExchangeForm {
    /// Build the request for `account`, rejecting missing or non-positive amounts
    pub fn to_request(&self, account: &Account) -> Result<ExchangeRequest> {
        let amount = self
            .have_amount
            .ok_or_else(|| TrackerError::Validation("Enter the amount you have".into()))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(TrackerError::Validation(
                "Amount must be greater than zero".into(),
            ));
        }
        Ok(ExchangeRequest {
            wallet_address: account.as_query().to_string(),
            have_coin: self.have_coin,
            have_amount: amount,
            want_coin: self.want_coin,
        })
    }
}

#[derive(Debug, Default)]
struct DashboardState {
    mounted: bool,
    account: Account,
    balance: Source<Account, Balance>,
    transactions: Source<Account, Vec<Transaction>>,
    history: Source<(), Vec<ChartPoint>>,
    chart_coin: Coin,
    form: ExchangeForm,
    install_prompt: bool,
}

/// Everything the dashboard page renders
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub status: PageStatus,
    pub account: Account,
    pub balance: LoadState<Balance>,
    pub transactions: LoadState<Vec<Transaction>>,
    pub history: LoadState<Vec<ChartPoint>>,
    pub chart_coin: Coin,
    pub form: ExchangeForm,
    pub install_prompt: bool,
    pub wallet_available: bool,
}

/// Dashboard synchronizer; clones share state
#[derive(Clone)]
pub struct DashboardSync {
    gateway: Arc<dyn MarketGateway>,
    wallet: WalletConnector,
    notifier: Notifier,
    state: Arc<Mutex<DashboardState>>,
}

impl DashboardSync {
    pub fn new(gateway: Arc<dyn MarketGateway>, wallet: WalletConnector, notifier: Notifier) -> Self {
        Self {
            gateway,
            wallet,
            notifier,
            state: Arc::new(Mutex::new(DashboardState::default())),
        }
    }

    /// Load every source for the current account
    pub async fn mount(&self) {
        lock(&self.state).mounted = true;
        futures::join!(self.reload_account_sources(), self.load_history());
    }

    /// Mount on first visit, and again when a source failed so navigating back retries it
    pub async fn ensure_mounted(&self) {
        let needs_mount = {
            let state = lock(&self.state);
            !state.mounted
                || state.balance.state().error().is_some()
                || state.transactions.state().error().is_some()
                || state.history.state().error().is_some()
        };
        if needs_mount {
            self.mount().await;
        }
    }

    /// Ask the wallet for an account and switch to it
    pub async fn connect_wallet(&self) -> ConnectOutcome {
        let outcome = ConnectOutcome::from(self.wallet.request_account().await);
        match &outcome {
            ConnectOutcome::Connected(address) => {
                log::info!("wallet connected: {address}");
                self.notifier.success("Wallet connected successfully.");
                self.set_account(Account::Wallet(address.clone())).await;
            }
            ConnectOutcome::InstallPrompt => {
                log::info!("no wallet provider, showing install prompt");
                lock(&self.state).install_prompt = true;
            }
            ConnectOutcome::Failed(cause) => {
                log::warn!("wallet connection failed: {cause}");
                self.notifier.error("Failed to connect MetaMask.");
            }
        }
        outcome
    }

    /// Change the account; balance and transactions refetch when it differs
    pub async fn set_account(&self, account: Account) {
        {
            let mut state = lock(&self.state);
            if state.account == account && state.mounted {
                return;
            }
            state.account = account;
            state.mounted = true;
        }
        self.reload_account_sources().await;
    }

    /// Pick the market chart coin; the exchange form follows when it offers the coin
    pub fn select_chart_coin(&self, coin: Coin) {
        let mut state = lock(&self.state);
        state.chart_coin = coin;
        if let Some(have) = coin.exchange_coin() {
            state.form.have_coin = have;
        }
    }

    /// Submit a simulated exchange for the current account.
    ///
    /// On success the transaction list reloads once, for whichever account
    /// is current when the exchange returns. On failure the list is left as
    /// it was.
    pub async fn submit_exchange(&self, form: ExchangeForm) -> Result<ExchangeReceipt> {
        let request = {
            let mut state = lock(&self.state);
            state.form = form.clone();
            form.to_request(&state.account)
        };
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                self.notifier.error(e.to_string());
                return Err(e);
            }
        };

        log::debug!(
            "exchange {} {} -> {} for {}",
            request.have_amount,
            request.have_coin.as_str(),
            request.want_coin.as_str(),
            request.wallet_address
        );
        match self.gateway.submit_exchange(&request).await {
            Ok(receipt) => {
                self.notifier.success(receipt.message.clone());
                self.load_transactions().await;
                Ok(receipt)
            }
            Err(e) => {
                log::warn!("Exchange failed: {e}");
                self.notifier.error("Exchange failed.");
                Err(e)
            }
        }
    }

    pub fn dismiss_install_prompt(&self) {
        lock(&self.state).install_prompt = false;
    }

    pub fn account(&self) -> Account {
        lock(&self.state).account.clone()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn snapshot(&self) -> DashboardView {
        let state = lock(&self.state);
        let loading = state.balance.state().is_loading()
            || state.transactions.state().is_loading()
            || state.history.state().is_loading();
        DashboardView {
            status: if loading {
                PageStatus::Loading
            } else {
                PageStatus::Ready
            },
            account: state.account.clone(),
            balance: state.balance.state().clone(),
            transactions: state.transactions.state().clone(),
            history: state.history.state().clone(),
            chart_coin: state.chart_coin,
            form: state.form.clone(),
            install_prompt: state.install_prompt,
            wallet_available: self.wallet.is_available(),
        }
    }

    async fn reload_account_sources(&self) {
        futures::join!(self.load_balance(), self.load_transactions());
    }

    async fn load_balance(&self) {
        let ticket = {
            let mut state = lock(&self.state);
            let account = state.account.clone();
            state.balance.begin(account)
        };
        let result = self.gateway.fetch_balance().await;
        if let Err(e) = &result {
            log::warn!("balance fetch failed: {e}");
        }
        let failed = result.is_err();
        if lock(&self.state).balance.resolve(&ticket, result).is_current() && failed {
            self.notifier.error(TrackerError::user_message("balance"));
        }
    }

    async fn load_transactions(&self) {
        let ticket = {
            let mut state = lock(&self.state);
            let account = state.account.clone();
            state.transactions.begin(account)
        };
        let result = self.gateway.fetch_transactions(ticket.key()).await;
        if let Err(e) = &result {
            log::warn!("transactions fetch failed for {}: {e}", ticket.key());
        }
        let failed = result.is_err();
        if lock(&self.state).transactions.resolve(&ticket, result).is_current() && failed {
            self.notifier.error(TrackerError::user_message("transactions"));
        }
    }

    async fn load_history(&self) {
        let ticket = lock(&self.state).history.begin(());
        let result = self.gateway.fetch_chart().await;
        if let Err(e) = &result {
            log::warn!("chart history fetch failed: {e}");
        }
        let failed = result.is_err();
        if lock(&self.state).history.resolve(&ticket, result).is_current() && failed {
            self.notifier.error(TrackerError::user_message("chart data"));
        }
    }
}
