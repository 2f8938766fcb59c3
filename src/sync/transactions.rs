//! Transactions page: per-wallet list with client-side search

use std::sync::{Arc, Mutex};

use crate::error::TrackerError;
use crate::gateway::MarketGateway;
use crate::notify::Notifier;
use crate::types::{Account, Transaction};

use super::{LoadState, PageStatus, Source, lock};

/// Rows whose id, coin or status contains `query`, ignoring case
pub fn search_transactions<'a>(rows: &'a [Transaction], query: &str) -> Vec<&'a Transaction> {
    let needle = query.trim().to_lowercase();
    rows.iter()
        .filter(|tx| {
            needle.is_empty()
                || [&tx.transaction_id, &tx.coin, &tx.status]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Search plus the wallet filter; rows without an owner belong to every wallet
pub fn filter_transactions<'a>(
    rows: &'a [Transaction],
    wallet: &Account,
    query: &str,
) -> Vec<&'a Transaction> {
    search_transactions(rows, query)
        .into_iter()
        .filter(|tx| {
            tx.wallet
                .as_deref()
                .is_none_or(|owner| owner.eq_ignore_ascii_case(wallet.as_query()))
        })
        .collect()
}

#[derive(Debug, Default)]
struct TransactionsState {
    mounted: bool,
    wallet: Account,
    known_wallets: Vec<Account>,
    transactions: Source<Account, Vec<Transaction>>,
    search: String,
    page: usize,
}

/// Everything the transactions page renders
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionsView {
    pub status: PageStatus,
    pub wallet: Account,
    /// Wallets offered by the picker, demo first
    pub wallets: Vec<Account>,
    pub search: String,
    /// Requested page, 1-based; rendering clamps it
    pub page: usize,
    pub transactions: LoadState<Vec<Transaction>>,
}

impl TransactionsView {
    /// Rows passing the current wallet and search filters
    pub fn visible(&self) -> Vec<&Transaction> {
        self.transactions
            .data()
            .map(|rows| filter_transactions(rows, &self.wallet, &self.search))
            .unwrap_or_default()
    }
}

/// Transactions synchronizer; clones share state
#[derive(Clone)]
pub struct TransactionsSync {
    gateway: Arc<dyn MarketGateway>,
    notifier: Notifier,
    state: Arc<Mutex<TransactionsState>>,
}

impl TransactionsSync {
    pub fn new(gateway: Arc<dyn MarketGateway>, notifier: Notifier) -> Self {
        Self {
            gateway,
            notifier,
            state: Arc::new(Mutex::new(TransactionsState {
                page: 1,
                known_wallets: vec![Account::Demo],
                ..TransactionsState::default()
            })),
        }
    }

    pub async fn mount(&self) {
        lock(&self.state).mounted = true;
        self.load().await;
    }

    /// Page visit: switch to `wallet` if given, otherwise mount when the
    /// list was never loaded or failed last time
    pub async fn visit(&self, wallet: Option<Account>) {
        if let Some(wallet) = wallet {
            self.select_wallet(wallet).await;
            return;
        }
        let needs_mount = {
            let state = lock(&self.state);
            !state.mounted || state.transactions.state().error().is_some()
        };
        if needs_mount {
            self.mount().await;
        }
    }

    /// Switch wallet and refetch its transactions; reselecting the current
    /// wallet only refetches after a failure
    pub async fn select_wallet(&self, wallet: Account) {
        {
            let mut state = lock(&self.state);
            if state.wallet == wallet
                && state.mounted
                && state.transactions.state().error().is_none()
            {
                return;
            }
            if !state.known_wallets.contains(&wallet) {
                state.known_wallets.push(wallet.clone());
            }
            state.wallet = wallet;
            state.page = 1;
            state.mounted = true;
        }
        self.load().await;
    }

    /// Offer `wallet` in the picker without switching to it
    pub fn remember_wallet(&self, wallet: Account) {
        let mut state = lock(&self.state);
        if !state.known_wallets.contains(&wallet) {
            state.known_wallets.push(wallet);
        }
    }

    /// New search text; the table goes back to its first page
    pub fn set_search(&self, text: &str) {
        let mut state = lock(&self.state);
        if state.search != text {
            state.search = text.to_string();
            state.page = 1;
        }
    }

    pub fn clear_search(&self) {
        self.set_search("");
    }

    pub fn set_page(&self, page: usize) {
        lock(&self.state).page = page.max(1);
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn snapshot(&self) -> TransactionsView {
        let state = lock(&self.state);
        let transactions = state.transactions.state().clone();
        TransactionsView {
            status: if transactions.is_loading() {
                PageStatus::Loading
            } else {
                PageStatus::Ready
            },
            wallet: state.wallet.clone(),
            wallets: state.known_wallets.clone(),
            search: state.search.clone(),
            page: state.page,
            transactions,
        }
    }

    async fn load(&self) {
        let ticket = {
            let mut state = lock(&self.state);
            let wallet = state.wallet.clone();
            state.transactions.begin(wallet)
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
}
