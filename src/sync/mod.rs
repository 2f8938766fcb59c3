//! View-state synchronizer
//!
//! Each page keeps one [`Source`] per remote data source. A source moves
//! `Idle -> Loading -> Resolved | Errored` and issues exactly one gateway
//! call per `Loading` transition. Every `begin` bumps a generation; a
//! response only lands if it carries the current generation, so a slow
//! answer for a superseded symbol or account is dropped instead of
//! overwriting newer state.
//!
//! # Pages
//! - `dashboard.rs`: balance, activity table, wallet connect, quick exchange
//! - `portfolio.rs`: selected-symbol quote and market overview
//! - `transactions.rs`: per-wallet transaction list with client-side search

mod dashboard;
mod portfolio;
mod transactions;

#[cfg(test)]
pub(crate) mod fake;

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Result, TrackerError};

pub use dashboard::{DashboardSync, DashboardView, ExchangeForm};
pub use portfolio::{PortfolioSync, PortfolioView};
pub use transactions::{
    TransactionsSync, TransactionsView, filter_transactions, search_transactions,
};

/// Lifecycle of one data source
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Resolved(T),
    Errored(TrackerError),
}

impl<T> LoadState<T> {
    /// Idle counts as loading: nothing has been requested yet
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Idle | LoadState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Resolved(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TrackerError> {
        match self {
            LoadState::Errored(err) => Some(err),
            _ => None,
        }
    }
}

/// Proof of which `begin` a response belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    generation: u64,
    key: K,
}

impl<K> Ticket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Whether a response was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    Stale,
}

impl Applied {
    pub fn is_current(self) -> bool {
        self == Applied::Current
    }
}

/// One remote data source keyed by the dependency that triggered it
#[derive(Debug, Clone)]
pub struct Source<K, T> {
    key: Option<K>,
    generation: u64,
    state: LoadState<T>,
}

impl<K, T> Default for Source<K, T> {
    fn default() -> Self {
        Self {
            key: None,
            generation: 0,
            state: LoadState::Idle,
        }
    }
}

impl<K: Clone + std::fmt::Debug, T> Source<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `Loading` for `key`; the returned ticket must accompany the response
    pub fn begin(&mut self, key: K) -> Ticket<K> {
        self.generation += 1;
        self.key = Some(key.clone());
        self.state = LoadState::Loading;
        Ticket {
            generation: self.generation,
            key,
        }
    }

    /// Apply a response if its ticket is still current
    pub fn resolve(&mut self, ticket: &Ticket<K>, result: Result<T>) -> Applied {
        if ticket.generation != self.generation {
            log::debug!(
                "dropping stale response for {:?} (generation {}, current {})",
                ticket.key,
                ticket.generation,
                self.generation
            );
            return Applied::Stale;
        }
        self.state = match result {
            Ok(data) => LoadState::Resolved(data),
            Err(err) => LoadState::Errored(err),
        };
        Applied::Current
    }

    /// Settle immediately without a network call
    pub fn resolve_now(&mut self, key: K, data: T) {
        let ticket = self.begin(key);
        self.resolve(&ticket, Ok(data));
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Page-level render signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// At least one required source has not settled
    Loading,
    /// Every required source settled; failures render as fallbacks
    Ready,
    /// Core sources settled without any data to show
    Unavailable,
}

fn lock<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
