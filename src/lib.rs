//! Portfolio Dashboard - crypto balances, transactions and live quotes
//!
//! A server-rendered dashboard over a portfolio backend and a public price API.
//!
//! # Architecture
//! - `gateway`: Typed reads and writes against the backend and the price API
//! - `wallet`: Browser-style wallet account requests over an injectable provider
//! - `sync`: Per-page view state; late answers for a superseded selection are dropped
//! - `dashboard`: HTML rendering of every page
//! - `settings`: Preferences persisted to a key-value store
//! - `server`: Routes, form actions and the price proxy
//!
//! # Features
//! - Balance, recent transactions and market history on the dashboard
//! - Live quote with top gainer and loser on the portfolio page
//! - Wallet filter plus text search over transactions
//! - Coin exchange with a transaction list refresh
//! - Dark or light theme saved with the user's settings

#![allow(clippy::cast_precision_loss)] // Float casts OK for display
#![allow(clippy::doc_markdown)] // Doc style flexibility
#![allow(clippy::needless_pass_by_value)] // Axum extractor patterns
#![allow(clippy::map_unwrap_or)] // Explicit fallback preference

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod server;
pub mod settings;
pub mod sync;
pub mod types;
pub mod wallet;

pub use chart::{ChartEmbed, ChartKind, load_script, ready_pair};
pub use config::Config;
pub use error::{Result, TrackerError};
pub use gateway::{HttpGateway, MarketGateway};
pub use notify::{Level, Notice, Notifier};
pub use server::{AppState, router, serve};
pub use settings::{FileStore, MemoryStore, Settings, SettingsStore};
pub use sync::{DashboardSync, PortfolioSync, TransactionsSync};
pub use types::*;
pub use wallet::{ConnectOutcome, JsonRpcWalletProvider, WalletConnector};
