//! Dashboard module - server-rendered web interface
//!
//! Every page is a pure function of a synchronizer snapshot plus the
//! per-request chrome (theme and pending toasts).
//!
//! # Architecture
//! - `css.rs`: Styling with CSS custom properties, dark and light themes
//! - `js.rs`: Chart widget mount, auto-submitting pickers, toast fade
//! - `layout.rs`: Document shell and sidebar navigation
//! - `components.rs`: Cards, tables, forms, chart slot, install modal
//! - `pages.rs`: Dashboard, portfolio, transactions and settings pages
//! - `format.rs`: Currency, percent and HTML escaping helpers

mod components;
mod css;
pub mod format;
mod js;
mod layout;
mod pages;

pub use components::{Page, paginate};
pub use layout::{Chrome, Route};
pub use pages::{render_dashboard, render_portfolio, render_settings, render_transactions};
