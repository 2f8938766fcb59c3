//! Reusable page fragments
//!
//! Every function returns an HTML fragment; all interpolated text goes
//! through [`escape`].

use crate::chart::{EmbedState, HistorySummary};
use crate::settings::{Language, Settings};
use crate::sync::{ExchangeForm, LoadState};
use crate::types::{Account, Balance, ChartPoint, Coin, ExchangeCoin, Transaction};
use crate::wallet::INSTALL_URL;

use super::format::{btc, change_class, escape, fee, signed_percent, usd};

/// One page of a longer list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based, already clamped
    pub number: usize,
    pub total_pages: usize,
}

/// Slice out page `requested`; out-of-range pages clamp to the nearest valid one
pub fn paginate<T>(items: &[T], requested: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let number = requested.clamp(1, total_pages);
    let start = (number - 1) * page_size;
    let end = (start + page_size).min(items.len());
    Page {
        items: &items[start.min(end)..end],
        number,
        total_pages,
    }
}

pub fn loading(what: &str) -> String {
    format!(r#"<div class="placeholder">Loading {}...</div>"#, escape(what))
}

pub fn unavailable(text: &str) -> String {
    format!(r#"<div class="placeholder">{}</div>"#, escape(text))
}

pub fn stat_card(title: &str, value: &str, class: &str) -> String {
    format!(
        r#"<div class="card">
            <div class="card-title">{title}</div>
            <div class="card-value {class}">{value}</div>
        </div>"#,
        title = escape(title),
        value = escape(value),
        class = escape(class)
    )
}

pub fn balance_card(balance: &LoadState<Balance>) -> String {
    let body = match balance {
        LoadState::Resolved(b) => format!(
            r#"<div class="card-value">{}</div><div class="card-sub">{}</div>"#,
            escape(&btc(b.total_balance_btc)),
            escape(&usd(b.total_balance_usd))
        ),
        LoadState::Errored(_) => unavailable("Balance unavailable"),
        LoadState::Idle | LoadState::Loading => loading("balance"),
    };
    format!(
        r#"<div class="card">
            <div class="card-title">Total Balance</div>
            {body}
        </div>"#
    )
}

/// Connected account badge plus the connect action
pub fn account_controls(account: &Account) -> String {
    let action = if account.is_connected() {
        String::new()
    } else {
        r#"<form method="post" action="/dashboard/connect">
                <button class="btn btn-primary" type="submit">Connect Wallet</button>
            </form>"#
            .to_string()
    };
    format!(
        r#"<div class="header-controls">
            <span class="account-badge">{label}</span>
            {action}
        </div>"#,
        label = escape(&account.short_label())
    )
}

fn status_tag(status: &str) -> String {
    let class = match status.to_ascii_lowercase().as_str() {
        "completed" => "tag-completed",
        "pending" => "tag-pending",
        _ => "tag-other",
    };
    format!(r#"<span class="tag {class}">{}</span>"#, escape(status))
}

/// Transaction table with a pager; `link` builds the href for a page number
pub fn transactions_table(
    rows: &[&Transaction],
    requested_page: usize,
    page_size: usize,
    link: impl Fn(usize) -> String,
) -> String {
    if rows.is_empty() {
        return unavailable("No transactions found.");
    }
    let page = paginate(rows, requested_page, page_size);
    let body: String = page
        .items
        .iter()
        .map(|tx| {
            format!(
                "<tr><td>{coin}</td><td>{amount}</td><td>{id}</td><td>{date}</td><td>{status}</td><td>{fees}</td></tr>",
                coin = escape(&tx.coin),
                amount = escape(&usd(tx.transaction_amount)),
                id = escape(&tx.transaction_id),
                date = escape(&tx.date),
                status = status_tag(&tx.status),
                fees = escape(&fee(tx.fees)),
            )
        })
        .collect();
    format!(
        r#"<table class="data-table">
            <thead><tr><th>Coin</th><th>Amount</th><th>Transaction ID</th><th>Date</th><th>Status</th><th>Fees</th></tr></thead>
            <tbody>{body}</tbody>
        </table>
        {pager}"#,
        pager = pager(page.number, page.total_pages, link)
    )
}

fn pager(current: usize, total: usize, link: impl Fn(usize) -> String) -> String {
    if total <= 1 {
        return String::new();
    }
    let items: String = (1..=total)
        .map(|n| {
            if n == current {
                format!(r#"<span class="current">{n}</span>"#)
            } else {
                format!(r#"<a href="{}">{n}</a>"#, escape(&link(n)))
            }
        })
        .collect();
    format!(r#"<div class="pager">{items}</div>"#)
}

fn options<T: Copy + PartialEq>(
    all: &[T],
    selected: T,
    value: impl Fn(T) -> String,
    label: impl Fn(T) -> String,
) -> String {
    all.iter()
        .map(|&item| {
            format!(
                r#"<option value="{v}"{sel}>{l}</option>"#,
                v = escape(&value(item)),
                sel = if item == selected { " selected" } else { "" },
                l = escape(&label(item))
            )
        })
        .collect()
}

/// Coin picker for the dashboard market chart
pub fn coin_picker(selected: Coin) -> String {
    format!(
        r#"<form method="post" action="/dashboard/coin" class="form-inline">
            <select name="coin" data-autosubmit>{}</select>
            <noscript><button class="btn btn-secondary" type="submit">Show</button></noscript>
        </form>"#,
        options(&Coin::ALL, selected, |c| c.as_str().to_string(), |c| c.as_str().to_string())
    )
}

pub fn exchange_form(form: &ExchangeForm) -> String {
    let coin = |c: ExchangeCoin| c.as_str().to_string();
    let amount = form.have_amount.map(|a| a.to_string()).unwrap_or_default();
    format!(
        r#"<div class="card">
            <div class="card-header"><span class="card-title">Quick Exchange</span></div>
            <form method="post" action="/dashboard/exchange">
                <div class="form-row">
                    <label for="haveCoin">I have</label>
                    <select id="haveCoin" name="haveCoin">{have}</select>
                </div>
                <div class="form-row">
                    <label for="haveAmount">Amount</label>
                    <input id="haveAmount" name="haveAmount" type="number" step="any" min="0" value="{amount}" required>
                </div>
                <div class="form-row">
                    <label for="wantCoin">I want</label>
                    <select id="wantCoin" name="wantCoin">{want}</select>
                </div>
                <button class="btn btn-primary" type="submit">Exchange</button>
            </form>
        </div>"#,
        have = options(&ExchangeCoin::ALL, form.have_coin, coin, coin),
        want = options(&ExchangeCoin::ALL, form.want_coin, coin, coin),
        amount = escape(&amount),
    )
}

/// Chart slot: the widget once its library is ready
pub fn chart_embed(state: &EmbedState) -> String {
    match state {
        EmbedState::Pending => r#"<div class="chart-box"><div class="placeholder">Loading chart...</div></div>"#.to_string(),
        EmbedState::Unavailable(reason) => format!(
            r#"<div class="chart-box"><div class="placeholder">Chart unavailable: {}</div></div>"#,
            escape(reason)
        ),
        EmbedState::Ready(config) => {
            let json = serde_json::to_string(config).unwrap_or_default();
            format!(
                r#"<div class="chart-box" id="{id}" data-widget="{json}"></div>"#,
                id = escape(&config.container_id),
                json = escape(&json)
            )
        }
    }
}

/// Summary of the backend price history
pub fn history_card(history: &LoadState<Vec<ChartPoint>>) -> String {
    let body = match history {
        LoadState::Resolved(points) => match HistorySummary::from_points(points) {
            Some(s) => {
                let change = s.change_percent();
                let since = points
                    .first()
                    .map(|p| p.timestamp.to_string())
                    .unwrap_or_default();
                format!(
                    r#"<div class="metrics">
                <div class="metric"><div class="metric-label">Last</div><div class="metric-value">{last}</div></div>
                <div class="metric"><div class="metric-label">Low</div><div class="metric-value">{min}</div></div>
                <div class="metric"><div class="metric-label">High</div><div class="metric-value">{max}</div></div>
                <div class="metric"><div class="metric-label">Change since {since}</div><div class="metric-value {class}">{pct}</div></div>
            </div>"#,
                    last = escape(&usd(s.last)),
                    min = escape(&usd(s.min)),
                    max = escape(&usd(s.max)),
                    since = escape(&since),
                    class = change_class(change),
                    pct = escape(&signed_percent(change)),
                )
            }
            None => unavailable("No price history yet."),
        },
        LoadState::Errored(_) => unavailable("Price history unavailable"),
        LoadState::Idle | LoadState::Loading => loading("price history"),
    };
    format!(
        r#"<div class="card">
            <div class="card-title">Price History</div>
            {body}
        </div>"#
    )
}

pub fn install_modal() -> String {
    format!(
        r#"<div class="modal-backdrop">
        <div class="card modal">
            <h2>Install MetaMask</h2>
            <p>A browser wallet is required to connect. Install the MetaMask extension, then try again.</p>
            <div class="header-controls">
                <a class="btn btn-primary" href="{url}" target="_blank" rel="noopener">Install MetaMask</a>
                <form method="post" action="/dashboard/install/dismiss">
                    <button class="btn btn-secondary" type="submit">Cancel</button>
                </form>
            </div>
        </div>
    </div>"#,
        url = escape(INSTALL_URL)
    )
}

pub fn settings_form(settings: &Settings) -> String {
    let checked = if settings.dark_mode { " checked" } else { "" };
    let wallet = if settings.wallet_address.is_empty() {
        "Not connected".to_string()
    } else {
        settings.wallet_address.clone()
    };
    format!(
        r#"<div class="card">
            <form method="post" action="/settings">
                <div class="form-row">
                    <label for="userName">Name</label>
                    <input id="userName" name="userName" value="{name}" required>
                </div>
                <div class="form-row">
                    <label for="userEmail">Email</label>
                    <input id="userEmail" name="userEmail" type="email" value="{email}" required>
                </div>
                <div class="form-row">
                    <label for="language">Language</label>
                    <select id="language" name="language">{languages}</select>
                </div>
                <div class="form-row">
                    <label><input type="checkbox" name="darkMode" value="true"{checked}> Dark mode</label>
                </div>
                <input type="hidden" name="walletAddress" value="{wallet_value}">
                <button class="btn btn-primary" type="submit">Save Settings</button>
            </form>
        </div>
        <div class="card">
            <div class="card-title">Wallet</div>
            <div class="card-sub">{wallet}</div>
            <form method="post" action="/settings/connect" class="form-inline">
                <button class="btn btn-secondary" type="submit">Connect Wallet</button>
            </form>
        </div>"#,
        name = escape(&settings.user_name),
        email = escape(&settings.user_email),
        languages = options(
            &Language::ALL,
            settings.language,
            |l| l.code().to_string(),
            |l| l.display_name().to_string()
        ),
        wallet_value = escape(&settings.wallet_address),
        wallet = escape(&wallet),
    )
}
