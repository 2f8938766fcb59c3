//! Full pages rendered from synchronizer snapshots

use crate::chart::{ChartEmbed, ChartKind};
use crate::settings::Settings;
use crate::sync::{DashboardView, LoadState, PageStatus, PortfolioView, TransactionsView};
use crate::types::ChartSymbol;

use super::components::{
    account_controls, balance_card, chart_embed, coin_picker, exchange_form, history_card,
    install_modal, loading, settings_form, stat_card, transactions_table, unavailable,
};
use urlencoding::encode;

use super::format::{change_class, escape, mover, signed_percent, usd};
use super::layout::{Chrome, Route, page};

fn header(title: &str, controls: &str) -> String {
    format!(
        r#"<header>
            <h1>{}</h1>
            {controls}
        </header>"#,
        escape(title)
    )
}

pub fn render_dashboard(
    view: &DashboardView,
    embed: &ChartEmbed,
    requested_page: usize,
    page_size: usize,
    chrome: &Chrome,
) -> String {
    let mut body = header("Dashboard", &account_controls(&view.account));
    if view.status == PageStatus::Loading {
        body.push_str(&loading("dashboard"));
        return page("Dashboard", Route::Dashboard, chrome, &body);
    }

    let symbol = view.chart_coin.chart_symbol();
    let activity = match &view.transactions {
        LoadState::Resolved(rows) => {
            let refs: Vec<_> = rows.iter().collect();
            transactions_table(&refs, requested_page, page_size, |n| {
                format!("/dashboard?page={n}")
            })
        }
        LoadState::Errored(_) => unavailable("Failed to load transactions."),
        LoadState::Idle | LoadState::Loading => loading("transactions"),
    };

    body.push_str(&format!(
        r#"<div class="grid">
            {balance}
            {history}
        </div>
        <div class="grid">
            <div class="card wide">
                <div class="card-header">
                    <span class="card-title">Market Chart: {label}</span>
                    {picker}
                </div>
                {chart}
            </div>
        </div>
        <div class="grid">
            {exchange}
            <div class="card wide">
                <div class="card-header"><span class="card-title">Recent Activity</span></div>
                {activity}
            </div>
        </div>"#,
        balance = balance_card(&view.balance),
        history = history_card(&view.history),
        label = escape(&symbol.label()),
        picker = coin_picker(view.chart_coin),
        chart = chart_embed(&embed.state_for(&symbol, ChartKind::Price)),
        exchange = exchange_form(&view.form),
    ));
    if view.install_prompt {
        body.push_str(&install_modal());
    }
    page("Dashboard", Route::Dashboard, chrome, &body)
}

fn symbol_options(current: &ChartSymbol) -> String {
    let mut symbols: Vec<ChartSymbol> = ChartSymbol::supported().collect();
    if !symbols.contains(current) {
        symbols.push(current.clone());
    }
    symbols
        .iter()
        .map(|s| {
            format!(
                r#"<option value="{v}"{sel}>{l}</option>"#,
                v = escape(s.as_str()),
                sel = if s == current { " selected" } else { "" },
                l = escape(&s.label())
            )
        })
        .collect()
}

fn chart_kind_options(current: ChartKind) -> String {
    ChartKind::ALL
        .iter()
        .map(|k| {
            format!(
                r#"<option value="{v}"{sel}>{l}</option>"#,
                v = k.as_str(),
                sel = if *k == current { " selected" } else { "" },
                l = k.label()
            )
        })
        .collect()
}

pub fn render_portfolio(view: &PortfolioView, embed: &ChartEmbed, chrome: &Chrome) -> String {
    let picker = format!(
        r#"<form method="get" action="/portfolio" class="form-inline">
            <select name="symbol" data-autosubmit>{symbols}</select>
            <select name="chart" data-autosubmit>{kinds}</select>
            <noscript><button class="btn btn-secondary" type="submit">Show</button></noscript>
        </form>"#,
        symbols = symbol_options(&view.symbol),
        kinds = chart_kind_options(view.chart_kind),
    );
    let mut body = header("Portfolio", "");

    match view.status {
        PageStatus::Loading => body.push_str(&loading("market data")),
        PageStatus::Unavailable => {
            body.push_str(&picker);
            body.push_str(&unavailable("Could not load data."));
        }
        PageStatus::Ready => {
            let quote = view.quote.data().copied().flatten();
            let price = quote.map_or_else(|| "N/A".to_string(), |q| usd(q.price));
            let (change, change_cls) = quote.map_or_else(
                || ("N/A".to_string(), "neutral"),
                |q| (signed_percent(q.change_24h), change_class(q.change_24h)),
            );
            let overview = view.overview.data();
            let gainer = mover(overview.and_then(|o| o.top_gainer.as_ref()));
            let loser = mover(overview.and_then(|o| o.top_loser.as_ref()));

            body.push_str(&format!(
                r#"<div class="grid">
            <div class="card wide">
                <div class="card-header">
                    <h2>Live Crypto Chart</h2>
                    {picker}
                </div>
                {chart}
            </div>
        </div>
        <div class="grid">
            {price}
            {change}
            {gainer}
            {loser}
        </div>"#,
                chart = chart_embed(&embed.state_for(&view.symbol, view.chart_kind)),
                price = stat_card("Current Price", &price, ""),
                change = stat_card("24h Change", &change, change_cls),
                gainer = stat_card("Top Gainer", &gainer, "positive"),
                loser = stat_card("Top Loser", &loser, "negative"),
            ));
        }
    }
    page("Portfolio", Route::Portfolio, chrome, &body)
}

pub fn render_transactions(view: &TransactionsView, page_size: usize, chrome: &Chrome) -> String {
    let wallets: String = view
        .wallets
        .iter()
        .map(|w| {
            format!(
                r#"<option value="{v}"{sel}>{l}</option>"#,
                v = escape(w.as_query()),
                sel = if *w == view.wallet { " selected" } else { "" },
                l = escape(&w.short_label())
            )
        })
        .collect();
    let filters = format!(
        r#"<form method="get" action="/transactions" class="form-inline">
            <div class="form-row">
                <label for="wallet">Wallet</label>
                <select id="wallet" name="wallet" data-autosubmit>{wallets}</select>
            </div>
            <div class="form-row">
                <label for="search">Search</label>
                <input id="search" name="search" value="{search}" placeholder="ID, coin or status">
            </div>
            <div class="form-row">
                <button class="btn btn-primary" type="submit">Search</button>
            </div>
            <div class="form-row">
                <a class="btn btn-secondary" href="/transactions?wallet={wallet}&amp;search=">Clear</a>
            </div>
        </form>"#,
        search = escape(&view.search),
        wallet = escape(&encode(view.wallet.as_query())),
    );

    let table = match (&view.status, &view.transactions) {
        (PageStatus::Loading, _) => loading("transactions"),
        (_, LoadState::Errored(_)) => unavailable("Failed to load transactions."),
        _ => {
            let wallet = encode(view.wallet.as_query());
            let search = encode(&view.search);
            transactions_table(&view.visible(), view.page, page_size, |n| {
                format!("/transactions?wallet={wallet}&search={search}&page={n}")
            })
        }
    };

    let body = format!(
        r#"{header}
        <div class="card">
            {filters}
            {table}
        </div>"#,
        header = header("Transactions", ""),
    );
    page("Transactions", Route::Transactions, chrome, &body)
}

pub fn render_settings(settings: &Settings, chrome: &Chrome) -> String {
    let body = format!(
        r#"{header}
        <div class="grid">
            {form}
        </div>"#,
        header = header("Settings", ""),
        form = settings_form(settings),
    );
    page("Settings", Route::Settings, chrome, &body)
}
