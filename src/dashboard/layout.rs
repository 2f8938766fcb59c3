//! Page shell: document head, sidebar navigation and toasts

use crate::notify::Notice;

use super::css;
use super::format::escape;
use super::js;

/// Sidebar entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Portfolio,
    Transactions,
    Settings,
}

impl Route {
    pub const ALL: [Route; 4] = [
        Route::Dashboard,
        Route::Portfolio,
        Route::Transactions,
        Route::Settings,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Dashboard => "/dashboard",
            Route::Portfolio => "/portfolio",
            Route::Transactions => "/transactions",
            Route::Settings => "/settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Portfolio => "Portfolio",
            Route::Transactions => "Transactions",
            Route::Settings => "Settings",
        }
    }
}

/// Per-request page chrome
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    pub dark_mode: bool,
    pub notices: Vec<Notice>,
    /// Widget library to load, when the page shows a chart
    pub chart_script: Option<String>,
}

fn sidebar(active: Route) -> String {
    let links: String = Route::ALL
        .iter()
        .map(|route| {
            let class = if *route == active { "nav-link active" } else { "nav-link" };
            format!(
                r#"<a class="{class}" href="{path}">{label}</a>"#,
                path = route.path(),
                label = route.label()
            )
        })
        .collect();
    format!(
        r#"<nav class="sidebar">
        <div class="brand">Crypto Tracker</div>
        {links}
    </nav>"#
    )
}

fn toasts(notices: &[Notice]) -> String {
    if notices.is_empty() {
        return String::new();
    }
    let items: String = notices
        .iter()
        .map(|n| {
            format!(
                r#"<div class="toast {class}" id="toast-{id}">{text}</div>"#,
                class = n.level.css_class(),
                id = n.id,
                text = escape(&n.text)
            )
        })
        .collect();
    format!(r#"<div class="toasts">{items}</div>"#)
}

/// Wrap a page body in the full document
pub fn page(title: &str, active: Route, chrome: &Chrome, body: &str) -> String {
    let chart_script = chrome.chart_script.as_deref().map_or_else(String::new, |url| {
        format!(
            r#"<script src="{url}" onload="mountChart()"></script>"#,
            url = escape(url)
        )
    });
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | Crypto Tracker</title>
    <style>
{css}
    </style>
</head>
<body class="{theme}">
    {sidebar}
    <main class="content">
{body}
    </main>
    {toasts}
    <script>
{js}
    </script>
    {chart_script}
</body>
</html>"#,
        title = escape(title),
        css = css::STYLES,
        theme = if chrome.dark_mode { "dark" } else { "light" },
        sidebar = sidebar(active),
        toasts = toasts(&chrome.notices),
        js = js::SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notifier;

    #[test]
    fn test_active_route_and_theme() {
        let html = page("Portfolio", Route::Portfolio, &Chrome::default(), "<p>x</p>");
        assert!(html.contains(r#"<a class="nav-link active" href="/portfolio">Portfolio</a>"#));
        assert!(html.contains(r#"<a class="nav-link" href="/dashboard">Dashboard</a>"#));
        assert!(html.contains(r#"<body class="light">"#));
        assert!(!html.contains("mountChart()\"></script>"));

        let dark = Chrome {
            dark_mode: true,
            ..Chrome::default()
        };
        assert!(page("x", Route::Settings, &dark, "").contains(r#"<body class="dark">"#));
    }

    #[test]
    fn test_toasts_are_escaped() {
        let notifier = Notifier::new();
        notifier.error("<script>alert(1)</script>");
        let chrome = Chrome {
            notices: notifier.drain(),
            chart_script: Some("https://s3.tradingview.com/tv.js".into()),
            ..Chrome::default()
        };
        let html = page("Dashboard", Route::Dashboard, &chrome, "");
        assert!(html.contains("toast toast-error"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains(r#"src="https://s3.tradingview.com/tv.js" onload="mountChart()""#));
    }
}
