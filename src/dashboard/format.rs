//! Number and text formatting shared by the page templates

use crate::types::GainerLoser;

/// `$1234.50`
pub fn usd(value: f64) -> String {
    format!("${value:.2}")
}

/// Fee with five decimals
pub fn fee(value: f64) -> String {
    format!("{value:.5}")
}

/// BTC amount with four decimals
pub fn btc(value: f64) -> String {
    format!("{value:.4} BTC")
}

/// Percent with an explicit `+` for non-negative values
pub fn signed_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

/// CSS class colouring a change up or down
pub fn change_class(value: f64) -> &'static str {
    if value >= 0.0 { "positive" } else { "negative" }
}

/// `BITCOIN +5.20%`, or `N/A` when the backend did not report a mover
pub fn mover(entry: Option<&GainerLoser>) -> String {
    entry.map_or_else(
        || "N/A".to_string(),
        |m| format!("{} {}", m.id.to_uppercase(), signed_percent(m.change_24h)),
    )
}

/// Escape text for HTML bodies and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formats() {
        assert_eq!(usd(26000.0), "$26000.00");
        assert_eq!(usd(1.005), "$1.00");
        assert_eq!(fee(0.12), "0.12000");
        assert_eq!(btc(0.5), "0.5000 BTC");
        assert_eq!(signed_percent(2.345), "+2.35%");
        assert_eq!(signed_percent(0.0), "+0.00%");
        assert_eq!(signed_percent(-1.2), "-1.20%");
        assert_eq!(change_class(-0.01), "negative");
    }

    #[test]
    fn test_mover_label() {
        let gainer = GainerLoser {
            id: "solana".to_string(),
            change_24h: 12.5,
            symbol: None,
            current_price: None,
        };
        assert_eq!(mover(Some(&gainer)), "SOLANA +12.50%");
        assert_eq!(mover(None), "N/A");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<b>"O'Neil" & co</b>"#), "&lt;b&gt;&quot;O&#39;Neil&quot; &amp; co&lt;/b&gt;");
    }
}
