//! Dashboard JavaScript
//!
//! The pages are rendered on the server; the script only mounts the chart
//! widget once its library is on the page, submits selects on change, and
//! fades out toasts.

pub const SCRIPT: &str = r#"
// ============================================================================
// Chart widget
// ============================================================================
function mountChart() {
    const holder = document.querySelector('[data-widget]');
    if (!holder || !window.TradingView) return;
    const config = JSON.parse(holder.getAttribute('data-widget'));
    new TradingView.widget(config);
}

// ============================================================================
// Forms
// ============================================================================
function autoSubmit() {
    document.querySelectorAll('select[data-autosubmit]').forEach(select => {
        select.addEventListener('change', () => select.form.submit());
    });
}

// ============================================================================
// Toasts
// ============================================================================
function fadeToasts() {
    setTimeout(() => {
        document.querySelectorAll('.toast').forEach(t => t.remove());
    }, 5000);
}

document.addEventListener('DOMContentLoaded', () => {
    autoSubmit();
    fadeToasts();
});
"#;
