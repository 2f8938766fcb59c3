//! Dashboard CSS styles
//!
//! Theme colours are CSS custom properties; `body.light` swaps them when
//! the saved settings turn dark mode off.

pub const STYLES: &str = r"
* { box-sizing: border-box; margin: 0; padding: 0; }

:root {
    --bg: #0d1117;
    --card: #161b22;
    --border: #30363d;
    --text: #c9d1d9;
    --text-dim: #8b949e;
    --green: #56fca2;
    --red: #ff6370;
    --blue: #58a6ff;
    --yellow: #d29922;
    --sidebar: #010409;
}

body.light {
    --bg: #f5f6fa;
    --card: #ffffff;
    --border: #d0d7de;
    --text: #1f2328;
    --text-dim: #59636e;
    --green: #1a7f37;
    --red: #cf222e;
    --sidebar: #eaeef2;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: var(--bg);
    color: var(--text);
    min-height: 100vh;
    display: flex;
}

a { color: var(--blue); text-decoration: none; }

/* Sidebar */
.sidebar {
    width: 220px;
    min-height: 100vh;
    background: var(--sidebar);
    border-right: 1px solid var(--border);
    padding: 20px 12px;
}

.brand { font-size: 18px; font-weight: 700; margin-bottom: 24px; padding: 0 8px; }

.nav-link {
    display: block;
    padding: 10px 12px;
    border-radius: 6px;
    color: var(--text-dim);
    margin-bottom: 4px;
}

.nav-link:hover { background: var(--border); color: var(--text); }
.nav-link.active { background: var(--blue); color: #fff; }

.content { flex: 1; padding: 24px; max-width: 1200px; }

/* Header */
header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 24px;
    padding-bottom: 16px;
    border-bottom: 1px solid var(--border);
}

h1 { font-size: 24px; font-weight: 600; }
h2 { font-size: 20px; font-weight: 600; }

.header-controls { display: flex; align-items: center; gap: 12px; flex-wrap: wrap; }

.account-badge {
    padding: 6px 12px;
    border-radius: 20px;
    font-size: 12px;
    font-weight: 600;
    background: rgba(88, 166, 255, 0.15);
    color: var(--blue);
}

/* Buttons */
.btn {
    padding: 8px 16px;
    border-radius: 6px;
    border: none;
    font-size: 13px;
    font-weight: 500;
    cursor: pointer;
}

.btn-primary { background: var(--blue); color: #fff; }
.btn-secondary { background: var(--border); color: var(--text); }

/* Grid Layout */
.grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
    gap: 16px;
    margin-bottom: 16px;
}

.wide { grid-column: 1 / -1; }

/* Cards */
.card {
    background: var(--card);
    border: 1px solid var(--border);
    border-radius: 12px;
    padding: 20px;
}

.card-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    gap: 12px;
    flex-wrap: wrap;
    margin-bottom: 16px;
}

.card-title {
    font-size: 14px;
    color: var(--text-dim);
    text-transform: uppercase;
    letter-spacing: 0.5px;
}

.card-value { font-size: 28px; font-weight: 700; }
.card-sub { font-size: 14px; color: var(--text-dim); margin-top: 6px; }

.metrics { display: flex; flex-wrap: wrap; gap: 16px; margin-top: 12px; }
.metric { flex: 1; min-width: 100px; }
.metric-label { font-size: 11px; color: var(--text-dim); text-transform: uppercase; }
.metric-value { font-size: 16px; font-weight: 600; margin-top: 2px; }

/* Colors */
.positive { color: var(--green); }
.negative { color: var(--red); }
.neutral { color: var(--text-dim); }

/* Tables */
.data-table { width: 100%; border-collapse: collapse; margin-top: 12px; }

.data-table th,
.data-table td {
    text-align: left;
    padding: 10px 8px;
    border-bottom: 1px solid var(--border);
}

.data-table th {
    color: var(--text-dim);
    font-weight: 500;
    font-size: 12px;
    text-transform: uppercase;
}

.data-table tr:last-child td { border-bottom: none; }

.tag { padding: 2px 8px; border-radius: 4px; font-size: 12px; }
.tag-completed { background: rgba(86, 252, 162, 0.15); color: var(--green); }
.tag-pending { background: rgba(210, 153, 34, 0.2); color: var(--yellow); }
.tag-other { background: rgba(139, 148, 158, 0.2); color: var(--text-dim); }

.pager { display: flex; gap: 6px; justify-content: flex-end; margin-top: 12px; }
.pager a, .pager span { padding: 4px 10px; border-radius: 4px; border: 1px solid var(--border); }
.pager .current { background: var(--blue); color: #fff; border-color: var(--blue); }

/* Forms */
.form-row { display: flex; flex-direction: column; gap: 6px; margin-bottom: 14px; }
.form-inline { display: flex; gap: 10px; align-items: flex-end; flex-wrap: wrap; }

label { font-size: 12px; color: var(--text-dim); text-transform: uppercase; }

input, select {
    background: var(--bg);
    border: 1px solid var(--border);
    border-radius: 6px;
    color: var(--text);
    padding: 8px 10px;
    font-size: 14px;
}

.chart-box { min-height: 400px; display: flex; align-items: center; justify-content: center; }
.placeholder { color: var(--text-dim); text-align: center; padding: 40px 0; }

/* Toasts */
.toasts { position: fixed; top: 16px; right: 16px; display: flex; flex-direction: column; gap: 8px; z-index: 20; }
.toast { padding: 10px 16px; border-radius: 8px; font-size: 13px; background: var(--card); border: 1px solid var(--border); }
.toast-success { border-color: var(--green); color: var(--green); }
.toast-info { border-color: var(--blue); color: var(--blue); }
.toast-warning { border-color: var(--yellow); color: var(--yellow); }
.toast-error { border-color: var(--red); color: var(--red); }

/* Modal */
.modal-backdrop {
    position: fixed;
    inset: 0;
    background: rgba(0, 0, 0, 0.6);
    display: flex;
    align-items: center;
    justify-content: center;
    z-index: 30;
}

.modal { max-width: 420px; }
.modal p { margin: 12px 0 20px; color: var(--text-dim); }

/* Responsive */
@media (max-width: 700px) {
    body { flex-direction: column; }
    .sidebar { width: 100%; min-height: auto; }
    .grid { grid-template-columns: 1fr; }
    header { flex-direction: column; gap: 12px; }
}
";
