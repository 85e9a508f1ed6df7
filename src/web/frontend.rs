//! Embedded HTML/CSS/JS frontend for the browser viewer.
//!
//! The entire page is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.

/// The complete single-page viewer HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Domo Content Viewer</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

/* Credentials */
.creds {
  display: grid;
  grid-template-columns: 1fr 1fr;
  gap: 16px;
}
.creds label { display: block; font-size: 12px; color: var(--text-muted); margin-bottom: 4px; }
.creds input, select {
  width: 100%;
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 6px;
  color: var(--text);
  padding: 8px 10px;
  font-size: 13px;
  font-family: var(--mono);
}
.creds input:focus, select:focus { outline: none; border-color: var(--accent); }

/* Navigation */
nav {
  display: flex;
  gap: 4px;
  margin-bottom: 16px;
  background: var(--surface);
  border-radius: var(--radius);
  padding: 4px;
  border: 1px solid var(--border);
}
nav button {
  flex: 1;
  padding: 8px 16px;
  border: none;
  border-radius: 6px;
  background: transparent;
  color: var(--text-muted);
  font-size: 13px;
  font-weight: 500;
  cursor: pointer;
}
nav button:hover { color: var(--text); background: rgba(255,255,255,0.04); }
nav button.active { background: var(--accent); color: #fff; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }
.card h3 { font-size: 14px; font-weight: 600; margin: 16px 0 12px; color: var(--text-muted); }

.toolbar { display: flex; align-items: center; gap: 12px; margin-bottom: 16px; }
.toolbar .state { font-size: 12px; color: var(--text-muted); font-family: var(--mono); }

.stat { display: inline-block; margin-bottom: 16px; }
.stat .value { font-size: 28px; font-weight: 700; font-family: var(--mono); color: var(--accent); }
.stat .label { font-size: 12px; color: var(--text-muted); text-transform: uppercase; letter-spacing: 0.5px; }

/* Tables */
.grid-wrap { overflow-x: auto; }
table { width: 100%; border-collapse: collapse; font-size: 13px; }
th, td { text-align: left; padding: 8px 12px; border-bottom: 1px solid var(--border); }
th {
  color: var(--text-muted);
  font-weight: 500;
  font-size: 12px;
  text-transform: uppercase;
  letter-spacing: 0.5px;
}
td { font-family: var(--mono); font-size: 12px; }
tr:hover { background: rgba(255,255,255,0.02); }

/* Buttons */
.btn {
  padding: 8px 16px;
  border: 1px solid var(--accent);
  border-radius: 6px;
  background: var(--accent);
  color: #fff;
  font-size: 13px;
  cursor: pointer;
}
.btn:hover { opacity: 0.85; }
.btn:disabled { opacity: 0.5; cursor: wait; }

/* Notices */
.notices { margin-bottom: 16px; }
.notice {
  padding: 10px 14px;
  border-radius: 6px;
  margin-bottom: 8px;
  font-size: 13px;
  border: 1px solid var(--border);
  word-break: break-word;
}
.notice.success { border-color: var(--green); color: var(--green); }
.notice.info { border-color: var(--accent); color: var(--accent); }
.notice.warning { border-color: var(--yellow); color: var(--yellow); }
.notice.error { border-color: var(--red); color: var(--red); }

.panel { display: none; }
.panel.active { display: block; }

.empty { text-align: center; padding: 32px 20px; color: var(--text-muted); }

@media (max-width: 768px) {
  .creds { grid-template-columns: 1fr; }
  nav { flex-wrap: wrap; }
}
</style>
</head>
<body>
<div class="app">

  <header>
    <h1>Domo Content Viewer</h1>
    <div class="subtitle">Dashboards, cards, datasets and dataflows of one instance</div>
  </header>

  <div class="card">
    <div class="creds">
      <div>
        <label for="instance">Domo instance (e.g. acme-1)</label>
        <input type="text" id="instance" autocomplete="off" spellcheck="false">
      </div>
      <div>
        <label for="token">Developer token</label>
        <input type="password" id="token" autocomplete="off" placeholder="">
      </div>
    </div>
  </div>

  <div class="notices" id="notices"></div>

  <nav id="nav">
    <button class="active" data-panel="dashboards">Dashboards</button>
    <button data-panel="datasets">Datasets</button>
    <button data-panel="dataflows">Dataflows</button>
  </nav>

  <!-- Dashboards -->
  <div class="panel active" id="panel-dashboards">
    <div class="card">
      <div class="toolbar">
        <button class="btn" data-fetch="dashboards">Fetch Dashboards</button>
        <span class="state" id="state-dashboards"></span>
      </div>
      <div class="stat" id="avg-cards" style="display:none">
        <div class="value" id="avg-cards-value"></div>
        <div class="label">Average cards per dashboard</div>
      </div>
      <div class="grid-wrap" id="grid-dashboards"></div>
    </div>

    <div class="card" id="drilldown" style="display:none">
      <h2>Select Dashboard</h2>
      <select id="dashboard-select"></select>
      <h3 id="cards-heading"></h3>
      <div class="grid-wrap" id="grid-cards"></div>
    </div>
  </div>

  <!-- Datasets -->
  <div class="panel" id="panel-datasets">
    <div class="card">
      <div class="toolbar">
        <button class="btn" data-fetch="datasets">Fetch Datasets</button>
        <span class="state" id="state-datasets"></span>
      </div>
      <div class="grid-wrap" id="grid-datasets"></div>
    </div>
  </div>

  <!-- Dataflows -->
  <div class="panel" id="panel-dataflows">
    <div class="card">
      <div class="toolbar">
        <button class="btn" data-fetch="dataflows">Fetch Dataflows</button>
        <span class="state" id="state-dataflows"></span>
      </div>
      <div class="grid-wrap" id="grid-dataflows"></div>
    </div>
  </div>

</div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
let session = null;
let busy = false;
let tokenEdited = false;

document.getElementById('token').addEventListener('input', () => { tokenEdited = true; });

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  if (!res.ok) throw new Error(data.error || res.status);
  return data;
}

async function pushCredentials() {
  const body = { instance: document.getElementById('instance').value };
  // An untouched field keeps a token handed to `domo-viewer web`; once
  // edited, the field value is sent as is and an empty field clears it.
  if (tokenEdited) body.token = document.getElementById('token').value;
  return api('PUT', '/api/credentials', body);
}

async function runAction(path, body) {
  if (busy) return;
  busy = true;
  setButtons(true);
  try {
    await pushCredentials();
    const result = await api('POST', path, body);
    showNotices(result.notices);
    render(result.session);
    return result;
  } catch (e) {
    showNotices([{ level: 'error', message: 'Request failed: ' + e.message }]);
  } finally {
    busy = false;
    setButtons(false);
  }
}

function setButtons(disabled) {
  document.querySelectorAll('[data-fetch]').forEach(b => b.disabled = disabled);
  document.getElementById('dashboard-select').disabled = disabled;
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------
document.getElementById('nav').addEventListener('click', e => {
  if (e.target.tagName !== 'BUTTON') return;
  const panel = e.target.dataset.panel;
  if (!panel) return;

  document.querySelectorAll('nav button').forEach(b => b.classList.remove('active'));
  e.target.classList.add('active');
  document.querySelectorAll('.panel').forEach(p => p.classList.remove('active'));
  document.getElementById('panel-' + panel).classList.add('active');
});

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------
document.querySelectorAll('[data-fetch]').forEach(btn => {
  btn.addEventListener('click', async () => {
    const kind = btn.dataset.fetch;
    const result = await runAction('/api/' + kind);
    // Like a fresh selectbox, the first dashboard is selected after loading.
    if (kind === 'dashboards' && result && result.session.dashboards.titles.length > 0) {
      await selectDashboard(result.session.dashboards.titles[0], true);
    }
  });
});

document.getElementById('dashboard-select').addEventListener('change', e => {
  selectDashboard(e.target.value, false);
});

async function selectDashboard(title, keepNotices) {
  const before = document.getElementById('notices').innerHTML;
  await runAction('/api/dashboards/select', { title });
  if (keepNotices && before) {
    document.getElementById('notices').insertAdjacentHTML('afterbegin', before);
  }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------
function render(s) {
  session = s;
  const instance = document.getElementById('instance');
  if (!instance.value) instance.value = s.instance;
  document.getElementById('token').placeholder = s.token_set ? 'token set' : '';

  renderResource('datasets', s.datasets);
  renderResource('dataflows', s.dataflows);
  renderResource('dashboards', s.dashboards);

  const avg = document.getElementById('avg-cards');
  if (s.dashboards.average_cards !== null && s.dashboards.state.status === 'loaded') {
    avg.style.display = 'inline-block';
    document.getElementById('avg-cards-value').textContent = s.dashboards.average_cards;
  } else {
    avg.style.display = 'none';
  }

  renderDrilldown(s);
}

function renderResource(name, view) {
  document.getElementById('state-' + name).textContent = stateLabel(view.state);
  const grid = document.getElementById('grid-' + name);
  grid.innerHTML = view.state.status === 'idle' ? '' : table(view.table);
}

function renderDrilldown(s) {
  const box = document.getElementById('drilldown');
  const titles = s.dashboards.titles;
  if (titles.length === 0) {
    box.style.display = 'none';
    return;
  }
  box.style.display = 'block';

  const select = document.getElementById('dashboard-select');
  select.innerHTML = titles.map(t => `<option value="${esc(t)}">${esc(t)}</option>`).join('');
  if (s.selected_title !== null) select.value = s.selected_title;

  const heading = document.getElementById('cards-heading');
  const grid = document.getElementById('grid-cards');
  if (s.selection.status === 'cards_loaded') {
    heading.textContent = `Cards in Dashboard: ${s.selected_title} (ID: ${s.selection.page_id})`;
    grid.innerHTML = table(s.cards);
  } else {
    heading.textContent = '';
    grid.innerHTML = '';
  }
}

function stateLabel(state) {
  switch (state.status) {
    case 'loaded': return state.rows + ' rows';
    case 'failed': return 'failed';
    case 'fetching': return 'fetching…';
    default: return '';
  }
}

function table(t) {
  if (t.rows.length === 0) return '<div class="empty">No rows.</div>';
  const head = t.columns.map(c => `<th>${esc(c)}</th>`).join('');
  const body = t.rows.map(r => '<tr>' + r.map(c => `<td>${esc(c)}</td>`).join('') + '</tr>').join('');
  return `<table><thead><tr>${head}</tr></thead><tbody>${body}</tbody></table>`;
}

function showNotices(notices) {
  document.getElementById('notices').innerHTML = (notices || [])
    .map(n => `<div class="notice ${esc(n.level)}">${esc(n.message)}</div>`)
    .join('');
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------
function esc(s) {
  if (s === undefined || s === null) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
api('GET', '/api/session').then(render).catch(() => {});
</script>
</body>
</html>"##;
