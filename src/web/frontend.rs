//! Embedded HTML/CSS/JS frontend for the vitals dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>vitals</title>
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
  --purple: #bc8cff;
  --cyan: #39d2c0;
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

.app {
  max-width: 1100px;
  margin: 0 auto;
  padding: 24px;
}

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 20px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}

header h1 {
  font-size: 24px;
  font-weight: 600;
  display: flex;
  align-items: center;
  gap: 10px;
}

header h1 .logo {
  color: var(--accent);
  font-family: var(--mono);
  font-weight: 700;
}

header .subtitle {
  color: var(--text-muted);
  font-size: 13px;
}

.health-badges { display: flex; gap: 8px; }

.badge {
  display: inline-flex;
  align-items: center;
  gap: 4px;
  padding: 4px 10px;
  border-radius: 12px;
  font-size: 12px;
  font-weight: 500;
  background: var(--surface);
  border: 1px solid var(--border);
}

.badge.ok { border-color: var(--green); color: var(--green); }
.badge.err { border-color: var(--red); color: var(--red); }

/* Controls */
.controls {
  display: flex;
  align-items: center;
  gap: 12px;
  flex-wrap: wrap;
  margin-bottom: 16px;
}

.controls label { color: var(--text-muted); font-size: 13px; }

.controls input[type="date"] {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 6px;
  color: var(--text);
  padding: 6px 10px;
  font-family: var(--font);
  font-size: 13px;
  color-scheme: dark;
}

.controls button {
  padding: 8px 18px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: var(--surface);
  color: var(--text);
  font-size: 13px;
  font-weight: 500;
  cursor: pointer;
}

.controls button:hover { border-color: var(--accent); color: var(--accent); }

.controls button.primary {
  background: var(--accent);
  border-color: var(--accent);
  color: #0d1117;
}

.controls button.primary:hover { opacity: 0.9; color: #0d1117; }
.controls button:disabled { opacity: 0.5; cursor: wait; }

/* Error banner */
#banner {
  display: none;
  margin-bottom: 16px;
  padding: 10px 14px;
  border: 1px solid var(--red);
  border-radius: var(--radius);
  background: rgba(248, 81, 73, 0.1);
  color: var(--red);
  font-size: 13px;
}

#banner.show { display: block; }

/* Chart cards */
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
  margin-bottom: 16px;
}

.card h2 {
  font-size: 15px;
  font-weight: 600;
  margin-bottom: 4px;
}

.card .legend {
  color: var(--text-muted);
  font-size: 12px;
  margin-bottom: 8px;
}

.card .legend .swatch {
  display: inline-block;
  width: 18px;
  height: 3px;
  border-radius: 2px;
  vertical-align: middle;
  margin: 0 4px 0 12px;
}

.card svg { width: 100%; height: auto; display: block; }

.card .empty {
  color: var(--text-muted);
  text-align: center;
  padding: 40px 0;
  font-size: 13px;
}

.axis { stroke: rgba(255, 255, 255, 0.3); stroke-width: 1; }
.gridline { stroke: rgba(255, 255, 255, 0.08); stroke-width: 1; }
.tick-label { fill: var(--text-muted); font-size: 10px; font-family: var(--mono); }
.year-line { stroke: var(--red); stroke-width: 1.5; stroke-dasharray: 5 4; }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1><span class="logo">vitals</span> <span class="subtitle">body metrics dashboard</span></h1>
    <div class="health-badges" id="badges"></div>
  </header>

  <div class="controls">
    <label for="start">From</label>
    <input type="date" id="start">
    <label for="end">to</label>
    <input type="date" id="end">
    <button id="reset">Reset range</button>
    <button id="refresh" class="primary">Refresh data</button>
  </div>

  <div id="banner"></div>

  <div class="card">
    <h2>Weight</h2>
    <div class="legend">
      <span class="swatch" style="background:#58a6ff"></span>daily
      <span class="swatch" style="background:#8b949e"></span>7-day average
    </div>
    <div id="weight-chart"></div>
  </div>

  <div class="card">
    <h2>BMI</h2>
    <div class="legend">
      <span class="swatch" style="background:#bc8cff"></span>daily
      <span class="swatch" style="background:#8b949e"></span>7-day average
    </div>
    <div id="bmi-chart"></div>
  </div>

  <div class="card">
    <h2>Body Fat %</h2>
    <div class="legend">
      <span class="swatch" style="background:#39d2c0"></span>daily
      <span class="swatch" style="background:#8b949e"></span>7-day average
    </div>
    <div id="fat-chart"></div>
  </div>
</div>

<script>
'use strict';

const CHARTS = [
  { el: 'weight-chart', key: 'weight', ma: 'weight_ma', color: '#58a6ff' },
  { el: 'bmi-chart',    key: 'bmi',    ma: 'bmi_ma',    color: '#bc8cff' },
  { el: 'fat-chart',    key: 'fat',    ma: 'fat_ma',    color: '#39d2c0' },
];

const W = 900, H = 260, PAD = { top: 12, right: 16, bottom: 28, left: 48 };

let fullRange = null;   // [first, last] dates of the unfiltered table

// --- Data loading ---------------------------------------------------------

async function loadMetrics() {
  const params = new URLSearchParams();
  const start = document.getElementById('start').value;
  const end = document.getElementById('end').value;
  if (start) params.set('start', start);
  if (end) params.set('end', end);

  const qs = params.toString();
  const res = await fetch('/api/metrics' + (qs ? '?' + qs : ''));
  if (!res.ok) throw new Error('failed to load metrics');
  const data = await res.json();
  renderAll(data.rows);
}

async function initRange() {
  const res = await fetch('/api/metrics');
  if (!res.ok) return;
  const data = await res.json();
  if (data.rows.length === 0) return;
  fullRange = [data.rows[0].date, data.rows[data.rows.length - 1].date];
  document.getElementById('start').value = fullRange[0];
  document.getElementById('end').value = fullRange[1];
}

async function loadHealth() {
  try {
    const res = await fetch('/api/health');
    const h = await res.json();
    const badge = (label, ok) =>
      `<span class="badge ${ok ? 'ok' : 'err'}">${label}</span>`;
    document.getElementById('badges').innerHTML =
      badge('config', h.config_exists) +
      badge('raw', h.raw_exists) +
      badge('clean', h.clean_exists);
  } catch (_) { /* badges are cosmetic */ }
}

// --- Rendering ------------------------------------------------------------

function renderAll(rows) {
  for (const chart of CHARTS) {
    renderChart(chart, rows);
  }
}

function renderChart(chart, rows) {
  const el = document.getElementById(chart.el);
  const points = rows
    .map(r => ({ t: Date.parse(r.date), date: r.date, v: r[chart.key], m: r[chart.ma] }))
    .filter(p => p.v !== null || p.m !== null);

  if (points.length === 0) {
    el.innerHTML = '<div class="empty">No data in the selected range.</div>';
    return;
  }

  const t0 = points[0].t, t1 = points[points.length - 1].t;
  const values = [];
  for (const p of points) {
    if (p.v !== null) values.push(p.v);
    if (p.m !== null) values.push(p.m);
  }
  let vMin = Math.min(...values), vMax = Math.max(...values);
  if (vMin === vMax) { vMin -= 1; vMax += 1; }
  const span = vMax - vMin;
  vMin -= span * 0.05; vMax += span * 0.05;

  const x = t => t1 === t0
    ? PAD.left + (W - PAD.left - PAD.right) / 2
    : PAD.left + (t - t0) / (t1 - t0) * (W - PAD.left - PAD.right);
  const y = v => H - PAD.bottom - (v - vMin) / (vMax - vMin) * (H - PAD.top - PAD.bottom);

  let svg = `<svg viewBox="0 0 ${W} ${H}" xmlns="http://www.w3.org/2000/svg">`;

  // Horizontal gridlines + y tick labels
  for (let i = 0; i <= 4; i++) {
    const v = vMin + (vMax - vMin) * i / 4;
    const yy = y(v).toFixed(1);
    svg += `<line class="gridline" x1="${PAD.left}" y1="${yy}" x2="${W - PAD.right}" y2="${yy}"/>`;
    svg += `<text class="tick-label" x="${PAD.left - 6}" y="${yy}" text-anchor="end" dominant-baseline="middle">${v.toFixed(1)}</text>`;
  }

  // X tick labels, at most 8, spaced over the points
  const step = Math.max(1, Math.floor(points.length / 8));
  for (let i = 0; i < points.length; i += step) {
    const p = points[i];
    svg += `<text class="tick-label" x="${x(p.t).toFixed(1)}" y="${H - 8}" text-anchor="middle">${p.date}</text>`;
  }

  // January 1st markers
  for (const p of points) {
    if (p.date.endsWith('-01-01')) {
      const xx = x(p.t).toFixed(1);
      svg += `<line class="year-line" x1="${xx}" y1="${PAD.top}" x2="${xx}" y2="${H - PAD.bottom}"/>`;
    }
  }

  // Axes
  svg += `<line class="axis" x1="${PAD.left}" y1="${PAD.top}" x2="${PAD.left}" y2="${H - PAD.bottom}"/>`;
  svg += `<line class="axis" x1="${PAD.left}" y1="${H - PAD.bottom}" x2="${W - PAD.right}" y2="${H - PAD.bottom}"/>`;

  // Series: daily values, then the moving average on top
  svg += path(points, p => p.v, x, y, chart.color, '');
  svg += path(points, p => p.m, x, y, '#8b949e', 'stroke-dasharray="6 4"');

  svg += '</svg>';
  el.innerHTML = svg;
}

// Build a polyline path, breaking segments at missing values.
function path(points, pick, x, y, color, extra) {
  let d = '', pen = 'M';
  for (const p of points) {
    const v = pick(p);
    if (v === null) { pen = 'M'; continue; }
    d += `${pen}${x(p.t).toFixed(1)} ${y(v).toFixed(1)}`;
    pen = 'L';
  }
  if (d === '') return '';
  return `<path d="${d}" fill="none" stroke="${color}" stroke-width="1.8" ${extra}/>`;
}

// --- Refresh --------------------------------------------------------------

function showBanner(message) {
  const banner = document.getElementById('banner');
  banner.textContent = message;
  banner.classList.add('show');
}

function hideBanner() {
  document.getElementById('banner').classList.remove('show');
}

async function refreshData() {
  const button = document.getElementById('refresh');
  button.disabled = true;
  button.textContent = 'Refreshing…';
  hideBanner();

  try {
    const res = await fetch('/api/refresh', { method: 'POST' });
    if (!res.ok) {
      const body = await res.json().catch(() => ({}));
      showBanner(body.error || `refresh failed (${res.status})`);
    } else {
      await initRange();
      await loadMetrics();
      await loadHealth();
    }
  } catch (e) {
    showBanner('refresh failed: ' + e.message);
  } finally {
    button.disabled = false;
    button.textContent = 'Refresh data';
  }
}

// --- Wiring ---------------------------------------------------------------

document.getElementById('start').addEventListener('change', () => loadMetrics().catch(e => showBanner(e.message)));
document.getElementById('end').addEventListener('change', () => loadMetrics().catch(e => showBanner(e.message)));
document.getElementById('refresh').addEventListener('click', refreshData);
document.getElementById('reset').addEventListener('click', () => {
  if (fullRange) {
    document.getElementById('start').value = fullRange[0];
    document.getElementById('end').value = fullRange[1];
  }
  loadMetrics().catch(e => showBanner(e.message));
});

(async () => {
  await loadHealth();
  await initRange();
  await loadMetrics().catch(e => showBanner(e.message));
})();
</script>
</body>
</html>
"##;
