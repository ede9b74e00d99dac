//! Embedded single-page frontend for the optic dashboard.
//!
//! No build step, no external assets: plain HTML/CSS/JS served from a
//! string constant. Charts are CSS bar charts fed by the JSON API.

pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>optic — classification metrics</title>
<style>
  :root { --bg:#12141a; --card:#1c1f27; --ink:#e4e6eb; --dim:#8a8f9c; --accent:#36c5f0; --bar:#2c7fb8; }
  * { box-sizing: border-box; }
  body { margin:0; font-family: ui-sans-serif, system-ui, sans-serif; background:var(--bg); color:var(--ink); }
  header { display:flex; align-items:center; gap:16px; padding:16px 24px; border-bottom:1px solid #2a2e38; }
  header h1 { font-size:18px; margin:0; color:var(--accent); }
  header select { background:var(--card); color:var(--ink); border:1px solid #2a2e38; border-radius:6px; padding:6px 10px; }
  #status { margin-left:auto; font-size:13px; color:var(--dim); }
  main { display:grid; grid-template-columns:repeat(auto-fill, minmax(420px, 1fr)); gap:16px; padding:24px; }
  .card { background:var(--card); border-radius:10px; padding:16px 20px; }
  .card h2 { font-size:14px; margin:0 0 12px; color:var(--dim); text-transform:uppercase; letter-spacing:.06em; }
  .stat-row { display:flex; gap:24px; flex-wrap:wrap; margin-bottom:8px; }
  .stat .v { font-size:22px; font-weight:600; }
  .stat .k { font-size:12px; color:var(--dim); }
  .bars { display:flex; flex-direction:column; gap:4px; margin-top:8px; }
  .bar-row { display:grid; grid-template-columns:130px 1fr 48px; align-items:center; gap:8px; font-size:12px; }
  .bar-row .lbl { color:var(--dim); white-space:nowrap; overflow:hidden; text-overflow:ellipsis; }
  .bar-row .track { background:#252936; border-radius:3px; height:14px; }
  .bar-row .fill { background:var(--bar); border-radius:3px; height:14px; }
  .bar-row .n { text-align:right; color:var(--dim); }
  .empty { color:var(--dim); font-style:italic; padding:12px 0; }
  table { width:100%; border-collapse:collapse; font-size:13px; }
  th, td { text-align:left; padding:4px 8px; border-bottom:1px solid #2a2e38; }
  th { color:var(--dim); font-weight:500; }
  td.num, th.num { text-align:right; }
</style>
</head>
<body>
<header>
  <h1>optic</h1>
  <select id="batch"><option value="">All Batches</option></select>
  <span id="status"></span>
</header>
<main>
  <section class="card" id="overview"><h2>Overview</h2><div class="body"></div></section>
  <section class="card" id="confidence"><h2>Confidence</h2><div class="body"></div></section>
  <section class="card" id="timing-pre"><h2>Preprocessing Time</h2><div class="body"></div></section>
  <section class="card" id="timing-inference"><h2>Inference Time</h2><div class="body"></div></section>
  <section class="card" id="timing-post"><h2>Postprocessing Time</h2><div class="body"></div></section>
  <section class="card" id="boxes"><h2>Bounding Box Sizes</h2><div class="body"></div></section>
  <section class="card" id="proportions"><h2>Box Proportions</h2><div class="body"></div></section>
  <section class="card" id="detections"><h2>Detections per Image</h2><div class="body"></div></section>
  <section class="card" id="precision"><h2>Class Precision</h2><div class="body"></div></section>
  <section class="card" id="classes"><h2>Class Distribution</h2><div class="body"></div></section>
</main>
<script>
const $ = (sel) => document.querySelector(sel);
const body = (id) => $('#' + id + ' .body');

function withBatch(path) {
  const batch = $('#batch').value;
  if (!batch) return path;
  return path + (path.includes('?') ? '&' : '?') + 'batch=' + encodeURIComponent(batch);
}

async function fetchJson(path) {
  const res = await fetch(withBatch(path));
  if (!res.ok) {
    const err = await res.json().catch(() => ({}));
    throw new Error(err.error || ('HTTP ' + res.status));
  }
  return res.json();
}

function empty(el) { el.innerHTML = '<div class="empty">No data available</div>'; }
function failed(el, e) { el.innerHTML = '<div class="empty">Error: ' + e.message + '</div>'; }

function stat(k, v) {
  return '<div class="stat"><div class="v">' + v + '</div><div class="k">' + k + '</div></div>';
}

function histogram(hist) {
  const max = Math.max(1, ...hist.bins.map(b => b.count));
  const rows = hist.bins.map(b =>
    '<div class="bar-row"><span class="lbl" title="' + b.label + '">' + b.label + '</span>' +
    '<span class="track"><span class="fill" style="width:' + (b.count / max * 100) + '%"></span></span>' +
    '<span class="n">' + b.count + '</span></div>'
  );
  return '<div class="bars">' + rows.join('') + '</div>';
}

async function render(id, path, draw) {
  const el = body(id);
  try {
    const data = await fetchJson(path);
    if (data.no_data) { empty(el); return; }
    el.innerHTML = draw(data);
  } catch (e) {
    failed(el, e);
  }
}

function renderAll() {
  render('overview', '/api/overview', d =>
    '<div class="stat-row">' +
      stat('Images', d.total_images) +
      stat('Avg confidence', d.average_confidence.toFixed(2)) +
      stat('Avg detections', d.average_detections.toFixed(1)) +
      stat('Total latency', d.total_latency_ms.toFixed(1) + ' ms') +
    '</div>');

  render('confidence', '/api/confidence', d =>
    '<div class="stat-row">' +
      stat('Average', d.average.toFixed(2)) +
      stat('High confidence', d.high_confidence_pct.toFixed(1) + '%') +
    '</div>' + histogram(d.histogram));

  for (const phase of ['pre', 'inference', 'post']) {
    render('timing-' + phase, '/api/timing?phase=' + phase, d =>
      '<div class="stat-row">' + stat('Average', d.average_ms.toFixed(1) + ' ms') + '</div>' +
      histogram(d.histogram));
  }

  render('boxes', '/api/boxes', d =>
    '<div class="stat-row">' + stat('Avg area', d.average_area.toFixed(0) + ' px²') + '</div>' +
    histogram(d.histogram));

  render('proportions', '/api/proportions', d =>
    '<div class="stat-row">' + stat('Average', (d.average * 100).toFixed(1) + '%') + '</div>' +
    histogram(d.histogram));

  render('detections', '/api/detections', d =>
    '<div class="stat-row">' + stat('Average', d.average.toFixed(1)) + '</div>' +
    histogram(d.histogram));

  render('precision', '/api/precision', d => {
    const rows = d.classes.map(c =>
      '<tr><td>' + c.label + '</td><td class="num">' + c.classified + '</td>' +
      '<td class="num">' + c.reviewed + '</td>' +
      '<td class="num">' + (c.precision * 100).toFixed(1) + '%</td></tr>').join('');
    return '<div class="stat-row">' +
      stat('Avg precision', (d.average_precision * 100).toFixed(1) + '%') +
      stat('Overall accuracy', (d.overall_accuracy * 100).toFixed(1) + '%') +
      '</div><table><tr><th>Class</th><th class="num">Correct</th>' +
      '<th class="num">Reviewed</th><th class="num">Precision</th></tr>' + rows + '</table>';
  });

  render('classes', '/api/classes', d => {
    const max = Math.max(1, ...d.classes.map(c => c.count));
    const rows = d.classes.map(c =>
      '<div class="bar-row"><span class="lbl" title="' + c.label + '">' + c.label + '</span>' +
      '<span class="track"><span class="fill" style="width:' + (c.count / max * 100) + '%"></span></span>' +
      '<span class="n">' + c.count + '</span></div>').join('');
    return '<div class="bars">' + rows + '</div>';
  });
}

async function loadBatches() {
  try {
    const res = await fetch('/api/batches');
    const data = await res.json();
    const select = $('#batch');
    for (const b of data.batches) {
      const opt = document.createElement('option');
      opt.value = b.id;
      opt.textContent = b.name;
      select.appendChild(opt);
    }
  } catch (e) { /* selector stays on All Batches */ }
}

async function loadHealth() {
  try {
    const res = await fetch('/api/health');
    const h = await res.json();
    $('#status').textContent = h.reachable
      ? 'backend: ' + h.endpoint
      : 'backend unreachable: ' + h.endpoint;
  } catch (e) {
    $('#status').textContent = 'health check failed';
  }
}

$('#batch').addEventListener('change', renderAll);
loadBatches();
loadHealth();
renderAll();
</script>
</body>
</html>
"##;
