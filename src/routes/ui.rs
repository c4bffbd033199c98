use axum::{response::Html, routing::get, Router};

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Semascope - Sperm Motility Analysis</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 2rem; color: #1d1d1f; max-width: 860px; }
    h1 { margin-bottom: 0.25rem; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    button { margin-top: 0.5rem; padding: 0.6rem 1rem; }
    table { width: 100%; border-collapse: collapse; }
    th, td { text-align: left; padding: 0.4rem; border-bottom: 1px solid #eee; font-size: 0.9rem; }
    .bar { background: #e5e7eb; border-radius: 4px; height: 14px; margin: 0.2rem 0 0.6rem; }
    .bar > div { height: 100%; border-radius: 4px; background: #2563eb; }
    .metric { display: inline-block; margin-right: 1.5rem; }
    .metric b { display: block; font-size: 1.3rem; }
    #progressMsg { color: #555; font-size: 0.9rem; }
    .error { color: #b91c1c; }
  </style>
</head>
<body>
  <h1>Semascope</h1>
  <p>Upload a microscopy video of a semen sample (video/*, up to 100 MiB) to run a motility analysis.</p>

  <div class="card">
    <h2>1) Upload sample video</h2>
    <input id="fileInput" type="file" accept="video/*" />
    <button id="analyzeBtn">Start analysis</button>
    <div id="progressMsg"></div>
    <div class="bar"><div id="progressBar" style="width:0%"></div></div>
    <div id="uploadError" class="error"></div>
  </div>

  <div class="card" id="resultCard" style="display:none">
    <h2>Latest result</h2>
    <div>
      <span class="metric"><b id="rCount"></b>sperm count</span>
      <span class="metric"><b id="rSpeed"></b>avg speed (um/s)</span>
      <span class="metric"><b id="rMotility"></b>motility %</span>
      <span class="metric"><b id="rConcentration"></b>million/mL</span>
    </div>
    <h3>Movement pattern</h3>
    <div id="rPattern"></div>
    <h3>Morphology</h3>
    <div id="rMorphology"></div>
  </div>

  <div class="card">
    <h2>History</h2>
    <table>
      <thead><tr><th>Date</th><th>File</th><th>Count</th><th>Motility</th><th></th></tr></thead>
      <tbody id="historyRows"></tbody>
    </table>
  </div>

  <script>
    const analyzeBtn = document.getElementById('analyzeBtn');
    const fileInput = document.getElementById('fileInput');
    const progressMsg = document.getElementById('progressMsg');
    const progressBar = document.getElementById('progressBar');
    const uploadError = document.getElementById('uploadError');

    function barRow(label, value) {
      return '<div>' + label + ': ' + value + '%</div>' +
        '<div class="bar"><div style="width:' + Math.min(value, 100) + '%"></div></div>';
    }

    function showResult(r) {
      document.getElementById('resultCard').style.display = '';
      document.getElementById('rCount').textContent = r.spermCount;
      document.getElementById('rSpeed').textContent = r.speedAvg;
      document.getElementById('rMotility').textContent = r.motility ?? '-';
      document.getElementById('rConcentration').textContent = r.concentration ?? '-';
      const p = r.movementPattern;
      document.getElementById('rPattern').innerHTML =
        barRow('Progressive', p.progressive) +
        barRow('Non-progressive', p.nonProgressive) +
        barRow('Immobile', p.immobile);
      const m = r.morphology;
      document.getElementById('rMorphology').innerHTML = m
        ? barRow('Normal', m.normal) + barRow('Abnormal', m.abnormal)
        : '<div>Not reported</div>';
    }

    async function refreshHistory() {
      const res = await fetch('/api/history');
      const history = await res.json();
      const rows = document.getElementById('historyRows');
      rows.innerHTML = '';
      for (const r of history) {
        const tr = document.createElement('tr');
        tr.innerHTML = '<td>' + new Date(r.timestamp).toLocaleString() + '</td>' +
          '<td>' + r.filename + '</td>' +
          '<td>' + r.spermCount + '</td>' +
          '<td>' + (r.motility ?? '-') + '</td>' +
          '<td><button data-view="' + r.id + '">View</button> ' +
          '<button data-del="' + r.id + '">Delete</button></td>';
        rows.appendChild(tr);
      }
      rows.querySelectorAll('[data-view]').forEach(btn => btn.onclick = async () => {
        const res = await fetch('/api/history/' + btn.dataset.view);
        if (res.ok) showResult(await res.json());
      });
      rows.querySelectorAll('[data-del]').forEach(btn => btn.onclick = async () => {
        await fetch('/api/history/' + btn.dataset.del, { method: 'DELETE' });
        refreshHistory();
      });
    }

    async function pollProgress() {
      const res = await fetch('/api/analyze/progress');
      const progress = await res.json();
      if (progress) {
        progressMsg.textContent = progress.message + ' (' + progress.stage + ')';
        progressBar.style.width = progress.progress + '%';
      }
    }

    analyzeBtn.onclick = async () => {
      uploadError.textContent = '';
      const file = fileInput.files[0];
      if (!file) { uploadError.textContent = 'Choose a video file first.'; return; }

      analyzeBtn.disabled = true;
      const poller = setInterval(pollProgress, 400);
      try {
        const form = new FormData();
        form.append('file', file);
        const res = await fetch('/api/analyze', { method: 'POST', body: form });
        const body = await res.json();
        if (!res.ok) {
          uploadError.textContent = body.error || 'Analysis failed.';
        } else {
          progressBar.style.width = '100%';
          progressMsg.textContent = 'Analysis complete!';
          showResult(body);
          refreshHistory();
        }
      } catch (err) {
        uploadError.textContent = 'Analysis failed: ' + err;
      } finally {
        clearInterval(poller);
        analyzeBtn.disabled = false;
      }
    };

    refreshHistory();
  </script>
</body>
</html>"#)
}
