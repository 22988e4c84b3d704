use crate::timeline::JobTimeline;
use serde::Serialize;
use std::collections::BTreeMap;

/// One job's timeline, shaped for the embedded report script.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub job: u64,
    pub name: String,
    pub iteration: Vec<u64>,
    pub cumulative_time: Vec<f64>,
    pub duration: Vec<f64>,
    pub skipped: Vec<bool>,
    /// Mean over non-skipped durations; null when the job has none.
    pub mean_iteration_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub simulation_end: f64,
    /// Jobs in presentation order: descending mean iteration cost, so the
    /// tallest series is drawn first and the cheaper ones layer on top.
    pub jobs: Vec<JobView>,
}

/// Shape reconstructed timelines into report data.
pub fn report_data(
    timelines: &BTreeMap<u64, JobTimeline>,
    names: &BTreeMap<u64, String>,
) -> ReportData {
    let mut jobs: Vec<JobView> = timelines
        .values()
        .filter(|timeline| !timeline.is_empty())
        .map(|timeline| JobView {
            job: timeline.job,
            name: names
                .get(&timeline.job)
                .cloned()
                .unwrap_or_else(|| format!("App_{}", timeline.job)),
            iteration: timeline.iteration.clone(),
            cumulative_time: timeline.cumulative_time.clone(),
            duration: timeline.duration.clone(),
            skipped: timeline.skipped.clone(),
            mean_iteration_time: timeline.mean_iteration_time(),
        })
        .collect();

    jobs.sort_by(|a, b| {
        b.mean_iteration_time
            .unwrap_or(0.0)
            .partial_cmp(&a.mean_iteration_time.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.job.cmp(&b.job))
    });

    let simulation_end = jobs
        .iter()
        .filter_map(|j| j.cumulative_time.last().copied())
        .fold(0.0, f64::max);

    ReportData {
        simulation_end,
        jobs,
    }
}

/// Render a self-contained HTML report (data embedded as JSON).
///
/// Important: we avoid `format!()` because the HTML contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(data: &ReportData) -> anyhow::Result<String> {
    let json = serde_json::to_string(data)?; // embedded as JS object literal

    const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Job iteration timelines</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .swatch { display: inline-block; width: 10px; height: 10px; border-radius: 2px; margin-right: 4px; }
  .plot { padding: 12px 16px; }
  .axis { font-size: 12px; fill: #666; }
  .axis-line { stroke: #000; stroke-width: 1; }
</style>
</head>
<body>
<header>
  <div class="summary" id="summary"></div>
</header>

<div class="plot">
  <svg id="chart" width="1200" height="480"></svg>
</div>

<script>
// Embedded report data (JSON object literal)
const DATA = __DATA__;

const PALETTE = ["#d62728", "#1f77b4", "#2ca02c", "#9467bd", "#ff7f0e", "#8c564b"];
const SVG_NS = "http://www.w3.org/2000/svg";

function color(i) {
  return PALETTE[i % PALETTE.length];
}

function lighten(hex, amount) {
  const n = parseInt(hex.slice(1), 16);
  const mix = (c) => Math.round(c + (255 - c) * amount);
  const r = mix((n >> 16) & 255), g = mix((n >> 8) & 255), b = mix(n & 255);
  return `rgb(${r}, ${g}, ${b})`;
}

function el(tag, attrs) {
  const node = document.createElementNS(SVG_NS, tag);
  for (const [k, v] of Object.entries(attrs)) node.setAttribute(k, v);
  return node;
}

function renderSummary() {
  const s = document.getElementById("summary");
  let html = `<span class="pill">simulation end: <b>${DATA.simulation_end}</b> ns</span>`;
  DATA.jobs.forEach((job, i) => {
    const mean = job.mean_iteration_time == null ? "n/a" : job.mean_iteration_time.toFixed(1);
    html += `<span class="pill"><span class="swatch" style="background:${color(i)}"></span>` +
            `${job.name}: <b>${mean}</b> ns/iter</span>`;
  });
  s.innerHTML = html;
}

function renderChart() {
  const svg = document.getElementById("chart");
  const W = svg.clientWidth || 1200, H = svg.clientHeight || 480;
  const pad = { left: 70, right: 20, top: 10, bottom: 40 };

  const maxT = DATA.simulation_end || 1;
  let maxD = 0;
  for (const job of DATA.jobs) for (const d of job.duration) maxD = Math.max(maxD, d);
  if (maxD <= 0) maxD = 1;

  const sx = (t) => pad.left + (t / maxT) * (W - pad.left - pad.right);
  const sy = (d) => H - pad.bottom - (d / maxD) * (H - pad.top - pad.bottom);

  // Baseline + axis labels.
  svg.appendChild(el("line", { x1: sx(0), y1: sy(0), x2: sx(maxT), y2: sy(0), class: "axis-line" }));
  for (let k = 0; k <= 5; k++) {
    const t = (maxT / 5) * k;
    const label = el("text", { x: sx(t), y: H - pad.bottom + 16, "text-anchor": "middle", class: "axis" });
    label.textContent = t.toExponential(1);
    svg.appendChild(label);
  }
  const yLabel = el("text", { x: 12, y: 18, class: "axis" });
  yLabel.textContent = "virtual time per iteration (ns)";
  svg.appendChild(yLabel);

  // One series per job: a shaded box over each measured interval, an impulse
  // at its end, and a marker. Skipped iterations draw nothing.
  DATA.jobs.forEach((job, i) => {
    const c = color(i);
    const n = job.cumulative_time.length;
    for (let k = 0; k < n; k++) {
      if (job.skipped[k]) continue;
      const start = k === 0 ? 0 : job.cumulative_time[k - 1];
      const end = job.cumulative_time[k];
      const d = job.duration[k];
      svg.appendChild(el("rect", {
        x: sx(start), y: sy(d),
        width: Math.max(sx(end) - sx(start), 0.5), height: sy(0) - sy(d),
        fill: lighten(c, 0.75),
      }));
      svg.appendChild(el("line", { x1: sx(end), y1: sy(0), x2: sx(end), y2: sy(d), stroke: lighten(c, 0.3) }));
      svg.appendChild(el("circle", { cx: sx(end), cy: sy(d), r: 2.5, fill: c }));
    }
  });
}

renderSummary();
renderChart();
</script>
</body>
</html>
"##;

    Ok(TEMPLATE.replace("__DATA__", &json))
}
