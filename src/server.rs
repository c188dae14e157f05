//! Simple HTTP server for the interactive dashboard.
//!
//! Serves the HTML page, its layout description, and the update endpoint
//! that turns control changes into chart render instructions. Requests are
//! handled one at a time on the calling thread.

use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::dispatch::{ControlEvent, ControlId, ControlState, DashboardContext, Registry};
use crate::layout::DashboardLayout;
use crate::model::{PayloadRange, RangeError, SiteSelection};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },
}

/// A rejected `/api/update` request.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("unknown trigger control: {0}")]
    UnknownTrigger(String),
    #[error("parameter {name} is not a number: {value}")]
    BadNumber { name: &'static str, value: String },
    #[error(transparent)]
    Range(#[from] RangeError),
}

/// Everything the request handlers need.
pub struct Dashboard {
    pub ctx: DashboardContext,
    pub registry: Registry,
    pub layout: DashboardLayout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn new(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, "application/json", value.to_string())
    }

    fn to_http(&self) -> String {
        let status_text = match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        };

        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nAccess-Control-Allow-Origin: *\r\nConnection: close\r\n\r\n{}",
            self.status, status_text, self.content_type, self.body.len(), self.body
        )
    }
}

/// How long one connection may stall a read or write before it is dropped.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Run the HTTP server until the process is terminated.
pub fn run_server(dashboard: &Dashboard, host: &str, port: u16) -> Result<(), ServerError> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).map_err(|source| ServerError::Bind {
        addr: addr.clone(),
        source,
    })?;

    info!("Server running at: http://{}", addr);
    info!("Press Ctrl+C to stop");

    serve(listener, dashboard, REQUEST_TIMEOUT);
    Ok(())
}

/// Accept loop. A client that goes quiet for `timeout` is dropped so the
/// next connection can be served.
fn serve(listener: TcpListener, dashboard: &Dashboard, timeout: Duration) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(e) = handle_connection(stream, dashboard, timeout) {
                    warn!(error = %e, "failed to answer request");
                }
            }
            Err(e) => warn!(error = %e, "connection error"),
        }
    }
}

fn handle_connection(
    mut stream: TcpStream,
    dashboard: &Dashboard,
    timeout: Duration,
) -> io::Result<()> {
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    let mut buffer = [0; 4096];
    let read = stream.read(&mut buffer)?;

    let request = String::from_utf8_lossy(&buffer[..read]);
    let first_line = request.lines().next().unwrap_or("");
    let response = route(first_line, dashboard);
    debug!(request = first_line, status = response.status, "handled request");

    stream.write_all(response.to_http().as_bytes())?;
    stream.flush()
}

/// Answer one request given its request line (`GET /path?query HTTP/1.1`).
pub fn route(request_line: &str, dashboard: &Dashboard) -> HttpResponse {
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("");
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };

    if method != "GET" {
        return HttpResponse::new(404, "text/plain", "Not Found");
    }

    match path {
        "/" | "/index.html" => HttpResponse::new(200, "text/html", PAGE_HTML),
        "/api/layout" => match serde_json::to_value(&dashboard.layout) {
            Ok(value) => HttpResponse::json(200, &value),
            Err(e) => HttpResponse::json(500, &json!({ "error": e.to_string() })),
        },
        "/api/health" => HttpResponse::json(
            200,
            &json!({ "status": "ok", "rows": dashboard.ctx.table().len() }),
        ),
        "/api/update" => serve_update(&extract_query(query), dashboard),
        _ => HttpResponse::new(404, "text/plain", "Not Found"),
    }
}

fn extract_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn serve_update(query: &HashMap<String, String>, dashboard: &Dashboard) -> HttpResponse {
    let event = match parse_event(query, &dashboard.ctx) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "rejected update request");
            return HttpResponse::json(400, &json!({ "error": e.to_string() }));
        }
    };

    let outputs = dashboard.registry.dispatch(&dashboard.ctx, &event);
    match serde_json::to_value(&outputs) {
        Ok(outputs) => HttpResponse::json(200, &json!({ "outputs": outputs })),
        Err(e) => HttpResponse::json(500, &json!({ "error": e.to_string() })),
    }
}

/// Build a control event from query parameters. Missing bounds default to
/// the observed payload extremes; a missing trigger is the initial render.
pub fn parse_event(
    query: &HashMap<String, String>,
    ctx: &DashboardContext,
) -> Result<ControlEvent, RequestError> {
    let trigger = match query.get("trigger").map(|s| s.as_str()) {
        None | Some("") => None,
        Some(id) => Some(
            ControlId::from_str(id).ok_or_else(|| RequestError::UnknownTrigger(id.to_string()))?,
        ),
    };

    let site = SiteSelection::from_str(query.get("site").map(|s| s.as_str()).unwrap_or(""));
    let initial = ctx.initial_state().payload;
    let low = parse_bound(query, "low")?.unwrap_or(initial.low());
    let high = parse_bound(query, "high")?.unwrap_or(initial.high());
    let payload = PayloadRange::new(low, high)?;

    Ok(ControlEvent {
        trigger,
        state: ControlState { site, payload },
    })
}

fn parse_bound(
    query: &HashMap<String, String>,
    name: &'static str,
) -> Result<Option<f64>, RequestError> {
    match query.get(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| RequestError::BadNumber {
                name,
                value: value.clone(),
            }),
    }
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>SpaceX Launch Records Dashboard</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
        :root {
            --bg-primary: #ffffff;
            --bg-secondary: #f8fafc;
            --text-heading: #503D36;
            --text-secondary: #64748b;
            --border-color: #e2e8f0;
            --space-2: 8px;
            --space-4: 16px;
            --space-6: 32px;
            --radius-md: 10px;
            --font-sans: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
        }

        * { box-sizing: border-box; margin: 0; padding: 0; }

        body {
            font-family: var(--font-sans);
            background: var(--bg-primary);
            padding: var(--space-6);
        }

        h1 {
            text-align: center;
            color: var(--text-heading);
            font-size: 40px;
            margin-bottom: var(--space-6);
        }

        .control-group { margin-bottom: var(--space-4); }
        .control-label { color: var(--text-secondary); margin-bottom: var(--space-2); }

        select, input[type="search"] {
            width: 100%;
            padding: var(--space-2);
            border: 1px solid var(--border-color);
            border-radius: var(--radius-md);
        }

        .range-row { display: flex; gap: var(--space-4); align-items: center; }
        .range-row input[type="range"] { flex: 1; }

        .chart-card {
            background: var(--bg-secondary);
            border: 1px solid var(--border-color);
            border-radius: var(--radius-md);
            padding: var(--space-4);
            margin-bottom: var(--space-6);
        }
        .chart-title { font-weight: 600; margin-bottom: var(--space-2); }
        .chart-wrapper { position: relative; height: 380px; }
    </style>
</head>
<body>
    <h1 id="heading"></h1>

    <div class="control-group">
        <input type="search" id="site-search">
        <select id="site-dropdown"></select>
    </div>

    <div class="chart-card">
        <div class="chart-title" id="success-pie-chart-title"></div>
        <div class="chart-wrapper"><canvas id="success-pie-chart"></canvas></div>
    </div>

    <div class="control-group">
        <div class="control-label">Payload range (Kg): <span id="payload-value"></span></div>
        <div class="range-row">
            <input type="range" id="payload-low" list="payload-marks">
            <input type="range" id="payload-high" list="payload-marks">
        </div>
        <datalist id="payload-marks"></datalist>
    </div>

    <div class="chart-card">
        <div class="chart-title" id="success-payload-scatter-chart-title"></div>
        <div class="chart-wrapper"><canvas id="success-payload-scatter-chart"></canvas></div>
    </div>

    <script>
        const charts = {};
        const palette = ['#636efa', '#ef553b', '#00cc96', '#ab63fa', '#ffa15a', '#19d3f3', '#ff6692'];
        let layout;

        function controlState() {
            let low = parseFloat(document.getElementById('payload-low').value);
            let high = parseFloat(document.getElementById('payload-high').value);
            if (low > high) { [low, high] = [high, low]; }
            document.getElementById('payload-value').textContent = `${low} - ${high}`;
            return {
                site: document.getElementById('site-dropdown').value,
                low: low.toString(),
                high: high.toString()
            };
        }

        async function update(trigger) {
            const params = new URLSearchParams(controlState());
            if (trigger) params.set('trigger', trigger);
            const res = await fetch('/api/update?' + params);
            const data = await res.json();
            if (!res.ok) { console.error(data.error); return; }
            data.outputs.forEach(o => render(o.output, o.figure));
        }

        function render(id, figure) {
            document.getElementById(id + '-title').textContent = figure.title;
            if (charts[id]) charts[id].destroy();
            const canvas = document.getElementById(id);
            if (figure.kind === 'pie') {
                charts[id] = new Chart(canvas, {
                    type: 'pie',
                    data: {
                        labels: figure.slices.map(s => s.label),
                        datasets: [{
                            data: figure.slices.map(s => s.value),
                            backgroundColor: figure.slices.map((s, i) => s.color || palette[i % palette.length])
                        }]
                    },
                    options: { responsive: true, maintainAspectRatio: false }
                });
            } else {
                charts[id] = new Chart(canvas, {
                    type: 'scatter',
                    data: {
                        datasets: figure.series.map((s, i) => ({
                            label: s.name,
                            data: s.points.map(p => ({ x: p.x, y: p.y })),
                            backgroundColor: palette[i % palette.length]
                        }))
                    },
                    options: {
                        responsive: true,
                        maintainAspectRatio: false,
                        scales: {
                            x: { title: { display: true, text: figure.x_label } },
                            y: { title: { display: true, text: figure.y_label }, min: -0.2, max: 1.2, ticks: { stepSize: 1 } }
                        }
                    }
                });
            }
        }

        function buildControls() {
            document.getElementById('heading').textContent = layout.heading;

            const dropdown = document.getElementById('site-dropdown');
            const search = document.getElementById('site-search');
            search.placeholder = layout.dropdown.placeholder;
            search.hidden = !layout.dropdown.searchable;
            const fill = filter => {
                const current = dropdown.value || layout.dropdown.value;
                dropdown.innerHTML = '';
                layout.dropdown.options
                    .filter(o => o.value === current || !filter || o.label.toLowerCase().includes(filter.toLowerCase()))
                    .forEach(o => {
                        const opt = document.createElement('option');
                        opt.value = o.value;
                        opt.textContent = o.label;
                        dropdown.appendChild(opt);
                    });
                dropdown.value = current;
            };
            fill('');
            search.addEventListener('input', () => fill(search.value));
            dropdown.addEventListener('change', () => update(layout.dropdown.id));

            const s = layout.slider;
            const marks = document.getElementById('payload-marks');
            s.marks.forEach(m => {
                const opt = document.createElement('option');
                opt.value = m;
                opt.label = `${m}`;
                marks.appendChild(opt);
            });
            ['payload-low', 'payload-high'].forEach((id, i) => {
                const input = document.getElementById(id);
                input.min = s.min;
                input.max = s.max;
                input.step = s.step > 0 ? s.step : 'any';
                input.value = s.value[i];
                input.addEventListener('change', () => update(s.id));
                input.addEventListener('input', controlState);
            });
        }

        fetch('/api/layout')
            .then(res => res.json())
            .then(data => {
                layout = data;
                buildControls();
                update(null);
            });
    </script>
</body>
</html>"#;
