use crate::server::api::{self, ApiContext};

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }

    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

pub fn route_request(ctx: &ApiContext, method: &str, path: &str, body: &str) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    match (method, path) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
        },
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/dataset") => match api::dataset_payload(ctx) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/frequency") => match api::frequency_payload(ctx) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/simulate") => match api::simulate_payload(ctx, body) {
            Ok(payload) => HttpResponse::json(payload),
            Err(api::SimulateError::Parse(err)) => {
                error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
            }
            Err(api::SimulateError::Validation(msg)) => error_response(400, "Bad Request", &msg),
            Err(api::SimulateError::Internal(msg)) => {
                tracing::error!(%msg, "simulation failed");
                error_response(500, "Internal Server Error", &msg)
            }
        },
        ("GET", "/api/sweep") => match api::sweep_payload(ctx) {
            Ok(payload) => HttpResponse::json(payload),
            Err(api::SimulateError::Validation(msg)) => error_response(400, "Bad Request", &msg),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

pub fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>mcforecast</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 2rem; }
    table { border-collapse: collapse; margin-bottom: 1.5rem; }
    th, td { border: 1px solid #ccc; padding: 0.25rem 0.6rem; text-align: right; }
    #prediction { font-weight: bold; }
  </style>
</head>
<body>
  <h1>Monte Carlo forecast</h1>
  <h2>Probability intervals</h2>
  <table id="frequency"></table>
  <label>Draws <input id="draws" type="number" min="1" max="20" value="5" /></label>
  <button id="simulate-btn">Simulate</button>
  <h2>Simulation</h2>
  <table id="trace"></table>
  <p id="prediction"></p>
  <script>
    function fill(table, columns, rows) {
      table.innerHTML = '<tr>' + columns.map(c => '<th>' + c + '</th>').join('') + '</tr>' +
        rows.map(r => '<tr>' + columns.map(c => '<td>' + r[c] + '</td>').join('') + '</tr>').join('');
    }
    fetch('/api/frequency').then(r => r.json()).then(data => {
      fill(document.getElementById('frequency'),
        ['no', 'category', 'count', 'probability', 'cumulative', 'interval'], data.rows);
    });
    document.getElementById('simulate-btn').addEventListener('click', async () => {
      const draws = Number(document.getElementById('draws').value) || 5;
      const response = await fetch('/api/simulate', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ draws }),
      });
      const data = await response.json();
      if (!response.ok) {
        document.getElementById('prediction').textContent = data.message;
        return;
      }
      fill(document.getElementById('trace'),
        ['index', 'seed_in', 'raw', 'modded', 'scaled_digit', 'predicted_category', 'predicted_count'],
        data.report.steps);
      const p = data.report.prediction;
      document.getElementById('prediction').textContent =
        'Predicted count for the next period: ' + p.count + ' (as in ' + p.category + ')';
    });
  </script>
</body>
</html>
"#
    .to_string()
}
