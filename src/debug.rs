extern crate pretty_bytes;
extern crate querystring;
extern crate serde_json;
extern crate std;
extern crate tiny_http;

use crate::result;
use crate::structs::TelemetrySnapshot;

pub type SharedSnapshot = std::sync::Arc<std::sync::Mutex<TelemetrySnapshot>>;

type Page = tiny_http::Response<std::io::Cursor<Vec<u8>>>;

pub fn run_debug_server(port: &str, log_dir: &str, latest: SharedSnapshot) -> result::SeoulDashResult<()> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| result::make_error(&format!("debug server on port {}: {}", port, e)))?;

    debug!("Running debug HTTP server on port {}", port);
    for request in server.incoming_requests() {
        let url = request.url().to_string();
        let (path, query) = match url.find('?') {
            Some(i) => (&url[..i], &url[i + 1..]),
            None => (url.as_str(), ""),
        };

        let page = match (request.method(), path) {
            (&tiny_http::Method::Get, "/") => main_page(log_dir),
            (&tiny_http::Method::Get, "/snapshot.json") => snapshot_json(&latest),
            (&tiny_http::Method::Get, "/dumplog") => dump_log(log_dir, query),
            (_, _) => Err(result::make_error("not found")),
        };

        let response = page.unwrap_or_else(|err| {
            debug!("Debug request for {} failed: {}", url, err);
            return with_content_type(
                tiny_http::Response::from_string("<h1>404</h1><p>Not found!<p>").with_status_code(404),
                "text/html; charset=utf-8");
        });
        if let Err(err) = request.respond(response) {
            warn!("Couldn't answer debug request: {}", err);
        }
    }

    return Ok(());
}

fn with_content_type(page: Page, value: &str) -> Page {
    match tiny_http::Header::from_bytes(&b"Content-Type"[..], value.as_bytes()) {
        Ok(header) => page.with_header(header),
        Err(_) => page,
    }
}

/// Only bare `*.log` names, so the query can't reach outside the log dir.
fn which_log(query: &str) -> Option<String> {
    for (k, v) in querystring::querify(query) {
        if k == "log" && v.ends_with(".log") && !v.contains('/') && !v.contains("..") {
            return Some(v.to_string());
        }
    }
    return None;
}

fn dump_log(log_dir: &str, query: &str) -> result::SeoulDashResult<Page> {
    let filename = which_log(query).ok_or(result::make_error("no log requested"))?;
    let contents = std::fs::read(std::path::Path::new(log_dir).join(filename))?;
    return Ok(with_content_type(tiny_http::Response::from_data(contents), "text/plain; charset=utf-8"));
}

fn snapshot_json(latest: &SharedSnapshot) -> result::SeoulDashResult<Page> {
    let snapshot = latest.lock()
        .map_err(|_| result::make_error("snapshot lock poisoned"))?
        .clone();
    let body = serde_json::to_vec_pretty(&snapshot)?;
    return Ok(with_content_type(tiny_http::Response::from_data(body), "application/json"));
}

fn main_page(log_dir: &str) -> result::SeoulDashResult<Page> {
    let mut body = format!("<html><body><h1>SeoulDash Debug Server</h1><div>Version {}</div>",
                           env!("CARGO_PKG_VERSION"));

    body.push_str("<div><h2>Latest snapshot</h2><a href='/snapshot.json'>snapshot.json</a></div>");

    body.push_str("<div><h2>Log files</h2><ul>");
    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let filename = entry.file_name().to_string_lossy().to_string();
        if filename.ends_with(".log") {
            body.push_str(&format!("<li><a href='/dumplog?log={}'>{}</a> [{}]</li>",
                                   filename, filename,
                                   pretty_bytes::converter::convert(entry.metadata()?.len() as f64)));
        }
    }
    body.push_str("</ul></div>");

    body.push_str("</body></html>");

    return Ok(with_content_type(tiny_http::Response::from_string(body), "text/html; charset=utf-8"));
}
