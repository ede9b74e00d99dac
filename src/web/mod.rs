//! Embedded web dashboard for optic.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page metrics dashboard
//! - JSON API endpoints for every report plus health
//!
//! Launched via `optic web` (default: `http://127.0.0.1:9317`).
//!
//! Requests are handled sequentially, which also means report responses
//! can never arrive out of order — no stale-response handling needed.

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address.
///
/// Blocks the current thread. Errors are handled per-request without
/// crashing the server.
pub fn serve(addr: &str) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("optic dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    // Try to open in default browser (best-effort)
    let url = format!("http://{addr}");
    let _ = open_browser(&url);

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let result = dispatch(&method, &url);

        match result {
            Ok(resp) => {
                let _ = request.respond(resp);
            }
            Err(e) => {
                let body = serde_json::json!({ "error": e.to_string() }).to_string();
                let resp = Response::from_data(body.into_bytes())
                    .with_header(content_type_json())
                    .with_status_code(StatusCode(500));
                let _ = request.respond(resp);
            }
        }

        // Brief access log
        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(method: &Method, url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // API — Reports (all accept ?batch=ID)
        (&Method::Get, "/api/overview") => api::get_overview(url),
        (&Method::Get, "/api/confidence") => api::get_confidence(url),
        (&Method::Get, "/api/timing") => api::get_timing(url),
        (&Method::Get, "/api/boxes") => api::get_boxes(url),
        (&Method::Get, "/api/proportions") => api::get_proportions(url),
        (&Method::Get, "/api/detections") => api::get_detections(url),
        (&Method::Get, "/api/precision") => api::get_precision(url),
        (&Method::Get, "/api/classes") => api::get_classes(url),
        (&Method::Get, "/api/batches") => api::get_batches(url),

        // API — Health
        (&Method::Get, "/api/health") => api::get_health(),

        // 404
        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    let html = frontend::INDEX_HTML;
    Response::from_data(html.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// 404 response.
fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
