//! Embedded browser viewer.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page viewer with credential inputs, fetch buttons, data grids
//!   and the dashboard → cards selector
//! - JSON API endpoints that drive the session controller
//!
//! Launched via `domo-viewer web` (default: `http://127.0.0.1:9747`).
//!
//! The server owns exactly one [`Session`]. Requests are handled one at a
//! time, so every interaction runs to completion (network calls included)
//! before the next one is looked at.

mod api;
mod frontend;

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::client::ContentApi;
use crate::session::{ResourceKind, Session};

pub use api::Reply;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the viewer on `addr` and block serving requests.
pub fn serve<A: ContentApi>(addr: &str, open: bool, mut session: Session<A>) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("domo-viewer running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if open {
        // Best-effort; the URL is printed above either way.
        let _ = open_browser(&format!("http://{addr}"));
    }

    run(&server, &mut session);
    Ok(())
}

/// Handle requests from `server` until it shuts down.
pub fn run<A: ContentApi>(server: &Server, session: &mut Session<A>) {
    for request in server.incoming_requests() {
        handle(request, session);
    }
}

fn handle<A: ContentApi>(mut request: Request, session: &mut Session<A>) {
    let method = request.method().clone();
    let url = request.url().to_string();

    // Read body up-front for methods that carry one
    let body = if matches!(method, Method::Put | Method::Post) {
        read_body(request.as_reader()).map(Some)
    } else {
        Ok(None)
    };

    let reply = match body {
        Ok(body) => dispatch(session, &method, &url, body.as_deref()).unwrap_or_else(|e| {
            Reply::json_value(500, &serde_json::json!({ "error": format!("{e:#}") }))
        }),
        Err(reply) => reply,
    };
    let status = reply.status;
    let _ = request.respond(into_response(reply));

    // Brief access log
    println!(
        "{} {} {} {}",
        method,
        url,
        status,
        chrono::Local::now().format("%H:%M:%S")
    );
}

/// Read a request body as UTF-8; an unreadable body becomes a 400 reply.
fn read_body<R: Read>(mut reader: R) -> std::result::Result<String, Reply> {
    let mut buf = String::new();
    match reader.read_to_string(&mut buf) {
        Ok(_) => Ok(buf),
        Err(e) => Err(Reply::json_value(
            400,
            &serde_json::json!({ "error": format!("could not read request body: {e}") }),
        )),
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Route a request to its handler.
///
/// `/api/x` and `/api/x/` are the same route.
pub fn dispatch<A: ContentApi>(
    session: &mut Session<A>,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Reply> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(Reply::html(frontend::INDEX_HTML)),

        // API: Session
        (&Method::Get, "/api/session") => api::get_session(session),
        (&Method::Put, "/api/credentials") => api::put_credentials(session, body.unwrap_or("{}")),

        // API: Fetch actions
        (&Method::Post, "/api/datasets") => api::post_fetch(session, ResourceKind::Datasets),
        (&Method::Post, "/api/dashboards") => api::post_fetch(session, ResourceKind::Dashboards),
        (&Method::Post, "/api/dataflows") => api::post_fetch(session, ResourceKind::Dataflows),
        (&Method::Post, "/api/dashboards/select") => {
            api::post_select(session, body.unwrap_or("{}"))
        }

        // 404
        _ => Ok(Reply::json_value(404, &serde_json::json!({ "error": "not found" }))),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn into_response(reply: Reply) -> Response<Cursor<Vec<u8>>> {
    let response = Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
    match Header::from_bytes("Content-Type", reply.content_type) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
