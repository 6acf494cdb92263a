//! HTTP server: accept loop, request dispatch and handlers

use crate::error::{DispatchError, ServerError};
use crate::AppState;
use bytes::Bytes;
use chrono::Utc;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use vigil_common::{protocol, LogEntry, ServerEvent};

/// Bound HTTP server, ready to serve
pub struct HttpServer {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl HttpServer {
    /// Bind the configured address.
    ///
    /// Binding failure is fatal and the only error surfaced to the caller; the
    /// server never enters the serving state.
    pub async fn bind(state: Arc<AppState>) -> Result<Self, ServerError> {
        let addr = state.config.bind_target();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!("HTTP server listening on http://{}", addr);
        Ok(Self { listener, state })
    }

    /// Address actually bound; differs from the configured one when port 0 was
    /// requested.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the shutdown signal fires.
    ///
    /// Each accepted connection runs on its own task so one stalled client
    /// never blocks acceptance of the next. Connection-level faults are logged
    /// and the accept loop continues.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            warn!("accept failed: {}", e);
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);
                    let state = self.state.clone();

                    tokio::spawn(async move {
                        let service = service_fn(move |req| {
                            let state = state.clone();
                            async move { handle_request(state, req).await }
                        });

                        if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                            debug!("connection error from {}: {:?}", remote_addr, err);
                        }
                    });
                }
                _ = shutdown.changed() => {
                    info!("shutdown requested, leaving accept loop");
                    break;
                }
            }
        }
    }
}

/// Dispatch one request: route, handle, respond, then record the outcome.
///
/// Handler faults are converted to error responses here; nothing propagates
/// past this boundary.
async fn handle_request(
    state: Arc<AppState>,
    req: Request<Incoming>,
) -> Result<Response<BoxBody<Bytes, Infallible>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let outcome = match method {
        Method::GET => status_response(&state),
        Method::POST => match req.into_body().collect().await {
            Ok(collected) => echo_response(&state, &collected.to_bytes()),
            Err(e) => Err(DispatchError::Handler(format!(
                "failed to read request body: {}",
                e
            ))),
        },
        _ => Ok(text_response(
            StatusCode::NOT_IMPLEMENTED,
            "Method not supported",
        )),
    };

    let (response, note) = match outcome {
        Ok(response) => (response, None),
        Err(fault) => {
            let status = fault.status();
            let response = if status == StatusCode::BAD_REQUEST {
                empty_response(status)
            } else {
                text_response(status, &format!("Error processing request: {}", fault))
            };
            (response, Some(fault.to_string()))
        }
    };

    let status = response.status();
    finalize(&state, &method, &path, status, note).await;
    Ok(response)
}

/// Status handler: current request count and uptime
fn status_response(
    state: &AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>, DispatchError> {
    let body = protocol::StatusBody::new(
        state.counters.completed(),
        format_uptime(state.start_time.elapsed()),
    );
    let bytes = protocol::encode(&body)?;
    Ok(json_response(StatusCode::OK, bytes))
}

/// Echo handler: validate against the echo schema, store the message under a
/// fresh id, reflect it back
fn echo_response(
    state: &AppState,
    body: &[u8],
) -> Result<Response<BoxBody<Bytes, Infallible>>, DispatchError> {
    let request = protocol::decode_echo(body)?;
    let id = state.messages.store(message_text(&request.message));
    let reply = protocol::EchoReply {
        id: id.to_string(),
        message: request.message,
    };
    let bytes = protocol::encode(&reply)?;
    Ok(json_response(StatusCode::OK, bytes))
}

/// Text rendering stored alongside the assigned id
fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Post-response bookkeeping: counters, window, durable log, presenter events
async fn finalize(
    state: &Arc<AppState>,
    method: &Method,
    path: &str,
    status: StatusCode,
    note: Option<String>,
) {
    state.counters.record(method, status);
    state.window.increment(Utc::now());

    let message = match note {
        Some(note) => format!("{} {} -> {} ({})", method, path, status.as_u16(), note),
        None => format!("{} {} -> {}", method, path, status.as_u16()),
    };
    let entry = LogEntry {
        timestamp: Utc::now(),
        method: method.to_string(),
        status: status.as_u16(),
        message,
    };

    // Every entry reaches the durable log, whatever the live filter says
    if let Err(e) = state.log.append(&entry) {
        error!(
            "failed to append to {}: {}",
            state.log.path().display(),
            e
        );
    }

    let forward = state.filter.read().await.should_forward(&entry);
    if forward {
        state.publish(ServerEvent::Log(entry));
    }

    state.publish(ServerEvent::StatsChanged(state.stats_snapshot()));
}

/// Format elapsed time as `H:MM:SS`
fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn json_response(status: StatusCode, body: Bytes) -> Response<BoxBody<Bytes, Infallible>> {
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, protocol::CONTENT_TYPE_JSON)
        .body(full_body(body))
        .unwrap()
}

fn text_response(status: StatusCode, message: &str) -> Response<BoxBody<Bytes, Infallible>> {
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "text/plain")
        .body(full_body(Bytes::copy_from_slice(message.as_bytes())))
        .unwrap()
}

fn empty_response(status: StatusCode) -> Response<BoxBody<Bytes, Infallible>> {
    Response::builder()
        .status(status)
        .body(full_body(Bytes::new()))
        .unwrap()
}

/// Create a full body response
fn full_body(data: Bytes) -> BoxBody<Bytes, Infallible> {
    Full::new(data).map_err(|_| unreachable!()).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uptime_formats_as_h_mm_ss() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0:00:00");
        assert_eq!(format_uptime(Duration::from_secs(83)), "0:01:23");
        assert_eq!(format_uptime(Duration::from_secs(3661)), "1:01:01");
        assert_eq!(format_uptime(Duration::from_secs(36_000)), "10:00:00");
    }

    #[test]
    fn message_text_keeps_strings_raw() {
        assert_eq!(message_text(&json!("hi")), "hi");
        assert_eq!(message_text(&json!(42)), "42");
        assert_eq!(message_text(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
