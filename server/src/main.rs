//! backchannel-logout-server: native adapter for OpenID Connect Back-Channel Logout
//!
//! Lightweight HTTP server using hyper. Uses a single-threaded tokio runtime
//! (compatible with core's !Send async traits).

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use backchannel_logout_core::{Config, ErrorResponse, Executor, LogoutError, LogoutRequestParams};

mod platform;

use platform::{ProcessEnv, ReqwestHttpClient, SystemClock};

/// Path the OpenID Provider posts logout tokens to
const LOGOUT_PATH: &str = "/backchannel_logout";

/// Logout tokens are small; anything bigger is not a logout request
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state
struct AppState {
    config: Config,
    http: ReqwestHttpClient,
    clock: SystemClock,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env(&ProcessEnv) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = e.error_key(), "invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let port: u16 = match std::env::var("PORT").unwrap_or_else(|_| "8080".into()).parse() {
        Ok(port) => port,
        Err(e) => {
            tracing::error!("PORT must be a number: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(issuer = config.issuer(), audience = config.audience(), "configured relying party");

    let state = Arc::new(AppState {
        config,
        http: ReqwestHttpClient::new(),
        clock: SystemClock,
    });

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind port {}: {}", port, e);
            std::process::exit(1);
        }
    };

    tracing::info!("backchannel-logout-server listening on port {}", port);

    // Core futures are !Send, so connections run as local tasks
    let local = tokio::task::LocalSet::new();
    local.run_until(serve(listener, state)).await;
}

async fn serve(listener: tokio::net::TcpListener, state: Arc<AppState>) {
    loop {
        let (stream, _) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("accept failed: {}", e);
                continue;
            }
        };
        let state = state.clone();

        tokio::task::spawn_local(async move {
            let io = hyper_util::rt::TokioIo::new(stream);
            let service = service_fn(move |req| {
                let state = state.clone();
                async move { handle_request(req, &state).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                tracing::warn!("connection error: {}", e);
            }
        });
    }
}

type HyperResponse = Response<Full<Bytes>>;

async fn handle_request(
    req: Request<Incoming>,
    state: &AppState,
) -> Result<HyperResponse, std::convert::Infallible> {
    let result = route_request(req, state).await;
    Ok(result)
}

async fn route_request(req: Request<Incoming>, state: &AppState) -> HyperResponse {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::GET, "/") => handle_health(),
        (Method::POST, LOGOUT_PATH) => handle_logout(req, state).await,
        _ => json_response(StatusCode::NOT_FOUND, &serde_json::json!({"error": "not_found"})),
    }
}

fn handle_health() -> HyperResponse {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "name": "backchannel-logout",
            "logout_path": LOGOUT_PATH
        }),
    )
}

async fn handle_logout(req: Request<Incoming>, state: &AppState) -> HyperResponse {
    let body = match read_form_body(req.into_body()).await {
        Ok(body) => body,
        Err(response) => return response,
    };
    let params = LogoutRequestParams::from_form_body(&body);

    let executor = Executor::new(&state.config, &state.http, &state.clock);
    let result = executor
        .process(
            &params,
            Some(|sub: Option<String>, sid: Option<String>| -> Result<(), LogoutError> {
                // Session invalidation belongs to the embedding application
                tracing::info!(sub = ?sub, sid = ?sid, "logging out user");
                Ok(())
            }),
        )
        .await;

    match result {
        Ok(()) => text_response(StatusCode::OK, "Logout successful"),
        Err(e) => error_response(&e),
    }
}

/// Read a request body of at most `MAX_BODY_BYTES`
async fn read_form_body<B>(body: B) -> Result<Bytes, HyperResponse>
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(json_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            &ErrorResponse {
                error: "payload_too_large".to_string(),
                message: format!("request body exceeds {} bytes", MAX_BODY_BYTES),
            },
        )),
        Err(e) => Err(json_response(
            StatusCode::BAD_REQUEST,
            &ErrorResponse {
                error: "invalid_request".to_string(),
                message: format!("failed to read request body: {}", e),
            },
        )),
    }
}

fn error_response(err: &LogoutError) -> HyperResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::from(err);
    json_response(status, &body)
}

fn text_response(status: StatusCode, body: &'static str) -> HyperResponse {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> HyperResponse {
    let json = serde_json::to_vec(body).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}
