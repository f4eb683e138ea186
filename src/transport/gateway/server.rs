use super::handlers::{handle_action, handle_health};
use super::{AppState, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS};

use crate::config::GatewayConfig;
use crate::error::TransportError;
use crate::reminders::ActionEvent;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
pub(super) fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Host as the resolver expects it: IPv6 literals lose their brackets.
pub(super) fn bind_host(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(host)
}

/// Resolves names such as `localhost` as well as IP literals.
pub(super) async fn bind_listener(config: &GatewayConfig) -> Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((bind_host(&config.host), config.port))
        .await
        .with_context(|| format!("bind gateway socket {}:{}", config.host, config.port))
}

/// Bind `[gateway] host:port` and serve action ingress until the task is aborted.
pub async fn run_gateway(
    config: &GatewayConfig,
    actions: mpsc::Sender<ActionEvent>,
) -> Result<()> {
    let host = config.host.as_str();
    if is_public_bind(host) && !config.allow_public_bind {
        return Err(TransportError::Gateway(format!(
            "Refusing to bind to {host}: the action gateway would be reachable from other hosts.\n\
             Fix: use host = \"127.0.0.1\" (default), or set\n\
             [gateway] allow_public_bind = true in config.toml together with a webhook_secret."
        ))
        .into());
    }

    let listener = bind_listener(config).await?;
    run_gateway_with_listener(config, listener, actions).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    config: &GatewayConfig,
    listener: tokio::net::TcpListener,
    actions: mpsc::Sender<ActionEvent>,
) -> Result<()> {
    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();
    let display_addr = format!("{}:{actual_port}", config.host);

    let webhook_secret = config
        .webhook_secret
        .as_deref()
        .map(str::trim)
        .filter(|secret| !secret.is_empty())
        .map(Arc::from);
    if webhook_secret.is_none() && is_public_bind(&config.host) {
        tracing::warn!("gateway bound publicly without a webhook_secret");
    }

    print_gateway_banner(&display_addr, webhook_secret.is_some());

    let state = AppState {
        actions,
        webhook_secret,
    };
    axum::serve(listener, build_app(state))
        .await
        .context("serve HTTP gateway")?;

    Ok(())
}

fn print_gateway_banner(display_addr: &str, webhook_secret_enabled: bool) {
    println!("Gateway listening on {display_addr}");
    println!("  POST /actions");
    println!("  GET  /health");
    if webhook_secret_enabled {
        println!("  Webhook secret enabled");
    }
}

pub(super) fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/actions", post(handle_action))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}
