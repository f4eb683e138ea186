//! Axum-based HTTP ingress for notification action events.
//!
//! Home Assistant automations forward `mobile_app_notification_action` events
//! here; each accepted event is queued for the notification manager.

mod handlers;
mod server;


pub use server::{run_gateway, run_gateway_with_listener};

use crate::reminders::ActionEvent;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Header carrying the shared secret when `[gateway] webhook_secret` is set
pub const WEBHOOK_SECRET_HEADER: &str = "X-Webhook-Secret";

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub actions: mpsc::Sender<ActionEvent>,
    pub webhook_secret: Option<Arc<str>>,
}

/// `POST /actions` body
#[derive(Debug, Deserialize)]
pub struct ActionBody {
    pub action: String,
    #[serde(default)]
    pub reply_text: Option<String>,
}
