use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

/// Message value that asks the device to drop the notification carrying the same tag.
pub const CLEAR_NOTIFICATION: &str = "clear_notification";

/// Free-text reply requested by an action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextInput {
    pub button_title: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    /// Identifier echoed back in the action event when the button is pressed.
    pub id: String,
    pub label: String,
    pub text_input: Option<TextInput>,
}

impl NotificationAction {
    pub fn simple(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            text_input: None,
        }
    }

    pub fn with_text_input(
        id: impl Into<String>,
        label: impl Into<String>,
        text_input: TextInput,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            text_input: Some(text_input),
        }
    }
}

/// A device notification.
///
/// `tag` identifies the slot on the device: sending again with the same tag
/// replaces the existing notification in place. Untagged notifications with no
/// actions are plain informational messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub tag: Option<String>,
    pub group: Option<String>,
    pub title: String,
    pub message: String,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    pub fn plain(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tag: None,
            group: None,
            title: title.into(),
            message: message.into(),
            actions: Vec::new(),
        }
    }
}

/// Outbound notification capability. Implement for any push transport.
pub trait NotificationChannel: Send + Sync {
    /// Human-readable channel name
    fn name(&self) -> &str;

    /// Deliver (or replace, when tagged) a notification
    fn send<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Dismiss the notification occupying `tag`
    fn clear<'a>(
        &'a self,
        tag: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Check if channel is healthy
    fn health_check<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move { true })
    }
}
