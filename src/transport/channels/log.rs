use super::traits::{Notification, NotificationChannel};
use std::future::Future;
use std::pin::Pin;

/// Writes notifications through `tracing`, for dry runs and local testing
pub struct LogChannel;

impl LogChannel {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationChannel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    fn send<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let actions: Vec<&str> = notification
                .actions
                .iter()
                .map(|action| action.id.as_str())
                .collect();
            tracing::info!(
                tag = notification.tag.as_deref().unwrap_or("-"),
                title = %notification.title,
                ?actions,
                "notify: {}",
                notification.message
            );
            Ok(())
        })
    }

    fn clear<'a>(
        &'a self,
        tag: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            tracing::info!(tag, "notify: clear");
            Ok(())
        })
    }
}
