use crate::transport::channels::{Notification, NotificationChannel};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send(Notification),
    Clear(String),
}

/// Channel that records every call and can be switched to fail.
#[derive(Default)]
pub struct RecordingChannel {
    calls: Mutex<Vec<Call>>,
    failing: AtomicBool,
}

impl RecordingChannel {
    pub fn failing() -> Self {
        let channel = Self::default();
        channel.failing.store(true, Ordering::SeqCst);
        channel
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send(notification) => Some(notification),
                Call::Clear(_) => None,
            })
            .collect()
    }

    pub fn cleared(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Clear(tag) => Some(tag),
                Call::Send(_) => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("device unreachable");
        }
        Ok(())
    }
}

impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    fn send<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { self.record(Call::Send(notification.clone())) })
    }

    fn clear<'a>(
        &'a self,
        tag: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { self.record(Call::Clear(tag.to_string())) })
    }
}
