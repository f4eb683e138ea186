//! kHealth service API.

mod client;
pub mod http_client;
pub mod types;

pub use client::{ACK_TIMEOUT_SECS, KhealthClient};
pub use types::{AckOutcome, DailyProgress, PollResponse, ScheduleWindow, UserInfo};
