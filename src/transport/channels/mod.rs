pub mod factory;
pub mod home_assistant;
pub mod log;
pub mod traits;

pub use factory::build_channel;
pub use home_assistant::HomeAssistantChannel;
pub use log::LogChannel;
pub use traits::{
    CLEAR_NOTIFICATION, Notification, NotificationAction, NotificationChannel, TextInput,
};
