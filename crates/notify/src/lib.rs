//! Outbound owner notifications: message rendering and SMTP delivery.

pub mod email;
pub mod message;

pub use email::{EmailConfig, EmailDelivery, EmailError};
pub use message::Notification;
