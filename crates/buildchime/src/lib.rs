pub mod chat;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod notifier;

pub use error::NotificationError;
