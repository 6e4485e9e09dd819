//! Notification side channel for admission violations.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable notification channels
//! - Slack notifier implementation
//! - Minijinja template rendering for notification messages
//! - Dispatcher that sends violation notices on background tasks

pub mod dispatcher;
pub mod slack;
pub mod templating;
pub mod traits;

pub use dispatcher::{Dispatcher, ViolationNotice};
pub use slack::SlackNotifier;
pub use traits::{Notification, Notifier, NotifyError};
