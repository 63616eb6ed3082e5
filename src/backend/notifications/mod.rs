//! Notifications Module
//!
//! The durable notification store and the dispatcher implementing the
//! trigger contract: "an event of kind X happened to user Y caused by
//! user Z". The messaging core calls the dispatcher once per
//! (message, other participant) pair at send time; external delivery
//! (email) sits behind the `Notifier` trait and is best-effort.

pub mod db;
pub mod dispatcher;

pub use dispatcher::{LogNotifier, NotificationDispatcher, NotificationInput, Notifier};
