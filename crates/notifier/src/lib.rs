//! Notification delivery: the queue-draining worker and its senders.

pub mod sender;
pub mod worker;
