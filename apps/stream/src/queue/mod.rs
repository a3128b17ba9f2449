//! Subscribe/unsubscribe commands arriving over a redis list.

pub mod command;
pub mod consumer;

pub use command::{dispatch_payload, parse_command, Dispatched, QueueCommand};
pub use consumer::QueueConsumer;
