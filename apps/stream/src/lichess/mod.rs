//! Lichess event feeds: wire types, NDJSON decoding, and the HTTP client.

pub mod client;
pub mod events;
pub mod ndjson;

pub use client::{EventSource, EventStream, LichessClient};
pub use events::{AccountEvent, GameEvent, GameFull, GameRef, Player};
