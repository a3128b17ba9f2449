//! Repository layer: domain models plus free functions over `ConnectionTrait`,
//! and the store traits the stream readers are written against.

pub mod accounts;
pub mod games;
pub mod store;

pub use accounts::Account;
pub use games::Game;
pub use store::{AccountStore, GameStore, SeaStore};
