pub mod accounts;
pub mod games;

pub use accounts::Entity as Accounts;
pub use accounts::Model as AccountRow;
pub use games::Entity as Games;
pub use games::Model as GameRow;
