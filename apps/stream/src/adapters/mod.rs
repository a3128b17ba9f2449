//! SeaORM adapters. Functions here are generic over `ConnectionTrait` and
//! return `DbErr`; the repos layer maps to `DomainError`.

pub mod accounts_sea;
pub mod games_sea;
