//! Domain layer - core business logic and entities

pub mod wallet;
pub mod quote;
pub mod execution;
