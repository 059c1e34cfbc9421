/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Persistence backends for users, games and mental states.
pub mod store;
