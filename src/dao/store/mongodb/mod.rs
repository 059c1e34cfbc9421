mod connection;
mod error;
mod models;
pub mod store;

pub use connection::{MongoConfig, RetryPolicy};
pub use error::MongoDaoError;
pub use store::MongoStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::DuplicateKey { key, .. } => StorageError::DuplicateKey { key },
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
