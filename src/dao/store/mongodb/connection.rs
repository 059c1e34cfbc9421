use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::{info, warn};

use super::error::{MongoDaoError, MongoResult};
use crate::config::StoreConfig;

const APP_NAME: &str = "hockey-tracker-back";

/// Exponential backoff applied while waiting for the first successful ping.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }
}

/// Everything needed to open the MongoDB backend.
#[derive(Clone)]
pub struct MongoConfig {
    pub options: ClientOptions,
    pub database_name: String,
    pub retry: RetryPolicy,
}

impl MongoConfig {
    /// Parse the connection string of the `store` configuration section.
    pub async fn from_store_config(config: &StoreConfig) -> MongoResult<Self> {
        let mut options = ClientOptions::parse(&config.mongo_uri)
            .await
            .map_err(|source| MongoDaoError::InvalidUri {
                uri: config.mongo_uri.clone(),
                source,
            })?;
        options.app_name.get_or_insert_with(|| APP_NAME.to_owned());

        Ok(Self {
            options,
            database_name: config.mongo_db.clone(),
            retry: RetryPolicy::default(),
        })
    }
}

/// Build a client and wait until the server answers a ping.
pub async fn establish_connection(config: &MongoConfig) -> MongoResult<Database> {
    let client = Client::with_options(config.options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);

    let retry = config.retry;
    let mut delay = retry.initial_delay;
    let mut attempt = 1;
    loop {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => {
                info!(attempt, database = %config.database_name, "MongoDB reachable");
                return Ok(database);
            }
            Err(source) if attempt >= retry.max_attempts => {
                return Err(MongoDaoError::InitialPing {
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                warn!(attempt, error = %err, "MongoDB ping failed; retrying");
                sleep(delay).await;
                delay = retry.next_delay(delay);
                attempt += 1;
            }
        }
    }
}
