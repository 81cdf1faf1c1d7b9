//! `tower-sessions` store keeping sessions in Redis with a native TTL.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tower_sessions::SessionStore;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, Error as SessionStoreError};

#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisSessionStore {
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn session_key(&self, session_id: &Id) -> String {
        format!("{}:{session_id}", self.key_prefix)
    }

    async fn connection(&self) -> session_store::Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend_error)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, session_record: &Record) -> session_store::Result<()> {
        let key = self.session_key(&session_record.id);
        let mut connection = self.connection().await?;

        let Some(ttl_seconds) =
            remaining_ttl_seconds(session_record.expiry_date, OffsetDateTime::now_utc())
        else {
            // Already expired: make sure nothing stale is served.
            return connection
                .del::<_, ()>(key)
                .await
                .map_err(backend_error);
        };

        let encoded_record = serde_json::to_string(session_record)
            .map_err(|error| SessionStoreError::Encode(error.to_string()))?;

        connection
            .set_ex::<_, _, ()>(key, encoded_record, ttl_seconds)
            .await
            .map_err(backend_error)
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut connection = self.connection().await?;
        let encoded_record: Option<String> = connection
            .get(self.session_key(session_id))
            .await
            .map_err(backend_error)?;

        encoded_record
            .map(|value| {
                serde_json::from_str::<Record>(&value)
                    .map_err(|error| SessionStoreError::Decode(error.to_string()))
            })
            .transpose()
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        let mut connection = self.connection().await?;
        connection
            .del::<_, ()>(self.session_key(session_id))
            .await
            .map_err(backend_error)
    }
}

/// Whole seconds until `expiry_date`, or `None` when it has passed.
fn remaining_ttl_seconds(expiry_date: OffsetDateTime, now: OffsetDateTime) -> Option<u64> {
    let remaining = (expiry_date - now).whole_seconds();
    u64::try_from(remaining).ok().filter(|seconds| *seconds > 0)
}

fn backend_error(error: redis::RedisError) -> SessionStoreError {
    SessionStoreError::Backend(error.to_string())
}
