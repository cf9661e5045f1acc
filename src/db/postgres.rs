//! PostgreSQL Session
//!
//! Implements [`BackendSession`] on top of tokio-postgres. Each session
//! owns one client plus the spawned task driving its connection; dropping
//! the session tears both down.

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{info, warn};

use super::backend::{BackendError, BackendSession};

// == Statements ==
const UPSERT_SQL: &str = "INSERT INTO kv_pairs (key, value) VALUES ($1, $2) \
                          ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value";
const SELECT_SQL: &str = "SELECT value FROM kv_pairs WHERE key = $1";
const DELETE_SQL: &str = "DELETE FROM kv_pairs WHERE key = $1";
const SCHEMA_SQL: &str =
    "CREATE TABLE IF NOT EXISTS kv_pairs (key TEXT PRIMARY KEY, value TEXT NOT NULL)";

// == Connection Parameters ==
/// Everything needed to reach the database.
#[derive(Debug, Clone)]
pub struct PgParams {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

impl PgParams {
    fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.dbname)
            .user(&self.user)
            .password(&self.password);
        config
    }
}

// == PostgreSQL Session ==
pub struct PgSession {
    client: Client,
    driver: JoinHandle<()>,
}

impl PgSession {
    /// Opens a client and spawns the task that pumps its connection.
    async fn establish(params: &PgParams) -> Result<(Client, JoinHandle<()>), BackendError> {
        let (client, connection) = params
            .to_pg_config()
            .connect(NoTls)
            .await
            .map_err(|e| BackendError::Connect(e.to_string()))?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "database connection terminated");
            }
        });

        Ok((client, driver))
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

impl From<tokio_postgres::Error> for BackendError {
    fn from(e: tokio_postgres::Error) -> Self {
        BackendError::Query(e.to_string())
    }
}

#[async_trait]
impl BackendSession for PgSession {
    type Params = PgParams;

    async fn connect(params: &PgParams) -> Result<Self, BackendError> {
        let (client, driver) = Self::establish(params).await?;
        Ok(Self { client, driver })
    }

    fn is_healthy(&self) -> bool {
        !self.client.is_closed()
    }

    async fn reset(&mut self, params: &PgParams) {
        match Self::establish(params).await {
            Ok((client, driver)) => {
                self.driver.abort();
                self.client = client;
                self.driver = driver;
                info!("re-established database session");
            }
            Err(e) => warn!(error = %e, "session reset failed"),
        }
    }

    async fn upsert(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.client.execute(UPSERT_SQL, &[&key, &value]).await?;
        Ok(())
    }

    async fn fetch(&self, key: &str) -> Result<Option<String>, BackendError> {
        let row = self.client.query_opt(SELECT_SQL, &[&key]).await?;
        match row {
            Some(row) => Ok(Some(row.try_get(0)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.client.execute(DELETE_SQL, &[&key]).await?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<(), BackendError> {
        self.client.batch_execute(SCHEMA_SQL).await?;
        Ok(())
    }
}
