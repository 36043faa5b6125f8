//! Database sessions.
//!
//! Every command works inside one `READ ONLY` transaction on a single
//! connection. The transaction is never committed: [`ReadOnlyTransaction::finish`]
//! rolls it back, and dropping it unfinished (on an error path) rolls it
//! back as well.

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::catalog::PgCatalog;
use crate::config::DatabaseConfig;
use crate::error::Result;

/// A single-connection session against the configured database.
pub struct Session {
    pool: PgPool,
}

impl Session {
    /// Connects using the given parameters, reporting `application` as the
    /// session's `application_name`.
    pub async fn connect(config: &DatabaseConfig, application: &str) -> Result<Self> {
        debug!(host = %config.host, port = config.port, database = ?config.database, "Connecting");
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(config.connect_options(application))
            .await?;
        Ok(Self { pool })
    }

    /// Starts a read-only transaction.
    pub async fn begin_read_only(&self) -> Result<ReadOnlyTransaction> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(ReadOnlyTransaction { tx })
    }

    /// Closes the connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// A transaction that is always rolled back.
pub struct ReadOnlyTransaction {
    tx: Transaction<'static, Postgres>,
}

impl ReadOnlyTransaction {
    /// Catalog queries running inside this transaction.
    pub fn catalog(&mut self) -> PgCatalog<'_> {
        PgCatalog::new(&mut *self.tx)
    }

    /// Rolls the transaction back.
    pub async fn finish(self) -> Result<()> {
        self.tx.rollback().await?;
        debug!("Transaction rolled back");
        Ok(())
    }
}
