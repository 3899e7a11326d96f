//! PostgreSQL session factory.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use dbprobe_core::{
    ConnectRequest, DbOperation, Dialect, ProbeResult, Session, SessionFactory,
};
use tokio::task::JoinHandle;
use tokio_postgres::types::Type;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, warn};

use crate::config::PgConfig;
use crate::error::{PgError, PgResult};

/// Opens PostgreSQL sessions with `tokio-postgres`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PgSessionFactory;

impl PgSessionFactory {
    /// Create a new factory.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionFactory for PgSessionFactory {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSql
    }

    async fn connect(&self, request: ConnectRequest<'_>) -> ProbeResult<Box<dyn Session>> {
        let config = PgConfig::from_url(request.url)
            .map_err(|e| e.into_probe_error(DbOperation::Connect))?
            .with_credentials(request.username, request.password)
            .with_target(request.target);

        debug!(
            host = %config.host,
            port = config.port,
            database = ?config.database,
            "Opening PostgreSQL session"
        );

        let (client, connection) = config
            .to_pg_config()
            .connect(NoTls)
            .await
            .map_err(|e| PgError::from(e).into_probe_error(DbOperation::Connect))?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Box::new(PgSession {
            client: Some(client),
            driver: Some(driver),
        }))
    }
}

/// An open PostgreSQL session.
pub struct PgSession {
    client: Option<Client>,
    driver: Option<JoinHandle<()>>,
}

#[async_trait]
impl Session for PgSession {
    async fn query_first_value(&mut self, sql: &str) -> ProbeResult<Option<String>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| PgError::config("session is closed").into_probe_error(DbOperation::Query))?;

        let rows = client
            .query(sql, &[])
            .await
            .map_err(|e| PgError::from(e).into_probe_error(DbOperation::Query))?;

        rows.first()
            .map(render_first_column)
            .transpose()
            .map_err(|e| e.into_probe_error(DbOperation::Query))
    }

    async fn close(&mut self) -> ProbeResult<()> {
        // Dropping the client ends the connection task.
        drop(self.client.take());
        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.await {
                warn!(error = %e, "PostgreSQL connection task did not finish cleanly");
            }
            debug!("PostgreSQL session closed");
        }
        Ok(())
    }
}

/// Render the first column of `row`.
///
/// Date/time types come first, then text, then numbers and booleans.
pub(crate) fn render_first_column(row: &Row) -> PgResult<String> {
    let ty = row
        .columns()
        .first()
        .map(|c| c.type_().clone())
        .ok_or_else(|| PgError::type_conversion("query returned no columns"))?;

    let rendered = if ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(0)?
            .map(|v| v.to_rfc3339())
    } else if ty == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(0)?
            .map(|v| v.to_string())
    } else if ty == Type::DATE {
        row.try_get::<_, Option<NaiveDate>>(0)?.map(|v| v.to_string())
    } else if ty == Type::TIME {
        row.try_get::<_, Option<NaiveTime>>(0)?.map(|v| v.to_string())
    } else if ty == Type::TEXT || ty == Type::VARCHAR || ty == Type::BPCHAR || ty == Type::NAME {
        row.try_get::<_, Option<String>>(0)?
    } else if ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(0)?.map(|v| v.to_string())
    } else if ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(0)?.map(|v| v.to_string())
    } else if ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(0)?.map(|v| v.to_string())
    } else if ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(0)?.map(|v| v.to_string())
    } else if ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(0)?.map(|v| v.to_string())
    } else if ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(0)?.map(|v| v.to_string())
    } else {
        return Err(PgError::type_conversion(format!(
            "cannot render column of type {}",
            ty.name()
        )));
    };

    Ok(rendered.unwrap_or_else(|| "NULL".to_string()))
}
