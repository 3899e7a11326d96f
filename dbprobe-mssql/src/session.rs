//! SQL Server session factory.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use dbprobe_core::{
    ConnectRequest, DbOperation, Dialect, ProbeResult, Session, SessionFactory,
};
use tiberius::numeric::Numeric;
use tiberius::{Client, ColumnType, Config, FromSql, Row};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use crate::config::MssqlConfig;
use crate::error::{MssqlError, MssqlResult};

type TdsClient = Client<Compat<TcpStream>>;

/// Opens SQL Server sessions with `tiberius`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MssqlSessionFactory;

impl MssqlSessionFactory {
    /// Create a new factory.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionFactory for MssqlSessionFactory {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    async fn connect(&self, request: ConnectRequest<'_>) -> ProbeResult<Box<dyn Session>> {
        let config = MssqlConfig::from_url(request.url)
            .map_err(|e| e.into_probe_error(DbOperation::Connect))?
            .with_credentials(request.username, request.password)
            .with_target(request.target);

        debug!(
            host = %config.host,
            port = config.port,
            instance = ?config.instance_name,
            database = ?config.database,
            encryption = ?config.encryption,
            "Opening SQL Server session"
        );

        let client = open(config.to_tiberius_config())
            .await
            .map_err(|e| e.into_probe_error(DbOperation::Connect))?;

        Ok(Box::new(MssqlSession {
            client: Some(client),
        }))
    }
}

async fn open(config: Config) -> MssqlResult<TdsClient> {
    let tcp = TcpStream::connect(config.get_addr()).await?;
    tcp.set_nodelay(true)?;

    match Client::connect(config.clone(), tcp.compat_write()).await {
        Ok(client) => Ok(client),
        // Azure SQL may redirect the login to another gateway.
        Err(tiberius::error::Error::Routing { host, port }) => {
            info!(host = %host, port, "SQL Server routed the login");
            let mut config = config;
            config.host(&host);
            config.port(port);

            let tcp = TcpStream::connect(config.get_addr()).await?;
            tcp.set_nodelay(true)?;
            Ok(Client::connect(config, tcp.compat_write()).await?)
        }
        Err(e) => Err(e.into()),
    }
}

/// An open SQL Server session.
pub struct MssqlSession {
    client: Option<TdsClient>,
}

#[async_trait]
impl Session for MssqlSession {
    async fn query_first_value(&mut self, sql: &str) -> ProbeResult<Option<String>> {
        let client = self.client.as_mut().ok_or_else(|| {
            MssqlError::config("session is closed").into_probe_error(DbOperation::Query)
        })?;

        first_row(client, sql)
            .await
            .and_then(|row| row.as_ref().map(render_first_column).transpose())
            .map_err(|e| e.into_probe_error(DbOperation::Query))
    }

    async fn close(&mut self) -> ProbeResult<()> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| MssqlError::from(e).into_probe_error(DbOperation::Close))?;
            debug!("SQL Server session closed");
        }
        Ok(())
    }
}

async fn first_row(client: &mut TdsClient, sql: &str) -> MssqlResult<Option<Row>> {
    Ok(client.simple_query(sql).await?.into_row().await?)
}

fn get<'a, T>(row: &'a Row) -> MssqlResult<Option<String>>
where
    T: FromSql<'a> + ToString,
{
    Ok(row.try_get::<T, usize>(0)?.map(|v| v.to_string()))
}

/// Render the first column of `row`.
///
/// Date/time types come first, then text, then numbers and bits.
fn render_first_column(row: &Row) -> MssqlResult<String> {
    let column_type = row
        .columns()
        .first()
        .map(|c| c.column_type())
        .ok_or_else(|| MssqlError::type_conversion("query returned no columns"))?;

    let rendered = match column_type {
        ColumnType::Datetime
        | ColumnType::Datetime2
        | ColumnType::Datetime4
        | ColumnType::Datetimen => get::<NaiveDateTime>(row)?,
        ColumnType::DatetimeOffsetn => get::<DateTime<FixedOffset>>(row)?,
        ColumnType::Daten => get::<NaiveDate>(row)?,
        ColumnType::Timen => get::<NaiveTime>(row)?,
        ColumnType::NVarchar
        | ColumnType::NChar
        | ColumnType::BigVarChar
        | ColumnType::BigChar
        | ColumnType::Text
        | ColumnType::NText
        | ColumnType::Xml => get::<&str>(row)?,
        ColumnType::Int1 => get::<u8>(row)?,
        ColumnType::Int2 => get::<i16>(row)?,
        ColumnType::Int4 => get::<i32>(row)?,
        ColumnType::Int8 => get::<i64>(row)?,
        ColumnType::Intn => get::<i32>(row)
            .or_else(|_| get::<i64>(row))
            .or_else(|_| get::<i16>(row))
            .or_else(|_| get::<u8>(row))?,
        ColumnType::Float4 => get::<f32>(row)?,
        ColumnType::Float8 => get::<f64>(row)?,
        ColumnType::Floatn => get::<f64>(row).or_else(|_| get::<f32>(row))?,
        ColumnType::Bit | ColumnType::Bitn => get::<bool>(row)?,
        ColumnType::Decimaln | ColumnType::Numericn => get::<Numeric>(row)?,
        other => {
            return Err(MssqlError::type_conversion(format!(
                "cannot render column of type {:?}",
                other
            )));
        }
    };

    Ok(rendered.unwrap_or_else(|| "NULL".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbprobe_core::{ConnectionTarget, FailureClass};

    #[test]
    fn test_factory_identity() {
        let factory = MssqlSessionFactory::new();
        assert_eq!(factory.dialect(), Dialect::SqlServer);
        assert_eq!(
            factory.driver_id(),
            "com.microsoft.sqlserver.jdbc.SQLServerDriver"
        );
    }

    #[tokio::test]
    async fn test_connect_refused_is_chained() {
        let port = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("jdbc:sqlserver://127.0.0.1:{port};databaseName=test");
        let target = ConnectionTarget::new("127.0.0.1", port);
        let request = ConnectRequest {
            url: &url,
            target: &target,
            username: Some("sa"),
            password: Some("secret"),
        };

        let err = match MssqlSessionFactory::new().connect(request).await {
            Ok(_) => panic!("connect to a closed port succeeded"),
            Err(e) => e,
        };
        assert_eq!(err.failure_class(), FailureClass::ConnectionFailed);
        assert!(!err.chained_errors().is_empty());
    }
}
