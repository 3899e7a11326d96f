//! MySQL session factory.

use async_trait::async_trait;
use dbprobe_core::{
    ConnectRequest, DbOperation, Dialect, ProbeResult, Session, SessionFactory,
};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row, Value};
use tracing::debug;

use crate::config::MysqlConfig;
use crate::error::{MysqlError, MysqlResult};

/// Opens MySQL sessions with `mysql_async`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlSessionFactory;

impl MysqlSessionFactory {
    /// Create a new factory.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionFactory for MysqlSessionFactory {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn connect(&self, request: ConnectRequest<'_>) -> ProbeResult<Box<dyn Session>> {
        let config = MysqlConfig::from_url(request.url)
            .map_err(|e| e.into_probe_error(DbOperation::Connect))?
            .with_credentials(request.username, request.password)
            .with_target(request.target);

        debug!(
            host = %config.host,
            port = config.port,
            database = ?config.database,
            ssl = config.use_ssl,
            "Opening MySQL session"
        );

        let conn = Conn::new(config.to_opts_builder())
            .await
            .map_err(|e| MysqlError::from(e).into_probe_error(DbOperation::Connect))?;

        Ok(Box::new(MysqlSession { conn: Some(conn) }))
    }
}

/// An open MySQL session.
pub struct MysqlSession {
    conn: Option<Conn>,
}

#[async_trait]
impl Session for MysqlSession {
    async fn query_first_value(&mut self, sql: &str) -> ProbeResult<Option<String>> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| MysqlError::query("session is closed").into_probe_error(DbOperation::Query))?;

        let row: Option<Row> = conn
            .query_first(sql)
            .await
            .map_err(|e| MysqlError::from(e).into_probe_error(DbOperation::Query))?;

        row.map(|row| render_first_column(&row))
            .transpose()
            .map_err(|e| e.into_probe_error(DbOperation::Query))
    }

    async fn close(&mut self) -> ProbeResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.disconnect()
                .await
                .map_err(|e| MysqlError::from(e).into_probe_error(DbOperation::Close))?;
            debug!("MySQL session closed");
        }
        Ok(())
    }
}

fn render_first_column(row: &Row) -> MysqlResult<String> {
    row.as_ref(0)
        .map(render_value)
        .ok_or_else(|| MysqlError::query("query returned no columns"))
}

/// Render a column value.
///
/// The text protocol delivers timestamps as bytes; binary-protocol date and
/// time values are formatted the way MySQL prints them.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::NULL => "NULL".to_string(),
        Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            let mut out = format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            );
            if *micros > 0 {
                out.push_str(&format!(".{:06}", micros));
            }
            out
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let total_hours = u64::from(*days) * 24 + u64::from(*hours);
            let mut out = format!(
                "{}{:02}:{:02}:{:02}",
                if *negative { "-" } else { "" },
                total_hours,
                minutes,
                seconds
            );
            if *micros > 0 {
                out.push_str(&format!(".{:06}", micros));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbprobe_core::{ConnectionTarget, FailureClass};

    #[test]
    fn test_render_values() {
        assert_eq!(
            render_value(&Value::Bytes(b"2024-03-01 10:15:00".to_vec())),
            "2024-03-01 10:15:00"
        );
        assert_eq!(render_value(&Value::NULL), "NULL");
        assert_eq!(render_value(&Value::Int(-3)), "-3");
        assert_eq!(
            render_value(&Value::Date(2024, 3, 1, 10, 15, 0, 0)),
            "2024-03-01 10:15:00"
        );
        assert_eq!(
            render_value(&Value::Date(2024, 3, 1, 10, 15, 0, 250)),
            "2024-03-01 10:15:00.000250"
        );
        assert_eq!(render_value(&Value::Time(true, 1, 2, 3, 4, 0)), "-26:03:04");
    }

    #[test]
    fn test_factory_identity() {
        let factory = MysqlSessionFactory::new();
        assert_eq!(factory.dialect(), Dialect::MySql);
        assert_eq!(factory.driver_id(), "com.mysql.cj.jdbc.Driver");
    }

    #[tokio::test]
    async fn test_connect_refused_is_chained() {
        let port = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("jdbc:mysql://127.0.0.1:{port}/test");
        let target = ConnectionTarget::new("127.0.0.1", port);
        let request = ConnectRequest {
            url: &url,
            target: &target,
            username: Some("app"),
            password: None,
        };

        let err = match MysqlSessionFactory::new().connect(request).await {
            Ok(_) => panic!("connect to a closed port succeeded"),
            Err(e) => e,
        };
        assert_eq!(err.failure_class(), FailureClass::ConnectionFailed);
        assert!(!err.chained_errors().is_empty());
    }
}
