//! Connection string parser.
//!
//! Two grammars are supported:
//!
//! - Oracle thin URLs, in service-name form (`@//host:port/service`) or
//!   legacy SID form (`@host:port:sid`).
//! - URI-style URLs for MySQL, PostgreSQL and SQL Server
//!   (`vendor://host[:port]/...`), where a missing port falls back to the
//!   dialect default.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use tracing::debug;
use url::{Host, Url};

use crate::dialect::{Dialect, strip_jdbc_label};
use crate::error::{ProbeError, ProbeResult};
use crate::mask::mask_url;

/// Marker introducing the Oracle service-name format.
const ORACLE_SERVICE_MARKER: &str = "@//";

/// Network endpoint extracted from a connection string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionTarget {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl ConnectionTarget {
    /// Create a new target.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// A connection string resolved to its dialect and network target.
#[derive(Debug, Clone)]
pub struct ConnectionString {
    original: String,
    dialect: Dialect,
    target: ConnectionTarget,
}

impl ConnectionString {
    /// Resolve the dialect of `url` and extract its target.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dbprobe_core::{ConnectionString, Dialect};
    ///
    /// let conn = ConnectionString::parse("jdbc:oracle:thin:@//db.internal:1521/ORCLPDB1").unwrap();
    /// assert_eq!(conn.dialect(), Dialect::Oracle);
    /// assert_eq!(conn.target().host, "db.internal");
    /// assert_eq!(conn.target().port, 1521);
    ///
    /// let conn = ConnectionString::parse("jdbc:postgresql://localhost/app").unwrap();
    /// assert_eq!(conn.target().port, 5432);
    /// ```
    pub fn parse(url: &str) -> ProbeResult<Self> {
        debug!(url_len = url.len(), "ConnectionString::parse()");
        let dialect = Dialect::resolve(url)?;
        let target = parse(url, dialect)?;
        Ok(Self {
            original: url.to_string(),
            dialect,
            target,
        })
    }

    /// Get the original connection string.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Get the dialect.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Get the network target.
    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    /// Get the vendor driver identifier.
    pub fn driver_id(&self) -> &'static str {
        self.dialect.driver_id()
    }
}

/// Extract the host and port of `url` using the grammar of `dialect`.
pub fn parse(url: &str, dialect: Dialect) -> ProbeResult<ConnectionTarget> {
    let target = if dialect.is_uri_style() {
        parse_standard(url, dialect)?
    } else {
        parse_oracle(url)?
    };
    debug!(host = %target.host, port = target.port, "Connection target extracted");
    Ok(target)
}

fn parse_oracle(url: &str) -> ProbeResult<ConnectionTarget> {
    if let Some(idx) = url.find(ORACLE_SERVICE_MARKER) {
        let rest = &url[idx + ORACLE_SERVICE_MARKER.len()..];
        debug!(rest = %rest, "Parsing Oracle service name format");

        let (host, remaining) = rest
            .split_once(':')
            .ok_or_else(|| ProbeError::malformed("missing port number in Oracle URL"))?;
        let (port, _service) = remaining
            .split_once('/')
            .ok_or_else(|| ProbeError::malformed("missing service name in Oracle URL"))?;

        return Ok(ConnectionTarget::new(host, parse_port(port)?));
    }

    if let Some((_, rest)) = url.split_once('@') {
        debug!(rest = %rest, "Parsing Oracle SID format");

        let (host, remaining) = rest.split_once(':').ok_or_else(|| {
            ProbeError::malformed(
                "invalid Oracle URL format, expected jdbc:oracle:thin:@host:port:sid",
            )
        })?;
        let (port, _sid) = remaining
            .split_once(':')
            .ok_or_else(|| ProbeError::malformed("missing port or SID in Oracle URL"))?;

        return Ok(ConnectionTarget::new(host, parse_port(port)?));
    }

    Err(ProbeError::malformed("unsupported Oracle format"))
}

fn parse_standard(url: &str, dialect: Dialect) -> ProbeResult<ConnectionTarget> {
    let mut clean = strip_jdbc_label(url);
    if let Some((main, _params)) = clean.split_once('?') {
        clean = main;
    }

    // SQL Server carries its properties as `;key=value` after the authority
    // and may name an instance as `host\instance`.
    let mut port_property = None;
    let clean = if dialect == Dialect::SqlServer {
        if let Some((main, props)) = clean.split_once(';') {
            clean = main;
            port_property = sqlserver_port_property(props)?;
        }
        strip_sqlserver_instance(clean)?
    } else {
        Cow::Borrowed(clean)
    };
    debug!(url = %mask_url(&clean), "Parsing standard URL");

    let parsed = Url::parse(&clean).map_err(|e| {
        ProbeError::malformed(format!(
            "invalid {} URL '{}': {}",
            dialect,
            mask_url(&clean),
            e
        ))
    })?;

    let host = match parsed.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        _ => return Err(ProbeError::malformed(format!("missing host in {} URL", dialect))),
    };
    let port = port_property
        .or(parsed.port())
        .unwrap_or_else(|| dialect.default_port());
    if port == 0 {
        return Err(ProbeError::malformed("invalid port number: 0"));
    }

    Ok(ConnectionTarget::new(host, port))
}

/// Remove a `\instance` suffix from the server part of a SQL Server URL.
///
/// The instance name does not affect the TCP endpoint: an explicit port (or
/// the default 1433) is always used.
fn strip_sqlserver_instance(url: &str) -> ProbeResult<Cow<'_, str>> {
    let Some(start) = url.find('\\') else {
        return Ok(Cow::Borrowed(url));
    };
    let end = url[start..].find([':', '/']).map_or(url.len(), |i| start + i);
    if end == start + 1 {
        return Err(ProbeError::malformed("missing instance name in SQL Server URL"));
    }
    Ok(Cow::Owned(format!("{}{}", &url[..start], &url[end..])))
}

/// The last `portNumber` (or `port`) property, if any.
fn sqlserver_port_property(props: &str) -> ProbeResult<Option<u16>> {
    let mut port = None;
    for (key, value) in props.split(';').filter_map(|p| p.split_once('=')) {
        if matches!(key.trim().to_ascii_lowercase().as_str(), "portnumber" | "port") {
            port = Some(parse_port(value)?);
        }
    }
    Ok(port)
}

fn parse_port(port: &str) -> ProbeResult<u16> {
    match port.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ProbeError::malformed(format!(
            "invalid port number: {}",
            port
        ))),
        Ok(port) => Ok(port),
    }
}
