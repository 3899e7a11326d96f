//! Microsoft SQL Server connection configuration.

use dbprobe_core::{ConnectionTarget, strip_jdbc_label};
use tiberius::{AuthMethod, Config, EncryptionLevel};

use crate::error::{MssqlError, MssqlResult};

/// Default SQL Server port.
pub const DEFAULT_PORT: u16 = 1433;

const SCHEME: &str = "sqlserver://";

/// Microsoft SQL Server connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MssqlConfig {
    /// Server host.
    pub host: String,
    /// Server port (default: 1433).
    pub port: u16,
    /// Database name.
    pub database: Option<String>,
    /// Username for SQL Server authentication.
    pub username: Option<String>,
    /// Password for SQL Server authentication.
    pub password: Option<String>,
    /// Encryption level.
    pub encryption: EncryptionMode,
    /// Trust server certificate.
    pub trust_cert: bool,
    /// Application name (shown in sys.dm_exec_sessions).
    pub application_name: String,
    /// Instance name (for named instances).
    pub instance_name: Option<String>,
    /// Properties not interpreted by dbprobe.
    pub options: Vec<(String, String)>,
}

/// Encryption mode for connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionMode {
    /// Encryption is off.
    Off,
    /// Encryption is on.
    #[default]
    On,
    /// Encryption is required.
    Required,
}

impl From<EncryptionMode> for EncryptionLevel {
    fn from(mode: EncryptionMode) -> Self {
        match mode {
            EncryptionMode::Off => EncryptionLevel::Off,
            EncryptionMode::On => EncryptionLevel::On,
            EncryptionMode::Required => EncryptionLevel::Required,
        }
    }
}

impl MssqlConfig {
    /// Parse a JDBC-style SQL Server URL.
    ///
    /// Format: `[jdbc:]sqlserver://host[\instance][:port][;key=value]*`.
    /// Property keys are case-insensitive.
    pub fn from_url(url: &str) -> MssqlResult<Self> {
        let rest = strip_jdbc_label(url)
            .strip_prefix(SCHEME)
            .ok_or_else(|| MssqlError::config("invalid scheme: expected 'sqlserver://'"))?;

        let (server, properties) = rest.split_once(';').unwrap_or((rest, ""));
        let (host, instance_name, port) = parse_server(server)?;

        let mut config = Self {
            host,
            port: port.unwrap_or(DEFAULT_PORT),
            database: None,
            username: None,
            password: None,
            encryption: EncryptionMode::default(),
            trust_cert: false,
            application_name: "dbprobe".to_string(),
            instance_name,
            options: Vec::new(),
        };

        for part in properties.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                MssqlError::config(format!("invalid connection property: {}", part))
            })?;
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "databasename" | "database" => config.database = Some(value.to_string()),
                "user" | "username" => config.username = Some(value.to_string()),
                "password" => config.password = Some(value.to_string()),
                "encrypt" => {
                    config.encryption = match value.to_lowercase().as_str() {
                        "true" | "yes" | "mandatory" => EncryptionMode::On,
                        "false" | "no" | "optional" => EncryptionMode::Off,
                        "strict" => EncryptionMode::Required,
                        other => {
                            return Err(MssqlError::config(format!(
                                "invalid encrypt value: {}",
                                other
                            )));
                        }
                    };
                }
                "trustservercertificate" => {
                    config.trust_cert = value.eq_ignore_ascii_case("true");
                }
                "applicationname" => config.application_name = value.to_string(),
                "instancename" => config.instance_name = Some(value.to_string()),
                "portnumber" | "port" => {
                    config.port = value
                        .parse()
                        .map_err(|_| MssqlError::config(format!("invalid port number: {}", value)))?;
                }
                "integratedsecurity" if value.eq_ignore_ascii_case("true") => {
                    return Err(MssqlError::config(
                        "integrated security is not supported, use SQL Server authentication",
                    ));
                }
                _ => config
                    .options
                    .push((key.trim().to_string(), value.to_string())),
            }
        }

        Ok(config)
    }

    /// Override the credentials with ones supplied outside the URL.
    pub fn with_credentials(mut self, username: Option<&str>, password: Option<&str>) -> Self {
        if let Some(username) = username {
            self.username = Some(username.to_string());
        }
        if let Some(password) = password {
            self.password = Some(password.to_string());
        }
        self
    }

    /// Point the configuration at the endpoint the reachability probe checked.
    pub fn with_target(mut self, target: &ConnectionTarget) -> Self {
        self.host = target.host.clone();
        self.port = target.port;
        self
    }

    /// Convert to a Tiberius Config.
    ///
    /// Missing credentials are sent as empty strings so the server reports
    /// the login failure.
    pub fn to_tiberius_config(&self) -> Config {
        let mut config = Config::new();

        config.host(&self.host);
        config.port(self.port);
        config.application_name(&self.application_name);

        if let Some(database) = &self.database {
            config.database(database);
        }
        if let Some(instance) = &self.instance_name {
            config.instance_name(instance);
        }

        config.authentication(AuthMethod::sql_server(
            self.username.as_deref().unwrap_or(""),
            self.password.as_deref().unwrap_or(""),
        ));
        config.encryption(self.encryption.into());

        if self.trust_cert {
            config.trust_cert();
        }

        config
    }
}

/// Split `host[\instance][:port]`, with IPv6 hosts in brackets.
fn parse_server(server: &str) -> MssqlResult<(String, Option<String>, Option<u16>)> {
    let (host, rest) = match server.strip_prefix('[') {
        Some(bracketed) => bracketed
            .split_once(']')
            .ok_or_else(|| MssqlError::config("unterminated IPv6 address"))?,
        None => server.split_at(server.find(['\\', ':']).unwrap_or(server.len())),
    };

    if host.is_empty() {
        return Err(MssqlError::config("missing host in URL"));
    }

    let (instance, port) = match rest.split_once(':') {
        Some((instance, port)) => (instance, Some(port)),
        None => (rest, None),
    };

    let instance = match instance {
        "" => None,
        other => Some(
            other
                .strip_prefix('\\')
                .filter(|i| !i.is_empty())
                .ok_or_else(|| MssqlError::config(format!("invalid server name: {}", server)))?
                .to_string(),
        ),
    };

    let port = port
        .map(|p| {
            p.parse::<u16>()
                .map_err(|_| MssqlError::config(format!("invalid port number: {}", p)))
        })
        .transpose()?;

    Ok((host.to_string(), instance, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_from_jdbc_url() {
        let config =
            MssqlConfig::from_url("jdbc:sqlserver://localhost:1433;databaseName=test").unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 1433);
        assert_eq!(config.database.as_deref(), Some("test"));
        assert_eq!(config.instance_name, None);
        assert_eq!(config.encryption, EncryptionMode::On);
        assert!(!config.trust_cert);
    }

    #[test]
    fn test_named_instance_and_properties() {
        let config = MssqlConfig::from_url(
            "jdbc:sqlserver://db01\\SQLEXPRESS:1435;database=app;user=sa;Password=Secret1;\
             encrypt=false;TrustServerCertificate=true;applicationName=probe;loginTimeout=5",
        )
        .unwrap();
        assert_eq!(config.host, "db01");
        assert_eq!(config.instance_name.as_deref(), Some("SQLEXPRESS"));
        assert_eq!(config.port, 1435);
        assert_eq!(config.database.as_deref(), Some("app"));
        assert_eq!(config.username.as_deref(), Some("sa"));
        assert_eq!(config.password.as_deref(), Some("Secret1"));
        assert_eq!(config.encryption, EncryptionMode::Off);
        assert!(config.trust_cert);
        assert_eq!(config.application_name, "probe");
        assert_eq!(
            config.options,
            vec![("loginTimeout".to_string(), "5".to_string())]
        );
    }

    #[test]
    fn test_default_port_and_ipv6() {
        let config = MssqlConfig::from_url("sqlserver://sql.internal").unwrap();
        assert_eq!(config.port, DEFAULT_PORT);

        let config = MssqlConfig::from_url("sqlserver://[::1]:1500;portNumber=1501").unwrap();
        assert_eq!(config.host, "::1");
        assert_eq!(config.port, 1501);
    }

    #[test]
    fn test_target_matches_core_parser() {
        let url = "jdbc:sqlserver://db01\\SQLEXPRESS:1435;databaseName=app;portNumber=1501";
        let target = dbprobe_core::ConnectionString::parse(url)
            .unwrap()
            .target()
            .clone();
        let config = MssqlConfig::from_url(url).unwrap();
        assert_eq!((config.host.as_str(), config.port), (target.host.as_str(), target.port));

        let config = config.with_target(&ConnectionTarget::new("10.0.0.5", 1600));
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 1600);
        assert_eq!(config.instance_name.as_deref(), Some("SQLEXPRESS"));
        assert_eq!(config.to_tiberius_config().get_addr(), "10.0.0.5:1600");
    }

    #[test]
    fn test_credentials_override_url() {
        let config = MssqlConfig::from_url("jdbc:sqlserver://localhost;user=sa")
            .unwrap()
            .with_credentials(Some("app"), Some("pw"));
        assert_eq!(config.username.as_deref(), Some("app"));
        assert_eq!(config.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_invalid_urls() {
        assert!(MssqlConfig::from_url("jdbc:mysql://localhost/test").is_err());
        assert!(MssqlConfig::from_url("jdbc:sqlserver://:1433").is_err());
        assert!(MssqlConfig::from_url("jdbc:sqlserver://localhost:abc").is_err());
        assert!(MssqlConfig::from_url("jdbc:sqlserver://localhost;novalue").is_err());
        assert!(MssqlConfig::from_url("jdbc:sqlserver://localhost;encrypt=maybe").is_err());
        assert!(
            MssqlConfig::from_url("jdbc:sqlserver://localhost;integratedSecurity=true").is_err()
        );
    }

    #[test]
    fn test_to_tiberius_config() {
        let config = MssqlConfig::from_url("jdbc:sqlserver://localhost:1500;databaseName=test")
            .unwrap()
            .to_tiberius_config();
        assert_eq!(config.get_addr(), "localhost:1500");
    }
}
