//! The staged diagnostic pipeline.
//!
//! Stages run strictly in order and each one gates the next:
//!
//! ```text
//! ParseUrl → ProbeNetwork → LoadDriver → Connect → ExecuteQuery
//! ```
//!
//! The first failing stage ends the run. Every stage returns a
//! [`ProbeResult`]; failures are converted to [`DiagnosticOutcome`]s here and
//! never propagate past [`Pipeline::run`].
//!
//! ```rust,no_run
//! use dbprobe_core::{DriverRegistry, Pipeline, ProbeConfig, ProbeRequest, SilentReporter};
//!
//! # async fn example() {
//! let registry = DriverRegistry::new();
//! let config = ProbeConfig::default();
//! let request = ProbeRequest::new("jdbc:postgresql://localhost:5432/app")
//!     .username("app")
//!     .password("secret");
//!
//! let report = Pipeline::new(&registry, &config)
//!     .run(&request, &mut SilentReporter)
//!     .await;
//! println!("success: {}", report.is_success());
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{ProbeError, ProbeResult};
use crate::mask::mask_url;
use crate::parser::ConnectionString;
use crate::probe::{DEFAULT_PROBE_TIMEOUT, probe};
use crate::report::{
    DiagnosticOutcome, DiagnosticReport, FailureClass, PipelineStage, render_chain,
};
use crate::reporter::Reporter;
use crate::session::{ConnectRequest, DriverRegistry, Session, SessionFactory};

/// Settings threaded through a diagnostic run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Bound on the network probe.
    pub connect_timeout: Duration,
    /// Report extra detail (resolved dialect and driver, session close).
    pub verbose: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_PROBE_TIMEOUT,
            verbose: false,
        }
    }
}

impl ProbeConfig {
    /// Set the probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enable or disable verbose reporting.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Input of a diagnostic run.
#[derive(Debug, Clone, Default)]
pub struct ProbeRequest {
    /// Connection string to diagnose.
    pub url: String,
    /// Username for the session.
    pub username: Option<String>,
    /// Password for the session.
    pub password: Option<String>,
    /// File whose contents replace the default timestamp query.
    pub query_file: Option<PathBuf>,
}

impl ProbeRequest {
    /// Create a request for a connection string.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the query file.
    pub fn query_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.query_file = Some(path.into());
        self
    }
}

/// Runs the diagnostic stages against a driver registry.
pub struct Pipeline<'a> {
    registry: &'a DriverRegistry,
    config: &'a ProbeConfig,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline.
    pub fn new(registry: &'a DriverRegistry, config: &'a ProbeConfig) -> Self {
        Self { registry, config }
    }

    /// Diagnose `request`, reporting progress to `reporter`.
    pub async fn run(&self, request: &ProbeRequest, reporter: &mut dyn Reporter) -> DiagnosticReport {
        info!(url_len = request.url.len(), "Starting diagnostic run");
        let shown_url = mask_url(&request.url);
        let mut run = Run::new(&shown_url, reporter);

        // ParseUrl
        run.start(
            PipelineStage::ParseUrl,
            format!("Parsing connection string: {}", shown_url),
        );
        let conn = match ConnectionString::parse(&request.url) {
            Ok(conn) => conn,
            Err(e) => return run.fail(PipelineStage::ParseUrl, e),
        };
        run.report.dialect = Some(conn.dialect());
        run.report.target = Some(conn.target().clone());
        run.pass(
            PipelineStage::ParseUrl,
            format!("{} connection string, target {}", conn.dialect(), conn.target()),
        );
        if self.config.verbose {
            run.info(&format!(
                "Dialect: {}, driver: {}",
                conn.dialect(),
                conn.driver_id()
            ));
        }

        // ProbeNetwork
        let target = conn.target();
        if !probe(&target.host, target.port, self.config.connect_timeout, &mut run).await {
            run.report.failure = Some(FailureClass::UnreachableHost);
            return run.finish();
        }

        // LoadDriver
        run.start(
            PipelineStage::LoadDriver,
            format!("Loading driver: {}", conn.driver_id()),
        );
        let factory = match self.load_driver(&conn) {
            Ok(factory) => factory,
            Err(e) => return run.fail(PipelineStage::LoadDriver, e),
        };
        run.pass(
            PipelineStage::LoadDriver,
            format!("Driver {} loaded", factory.driver_id()),
        );

        // Connect
        run.start(
            PipelineStage::Connect,
            format!("Connecting to database URL: {}", shown_url),
        );
        let connect = ConnectRequest {
            url: conn.as_str(),
            target,
            username: request.username.as_deref(),
            password: request.password.as_deref(),
        };
        let mut session = match factory.connect(connect).await {
            Ok(session) => session,
            Err(e) => return run.fail(PipelineStage::Connect, e),
        };
        run.pass(PipelineStage::Connect, "Database connection successful");

        // ExecuteQuery
        let result = self.execute(session.as_mut(), &conn, request, &mut run).await;
        self.close(session.as_mut(), &mut run).await;

        match result {
            Ok(Some(value)) => run.pass(
                PipelineStage::ExecuteQuery,
                format!("Query executed successfully. Result: {}", value),
            ),
            Ok(None) => run.warn(PipelineStage::ExecuteQuery, "Query returned no results"),
            Err(e) => return run.fail(PipelineStage::ExecuteQuery, e),
        }

        run.finish()
    }

    fn load_driver(&self, conn: &ConnectionString) -> ProbeResult<&'a dyn SessionFactory> {
        let factory = self
            .registry
            .get(conn.dialect())
            .ok_or_else(|| ProbeError::driver_unavailable(conn.dialect()))?;
        debug!(dialect = %conn.dialect(), driver = factory.driver_id(), "Session factory selected");
        Ok(factory)
    }

    async fn execute(
        &self,
        session: &mut dyn Session,
        conn: &ConnectionString,
        request: &ProbeRequest,
        run: &mut Run<'_>,
    ) -> ProbeResult<Option<String>> {
        let sql = match &request.query_file {
            Some(path) => {
                run.start(
                    PipelineStage::ExecuteQuery,
                    format!("Executing custom query from {}", path.display()),
                );
                let sql = read_query_file(path).await?;
                run.info(&format!("Executing custom query: {}", sql));
                sql
            }
            None => {
                let sql = conn.dialect().timestamp_query().to_string();
                run.start(
                    PipelineStage::ExecuteQuery,
                    format!("Executing test query: {}", sql),
                );
                sql
            }
        };
        session.query_first_value(&sql).await
    }

    async fn close(&self, session: &mut dyn Session, run: &mut Run<'_>) {
        match session.close().await {
            Ok(()) => {
                if self.config.verbose {
                    run.info("Session closed");
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to close session");
                run.info(&format!("Session close failed: {}", e));
            }
        }
    }
}

/// Read a query file, joining its lines with single spaces.
pub async fn read_query_file(path: &Path) -> ProbeResult<String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProbeError::QueryFileReadFailure {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(content.lines().collect::<Vec<_>>().join(" "))
}

/// State of one run: the report being built and the caller's reporter.
///
/// Outcomes reported by any stage (including the prober) are recorded into
/// the report on their way to the caller's reporter.
struct Run<'r> {
    report: DiagnosticReport,
    reporter: &'r mut dyn Reporter,
}

impl<'r> Run<'r> {
    fn new(url: &str, reporter: &'r mut dyn Reporter) -> Self {
        Self {
            report: DiagnosticReport::new(url),
            reporter,
        }
    }

    fn start(&mut self, stage: PipelineStage, message: String) {
        self.stage_started(stage, &message);
    }

    fn pass(&mut self, stage: PipelineStage, detail: impl Into<String>) {
        self.outcome(&DiagnosticOutcome::passed(stage, detail));
    }

    fn warn(&mut self, stage: PipelineStage, detail: impl Into<String>) {
        self.outcome(&DiagnosticOutcome::warning(stage, detail));
    }

    fn fail(mut self, stage: PipelineStage, err: ProbeError) -> DiagnosticReport {
        warn!(stage = ?stage, error = %err, "Stage failed");
        if !err.chained_errors().is_empty() {
            debug!(chain = %render_chain(err.chained_errors()), "Chained errors");
        }
        let outcome = DiagnosticOutcome::failed(stage, err.to_string())
            .with_chained_errors(err.chained_errors().to_vec());
        self.outcome(&outcome);
        self.report.failure = Some(err.failure_class());
        self.finish()
    }

    fn finish(self) -> DiagnosticReport {
        info!(
            success = self.report.is_success(),
            failure = ?self.report.failure,
            "Diagnostic run finished"
        );
        self.report
    }
}

impl Reporter for Run<'_> {
    fn stage_started(&mut self, stage: PipelineStage, message: &str) {
        debug!(stage = ?stage, "Stage started");
        self.reporter.stage_started(stage, message);
    }

    fn info(&mut self, message: &str) {
        self.reporter.info(message);
    }

    fn outcome(&mut self, outcome: &DiagnosticOutcome) {
        self.report.outcomes.push(outcome.clone());
        self.reporter.outcome(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_query_file_joins_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SELECT NOW()").unwrap();
        writeln!(file, "FROM dual").unwrap();
        write!(file, "WHERE 1 = 1").unwrap();

        let sql = read_query_file(file.path()).await.unwrap();
        assert_eq!(sql, "SELECT NOW() FROM dual WHERE 1 = 1");
    }

    #[tokio::test]
    async fn test_read_query_file_missing() {
        let err = read_query_file(Path::new("/definitely/not/here.sql"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::QueryFileReadFailure { .. }));
    }

    #[test]
    fn test_probe_config_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_millis(5000));
        assert!(!config.verbose);

        let config = config.with_timeout(Duration::from_secs(1)).with_verbose(true);
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert!(config.verbose);
    }

    #[tokio::test]
    async fn test_unparsable_url_stops_at_parse() {
        let registry = DriverRegistry::new();
        let config = ProbeConfig::default();
        let mut reporter = crate::reporter::RecordingReporter::new();

        let report = Pipeline::new(&registry, &config)
            .run(&ProbeRequest::new("invalid:url"), &mut reporter)
            .await;

        assert_eq!(report.failure, Some(FailureClass::InvalidConnectionString));
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(reporter.started_stages(), vec![PipelineStage::ParseUrl]);
        assert!(report.dialect.is_none());
    }
}
