//! Network reachability probe.

use std::io;
use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::report::{DiagnosticOutcome, PipelineStage};
use crate::reporter::Reporter;

/// Default bound on the probe's connect attempt.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Check that a TCP connection to `host:port` opens within `timeout`.
///
/// Reports a status line through `reporter` and returns `false` on any I/O
/// error, resolution failure or timeout. Never fails.
pub async fn probe(host: &str, port: u16, timeout: Duration, reporter: &mut dyn Reporter) -> bool {
    reporter.stage_started(
        PipelineStage::ProbeNetwork,
        &format!("Testing network connectivity to {}:{}", host, port),
    );

    gate(host, port, timeout, TcpStream::connect((host, port)), reporter).await
}

/// Await `connect` for at most `timeout` and report the outcome.
async fn gate<F, S>(
    host: &str,
    port: u16,
    timeout: Duration,
    connect: F,
    reporter: &mut dyn Reporter,
) -> bool
where
    F: Future<Output = io::Result<S>>,
{
    match attempt(connect, timeout).await {
        Ok(elapsed) => {
            debug!(host = %host, port, elapsed_ms = elapsed.as_millis() as u64, "Probe succeeded");
            reporter.outcome(&DiagnosticOutcome::passed(
                PipelineStage::ProbeNetwork,
                format!("Network connection successful ({} ms)", elapsed.as_millis()),
            ));
            true
        }
        Err(reason) => {
            warn!(host = %host, port, reason = %reason, "Probe failed");
            reporter.outcome(&DiagnosticOutcome::failed(
                PipelineStage::ProbeNetwork,
                format!("Network connection failed: {}", reason),
            ));
            false
        }
    }
}

async fn attempt<F, S>(connect: F, timeout: Duration) -> Result<Duration, String>
where
    F: Future<Output = io::Result<S>>,
{
    let started = Instant::now();
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(stream)) => {
            drop(stream);
            Ok(started.elapsed())
        }
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {} ms", timeout.as_millis())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{RecordingReporter, ReportEvent};
    use crate::report::Status;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut reporter = RecordingReporter::new();
        assert!(probe("127.0.0.1", port, DEFAULT_PROBE_TIMEOUT, &mut reporter).await);

        assert_eq!(reporter.started_stages(), vec![PipelineStage::ProbeNetwork]);
        match reporter.events.last() {
            Some(ReportEvent::Outcome(o)) => assert_eq!(o.status, Status::Success),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let mut reporter = RecordingReporter::new();
        assert!(!probe("127.0.0.1", port, DEFAULT_PROBE_TIMEOUT, &mut reporter).await);

        match reporter.events.last() {
            Some(ReportEvent::Outcome(o)) => {
                assert_eq!(o.status, Status::Failure);
                assert!(o.detail.starts_with("Network connection failed"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_probe_times_out() {
        let mut reporter = RecordingReporter::new();
        let never = std::future::pending::<io::Result<()>>();

        assert!(!gate("10.0.0.1", 1521, Duration::from_millis(20), never, &mut reporter).await);

        match reporter.events.last() {
            Some(ReportEvent::Outcome(o)) => {
                assert_eq!(o.status, Status::Failure);
                assert_eq!(o.detail, "Network connection failed: timed out after 20 ms");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_probe_unresolvable_host() {
        let mut reporter = RecordingReporter::new();
        assert!(
            !probe(
                "host.invalid",
                5432,
                Duration::from_millis(2000),
                &mut reporter
            )
            .await
        );
    }
}
