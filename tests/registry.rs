//! Integration tests for the compiled-in driver registry.

use dbprobe::{
    Dialect, FailureClass, Pipeline, PipelineStage, ProbeConfig, ProbeRequest, SilentReporter,
    Status,
};
use std::time::Duration;

#[test]
fn test_default_registry_matches_features() {
    let registry = dbprobe::default_registry();

    assert!(!registry.is_available(Dialect::Oracle));
    assert_eq!(
        registry.is_available(Dialect::PostgreSql),
        cfg!(feature = "postgres")
    );
    assert_eq!(registry.is_available(Dialect::MySql), cfg!(feature = "mysql"));
    assert_eq!(
        registry.is_available(Dialect::SqlServer),
        cfg!(feature = "mssql")
    );
    assert_eq!(registry.len(), dbprobe::enabled_drivers().len());
}

#[test]
fn test_factories_report_vendor_driver_ids() {
    let registry = dbprobe::default_registry();
    for dialect in registry.dialects() {
        let factory = registry.get(dialect).unwrap();
        assert_eq!(factory.dialect(), dialect);
        assert_eq!(factory.driver_id(), dialect.driver_id());
    }
}

/// Oracle gets through the network probe and stops at the driver stage.
#[tokio::test]
async fn test_oracle_stops_at_load_driver() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let registry = dbprobe::default_registry();
    let config = ProbeConfig::default().with_timeout(Duration::from_secs(2));
    let request = ProbeRequest::new(format!("jdbc:oracle:thin:@127.0.0.1:{port}:ORCL"));

    let report = Pipeline::new(&registry, &config)
        .run(&request, &mut SilentReporter)
        .await;

    assert_eq!(report.failure, Some(FailureClass::DriverUnavailable));
    assert_eq!(report.failed_stage(), Some(PipelineStage::LoadDriver));
    assert_eq!(
        report.outcome(PipelineStage::ProbeNetwork).map(|o| o.status),
        Some(Status::Success)
    );
    assert!(report.outcome(PipelineStage::Connect).is_none());
}
