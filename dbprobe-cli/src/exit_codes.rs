//! Process exit codes.
//!
//! Each failure class has its own code so scripts can tell an unreachable
//! host from bad credentials without parsing output.

use dbprobe::FailureClass;

/// Every attempted stage passed (a no-rows warning included).
pub const SUCCESS: i32 = 0;
/// CLI-level failure: unreadable config file, unset environment reference.
pub const GENERAL_ERROR: i32 = 1;
/// Invalid command-line usage.
pub const USAGE_ERROR: i32 = 2;
/// The connection string was unsupported or malformed.
pub const INVALID_CONNECTION_STRING: i32 = 3;
/// The network probe could not reach host:port.
pub const UNREACHABLE_HOST: i32 = 4;
/// No session factory is compiled in for the dialect.
pub const DRIVER_UNAVAILABLE: i32 = 5;
/// The database refused or failed the session.
pub const CONNECTION_FAILED: i32 = 6;
/// The verification query failed.
pub const QUERY_FAILED: i32 = 7;
/// The query file could not be read.
pub const QUERY_FILE_UNREADABLE: i32 = 8;

/// Exit code for a failure class.
pub fn for_failure(class: FailureClass) -> i32 {
    match class {
        FailureClass::InvalidConnectionString => INVALID_CONNECTION_STRING,
        FailureClass::UnreachableHost => UNREACHABLE_HOST,
        FailureClass::DriverUnavailable => DRIVER_UNAVAILABLE,
        FailureClass::ConnectionFailed => CONNECTION_FAILED,
        FailureClass::QueryFailed => QUERY_FAILED,
        FailureClass::QueryFileUnreadable => QUERY_FILE_UNREADABLE,
    }
}

/// Exit code for a finished run.
pub fn for_report(report: &dbprobe::DiagnosticReport) -> i32 {
    report.failure.map(for_failure).unwrap_or(SUCCESS)
}
