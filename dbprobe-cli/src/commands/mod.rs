//! CLI command implementations.

pub mod check;
pub mod dialects;
pub mod version;
