//! dbprobe CLI - Command-line database connectivity diagnoser.
//!
//! This crate provides the `dbprobe` binary: argument parsing, TOML profile
//! loading, console and JSON rendering of diagnostic reports, and the
//! mapping from failure classes to process exit codes.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod output;
pub mod reporter;
