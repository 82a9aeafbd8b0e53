//! Convert Android Lint XML reports to Checkstyle and post them with reviewdog.

pub mod cli;
pub mod config;
pub mod convert;
pub mod fs;
pub mod orchestrator;
pub mod reviewdog;
pub mod types;
