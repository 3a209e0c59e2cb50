//! CLI subcommand implementations for the sitelens binary.

pub mod build_cmd;
pub mod extract_cmd;
pub mod logging;
pub mod output;
