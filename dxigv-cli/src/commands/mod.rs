//! CLI command implementations.

pub mod common;
pub mod config;
pub mod init;
pub mod manifest;
pub mod publish;
