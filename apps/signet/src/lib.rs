//! # signet
//!
//! Application layer around `signet-core`: command-line parsing, TOML
//! configuration and every file read or written by the tool.

pub mod cli;
pub mod config;
pub mod loader;
