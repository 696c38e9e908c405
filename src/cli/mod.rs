//! CLI module for refreshr - command-line interface.

pub mod commands;

pub use commands::Cli;
