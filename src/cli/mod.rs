//! CLI command handlers

pub mod commands;

pub use commands::{analyze, classify, export, sheets, OutputFormat, SheetOptions};
