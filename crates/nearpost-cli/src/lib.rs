//! nearpost CLI library.
//!
//! This crate hosts the command handlers, output formatting, and terminal
//! styling used by the `nearpost-cli` binary. It plays the query-trigger and
//! result-consumer roles around `nearpost-lib`.

pub mod commands;
pub mod output;
pub mod terminal;
