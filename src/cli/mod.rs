//! Command-line interface components
//!
//! This module contains CLI-specific code for the OTA Fetcher application,
//! including argument parsing, command handlers, and progress display.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, GetArgs, GlobalArgs, ListArgs, SyncArgs};
pub use commands::{handle_get, handle_info, handle_list, handle_sync};
