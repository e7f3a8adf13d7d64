//! # CLI Module
//!
//! ### `serve`
//!
//! ```bash
//! jukebox serve --addr 127.0.0.1:8080 --seed catalog.toml
//! ```
//!
//! - `--addr <ADDR>` (`JUKEBOX_ADDR`, default `0.0.0.0:8080`)
//! - `--api-version <N,..>` (`JUKEBOX_API_VERSION`, default `1`)
//! - `--seed <FILE>` (`JUKEBOX_SEED`)
//! - `--pretty` (`JUKEBOX_PRETTY_JSON`)
//!
//! ### `routes`
//!
//! ```bash
//! jukebox routes
//! ```
//!
//! Prints every registered route with its operation and parameters.

mod commands;


pub use commands::{route_table, run, run_cli, Cli, Commands};
