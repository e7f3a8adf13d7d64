//! # jukebox
//!
//! A small music-catalog service (songs, artists, albums, users, playlists)
//! with token login, served over HTTP on the `may` coroutine runtime.
//!
//! ## Architecture
//!
//! - **[`operation`]** - Operation descriptors: verb, `:name` path template,
//!   typed parameter list, handler closure
//! - **[`registry`]** - Versioned registration into a shared routing table
//! - **[`router`]** - Radix tree route matching
//! - **[`dispatcher`]** - Positional binding, contained invocation and reply
//!   resolution
//! - **[`pending`]** - Callback-based pending computations and the `Reply` type
//! - **[`codec`]** - Entity encoding with a `type` discriminator, error envelopes
//! - **[`store`]** - Data store and session provider contracts, in-memory
//!   implementation, TOML seeding
//! - **[`api`]** - The v1 operation table
//! - **[`server`]** - HTTP front end built on `may_minihttp`
//! - **[`logging`]**, **[`runtime_config`]**, **[`cli`]** - Process setup
//!
//! ## Request Flow
//!
//! ```text
//! GET /api/v1/song/42
//!   -> server: parse method, path, ordered query, JSON body
//!   -> router: match verb + path, extract ["42"]
//!   -> binder: align with [id: Integer] -> [Int(42)]
//!   -> invoker: call handler (errors and panics -> "invalid call to song")
//!   -> normalizer: wait on the pending lookup (failure -> "internal server error")
//!   -> codec: {"id":42,"name":..,"artistIds":[..],"type":"song"}
//! ```
//!
//! Every engine response is HTTP 200 with `Content-Type: text/json`; a miss
//! in the routing table is 404 `{"error":"not found"}`.
//!
//! ## Quick Start
//!
//! ```bash
//! jukebox serve --addr 127.0.0.1:8080 --seed catalog.toml
//! curl 'http://127.0.0.1:8080/api/v1/login?username=bob&password=secret'
//! curl 'http://127.0.0.1:8080/api/v1/stats?token=<token>'
//! ```
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use jukebox::api::{build_router, AppContext};
//! use jukebox::dispatcher::Dispatcher;
//! use jukebox::server::{AppService, HttpServer};
//! use jukebox::store::MemoryStore;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = AppContext::from_memory(MemoryStore::new());
//! let router = build_router(&ctx, &[1])?;
//! let service = AppService::new(Arc::new(Dispatcher::new(Arc::new(router))));
//! let handle = HttpServer(service).start("127.0.0.1:8080")?;
//! handle.wait_ready()?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod model;
pub mod operation;
pub mod pending;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod store;

pub use error::{ArgError, BindError, ConfigError};
pub use operation::{Operation, ParamSpec, ParamType};
pub use pending::{JsonObject, Pending, Reply};
pub use registry::Registry;
