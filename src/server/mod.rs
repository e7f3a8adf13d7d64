//! # Server Module
//!
//! HTTP front end on `may_minihttp`. Every connection is served on its own
//! `may` coroutine, which is also where the dispatcher runs and, for pending
//! replies, parks. All bodies are JSON with `Content-Type: text/json`.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_query_params, parse_request, ParsedRequest};
pub use service::{health_endpoint, AppService};
