//! # Router Module
//!
//! Verb + path matching over a radix tree. Templates use `:name`
//! placeholders that each match one path segment; matched values come back in
//! template order because binding downstream is positional.
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use jukebox::codec::error_json;
//! use jukebox::operation::Operation;
//! use jukebox::router::Router;
//!
//! let op = Operation::get("song", "/song/:id")
//!     .integer("id")
//!     .handler(|_| Ok(error_json("null result").into()));
//! let mut router = Router::new();
//! router.insert(Method::GET, "/api/v1/song/:id", Arc::new(op)).unwrap();
//!
//! let hit = router.route(&Method::GET, "/api/v1/song/42").unwrap();
//! assert_eq!(hit.operation().name, "song");
//! assert_eq!(hit.path_params[0].1, "42");
//! ```

mod core;
mod radix;
#[cfg(test)]
mod tests;

pub use core::{ParamVec, RouteEntry, RouteMatch, Router, MAX_INLINE_PARAMS};
