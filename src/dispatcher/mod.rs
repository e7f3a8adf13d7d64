//! # Dispatcher Module
//!
//! Turns a routed request into a JSON response body. Each request runs on the
//! connection coroutine that received it:
//!
//! 1. the router matches verb + path and yields placeholder values,
//! 2. [`bind`] aligns placeholder and query (or body) values with the
//!    operation's declared parameters and coerces them,
//! 3. [`invoke`] calls the handler, containing errors and panics,
//! 4. [`resolve`] waits for a pending reply, parking only the coroutine.
//!
//! Binding and invocation failures become `invalid call to <operation>`;
//! pending failures become `internal server error`. Causes are logged with
//! the request id and never sent to the client.

mod binder;
mod core;
mod invoker;
mod normalizer;

pub use binder::bind;
pub use core::{DispatchRequest, Dispatcher, HandlerResponse};
pub use invoker::{invoke, InvokeError};
pub use normalizer::resolve;
