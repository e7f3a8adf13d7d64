//! Reply resolution.
//!
//! A pending reply is subscribed with a callback that forwards the outcome
//! over a `may` channel. Receiving on that channel parks the request
//! coroutine, not the worker thread, until the computation completes.

use std::time::Instant;

use may::sync::mpsc;
use tracing::{debug, error};

use crate::codec::{error_json, INTERNAL_SERVER_ERROR};
use crate::ids::RequestId;
use crate::pending::{JsonObject, Reply};

/// Resolve `reply` into the response body of operation `operation`.
#[must_use]
pub fn resolve(operation: &str, request_id: RequestId, reply: Reply) -> JsonObject {
    let pending = match reply {
        Reply::Ready(body) => return body,
        Reply::Pending(pending) => pending,
    };

    let started = Instant::now();
    let (tx, rx) = mpsc::channel();
    pending.subscribe(move |outcome| {
        // The receiver only goes away if the request coroutine was torn down.
        let _ = tx.send(outcome);
    });

    match rx.recv() {
        Ok(Ok(body)) => {
            debug!(
                request_id = %request_id,
                operation = %operation,
                wait_us = started.elapsed().as_micros(),
                "Pending reply resolved"
            );
            body
        }
        Ok(Err(cause)) => {
            error!(
                request_id = %request_id,
                operation = %operation,
                error = %format!("{cause:#}"),
                "Pending reply failed"
            );
            error_json(INTERNAL_SERVER_ERROR)
        }
        Err(_) => {
            error!(
                request_id = %request_id,
                operation = %operation,
                "Pending reply dropped without completing"
            );
            error_json(INTERNAL_SERVER_ERROR)
        }
    }
}
