//! # Pending computations
//!
//! A [`Pending<T>`] is a handle to a value that is not available yet. It is
//! callback based: the computation is started when someone subscribes, and it
//! reports its outcome through a [`Completer<T>`]. The completer is consumed by
//! `complete`, so a computation can report at most one outcome.
//!
//! Handlers compose pendings with [`Pending::map`], [`Pending::and_then`] and
//! [`Pending::zip`]; the result normalizer is the only place that subscribes.
//!
//! ```rust
//! use jukebox::pending::Pending;
//!
//! let doubled = Pending::ready(21).map(|n| n * 2);
//! doubled.subscribe(|result| assert_eq!(result.ok(), Some(42)));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

use may::coroutine;
use serde_json::{Map, Value};
use tracing::error;

/// Outcome of a pending computation.
pub type Completion<T> = Result<T, anyhow::Error>;

/// JSON object produced by every operation.
pub type JsonObject = Map<String, Value>;

type Callback<T> = Box<dyn FnOnce(Completion<T>) + Send>;

/// One-shot sink for the outcome of a [`Pending`].
pub struct Completer<T> {
    callback: Callback<T>,
}

impl<T> Completer<T> {
    fn new(callback: impl FnOnce(Completion<T>) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    pub fn complete(self, outcome: Completion<T>) {
        (self.callback)(outcome);
    }

    pub fn succeed(self, value: T) {
        self.complete(Ok(value));
    }

    pub fn fail(self, cause: impl Into<anyhow::Error>) {
        self.complete(Err(cause.into()));
    }
}

/// Handle to a value that will be produced later.
#[must_use = "a pending computation does nothing until it is subscribed"]
pub struct Pending<T> {
    start: Box<dyn FnOnce(Completer<T>) + Send>,
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pending(..)")
    }
}

impl<T: Send + 'static> Pending<T> {
    /// Wrap a computation that reports through the given completer.
    pub fn new(start: impl FnOnce(Completer<T>) + Send + 'static) -> Self {
        Self {
            start: Box::new(start),
        }
    }

    /// An already-successful computation.
    pub fn ready(value: T) -> Self {
        Self::new(move |done| done.succeed(value))
    }

    /// An already-failed computation.
    pub fn failed(cause: impl Into<anyhow::Error>) -> Self {
        let cause = cause.into();
        Self::new(move |done| done.fail(cause))
    }

    /// Run `work` on its own coroutine and complete with its result.
    ///
    /// If the coroutine cannot be spawned the computation fails with the
    /// spawn error instead.
    pub fn spawn(work: impl FnOnce() -> Completion<T> + Send + 'static) -> Self {
        Self::new(move |done| {
            let slot = Arc::new(Mutex::new(Some(done)));
            let worker_slot = Arc::clone(&slot);

            // SAFETY: may::coroutine::Builder::spawn() is marked unsafe by the may runtime.
            // The closure is Send + 'static and owns everything it touches; the only
            // shared state is the completer slot, which is guarded by a mutex.
            let spawned = unsafe {
                coroutine::Builder::new()
                    .stack_size(may::config().get_stack_size())
                    .spawn(move || {
                        let outcome = work();
                        if let Some(done) = take(&worker_slot) {
                            done.complete(outcome);
                        }
                    })
            };

            if let Err(e) = spawned {
                error!(error = %e, "Failed to spawn pending worker coroutine");
                if let Some(done) = take(&slot) {
                    done.fail(e);
                }
            }
        })
    }

    /// Start the computation and deliver its outcome to `callback`.
    pub fn subscribe(self, callback: impl FnOnce(Completion<T>) + Send + 'static) {
        (self.start)(Completer::new(callback));
    }

    pub fn map<U: Send + 'static>(self, f: impl FnOnce(T) -> U + Send + 'static) -> Pending<U> {
        Pending::new(move |done| self.subscribe(move |outcome| done.complete(outcome.map(f))))
    }

    /// Chain a dependent computation onto this one. Failures short-circuit.
    pub fn and_then<U: Send + 'static>(
        self,
        f: impl FnOnce(T) -> Pending<U> + Send + 'static,
    ) -> Pending<U> {
        Pending::new(move |done| {
            self.subscribe(move |outcome| match outcome {
                Ok(value) => f(value).subscribe(move |next| done.complete(next)),
                Err(e) => done.fail(e),
            })
        })
    }

    /// Combine two computations. Both must succeed; the first failure wins.
    pub fn zip<U: Send + 'static>(self, other: Pending<U>) -> Pending<(T, U)> {
        self.and_then(move |left| other.map(move |right| (left, right)))
    }
}

fn take<T>(slot: &Mutex<Option<Completer<T>>>) -> Option<Completer<T>> {
    match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    }
}

/// What an operation handler hands back to the dispatcher.
#[derive(Debug)]
pub enum Reply {
    /// Fully computed; written in the same turn.
    Ready(JsonObject),
    /// Written when the computation completes.
    Pending(Pending<JsonObject>),
}

impl From<JsonObject> for Reply {
    fn from(value: JsonObject) -> Self {
        Reply::Ready(value)
    }
}

impl From<Pending<JsonObject>> for Reply {
    fn from(value: Pending<JsonObject>) -> Self {
        Reply::Pending(value)
    }
}
