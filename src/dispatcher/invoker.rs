//! Handler invocation with failure containment.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;

use crate::operation::{BoundArgs, Operation};
use crate::pending::Reply;

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("handler returned an error: {0:#}")]
    Failed(anyhow::Error),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

/// Call the operation's handler, turning errors and panics into [`InvokeError`].
///
/// # Errors
///
/// [`InvokeError::Failed`] for a returned error, [`InvokeError::Panicked`]
/// when the handler unwinds.
pub fn invoke(operation: &Operation, args: &BoundArgs) -> Result<Reply, InvokeError> {
    match catch_unwind(AssertUnwindSafe(|| (operation.handler)(args))) {
        Ok(Ok(reply)) => Ok(reply),
        Ok(Err(e)) => Err(InvokeError::Failed(e)),
        Err(payload) => Err(InvokeError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::error_json;
    use crate::operation::Arg;

    #[test]
    fn test_returned_error_is_contained() {
        let op = Operation::get("boom", "/boom").handler(|_| Err(anyhow::anyhow!("store down")));
        let err = invoke(&op, &BoundArgs::default()).unwrap_err();
        assert!(matches!(err, InvokeError::Failed(_)));
        assert!(err.to_string().contains("store down"));
    }

    #[test]
    fn test_panic_is_contained() {
        let op = Operation::get("panic", "/panic").handler(|_| panic!("kaboom"));
        let err = invoke(&op, &BoundArgs::default()).unwrap_err();
        match err {
            InvokeError::Panicked(msg) => assert_eq!(msg, "kaboom"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_wrong_accessor_is_a_failure() {
        let op = Operation::get("song", "/song/:id").integer("id").handler(|args| {
            let name = args.str(0)?;
            Ok(error_json(name).into())
        });
        let err = invoke(&op, &BoundArgs(vec![Arg::Int(1)])).unwrap_err();
        assert!(matches!(err, InvokeError::Failed(_)));
    }

    #[test]
    fn test_success_passes_reply_through() {
        let op = Operation::get("ok", "/ok").handler(|_| Ok(error_json("fine").into()));
        assert!(matches!(invoke(&op, &BoundArgs::default()), Ok(Reply::Ready(_))));
    }
}
