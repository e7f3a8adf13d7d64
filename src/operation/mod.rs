//! # Operation Module
//!
//! Operations are declared in code, once, at startup. Each one names an HTTP
//! verb, a path template with `:name` placeholders, an ordered list of typed
//! parameters and a handler closure.
//!
//! ```rust
//! use jukebox::codec::error_json;
//! use jukebox::operation::Operation;
//!
//! let op = Operation::get("echo", "/echo/:id")
//!     .integer("id")
//!     .optional_string("token")
//!     .handler(|args| {
//!         let id = args.int(0)?;
//!         Ok(error_json(&format!("no echo for {id}")).into())
//!     });
//! assert_eq!(op.parameters.len(), 2);
//! assert_eq!(op.placeholder_count(), 1);
//! ```

mod types;

pub use types::{Arg, BoundArgs, HandlerFn, Operation, OperationBuilder, ParamSpec, ParamType};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArgError;

    #[test]
    fn test_bound_args_accessors() {
        let args = BoundArgs(vec![Arg::Int(4), Arg::Str("x".into()), Arg::Null]);
        assert_eq!(args.int(0), Ok(4));
        assert_eq!(args.str(1), Ok("x"));
        assert_eq!(args.opt_str(2), Ok(None));
        assert_eq!(args.opt_int(2), Ok(None));
        assert_eq!(args.str(2), Err(ArgError::Null(2)));
        assert_eq!(
            args.str(0),
            Err(ArgError::WrongType {
                position: 0,
                expected: "a string"
            })
        );
        assert_eq!(args.int(3), Err(ArgError::OutOfRange(3)));
    }

    #[test]
    fn test_builder_keeps_declared_order() {
        let op = Operation::post("save", "/a/:x/b/:y")
            .integer("x")
            .integer("y")
            .string("label")
            .handler(|_| Ok(crate::codec::error_json("unused").into()));
        let names: Vec<_> = op.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["x", "y", "label"]);
        assert_eq!(op.method, http::Method::POST);
        assert_eq!(op.placeholder_count(), 2);
        assert!(!op.parameters[2].nullable);
    }
}
