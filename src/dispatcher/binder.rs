//! Positional parameter binding.
//!
//! Raw values are aligned with the declared parameter list by position only.
//! A short list is left-padded with missing markers, so trailing declared
//! parameters receive the supplied values and leading ones come up missing.

use crate::error::BindError;
use crate::operation::{Arg, BoundArgs, ParamSpec, ParamType};

/// Bind `raw` onto `specs`. `None` marks a value the request did not supply.
///
/// # Errors
///
/// Any [`BindError`]; the operation must not be invoked when this fails.
pub fn bind(specs: &[ParamSpec], raw: Vec<Option<String>>) -> Result<BoundArgs, BindError> {
    if raw.len() > specs.len() {
        return Err(BindError::ParameterCountMismatch {
            expected: specs.len(),
            actual: raw.len(),
        });
    }

    let padding = specs.len() - raw.len();
    let values = std::iter::repeat_with(|| None).take(padding).chain(raw);

    specs
        .iter()
        .zip(values)
        .enumerate()
        .map(|(position, (spec, value))| coerce(position, spec, value))
        .collect::<Result<Vec<_>, _>>()
        .map(BoundArgs)
}

fn coerce(position: usize, spec: &ParamSpec, value: Option<String>) -> Result<Arg, BindError> {
    let Some(value) = value else {
        if spec.nullable {
            return Ok(Arg::Null);
        }
        return Err(BindError::MissingRequiredParameter {
            position,
            name: spec.name.clone(),
        });
    };

    match spec.ty {
        ParamType::String => Ok(Arg::Str(value)),
        ParamType::Integer => match value.parse::<i64>() {
            Ok(n) => Ok(Arg::Int(n)),
            Err(_) => Err(BindError::InvalidArgumentType {
                position,
                name: spec.name.clone(),
                value,
            }),
        },
    }
}
