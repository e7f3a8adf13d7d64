use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::error::ArgError;
use crate::pending::Reply;

/// Semantic type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Integer,
    String,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Integer => write!(f, "Integer"),
            ParamType::String => write!(f, "String"),
        }
    }
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Documentation only; binding is positional.
    pub name: String,
    pub ty: ParamType,
    pub nullable: bool,
}

impl ParamSpec {
    #[must_use]
    pub fn integer(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ParamType::Integer,
            nullable: false,
        }
    }

    #[must_use]
    pub fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ParamType::String,
            nullable: false,
        }
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A bound, coerced argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Int(i64),
    Str(String),
    Null,
}

/// Arguments aligned 1:1 with an operation's parameter specs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundArgs(pub Vec<Arg>);

impl BoundArgs {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn at(&self, position: usize) -> Result<&Arg, ArgError> {
        self.0.get(position).ok_or(ArgError::OutOfRange(position))
    }

    pub fn int(&self, position: usize) -> Result<i64, ArgError> {
        self.opt_int(position)?.ok_or(ArgError::Null(position))
    }

    pub fn opt_int(&self, position: usize) -> Result<Option<i64>, ArgError> {
        match self.at(position)? {
            Arg::Int(v) => Ok(Some(*v)),
            Arg::Null => Ok(None),
            Arg::Str(_) => Err(ArgError::WrongType {
                position,
                expected: "an integer",
            }),
        }
    }

    pub fn str(&self, position: usize) -> Result<&str, ArgError> {
        self.opt_str(position)?.ok_or(ArgError::Null(position))
    }

    pub fn opt_str(&self, position: usize) -> Result<Option<&str>, ArgError> {
        match self.at(position)? {
            Arg::Str(v) => Ok(Some(v.as_str())),
            Arg::Null => Ok(None),
            Arg::Int(_) => Err(ArgError::WrongType {
                position,
                expected: "a string",
            }),
        }
    }
}

/// Operation body: bound arguments in, reply out.
pub type HandlerFn = Arc<dyn Fn(&BoundArgs) -> anyhow::Result<Reply> + Send + Sync>;

/// Immutable description of one operation.
#[derive(Clone)]
pub struct Operation {
    pub name: String,
    pub method: Method,
    /// Unversioned template, e.g. `/song/:id`.
    pub path_template: String,
    pub parameters: Vec<ParamSpec>,
    pub handler: HandlerFn,
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path_template", &self.path_template)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl Operation {
    /// Start declaring a GET operation.
    #[must_use]
    pub fn get(name: &str, path_template: &str) -> OperationBuilder {
        OperationBuilder::new(Method::GET, name, path_template)
    }

    /// Start declaring a POST operation.
    #[must_use]
    pub fn post(name: &str, path_template: &str) -> OperationBuilder {
        OperationBuilder::new(Method::POST, name, path_template)
    }

    /// Number of `:name` placeholders in the template.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.path_template
            .split('/')
            .filter(|segment| segment.starts_with(':'))
            .count()
    }
}

/// Builder used to declare operations in code.
#[derive(Debug)]
pub struct OperationBuilder {
    name: String,
    method: Method,
    path_template: String,
    parameters: Vec<ParamSpec>,
}

impl OperationBuilder {
    #[must_use]
    pub fn new(method: Method, name: &str, path_template: &str) -> Self {
        Self {
            name: name.to_string(),
            method,
            path_template: path_template.to_string(),
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    #[must_use]
    pub fn integer(self, name: &str) -> Self {
        self.param(ParamSpec::integer(name))
    }

    #[must_use]
    pub fn string(self, name: &str) -> Self {
        self.param(ParamSpec::string(name))
    }

    #[must_use]
    pub fn optional_string(self, name: &str) -> Self {
        self.param(ParamSpec::string(name).nullable())
    }

    /// Attach the operation body and finish the declaration.
    pub fn handler<F>(self, handler: F) -> Operation
    where
        F: Fn(&BoundArgs) -> anyhow::Result<Reply> + Send + Sync + 'static,
    {
        Operation {
            name: self.name,
            method: self.method,
            path_template: self.path_template,
            parameters: self.parameters,
            handler: Arc::new(handler),
        }
    }
}
