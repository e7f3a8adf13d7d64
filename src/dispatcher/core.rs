use std::sync::Arc;
use std::time::Instant;

use http::Method;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::binder::bind;
use super::invoker::invoke;
use super::normalizer::resolve;
use crate::codec::error_json;
use crate::ids::RequestId;
use crate::logging::RedactionLevel;
use crate::operation::Operation;
use crate::router::{ParamVec, RouteMatch, Router};

/// Request as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub request_id: RequestId,
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    /// Query parameters in received order.
    pub query: ParamVec,
    /// Parsed JSON body, if the request carried one.
    pub body: Option<Value>,
}

impl DispatchRequest {
    #[must_use]
    pub fn get(path: &str, query: ParamVec) -> Self {
        Self {
            request_id: RequestId::new(),
            method: Method::GET,
            path: path.to_string(),
            query,
            body: None,
        }
    }
}

/// Status and JSON body produced for a request.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// `{"error": message}` with the given status.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, Value::Object(error_json(message)))
    }
}

/// Runs matched requests through bind, invoke and resolve.
///
/// Every failure after routing produces an error envelope with status 200;
/// nothing a request does can take the process down.
pub struct Dispatcher {
    router: Arc<Router>,
    redaction: RedactionLevel,
}

impl Dispatcher {
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            redaction: RedactionLevel::default(),
        }
    }

    #[must_use]
    pub fn with_redaction(mut self, level: RedactionLevel) -> Self {
        self.redaction = level;
        self
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Masking applied to logged parameter values.
    #[must_use]
    pub fn redaction(&self) -> RedactionLevel {
        self.redaction
    }

    /// Dispatch a request. `None` means no route matched.
    #[must_use]
    pub fn dispatch(&self, request: DispatchRequest) -> Option<HandlerResponse> {
        let route_match = self.router.route(&request.method, &request.path)?;
        let operation = route_match.operation();
        let request_id = request.request_id;
        let started = Instant::now();

        let raw = raw_values(operation, &route_match, &request);
        info!(
            request_id = %request_id,
            operation = %operation.name,
            method = %request.method,
            path = %request.path,
            params = ?self.loggable(operation, &raw),
            "Request dispatched to operation"
        );

        let args = match bind(&operation.parameters, raw) {
            Ok(args) => args,
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    operation = %operation.name,
                    error = %e,
                    "Parameter binding failed"
                );
                return Some(invalid_call(operation));
            }
        };

        let reply = match invoke(operation, &args) {
            Ok(reply) => reply,
            Err(e) => {
                error!(
                    request_id = %request_id,
                    operation = %operation.name,
                    error = %e,
                    "Operation invocation failed"
                );
                return Some(invalid_call(operation));
            }
        };

        let body = resolve(&operation.name, request_id, reply);
        info!(
            request_id = %request_id,
            operation = %operation.name,
            is_error = body.contains_key("error"),
            latency_us = started.elapsed().as_micros(),
            "Operation complete"
        );
        Some(HandlerResponse::json(200, Value::Object(body)))
    }

    fn loggable(&self, operation: &Operation, raw: &[Option<String>]) -> Vec<String> {
        // Raw values are left-aligned with the specs they will bind to.
        let offset = operation.parameters.len().saturating_sub(raw.len());
        raw.iter()
            .enumerate()
            .map(|(i, value)| {
                let name = operation
                    .parameters
                    .get(i + offset)
                    .map_or("", |spec| spec.name.as_str());
                match value {
                    Some(v) => format!("{name}={}", self.redaction.redact(name, v)),
                    None => format!("{name}=<missing>"),
                }
            })
            .collect()
    }
}

fn invalid_call(operation: &Operation) -> HandlerResponse {
    HandlerResponse::error(200, &format!("invalid call to {}", operation.name))
}

fn has_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Assemble positional raw values: placeholders first, then query values
/// (GET) or same-named body fields in declared order (body verbs).
fn raw_values(
    operation: &Operation,
    route_match: &RouteMatch,
    request: &DispatchRequest,
) -> Vec<Option<String>> {
    let mut raw: Vec<Option<String>> = route_match
        .path_params
        .iter()
        .map(|(_, v)| Some(v.clone()))
        .collect();

    if has_body(&request.method) {
        let fields = request.body.as_ref().and_then(Value::as_object);
        for spec in operation.parameters.iter().skip(raw.len()) {
            let value = fields.and_then(|f| f.get(&spec.name)).and_then(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            });
            raw.push(value);
        }
        if fields.is_none() {
            debug!(
                request_id = %request.request_id,
                operation = %operation.name,
                "Request body is not a JSON object; no fields bound"
            );
        }
    } else {
        raw.extend(request.query.iter().map(|(_, v)| Some(v.clone())));
    }
    raw
}
