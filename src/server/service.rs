use super::request::{parse_request, ParsedRequest};
use super::response::write_json;
use crate::dispatcher::{DispatchRequest, Dispatcher};
use crate::ids::RequestId;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::debug;

/// The `may_minihttp` service: health probe, then the dispatcher, then 404.
///
/// Cloned once per connection; clones share the dispatcher.
#[derive(Clone)]
pub struct AppService {
    pub dispatcher: Arc<Dispatcher>,
    pub pretty_json: bool,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            pretty_json: false,
        }
    }

    #[must_use]
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }
}

/// `{"status": "ok"}`
pub fn health_endpoint(res: &mut Response, pretty: bool) -> io::Result<()> {
    write_json(res, 200, &json!({ "status": "ok" }), pretty);
    Ok(())
}

fn not_found(res: &mut Response, pretty: bool) -> io::Result<()> {
    write_json(res, 404, &json!({ "error": "not found" }), pretty);
    Ok(())
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            path,
            headers,
            query_params,
            body,
        } = parse_request(req, self.dispatcher.redaction());

        if method == "GET" && path == "/health" {
            return health_endpoint(res, self.pretty_json);
        }

        let Ok(method) = Method::from_bytes(method.as_bytes()) else {
            debug!(method = %method, "Unrecognized HTTP method");
            return not_found(res, self.pretty_json);
        };

        let request = DispatchRequest {
            request_id: RequestId::from_header_or_new(
                headers.get("x-request-id").map(String::as_str),
            ),
            method,
            path,
            query: query_params,
            body,
        };

        match self.dispatcher.dispatch(request) {
            Some(response) => {
                write_json(res, response.status, &response.body, self.pretty_json);
                Ok(())
            }
            None => not_found(res, self.pretty_json),
        }
    }
}
