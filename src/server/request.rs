use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

use crate::logging::RedactionLevel;
use crate::router::ParamVec;

/// The parts of a `may_minihttp::Request` the service needs.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    pub method: String,
    /// Path without the query string.
    pub path: String,
    /// Header map with lowercase keys.
    pub headers: HashMap<String, String>,
    /// Query parameters in received order, URL-decoded.
    pub query_params: ParamVec,
    /// JSON body, when one was sent and it parsed.
    pub body: Option<serde_json::Value>,
}

/// Ordered query parameters of `path` (everything after `?`).
#[must_use]
pub fn parse_query_params(path: &str) -> ParamVec {
    let Some((_, query)) = path.split_once('?') else {
        return ParamVec::new();
    };
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

/// Read method, path, headers, query and body off the wire.
///
/// The body is read last because reading it consumes the request. Query
/// values are logged through `redaction`.
pub fn parse_request(req: Request, redaction: RedactionLevel) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let query_params = parse_query_params(&raw_path);
    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        query = ?loggable_query(&query_params, redaction),
        "HTTP request parsed"
    );

    let mut body_str = String::new();
    let body = match req.body().read_to_string(&mut body_str) {
        Ok(size) if size > 0 => {
            let parsed = serde_json::from_str(&body_str).ok();
            debug!(
                body_size_bytes = size,
                json = parsed.is_some(),
                "Request body read"
            );
            parsed
        }
        _ => None,
    };

    ParsedRequest {
        method,
        path,
        headers,
        query_params,
        body,
    }
}

fn loggable_query(params: &ParamVec, level: RedactionLevel) -> Vec<String> {
    params
        .iter()
        .map(|(k, v)| format!("{k}={}", level.redact(k, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_keep_received_order() {
        let q = parse_query_params("/api/v1/login?username=bob&password=a%20b");
        let pairs: Vec<_> = q.iter().map(|(k, v)| (k.as_ref(), v.as_str())).collect();
        assert_eq!(pairs, [("username", "bob"), ("password", "a b")]);
    }

    #[test]
    fn test_repeated_keys_are_kept() {
        let q = parse_query_params("/x?token=a&token=b");
        assert_eq!(q.len(), 2);
        assert_eq!(q[1].1, "b");
    }

    #[test]
    fn test_no_query() {
        assert!(parse_query_params("/api/v1/validate").is_empty());
        assert!(parse_query_params("/api/v1/validate?").is_empty());
    }

    #[test]
    fn test_loggable_query_masks_credentials() {
        let q = parse_query_params("/x?username=bob&password=hunter2");
        assert_eq!(
            loggable_query(&q, RedactionLevel::Credentials),
            ["username=bob", "password=<REDACTED>"]
        );
    }

    #[test]
    fn test_loggable_query_follows_redaction_level() {
        let q = parse_query_params("/x?username=bob&password=hunter2");
        assert_eq!(
            loggable_query(&q, RedactionLevel::Full),
            ["username=<REDACTED>", "password=<REDACTED>"]
        );
        assert_eq!(
            loggable_query(&q, RedactionLevel::None),
            ["username=bob", "password=hunter2"]
        );
    }
}
