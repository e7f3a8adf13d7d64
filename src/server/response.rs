use may_minihttp::Response;
use serde_json::Value;
use tracing::error;

/// Content type of every response this service writes.
pub const CONTENT_TYPE: &str = "Content-Type: text/json";

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Serialize `body`, compact or indented.
pub fn encode_body(body: &Value, pretty: bool) -> Vec<u8> {
    let encoded = if pretty {
        serde_json::to_vec_pretty(body)
    } else {
        serde_json::to_vec(body)
    };
    match encoded {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Response serialization failed");
            br#"{"error":"internal server error"}"#.to_vec()
        }
    }
}

/// Write `body` as the single response of this request.
pub fn write_json(res: &mut Response, status: u16, body: &Value, pretty: bool) {
    res.status_code(usize::from(status), status_reason(status));
    res.header(CONTENT_TYPE);
    res.body_vec(encode_body(body, pretty));
}
