//! Translation between HTTP requests and render host calls.
//!
//! The payload is a JSON object carried in the query string (percent-encoded)
//! or, when the query is empty or unparsable, in the body. The resource suffix
//! picks the response: `.json` reports parameters, anything else renders audio
//! in the matching container.

use crate::http::{HttpRequest, HttpResponse};
use synthcast_core::{ContainerKind, CoreError, RenderOutput, RenderRequest, ResponseKind};

/// Decodes `%XX` escapes. Invalid escapes are kept as-is and `+` is not
/// treated as a space.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Response kind selected by the path's extension. No extension means WAV.
pub fn route(path: &str) -> ResponseKind {
    let path = percent_decode(path);
    let file = path.rsplit('/').next().unwrap_or_default();

    match file.rsplit_once('.') {
        Some((_, ext)) if ext.eq_ignore_ascii_case("json") => ResponseKind::Introspection,
        Some((_, ext)) => ResponseKind::Audio(ContainerKind::from_extension(ext)),
        None => ResponseKind::Audio(ContainerKind::Wav),
    }
}

/// Query payload first, then body, then all defaults.
pub fn parse_payload(request: &HttpRequest) -> RenderRequest {
    request
        .query
        .as_deref()
        .and_then(|query| RenderRequest::from_json(&percent_decode(query)))
        .or_else(|| RenderRequest::from_json(&String::from_utf8_lossy(&request.body)))
        .unwrap_or_default()
}

/// Builds the render request. The path's suffix overrides `listParameters`.
pub fn translate(request: &HttpRequest) -> RenderRequest {
    let mut render = parse_payload(request);
    match route(&request.path) {
        ResponseKind::Introspection => render.list_parameters = true,
        ResponseKind::Audio(container) => {
            render.list_parameters = false;
            render.container = container;
        }
    }
    render
}

pub fn status_for(err: &CoreError) -> u16 {
    match err {
        CoreError::Timeout { .. } => 503,
        CoreError::UnsupportedFormat(_) => 415,
        CoreError::InvalidRequest(_) => 400,
        _ => 500,
    }
}

/// 200 with the exact body and content type, or an empty error response.
pub fn into_response(result: synthcast_core::Result<RenderOutput>) -> HttpResponse {
    let outcome = result.and_then(|output| {
        let content_type = output.content_type();
        output.into_body().map(|body| (content_type, body))
    });

    match outcome {
        Ok((content_type, body)) => HttpResponse::ok(content_type, body),
        Err(e) => {
            let status = status_for(&e);
            if status >= 500 {
                tracing::warn!(status, error = %e, "Render failed");
            } else {
                tracing::debug!(status, error = %e, "Request rejected");
            }
            HttpResponse::empty(status)
        }
    }
}
