//! Gzip content encoding for outgoing responses.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;

use crate::parser::HttpRequest;
use crate::server::error::Error;
use crate::server::response::HttpResponse;

/// Content types worth compressing. Everything else is assumed to be
/// already compressed or binary.
fn is_compressible(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.starts_with("text/")
        || matches!(
            essence,
            "application/javascript"
                | "application/json"
                | "application/xml"
                | "application/xhtml+xml"
                | "application/manifest+json"
                | "image/svg+xml"
        )
}

/// Gzip the body in place when the client accepts it and the content is
/// textual. Returns whether the response was encoded.
pub fn gzip_response(request: &HttpRequest, response: &mut HttpResponse) -> Result<bool, Error> {
    if response.body.is_empty()
        || response.get_header("Content-Encoding").is_some()
        || !request.accepts_encoding("gzip")
    {
        return Ok(false);
    }
    match response.get_header("Content-Type") {
        Some(content_type) if is_compressible(content_type) => {}
        _ => return Ok(false),
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&response.body)?;
    let compressed = encoder.finish()?;
    debug!(
        "gzip {path}: {before} -> {after} bytes",
        path = request.path,
        before = response.body.len(),
        after = compressed.len()
    );

    response.body = compressed;
    response.set_header("Content-Encoding", "gzip");
    response.set_header("Vary", "Accept-Encoding");
    if let Some(etag) = response.get_header("ETag").map(encoded_etag) {
        response.set_header("ETag", etag);
    }
    Ok(true)
}

/// The validator for the gzip representation: `"x"` becomes `"x-gz"`.
fn encoded_etag(etag: &str) -> String {
    match etag.strip_suffix('"') {
        Some(opaque) => format!("{opaque}-gz\""),
        None => format!("{etag}-gz"),
    }
}
