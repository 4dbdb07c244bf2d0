// Synthesized fallback responses for offline failures

use crate::gateway::resolve::{GatewayResponse, ResponseSource};
use bytes::Bytes;

/// Inline placeholder returned when an image fetch fails with no
/// connectivity. Fixed 200x200 viewport with a localized caption.
const PLACEHOLDER_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"200\" height=\"200\" viewBox=\"0 0 200 200\"><rect width=\"200\" height=\"200\" fill=\"#f3f4f6\"/><text x=\"100\" y=\"100\" text-anchor=\"middle\" dy=\".3em\" fill=\"#9ca3af\">صورة غير متاحة</text></svg>";

/// Build the placeholder image response. This is synthesized, not a
/// cache lookup.
pub fn placeholder_image() -> GatewayResponse {
    GatewayResponse {
        status: 200,
        headers: vec![("content-type".to_string(), "image/svg+xml".to_string())],
        body: Bytes::from_static(PLACEHOLDER_SVG.as_bytes()),
        source: ResponseSource::PlaceholderImage,
    }
}
