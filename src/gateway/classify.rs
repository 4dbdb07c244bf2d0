// Request classification: static, dynamic or uncacheable

use phf::phf_set;

/// File extensions cached on demand (image and font formats).
static DYNAMIC_EXTENSIONS: phf::Set<&'static str> = phf_set! {
    "jpg", "jpeg", "png", "webp", "svg", "woff", "woff2", "ttf",
};

/// How a request relates to the cache tiers. Derived per request,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Part of the install-time manifest; lives in the static tier.
    StaticCandidate,
    /// Cached into the dynamic tier after a successful fetch.
    DynamicCandidate,
    /// Never stored in any tier.
    Uncacheable,
}

/// Whether the gateway intercepts this request at all. Only GET over
/// http/https goes through the cache path; everything else passes
/// through untouched.
pub fn is_intercepted(method: &str, url: &str) -> bool {
    method.eq_ignore_ascii_case("GET")
        && (url.starts_with("http://") || url.starts_with("https://"))
}

/// Classify a request URL against the manifest and the dynamic patterns.
///
/// Dynamic prefixes starting with a scheme match the full URL (cross-origin
/// CDNs); bare prefixes match the path. A matching file extension also
/// makes a request dynamic.
pub fn classify(
    method: &str,
    url: &str,
    static_manifest: &[String],
    dynamic_prefixes: &[String],
) -> RequestClass {
    if !is_intercepted(method, url) {
        return RequestClass::Uncacheable;
    }

    let parsed = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return RequestClass::Uncacheable,
    };
    let path = parsed.path();

    if static_manifest.iter().any(|entry| entry == path) {
        return RequestClass::StaticCandidate;
    }

    let prefix_match = dynamic_prefixes.iter().any(|prefix| {
        if prefix.starts_with("http://") || prefix.starts_with("https://") {
            url.starts_with(prefix.as_str())
        } else {
            path.starts_with(prefix.as_str())
        }
    });
    if prefix_match || has_dynamic_extension(path) {
        return RequestClass::DynamicCandidate;
    }

    RequestClass::Uncacheable
}

fn has_dynamic_extension(path: &str) -> bool {
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((_, ext)) => DYNAMIC_EXTENSIONS.contains(ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;

    fn classify_default(method: &str, url: &str) -> RequestClass {
        let config = CacheConfig::default();
        classify(method, url, &config.static_manifest, &config.dynamic_prefixes)
    }

    #[test]
    fn test_manifest_paths_are_static_candidates() {
        assert_eq!(
            classify_default("GET", "http://127.0.0.1:8000/index.html"),
            RequestClass::StaticCandidate
        );
        assert_eq!(
            classify_default("GET", "http://127.0.0.1:8000/"),
            RequestClass::StaticCandidate
        );
    }

    #[test]
    fn test_dynamic_prefix_and_extension_matching() {
        // Path prefix
        assert_eq!(
            classify_default("GET", "http://127.0.0.1:8000/images/photo123.webp"),
            RequestClass::DynamicCandidate
        );
        assert_eq!(
            classify_default("GET", "http://127.0.0.1:8000/fonts/site.woff2"),
            RequestClass::DynamicCandidate
        );
        // Full-URL prefix (cross-origin font CDN)
        assert_eq!(
            classify_default("GET", "https://fonts.googleapis.com/css?family=Cairo"),
            RequestClass::DynamicCandidate
        );
        // Extension outside any prefix
        assert_eq!(
            classify_default("GET", "http://127.0.0.1:8000/assets/logo.PNG"),
            RequestClass::DynamicCandidate
        );
        // Query string does not hide the extension
        assert_eq!(
            classify_default("GET", "http://127.0.0.1:8000/assets/bg.jpeg?v=3"),
            RequestClass::DynamicCandidate
        );
    }

    #[test]
    fn test_uncacheable_requests() {
        // Non-GET
        assert_eq!(
            classify_default("POST", "http://127.0.0.1:8000/images/photo.webp"),
            RequestClass::Uncacheable
        );
        // Non-http scheme
        assert_eq!(
            classify_default("GET", "chrome-extension://abcdef/page.html"),
            RequestClass::Uncacheable
        );
        // Plain page outside the manifest
        assert_eq!(
            classify_default("GET", "http://127.0.0.1:8000/projects"),
            RequestClass::Uncacheable
        );
    }

    #[test]
    fn test_is_intercepted() {
        assert!(is_intercepted("GET", "https://example.com/"));
        assert!(is_intercepted("get", "http://example.com/"));
        assert!(!is_intercepted("POST", "https://example.com/"));
        assert!(!is_intercepted("GET", "ftp://example.com/"));
    }
}
