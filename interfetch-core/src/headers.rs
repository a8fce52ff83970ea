//! Layered header merging.
//!
//! Headers are merged per key: a header present in a later layer replaces
//! every value of the same header in earlier layers, while headers the later
//! layer does not mention are kept.

use http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, PROXY_AUTHORIZATION};
use http::{HeaderMap, HeaderName, HeaderValue};

/// Media type sent by default with every request.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Headers whose values carry credentials.
pub const SENSITIVE_HEADERS: [HeaderName; 3] = [AUTHORIZATION, PROXY_AUTHORIZATION, COOKIE];

/// The built-in header layer: `content-type: application/json`.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    headers
}

/// Overlay `layer` onto `base`, key by key.
pub fn overlay_headers(base: &mut HeaderMap, layer: &HeaderMap) {
    for name in layer.keys() {
        base.remove(name);
        for value in layer.get_all(name) {
            base.append(name.clone(), value.clone());
        }
    }
}

/// Merge header layers on top of [`default_headers`], later layers winning.
///
/// Credential headers in the result are marked sensitive.
pub fn merge_headers<'a, I>(layers: I) -> HeaderMap
where
    I: IntoIterator<Item = &'a HeaderMap>,
{
    let mut headers = default_headers();
    for layer in layers {
        overlay_headers(&mut headers, layer);
    }
    mark_sensitive(&mut headers);
    headers
}

/// Flag every value of a [`SENSITIVE_HEADERS`] entry as sensitive, so its
/// `Debug` output is redacted.
pub fn mark_sensitive(headers: &mut HeaderMap) {
    for (name, value) in headers.iter_mut() {
        if SENSITIVE_HEADERS.contains(name) {
            value.set_sensitive(true);
        }
    }
}

/// A copy of `headers` with credential values redacted from `Debug` output.
pub fn redacted(headers: &HeaderMap) -> HeaderMap {
    let mut copy = headers.clone();
    mark_sensitive(&mut copy);
    copy
}
