//! Request URL resolution.

use indexmap::IndexMap;

use crate::UrlError;

/// Join a base API URL, a path and query parameters into the request URL.
///
/// `api_url` and `url` are concatenated as-is; callers supply the separating
/// slash. Non-empty `params` are encoded and appended after a `?`.
///
/// # Example
///
/// ```
/// use interfetch_core::{IndexMap, resolve_url};
///
/// let mut params = IndexMap::new();
/// params.insert("perPage".to_string(), "10".to_string());
///
/// let url = resolve_url("https://api.example.com", "/things", &params).unwrap();
/// assert_eq!(url, "https://api.example.com/things?perPage=10");
/// ```
pub fn resolve_url(
    api_url: &str,
    url: &str,
    params: &IndexMap<String, String>,
) -> Result<String, UrlError> {
    let mut resolved = String::with_capacity(api_url.len() + url.len());
    resolved.push_str(api_url);
    resolved.push_str(url);

    if !params.is_empty() {
        let query = serde_qs::to_string(params).map_err(|e| UrlError::Query(e.to_string()))?;
        resolved.push('?');
        resolved.push_str(&query);
    }

    Ok(resolved)
}
