// src/utils/url.rs

//! URL helpers for deep links.

use url::Url;

use crate::error::Result;

/// Join `path` onto `base` and append query parameters, percent-encoded.
///
/// # Examples
/// ```
/// use skysniper::utils::url::with_query;
///
/// let link = with_query(
///     "https://mrbilit.com",
///     "/flight/search",
///     &[("origin", "THR".to_string()), ("date", "2025-01-15".to_string())],
/// )
/// .unwrap();
/// assert_eq!(link, "https://mrbilit.com/flight/search?origin=THR&date=2025-01-15");
/// ```
pub fn with_query(base: &str, path: &str, query: &[(&str, String)]) -> Result<String> {
    let mut url = Url::parse(base)?.join(path)?;
    if !query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url.to_string())
}

/// Extract the host from a URL string.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.trim_start_matches("www.").to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_encodes() {
        let link = with_query(
            "https://www.alibaba.ir",
            "/flights/THR-IST",
            &[("departing", "2025-01-15".into()), ("adult", "1".into())],
        )
        .unwrap();
        assert_eq!(
            link,
            "https://www.alibaba.ir/flights/THR-IST?departing=2025-01-15&adult=1"
        );

        let link = with_query("https://x.example", "/s", &[("q", "a b&c".into())]).unwrap();
        assert_eq!(link, "https://x.example/s?q=a+b%26c");
    }

    #[test]
    fn test_with_query_rejects_bad_base() {
        assert!(with_query("not a url", "/x", &[]).is_err());
    }

    #[test]
    fn test_get_domain() {
        assert_eq!(
            get_domain("https://www.alibaba.ir/flights"),
            Some("alibaba.ir".to_string())
        );
        assert_eq!(
            get_domain("https://app.ataair.ir"),
            Some("app.ataair.ir".to_string())
        );
        assert_eq!(get_domain("nope"), None);
    }
}
