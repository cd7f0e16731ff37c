//! Legacy `X-Forwarded-*` headers.
//!
//! # Design Decisions
//! - `By` and `For` may carry a comma-separated chain; the first entry is
//!   the one closest to the client
//! - `Host` and `Proto` carry a single value and are only trimmed
//! - Only the first header line is read (`HeaderMap::get` semantics)

use axum::http::HeaderMap;

use super::{header_str, Extractor, Field};

/// Reads `X-Forwarded-By`, `X-Forwarded-For`, `X-Forwarded-Host` and
/// `X-Forwarded-Proto`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Legacy;

impl Extractor for Legacy {
    fn get(&self, field: Field, headers: &HeaderMap) -> String {
        let Some(value) = header_str(headers, field.legacy_header()) else {
            return String::new();
        };

        match field {
            Field::By | Field::For => value
                .split(',')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string(),
            Field::Host | Field::Proto => value.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with(name: &'static str, value: &'static str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_static(value));
        map
    }

    // Address chains shared by the By and For cases: (header value, expected).
    const CHAINS: &[(&str, &str)] = &[
        ("1.1.1.1:8080", "1.1.1.1:8080"),
        ("[2606:4700:4700::1111]:8080", "[2606:4700:4700::1111]:8080"),
        ("1.1.1.1:8080, 2.2.2.2:9090", "1.1.1.1:8080"),
        (
            "[2606:4700:4700::1111]:8080, [2606:4700:4700::2222]:9090",
            "[2606:4700:4700::1111]:8080",
        ),
        ("1.1.1.1:8080, [2606:4700:4700::2222]:9090", "1.1.1.1:8080"),
        ("  3.3.3.3  ,4.4.4.4", "3.3.3.3"),
        (", 5.5.5.5", ""),
        ("", ""),
    ];

    #[test]
    fn test_missing_headers() {
        let empty = HeaderMap::new();
        for field in Field::ALL {
            assert_eq!(Legacy.get(field, &empty), "", "field {field}");
        }
    }

    #[test]
    fn test_by_takes_first_entry() {
        for &(value, want) in CHAINS {
            let map = with("x-forwarded-by", value);
            assert_eq!(Legacy.by(&map), want, "X-Forwarded-By: {value:?}");
        }
    }

    #[test]
    fn test_for_takes_first_entry() {
        for &(value, want) in CHAINS {
            let map = with("x-forwarded-for", value);
            assert_eq!(Legacy.for_(&map), want, "X-Forwarded-For: {value:?}");
        }
    }

    #[test]
    fn test_host_is_trimmed_not_split() {
        let cases = [
            ("api.example.com", "api.example.com"),
            ("1.1.1.1", "1.1.1.1"),
            ("[2606:4700:4700::1111]", "[2606:4700:4700::1111]"),
            ("1.1.1.1:8080", "1.1.1.1:8080"),
            ("[2606:4700:4700::1111]:8080", "[2606:4700:4700::1111]:8080"),
            ("  api.example.com ", "api.example.com"),
            ("a.example.com, b.example.com", "a.example.com, b.example.com"),
        ];
        for (value, want) in cases {
            let map = with("x-forwarded-host", value);
            assert_eq!(Legacy.host(&map), want, "X-Forwarded-Host: {value:?}");
        }
    }

    #[test]
    fn test_proto() {
        assert_eq!(Legacy.proto(&with("x-forwarded-proto", "http")), "http");
        assert_eq!(Legacy.proto(&with("x-forwarded-proto", "nonsense")), "nonsense");
        assert_eq!(Legacy.proto(&with("x-forwarded-proto", " HTTPS ")), "HTTPS");
    }

    #[test]
    fn test_only_first_line_is_read() {
        let mut map = HeaderMap::new();
        map.append("x-forwarded-for", HeaderValue::from_static("1.1.1.1"));
        map.append("x-forwarded-for", HeaderValue::from_static("2.2.2.2"));
        assert_eq!(Legacy.for_(&map), "1.1.1.1");
    }

    #[test]
    fn test_ignores_forwarded_header() {
        let map = with("forwarded", "for=192.0.2.43");
        assert_eq!(Legacy.for_(&map), "");
    }
}
