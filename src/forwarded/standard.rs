//! Tolerant parser for the `Forwarded` header (RFC 7239).
//!
//! # Responsibilities
//! - Split the header into `key=value` segments
//! - Collect `for`/`by` chains in order, keep the last `host`/`proto`
//! - Drop anything it does not understand
//!
//! # Design Decisions
//! - `;` and `,` are treated the same: hops are not told apart from the
//!   attributes of a single hop
//! - Keys are case-insensitive; by default values are lower-cased too
//! - A segment with zero or several `=` is dropped, never reported
//! - More lenient than the RFC 7239 grammar: whitespace around segments,
//!   keys and values is trimmed, and one pair of surrounding double quotes
//!   is stripped from a value without further unescaping

use axum::http::HeaderMap;
use serde::Serialize;

use super::{header_str, Extractor, Field};

const FORWARDED: &str = "forwarded";

/// Contents of a `Forwarded` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedForwarded {
    /// Every `for` value, in header order.
    pub fors: Vec<String>,
    /// Every `by` value, in header order.
    pub bys: Vec<String>,
    /// Last `host` value.
    pub host: String,
    /// Last `proto` value.
    pub proto: String,
}

impl ParsedForwarded {
    /// Parse the first `Forwarded` line of `headers`.
    pub fn from_headers(headers: &HeaderMap, preserve_case: bool) -> Self {
        match header_str(headers, FORWARDED) {
            Some(value) => Self::parse(value, preserve_case),
            None => Self::default(),
        }
    }

    /// Parse a raw header value. Never fails; unusable input yields an
    /// empty result.
    pub fn parse(value: &str, preserve_case: bool) -> Self {
        let mut parsed = Self::default();
        if value.is_empty() {
            return parsed;
        }

        let value = if preserve_case {
            value.to_string()
        } else {
            value.to_lowercase()
        };

        for segment in value.split([';', ',']) {
            let mut parts = segment.trim().split('=');
            let (Some(key), Some(val), None) = (parts.next(), parts.next(), parts.next()) else {
                continue;
            };
            let val = unquote(val.trim()).to_string();

            match key.trim().to_ascii_lowercase().as_str() {
                "for" => parsed.fors.push(val),
                "by" => parsed.bys.push(val),
                "host" => parsed.host = val,
                "proto" => parsed.proto = val,
                _ => {}
            }
        }

        parsed
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::By => self.bys.first().map(String::as_str).unwrap_or_default(),
            Field::For => self.fors.first().map(String::as_str).unwrap_or_default(),
            Field::Host => &self.host,
            Field::Proto => &self.proto,
        }
    }
}

/// Strips one pair of surrounding double quotes (`quoted-string` form).
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Reads the `Forwarded` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Standard {
    preserve_case: bool,
}

impl Standard {
    /// Lower-cases the whole header before parsing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches keys case-insensitively but returns values as sent.
    pub fn preserving_case() -> Self {
        Self {
            preserve_case: true,
        }
    }

    pub fn parse(&self, headers: &HeaderMap) -> ParsedForwarded {
        ParsedForwarded::from_headers(headers, self.preserve_case)
    }
}

impl Extractor for Standard {
    fn get(&self, field: Field, headers: &HeaderMap) -> String {
        self.parse(headers).get(field).to_string()
    }
}
