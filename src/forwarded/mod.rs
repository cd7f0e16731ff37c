//! Client-origin metadata extraction.
//!
//! # Data Flow
//! ```text
//! HeaderMap (read-only)
//!     → standard.rs (Forwarded, RFC 7239)
//!     → legacy.rs   (X-Forwarded-By/For/Host/Proto)
//!     → ordered.rs  (first non-empty value, per field)
//!     → String      ("" when nothing could be determined)
//! ```
//!
//! # Design Decisions
//! - Extraction never fails: absent, malformed and unsupported input all
//!   collapse to the empty string
//! - Each field is resolved independently across extractors
//! - The default policy is built once and never mutated
//! - No trust decisions are made here; callers restrict which hops they accept

pub mod legacy;
pub mod ordered;
pub mod standard;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use legacy::Legacy;
pub use ordered::Ordered;
pub use standard::{ParsedForwarded, Standard};

/// A piece of forwarding information carried by proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// Interface of the proxy that received the request.
    By,
    /// Client that originated the request.
    For,
    /// Host header as received by the proxy.
    Host,
    /// Protocol used by the client to reach the proxy.
    Proto,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::By, Field::For, Field::Host, Field::Proto];

    /// Parameter name inside the `Forwarded` header.
    pub fn key(self) -> &'static str {
        match self {
            Field::By => "by",
            Field::For => "for",
            Field::Host => "host",
            Field::Proto => "proto",
        }
    }

    /// Name of the legacy `X-Forwarded-*` header carrying this field.
    pub fn legacy_header(self) -> &'static str {
        match self {
            Field::By => "x-forwarded-by",
            Field::For => "x-forwarded-for",
            Field::Host => "x-forwarded-host",
            Field::Proto => "x-forwarded-proto",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returned when a field or strategy name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} `{name}`")]
pub struct UnknownName {
    what: &'static str,
    name: String,
}

impl FromStr for Field {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownName {
                what: "field",
                name: s.to_string(),
            })
    }
}

/// Reads forwarding information from request headers.
///
/// Implementations are stateless: any two instances of the same extractor
/// return the same values for the same headers. An empty string means no
/// value could be determined.
pub trait Extractor: Send + Sync + fmt::Debug {
    /// Value of `field`, or `""`.
    fn get(&self, field: Field, headers: &HeaderMap) -> String;

    fn by(&self, headers: &HeaderMap) -> String {
        self.get(Field::By, headers)
    }

    fn for_(&self, headers: &HeaderMap) -> String {
        self.get(Field::For, headers)
    }

    fn host(&self, headers: &HeaderMap) -> String {
        self.get(Field::Host, headers)
    }

    fn proto(&self, headers: &HeaderMap) -> String {
        self.get(Field::Proto, headers)
    }
}

impl<E: Extractor + ?Sized> Extractor for &E {
    fn get(&self, field: Field, headers: &HeaderMap) -> String {
        (**self).get(field, headers)
    }
}

impl<E: Extractor + ?Sized> Extractor for Box<E> {
    fn get(&self, field: Field, headers: &HeaderMap) -> String {
        (**self).get(field, headers)
    }
}

impl<E: Extractor + ?Sized> Extractor for Arc<E> {
    fn get(&self, field: Field, headers: &HeaderMap) -> String {
        (**self).get(field, headers)
    }
}

/// Named extractors, so a composition can be described in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// The `Forwarded` header.
    #[serde(alias = "forwarded", alias = "rfc7239")]
    Standard,
    /// The `X-Forwarded-*` headers.
    #[serde(alias = "xff", alias = "x-forwarded")]
    Legacy,
}

impl StrategyKind {
    /// Build the extractor this kind names.
    pub fn build(self, preserve_case: bool) -> Box<dyn Extractor> {
        match self {
            StrategyKind::Standard if preserve_case => Box::new(Standard::preserving_case()),
            StrategyKind::Standard => Box::new(Standard::new()),
            StrategyKind::Legacy => Box::new(Legacy),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "forwarded" | "rfc7239" => Ok(StrategyKind::Standard),
            "legacy" | "xff" | "x-forwarded" => Ok(StrategyKind::Legacy),
            _ => Err(UnknownName {
                what: "strategy",
                name: s.to_string(),
            }),
        }
    }
}

/// All four fields resolved at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardedInfo {
    pub by: String,
    #[serde(rename = "for")]
    pub for_: String,
    pub host: String,
    pub proto: String,
}

/// Resolve every field of `headers` with `extractor`.
pub fn resolve<E: Extractor + ?Sized>(extractor: &E, headers: &HeaderMap) -> ForwardedInfo {
    ForwardedInfo {
        by: extractor.by(headers),
        for_: extractor.for_(headers),
        host: extractor.host(headers),
        proto: extractor.proto(headers),
    }
}

/// `Forwarded` first, then `X-Forwarded-*`, for every field.
pub static DEFAULT: LazyLock<Ordered> = LazyLock::new(Ordered::default_policy);

/// Value of `field` according to the default policy.
pub fn get(field: Field, headers: &HeaderMap) -> String {
    DEFAULT.get(field, headers)
}

pub fn by(headers: &HeaderMap) -> String {
    DEFAULT.by(headers)
}

pub fn for_(headers: &HeaderMap) -> String {
    DEFAULT.for_(headers)
}

pub fn host(headers: &HeaderMap) -> String {
    DEFAULT.host(headers)
}

pub fn proto(headers: &HeaderMap) -> String {
    DEFAULT.proto(headers)
}

/// First line of header `name` as text. Non-text values count as absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
