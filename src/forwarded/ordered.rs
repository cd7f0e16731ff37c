//! Fallback composition of extractors.

use axum::http::HeaderMap;

use super::{Extractor, Field, Legacy, Standard, StrategyKind};

/// Tries each extractor in order and keeps the first non-empty value.
///
/// Fields are resolved independently, so `for` may come from one extractor
/// and `host` from another. An `Ordered` is itself an [`Extractor`] and can
/// be nested inside another one.
#[derive(Debug, Default)]
pub struct Ordered {
    extractors: Vec<Box<dyn Extractor>>,
}

impl Ordered {
    pub fn new(extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self { extractors }
    }

    /// A composition that never yields a value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `Forwarded` first, then `X-Forwarded-*`.
    pub fn default_policy() -> Self {
        Self::empty().with(Standard::new()).with(Legacy)
    }

    /// Build a composition from named extractors, in the order given.
    pub fn from_kinds(kinds: &[StrategyKind], preserve_case: bool) -> Self {
        Self::new(kinds.iter().map(|kind| kind.build(preserve_case)).collect())
    }

    /// Append `extractor` with the lowest priority so far.
    pub fn with(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Extractor for Ordered {
    fn get(&self, field: Field, headers: &HeaderMap) -> String {
        self.extractors
            .iter()
            .map(|extractor| extractor.get(field, headers))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }
}
