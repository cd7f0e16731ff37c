//! Client-origin metadata from `Forwarded` and `X-Forwarded-*` headers.
//!
//! The [`forwarded`] module holds the extraction engine; [`http`] mounts it
//! as axum middleware in a small echo server.

pub mod config;
pub mod forwarded;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::EchoConfig;
pub use forwarded::{Extractor, Field, Legacy, Ordered, Standard};
pub use http::EchoServer;
pub use lifecycle::Shutdown;
