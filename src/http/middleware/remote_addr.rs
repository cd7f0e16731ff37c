//! Remote Address Middleware.
//! Records the forwarded client address on the request.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::forwarded::{Extractor, DEFAULT};
use crate::observability::metrics;

/// Address of the client, as far as this server can tell.
///
/// Starts as the connection's peer address and is replaced by the forwarded
/// `for` value when the configured extractor finds one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

/// State required for remote address rewriting.
#[derive(Clone, Debug)]
pub struct RemoteAddrState {
    pub extractor: Arc<dyn Extractor>,
    /// Replace the address with `""` when no `for` value is found.
    pub overwrite_empty: bool,
}

impl RemoteAddrState {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self {
            extractor,
            overwrite_empty: false,
        }
    }

    pub fn overwrite_empty(mut self, overwrite: bool) -> Self {
        self.overwrite_empty = overwrite;
        self
    }
}

impl Default for RemoteAddrState {
    fn default() -> Self {
        Self::new(Arc::new(&*DEFAULT))
    }
}

pub async fn remote_addr_middleware(
    State(state): State<RemoteAddrState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    apply(&state, &mut req);
    next.run(req).await
}

fn apply<B>(state: &RemoteAddrState, req: &mut Request<B>) {
    if req.extensions().get::<RemoteAddr>().is_none() {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(peer)| peer.to_string());
        if let Some(peer) = peer {
            req.extensions_mut().insert(RemoteAddr(peer));
        }
    }

    let forwarded_for = state.extractor.for_(req.headers());
    if !forwarded_for.is_empty() {
        tracing::trace!(remote_addr = %forwarded_for, "Using forwarded client address");
        metrics::record_remote_addr("overwritten");
        req.extensions_mut().insert(RemoteAddr(forwarded_for));
    } else if state.overwrite_empty {
        tracing::trace!("No forwarded client address, clearing remote address");
        metrics::record_remote_addr("cleared");
        req.extensions_mut().insert(RemoteAddr(String::new()));
    } else {
        tracing::trace!("No forwarded client address, keeping peer address");
        metrics::record_remote_addr("skipped");
    }
}
