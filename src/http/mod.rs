//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (peer address via ConnectInfo)
//!     → server.rs (Axum setup, tracing, timeout)
//!     → middleware/remote_addr.rs (record forwarded client address)
//!     → server.rs echo handler (resolve and report metadata)
//!     → JSON response
//! ```

pub mod middleware;
pub mod server;

pub use middleware::remote_addr::{RemoteAddr, RemoteAddrState};
pub use server::{EchoResponse, EchoServer};
