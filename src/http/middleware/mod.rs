//! Request middleware.

pub mod remote_addr;

pub use remote_addr::remote_addr_middleware;
