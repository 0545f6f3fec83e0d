//! memofetch - a time-bounded response cache layered over an HTTP client
//!
//! Memoizes the outcome of GET/POST calls keyed by URL (and, for POST, by URL
//! plus serialized request body), serving cached responses while fresh and
//! re-issuing the network call once an entry expires.

pub mod cache;
pub mod client;
pub mod transport;

pub use client::{CachedClient, ClientConfig, RequestError};
pub use transport::{AuthCredentials, HttpCaller, Method, NetworkCaller, TransportError};
