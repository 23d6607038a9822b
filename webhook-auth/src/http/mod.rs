//! HTTP client used to fetch published verification keys.

mod client;
mod retry;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use retry::BackoffPolicy;
