//! HTTP client and status classification. Every request is attempted once.

mod client;
mod status;

pub use client::HttpClient;
pub use status::{HttpStatusError, check_status};
