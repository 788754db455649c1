//! ESPN site API client, payload models, and record extraction.

pub mod extract;
pub mod http;
pub mod types;

pub use http::{EspnClient, ESPN_BASE_URL};
