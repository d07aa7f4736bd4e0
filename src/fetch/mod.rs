pub mod client;
pub mod error;

pub use client::{ApiClient, UserFetcher};
pub use error::FetchError;
