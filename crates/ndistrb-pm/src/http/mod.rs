//! HTTP transport used to fetch archives, listings and updates.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpError};
