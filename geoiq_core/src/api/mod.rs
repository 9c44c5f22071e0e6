//! HTTP access producing uniform service results

pub mod client;
pub mod request;

pub use client::ApiClient;
pub use request::{RequestConfig, ResponseBody};
