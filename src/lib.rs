//! `ghapi-http` is an async, retrying HTTP caller for the GitHub REST API.
//!
//! A call makes one logical request and resolves to either an
//! [`ApiResponse`] or a structured [`ApiError`]:
//! - 2xx returns immediately
//! - 401/403 and other 4xx fail immediately, never retried
//! - 5xx and network failures are retried with exponential backoff
//!   ([`RetryPolicy`]) until [`ApiError::RetryExhausted`]
//!
//! Entry points:
//! - [`ApiCaller::call`] / [`ApiCaller::send`]
//! - [`call`] for one-off requests against `https://api.github.com`
//! - [`endpoints`] for request builders of common GitHub endpoints

mod caller;
pub mod endpoints;
mod error;
mod options;
mod request;
mod response;

pub use caller::{call, ApiCaller};
pub use error::{ApiError, RETRY_EXHAUSTED_MESSAGE};
pub use options::{ClientOptions, RetryPolicy, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
pub use request::{QueryValue, Request, RequestBuilder};
pub use response::ApiResponse;

pub type Result<T> = std::result::Result<T, ApiError>;
