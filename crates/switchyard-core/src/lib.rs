//! # Switchyard Core
//!
//! Core types shared by the Switchyard dispatch crates:
//!
//! - [`Request`] / [`Response`] - the request and response the dispatcher works on
//! - [`Handler`] - route endpoint contract with [`Completion`] results
//! - [`RateLimitConfig`], [`AuthConfig`], [`ValidationConfig`], [`CacheConfig`] - per-route features
//! - [`RegistrationError`], [`ResponseError`], [`ErrorCategory`] - error taxonomy

#![doc(html_root_url = "https://docs.rs/switchyard-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod features;
mod handler;
mod request;
mod response;

pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, RegistrationError, ResponseError};
pub use features::{AuthConfig, CacheConfig, RateLimitConfig, ValidationConfig};
pub use handler::{AsyncHandler, BoxFuture, Completion, Handler, HandlerResult, SyncHandler};
pub use request::Request;
pub use response::{Body, Response};
pub use switchyard_router::ParamMap;
