//! # Switchyard Test
//!
//! Test utilities for Switchyard: drive a [`Dispatcher`](switchyard::Dispatcher)
//! in-process and assert on the outcome, with no transport involved.
//!
//! - **Request Builder**: fluent headers, query, raw and JSON bodies
//! - **Full Dispatch**: requests go through tiered lookup and every phase
//! - **Pool Hygiene**: containers are returned through `Dispatcher::finish`
//!
//! ## Example
//!
//! ```
//! use http::StatusCode;
//! use serde_json::json;
//! use switchyard::{Body, Dispatcher, Handler};
//! use switchyard_test::TestClient;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut dispatcher = Dispatcher::new();
//! dispatcher
//!     .get("/users/:id")
//!     .handler(Handler::sync(|req, _res| {
//!         Ok(Body::from(json!({ "id": req.param("id") })))
//!     }))
//!     .unwrap();
//!
//! let client = TestClient::new(dispatcher);
//! client
//!     .get("/users/123")
//!     .send()
//!     .await
//!     .assert_status(StatusCode::OK)
//!     .assert_json_field("/id", &json!("123"));
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
