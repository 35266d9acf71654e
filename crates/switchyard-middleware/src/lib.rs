//! # Switchyard Middleware
//!
//! The phase engine of the Switchyard dispatch core.
//!
//! Every route runs a subsequence of eight fixed phases before its handler:
//!
//! ```text
//! before -> rate_limit -> auth -> validation -> transform -> cache -> after -> legacy -> handler
//! ```
//!
//! - [`Middleware`] + [`Next`] - custom hooks and their continuation token
//! - [`PhaseKind`], [`Phase`], [`ExecutionPlan`] - the fixed order, computed once per route
//! - [`Policy`], [`PolicySet`] - the contract for rate limit, auth, validation and cache collaborators
//! - [`PhaseExecutor`] - runs a plan and the handler, containing failures

#![doc(html_root_url = "https://docs.rs/switchyard-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod executor;
mod middleware;
mod phase;
pub mod policy;

pub use executor::{ExecutionOutcome, PhaseExecutor};
pub use middleware::{from_fn, BoxFuture, BoxedMiddleware, FnMiddleware, Middleware, Next};
pub use phase::{ExecutionPlan, Phase, PhaseKind, RouteFeatures};
pub use policy::{FnPolicy, Policy, PolicyOutcome, PolicySet};
