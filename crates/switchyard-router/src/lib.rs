//! Route pattern compilation and request-scoped pools for Switchyard.
//!
//! This crate holds the leaf pieces of the dispatch core:
//!
//! - **Path compilation**: turn `/users/:id` into a [`CompiledPath`] that is
//!   either a static literal (hash-table lookup) or a segment matcher
//! - **Segment counting**: [`count_segments`] buckets dynamic routes and
//!   incoming paths by their number of non-empty segments
//! - **Parameter extraction**: [`ParamExtractor`] specializes extraction for
//!   zero to three parameters
//! - **Pools**: [`ResourcePool`] recycles [`ParamMap`] containers and
//!   [`BoundedCache`] memoizes lookups without unbounded growth
//!
//! # Example
//!
//! ```rust
//! use switchyard_router::{count_segments, CompiledPath, ParamExtractor};
//!
//! let path = CompiledPath::compile("/users/:id/posts/:postId").unwrap();
//! assert_eq!(count_segments("/users/42/posts/7"), path.segment_count());
//!
//! let captures = path.captures("/users/42/posts/7").unwrap();
//! let params = ParamExtractor::for_names(path.param_names()).extract(&captures);
//! assert_eq!(params.get("postId").map(String::as_str), Some("7"));
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod params;
mod path;
mod pool;

pub use params::{ParamExtractor, ParamMap};
pub use path::{
    compile, count_segments, is_normalized, normalize, Captures, CompiledPath, PatternError,
};
pub use pool::{
    BoundedCache, CacheStats, ContainerPool, PoolStats, ResourcePool, ResourcePoolStats,
    DEFAULT_MATCH_CACHE_CAPACITY, DEFAULT_NORMALIZE_CACHE_CAPACITY, DEFAULT_POOL_CAPACITY,
};
