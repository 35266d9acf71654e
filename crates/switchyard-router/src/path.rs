//! Route pattern compilation.
//!
//! A route pattern is compiled once, at registration, into a [`CompiledPath`].
//! Patterns without parameter markers are kept as a normalized literal so the
//! route table can find them with a single hash lookup. Patterns with markers
//! become a segment matcher that captures one value per marker, in order.
//!
//! Both marker styles are accepted:
//!
//! - `:name` (e.g. `/users/:id`)
//! - `{name}` (e.g. `/users/{id}`)
//!
//! # Example
//!
//! ```rust
//! use switchyard_router::CompiledPath;
//!
//! let path = CompiledPath::compile("/users/:id/posts/{postId}").unwrap();
//! assert!(!path.is_static());
//! assert_eq!(path.segment_count(), 4);
//! assert_eq!(path.param_names(), ["id", "postId"]);
//!
//! let params = path.match_path("/users/42/posts/7").unwrap();
//! assert_eq!(params.get("id").map(String::as_str), Some("42"));
//! assert_eq!(params.get("postId").map(String::as_str), Some("7"));
//! ```

use std::borrow::Cow;

use smallvec::SmallVec;
use thiserror::Error;

use crate::params::ParamMap;

/// Values captured from a request path, in declared parameter order.
///
/// Borrowed from the request path; four captures stay inline.
pub type Captures<'p> = SmallVec<[&'p str; 4]>;

/// Errors raised while compiling a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern does not start with `/`.
    #[error("route pattern must start with '/': {pattern:?}")]
    MissingLeadingSlash {
        /// The offending pattern.
        pattern: String,
    },

    /// A parameter marker has no name (`/users/:` or `/users/{}`).
    #[error("route pattern {pattern:?} contains an unnamed parameter")]
    EmptyParamName {
        /// The offending pattern.
        pattern: String,
    },

    /// The same parameter name appears twice.
    #[error("route pattern {pattern:?} declares parameter {name:?} more than once")]
    DuplicateParam {
        /// The offending pattern.
        pattern: String,
        /// The repeated parameter name.
        name: String,
    },
}

/// One `/`-delimited component of a dynamic pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// Captures the request segment.
    Param,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Matcher {
    /// Normalized literal path, compared by string equality.
    Static(String),
    /// Per-segment matcher.
    Segments(Vec<Segment>),
}

/// A route pattern compiled into its matchable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    /// The pattern as declared.
    pattern: String,
    matcher: Matcher,
    /// Parameter names in declaration order.
    param_names: Vec<String>,
    /// Number of non-empty segments.
    segment_count: usize,
}

impl CompiledPath {
    /// Compiles a route pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the pattern does not start with `/`, or a
    /// parameter marker is unnamed or repeated.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash {
                pattern: pattern.to_string(),
            });
        }

        let mut segments = Vec::new();
        let mut param_names: Vec<String> = Vec::new();

        for part in pattern.split('/').filter(|s| !s.is_empty()) {
            match param_name(part) {
                Some("") => {
                    return Err(PatternError::EmptyParamName {
                        pattern: pattern.to_string(),
                    });
                }
                Some(name) => {
                    if param_names.iter().any(|n| n == name) {
                        return Err(PatternError::DuplicateParam {
                            pattern: pattern.to_string(),
                            name: name.to_string(),
                        });
                    }
                    param_names.push(name.to_string());
                    segments.push(Segment::Param);
                }
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }

        let segment_count = segments.len();
        let matcher = if param_names.is_empty() {
            Matcher::Static(normalize(pattern).into_owned())
        } else {
            Matcher::Segments(segments)
        };

        Ok(Self {
            pattern: pattern.to_string(),
            matcher,
            param_names,
            segment_count,
        })
    }

    /// Returns the pattern as it was declared.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the pattern has no parameter markers.
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self.matcher, Matcher::Static(_))
    }

    /// Returns the normalized literal of a static pattern.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        match &self.matcher {
            Matcher::Static(literal) => Some(literal),
            Matcher::Segments(_) => None,
        }
    }

    /// Returns the parameter names in declaration order.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns the number of non-empty segments in the pattern.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Matches a request path and returns the captured values in order.
    ///
    /// Static patterns compare against the normalized request path and
    /// capture nothing.
    #[must_use]
    pub fn captures<'p>(&self, path: &'p str) -> Option<Captures<'p>> {
        match &self.matcher {
            Matcher::Static(literal) => (*literal == normalize(path)).then(Captures::new),
            Matcher::Segments(segments) => capture_segments(segments, path),
        }
    }

    /// Returns true if the request path matches this pattern.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }

    /// Matches a request path and returns the named parameters.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<ParamMap> {
        let captures = self.captures(path)?;
        Some(
            self.param_names
                .iter()
                .zip(captures)
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect(),
        )
    }

    /// Returns true if both patterns match exactly the same request paths.
    ///
    /// Parameter names and marker style are ignored: `/users/:id` and
    /// `/users/{userId}` have the same shape.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.matcher == other.matcher
    }
}

/// Compiles a route pattern. Shorthand for [`CompiledPath::compile`].
///
/// # Errors
///
/// See [`CompiledPath::compile`].
pub fn compile(pattern: &str) -> Result<CompiledPath, PatternError> {
    CompiledPath::compile(pattern)
}

/// Counts the non-empty `/`-delimited segments of a path.
///
/// ```rust
/// use switchyard_router::count_segments;
///
/// assert_eq!(count_segments("/"), 0);
/// assert_eq!(count_segments("/users/42/"), 2);
/// assert_eq!(count_segments("//a///b"), 2);
/// ```
#[must_use]
pub fn count_segments(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty()).count()
}

/// Normalizes a request path for literal comparison.
///
/// Ensures a leading `/`, collapses repeated slashes and drops a trailing
/// slash (except for the root). Borrows when the path is already normal.
#[must_use]
pub fn normalize(path: &str) -> Cow<'_, str> {
    if is_normalized(path) {
        return Cow::Borrowed(path);
    }

    let mut out = String::with_capacity(path.len() + 1);
    for part in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(part);
    }
    if out.is_empty() {
        out.push('/');
    }
    Cow::Owned(out)
}

/// Returns true if [`normalize`] would return the path unchanged.
#[must_use]
pub fn is_normalized(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    path.starts_with('/') && !path.ends_with('/') && !path.contains("//")
}

/// Extracts the parameter name from a `:name` or `{name}` segment.
fn param_name(segment: &str) -> Option<&str> {
    if let Some(name) = segment.strip_prefix(':') {
        return Some(name);
    }
    segment.strip_prefix('{').and_then(|s| s.strip_suffix('}'))
}

fn capture_segments<'p>(segments: &[Segment], path: &'p str) -> Option<Captures<'p>> {
    let mut captures = Captures::new();
    let mut parts = path.split('/').filter(|s| !s.is_empty());

    for segment in segments {
        let part = parts.next()?;
        match segment {
            Segment::Literal(expected) => {
                if expected != part {
                    return None;
                }
            }
            Segment::Param => captures.push(part),
        }
    }

    // The request path has more segments than the pattern
    if parts.next().is_some() {
        return None;
    }

    Some(captures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compile_static() {
        let path = CompiledPath::compile("/health").unwrap();
        assert!(path.is_static());
        assert_eq!(path.literal(), Some("/health"));
        assert_eq!(path.segment_count(), 1);
        assert!(path.param_names().is_empty());
    }

    #[test]
    fn test_compile_static_normalizes_literal() {
        let path = CompiledPath::compile("/users/").unwrap();
        assert_eq!(path.literal(), Some("/users"));
        assert_eq!(path.pattern(), "/users/");
    }

    #[test]
    fn test_same_shape_ignores_param_names() {
        let a = CompiledPath::compile("/users/:id").unwrap();
        let b = CompiledPath::compile("/users/{userId}").unwrap();
        let c = CompiledPath::compile("/users/:id/posts").unwrap();

        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
        assert!(CompiledPath::compile("/a/")
            .unwrap()
            .same_shape(&CompiledPath::compile("/a").unwrap()));
    }

    #[test]
    fn test_compile_root() {
        let path = CompiledPath::compile("/").unwrap();
        assert!(path.is_static());
        assert_eq!(path.literal(), Some("/"));
        assert_eq!(path.segment_count(), 0);
        assert!(path.is_match("/"));
    }

    #[test]
    fn test_compile_colon_params() {
        let path = CompiledPath::compile("/users/:id/posts/:postId").unwrap();
        assert!(!path.is_static());
        assert_eq!(path.literal(), None);
        assert_eq!(path.segment_count(), 4);
        assert_eq!(path.param_names(), ["id", "postId"]);
    }

    #[test]
    fn test_compile_brace_params() {
        let path = CompiledPath::compile("/orgs/{orgId}/users/{userId}").unwrap();
        assert_eq!(path.param_names(), ["orgId", "userId"]);
    }

    #[test]
    fn test_compile_rejects_relative_pattern() {
        let err = CompiledPath::compile("users/:id").unwrap_err();
        assert!(matches!(err, PatternError::MissingLeadingSlash { .. }));
    }

    #[test]
    fn test_compile_rejects_empty_param() {
        assert!(matches!(
            CompiledPath::compile("/users/:").unwrap_err(),
            PatternError::EmptyParamName { .. }
        ));
        assert!(matches!(
            CompiledPath::compile("/users/{}").unwrap_err(),
            PatternError::EmptyParamName { .. }
        ));
    }

    #[test]
    fn test_compile_rejects_duplicate_param() {
        let err = CompiledPath::compile("/a/:id/b/:id").unwrap_err();
        assert_eq!(
            err,
            PatternError::DuplicateParam {
                pattern: "/a/:id/b/:id".to_string(),
                name: "id".to_string(),
            }
        );
    }

    #[test]
    fn test_match_params_in_order() {
        let path = CompiledPath::compile("/users/:id/posts/:postId").unwrap();
        let params = path.match_path("/users/42/posts/7").unwrap();

        let pairs: Vec<_> = params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("id", "42"), ("postId", "7")]);
    }

    #[test]
    fn test_match_literal_mismatch() {
        let path = CompiledPath::compile("/users/:id/posts").unwrap();
        assert!(path.match_path("/users/42/comments").is_none());
    }

    #[test]
    fn test_match_segment_count_mismatch() {
        let path = CompiledPath::compile("/users/:id").unwrap();
        assert!(path.captures("/users").is_none());
        assert!(path.captures("/users/1/extra").is_none());
    }

    #[test]
    fn test_match_trailing_slash() {
        let dynamic = CompiledPath::compile("/users/:id").unwrap();
        assert_eq!(dynamic.captures("/users/1/").unwrap().as_slice(), ["1"]);

        let fixed = CompiledPath::compile("/users").unwrap();
        assert!(fixed.is_match("/users/"));
    }

    #[test]
    fn test_count_segments() {
        assert_eq!(count_segments(""), 0);
        assert_eq!(count_segments("/"), 0);
        assert_eq!(count_segments("/a"), 1);
        assert_eq!(count_segments("/a/b/"), 2);
        assert_eq!(count_segments("a/b/c"), 3);
    }

    #[test]
    fn test_normalize() {
        assert!(matches!(normalize("/users"), Cow::Borrowed("/users")));
        assert_eq!(normalize("/users/"), "/users");
        assert_eq!(normalize("//users///42"), "/users/42");
        assert_eq!(normalize("users"), "/users");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("///"), "/");
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-z0-9]{1,8}"
    }

    proptest! {
        #[test]
        fn prop_segment_count_matches_pattern(parts in prop::collection::vec(segment(), 0..8)) {
            let pattern = format!("/{}", parts.join("/"));
            let path = CompiledPath::compile(&pattern).unwrap();
            prop_assert_eq!(path.segment_count(), parts.len());
            prop_assert_eq!(count_segments(&pattern), parts.len());
        }

        #[test]
        fn prop_every_param_captures_its_segment(values in prop::collection::vec(segment(), 1..6)) {
            let pattern: String = (0..values.len()).map(|i| format!("/p{i}/:v{i}")).collect();
            let request: String = values.iter().enumerate().map(|(i, v)| format!("/p{i}/{v}")).collect();

            let path = CompiledPath::compile(&pattern).unwrap();
            let params = path.match_path(&request).unwrap();

            prop_assert_eq!(params.len(), values.len());
            for (i, value) in values.iter().enumerate() {
                prop_assert_eq!(params.get(&format!("v{i}")), Some(value));
            }
        }

        #[test]
        fn prop_normalize_is_idempotent(raw in "[a-z/]{0,24}") {
            let once = normalize(&raw).into_owned();
            prop_assert!(is_normalized(&once));
            prop_assert_eq!(normalize(&once).into_owned(), once);
        }
    }
}
