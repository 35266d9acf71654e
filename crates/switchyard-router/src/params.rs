//! Parameter containers and arity-specialized extraction.
//!
//! Path parameters and query values live in a [`ParamMap`], an insertion
//! ordered map so parameters come back in declaration order. Routes
//! precompute a [`ParamExtractor`] for their parameter count; the common
//! zero to three parameter cases write straight into the map without the
//! generic zip loop.

use indexmap::IndexMap;

/// Key-value container for path parameters and query values.
///
/// Iteration follows insertion order.
pub type ParamMap = IndexMap<String, String>;

/// Writes captured values into a [`ParamMap`] under the route's parameter names.
///
/// # Example
///
/// ```rust
/// use switchyard_router::{ParamExtractor, ParamMap};
///
/// let names = vec!["id".to_string(), "postId".to_string()];
/// let extractor = ParamExtractor::for_names(&names);
/// assert_eq!(extractor.arity(), 2);
///
/// let mut params = ParamMap::new();
/// extractor.extract_into(&["42", "7"], &mut params);
/// assert_eq!(params.get("id").map(String::as_str), Some("42"));
/// assert_eq!(params.get("postId").map(String::as_str), Some("7"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamExtractor {
    /// Static route or a pattern without parameters.
    Zero,
    /// One parameter.
    One(String),
    /// Two parameters.
    Two(String, String),
    /// Three parameters.
    Three(String, String, String),
    /// Four or more parameters.
    Many(Vec<String>),
}

impl ParamExtractor {
    /// Selects the extractor for a list of parameter names.
    #[must_use]
    pub fn for_names(names: &[String]) -> Self {
        match names {
            [] => Self::Zero,
            [a] => Self::One(a.clone()),
            [a, b] => Self::Two(a.clone(), b.clone()),
            [a, b, c] => Self::Three(a.clone(), b.clone(), c.clone()),
            _ => Self::Many(names.to_vec()),
        }
    }

    /// Returns the number of parameters this extractor writes.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One(_) => 1,
            Self::Two(..) => 2,
            Self::Three(..) => 3,
            Self::Many(names) => names.len(),
        }
    }

    /// Inserts the captured values into `params`.
    ///
    /// `values` must be in declaration order. A length mismatch falls back to
    /// pairing names and values until either side runs out.
    pub fn extract_into(&self, values: &[&str], params: &mut ParamMap) {
        match (self, values) {
            (Self::Zero, _) => {}
            (Self::One(a), [va]) => {
                params.insert(a.clone(), (*va).to_string());
            }
            (Self::Two(a, b), [va, vb]) => {
                params.insert(a.clone(), (*va).to_string());
                params.insert(b.clone(), (*vb).to_string());
            }
            (Self::Three(a, b, c), [va, vb, vc]) => {
                params.insert(a.clone(), (*va).to_string());
                params.insert(b.clone(), (*vb).to_string());
                params.insert(c.clone(), (*vc).to_string());
            }
            (Self::Many(names), _) => extract_zipped(names, values, params),
            (Self::One(a), _) => extract_zipped(std::slice::from_ref(a), values, params),
            (Self::Two(a, b), _) => extract_zipped(&[a.clone(), b.clone()], values, params),
            (Self::Three(a, b, c), _) => {
                extract_zipped(&[a.clone(), b.clone(), c.clone()], values, params);
            }
        }
    }

    /// Extracts into a freshly allocated map.
    #[must_use]
    pub fn extract(&self, values: &[&str]) -> ParamMap {
        let mut params = ParamMap::with_capacity(self.arity());
        self.extract_into(values, &mut params);
        params
    }
}

fn extract_zipped(names: &[String], values: &[&str], params: &mut ParamMap) {
    for (name, value) in names.iter().zip(values) {
        params.insert(name.clone(), (*value).to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_for_names_selects_arity() {
        assert_eq!(ParamExtractor::for_names(&[]), ParamExtractor::Zero);
        assert!(matches!(ParamExtractor::for_names(&names(&["a"])), ParamExtractor::One(_)));
        assert!(matches!(ParamExtractor::for_names(&names(&["a", "b"])), ParamExtractor::Two(..)));
        assert!(matches!(
            ParamExtractor::for_names(&names(&["a", "b", "c"])),
            ParamExtractor::Three(..)
        ));
        assert!(matches!(
            ParamExtractor::for_names(&names(&["a", "b", "c", "d"])),
            ParamExtractor::Many(_)
        ));
    }

    #[test]
    fn test_extract_zero() {
        let params = ParamExtractor::Zero.extract(&[]);
        assert!(params.is_empty());
    }

    #[test]
    fn test_extract_three_in_order() {
        let extractor = ParamExtractor::for_names(&names(&["org", "team", "user"]));
        let params = extractor.extract(&["acme", "core", "alice"]);

        let keys: Vec<_> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["org", "team", "user"]);
        assert_eq!(params.get("user").map(String::as_str), Some("alice"));
    }

    #[test]
    fn test_extract_many() {
        let extractor = ParamExtractor::for_names(&names(&["a", "b", "c", "d", "e"]));
        assert_eq!(extractor.arity(), 5);

        let params = extractor.extract(&["1", "2", "3", "4", "5"]);
        assert_eq!(params.len(), 5);
        assert_eq!(params.get("e").map(String::as_str), Some("5"));
    }

    #[test]
    fn test_extract_length_mismatch_pairs_what_it_can() {
        let extractor = ParamExtractor::for_names(&names(&["a", "b"]));
        let params = extractor.extract(&["1"]);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_extract_into_existing_map() {
        let mut params = ParamMap::new();
        params.insert("tenant".to_string(), "t1".to_string());

        ParamExtractor::for_names(&names(&["id"])).extract_into(&["9"], &mut params);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id").map(String::as_str), Some("9"));
    }
}
