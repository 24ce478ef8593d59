//! Search dispatch: local filtering and remote queries.
//!
//! A search term is resolved against one of two sources:
//!
//! - **Local**: the configured item set is filtered with the matcher. The term
//!   is first normalized by the text transform (lower-casing by default).
//! - **Remote**: the configured query function receives the *raw* term and
//!   answers later through a [`QueryCallback`].
//!
//! With neither source configured a search does nothing at all, which is what
//! free-text inputs that never search want.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::item::{Item, normalize};

/// Decides whether an item label matches a (transformed) search term.
pub type Matcher = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Normalizes text before matching.
pub type TextTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Remote search strategy.
pub type QueryFn = Arc<dyn Fn(QueryRequest) + Send + Sync>;

/// The default text transform: lower-casing.
pub fn default_transform(text: &str) -> String {
    text.to_lowercase()
}

/// The default matcher: the transformed label contains the term.
pub fn default_matcher(term: &str, text: &str) -> bool {
    default_transform(text).contains(term)
}

/// Filter a local item set.
pub fn filter_local(
    items: &[Item],
    term: &str,
    transform: &TextTransform,
    matcher: &Matcher,
) -> Vec<Item> {
    let term = transform(term);
    items
        .iter()
        .filter(|item| matcher(&term, &item.text))
        .cloned()
        .collect()
}

// ============================================================================
// Result Set
// ============================================================================

/// The most recent results of a search.
///
/// Replaced wholesale by every search; never merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// The term that produced these results.
    pub term: String,
    /// The matching items, unfiltered by selection.
    pub items: Vec<Item>,
    /// Whether the source has more results past these.
    pub has_more: bool,
}

// ============================================================================
// Remote Queries
// ============================================================================

/// An answer from a remote query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResponse {
    /// The matching items.
    pub results: Vec<Item>,
    /// Whether more results can be fetched.
    pub more: bool,
}

impl QueryResponse {
    /// Create a response with the given results and no continuation.
    pub fn new(results: Vec<Item>) -> Self {
        Self {
            results,
            more: false,
        }
    }

    /// Set the continuation flag using builder pattern.
    pub fn with_more(mut self, more: bool) -> Self {
        self.more = more;
        self
    }

    /// Parse a raw `{results, more}` response.
    ///
    /// `results` must be an array; each entry is normalized, so bare ids are
    /// accepted. `more` is read by truthiness: `null`, `false`, zero and the
    /// empty string mean no more results, anything else means more.
    pub fn from_json(raw: &JsonValue) -> Result<Self> {
        let results = match raw.get("results") {
            Some(JsonValue::Array(entries)) => entries
                .iter()
                .map(normalize)
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(Error::MalformedResponse(format!(
                    "results must be an array, got {other}"
                )));
            }
            None => {
                return Err(Error::MalformedResponse(format!(
                    "response has no results: {raw}"
                )));
            }
        };

        let more = raw.get("more").is_some_and(is_truthy);
        Ok(Self { results, more })
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(flag) => *flag,
        JsonValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(text) => !text.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Fire-once continuation handed to a query function.
pub struct QueryCallback {
    sink: Box<dyn FnOnce(QueryResponse) + Send>,
}

impl QueryCallback {
    pub(crate) fn new<F>(sink: F) -> Self
    where
        F: FnOnce(QueryResponse) + Send + 'static,
    {
        Self {
            sink: Box::new(sink),
        }
    }

    /// Deliver the query answer.
    pub fn respond(self, response: QueryResponse) {
        (self.sink)(response);
    }

    /// Deliver a raw query answer.
    ///
    /// Fails with [`Error::MalformedResponse`] when `results` is missing or not
    /// an array; nothing is delivered in that case.
    pub fn respond_json(self, raw: &JsonValue) -> Result<()> {
        let response = QueryResponse::from_json(raw)?;
        self.respond(response);
        Ok(())
    }
}

impl fmt::Debug for QueryCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCallback").finish_non_exhaustive()
    }
}

/// A request passed to the query function.
#[derive(Debug)]
pub struct QueryRequest {
    /// The raw search term, exactly as typed.
    pub term: String,
    /// Offset of the first requested result.
    pub offset: usize,
    /// Where to send the answer.
    pub callback: QueryCallback,
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    fn defaults() -> (TextTransform, Matcher) {
        let transform: TextTransform = Arc::new(default_transform);
        let matcher: Matcher = Arc::new(default_matcher);
        (transform, matcher)
    }

    #[test]
    fn test_filter_local_case_insensitive() {
        let items = vec![Item::new(1, "Foo"), Item::new(2, "Bar")];
        let (transform, matcher) = defaults();

        assert_eq!(
            filter_local(&items, "fo", &transform, &matcher),
            vec![Item::new(1, "Foo")]
        );
        assert_eq!(
            filter_local(&items, "BA", &transform, &matcher),
            vec![Item::new(2, "Bar")]
        );
        assert_eq!(filter_local(&items, "", &transform, &matcher).len(), 2);
    }

    #[test]
    fn test_filter_local_custom_matcher() {
        let items = vec![Item::new(1, "Foo"), Item::new(2, "Food")];
        let (transform, _) = defaults();
        let exact: Matcher = Arc::new(|term: &str, text: &str| term == text.to_lowercase());

        assert_eq!(
            filter_local(&items, "FOO", &transform, &exact),
            vec![Item::new(1, "Foo")]
        );
    }

    #[test]
    fn test_response_from_json() {
        let response =
            QueryResponse::from_json(&json!({"results": [{"id": 3, "text": "Baz"}, 4], "more": true}))
                .unwrap();
        assert_eq!(response.results, vec![Item::new(3, "Baz"), Item::new(4, "4")]);
        assert!(response.more);

        let response = QueryResponse::from_json(&json!({"results": []})).unwrap();
        assert!(!response.more);
    }

    #[test]
    fn test_more_reads_truthiness() {
        let more = |flag: JsonValue| {
            QueryResponse::from_json(&json!({"results": [], "more": flag}))
                .unwrap()
                .more
        };

        assert!(more(json!(true)));
        assert!(more(json!(1)));
        assert!(more(json!("yes")));
        assert!(more(json!({})));
        assert!(!more(json!(false)));
        assert!(!more(json!(0)));
        assert!(!more(json!("")));
        assert!(!more(json!(null)));
    }

    #[test]
    fn test_malformed_responses() {
        assert!(matches!(
            QueryResponse::from_json(&json!({"results": "nope"})),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            QueryResponse::from_json(&json!({})),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            QueryResponse::from_json(&json!(null)),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_callback_not_invoked_on_malformed() {
        let delivered = Arc::new(Mutex::new(false));
        let delivered_clone = delivered.clone();
        let callback = QueryCallback::new(move |_| *delivered_clone.lock() = true);

        assert!(callback.respond_json(&json!({"results": 1})).is_err());
        assert!(!*delivered.lock());
    }
}
