//! Option management.
//!
//! [`SelectOptions`] is a partial update: every key left unset keeps its
//! current value when the update is applied to the live [`Config`]. Top-level
//! keys are replaced outright; only `templates` is shallow-merged.
//!
//! Options can be built in code, where the type system already guarantees
//! each key's type, or parsed from a dynamic map with
//! [`SelectOptions::from_json`], which performs the type validation.
//!
//! | key | type | effect |
//! |---|---|---|
//! | `closeOnSelect` | boolean | close the session after a result is selected |
//! | `initSelection` | function | asynchronous value-to-data resolver |
//! | `items` | array or null | local item set (null selects remote mode) |
//! | `matcher` | function | local search matcher |
//! | `placeholder` | string | display hint |
//! | `query` | function | remote search strategy |
//! | `templates` | object | merged into the template map |
//!
//! Any other key is kept in [`Config::extra`] for collaborators.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};
use crate::item::{Item, normalize};
use crate::reconcile::SelectionCallback;
use crate::search::{Matcher, QueryFn, QueryRequest, default_matcher};
use crate::selection::Value;
use crate::template::{Template, Templates};

/// Asynchronous value-to-data resolver.
pub type InitSelectionFn = Arc<dyn Fn(Value, SelectionCallback) + Send + Sync>;

/// Option keys as they appear in dynamic option maps.
pub mod keys {
    pub const CLOSE_ON_SELECT: &str = "closeOnSelect";
    pub const INIT_SELECTION: &str = "initSelection";
    pub const ITEMS: &str = "items";
    pub const MATCHER: &str = "matcher";
    pub const PLACEHOLDER: &str = "placeholder";
    pub const QUERY: &str = "query";
    pub const TEMPLATES: &str = "templates";
}

// ============================================================================
// Options (partial update)
// ============================================================================

/// A partial configuration update.
#[derive(Clone, Default)]
pub struct SelectOptions {
    close_on_select: Option<bool>,
    init_selection: Option<InitSelectionFn>,
    items: Option<Option<Vec<Item>>>,
    matcher: Option<Matcher>,
    placeholder: Option<String>,
    query: Option<QueryFn>,
    templates: Option<Templates>,
    extra: Map<String, JsonValue>,
}

impl SelectOptions {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether to close the session once a result is selected.
    pub fn close_on_select(mut self, close: bool) -> Self {
        self.close_on_select = Some(close);
        self
    }

    /// Resolve values to data asynchronously.
    pub fn init_selection<F>(mut self, resolver: F) -> Self
    where
        F: Fn(Value, SelectionCallback) + Send + Sync + 'static,
    {
        self.init_selection = Some(Arc::new(resolver));
        self
    }

    /// Use a local item set (local mode).
    pub fn items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        self.items = Some(Some(items.into_iter().map(Into::into).collect()));
        self
    }

    /// Drop the local item set (remote mode).
    pub fn no_items(mut self) -> Self {
        self.items = Some(None);
        self
    }

    /// Replace the local search matcher.
    pub fn matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Set the placeholder text.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Use a remote search strategy.
    pub fn query<F>(mut self, query: F) -> Self
    where
        F: Fn(QueryRequest) + Send + Sync + 'static,
    {
        self.query = Some(Arc::new(query));
        self
    }

    /// Merge templates into the template map.
    pub fn templates(mut self, templates: Templates) -> Self {
        self.templates
            .get_or_insert_with(Templates::new)
            .merge(templates);
        self
    }

    /// Add a single template.
    pub fn template(mut self, name: impl Into<String>, template: impl Into<Template>) -> Self {
        self.templates
            .get_or_insert_with(Templates::new)
            .insert(name, template);
        self
    }

    /// Store a key the engine does not interpret.
    pub fn extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Parse and validate a dynamic option map.
    ///
    /// Fails with [`Error::OptionType`] on the first key whose value has the
    /// wrong type. Function-typed keys cannot be expressed as data and are
    /// always rejected when present.
    pub fn from_json(raw: &JsonValue) -> Result<Self> {
        let JsonValue::Object(entries) = raw else {
            return Err(Error::option_type("options", "an object"));
        };

        let mut options = Self::new();
        for (key, value) in entries {
            match key.as_str() {
                keys::CLOSE_ON_SELECT => {
                    let close = value
                        .as_bool()
                        .ok_or_else(|| Error::option_type(key, "a boolean"))?;
                    options = options.close_on_select(close);
                }
                keys::INIT_SELECTION | keys::MATCHER | keys::QUERY => {
                    return Err(Error::option_type(key, "a function"));
                }
                keys::ITEMS => {
                    options.items = match value {
                        JsonValue::Null => Some(None),
                        JsonValue::Array(raw_items) => Some(Some(
                            raw_items.iter().map(normalize).collect::<Result<Vec<_>>>()?,
                        )),
                        _ => return Err(Error::option_type(key, "an array")),
                    };
                }
                keys::PLACEHOLDER => {
                    let placeholder = value
                        .as_str()
                        .ok_or_else(|| Error::option_type(key, "a string"))?;
                    options = options.placeholder(placeholder);
                }
                keys::TEMPLATES => match value {
                    JsonValue::Object(templates) => {
                        for (name, markup) in templates {
                            let markup = match markup {
                                JsonValue::String(markup) => markup.clone(),
                                other => other.to_string(),
                            };
                            options = options.template(name.clone(), markup);
                        }
                    }
                    _ => tracing::debug!(
                        target: select3_core::logging::targets::OPTIONS,
                        "ignoring non-object templates option"
                    ),
                },
                _ => options = options.extra(key.clone(), value.clone()),
            }
        }
        Ok(options)
    }
}

impl fmt::Debug for SelectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectOptions")
            .field("close_on_select", &self.close_on_select)
            .field("init_selection", &self.init_selection.is_some())
            .field("items", &self.items)
            .field("matcher", &self.matcher.is_some())
            .field("placeholder", &self.placeholder)
            .field("query", &self.query.is_some())
            .field("templates", &self.templates)
            .field("extra", &self.extra)
            .finish()
    }
}

// ============================================================================
// Config (live configuration)
// ============================================================================

/// The live configuration of a control.
#[derive(Clone)]
pub struct Config {
    /// Close the session after a result is selected.
    pub close_on_select: bool,
    /// Asynchronous value-to-data resolver.
    pub init_selection: Option<InitSelectionFn>,
    /// Local item set; `None` means remote mode.
    pub items: Option<Vec<Item>>,
    /// Local search matcher.
    pub matcher: Matcher,
    /// Display hint.
    pub placeholder: String,
    /// Remote search strategy.
    pub query: Option<QueryFn>,
    /// Template map.
    pub templates: Templates,
    /// Keys the engine does not interpret.
    pub extra: Map<String, JsonValue>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            close_on_select: true,
            init_selection: None,
            items: None,
            matcher: Arc::new(default_matcher),
            placeholder: String::new(),
            query: None,
            templates: Templates::new(),
            extra: Map::new(),
        }
    }
}

impl Config {
    /// Apply a partial update.
    pub fn apply(&mut self, options: SelectOptions) {
        let SelectOptions {
            close_on_select,
            init_selection,
            items,
            matcher,
            placeholder,
            query,
            templates,
            extra,
        } = options;

        if let Some(close_on_select) = close_on_select {
            self.close_on_select = close_on_select;
        }
        if let Some(init_selection) = init_selection {
            self.init_selection = Some(init_selection);
        }
        if let Some(items) = items {
            tracing::debug!(
                target: select3_core::logging::targets::OPTIONS,
                local = items.is_some(),
                count = items.as_ref().map_or(0, Vec::len),
                "replacing item source"
            );
            self.items = items;
        }
        if let Some(matcher) = matcher {
            self.matcher = matcher;
        }
        if let Some(placeholder) = placeholder {
            self.placeholder = placeholder;
        }
        if let Some(query) = query {
            self.query = Some(query);
        }
        if let Some(templates) = templates {
            self.templates.merge(templates);
        }
        self.extra.extend(extra);
    }

    /// Whether searches filter the local item set.
    pub fn is_local(&self) -> bool {
        self.items.is_some()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("close_on_select", &self.close_on_select)
            .field("init_selection", &self.init_selection.is_some())
            .field("items", &self.items)
            .field("placeholder", &self.placeholder)
            .field("query", &self.query.is_some())
            .field("templates", &self.templates)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}
