//! Template map consulted by rendering collaborators.
//!
//! The engine never renders anything itself; it only owns the map from
//! template name to [`Template`] so that a dropdown implementation can look
//! templates up by name. A template is either a static string or anything that
//! implements [`Render`] (closures included).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Something that renders a template context to markup.
pub trait Render: Send + Sync {
    /// Render the given context.
    fn render(&self, context: &JsonValue) -> String;
}

impl<F> Render for F
where
    F: Fn(&JsonValue) -> String + Send + Sync,
{
    fn render(&self, context: &JsonValue) -> String {
        self(context)
    }
}

/// A single template entry.
#[derive(Clone)]
pub enum Template {
    /// Markup returned as-is regardless of context.
    Static(String),
    /// A renderer invoked with the context.
    Renderer(Arc<dyn Render>),
}

impl Template {
    /// Create a template from a closure.
    pub fn from_fn<F>(render: F) -> Self
    where
        F: Fn(&JsonValue) -> String + Send + Sync + 'static,
    {
        Self::Renderer(Arc::new(render))
    }

    /// Render this template.
    pub fn render(&self, context: &JsonValue) -> String {
        match self {
            Self::Static(markup) => markup.clone(),
            Self::Renderer(renderer) => renderer.render(context),
        }
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(markup) => f.debug_tuple("Static").field(markup).finish(),
            Self::Renderer(_) => f.write_str("Renderer(..)"),
        }
    }
}

impl From<&str> for Template {
    fn from(markup: &str) -> Self {
        Self::Static(markup.to_string())
    }
}

impl From<String> for Template {
    fn from(markup: String) -> Self {
        Self::Static(markup)
    }
}

/// Named templates.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    entries: HashMap<String, Template>,
}

impl Templates {
    /// Create an empty template map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template.
    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<Template>) {
        self.entries.insert(name.into(), template.into());
    }

    /// Add a template using builder pattern.
    pub fn with(mut self, name: impl Into<String>, template: impl Into<Template>) -> Self {
        self.insert(name, template);
        self
    }

    /// Shallow-merge another map into this one; its entries win.
    pub fn merge(&mut self, other: Templates) {
        self.entries.extend(other.entries);
    }

    /// Look up a template.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.entries.get(name)
    }

    /// Whether a template is registered under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render a template by name.
    pub fn render(&self, name: &str, context: &JsonValue) -> Result<String> {
        self.get(name)
            .map(|template| template.render(context))
            .ok_or_else(|| Error::UnknownTemplate(name.to_string()))
    }
}
