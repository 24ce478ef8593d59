//! The selection control.
//!
//! [`Select`] ties the pieces together: it owns the live [`Config`], the
//! paired value/data, the last result set, the dropdown session and the
//! event table, and exposes every operation a host drives a control with.
//!
//! # Locking
//!
//! Collaborators (resolvers, query functions, dropdowns) and signal slots are
//! always invoked with no internal lock held, so they are free to call back
//! into the control synchronously.
//!
//! # Example
//!
//! ```
//! use select3::prelude::*;
//!
//! let select = Select::builder(Mode::Multiple)
//!     .with_options(SelectOptions::new().items([Item::new(1, "Foo"), Item::new(2, "Bar")]))
//!     .build()
//!     .unwrap();
//!
//! select.set_value(Value::Multiple(vec![2.into()])).unwrap();
//! assert_eq!(select.data(), Data::Multiple(vec![Item::new(2, "Bar")]));
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use select3_core::logging::targets;
use select3_core::{PerfSpan, Property, Signal, SignalEmitter, StalenessGuard, Ticket};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::events::{
    ChangeEvent, DispatchResult, EventSource, EventTable, HostEvent, OpeningEvent, SelectingEvent,
};
use crate::item::{Item, ItemId};
use crate::options::{Config, SelectOptions};
use crate::reconcile::{SelectionCallback, SelectionState, resolve_locally};
use crate::search::{
    Matcher, QueryCallback, QueryFn, QueryRequest, ResultSet, TextTransform, default_transform,
    filter_local,
};
use crate::session::{
    Dropdown, DropdownContext, DropdownFactory, ResultsMeta, SessionCoordinator, SessionState,
};
use crate::selection::{Data, Mode, Value};

/// Outbound notifications of a control.
pub struct SelectSignals {
    /// The selection changed.
    pub change: Signal<ChangeEvent>,
    /// A session is about to open; cancelable.
    pub opening: Signal<OpeningEvent>,
    /// A result is about to be selected; cancelable.
    pub selecting: Signal<SelectingEvent>,
    /// The session closed.
    pub closed: Signal<()>,
}

impl SelectSignals {
    fn new() -> Self {
        Self {
            change: Signal::new(),
            opening: Signal::new(),
            selecting: Signal::new(),
            closed: Signal::new(),
        }
    }

    fn emitters(&self) -> [&dyn SignalEmitter; 4] {
        [&self.change, &self.opening, &self.selecting, &self.closed]
    }
}

impl fmt::Debug for SelectSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectSignals")
            .field("change", &self.change.connection_count())
            .field("opening", &self.opening.connection_count())
            .field("selecting", &self.selecting.connection_count())
            .field("closed", &self.closed.connection_count())
            .finish()
    }
}

/// A selection edit: either fully known records, or a value still to resolve.
enum Edit {
    Settled(Data),
    Pending(Value),
}

enum SearchSource {
    Local(Vec<Item>, Matcher),
    Remote(QueryFn),
    None,
}

struct SelectInner {
    mode: Mode,
    config: RwLock<Config>,
    text_transform: TextTransform,
    selection: Mutex<SelectionState>,
    results: Mutex<ResultSet>,
    value_guard: StalenessGuard,
    search_guard: StalenessGuard,
    session: SessionCoordinator,
    bindings: RwLock<EventTable>,
    destroyed: Property<bool>,
    signals: SelectSignals,
}

/// A selection control.
///
/// Cloning yields another handle to the same control.
#[derive(Clone)]
pub struct Select {
    inner: Arc<SelectInner>,
}

/// A weak handle to a control, held by collaborators.
#[derive(Clone)]
pub struct SelectHandle {
    inner: Weak<SelectInner>,
}

impl SelectHandle {
    /// Get the control back, if it still exists.
    pub fn upgrade(&self) -> Option<Select> {
        self.inner.upgrade().map(|inner| Select { inner })
    }

    /// Route an inbound event to the control.
    ///
    /// Returns [`DispatchResult::Ignored`] once the control has been dropped.
    pub fn dispatch(&self, source: EventSource, event: HostEvent) -> Result<DispatchResult> {
        match self.upgrade() {
            Some(select) => select.dispatch(source, event),
            None => Ok(DispatchResult::Ignored),
        }
    }

    #[cfg(test)]
    pub(crate) fn dangling() -> Self {
        Self { inner: Weak::new() }
    }
}

impl fmt::Debug for SelectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectHandle")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Select`].
pub struct SelectBuilder {
    mode: Mode,
    options: SelectOptions,
    dropdown: Option<DropdownFactory>,
    text_transform: Option<TextTransform>,
    value: Option<Value>,
}

impl SelectBuilder {
    /// Start building a control of the given mode.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            options: SelectOptions::new(),
            dropdown: None,
            text_transform: None,
            value: None,
        }
    }

    /// Set the initial options using builder pattern.
    pub fn with_options(mut self, options: SelectOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the dropdown factory using builder pattern.
    pub fn with_dropdown<F>(mut self, factory: F) -> Self
    where
        F: Fn(DropdownContext) -> Arc<dyn Dropdown> + Send + Sync + 'static,
    {
        self.dropdown = Some(Arc::new(factory));
        self
    }

    /// Set the text transform applied to search terms using builder pattern.
    pub fn with_text_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.text_transform = Some(Arc::new(transform));
        self
    }

    /// Set the initial value using builder pattern.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Build the control, resolving the initial value if one was given.
    pub fn build(mut self) -> Result<Select> {
        let mut config = Config::default();
        config.apply(std::mem::take(&mut self.options));
        let value = self.value.take();

        let select = self.assemble(config);
        if let Some(value) = value {
            select.set_value(value)?;
        }
        Ok(select)
    }

    fn assemble(self, config: Config) -> Select {
        let mode = self.mode;
        tracing::debug!(target: targets::SELECT, %mode, "control created");
        Select {
            inner: Arc::new(SelectInner {
                mode,
                config: RwLock::new(config),
                text_transform: self
                    .text_transform
                    .unwrap_or_else(|| Arc::new(default_transform)),
                selection: Mutex::new(SelectionState::new(mode)),
                results: Mutex::new(ResultSet::default()),
                value_guard: StalenessGuard::new(),
                search_guard: StalenessGuard::new(),
                session: SessionCoordinator::new(self.dropdown),
                bindings: RwLock::new(EventTable::standard()),
                destroyed: Property::new(false),
                signals: SelectSignals::new(),
            }),
        }
    }
}

impl fmt::Debug for SelectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectBuilder")
            .field("mode", &self.mode)
            .field("options", &self.options)
            .field("dropdown", &self.dropdown.is_some())
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Select
// ============================================================================

impl Select {
    /// Start building a control.
    pub fn builder(mode: Mode) -> SelectBuilder {
        SelectBuilder::new(mode)
    }

    /// Start building a single-selection control.
    pub fn single() -> SelectBuilder {
        SelectBuilder::new(Mode::Single)
    }

    /// Start building a multiple-selection control.
    pub fn multiple() -> SelectBuilder {
        SelectBuilder::new(Mode::Multiple)
    }

    /// Create a control with no dropdown and no initial value.
    pub fn new(mode: Mode, options: SelectOptions) -> Self {
        let mut config = Config::default();
        config.apply(options);
        Self::builder(mode).assemble(config)
    }

    /// Create a control from raw JSON options.
    ///
    /// The mode comes from `inputType` (`"single"`/`"multiple"`) or, failing
    /// that, the boolean `multiple`; everything else is read by
    /// [`SelectOptions::from_json`].
    pub fn from_json(raw: &JsonValue) -> Result<Self> {
        let JsonValue::Object(entries) = raw else {
            return Err(Error::option_type("options", "an object"));
        };

        let mode = match (entries.get("inputType"), entries.get("multiple")) {
            (Some(JsonValue::String(name)), _) => name.parse::<Mode>()?,
            (Some(_), _) => return Err(Error::option_type("inputType", "a string")),
            (None, Some(JsonValue::Bool(true))) => Mode::Multiple,
            (None, Some(JsonValue::Bool(false)) | None) => Mode::Single,
            (None, Some(_)) => return Err(Error::option_type("multiple", "a boolean")),
        };

        let mut rest = entries.clone();
        rest.remove("inputType");
        rest.remove("multiple");
        let options = SelectOptions::from_json(&JsonValue::Object(rest))?;

        Ok(Self::new(mode, options))
    }

    /// The selection mode.
    pub fn mode(&self) -> Mode {
        self.inner.mode
    }

    /// A weak handle for collaborators.
    pub fn handle(&self) -> SelectHandle {
        SelectHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Outbound notifications.
    pub fn signals(&self) -> &SelectSignals {
        &self.inner.signals
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.inner.destroyed.get() {
            Err(Error::Destroyed)
        } else {
            Ok(())
        }
    }

    fn check_mode(&self, mode: Mode) -> Result<()> {
        if mode == self.inner.mode {
            Ok(())
        } else {
            Err(Error::ModeMismatch {
                expected: self.inner.mode,
            })
        }
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Apply a partial options update.
    pub fn set_options(&self, options: SelectOptions) -> Result<()> {
        self.ensure_alive()?;
        self.inner.config.write().apply(options);
        Ok(())
    }

    /// Apply a raw JSON options update.
    ///
    /// Nothing is applied if any key fails validation.
    pub fn set_options_json(&self, raw: &JsonValue) -> Result<()> {
        let options = SelectOptions::from_json(raw)?;
        self.set_options(options)
    }

    /// A snapshot of the live configuration.
    pub fn config(&self) -> Config {
        self.inner.config.read().clone()
    }

    /// The configured placeholder.
    pub fn placeholder(&self) -> String {
        self.inner.config.read().placeholder.clone()
    }

    /// Render a named template from the configuration.
    pub fn render_template(&self, name: &str, context: &JsonValue) -> Result<String> {
        let template = self
            .inner
            .config
            .read()
            .templates
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownTemplate(name.to_string()))?;
        Ok(template.render(context))
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The current value.
    pub fn value(&self) -> Value {
        self.inner.selection.lock().value.clone()
    }

    /// The current data.
    ///
    /// While an asynchronous resolution is in flight this still holds the
    /// records of the previous settled value.
    pub fn data(&self) -> Data {
        self.inner.selection.lock().data.clone()
    }

    /// Set the value and resolve the matching records.
    ///
    /// With an `initSelection` resolver configured, the records arrive whenever
    /// it answers and only if no later value or data was set in between.
    /// Otherwise they are looked up in the local item set right away.
    #[tracing::instrument(skip_all, target = "select3::reconcile", level = "debug")]
    pub fn set_value(&self, value: Value) -> Result<()> {
        self.ensure_alive()?;
        self.check_mode(value.mode())?;

        self.resolve(value, |event| event);
        Ok(())
    }

    /// Store `value` and resolve its records, decorating the eventual change.
    fn resolve<F>(&self, value: Value, decorate: F)
    where
        F: FnOnce(ChangeEvent) -> ChangeEvent + Send + 'static,
    {
        let (resolver, items) = {
            let config = self.inner.config.read();
            (config.init_selection.clone(), config.items.clone())
        };

        let ticket = {
            let mut selection = self.inner.selection.lock();
            selection.value = value.clone();
            self.inner.value_guard.begin()
        };

        match resolver {
            Some(resolver) => {
                tracing::debug!(target: targets::RECONCILE, generation = ticket.generation(), "resolving value");
                let handle = self.handle();
                let callback = SelectionCallback::new(self.inner.mode, move |data| {
                    if let Some(select) = handle.upgrade() {
                        select.apply_resolution(&ticket, data, decorate);
                    }
                });
                resolver(value, callback);
            }
            None => {
                let data = resolve_locally(&value, items.as_deref());
                self.apply_resolution(&ticket, data, decorate);
            }
        }
    }

    /// Parse and set a raw value.
    pub fn set_value_json(&self, raw: &JsonValue) -> Result<()> {
        let value = Value::from_json(self.inner.mode, raw)?;
        self.set_value(value)
    }

    /// Set the data directly; the value is derived from it.
    ///
    /// Supersedes any resolution still in flight.
    pub fn set_data(&self, data: Data) -> Result<()> {
        self.ensure_alive()?;
        self.check_mode(data.mode())?;
        self.commit(data, ChangeEvent::new);
        Ok(())
    }

    /// Parse, validate and set raw data.
    pub fn set_data_json(&self, raw: &JsonValue) -> Result<()> {
        let data = Data::from_json(self.inner.mode, raw)?;
        self.set_data(data)
    }

    /// Add an item to the selection.
    ///
    /// In single mode this replaces the selection. Returns `false` if the item
    /// was already selected in multiple mode.
    ///
    /// While a resolution is pending the edit applies to the value, which is
    /// then resolved again as a whole.
    pub fn add(&self, item: Item) -> Result<bool> {
        self.ensure_alive()?;
        let edit = {
            let selection = self.inner.selection.lock();
            match &selection.value {
                Value::Single(_) => Edit::Settled(Data::Single(Some(item.clone()))),
                Value::Multiple(ids) => {
                    if ids.contains(&item.id) {
                        tracing::trace!(target: targets::SELECT, id = %item.id, "already selected");
                        return Ok(false);
                    }
                    if selection.is_settled() {
                        let mut items = selection.data.items().to_vec();
                        items.push(item.clone());
                        Edit::Settled(Data::Multiple(items))
                    } else {
                        let mut ids = ids.clone();
                        ids.push(item.id.clone());
                        Edit::Pending(Value::Multiple(ids))
                    }
                }
            }
        };

        self.apply_edit(edit, move |event| event.with_added(Some(item)));
        Ok(true)
    }

    /// Remove an item from the selection by id.
    ///
    /// Returns `false` if the value does not hold this id.
    pub fn remove(&self, id: &ItemId) -> Result<bool> {
        self.ensure_alive()?;
        let (edit, removed) = {
            let selection = self.inner.selection.lock();
            match &selection.value {
                Value::Single(Some(current)) if current == id => {
                    (Edit::Settled(Data::Single(None)), selection.record(id))
                }
                Value::Single(_) => return Ok(false),
                Value::Multiple(ids) => {
                    let Some(index) = ids.iter().position(|selected| selected == id) else {
                        return Ok(false);
                    };
                    let edit = if selection.is_settled() {
                        let mut items = selection.data.items().to_vec();
                        items.remove(index);
                        Edit::Settled(Data::Multiple(items))
                    } else {
                        let mut ids = ids.clone();
                        ids.remove(index);
                        Edit::Pending(Value::Multiple(ids))
                    };
                    (edit, selection.record(id))
                }
            }
        };

        self.apply_edit(edit, move |event| event.with_removed(Some(removed)));
        Ok(true)
    }

    fn apply_edit<F>(&self, edit: Edit, decorate: F)
    where
        F: FnOnce(ChangeEvent) -> ChangeEvent + Send + 'static,
    {
        match edit {
            Edit::Settled(data) => self.commit(data, |value| decorate(ChangeEvent::new(value))),
            Edit::Pending(value) => {
                tracing::debug!(target: targets::RECONCILE, "editing a pending value");
                self.resolve(value, decorate);
            }
        }
    }

    /// Select a result picked in the dropdown.
    ///
    /// Emits the cancelable `selecting` notification first; returns `false` if
    /// an observer prevented it.
    pub fn select_item(&self, item: Item) -> Result<bool> {
        self.ensure_alive()?;
        if !self.inner.signals.selecting.emit_cancelable(item.clone()) {
            tracing::debug!(target: targets::SELECT, id = %item.id, "selection prevented");
            return Ok(false);
        }

        self.add(item)?;

        let close_on_select = self.inner.config.read().close_on_select;
        if close_on_select {
            self.close();
        } else {
            self.refresh_results();
        }
        Ok(true)
    }

    /// Install settled data and notify, superseding in-flight resolutions.
    fn commit(&self, data: Data, event: impl FnOnce(Value) -> ChangeEvent) {
        let value = {
            let mut selection = self.inner.selection.lock();
            self.inner.value_guard.invalidate();
            selection.install(data);
            selection.value.clone()
        };
        self.inner.signals.change.emit(event(value));
    }

    fn apply_resolution(
        &self,
        ticket: &Ticket,
        data: Data,
        decorate: impl FnOnce(ChangeEvent) -> ChangeEvent,
    ) {
        let value = {
            let mut selection = self.inner.selection.lock();
            if !ticket.is_current() {
                tracing::trace!(
                    target: targets::RECONCILE,
                    generation = ticket.generation(),
                    "discarding stale resolution"
                );
                return;
            }
            selection.install(data);
            selection.value.clone()
        };
        self.inner.signals.change.emit(decorate(ChangeEvent::new(value)));
    }

    /// Drop already-selected items from a result list.
    pub fn filter_results(&self, results: &[Item]) -> Vec<Item> {
        self.inner.selection.lock().data.filter_results(results)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Search for `term` and show the results in the live session.
    ///
    /// Results of a search superseded by a newer one are dropped.
    pub fn search(&self, term: &str) {
        if self.inner.destroyed.get() {
            tracing::warn!(target: targets::SEARCH, "search on destroyed control");
            return;
        }

        let _span = PerfSpan::new("search");
        let ticket = self.inner.search_guard.begin();

        let source = {
            let config = self.inner.config.read();
            match (&config.items, &config.query) {
                (Some(items), _) => SearchSource::Local(items.clone(), config.matcher.clone()),
                (None, Some(query)) => SearchSource::Remote(query.clone()),
                (None, None) => SearchSource::None,
            }
        };

        match source {
            SearchSource::Local(items, matcher) => {
                let matches = filter_local(&items, term, &self.inner.text_transform, &matcher);
                tracing::trace!(target: targets::SEARCH, term, count = matches.len(), "local search");
                self.apply_results(
                    &ticket,
                    ResultSet {
                        term: term.to_string(),
                        items: matches,
                        has_more: false,
                    },
                );
            }
            SearchSource::Remote(query) => {
                tracing::trace!(target: targets::SEARCH, term, "remote search");
                let handle = self.handle();
                let requested = term.to_string();
                let callback = QueryCallback::new(move |response| {
                    if let Some(select) = handle.upgrade() {
                        select.apply_results(
                            &ticket,
                            ResultSet {
                                term: requested,
                                items: response.results,
                                has_more: response.more,
                            },
                        );
                    }
                });
                query(QueryRequest {
                    term: term.to_string(),
                    offset: 0,
                    callback,
                });
            }
            SearchSource::None => {
                tracing::trace!(target: targets::SEARCH, "no item source, search ignored");
            }
        }
    }

    /// The most recent result set, unfiltered.
    pub fn results(&self) -> ResultSet {
        self.inner.results.lock().clone()
    }

    fn apply_results(&self, ticket: &Ticket, results: ResultSet) {
        {
            let mut current = self.inner.results.lock();
            if !ticket.is_current() {
                tracing::trace!(
                    target: targets::SEARCH,
                    term = %results.term,
                    "discarding stale results"
                );
                return;
            }
            *current = results;
        }
        self.refresh_results();
    }

    fn refresh_results(&self) {
        let results = self.results();
        let visible = self.filter_results(&results.items);
        self.inner.session.show_results(
            &visible,
            ResultsMeta {
                has_more: results.has_more,
            },
        );
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Open a dropdown session and run an empty search.
    ///
    /// Does nothing if a session is already open, if an observer prevents the
    /// `opening` notification, or if no dropdown factory is configured.
    pub fn open(&self) {
        if self.inner.destroyed.get() {
            tracing::warn!(target: targets::SESSION, "open on destroyed control");
            return;
        }
        if self.inner.session.is_open() {
            return;
        }
        if !self.inner.signals.opening.emit_cancelable(()) {
            tracing::debug!(target: targets::SESSION, "opening prevented");
            return;
        }
        // An opening slot may have opened the control itself.
        if self.inner.session.is_open() {
            return;
        }
        if !self.inner.session.start(DropdownContext::new(self.handle())) {
            return;
        }
        self.search("");
    }

    /// Ask the live session to close.
    ///
    /// The control stays open until the dropdown reports that it closed.
    pub fn close(&self) {
        self.inner.session.request_close();
    }

    /// Re-position the live session.
    pub fn position(&self) {
        self.inner.session.position();
    }

    /// Whether a session is open.
    pub fn is_open(&self) -> bool {
        self.inner.session.is_open()
    }

    /// The session state.
    pub fn session_state(&self) -> SessionState {
        self.inner.session.state()
    }

    pub(crate) fn session_closed(&self) {
        if self.inner.session.finish_close() {
            self.inner.signals.closed.emit(());
        }
    }

    // =========================================================================
    // Events & lifecycle
    // =========================================================================

    /// Route an inbound host event through the event table.
    pub fn dispatch(&self, source: EventSource, event: HostEvent) -> Result<DispatchResult> {
        let handler = self.inner.bindings.read().lookup(event.kind(), source);
        match handler {
            Some(handler) => {
                handler(self, event)?;
                Ok(DispatchResult::Handled)
            }
            None => {
                tracing::trace!(
                    target: targets::EVENTS,
                    kind = ?event.kind(),
                    ?source,
                    "no binding for event"
                );
                Ok(DispatchResult::Ignored)
            }
        }
    }

    /// Tear the control down.
    ///
    /// Clears the event table, disconnects every observer, closes any live
    /// session and drops pending asynchronous answers. Idempotent.
    pub fn destroy(&self) {
        if !self.inner.destroyed.set(true) {
            return;
        }

        self.inner.bindings.write().clear();
        self.inner.value_guard.invalidate();
        self.inner.search_guard.invalidate();
        for emitter in self.inner.signals.emitters() {
            emitter.disconnect_all();
        }

        if let Some(dropdown) = self.inner.session.teardown() {
            dropdown.close();
        }
        tracing::debug!(target: targets::SELECT, "control destroyed");
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }
}

impl fmt::Debug for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("mode", &self.inner.mode)
            .field("value", &self.value())
            .field("session", &self.inner.session)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

static_assertions::assert_impl_all!(Select: Send, Sync);
static_assertions::assert_impl_all!(SelectHandle: Send, Sync);
