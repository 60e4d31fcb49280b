//! Query filter field widget.
//!
//! A FilterField edits the filter value for one column of a larger
//! query. The full filter state ([`WhereFilter`]) is owned by an
//! ancestor: the widget holds a snapshot, and every edit publishes a
//! *new* map on the `where_changed` signal in which only this field's
//! record is replaced — sibling entries stay shared with the previous
//! map, so concurrent edits to other fields are never clobbered.
//!
//! Columns with a finite value set ([`FieldKind::Enumerated`]) get their
//! legal values fetched lazily from the host's [`RowSource`]. The fetch
//! is fire-and-forget: the widget renders with whatever is available and
//! merges results when the host polls it.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use orrery::widget::widgets::{FieldKind, FilterField, WhereFilter};
//!
//! let mut field = FilterField::new("host_name", FieldKind::Enumerated, source);
//! field.set_where_filter(where_filter);
//!
//! field.where_changed.connect(|filter| {
//!     // ancestor adopts the new filter map
//! });
//!
//! // Host loop: merge any fetched values that have landed.
//! field.poll_domain();
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use orrery_core::{AsyncRuntime, AsyncTaskHandle, Signal};

use crate::query::{QueryError, QueryOptions, QueryReply, RowSource};
use crate::widget::events::WidgetEvent;
use crate::widget::traits::Widget;

/// The attribute holding a field's filter value.
const VALUE_KEY: &str = "value";

/// How a column's filter input behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form text; rendered as a text input.
    Text,
    /// Finite value set; rendered as a select over the fetched domain.
    Enumerated,
}

// ============================================================================
// Filter State
// ============================================================================

/// The filter record for a single field.
///
/// Holds at least the `value` attribute; any further attributes a host
/// attaches (comparison operators, units) ride along untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    attributes: BTreeMap<String, String>,
}

impl FieldFilter {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record with just a value.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self::new().with_attribute(VALUE_KEY, value)
    }

    /// Add or replace an attribute (builder pattern).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The filter value, or `""` when unset.
    pub fn value(&self) -> &str {
        self.attribute(VALUE_KEY).unwrap_or("")
    }

    /// Look up an attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// All attributes, ordered by key.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// Filter state across all fields of a query, owned by an ancestor.
///
/// Records are stored behind `Arc`, so a map produced by
/// [`with_field_attribute`](Self::with_field_attribute) shares every
/// untouched entry with its predecessor. The widgets never mutate a
/// record in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereFilter {
    fields: BTreeMap<String, Arc<FieldFilter>>,
}

impl WhereFilter {
    /// Create an empty filter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field's record (builder pattern).
    pub fn with_field(mut self, name: impl Into<String>, filter: FieldFilter) -> Self {
        self.fields.insert(name.into(), Arc::new(filter));
        self
    }

    /// Insert or replace a field's record.
    pub fn insert(&mut self, name: impl Into<String>, filter: FieldFilter) {
        self.fields.insert(name.into(), Arc::new(filter));
    }

    /// Look up a field's record.
    pub fn field(&self, name: &str) -> Option<&Arc<FieldFilter>> {
        self.fields.get(name)
    }

    /// The value for a field, or `""` when absent/unset.
    pub fn value_of(&self, name: &str) -> &str {
        self.fields.get(name).map(|f| f.value()).unwrap_or("")
    }

    /// Number of fields with a record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether no field has a record.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over all records, ordered by field name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<FieldFilter>)> {
        self.fields.iter().map(|(name, f)| (name.as_str(), f))
    }

    /// Produce a new map in which only `field`'s record differs.
    ///
    /// The named record is rebuilt with `key` replaced and every other
    /// attribute carried over; a missing record is created. All sibling
    /// entries are the same `Arc` as in `self`.
    pub fn with_field_attribute(
        &self,
        field: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let mut fields = self.fields.clone();
        let record = fields
            .get(field)
            .map(|existing| FieldFilter::clone(existing))
            .unwrap_or_default();
        fields.insert(
            field.to_string(),
            Arc::new(record.with_attribute(key, value)),
        );
        Self { fields }
    }
}

// ============================================================================
// Frames
// ============================================================================

/// A renderable snapshot of a filter field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterFieldFrame {
    /// Free-form text input.
    TextInput {
        /// The field being edited.
        name: String,
        /// The current value.
        value: String,
    },
    /// Select over the fetched domain.
    ///
    /// `options` always starts with the empty sentinel `""`; each other
    /// entry is both label and value.
    Select {
        /// The field being edited.
        name: String,
        /// The current value.
        value: String,
        /// Selectable options, sentinel first.
        options: Vec<String>,
    },
}

// ============================================================================
// FilterField Widget
// ============================================================================

/// An in-flight domain fetch.
struct PendingFetch {
    /// Field name captured when the fetch started. Results are stored
    /// under this name no matter what the widget is configured with by
    /// the time they arrive.
    field: String,
    handle: AsyncTaskHandle<Result<QueryReply, QueryError>>,
}

/// A filter input for one column of a query.
///
/// # Signals
///
/// - `where_changed(WhereFilter)`: Emitted with the full replacement
///   map after every edit; the single channel back to the owner
/// - `domain_changed(String)`: Emitted with the originating field name
///   when a fetched value set is merged
pub struct FilterField {
    /// The column this widget edits.
    field_name: String,

    /// Input behavior for the column.
    kind: FieldKind,

    /// The host's data-fetch collaborator.
    source: Arc<dyn RowSource>,

    /// Snapshot of the ancestor-owned filter state.
    where_filter: WhereFilter,

    /// Fetched value sets, keyed by field name. Scoped to this widget
    /// instance. A completed fetch replaces its field's slot with the
    /// de-duplicated values in first-observed order.
    domains: BTreeMap<String, Vec<String>>,

    /// Fetches that have not resolved yet.
    pending: Vec<PendingFetch>,

    /// Signal emitted with each replacement filter map.
    pub where_changed: Signal<WhereFilter>,

    /// Signal emitted when a field's domain is (re)populated.
    pub domain_changed: Signal<String>,
}

impl FilterField {
    /// Create a filter field for `field_name`.
    ///
    /// An `Enumerated` field starts its domain fetch immediately;
    /// a `Text` field never fetches.
    pub fn new(
        field_name: impl Into<String>,
        kind: FieldKind,
        source: Arc<dyn RowSource>,
    ) -> Self {
        let mut widget = Self {
            field_name: field_name.into(),
            kind,
            source,
            where_filter: WhereFilter::new(),
            domains: BTreeMap::new(),
            pending: Vec::new(),
            where_changed: Signal::new(),
            domain_changed: Signal::new(),
        };
        if widget.kind == FieldKind::Enumerated {
            widget.request_domain();
        }
        widget
    }

    /// The column this widget edits.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Input behavior for the column.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Re-target the widget to another column.
    ///
    /// Changing the name of an `Enumerated` field starts a fetch for the
    /// new name; re-setting the currently configured name never
    /// re-fetches it. A late resolution for the old name still lands
    /// under the old name (see [`poll_domain`](Self::poll_domain)).
    pub fn set_field(&mut self, field_name: impl Into<String>, kind: FieldKind) {
        let field_name = field_name.into();
        let name_changed = field_name != self.field_name;
        self.field_name = field_name;
        self.kind = kind;

        if kind == FieldKind::Enumerated
            && (name_changed || !self.domains.contains_key(&self.field_name))
        {
            self.request_domain();
        }
    }

    // =========================================================================
    // Filter State
    // =========================================================================

    /// Adopt the ancestor-owned filter snapshot.
    pub fn set_where_filter(&mut self, filter: WhereFilter) {
        self.where_filter = filter;
    }

    /// The current snapshot of the filter state.
    pub fn where_filter(&self) -> &WhereFilter {
        &self.where_filter
    }

    /// This field's current value, or `""` when unset.
    pub fn value(&self) -> &str {
        self.where_filter.value_of(&self.field_name)
    }

    /// Set this field's value.
    ///
    /// Equivalent to [`set_attribute`](Self::set_attribute) with the
    /// `value` attribute.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.set_attribute(VALUE_KEY, value);
    }

    /// Set one attribute of this field's record.
    ///
    /// Builds a replacement map in which only this field's record is
    /// rebuilt (its other attributes carried over) and every sibling
    /// entry is shared with the previous map, adopts it, and publishes
    /// it on `where_changed`. The previous record is never mutated.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let next = self
            .where_filter
            .with_field_attribute(&self.field_name, key, value);
        self.where_filter = next.clone();
        self.where_changed.emit(next);
    }

    // =========================================================================
    // Enum Domain
    // =========================================================================

    /// The fetched domain for the configured field. Empty until a fetch
    /// resolves (and always empty for `Text` fields).
    pub fn domain(&self) -> &[String] {
        self.domain_for(&self.field_name)
    }

    /// The fetched domain for any field this instance has resolved.
    pub fn domain_for(&self, field: &str) -> &[String] {
        self.domains.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check whether a domain fetch is still in flight.
    pub fn has_pending_fetch(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Start a fetch for the configured field's value set.
    ///
    /// Skipped when a fetch for the same field is already in flight.
    fn request_domain(&mut self) {
        let field = self.field_name.clone();
        if self.pending.iter().any(|p| p.field == field) {
            return;
        }

        tracing::debug!(target: "orrery::widget", %field, "fetching enum domain");
        let source = self.source.clone();
        let options = QueryOptions::column(field.clone());
        let handle = AsyncRuntime::global().spawn(async move { source.query(options).await });

        self.pending.push(PendingFetch { field, handle });
    }

    /// Merge any resolved domain fetches. Never blocks.
    ///
    /// Results are stored under the field name captured when their fetch
    /// started, so a resolution arriving after [`set_field`] re-targeted
    /// the widget cannot corrupt the now-active field's domain. A failed
    /// fetch is logged and leaves the previously stored domain intact.
    ///
    /// Returns `true` if any domain slot was updated.
    pub fn poll_domain(&mut self) -> bool {
        let mut updated = false;

        let pending = std::mem::take(&mut self.pending);
        for PendingFetch { field, handle } in pending {
            match handle.try_get() {
                Ok(Ok(reply)) => {
                    let values = collect_row_values(&reply);
                    tracing::debug!(
                        target: "orrery::widget",
                        %field,
                        count = values.len(),
                        "enum domain populated"
                    );
                    self.domains.insert(field.clone(), values);
                    self.domain_changed.emit(field);
                    updated = true;
                }
                Ok(Err(err)) => {
                    tracing::error!(target: "orrery::widget", %field, %err, "enum domain fetch failed");
                }
                Err(handle) => self.pending.push(PendingFetch { field, handle }),
            }
        }

        updated
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Snapshot the renderable state.
    pub fn frame(&self) -> FilterFieldFrame {
        match self.kind {
            FieldKind::Text => FilterFieldFrame::TextInput {
                name: self.field_name.clone(),
                value: self.value().to_string(),
            },
            FieldKind::Enumerated => {
                // TODO: support selecting several enum values per field
                let mut options = Vec::with_capacity(self.domain().len() + 1);
                options.push(String::new());
                options.extend(self.domain().iter().cloned());
                FilterFieldFrame::Select {
                    name: self.field_name.clone(),
                    value: self.value().to_string(),
                    options,
                }
            }
        }
    }
}

impl Widget for FilterField {
    fn event(&mut self, event: &mut WidgetEvent) -> bool {
        match event {
            WidgetEvent::Poll(_) => {
                if self.poll_domain() {
                    event.accept();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }
}

/// Collect every value of every row, de-duplicated in first-observed
/// order.
///
/// Rows have no fixed schema, so all values are taken, not one expected
/// column. Non-string values keep their JSON rendering.
fn collect_row_values(reply: &QueryReply) -> Vec<String> {
    let mut values = Vec::new();
    for row in &reply.data {
        for value in row.values() {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !values.contains(&text) {
                values.push(text);
            }
        }
    }
    values
}

static_assertions::assert_impl_all!(FilterField: Send, Sync);
