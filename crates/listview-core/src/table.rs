//! Generic list state: filtering, stable sorting and the page window.
//!
//! [`ListView`] owns the base collection and an explicit [`ViewState`]. Every
//! derived order is a permutation of indices into the collection, so the
//! collection itself keeps the order it arrived in.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use tracing::debug;

use crate::record::Record;
use crate::schema::{FieldKind, FilterMode, Schema, infer_kind};

/// Page size used until the caller picks another one.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => panic!("page size must be non-zero"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }

    /// Marker appended to the sorted column header.
    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// User-controlled view parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Active predicates by field. Empty predicates are never stored.
    pub filters: BTreeMap<String, String>,
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
    /// 1-based.
    pub page: usize,
    pub page_size: NonZeroUsize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn with_page_size(page_size: NonZeroUsize) -> Self {
        Self {
            filters: BTreeMap::new(),
            sort_field: None,
            sort_direction: SortDirection::Ascending,
            page: 1,
            page_size,
        }
    }

    /// Back to defaults, keeping the configured page size.
    fn reset(&mut self) {
        *self = Self::with_page_size(self.page_size);
    }
}

/// One page of the filtered and sorted collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<'a> {
    pub items: Vec<&'a Record>,
    pub page: usize,
    pub total_pages: usize,
    /// Size of the filtered set, across all pages.
    pub total_records: usize,
}

impl PageResult<'_> {
    pub fn is_first_page(&self) -> bool {
        self.page == 1
    }

    pub fn is_last_page(&self) -> bool {
        self.page == self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `max(1, ceil(len / page_size))`.
pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get()).max(1)
}

/// Filter needle prepared once per derivation.
struct Predicate<'s> {
    field: &'s str,
    mode: FilterMode,
    needle: String,
}

impl Predicate<'_> {
    fn matches(&self, record: &Record) -> bool {
        let text = record.get(self.field).display_text();
        match self.mode {
            FilterMode::Substring => text.to_lowercase().contains(&self.needle),
            FilterMode::Exact => text == self.needle,
        }
    }
}

/// In-memory list with filter, sort and page-window derivation.
#[derive(Debug, Clone)]
pub struct ListView {
    schema: Schema,
    records: Vec<Record>,
    state: ViewState,
}

impl ListView {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: Vec::new(),
            state: ViewState::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: NonZeroUsize) -> Self {
        self.set_page_size(page_size);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Base collection in arrival order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Installs a new base collection and resets filters, sort and page.
    pub fn replace_collection(&mut self, records: Vec<Record>) {
        debug!(count = records.len(), "replacing collection");
        self.records = records;
        self.state.reset();
    }

    /// Sets or clears (empty predicate) the filter on `field`. Always returns to page 1.
    pub fn set_filter(&mut self, field: &str, predicate: &str) {
        if predicate.is_empty() {
            self.state.filters.remove(field);
        } else {
            self.state
                .filters
                .insert(field.to_string(), predicate.to_string());
        }
        self.state.page = 1;
        debug!(field, predicate, "filter changed");
    }

    pub fn clear_filters(&mut self) {
        self.state.filters.clear();
        self.state.page = 1;
    }

    pub fn filter_value(&self, field: &str) -> Option<&str> {
        self.state.filters.get(field).map(String::as_str)
    }

    /// Sorts by `field`: ascending on a new field, flipped on the current one.
    /// The page is left as is. Columns declared unsortable are ignored.
    pub fn set_sort(&mut self, field: &str) {
        if !self.schema.is_sortable(field) {
            debug!(field, "ignoring sort on unsortable column");
            return;
        }
        if self.state.sort_field.as_deref() == Some(field) {
            self.state.sort_direction = self.state.sort_direction.flipped();
        } else {
            self.state.sort_field = Some(field.to_string());
            self.state.sort_direction = SortDirection::Ascending;
        }
        debug!(field, direction = ?self.state.sort_direction, "sort changed");
    }

    /// Moves to page `n` when `1 <= n <= total_pages`; anything else is ignored.
    /// Returns whether the page changed.
    pub fn go_to_page(&mut self, n: usize) -> bool {
        if n < 1 || n > self.total_pages() || n == self.state.page {
            return false;
        }
        self.state.page = n;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.state.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.state.page.saturating_sub(1))
    }

    pub fn first_page(&mut self) -> bool {
        self.go_to_page(1)
    }

    pub fn last_page(&mut self) -> bool {
        self.go_to_page(self.total_pages())
    }

    /// Changes the page size and clamps the current page into range.
    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        self.state.page_size = page_size;
        let last = self.total_pages();
        if self.state.page > last {
            self.state.page = last;
        }
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered_len(), self.state.page_size)
    }

    /// The current page. Pure: calling it repeatedly yields the same result.
    pub fn current_page(&self) -> PageResult<'_> {
        let order = self.derived_order();
        let total_records = order.len();
        let total_pages = total_pages(total_records, self.state.page_size);
        let page = self.state.page.clamp(1, total_pages);

        let size = self.state.page_size.get();
        let start = (page - 1) * size;
        let items = order
            .iter()
            .skip(start)
            .take(size)
            .map(|&i| &self.records[i])
            .collect();

        PageResult {
            items,
            page,
            total_pages,
            total_records,
        }
    }

    /// Every record passing the filters, in sorted order.
    pub fn filtered(&self) -> Vec<&Record> {
        self.derived_order()
            .into_iter()
            .map(|i| &self.records[i])
            .collect()
    }

    fn predicates(&self) -> Vec<Predicate<'_>> {
        self.state
            .filters
            .iter()
            .map(|(field, value)| {
                let mode = self.schema.filter_mode(field);
                let needle = match mode {
                    FilterMode::Substring => value.to_lowercase(),
                    FilterMode::Exact => value.clone(),
                };
                Predicate {
                    field: field.as_str(),
                    mode,
                    needle,
                }
            })
            .collect()
    }

    fn filtered_len(&self) -> usize {
        let predicates = self.predicates();
        self.records
            .iter()
            .filter(|r| predicates.iter().all(|p| p.matches(r)))
            .count()
    }

    /// Filter, then stable-sort the surviving indices.
    fn derived_order(&self) -> Vec<usize> {
        let predicates = self.predicates();
        let mut order: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| predicates.iter().all(|p| p.matches(r)))
            .map(|(i, _)| i)
            .collect();

        if let Some(field) = self.state.sort_field.as_deref() {
            let direction = self.state.sort_direction;
            let kind = self.sort_kind(field);
            // `sort_by` is stable, so equal keys keep collection order in both directions.
            order.sort_by(|&a, &b| {
                compare_records(&self.records[a], &self.records[b], field, kind, direction)
            });
        }
        order
    }

    /// Declared kind of `field`, or for undeclared fields the kind of its
    /// first non-null value in the collection.
    fn sort_kind(&self, field: &str) -> FieldKind {
        match self.schema.column_for(field) {
            Some(column) => column.kind,
            None => self
                .records
                .iter()
                .find_map(|r| infer_kind(r.get(field)))
                .unwrap_or_default(),
        }
    }
}

/// Compares two records on one field of `kind` the way [`ListView`] sorts them.
pub fn compare_records(
    a: &Record,
    b: &Record,
    field: &str,
    kind: FieldKind,
    direction: SortDirection,
) -> Ordering {
    let cmp = a.get(field).sort_cmp(b.get(field), kind);
    if direction.is_ascending() {
        cmp
    } else {
        cmp.reverse()
    }
}
