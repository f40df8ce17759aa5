//! The caller-facing search request model.

use serde::{Deserialize, Serialize};

use crate::aggregation::SearchAggregation;
use crate::filter::{Filter, MultiFieldFilter};
use crate::score::{DecayFunction, Score};

/// Page size used when a paged query requests a non-positive size.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Sort order for a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (lowest to highest).
    Asc,
    /// Descending order (highest to lowest).
    Desc,
}

/// A requested output field with its array/scalar flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchField {
    /// The field path, dot-separated for nested objects.
    pub name: String,
    /// Whether the field holds a list of values per document.
    pub array: bool,
}

impl SearchField {
    /// A scalar-valued field.
    pub fn scalar<N: Into<String>>(name: N) -> Self {
        SearchField {
            name: name.into(),
            array: false,
        }
    }

    /// An array-valued field.
    pub fn array<N: Into<String>>(name: N) -> Self {
        SearchField {
            name: name.into(),
            array: true,
        }
    }
}

/// A complete search request.
///
/// Built by the caller, compiled into an engine request by
/// [`crate::compile`], executed by [`crate::execute`], and discarded after
/// the result is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Single-field filters, ANDed together.
    pub filters: Vec<Filter>,
    /// Multi-field filters, ANDed in alongside the single-field filters.
    pub multi_filters: Vec<MultiFieldFilter>,
    /// Sort keys in insertion order.
    pub sort_by: Vec<(String, SortOrder)>,
    /// Requested page, starting at 1.
    pub page: usize,
    /// Requested page size; 0 falls back to [`DEFAULT_PAGE_SIZE`].
    pub page_size: usize,
    /// Bounded single-page fetch (`true`) or exhaustive fetch-all (`false`).
    pub paged: bool,
    /// Requested output fields; empty means id-only projection.
    pub fields: Vec<SearchField>,
    /// Emit the engine's complete stored document per hit, bypassing field
    /// projection.
    pub full_result: bool,
    /// Rethrow transport failures instead of degrading to an empty result.
    pub strict: bool,
    /// Scoring rule sets, applied in insertion order.
    pub scores: Vec<Score>,
    /// Decay functions, applied after the scoring rule sets.
    pub functions: Vec<DecayFunction>,
    /// Aggregation requests.
    pub aggregations: Vec<SearchAggregation>,
}

impl SearchQuery {
    /// Create a paged query for page 1 with the default page size.
    pub fn new() -> Self {
        SearchQuery {
            filters: Vec::new(),
            multi_filters: Vec::new(),
            sort_by: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            paged: true,
            fields: Vec::new(),
            full_result: false,
            strict: false,
            scores: Vec::new(),
            functions: Vec::new(),
            aggregations: Vec::new(),
        }
    }

    /// Add a single-field filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add a multi-field filter.
    pub fn with_multi_filter(mut self, filter: MultiFieldFilter) -> Self {
        self.multi_filters.push(filter);
        self
    }

    /// Add a sort key.
    pub fn with_sort<F: Into<String>>(mut self, field: F, order: SortOrder) -> Self {
        self.sort_by.push((field.into(), order));
        self
    }

    /// Request a specific page (starting at 1) and page size.
    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self.paged = true;
        self
    }

    /// Fetch all matches via repeated offset-advancing requests.
    pub fn fetch_all(mut self) -> Self {
        self.paged = false;
        self
    }

    /// Request an output field.
    pub fn with_field(mut self, field: SearchField) -> Self {
        self.fields.push(field);
        self
    }

    /// Emit complete stored documents, bypassing field projection.
    pub fn with_full_result(mut self) -> Self {
        self.full_result = true;
        self
    }

    /// Rethrow transport failures instead of degrading to an empty result.
    pub fn with_strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Add a scoring rule set.
    pub fn with_score(mut self, score: Score) -> Self {
        self.scores.push(score);
        self
    }

    /// Add a decay function.
    pub fn with_function(mut self, function: DecayFunction) -> Self {
        self.functions.push(function);
        self
    }

    /// Add an aggregation request.
    pub fn with_aggregation(mut self, aggregation: SearchAggregation) -> Self {
        self.aggregations.push(aggregation);
        self
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new()
    }
}
