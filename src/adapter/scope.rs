//! Query scoping: the mandatory base restriction applied before any caller
//! directive.

use crate::query::directives::{IgnoredCategories, QueryDirectives};
use crate::query::filter::FilterExpr;
use crate::query::settings::QuerySettings;
use crate::resource::{Queryable, Resource};

/// Inputs of one query after scoping.
///
/// A scope receives the caller's values and returns the ones the adapter
/// will actually use. `query` is `None` when no base collection is available.
#[derive(Debug, Clone)]
pub struct Prepared<T> {
    pub directives: Option<QueryDirectives>,
    pub settings: QuerySettings,
    pub ignored: IgnoredCategories,
    pub query: Option<Queryable<T>>,
}

/// Injects mandatory scoping into a resource's base query
pub trait QueryScope<T: Resource>: Send + Sync {
    /// Restrict the base query and adjust directives/settings for this call.
    ///
    /// Must not apply the caller's directives; the adapter does that.
    fn prepare(&self, prepared: Prepared<T>) -> Prepared<T>;
}

/// Default scope: the full collection, inputs unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Unscoped;

impl<T: Resource> QueryScope<T> for Unscoped {
    fn prepare(&self, prepared: Prepared<T>) -> Prepared<T> {
        prepared
    }
}

impl<T, F> QueryScope<T> for F
where
    T: Resource,
    F: Fn(Prepared<T>) -> Prepared<T> + Send + Sync,
{
    fn prepare(&self, prepared: Prepared<T>) -> Prepared<T> {
        self(prepared)
    }
}

/// Fixed restrictions (e.g. owner or tenant), optional page-size cap and
/// extra ignored categories
#[derive(Debug, Clone, Default)]
pub struct RestrictionScope {
    restrictions: Vec<FilterExpr>,
    max_page_size: Option<usize>,
    ignore: IgnoredCategories,
}

impl RestrictionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only entities whose `field` equals `value`
    pub fn owned_by(field: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new().restrict(FilterExpr::eq(field, value))
    }

    pub fn restrict(mut self, restriction: FilterExpr) -> Self {
        self.restrictions.push(restriction);
        self
    }

    pub fn cap_page_size(mut self, max: usize) -> Self {
        self.max_page_size = Some(max);
        self
    }

    pub fn ignore(mut self, ignored: IgnoredCategories) -> Self {
        self.ignore = self.ignore.union(ignored);
        self
    }
}

impl<T: Resource> QueryScope<T> for RestrictionScope {
    fn prepare(&self, mut prepared: Prepared<T>) -> Prepared<T> {
        prepared.query = prepared.query.map(|query| {
            self.restrictions
                .iter()
                .cloned()
                .fold(query, Queryable::restrict)
        });

        if let Some(max) = self.max_page_size {
            prepared.settings.page_size = prepared.settings.page_size.min(max);
        }
        prepared.ignored = prepared.ignored.union(self.ignore);

        prepared
    }
}
