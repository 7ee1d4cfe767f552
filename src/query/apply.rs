//! # Directive Application
//!
//! Pure functions applying a directive set to JSON rows. Collection
//! application runs filter → order → select → page; single-entity
//! application only shapes (select). Page size is clamped to
//! [`QuerySettings::page_size`] whatever `top` asks for.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::{Map, Value};

use super::directives::{DirectiveCategory, IgnoredCategories, OrderBy, QueryDirectives};
use super::filter::{field_value, sort_values};
use super::settings::QuerySettings;

/// One page of a collection fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionPage {
    /// Projected rows of this page
    pub items: Vec<Value>,

    /// Total rows matching the filter, when a count was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    /// `skip` value that continues a server-truncated result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_skip: Option<usize>,
}

impl CollectionPage {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Apply a directive set to the rows of a base query.
///
/// With no directive set the rows keep their source order and are only
/// truncated to the page size.
pub fn apply_to_collection(
    rows: Vec<Value>,
    directives: Option<&QueryDirectives>,
    settings: &QuerySettings,
    ignored: IgnoredCategories,
    key_field: &str,
) -> CollectionPage {
    let Some(directives) = directives else {
        return page(rows, 0, None, settings);
    };

    // filter
    let mut rows: Vec<Value> = if ignored.honors(DirectiveCategory::Filter) {
        let filters = directives.filter_set();
        rows.into_iter().filter(|row| filters.matches(row)).collect()
    } else {
        rows
    };

    let count = (directives.count && ignored.honors(DirectiveCategory::Count)).then(|| rows.len());

    // order
    let mut order: Vec<OrderBy> = if ignored.honors(DirectiveCategory::OrderBy) {
        directives.order.clone()
    } else {
        Vec::new()
    };
    if settings.ensure_stable_ordering && !order.iter().any(|o| o.field == key_field) {
        order.push(OrderBy::asc(key_field));
    }
    rows.sort_by(|a, b| compare_rows(a, b, &order));

    // select
    let projection = directives
        .projection()
        .filter(|_| ignored.honors(DirectiveCategory::Select));
    let rows: Vec<Value> = match projection {
        Some(fields) => rows
            .into_iter()
            .map(|row| project(row, fields, key_field))
            .collect(),
        None => rows,
    };

    // page
    let skip = directives
        .skip
        .filter(|_| ignored.honors(DirectiveCategory::Skip))
        .unwrap_or(0);
    let top = directives
        .top
        .filter(|_| ignored.honors(DirectiveCategory::Top));

    let mut result = page(rows, skip, top, settings);
    result.count = count;
    result
}

/// Shape a single entity. Only field selection applies to one entity.
pub fn apply_to_entity(
    row: Value,
    directives: &QueryDirectives,
    ignored: IgnoredCategories,
    key_field: &str,
) -> Value {
    match directives.projection() {
        Some(fields) if ignored.honors(DirectiveCategory::Select) => project(row, fields, key_field),
        _ => row,
    }
}

fn page(
    rows: Vec<Value>,
    skip: usize,
    requested_top: Option<usize>,
    settings: &QuerySettings,
) -> CollectionPage {
    let top = settings.clamp_top(requested_top);
    let remaining = rows.len().saturating_sub(skip);

    // Only truncation imposed by the page size produces a continuation
    let server_truncated = requested_top.map_or(true, |t| t > settings.page_size);
    let next_skip = (server_truncated && remaining > top).then(|| skip + top);

    CollectionPage {
        items: rows.into_iter().skip(skip).take(top).collect(),
        count: None,
        next_skip,
    }
}

/// Lexicographic comparison over the order clauses; missing and null sort first
fn compare_rows(a: &Value, b: &Value, order: &[OrderBy]) -> Ordering {
    for clause in order {
        let left = field_value(a, &clause.field).unwrap_or(&Value::Null);
        let right = field_value(b, &clause.field).unwrap_or(&Value::Null);

        let cmp = sort_values(left, right);
        let cmp = if clause.ascending { cmp } else { cmp.reverse() };

        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    Ordering::Equal
}

/// Keep only the selected members (and the key) of a row
fn project(row: Value, fields: &[String], key_field: &str) -> Value {
    if !row.is_object() {
        return row;
    }

    let mut shaped = Value::Object(Map::new());
    for path in fields.iter().map(String::as_str).chain(std::iter::once(key_field)) {
        if let Some(value) = field_value(&row, path) {
            insert_path(&mut shaped, path, value.clone());
        }
    }
    shaped
}

fn insert_path(target: &mut Value, path: &str, value: Value) {
    let mut segments = path.split('/').peekable();
    let mut current = target;

    while let Some(segment) = segments.next() {
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}
