//! # Filter Expressions
//!
//! Predicates evaluated against the JSON form of an entity. Field paths may
//! address nested members with `/` (e.g. `address/city`).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equals
    Eq,
    /// Not equals
    Neq,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Pattern match (`%` any run, `_` one char)
    Like,
    /// Value in list
    In,
    /// `is.null` / `is.notnull`
    Is,
}

impl FilterOperator {
    /// Parse an operator prefix as it appears in a request parameter
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        let op = match prefix {
            "eq" => Self::Eq,
            "neq" | "ne" => Self::Neq,
            "gt" => Self::Gt,
            "gte" | "ge" => Self::Gte,
            "lt" => Self::Lt,
            "lte" | "le" => Self::Lte,
            "like" => Self::Like,
            "in" => Self::In,
            "is" => Self::Is,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::In => "in",
            Self::Is => "is",
        }
    }
}

/// A single field predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpr {
    /// Field path to filter on
    pub field: String,

    /// Comparison operator
    pub operator: FilterOperator,

    /// Value to compare against
    pub value: Value,
}

impl FilterExpr {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality filter
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// Create a greater than filter
    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Gt, value)
    }

    /// Create a less than filter
    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Lt, value)
    }

    /// Create an "in list" filter
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, FilterOperator::In, Value::Array(values))
    }

    /// Check if a document matches this filter
    pub fn matches(&self, doc: &Value) -> bool {
        let field_value = match field_value(doc, &self.field) {
            Some(v) => v,
            // A missing member behaves like null
            None => &Value::Null,
        };

        match self.operator {
            FilterOperator::Eq => values_equal(field_value, &self.value),
            FilterOperator::Neq => !values_equal(field_value, &self.value),
            FilterOperator::Gt => compare_values(field_value, &self.value) == Some(Ordering::Greater),
            FilterOperator::Gte => matches!(
                compare_values(field_value, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lt => compare_values(field_value, &self.value) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                compare_values(field_value, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Like => match (field_value.as_str(), self.value.as_str()) {
                (Some(text), Some(pattern)) => like_match(text, pattern),
                _ => false,
            },
            FilterOperator::In => self
                .value
                .as_array()
                .map(|items| items.iter().any(|item| values_equal(field_value, item)))
                .unwrap_or(false),
            FilterOperator::Is => match &self.value {
                Value::Null => field_value.is_null(),
                Value::String(s) if s == "notnull" => !field_value.is_null(),
                Value::Bool(b) => field_value.as_bool() == Some(*b),
                _ => false,
            },
        }
    }
}

/// A set of filters combined with AND logic
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub filters: Vec<FilterExpr>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, filter: FilterExpr) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Check if a document matches all filters
    pub fn matches(&self, doc: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}

impl From<Vec<FilterExpr>> for FilterSet {
    fn from(filters: Vec<FilterExpr>) -> Self {
        Self { filters }
    }
}

/// Resolve a `/`-separated member path inside a JSON document
pub fn field_value<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/')
        .try_fold(doc, |current, segment| current.get(segment))
}

/// Equality that treats `1` and `1.0` as the same number
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Total-enough ordering over scalar JSON values.
///
/// Numbers compare numerically, strings lexically, booleans false < true.
/// Mixed or structured types are incomparable (`None`).
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Total ordering used for sorting rows.
///
/// Values rank by type first (null, bool, number, string, array, object),
/// then compare within the type. Arrays compare element-wise, objects by
/// size and then member by member.
pub(crate) fn sort_values(a: &Value, b: &Value) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(l, r)| sort_values(l, r))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()).then_with(|| {
            x.iter()
                .zip(y)
                .map(|((lk, lv), (rk, rv))| lk.cmp(rk).then_with(|| sort_values(lv, rv)))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        }),
        _ => Ordering::Equal,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// SQL-style LIKE: `%` matches any run, `_` matches exactly one char
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some('_') => {
                t += 1;
                p += 1;
            }
            Some(c) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((bp, bt)) => {
                    p = bp + 1;
                    t = bt + 1;
                    backtrack = Some((bp, bt + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eq_filter() {
        let filter = FilterExpr::eq("name", json!("Alice"));

        assert!(filter.matches(&json!({"name": "Alice"})));
        assert!(!filter.matches(&json!({"name": "Bob"})));
    }

    #[test]
    fn test_numeric_eq_ignores_representation() {
        let filter = FilterExpr::eq("age", json!(30));
        assert!(filter.matches(&json!({"age": 30.0})));
    }

    #[test]
    fn test_gt_filter() {
        let filter = FilterExpr::gt("age", json!(18));

        assert!(filter.matches(&json!({"age": 21})));
        assert!(!filter.matches(&json!({"age": 18})));
        assert!(!filter.matches(&json!({"age": "21"})));
    }

    #[test]
    fn test_in_filter() {
        let filter = FilterExpr::in_list("status", vec![json!("active"), json!("pending")]);

        assert!(filter.matches(&json!({"status": "active"})));
        assert!(!filter.matches(&json!({"status": "inactive"})));
    }

    #[test]
    fn test_like_filter() {
        let filter = FilterExpr::new("name", FilterOperator::Like, json!("%son"));

        assert!(filter.matches(&json!({"name": "Johnson"})));
        assert!(!filter.matches(&json!({"name": "Smith"})));

        let filter = FilterExpr::new("code", FilterOperator::Like, json!("A_C%"));
        assert!(filter.matches(&json!({"code": "ABC"})));
        assert!(filter.matches(&json!({"code": "AXCDEF"})));
        assert!(!filter.matches(&json!({"code": "AC"})));
    }

    #[test]
    fn test_is_filter_treats_missing_as_null() {
        let is_null = FilterExpr::new("deleted_at", FilterOperator::Is, Value::Null);
        assert!(is_null.matches(&json!({"name": "x"})));
        assert!(!is_null.matches(&json!({"deleted_at": "2024-01-01"})));

        let not_null = FilterExpr::new("deleted_at", FilterOperator::Is, json!("notnull"));
        assert!(not_null.matches(&json!({"deleted_at": "2024-01-01"})));
    }

    #[test]
    fn test_nested_path() {
        let filter = FilterExpr::eq("address/city", json!("Oslo"));
        assert!(filter.matches(&json!({"address": {"city": "Oslo"}})));
        assert!(!filter.matches(&json!({"address": {"city": "Bergen"}})));
    }

    #[test]
    fn test_filter_set() {
        let filters = FilterSet::new()
            .and(FilterExpr::eq("status", json!("active")))
            .and(FilterExpr::gt("age", json!(18)));

        assert!(filters.matches(&json!({"status": "active", "age": 21})));
        assert!(!filters.matches(&json!({"status": "inactive", "age": 21})));
    }

    #[test]
    fn test_sort_values_ranks_types() {
        let ranked = [json!(null), json!(false), json!(true), json!(-1), json!(2.5), json!(""), json!("a"), json!([]), json!([0]), json!({})];
        for pair in ranked.windows(2) {
            assert_eq!(sort_values(&pair[0], &pair[1]), Ordering::Less, "{} < {}", pair[0], pair[1]);
        }
        assert_eq!(sort_values(&json!(1), &json!(1.0)), Ordering::Equal);
        assert_eq!(compare_values(&json!(1), &json!("1")), None);
    }
}
