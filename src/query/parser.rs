//! # Query Parameter Reader
//!
//! Reads request query parameters into a [`QueryDirectives`] set.
//!
//! ```text
//! ?select=id,name&order=age.desc,name&top=20&skip=40&count=true&status=in.(open,held)
//! ```
//!
//! `$`-prefixed spellings (`$select`, `$orderby`, `$top`, `$skip`, `$count`)
//! are accepted as aliases; any other `$` option is rejected. Two spellings
//! of one directive in the same request are rejected. Every other parameter
//! is read as a filter.

use std::collections::HashMap;

use serde_json::Value;

use super::directives::{OrderBy, QueryDirectives};
use super::errors::{QueryError, QueryResult};
use super::filter::{FilterExpr, FilterOperator};

impl QueryDirectives {
    /// Parse query parameters from a HashMap
    pub fn parse(params: &HashMap<String, String>) -> QueryResult<Self> {
        let mut result = QueryDirectives::default();
        let mut seen: HashMap<&'static str, &str> = HashMap::new();

        // Sorted so filters and error messages do not follow hash order
        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();

        for key in keys {
            let value = &params[key];
            let directive = directive_name(key)?;

            if let Some(name) = directive {
                if let Some(previous) = seen.insert(name, key.as_str()) {
                    return Err(QueryError::InvalidParam(format!(
                        "conflicting parameters {} and {}",
                        previous, key
                    )));
                }
            }

            match directive {
                Some("select") => result.select = Some(parse_select(value)?),
                Some("order") => result.order = parse_order(value)?,
                Some("top") => result.top = Some(parse_count_param("top", value)?),
                Some("skip") => result.skip = Some(parse_count_param("skip", value)?),
                Some("count") => result.count = parse_bool_param("count", value)?,
                _ => result.filters.push(parse_filter(key, value)?),
            }
        }

        Ok(result)
    }
}

/// Canonical directive a parameter spells, `None` for a filter
fn directive_name(key: &str) -> QueryResult<Option<&'static str>> {
    let name = key.strip_prefix('$').unwrap_or(key);
    let directive = match name {
        "select" => Some("select"),
        "order" | "orderby" => Some("order"),
        "top" | "limit" => Some("top"),
        "skip" | "offset" => Some("skip"),
        "count" => Some("count"),
        _ => None,
    };

    if directive.is_none() && key.starts_with('$') {
        return Err(QueryError::InvalidParam(format!(
            "unsupported system option: {}",
            key
        )));
    }
    Ok(directive)
}

/// Parse select parameter (comma-separated field list)
fn parse_select(value: &str) -> QueryResult<Vec<String>> {
    let fields: Vec<String> = value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if fields.is_empty() {
        return Err(QueryError::InvalidParam("select cannot be empty".to_string()));
    }

    Ok(fields)
}

/// Parse order parameter (comma-separated `field.direction` or `field direction`)
fn parse_order(value: &str) -> QueryResult<Vec<OrderBy>> {
    let mut orders = Vec::new();

    for part in value.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        // A trailing `.asc`/`.desc` (or space form) is a direction, anything
        // else is part of the field name
        let split = part.rsplit_once(' ').or_else(|| part.rsplit_once('.'));
        let order = match split {
            Some((field, direction)) if !field.trim().is_empty() => {
                match direction.trim().to_lowercase().as_str() {
                    "asc" => OrderBy::asc(field.trim()),
                    "desc" => OrderBy::desc(field.trim()),
                    _ => OrderBy::asc(part),
                }
            }
            _ => OrderBy::asc(part),
        };

        orders.push(order);
    }

    Ok(orders)
}

fn parse_count_param(name: &str, value: &str) -> QueryResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| QueryError::InvalidParam(format!("Invalid {}: {}", name, value)))
}

fn parse_bool_param(name: &str, value: &str) -> QueryResult<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(QueryError::InvalidParam(format!(
            "Invalid {}: {}",
            name, other
        ))),
    }
}

/// Parse a filter expression from `field=op.value`
fn parse_filter(field: &str, value: &str) -> QueryResult<FilterExpr> {
    if field.is_empty() {
        return Err(QueryError::InvalidFilter(format!(
            "filter without a field: {}",
            value
        )));
    }

    let (operator, raw) = match value.split_once('.') {
        Some((prefix, rest)) => match FilterOperator::from_prefix(prefix) {
            Some(op) => (op, rest),
            // No known operator, the whole value is an equality operand
            None => (FilterOperator::Eq, value),
        },
        None => (FilterOperator::Eq, value),
    };

    let operand = match operator {
        FilterOperator::In => parse_list(raw)?,
        FilterOperator::Is => match raw {
            "null" => Value::Null,
            "notnull" => Value::String("notnull".to_string()),
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => {
                return Err(QueryError::InvalidFilter(format!(
                    "is.{} on {}: expected null, notnull, true or false",
                    other, field
                )))
            }
        },
        _ => parse_scalar(raw),
    };

    Ok(FilterExpr::new(field, operator, operand))
}

/// Parse `(a,b,c)` into a JSON array of typed scalars
fn parse_list(value: &str) -> QueryResult<Value> {
    let inner = value
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| QueryError::InvalidFilter(format!("in expects (a,b,...): {}", value)))?;

    let items = inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_scalar)
        .collect();

    Ok(Value::Array(items))
}

/// Parse a scalar operand: null, bool, integer, float, else string
fn parse_scalar(value: &str) -> Value {
    match value {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(n) = value.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(num) = value
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        return Value::Number(num);
    }

    // Quoted strings keep numeric-looking text as text
    let unquoted = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value);
    Value::String(unquoted.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_select() {
        let fields = parse_select("id, name ,email").unwrap();
        assert_eq!(fields, vec!["id", "name", "email"]);
        assert!(parse_select(" , ").is_err());
    }

    #[test]
    fn test_parse_order() {
        let orders = parse_order("created_at.desc,name.asc,age").unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0], OrderBy::desc("created_at"));
        assert_eq!(orders[1], OrderBy::asc("name"));
        assert_eq!(orders[2], OrderBy::asc("age"));

        assert_eq!(parse_order("name desc").unwrap(), vec![OrderBy::desc("name")]);
        assert_eq!(parse_order("a.b").unwrap(), vec![OrderBy::asc("a.b")]);
        assert_eq!(parse_order("meta.created.desc").unwrap(), vec![OrderBy::desc("meta.created")]);
        assert_eq!(parse_order("a.b desc").unwrap(), vec![OrderBy::desc("a.b")]);
    }

    #[test]
    fn test_parse_filter() {
        let filter = parse_filter("age", "gt.18").unwrap();
        assert_eq!(filter.operator, FilterOperator::Gt);
        assert_eq!(filter.value, json!(18));

        let eq_filter = parse_filter("name", "John").unwrap();
        assert_eq!(eq_filter.operator, FilterOperator::Eq);
        assert_eq!(eq_filter.value, json!("John"));

        let dotted = parse_filter("host", "example.com").unwrap();
        assert_eq!(dotted.operator, FilterOperator::Eq);
        assert_eq!(dotted.value, json!("example.com"));
    }

    #[test]
    fn test_parse_in_filter() {
        let filter = parse_filter("status", "in.(active,pending,3)").unwrap();
        assert_eq!(filter.operator, FilterOperator::In);
        assert_eq!(filter.value, json!(["active", "pending", 3]));
        assert!(parse_filter("status", "in.active").is_err());
    }

    #[test]
    fn test_parse_is_filter() {
        assert_eq!(parse_filter("x", "is.null").unwrap().value, Value::Null);
        assert!(parse_filter("x", "is.maybe").is_err());
    }

    #[test]
    fn test_quoted_scalar_stays_string() {
        assert_eq!(parse_scalar("'42'"), json!("42"));
        assert_eq!(parse_scalar("42"), json!(42));
        assert_eq!(parse_scalar("4.5"), json!(4.5));
    }

    #[test]
    fn test_full_directive_set() {
        let query = QueryDirectives::parse(&params(&[
            ("$select", "id,name"),
            ("$orderby", "name asc"),
            ("$top", "20"),
            ("skip", "10"),
            ("count", "true"),
            ("status", "eq.active"),
        ]))
        .unwrap();

        assert_eq!(query.select, Some(vec!["id".to_string(), "name".to_string()]));
        assert_eq!(query.order, vec![OrderBy::asc("name")]);
        assert_eq!(query.top, Some(20));
        assert_eq!(query.skip, Some(10));
        assert!(query.count);
        assert_eq!(query.filters, vec![FilterExpr::eq("status", json!("active"))]);
    }

    #[test]
    fn test_large_top_is_not_rejected() {
        let query = QueryDirectives::parse(&params(&[("top", "5000")])).unwrap();
        assert_eq!(query.top, Some(5000));
    }

    #[test]
    fn test_invalid_paging() {
        let result = QueryDirectives::parse(&params(&[("top", "abc")]));
        assert!(matches!(result, Err(QueryError::InvalidParam(_))));
        let result = QueryDirectives::parse(&params(&[("count", "yes")]));
        assert!(matches!(result, Err(QueryError::InvalidParam(_))));
    }

    #[test]
    fn test_unknown_system_option_is_rejected() {
        for key in ["$expand", "$format", "$filter"] {
            let result = QueryDirectives::parse(&params(&[(key, "Orders")]));
            match result {
                Err(QueryError::InvalidParam(msg)) => assert!(msg.contains(key)),
                other => panic!("expected InvalidParam for {}, got {:?}", key, other),
            }
        }

        // Known aliases still parse
        let query = QueryDirectives::parse(&params(&[("$limit", "3")])).unwrap();
        assert_eq!(query.top, Some(3));
    }

    #[test]
    fn test_conflicting_aliases_are_rejected() {
        let cases: [&[(&str, &str)]; 3] = [
            &[("top", "1"), ("$top", "2")],
            &[("skip", "1"), ("offset", "2")],
            &[("order", "a"), ("$orderby", "b")],
        ];
        for pairs in cases {
            let result = QueryDirectives::parse(&params(pairs));
            assert!(matches!(result, Err(QueryError::InvalidParam(_))), "{:?}", pairs);
        }

        let first = QueryDirectives::parse(&params(&[("top", "1"), ("$top", "2")]));
        let second = QueryDirectives::parse(&params(&[("$top", "2"), ("top", "1")]));
        assert_eq!(first, second);
    }
}
