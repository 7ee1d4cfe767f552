//! # Query Directives
//!
//! The caller-parsed directive set (filter, order, select, paging, count)
//! and the categories an adapter may refuse to honor.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::filter::{FilterExpr, FilterSet};

/// Kinds of directive that can appear in a directive set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveCategory {
    Filter,
    OrderBy,
    Select,
    Top,
    Skip,
    Count,
}

impl DirectiveCategory {
    pub const ALL: [DirectiveCategory; 6] = [
        Self::Filter,
        Self::OrderBy,
        Self::Select,
        Self::Top,
        Self::Skip,
        Self::Count,
    ];

    fn bit(self) -> u8 {
        match self {
            Self::Filter => 1 << 0,
            Self::OrderBy => 1 << 1,
            Self::Select => 1 << 2,
            Self::Top => 1 << 3,
            Self::Skip => 1 << 4,
            Self::Count => 1 << 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::OrderBy => "orderby",
            Self::Select => "select",
            Self::Top => "top",
            Self::Skip => "skip",
            Self::Count => "count",
        }
    }
}

impl fmt::Display for DirectiveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of directive categories an adapter skips when applying directives.
///
/// Ignored directives are dropped silently; they are not errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DirectiveCategory>", into = "Vec<DirectiveCategory>")]
pub struct IgnoredCategories(u8);

impl IgnoredCategories {
    /// Honor every category
    pub const fn none() -> Self {
        Self(0)
    }

    pub fn with(self, category: DirectiveCategory) -> Self {
        Self(self.0 | category.bit())
    }

    pub fn union(self, other: IgnoredCategories) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(&self, category: DirectiveCategory) -> bool {
        self.0 & category.bit() != 0
    }

    /// Whether a category should be applied
    pub fn honors(&self, category: DirectiveCategory) -> bool {
        !self.contains(category)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = DirectiveCategory> + '_ {
        DirectiveCategory::ALL
            .into_iter()
            .filter(move |c| self.contains(*c))
    }
}

impl FromIterator<DirectiveCategory> for IgnoredCategories {
    fn from_iter<I: IntoIterator<Item = DirectiveCategory>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

impl From<Vec<DirectiveCategory>> for IgnoredCategories {
    fn from(categories: Vec<DirectiveCategory>) -> Self {
        categories.into_iter().collect()
    }
}

impl From<IgnoredCategories> for Vec<DirectiveCategory> {
    fn from(ignored: IgnoredCategories) -> Self {
        ignored.iter().collect()
    }
}

/// Order by clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }
}

/// A parsed directive set for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDirectives {
    /// Filter expressions (AND)
    pub filters: Vec<FilterExpr>,

    /// Order by clauses, most significant first
    pub order: Vec<OrderBy>,

    /// Fields to select (None = all)
    pub select: Option<Vec<String>>,

    /// Requested number of rows
    pub top: Option<usize>,

    /// Number of rows to skip
    pub skip: Option<usize>,

    /// Whether the total matching count was requested
    pub count: bool,
}

impl QueryDirectives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: FilterExpr) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn top(mut self, top: usize) -> Self {
        self.top = Some(top);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }

    pub fn filter_set(&self) -> FilterSet {
        FilterSet::from(self.filters.clone())
    }

    /// Field selection, if one narrows the shape (`*` selects everything)
    pub fn projection(&self) -> Option<&[String]> {
        match &self.select {
            Some(fields) if fields.iter().any(|f| f == "*") => None,
            Some(fields) => Some(fields.as_slice()),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ignored_categories_set_ops() {
        let ignored = IgnoredCategories::none()
            .with(DirectiveCategory::Count)
            .with(DirectiveCategory::Select);

        assert!(ignored.contains(DirectiveCategory::Count));
        assert!(ignored.honors(DirectiveCategory::Filter));
        assert_eq!(
            ignored.iter().collect::<Vec<_>>(),
            vec![DirectiveCategory::Select, DirectiveCategory::Count]
        );
    }

    #[test]
    fn test_ignored_categories_serde_as_list() {
        let ignored: IgnoredCategories = serde_json::from_value(json!(["orderby", "skip"])).unwrap();
        assert!(ignored.contains(DirectiveCategory::OrderBy));
        assert!(ignored.contains(DirectiveCategory::Skip));
        assert_eq!(serde_json::to_value(ignored).unwrap(), json!(["orderby", "skip"]));
    }

    #[test]
    fn test_projection_star_selects_all() {
        let directives = QueryDirectives::new().select(["*"]);
        assert!(directives.projection().is_none());

        let directives = QueryDirectives::new().select(["id", "name"]);
        assert_eq!(directives.projection().unwrap(), ["id", "name"]);
    }
}
