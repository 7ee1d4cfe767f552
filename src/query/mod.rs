//! # Query Module
//!
//! Directive sets, query settings and the pure functions that apply them to
//! a resource's rows.

pub mod apply;
pub mod directives;
pub mod errors;
pub mod filter;
pub mod parser;
pub mod settings;

pub use apply::{apply_to_collection, apply_to_entity, CollectionPage};
pub use directives::{DirectiveCategory, IgnoredCategories, OrderBy, QueryDirectives};
pub use errors::{QueryError, QueryResult};
pub use filter::{FilterExpr, FilterOperator, FilterSet};
pub use settings::{QuerySettings, DEFAULT_PAGE_SIZE};
