//! # Resource Adapter Module
//!
//! Query-directive application and CRUD orchestration for any [`Resource`]
//! over an injected store.
//!
//! ## Seams
//!
//! - [`ResourceStore`] - store-specific lookup, create, update, delete, persist
//! - [`QueryScope`] - mandatory base restriction applied before directives
//!
//! [`Resource`]: crate::resource::Resource

#[allow(clippy::module_inception)]
pub mod adapter;
pub mod errors;
pub mod memory;
pub mod scope;
pub mod store;

pub use adapter::ResourceAdapter;
pub use errors::{AdapterError, AdapterResult};
pub use memory::InMemoryStore;
pub use scope::{Prepared, QueryScope, RestrictionScope, Unscoped};
pub use store::{ResourceStore, StoreError, StoreResult};
