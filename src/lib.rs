//! aeroresource - query-directive application and CRUD mediation for
//! arbitrary resource types
//!
//! - `query`: directive sets, settings and the pure applier
//! - `resource`: the entity capability, scoped queryables and patch deltas
//! - `adapter`: CRUD orchestration over an injected store
//! - `endpoint`: per-request state machines and HTTP framing
//! - `cli`: configuration, logging and the serving binary

pub mod adapter;
pub mod cli;
pub mod endpoint;
pub mod query;
pub mod resource;
