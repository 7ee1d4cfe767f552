//! # Resource Endpoint Module
//!
//! Request-level state machines over a [`ResourceAdapter`] and their HTTP
//! framing.
//!
//! | Request | Steps | Success |
//! |---------|-------|---------|
//! | collection fetch | apply directives | `Accepted(page)` |
//! | single fetch | lookup, shape | `Accepted(entity)` |
//! | delete | lookup, remove, persist | `AcceptedEmpty` |
//! | create | insert, persist | `Created(entity)` |
//! | patch | lookup, merge + update, persist | `Updated(entity)` |
//! | put | update, persist | `Updated(entity)` |
//!
//! [`ResourceAdapter`]: crate::adapter::ResourceAdapter

#[allow(clippy::module_inception)]
pub mod endpoint;
pub mod outcome;
pub mod server;

pub use endpoint::{EndpointResult, ResourceEndpoint};
pub use outcome::{Outcome, Rejection};
pub use server::{resource_router, ErrorResponse};
