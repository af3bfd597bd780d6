//! # stencil-template
//!
//! Turns third-party container-template descriptors into the canonical
//! [`Template`](stencil_common::types::Template) model.
//!
//! Handles:
//! - **Parser**: XML element tree, dialect detection, and normalization of
//!   one descriptor into a single (app, author) catalog fragment.
//! - **Aggregate**: Merging many descriptors per author into one catalog,
//!   isolating per-descriptor failures.
//! - **Store**: Loading and persisting the catalog as JSON.

pub mod aggregate;
pub mod parser;
pub mod store;
