//! # stencil-common
//!
//! Shared error definitions, configuration, constants, and the canonical
//! template model used across the entire Stencil workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate. The normalizer produces the types in [`types`], the
//! renderer consumes them.

pub mod config;
pub mod constants;
pub mod error;
pub mod json;
pub mod types;
