//! # stencil-compose
//!
//! Renders normalized templates as annotated `docker-compose.yml` files.
//!
//! Handles:
//! - **Sanitize**: The service identifier and folder-name policies.
//! - **Render**: Byte-stable service definitions with comment blocks.
//! - **Writer**: Per-(app, author) output with `.old` backups.
//! - **Index**: The map of generated directories.

pub mod index;
pub mod render;
pub mod sanitize;
pub mod writer;
