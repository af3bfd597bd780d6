//! # stencil-source
//!
//! Collaborators that bring template descriptors onto local disk.
//!
//! Handles:
//! - **Repository**: The published repository list, extra repositories and
//!   the on-disk repository cache.
//! - **Sync**: `git clone` / `git pull` of each repository.
//! - **Discover**: Locating descriptor files inside checkouts.

pub mod discover;
pub mod repository;
pub mod sync;
