//! Repository layer: storage contracts and their SQLite implementations.
//!
//! # Responsibility
//! - Define owner-keyed document storage contracts.
//! - Keep SQL out of the service and engine layers.
//!
//! # Invariants
//! - Repositories move opaque serialized bytes; they never decode documents.
//! - Missing rows surface as `NotFound` rather than database errors.

pub mod document_repo;
