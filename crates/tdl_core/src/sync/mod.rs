//! Reconciliation of a stored document with a copy edited elsewhere.

pub mod merge;

pub use merge::{merge, MergeError};
