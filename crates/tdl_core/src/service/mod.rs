//! Use-case layer over the document engine.
//!
//! # Responsibility
//! - Turn user-level edits into journaled [`command::Command`] values.
//! - Own a loaded document, its allocator and its undo history ([`session::Session`]).
//! - Move sessions in and out of a document repository.

pub mod command;
pub mod document_service;
pub mod session;
