//! Typed to-do list document model.
//!
//! # Responsibility
//! - Define the auditable entities and the containers holding them.
//! - Define the [`document::Document`] aggregate and its mutation entry points.
//!
//! # Invariants
//! - Every entity carries a nonzero uid unique within its document.
//! - Deletion is a soft-delete flag first; purge removes data later.

pub mod action;
pub mod auditable;
pub mod container;
pub mod context;
pub mod document;
pub mod error;
pub mod folder;
pub mod naming;
pub mod note;
pub mod project;

use auditable::{Audit, Auditable, Timestamp};

/// Picks a name match: the first live candidate, else the most recently created deleted one.
pub(crate) fn pick_by_name_with<T>(
    candidates: impl IntoIterator<Item = T>,
    audit: impl Fn(&T) -> &Audit,
) -> Option<T> {
    let mut newest_deleted: Option<(Timestamp, T)> = None;
    for candidate in candidates {
        let (is_deleted, ctime) = {
            let audit = audit(&candidate);
            (audit.is_deleted(), audit.ctime())
        };
        if !is_deleted {
            return Some(candidate);
        }
        if newest_deleted
            .as_ref()
            .map_or(true, |(newest, _)| ctime > *newest)
        {
            newest_deleted = Some((ctime, candidate));
        }
    }
    newest_deleted.map(|(_, candidate)| candidate)
}

pub(crate) fn pick_by_name<'a, T: Auditable + 'a>(
    candidates: impl IntoIterator<Item = &'a T>,
) -> Option<&'a T> {
    pick_by_name_with(candidates, |candidate| candidate.audit())
}
