//! Visibility filters over the document tree.
//!
//! # Responsibility
//! - Decide per item whether a view shows it.
//! - Resolve an action's project and context through injected lookups, so
//!   filters never walk the tree themselves.
//!
//! # Invariants
//! - A project or folder is shown whenever any descendant is shown.
//! - Rules that depend on an action's project hide the action when the
//!   project cannot be resolved.

mod search;
mod view;

pub use search::{SearchFilter, SearchFilterError};
pub use view::{UnknownViewKind, ViewFilter, ViewKind};

use crate::model::action::Action;
use crate::model::auditable::Auditable;
use crate::model::context::Context;
use crate::model::document::{Document, ItemRef};
use crate::model::folder::{Folder, FolderItem};
use crate::model::project::Project;
use crate::uid::Uid;
use std::collections::HashMap;

/// Per-kind visibility predicate.
pub trait ShowFilter {
    fn show_action(&self, action: &Action) -> bool;

    fn show_project(&self, project: &Project) -> bool;

    fn show_folder(&self, folder: &Folder) -> bool;

    fn show_context(&self, context: &Context) -> bool;

    fn show(&self, item: ItemRef<'_>) -> bool {
        match item {
            ItemRef::Action(action) => self.show_action(action),
            ItemRef::Project(project) => self.show_project(project),
            ItemRef::Folder(folder) => self.show_folder(folder),
            ItemRef::Context(context) => self.show_context(context),
            ItemRef::ContextList(_) => true,
        }
    }
}

type ProjectLookup<'a> = Box<dyn Fn(&Action) -> Option<&'a Project> + 'a>;
type ContextLookup<'a> = Box<dyn Fn(&Action) -> Option<&'a Context> + 'a>;

/// The two lookups every filter is constructed with.
pub struct Lookups<'a> {
    action_to_project: ProjectLookup<'a>,
    action_to_context: ContextLookup<'a>,
}

impl<'a> Lookups<'a> {
    pub fn new(
        action_to_project: impl Fn(&Action) -> Option<&'a Project> + 'a,
        action_to_context: impl Fn(&Action) -> Option<&'a Context> + 'a,
    ) -> Self {
        Self {
            action_to_project: Box::new(action_to_project),
            action_to_context: Box::new(action_to_context),
        }
    }

    /// Indexes `doc` once so each lookup is a single hash access.
    pub fn from_document(doc: &'a Document) -> Self {
        let projects: HashMap<Uid, &'a Project> = doc
            .actions()
            .into_iter()
            .map(|(action, project)| (action.uid(), project))
            .collect();
        let contexts: HashMap<Uid, &'a Context> = doc
            .contexts()
            .iter()
            .map(|context| (context.uid(), context))
            .collect();
        Self::new(
            move |action| projects.get(&action.uid()).copied(),
            move |action| {
                action
                    .context_uid()
                    .and_then(|uid| contexts.get(&uid).copied())
            },
        )
    }

    pub fn project_of(&self, action: &Action) -> Option<&'a Project> {
        (self.action_to_project)(action)
    }

    /// `None` when the action has no context or it cannot be found.
    pub fn context_of(&self, action: &Action) -> Option<&'a Context> {
        (self.action_to_context)(action)
    }
}

pub(crate) fn any_action_shown(filter: &(impl ShowFilter + ?Sized), project: &Project) -> bool {
    project.items().iter().any(|action| filter.show_action(action))
}

pub(crate) fn any_child_shown(filter: &(impl ShowFilter + ?Sized), folder: &Folder) -> bool {
    folder.items().iter().any(|item| match item {
        FolderItem::Folder(child) => filter.show_folder(child),
        FolderItem::Project(project) => filter.show_project(project),
    })
}
