//! Shared container behavior for folders, projects and the context list.
//!
//! # Responsibility
//! - Soft-delete children only when nothing below them is still live.
//! - Purge deleted subtrees and delete completed work.
//! - Walk containers in preorder with their leaf-first folder path.
//!
//! # Invariants
//! - Child kinds are fixed by the item types: folders hold [`FolderItem`],
//!   projects hold actions, the context list holds contexts.
//! - Deleting a child never touches its name or note.

use super::auditable::{Auditable, Timestamp};
use super::context::ContextList;
use super::error::{DataError, DocumentResult, IllegalOperationError};
use super::folder::{Folder, FolderItem};
use super::project::Project;
use crate::uid::Uid;

/// Operations common to every container.
pub trait Container: Auditable {
    /// Uid of some non-deleted descendant, searched depth-first.
    fn first_live_descendant(&self) -> Option<Uid>;

    /// Drops deleted children with no live descendant, then recurses into survivors.
    fn purge_deleted(&mut self);

    /// Marks deleted every complete child with no incomplete, live descendant; recurses.
    fn delete_completed(&mut self, at: Timestamp);

    /// Soft-deletes the direct child `child`.
    ///
    /// Fails with [`IllegalOperationError::UndeletedDescendant`] while any
    /// descendant of `child` is live, and with [`DataError::NotAChild`] when
    /// `child` does not belong to this container.
    fn delete_child(&mut self, child: Uid, at: Timestamp) -> DocumentResult<()>;

    fn has_live_descendant(&self) -> bool {
        self.first_live_descendant().is_some()
    }
}

impl FolderItem {
    pub fn first_live_descendant(&self) -> Option<Uid> {
        match self {
            Self::Folder(folder) => folder.first_live_descendant(),
            Self::Project(project) => project.first_live_descendant(),
        }
    }

    fn purge_deleted(&mut self) {
        match self {
            Self::Folder(folder) => folder.purge_deleted(),
            Self::Project(project) => project.purge_deleted(),
        }
    }

    fn delete_completed(&mut self, at: Timestamp) {
        match self {
            Self::Folder(folder) => folder.delete_completed(at),
            Self::Project(project) => project.delete_completed(at),
        }
    }
}

impl Container for Folder {
    fn first_live_descendant(&self) -> Option<Uid> {
        self.items.iter().find_map(|item| {
            if item.is_deleted() {
                item.first_live_descendant()
            } else {
                Some(item.uid())
            }
        })
    }

    fn purge_deleted(&mut self) {
        self.items
            .retain(|item| !item.is_deleted() || item.first_live_descendant().is_some());
        for item in &mut self.items {
            item.purge_deleted();
        }
    }

    fn delete_completed(&mut self, at: Timestamp) {
        for item in &mut self.items {
            if let FolderItem::Project(project) = item {
                if project.is_complete() && !project.is_deleted() && !has_unfinished_action(project)
                {
                    project.set_deleted(true, at);
                }
            }
            item.delete_completed(at);
        }
    }

    fn delete_child(&mut self, child: Uid, at: Timestamp) -> DocumentResult<()> {
        let container = self.uid();
        let item = self
            .items
            .iter_mut()
            .find(|item| item.uid() == child)
            .ok_or(DataError::NotAChild { container, child })?;
        if let Some(descendant) = item.first_live_descendant() {
            return Err(IllegalOperationError::UndeletedDescendant {
                target: child,
                descendant,
            }
            .into());
        }
        item.set_deleted(true, at);
        Ok(())
    }
}

impl Container for Project {
    fn first_live_descendant(&self) -> Option<Uid> {
        self.items
            .iter()
            .find(|action| !action.is_deleted())
            .map(|action| action.uid())
    }

    fn purge_deleted(&mut self) {
        self.items.retain(|action| !action.is_deleted());
    }

    fn delete_completed(&mut self, at: Timestamp) {
        for action in &mut self.items {
            if action.is_complete() && !action.is_deleted() {
                action.set_deleted(true, at);
            }
        }
    }

    fn delete_child(&mut self, child: Uid, at: Timestamp) -> DocumentResult<()> {
        let container = self.uid();
        let action = self
            .action_mut(child)
            .ok_or(DataError::NotAChild { container, child })?;
        action.set_deleted(true, at);
        Ok(())
    }
}

impl Container for ContextList {
    fn first_live_descendant(&self) -> Option<Uid> {
        self.items
            .iter()
            .find(|context| !context.is_deleted())
            .map(|context| context.uid())
    }

    fn purge_deleted(&mut self) {
        self.items.retain(|context| !context.is_deleted());
    }

    fn delete_completed(&mut self, _at: Timestamp) {}

    fn delete_child(&mut self, child: Uid, at: Timestamp) -> DocumentResult<()> {
        let container = self.uid();
        let context = self
            .by_uid_mut(child)
            .ok_or(DataError::NotAChild { container, child })?;
        context.set_deleted(true, at);
        Ok(())
    }
}

fn has_unfinished_action(project: &Project) -> bool {
    project
        .items()
        .iter()
        .any(|action| !action.is_complete() && !action.is_deleted())
}

/// Borrowed folder or project.
#[derive(Debug, Clone, Copy)]
pub enum ContainerRef<'a> {
    Folder(&'a Folder),
    Project(&'a Project),
}

impl<'a> ContainerRef<'a> {
    pub fn uid(&self) -> Uid {
        match *self {
            Self::Folder(folder) => folder.uid(),
            Self::Project(project) => project.uid(),
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            Self::Folder(folder) => folder.name(),
            Self::Project(project) => project.name(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        match *self {
            Self::Folder(folder) => folder.is_deleted(),
            Self::Project(project) => project.is_deleted(),
        }
    }

    pub fn as_folder(&self) -> Option<&'a Folder> {
        match *self {
            Self::Folder(folder) => Some(folder),
            Self::Project(_) => None,
        }
    }

    pub fn as_project(&self) -> Option<&'a Project> {
        match *self {
            Self::Project(project) => Some(project),
            Self::Folder(_) => None,
        }
    }
}

impl<'a> From<&'a FolderItem> for ContainerRef<'a> {
    fn from(value: &'a FolderItem) -> Self {
        match value {
            FolderItem::Folder(folder) => Self::Folder(folder),
            FolderItem::Project(project) => Self::Project(project),
        }
    }
}

/// Folder path of a container, nearest parent first.
pub type LeafFirstPath<'a> = Vec<&'a Folder>;

/// Lazy preorder walk yielding each container with its leaf-first path.
///
/// Call `containers_preorder` again for a fresh walk.
#[derive(Debug, Clone)]
pub struct ContainersPreorder<'a> {
    stack: Vec<(ContainerRef<'a>, LeafFirstPath<'a>)>,
}

impl<'a> ContainersPreorder<'a> {
    /// Walks `roots` in the given order, each with its starting path.
    pub(crate) fn from_roots(roots: Vec<(ContainerRef<'a>, LeafFirstPath<'a>)>) -> Self {
        let mut stack = roots;
        stack.reverse();
        Self { stack }
    }
}

impl<'a> Iterator for ContainersPreorder<'a> {
    type Item = (ContainerRef<'a>, LeafFirstPath<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (container, path) = self.stack.pop()?;
        if let ContainerRef::Folder(folder) = container {
            for item in folder.items().iter().rev() {
                let mut child_path = Vec::with_capacity(path.len() + 1);
                child_path.push(folder);
                child_path.extend(path.iter().copied());
                self.stack.push((ContainerRef::from(item), child_path));
            }
        }
        Some((container, path))
    }
}

impl Folder {
    /// This folder first, then every folder and project below it.
    pub fn containers_preorder(&self) -> ContainersPreorder<'_> {
        ContainersPreorder::from_roots(vec![(ContainerRef::Folder(self), Vec::new())])
    }

    /// Every project below this folder with its leaf-first path.
    pub fn projects(&self) -> impl Iterator<Item = (&Project, LeafFirstPath<'_>)> {
        self.containers_preorder()
            .filter_map(|(container, path)| container.as_project().map(|project| (project, path)))
    }
}

impl Project {
    /// A project holds no containers, so the walk yields only itself.
    pub fn containers_preorder(&self) -> ContainersPreorder<'_> {
        ContainersPreorder::from_roots(vec![(ContainerRef::Project(self), Vec::new())])
    }
}

#[cfg(test)]
mod tests {
    use super::{Container, ContainerRef};
    use crate::model::action::Action;
    use crate::model::auditable::{Auditable, Timestamp};
    use crate::model::folder::{Folder, FolderItem};
    use crate::model::project::Project;
    use crate::uid::UidAllocator;

    fn tree(ids: &UidAllocator) -> Folder {
        let at = Timestamp::EPOCH;
        let mut top = Folder::new(ids, "top", at).unwrap();
        let mut sub = Folder::new(ids, "sub", at).unwrap();
        let mut project = Project::new(ids, "p", at).unwrap();
        project.push_action(Action::new(ids, "a", None, at).unwrap(), at);
        sub.push_item(FolderItem::Project(project), at);
        top.push_item(FolderItem::Folder(sub), at);
        top.push_item(FolderItem::Project(Project::new(ids, "q", at).unwrap()), at);
        top
    }

    #[test]
    fn preorder_yields_self_first_with_leaf_first_paths() {
        let ids = UidAllocator::sequential();
        let top = tree(&ids);
        let walk: Vec<(String, Vec<String>)> = top
            .containers_preorder()
            .map(|(container, path)| {
                (
                    container.name().to_string(),
                    path.iter().map(|folder| folder.name().to_string()).collect(),
                )
            })
            .collect();
        assert_eq!(
            walk,
            vec![
                ("top".to_string(), vec![]),
                ("sub".to_string(), vec!["top".to_string()]),
                ("p".to_string(), vec!["sub".to_string(), "top".to_string()]),
                ("q".to_string(), vec!["top".to_string()]),
            ]
        );
        assert_eq!(top.containers_preorder().count(), 4);
    }

    #[test]
    fn deep_live_descendant_blocks_deletion() {
        let ids = UidAllocator::sequential();
        let mut top = tree(&ids);
        let sub_uid = top.items()[0].uid();
        if let FolderItem::Folder(sub) = &mut top.items[0] {
            let project_uid = sub.items()[0].uid();
            sub.items[0].set_deleted(true, Timestamp::EPOCH);
            assert_eq!(sub.first_live_descendant().map(|uid| uid != project_uid), Some(true));
        }
        assert!(top.delete_child(sub_uid, Timestamp::EPOCH).is_err());
        assert!(!top.items()[0].is_deleted());
    }

    #[test]
    fn project_ref_is_its_own_only_container() {
        let ids = UidAllocator::sequential();
        let project = Project::new(&ids, "solo", Timestamp::EPOCH).unwrap();
        let walk: Vec<_> = project.containers_preorder().collect();
        assert_eq!(walk.len(), 1);
        assert!(matches!(walk[0].0, ContainerRef::Project(p) if p.uid() == project.uid()));
    }
}
