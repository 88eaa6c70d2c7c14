//! Document aggregate: the whole of one owner's to-do list.
//!
//! # Responsibility
//! - Own the inbox project, the root folder, the context list and the global notes.
//! - Answer uid, name and path lookups across the tree.
//! - Offer the mutation entry points that span more than one entity.
//!
//! # Invariants
//! - The inbox carries [`INBOX_UID`] and the root folder [`ROOT_FOLDER_UID`].
//! - Uids are unique across every entity, the context list included.
//! - Weak context references resolve to an existing context.

use super::action::Action;
use super::auditable::{Audit, Auditable, Timestamp};
use super::container::{Container, ContainerRef, ContainersPreorder, LeafFirstPath};
use super::context::{Context, ContextList};
use super::error::{DataError, DataResult, DocumentError, DocumentResult, IllegalOperationError};
use super::folder::{Folder, FolderItem};
use super::naming::parse_uid_syntax;
use super::note::NoteMap;
use super::project::Project;
use super::{pick_by_name, pick_by_name_with};
use crate::uid::{Uid, UidSource, INBOX_UID, ROOT_FOLDER_UID};
use std::collections::HashSet;

/// Path separator for [`Document::resolve_path`].
pub const PATH_SEPARATOR: char = '/';

/// Kind of an addressable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Action,
    Project,
    Folder,
    Context,
    ContextList,
}

/// Borrowed view of any addressable item.
#[derive(Debug, Clone, Copy)]
pub enum ItemRef<'a> {
    Action(&'a Action),
    Project(&'a Project),
    Folder(&'a Folder),
    Context(&'a Context),
    ContextList(&'a ContextList),
}

impl<'a> ItemRef<'a> {
    pub fn kind(&self) -> ItemKind {
        match *self {
            Self::Action(_) => ItemKind::Action,
            Self::Project(_) => ItemKind::Project,
            Self::Folder(_) => ItemKind::Folder,
            Self::Context(_) => ItemKind::Context,
            Self::ContextList(_) => ItemKind::ContextList,
        }
    }

    pub fn audit(&self) -> &'a Audit {
        match *self {
            Self::Action(item) => item.audit(),
            Self::Project(item) => item.audit(),
            Self::Folder(item) => item.audit(),
            Self::Context(item) => item.audit(),
            Self::ContextList(item) => item.audit(),
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            Self::Action(item) => item.name(),
            Self::Project(item) => item.name(),
            Self::Folder(item) => item.name(),
            Self::Context(item) => item.name(),
            Self::ContextList(item) => item.name(),
        }
    }

    pub fn uid(&self) -> Uid {
        self.audit().uid()
    }

    pub fn is_deleted(&self) -> bool {
        self.audit().is_deleted()
    }
}

impl<'a> From<ContainerRef<'a>> for ItemRef<'a> {
    fn from(value: ContainerRef<'a>) -> Self {
        match value {
            ContainerRef::Folder(folder) => Self::Folder(folder),
            ContainerRef::Project(project) => Self::Project(project),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    inbox: Project,
    root: Folder,
    ctx_list: ContextList,
    notes: NoteMap,
}

impl Document {
    /// Creates an empty document; registers the fixed uids and allocates one for the context list.
    pub fn new(ids: &dyn UidSource, inbox_name: &str, at: Timestamp) -> DataResult<Self> {
        ids.note_existing_uid(INBOX_UID)?;
        ids.note_existing_uid(ROOT_FOLDER_UID)?;
        let inbox = Project::with_uid(INBOX_UID, inbox_name.to_string(), at)?;
        let root = Folder::with_uid(ROOT_FOLDER_UID, String::new(), at)?;
        let ctx_list = ContextList::new(ids, at)?;
        Ok(Self {
            inbox,
            root,
            ctx_list,
            notes: NoteMap::new(),
        })
    }

    /// Assembles a document from decoded parts, checking the fixed uids.
    pub fn from_parts(
        inbox: Project,
        root: Folder,
        ctx_list: ContextList,
        notes: NoteMap,
    ) -> DataResult<Self> {
        check_fixed_uid("inbox", INBOX_UID, inbox.uid())?;
        check_fixed_uid("root folder", ROOT_FOLDER_UID, root.uid())?;
        Ok(Self {
            inbox,
            root,
            ctx_list,
            notes,
        })
    }

    pub fn inbox(&self) -> &Project {
        &self.inbox
    }

    pub fn root(&self) -> &Folder {
        &self.root
    }

    pub fn ctx_list(&self) -> &ContextList {
        &self.ctx_list
    }

    pub fn notes(&self) -> &NoteMap {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut NoteMap {
        &mut self.notes
    }

    pub fn contexts(&self) -> &[Context] {
        self.ctx_list.items()
    }

    /// The inbox with an empty path, then every container under the root.
    pub fn containers_preorder(&self) -> ContainersPreorder<'_> {
        ContainersPreorder::from_roots(vec![
            (ContainerRef::Project(&self.inbox), Vec::new()),
            (ContainerRef::Folder(&self.root), Vec::new()),
        ])
    }

    /// Every project, the inbox first.
    pub fn projects(&self) -> Vec<(&Project, LeafFirstPath<'_>)> {
        self.containers_preorder()
            .filter_map(|(container, path)| container.as_project().map(|project| (project, path)))
            .collect()
    }

    /// Every folder, the root first.
    pub fn folders(&self) -> Vec<(&Folder, LeafFirstPath<'_>)> {
        self.containers_preorder()
            .filter_map(|(container, path)| container.as_folder().map(|folder| (folder, path)))
            .collect()
    }

    /// Every action with the project holding it.
    pub fn actions(&self) -> Vec<(&Action, &Project)> {
        self.projects()
            .into_iter()
            .flat_map(|(project, _)| project.items().iter().map(move |action| (action, project)))
            .collect()
    }

    /// Actions whose context is `context_uid`; `None` selects actions without one.
    pub fn actions_in_context(&self, context_uid: Option<Uid>) -> Vec<(&Action, &Project)> {
        self.actions()
            .into_iter()
            .filter(|(action, _)| action.context_uid() == context_uid)
            .collect()
    }

    pub fn projects_to_review(&self, now: Timestamp) -> Vec<(&Project, LeafFirstPath<'_>)> {
        self.projects()
            .into_iter()
            .filter(|(project, _)| project.needs_review(now))
            .collect()
    }

    /// Every addressable item: context list, contexts, then containers in preorder with their actions.
    pub fn items(&self) -> Vec<ItemRef<'_>> {
        let mut items = vec![ItemRef::ContextList(&self.ctx_list)];
        items.extend(self.ctx_list.items().iter().map(ItemRef::Context));
        for (container, _) in self.containers_preorder() {
            items.push(container.into());
            if let Some(project) = container.as_project() {
                items.extend(project.items().iter().map(ItemRef::Action));
            }
        }
        items
    }

    pub fn item_by_uid(&self, uid: Uid) -> Option<ItemRef<'_>> {
        self.items().into_iter().find(|item| item.uid() == uid)
    }

    pub fn action_by_uid(&self, uid: Uid) -> Option<(&Action, &Project)> {
        self.actions().into_iter().find(|(action, _)| action.uid() == uid)
    }

    pub fn project_by_uid(&self, uid: Uid) -> Option<(&Project, LeafFirstPath<'_>)> {
        self.projects().into_iter().find(|(project, _)| project.uid() == uid)
    }

    pub fn folder_by_uid(&self, uid: Uid) -> Option<(&Folder, LeafFirstPath<'_>)> {
        self.folders().into_iter().find(|(folder, _)| folder.uid() == uid)
    }

    pub fn context_by_uid(&self, uid: Uid) -> Option<&Context> {
        self.ctx_list.by_uid(uid)
    }

    pub fn action_by_name(&self, name: &str) -> Option<&Action> {
        pick_by_name(
            self.actions()
                .into_iter()
                .map(|(action, _)| action)
                .filter(|action| action.name() == name),
        )
    }

    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        pick_by_name(
            self.projects()
                .into_iter()
                .map(|(project, _)| project)
                .filter(|project| project.name() == name),
        )
    }

    pub fn folder_by_name(&self, name: &str) -> Option<&Folder> {
        pick_by_name(
            self.folders()
                .into_iter()
                .map(|(folder, _)| folder)
                .filter(|folder| folder.name() == name),
        )
    }

    pub fn context_by_name(&self, name: &str) -> Option<&Context> {
        self.ctx_list.by_name(name)
    }

    /// Name lookup across actions, projects, folders and contexts.
    pub fn item_by_name(&self, name: &str) -> Option<ItemRef<'_>> {
        pick_by_name_with(
            self.items().into_iter().filter(|item| {
                item.kind() != ItemKind::ContextList && item.name() == name
            }),
            |item| item.audit(),
        )
    }

    /// Uid of the container holding `uid`. The inbox sits under the root;
    /// the root and the context list have no parent.
    pub fn parent_of(&self, uid: Uid) -> Option<Uid> {
        if uid == INBOX_UID {
            return Some(ROOT_FOLDER_UID);
        }
        if self.ctx_list.by_uid(uid).is_some() {
            return Some(self.ctx_list.uid());
        }
        self.containers_preorder()
            .find(|(container, _)| match container {
                ContainerRef::Folder(folder) => folder.items().iter().any(|item| item.uid() == uid),
                ContainerRef::Project(project) => project.action(uid).is_some(),
            })
            .map(|(container, _)| container.uid())
    }

    /// Resolves a `/`-separated path relative to the container `cwd`.
    ///
    /// Supports `.`, `..`, a leading `/` for the root, the inbox name directly
    /// under the root, and `uid=N` in place of a whole path or any segment.
    pub fn resolve_path(&self, path: &str, cwd: Uid) -> DocumentResult<Uid> {
        if let Some(uid) = parse_uid_syntax(path)? {
            return self
                .item_by_uid(uid)
                .map(|item| item.uid())
                .ok_or(DocumentError::NoSuchUid(uid));
        }
        let mut current = self
            .item_by_uid(cwd)
            .ok_or(DocumentError::NoSuchUid(cwd))?;
        if path.is_empty() {
            return Ok(current.uid());
        }
        for segment in path
            .trim_end_matches(PATH_SEPARATOR)
            .split(PATH_SEPARATOR)
        {
            current = match segment {
                "" => ItemRef::Folder(&self.root),
                "." => current,
                ".." => {
                    let parent = self
                        .parent_of(current.uid())
                        .ok_or_else(|| DocumentError::NoSuchName(path.to_string()))?;
                    self.item_by_uid(parent)
                        .ok_or(DocumentError::NoSuchUid(parent))?
                }
                name => self
                    .child_by_segment(current, name)?
                    .ok_or_else(|| DocumentError::NoSuchName(path.to_string()))?,
            };
        }
        Ok(current.uid())
    }

    fn child_by_segment<'a>(
        &'a self,
        parent: ItemRef<'a>,
        segment: &str,
    ) -> DocumentResult<Option<ItemRef<'a>>> {
        let segment_uid = parse_uid_syntax(segment)?;
        let child = match parent {
            ItemRef::Folder(folder) => {
                if folder.uid() == ROOT_FOLDER_UID {
                    if segment_uid == Some(ROOT_FOLDER_UID) {
                        return Ok(Some(parent));
                    }
                    if segment_uid == Some(INBOX_UID)
                        || (segment_uid.is_none() && segment == self.inbox.name())
                    {
                        return Ok(Some(ItemRef::Project(&self.inbox)));
                    }
                }
                let item = match segment_uid {
                    Some(uid) => folder.items().iter().find(|item| item.uid() == uid),
                    None => pick_by_name(folder.items().iter().filter(|item| item.name() == segment)),
                };
                item.map(|item| ItemRef::from(ContainerRef::from(item)))
            }
            ItemRef::Project(project) => {
                let action = match segment_uid {
                    Some(uid) => project.action(uid),
                    None => pick_by_name(project.items().iter().filter(|action| action.name() == segment)),
                };
                action.map(ItemRef::Action)
            }
            _ => None,
        };
        Ok(child)
    }

    /// Adds a context, rejecting a duplicate name.
    pub fn add_context(&mut self, ids: &dyn UidSource, name: &str, at: Timestamp) -> DocumentResult<Uid> {
        if self.ctx_list.items().iter().any(|context| context.name() == name) {
            return Err(DocumentError::DuplicateContext(name.to_string()));
        }
        let context = Context::new(ids, name, at)?;
        let uid = context.uid();
        self.ctx_list.push(context, at);
        Ok(uid)
    }

    /// Adds a project or folder under the folder `parent_uid` (default: root).
    pub fn add_project_or_folder(
        &mut self,
        item: FolderItem,
        parent_uid: Option<Uid>,
        at: Timestamp,
    ) -> DocumentResult<Uid> {
        let parent_uid = parent_uid.unwrap_or(ROOT_FOLDER_UID);
        if parent_uid == INBOX_UID || self.project_by_uid(parent_uid).is_some() {
            return Err(IllegalOperationError::ProjectCannotContainContainers(parent_uid).into());
        }
        let parent = self
            .folder_mut(parent_uid)
            .ok_or(DocumentError::NoSuchParentFolder(parent_uid))?;
        let uid = item.uid();
        parent.push_item(item, at);
        Ok(uid)
    }

    /// Adds an action to a project.
    ///
    /// Without an explicit context the project's default context applies.
    /// Adding to a complete project reopens it.
    pub fn add_action(
        &mut self,
        ids: &dyn UidSource,
        project_uid: Uid,
        name: &str,
        context_uid: Option<Uid>,
        at: Timestamp,
    ) -> DocumentResult<Uid> {
        if let Some(context_uid) = context_uid {
            self.require_context(context_uid)?;
        }
        let project = self
            .project_mut(project_uid)
            .ok_or(DocumentError::NoSuchUid(project_uid))?;
        if project.is_deleted() {
            return Err(IllegalOperationError::DeletedProject(project_uid).into());
        }
        let context_uid = context_uid.or(project.default_context_uid());
        let action = Action::new(ids, name, context_uid, at)?;
        let uid = action.uid();
        if project.is_complete() {
            project.set_complete(false, at);
        }
        project.push_action(action, at);
        Ok(uid)
    }

    /// Moves an action into a project, or a project/folder into a folder.
    ///
    /// Moving within the same parent keeps the order untouched.
    pub fn move_item(&mut self, uid: Uid, destination: Uid, at: Timestamp) -> DocumentResult<()> {
        if uid == INBOX_UID || uid == ROOT_FOLDER_UID {
            return Err(IllegalOperationError::Immovable(uid).into());
        }
        let (item_kind, item_deleted) = self
            .item_by_uid(uid)
            .map(|item| (item.kind(), item.is_deleted()))
            .ok_or(DocumentError::NoSuchUid(uid))?;
        let (target_kind, target_deleted) = self
            .item_by_uid(destination)
            .map(|target| (target.kind(), target.is_deleted()))
            .ok_or(DocumentError::NoSuchUid(destination))?;
        match (item_kind, target_kind) {
            (ItemKind::Action, ItemKind::Project) => {}
            (ItemKind::Project | ItemKind::Folder, ItemKind::Folder) => {}
            (ItemKind::Project | ItemKind::Folder, ItemKind::Project) => {
                return Err(IllegalOperationError::ProjectCannotContainContainers(destination).into())
            }
            _ => {
                return Err(IllegalOperationError::WrongDestinationKind {
                    item: uid,
                    destination,
                }
                .into())
            }
        }
        if self.would_create_cycle(uid, destination) {
            return Err(IllegalOperationError::MoveIntoSelf(uid).into());
        }
        if !item_deleted && target_deleted {
            return Err(IllegalOperationError::MoveIntoDeleted {
                item: uid,
                container: destination,
            }
            .into());
        }
        let parent = self.parent_of(uid).ok_or(DocumentError::NoSuchUid(uid))?;
        if parent == destination {
            return Ok(());
        }

        if item_kind == ItemKind::Action {
            let action = self
                .project_mut(parent)
                .and_then(|project| project.take_action(uid, at))
                .ok_or(DocumentError::NoSuchUid(uid))?;
            let reopen = !action.is_deleted() && !action.is_complete();
            let project = self
                .project_mut(destination)
                .ok_or(DocumentError::NoSuchUid(destination))?;
            if reopen && project.is_complete() {
                project.set_complete(false, at);
            }
            project.push_action(action, at);
        } else {
            let moving = self
                .folder_mut(parent)
                .and_then(|folder| folder.take_item(uid, at))
                .ok_or(DocumentError::NoSuchUid(uid))?;
            let folder = self
                .folder_mut(destination)
                .ok_or(DocumentError::NoSuchParentFolder(destination))?;
            folder.push_item(moving, at);
        }
        Ok(())
    }

    /// True when `candidate_parent` is `uid` itself or lies beneath it.
    fn would_create_cycle(&self, uid: Uid, candidate_parent: Uid) -> bool {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent);
        while let Some(current) = cursor {
            if current == uid || !visited.insert(current) {
                return true;
            }
            cursor = self.parent_of(current);
        }
        false
    }

    pub fn set_action_context(
        &mut self,
        action_uid: Uid,
        context_uid: Option<Uid>,
        at: Timestamp,
    ) -> DocumentResult<()> {
        if let Some(context_uid) = context_uid {
            self.require_context(context_uid)?;
        }
        self.action_mut(action_uid)
            .ok_or(DocumentError::NoSuchUid(action_uid))?
            .set_context(context_uid, at);
        Ok(())
    }

    pub fn set_default_context(
        &mut self,
        project_uid: Uid,
        context_uid: Option<Uid>,
        at: Timestamp,
    ) -> DocumentResult<()> {
        if let Some(context_uid) = context_uid {
            self.require_context(context_uid)?;
        }
        self.project_mut(project_uid)
            .ok_or(DocumentError::NoSuchUid(project_uid))?
            .set_default_context(context_uid, at);
        Ok(())
    }

    fn require_context(&self, context_uid: Uid) -> DocumentResult<()> {
        self.ctx_list
            .by_uid(context_uid)
            .map(|_| ())
            .ok_or(DocumentError::NoSuchUid(context_uid))
    }

    /// Clears every action context and project default that names `context_uid`.
    pub fn remove_references_to_context(&mut self, context_uid: Uid, at: Timestamp) {
        self.for_each_project_mut(&mut |project: &mut Project| {
            if project.default_context_uid() == Some(context_uid) {
                project.set_default_context(None, at);
            }
            for action in project.items.iter_mut() {
                if action.context_uid() == Some(context_uid) {
                    action.set_context(None, at);
                }
            }
        });
    }

    /// Clears references, soft-deletes the context and renames it out of the way.
    pub fn remove_context(&mut self, context_uid: Uid, at: Timestamp) -> DocumentResult<()> {
        let already_deleted = self
            .context_by_uid(context_uid)
            .ok_or(DocumentError::NoSuchUid(context_uid))?
            .is_deleted();
        self.remove_references_to_context(context_uid, at);
        if already_deleted {
            return Ok(());
        }
        let context = self
            .ctx_list
            .by_uid_mut(context_uid)
            .ok_or(DocumentError::NoSuchUid(context_uid))?;
        let renamed = format!(
            "{}-deleted-at-{}",
            context.name(),
            at.as_micros().div_euclid(1_000_000)
        );
        context.rename(renamed, at)?;
        context.set_deleted(true, at);
        Ok(())
    }

    /// Soft-deletes an action, project or folder through its parent container.
    pub fn delete_item(&mut self, uid: Uid, at: Timestamp) -> DocumentResult<()> {
        if uid == INBOX_UID || uid == ROOT_FOLDER_UID || uid == self.ctx_list.uid() {
            return Err(IllegalOperationError::Irremovable(uid).into());
        }
        let kind = self
            .item_by_uid(uid)
            .map(|item| item.kind())
            .ok_or(DocumentError::NoSuchUid(uid))?;
        if kind == ItemKind::Context {
            return self.remove_context(uid, at);
        }
        let parent = self.parent_of(uid).ok_or(DocumentError::NoSuchUid(uid))?;
        if kind == ItemKind::Action {
            self.project_mut(parent)
                .ok_or(DocumentError::NoSuchUid(parent))?
                .delete_child(uid, at)
        } else {
            self.folder_mut(parent)
                .ok_or(DocumentError::NoSuchParentFolder(parent))?
                .delete_child(uid, at)
        }
    }

    /// Soft-deletes complete actions and complete projects with nothing left to do.
    pub fn delete_completed(&mut self, at: Timestamp) {
        self.inbox.delete_completed(at);
        self.root.delete_completed(at);
        self.ctx_list.delete_completed(at);
    }

    /// Physically removes deleted items with no live descendant.
    ///
    /// References to purged contexts are cleared.
    pub fn purge_deleted(&mut self, at: Timestamp) {
        self.inbox.purge_deleted();
        self.root.purge_deleted();
        let before: Vec<Uid> = self.ctx_list.items().iter().map(|context| context.uid()).collect();
        self.ctx_list.purge_deleted();
        for context_uid in before {
            if self.ctx_list.by_uid(context_uid).is_none() {
                self.remove_references_to_context(context_uid, at);
            }
        }
    }

    /// Checks uid uniqueness, timestamps and weak references across the document.
    pub fn check_is_well_formed(&self) -> DataResult<()> {
        check_fixed_uid("inbox", INBOX_UID, self.inbox.uid())?;
        check_fixed_uid("root folder", ROOT_FOLDER_UID, self.root.uid())?;
        let mut uids = HashSet::new();
        for item in self.items() {
            item.audit().validate()?;
            if !uids.insert(item.uid()) {
                return Err(DataError::DuplicateUid(item.uid()));
            }
        }
        let context_uids: HashSet<Uid> =
            self.ctx_list.items().iter().map(|context| context.uid()).collect();
        let dangling = |holder: Uid, reference: Option<Uid>| match reference {
            Some(context) if !context_uids.contains(&context) => {
                Err(DataError::DanglingContextReference { holder, context })
            }
            _ => Ok(()),
        };
        for (project, _) in self.projects() {
            dangling(project.uid(), project.default_context_uid())?;
            for action in project.items() {
                dangling(action.uid(), action.context_uid())?;
            }
        }
        Ok(())
    }

    pub(crate) fn project_mut(&mut self, uid: Uid) -> Option<&mut Project> {
        if uid == INBOX_UID {
            return Some(&mut self.inbox);
        }
        find_project_mut(&mut self.root, uid)
    }

    pub(crate) fn folder_mut(&mut self, uid: Uid) -> Option<&mut Folder> {
        find_folder_mut(&mut self.root, uid)
    }

    pub(crate) fn action_mut(&mut self, uid: Uid) -> Option<&mut Action> {
        let project = self.parent_of(uid)?;
        self.project_mut(project)?.action_mut(uid)
    }

    pub(crate) fn context_mut(&mut self, uid: Uid) -> Option<&mut Context> {
        self.ctx_list.by_uid_mut(uid)
    }

    fn for_each_project_mut(&mut self, visit: &mut dyn FnMut(&mut Project)) {
        visit(&mut self.inbox);
        visit_projects_mut(&mut self.root, visit);
    }
}

fn check_fixed_uid(role: &'static str, expected: Uid, actual: Uid) -> DataResult<()> {
    if expected != actual {
        return Err(DataError::UnexpectedUid {
            role,
            expected,
            actual,
        });
    }
    Ok(())
}

fn find_folder_mut(folder: &mut Folder, uid: Uid) -> Option<&mut Folder> {
    if folder.uid() == uid {
        return Some(folder);
    }
    folder.items.iter_mut().find_map(|item| match item {
        FolderItem::Folder(child) => find_folder_mut(child, uid),
        FolderItem::Project(_) => None,
    })
}

fn find_project_mut(folder: &mut Folder, uid: Uid) -> Option<&mut Project> {
    folder.items.iter_mut().find_map(|item| match item {
        FolderItem::Folder(child) => find_project_mut(child, uid),
        FolderItem::Project(project) if project.uid() == uid => Some(project),
        FolderItem::Project(_) => None,
    })
}

fn visit_projects_mut(folder: &mut Folder, visit: &mut dyn FnMut(&mut Project)) {
    for item in folder.items.iter_mut() {
        match item {
            FolderItem::Folder(child) => visit_projects_mut(child, visit),
            FolderItem::Project(project) => visit(project),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use crate::model::auditable::Timestamp;
    use crate::model::folder::Folder;
    use crate::uid::{UidAllocator, ROOT_FOLDER_UID};

    #[test]
    fn cycle_check_walks_up_from_the_destination() {
        let ids = UidAllocator::sequential();
        let at = Timestamp::EPOCH;
        let mut doc = Document::new(&ids, "inbox", at).unwrap();
        let outer = doc
            .add_project_or_folder(Folder::new(&ids, "outer", at).unwrap().into(), None, at)
            .unwrap();
        let inner = doc
            .add_project_or_folder(Folder::new(&ids, "inner", at).unwrap().into(), Some(outer), at)
            .unwrap();
        assert!(doc.would_create_cycle(outer, inner));
        assert!(doc.would_create_cycle(outer, outer));
        assert!(!doc.would_create_cycle(inner, ROOT_FOLDER_UID));
    }
}
