//! TaskPaper export.
//!
//! # Responsibility
//! - Render every project a filter shows, with the actions it shows, as
//!   TaskPaper lines.
//!
//! # Invariants
//! - The inbox comes first; other projects sort by folder path, then name.
//! - Output never depends on uids, so equal documents render equally.

use crate::filter::ShowFilter;
use crate::model::action::Action;
use crate::model::auditable::Auditable;
use crate::model::container::LeafFirstPath;
use crate::model::document::{Document, PATH_SEPARATOR};
use crate::model::project::Project;
use crate::uid::INBOX_UID;
use log::debug;

/// Renders the document as TaskPaper lines; every project starts with a blank line.
pub fn as_taskpaper_lines(doc: &Document, filter: &dyn ShowFilter) -> Vec<String> {
    let mut projects: Vec<(&Project, LeafFirstPath<'_>)> = doc
        .projects()
        .into_iter()
        .filter(|(project, _)| filter.show_project(project))
        .collect();
    projects.sort_by_cached_key(|(project, path)| sort_key(project, path));

    let mut lines = Vec::new();
    for (project, path) in &projects {
        lines.push(String::new());
        lines.push(format!("{}{}:", project_prefix(project, path), project.name()));
        if !project.note().is_empty() {
            let note = project.note().replace('\r', "").replace("\\n", ", ");
            lines.extend(note.split('\n').map(str::to_string));
        }
        for action in project.items() {
            if filter.show_action(action) {
                lines.push(format!("\t- {}", action_text(doc, action)));
            }
        }
    }
    debug!(
        "event=export module=export status=ok format=taskpaper projects={} lines={}",
        projects.len(),
        lines.len()
    );
    lines
}

/// [`as_taskpaper_lines`] joined with newlines.
pub fn as_taskpaper(doc: &Document, filter: &dyn ShowFilter) -> String {
    as_taskpaper_lines(doc, filter).join("\n")
}

fn folder_path(path: &LeafFirstPath<'_>) -> String {
    let separator = PATH_SEPARATOR.to_string();
    path.iter()
        .rev()
        .map(|folder| folder.name())
        .collect::<Vec<_>>()
        .join(separator.as_str())
}

fn sort_key(project: &Project, path: &LeafFirstPath<'_>) -> String {
    if project.uid() == INBOX_UID {
        return String::new();
    }
    format!("{}{}{}", folder_path(path), PATH_SEPARATOR, project.name())
}

fn project_prefix(project: &Project, path: &LeafFirstPath<'_>) -> String {
    let mut prefix = folder_path(path);
    if !prefix.is_empty() && !prefix.ends_with(PATH_SEPARATOR) {
        prefix.push(PATH_SEPARATOR);
    }
    if project.is_deleted() {
        prefix.insert_str(0, "@deleted ");
    }
    if project.is_complete() {
        prefix.insert_str(0, "@done ");
    }
    if !project.is_active() {
        prefix.insert_str(0, "@inactive ");
    }
    prefix
}

fn action_text(doc: &Document, action: &Action) -> String {
    let mut text = action.name().to_string();
    if !action.note().is_empty() {
        let note = action.note().replace('\r', "").replace("\\n", "\n");
        let note = note.trim_matches('\n');
        text.push_str("\tnote: ");
        text.push_str(&note.split('\n').collect::<Vec<_>>().join("\t"));
    }
    if let Some(context) = action
        .context_uid()
        .and_then(|uid| doc.context_by_uid(uid))
    {
        let tag = context.name().replace(' ', "_");
        let tag = if tag.starts_with('@') {
            tag
        } else {
            format!("@{tag}")
        };
        if !action.name().contains(&tag) {
            text.push(' ');
            text.push_str(&tag);
        }
    }
    if action.is_complete() || action.is_deleted() {
        text.push_str(" @done");
    }
    if action.is_deleted() {
        text.push_str(" @deleted");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::{folder_path, sort_key};
    use crate::model::auditable::Timestamp;
    use crate::model::document::Document;
    use crate::model::folder::Folder;
    use crate::model::project::Project;
    use crate::uid::UidAllocator;

    #[test]
    fn nested_paths_keep_the_nameless_root() {
        let ids = UidAllocator::sequential();
        let at = Timestamp::EPOCH;
        let mut doc = Document::new(&ids, "inbox", at).unwrap();
        let folder = Folder::new(&ids, "home", at).unwrap();
        let folder_uid = doc.add_project_or_folder(folder.into(), None, at).unwrap();
        let project = Project::new(&ids, "paint", at).unwrap();
        doc.add_project_or_folder(project.into(), Some(folder_uid), at)
            .unwrap();

        let keys: Vec<String> = doc
            .projects()
            .iter()
            .map(|(project, path)| sort_key(project, path))
            .collect();
        assert_eq!(keys, vec!["".to_string(), "/home/paint".to_string()]);
        let projects = doc.projects();
        assert_eq!(folder_path(&projects[1].1), "/home");
    }
}
