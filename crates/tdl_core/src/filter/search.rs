//! Case-insensitive text search over names and notes.

use super::{any_action_shown, any_child_shown, Lookups, ShowFilter};
use crate::model::action::Action;
use crate::model::auditable::Auditable;
use crate::model::context::Context;
use crate::model::folder::Folder;
use crate::model::project::Project;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilterError {
    EmptyQuery,
}

impl Display for SearchFilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyQuery => write!(f, "search query must not be empty"),
        }
    }
}

impl std::error::Error for SearchFilterError {}

/// Shows items whose name or note contains the query, plus containers of shown items.
///
/// Only items whose active and done flags equal `show_active` and
/// `show_done` can match on their own text.
pub struct SearchFilter<'a> {
    lookups: Lookups<'a>,
    needle: String,
    show_active: bool,
    show_done: bool,
}

impl<'a> SearchFilter<'a> {
    pub fn new(
        lookups: Lookups<'a>,
        query: &str,
        show_active: bool,
        show_done: bool,
    ) -> Result<Self, SearchFilterError> {
        if query.is_empty() {
            return Err(SearchFilterError::EmptyQuery);
        }
        Ok(Self {
            lookups,
            needle: query.to_lowercase(),
            show_active,
            show_done,
        })
    }

    fn text_matches(&self, item: &impl Auditable) -> bool {
        item.name().to_lowercase().contains(&self.needle)
            || (!item.note().is_empty() && item.note().to_lowercase().contains(&self.needle))
    }
}

impl ShowFilter for SearchFilter<'_> {
    fn show_action(&self, action: &Action) -> bool {
        let active = self
            .lookups
            .context_of(action)
            .map_or(true, Context::is_active);
        active == self.show_active && action.is_done() == self.show_done && self.text_matches(action)
    }

    fn show_project(&self, project: &Project) -> bool {
        if any_action_shown(self, project) {
            return true;
        }
        project.is_active() == self.show_active
            && project.is_done() == self.show_done
            && self.text_matches(project)
    }

    fn show_folder(&self, folder: &Folder) -> bool {
        if any_child_shown(self, folder) {
            return true;
        }
        folder.is_done() == self.show_done && self.text_matches(folder)
    }

    fn show_context(&self, context: &Context) -> bool {
        context.is_active() == self.show_active
            && context.is_done() == self.show_done
            && self.text_matches(context)
    }
}
