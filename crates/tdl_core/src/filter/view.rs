//! The six fixed view filters.

use super::{any_action_shown, any_child_shown, Lookups, ShowFilter};
use crate::model::action::Action;
use crate::model::auditable::{Auditable, Timestamp};
use crate::model::context::Context;
use crate::model::folder::Folder;
use crate::model::project::Project;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewKind {
    /// Everything, deleted items included.
    ShowAll,
    /// Everything not deleted; completed and inactive items stay.
    #[default]
    ShowNotDeleted,
    /// Not deleted and not complete.
    ShowNotFinalized,
    /// Not finalized and active throughout.
    ShowActionable,
    /// Not finalized work in active projects overdue for review; actions follow their
    /// project, so they show only when it is active and due.
    ShowNeedingReview,
    /// Not finalized work parked in an inactive project or context.
    ShowInactiveIncomplete,
}

impl ViewKind {
    pub const ALL: [ViewKind; 6] = [
        Self::ShowAll,
        Self::ShowNotDeleted,
        Self::ShowNotFinalized,
        Self::ShowActionable,
        Self::ShowNeedingReview,
        Self::ShowInactiveIncomplete,
    ];

    /// User-facing aliases; the first one is canonical.
    pub fn ui_names(self) -> &'static [&'static str] {
        match self {
            Self::ShowAll => &["all_even_deleted"],
            Self::ShowNotDeleted => &["all", "default"],
            Self::ShowNotFinalized => &["incomplete"],
            Self::ShowActionable => &["actionable"],
            Self::ShowNeedingReview => &["needing_review"],
            Self::ShowInactiveIncomplete => &["inactive_and_incomplete"],
        }
    }

    pub fn from_ui_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.ui_names().contains(&name))
    }
}

impl Display for ViewKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ui_names()[0])
    }
}

/// Unknown view filter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownViewKind(pub String);

impl Display for UnknownViewKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown view filter `{}`", self.0)
    }
}

impl std::error::Error for UnknownViewKind {}

impl FromStr for ViewKind {
    type Err = UnknownViewKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ui_name(s).ok_or_else(|| UnknownViewKind(s.to_string()))
    }
}

/// One of the fixed views, bound to its lookups and a review clock.
pub struct ViewFilter<'a> {
    kind: ViewKind,
    lookups: Lookups<'a>,
    now: Timestamp,
}

impl<'a> ViewFilter<'a> {
    /// `now` is only consulted by [`ViewKind::ShowNeedingReview`].
    pub fn new(kind: ViewKind, lookups: Lookups<'a>, now: Timestamp) -> Self {
        Self { kind, lookups, now }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    fn action_not_finalized(action: &Action, project: &Project) -> bool {
        !action.is_deleted() && !action.is_complete() && !project.is_complete()
    }

    fn project_not_finalized(project: &Project) -> bool {
        !project.is_deleted() && !project.is_complete()
    }

    fn action_rule(&self, action: &Action) -> bool {
        if self.kind == ViewKind::ShowAll {
            return true;
        }
        if self.kind == ViewKind::ShowNotDeleted {
            return !action.is_deleted();
        }
        let Some(project) = self.lookups.project_of(action) else {
            return false;
        };
        if !Self::action_not_finalized(action, project) {
            return false;
        }
        let context = self.lookups.context_of(action);
        match self.kind {
            ViewKind::ShowAll | ViewKind::ShowNotDeleted | ViewKind::ShowNotFinalized => true,
            ViewKind::ShowActionable => {
                project.is_active() && context.map_or(true, Context::is_active)
            }
            ViewKind::ShowNeedingReview => project.is_active() && project.needs_review(self.now),
            ViewKind::ShowInactiveIncomplete => {
                !project.is_active() || context.is_some_and(|context| !context.is_active())
            }
        }
    }

    fn project_rule(&self, project: &Project) -> bool {
        match self.kind {
            ViewKind::ShowAll => true,
            ViewKind::ShowNotDeleted => !project.is_deleted(),
            ViewKind::ShowNotFinalized => Self::project_not_finalized(project),
            ViewKind::ShowActionable => Self::project_not_finalized(project) && project.is_active(),
            ViewKind::ShowNeedingReview => {
                Self::project_not_finalized(project)
                    && project.is_active()
                    && project.needs_review(self.now)
            }
            ViewKind::ShowInactiveIncomplete => {
                Self::project_not_finalized(project) && !project.is_active()
            }
        }
    }
}

impl ShowFilter for ViewFilter<'_> {
    fn show_action(&self, action: &Action) -> bool {
        self.action_rule(action)
    }

    fn show_project(&self, project: &Project) -> bool {
        self.project_rule(project) || any_action_shown(self, project)
    }

    fn show_folder(&self, folder: &Folder) -> bool {
        let own = self.kind == ViewKind::ShowAll || !folder.is_deleted();
        own || any_child_shown(self, folder)
    }

    fn show_context(&self, context: &Context) -> bool {
        match self.kind {
            ViewKind::ShowAll => true,
            ViewKind::ShowNotDeleted | ViewKind::ShowNotFinalized | ViewKind::ShowNeedingReview => {
                !context.is_deleted()
            }
            ViewKind::ShowActionable => !context.is_deleted() && context.is_active(),
            ViewKind::ShowInactiveIncomplete => !context.is_deleted() && !context.is_active(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ViewKind;

    #[test]
    fn ui_names_resolve_to_kinds() {
        assert_eq!(ViewKind::from_ui_name("default"), Some(ViewKind::ShowNotDeleted));
        assert_eq!(ViewKind::from_ui_name("all"), Some(ViewKind::ShowNotDeleted));
        assert_eq!(
            "inactive_and_incomplete".parse::<ViewKind>().unwrap(),
            ViewKind::ShowInactiveIncomplete
        );
        assert!("bogus".parse::<ViewKind>().is_err());
        for kind in ViewKind::ALL {
            assert_eq!(ViewKind::from_ui_name(&kind.to_string()), Some(kind));
        }
    }
}
