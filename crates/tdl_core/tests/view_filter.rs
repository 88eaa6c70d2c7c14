use tdl_core::filter::SearchFilterError;
use tdl_core::model::folder::Folder;
use tdl_core::model::project::Project;
use tdl_core::{
    Auditable, Command, Document, Lookups, SearchFilter, ShowFilter, Timestamp, Uid, UidAllocator,
    ViewFilter, ViewKind,
};

const WEEK: i64 = 7 * 24 * 3600;

fn at(seconds: i64) -> Timestamp {
    Timestamp::from_epoch_seconds(seconds)
}

struct Fixture {
    doc: Document,
    ids: UidAllocator,
    garden: Uid,
    someday: Uid,
    errands: Uid,
}

/// garden (active): weed @home, mow @errands (inactive context), rake (done), prune (deleted)
/// someday (inactive): learn
/// attic/ (deleted folder) holding boxes (deleted project)
fn fixture() -> Fixture {
    let ids = UidAllocator::sequential();
    let mut doc = Document::new(&ids, "inbox", at(1)).unwrap();
    let home = doc.add_context(&ids, "@home", at(1)).unwrap();
    let errands = doc.add_context(&ids, "@errands", at(1)).unwrap();
    let garden = doc
        .add_project_or_folder(Project::new(&ids, "garden", at(2)).unwrap().into(), None, at(2))
        .unwrap();
    let someday = doc
        .add_project_or_folder(Project::new(&ids, "someday", at(2)).unwrap().into(), None, at(2))
        .unwrap();
    let attic = doc
        .add_project_or_folder(Folder::new(&ids, "attic", at(2)).unwrap().into(), None, at(2))
        .unwrap();
    let boxes = doc
        .add_project_or_folder(
            Project::new(&ids, "boxes", at(2)).unwrap().into(),
            Some(attic),
            at(2),
        )
        .unwrap();

    doc.add_action(&ids, garden, "weed", Some(home), at(3)).unwrap();
    let mow = doc.add_action(&ids, garden, "mow", Some(errands), at(3)).unwrap();
    let rake = doc.add_action(&ids, garden, "rake", None, at(3)).unwrap();
    let prune = doc.add_action(&ids, garden, "prune", None, at(3)).unwrap();
    doc.add_action(&ids, someday, "learn", None, at(3)).unwrap();

    for command in [
        Command::SetNote {
            uid: mow,
            note: "borrow a Mower from Sam".to_string(),
        },
        Command::SetComplete {
            uid: rake,
            complete: true,
        },
        Command::RemoveAction {
            action: prune,
            scrub: false,
        },
        Command::SetProjectActive {
            project: someday,
            active: false,
        },
        Command::SetContextActive {
            context: errands,
            active: false,
        },
        Command::RemoveProject {
            project: boxes,
            force: false,
        },
        Command::RemoveFolder { folder: attic },
    ] {
        command.apply(&mut doc, &ids, at(4)).unwrap();
    }

    Fixture {
        doc,
        ids,
        garden,
        someday,
        errands,
    }
}

fn shown_actions(doc: &Document, filter: &dyn ShowFilter) -> Vec<String> {
    doc.actions()
        .into_iter()
        .filter(|(action, _)| filter.show_action(action))
        .map(|(action, _)| action.name().to_string())
        .collect()
}

fn shown_projects(doc: &Document, filter: &dyn ShowFilter) -> Vec<String> {
    doc.projects()
        .into_iter()
        .filter(|(project, _)| filter.show_project(project))
        .map(|(project, _)| project.name().to_string())
        .collect()
}

fn view<'a>(doc: &'a Document, kind: ViewKind, now: i64) -> ViewFilter<'a> {
    ViewFilter::new(kind, Lookups::from_document(doc), at(now))
}

#[test]
fn show_all_includes_deleted_items() {
    let f = fixture();
    let filter = view(&f.doc, ViewKind::ShowAll, 10);
    assert_eq!(
        shown_actions(&f.doc, &filter),
        vec!["weed", "mow", "rake", "prune", "learn"]
    );
    assert!(shown_projects(&f.doc, &filter).contains(&"boxes".to_string()));
    assert!(f.doc.folders().iter().all(|(folder, _)| filter.show_folder(folder)));
}

#[test]
fn not_deleted_keeps_completed_and_inactive_work() {
    let f = fixture();
    let filter = view(&f.doc, ViewKind::ShowNotDeleted, 10);
    assert_eq!(shown_actions(&f.doc, &filter), vec!["weed", "mow", "rake", "learn"]);
    assert_eq!(shown_projects(&f.doc, &filter), vec!["inbox", "garden", "someday"]);

    let (attic, _) = f
        .doc
        .folders()
        .into_iter()
        .find(|(folder, _)| folder.name() == "attic")
        .unwrap();
    assert!(!filter.show_folder(attic));
    assert!(filter.show_folder(f.doc.root()));
}

#[test]
fn not_finalized_hides_completed_work() {
    let f = fixture();
    let filter = view(&f.doc, ViewKind::ShowNotFinalized, 10);
    assert_eq!(shown_actions(&f.doc, &filter), vec!["weed", "mow", "learn"]);
}

#[test]
fn actionable_follows_project_and_context_activity() {
    let mut f = fixture();
    {
        let filter = view(&f.doc, ViewKind::ShowActionable, 10);
        assert_eq!(shown_actions(&f.doc, &filter), vec!["weed"]);
        assert_eq!(shown_projects(&f.doc, &filter), vec!["inbox", "garden"]);
        let errands = f.doc.context_by_uid(f.errands).unwrap();
        assert!(!filter.show_context(errands));
    }

    for command in [
        Command::SetProjectActive {
            project: f.someday,
            active: true,
        },
        Command::SetContextActive {
            context: f.errands,
            active: true,
        },
    ] {
        command.apply(&mut f.doc, &f.ids, at(5)).unwrap();
    }
    let filter = view(&f.doc, ViewKind::ShowActionable, 10);
    assert_eq!(shown_actions(&f.doc, &filter), vec!["weed", "mow", "learn"]);
}

#[test]
fn completing_a_project_finalizes_its_actions() {
    let mut f = fixture();
    Command::SetComplete {
        uid: f.garden,
        complete: true,
    }
    .apply(&mut f.doc, &f.ids, at(5))
    .unwrap();

    let filter = view(&f.doc, ViewKind::ShowNotFinalized, 10);
    assert_eq!(shown_actions(&f.doc, &filter), vec!["learn"]);
    assert!(!shown_projects(&f.doc, &filter).contains(&"garden".to_string()));
}

#[test]
fn needing_review_uses_the_clock_and_skips_inactive_projects() {
    let mut f = fixture();
    let now = 10 * WEEK;
    {
        let filter = view(&f.doc, ViewKind::ShowNeedingReview, now);
        assert_eq!(shown_actions(&f.doc, &filter), vec!["weed", "mow"]);
        assert_eq!(shown_projects(&f.doc, &filter), vec!["inbox", "garden"]);
    }

    Command::MarkReviewed { project: f.garden }
        .apply(&mut f.doc, &f.ids, at(now))
        .unwrap();
    let filter = view(&f.doc, ViewKind::ShowNeedingReview, now);
    assert!(shown_actions(&f.doc, &filter).is_empty());
    assert_eq!(shown_projects(&f.doc, &filter), vec!["inbox"]);

    // A week later the project is due again.
    let later = view(&f.doc, ViewKind::ShowNeedingReview, now + WEEK + 1);
    assert_eq!(shown_actions(&f.doc, &later), vec!["weed", "mow"]);
}

#[test]
fn inactive_incomplete_collects_parked_work() {
    let f = fixture();
    let filter = view(&f.doc, ViewKind::ShowInactiveIncomplete, 10);
    assert_eq!(shown_actions(&f.doc, &filter), vec!["mow", "learn"]);
    // garden is active but still holds a parked action.
    assert_eq!(shown_projects(&f.doc, &filter), vec!["garden", "someday"]);
    let errands = f.doc.context_by_uid(f.errands).unwrap();
    assert!(filter.show_context(errands));
}

#[test]
fn unresolvable_projects_hide_actions_from_project_dependent_views() {
    let f = fixture();
    let blind = ViewFilter::new(
        ViewKind::ShowActionable,
        Lookups::new(|_| None, |_| None),
        at(10),
    );
    assert!(shown_actions(&f.doc, &blind).is_empty());

    let lenient = ViewFilter::new(
        ViewKind::ShowNotDeleted,
        Lookups::new(|_| None, |_| None),
        at(10),
    );
    assert_eq!(shown_actions(&f.doc, &lenient).len(), 4);
}

#[test]
fn search_matches_names_and_notes_case_insensitively() {
    let f = fixture();
    let filter = SearchFilter::new(Lookups::from_document(&f.doc), "WEED", true, false).unwrap();
    assert_eq!(shown_actions(&f.doc, &filter), vec!["weed"]);
    assert_eq!(shown_projects(&f.doc, &filter), vec!["garden"]);
    assert!(filter.show_folder(f.doc.root()));

    // mow sits in an inactive context, so only an inactive search finds it.
    let active = SearchFilter::new(Lookups::from_document(&f.doc), "mower", true, false).unwrap();
    assert!(shown_actions(&f.doc, &active).is_empty());
    let inactive =
        SearchFilter::new(Lookups::from_document(&f.doc), "mower", false, false).unwrap();
    assert_eq!(shown_actions(&f.doc, &inactive), vec!["mow"]);

    let done = SearchFilter::new(Lookups::from_document(&f.doc), "rak", true, true).unwrap();
    assert_eq!(shown_actions(&f.doc, &done), vec!["rake"]);
}

#[test]
fn empty_search_is_rejected() {
    let f = fixture();
    assert!(matches!(
        SearchFilter::new(Lookups::from_document(&f.doc), "", true, false),
        Err(SearchFilterError::EmptyQuery)
    ));
}
