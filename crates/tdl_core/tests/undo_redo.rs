use tdl_core::uid::INBOX_UID;
use tdl_core::{
    Auditable, Command, DocumentError, EngineConfig, IllegalOperationError, Session, SessionError,
    Timestamp, Uid, UidMode,
};

fn at(seconds: i64) -> Timestamp {
    Timestamp::from_epoch_seconds(seconds)
}

fn session(uid_mode: UidMode) -> Session {
    let config = EngineConfig {
        uid_mode,
        paranoid: true,
        ..EngineConfig::default()
    };
    Session::fresh(config, at(1)).unwrap()
}

fn created(session: &mut Session, command: Command, seconds: i64) -> Uid {
    session.execute_at(command, at(seconds)).unwrap().unwrap()
}

/// Runs a handful of dependent commands, returning the serialization after each.
fn build_history(session: &mut Session) -> Vec<Vec<u8>> {
    let mut states = vec![session.to_bytes().unwrap()];
    let home = created(
        session,
        Command::MakeContext {
            name: "@home".to_string(),
        },
        10,
    );
    states.push(session.to_bytes().unwrap());
    let chores = created(
        session,
        Command::MakeFolder {
            name: "chores".to_string(),
            parent: None,
        },
        11,
    );
    states.push(session.to_bytes().unwrap());
    let laundry = created(
        session,
        Command::MakeProject {
            name: "laundry".to_string(),
            parent: Some(chores),
        },
        12,
    );
    states.push(session.to_bytes().unwrap());
    let wash = created(
        session,
        Command::MakeAction {
            name: "wash".to_string(),
            project: Some(laundry),
            context: Some(home),
        },
        13,
    );
    states.push(session.to_bytes().unwrap());
    session
        .execute_at(
            Command::SetNote {
                uid: wash,
                note: "cold".to_string(),
            },
            at(14),
        )
        .unwrap();
    states.push(session.to_bytes().unwrap());
    session
        .execute_at(
            Command::Move {
                uid: wash,
                destination: INBOX_UID,
            },
            at(15),
        )
        .unwrap();
    states.push(session.to_bytes().unwrap());
    session
        .execute_at(Command::RemoveContext { context: home }, at(16))
        .unwrap();
    states.push(session.to_bytes().unwrap());
    states
}

fn assert_undo_redo_is_byte_identical(uid_mode: UidMode) {
    let mut session = session(uid_mode);
    let states = build_history(&mut session);
    let steps = states.len() - 1;
    assert_eq!(session.history().len(), steps);

    for expected in states.iter().rev().skip(1) {
        session.undo().unwrap();
        assert_eq!(&session.to_bytes().unwrap(), expected);
    }
    assert!(!session.can_undo());
    assert_eq!(session.to_bytes().unwrap(), session.snapshot());

    for expected in states.iter().skip(1) {
        session.redo().unwrap();
        assert_eq!(&session.to_bytes().unwrap(), expected);
    }
    assert!(!session.can_redo());
}

#[test]
fn undo_and_redo_are_byte_identical_with_sequential_uids() {
    assert_undo_redo_is_byte_identical(UidMode::Sequential);
}

#[test]
fn undo_and_redo_are_byte_identical_with_random_uids() {
    assert_undo_redo_is_byte_identical(UidMode::Random);
}

#[test]
fn a_new_command_discards_the_redo_tail() {
    let mut session = session(UidMode::Sequential);
    build_history(&mut session);
    session.undo().unwrap();
    session.undo().unwrap();
    assert!(session.can_redo());

    session
        .execute_at(
            Command::MakeContext {
                name: "@office".to_string(),
            },
            at(30),
        )
        .unwrap();
    assert!(!session.can_redo());
    assert!(matches!(session.redo(), Err(SessionError::NothingToRedo)));
}

#[test]
fn failed_commands_keep_the_redo_tail() {
    let mut session = session(UidMode::Sequential);
    build_history(&mut session);
    session.undo().unwrap();

    let err = session
        .execute_at(
            Command::MakeContext {
                name: "@home".to_string(),
            },
            at(30),
        )
        .unwrap_err();
    assert!(matches!(err, SessionError::Document(_)));
    assert!(session.can_redo());
    session.redo().unwrap();
}

#[test]
fn a_refused_forced_removal_leaves_the_document_byte_identical() {
    let mut session = session(UidMode::Sequential);
    let milk = created(
        &mut session,
        Command::MakeAction {
            name: "milk".to_string(),
            project: None,
            context: None,
        },
        10,
    );
    let before = session.to_bytes().unwrap();

    let err = session
        .execute_at(
            Command::RemoveProject {
                project: INBOX_UID,
                force: true,
            },
            at(11),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Document(DocumentError::Illegal(IllegalOperationError::Irremovable(
            INBOX_UID
        )))
    ));
    assert_eq!(session.to_bytes().unwrap(), before);
    assert_eq!(session.history().len(), 1);
    let (action, _) = session.document().action_by_uid(milk).unwrap();
    assert!(!action.is_deleted());

    session.undo().unwrap();
    session.redo().unwrap();
    assert_eq!(session.to_bytes().unwrap(), before);
}

#[test]
fn undo_releases_uids_issued_after_the_kept_prefix() {
    let mut session = session(UidMode::Random);
    let home = created(
        &mut session,
        Command::MakeContext {
            name: "@home".to_string(),
        },
        10,
    );
    let garden = created(
        &mut session,
        Command::MakeProject {
            name: "garden".to_string(),
            parent: None,
        },
        11,
    );

    session.undo().unwrap();
    assert!(session.allocator().is_registered(home));
    assert!(!session.allocator().is_registered(garden));
    assert!(session.document().project_by_uid(garden).is_none());

    session.redo().unwrap();
    let (project, _) = session.document().project_by_uid(garden).unwrap();
    assert_eq!(project.name(), "garden");
    assert_eq!(project.audit().ctime(), at(11));
}

#[test]
fn sessions_reopen_from_their_own_bytes() {
    let mut session = session(UidMode::Sequential);
    build_history(&mut session);
    let bytes = session.to_bytes().unwrap();

    let reopened = Session::from_bytes(bytes.clone(), session.config().clone()).unwrap();
    assert_eq!(reopened.to_bytes().unwrap(), bytes);
    assert!(!reopened.can_undo());
    assert_eq!(reopened.allocator().len(), session.allocator().len());
}
