//! Linear undo/redo history built on snapshot-and-replay.
//!
//! # Responsibility
//! - Keep the ordered list of mutating commands applied since load.
//! - Undo by rewinding to the load-time state and replaying a prefix.
//! - Redo by replaying exactly the next command.
//!
//! # Invariants
//! - Entries `[0, applied)` are reflected in the target; `[applied, len)` is the redo suffix.
//! - Registering a command drops the redo suffix.
//! - Undo and redo rebuild into a separate copy; the target and the index
//!   change together, and only when every replay succeeded.

use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Anything the journal can rewind and replay commands against.
pub trait Rewindable: Sized {
    type Command;
    type Error;

    /// A new state equal to the one captured at load time.
    fn rewound(&self) -> Result<Self, Self::Error>;

    /// An independent copy of the current state.
    fn fork(&self) -> Self;

    /// Re-executes a previously journaled command.
    fn replay(&mut self, command: &Self::Command) -> Result<(), Self::Error>;
}

#[derive(Debug)]
pub enum JournalError<E> {
    NothingToUndo,
    NothingToRedo,
    /// Rewinding or replaying failed; neither the target nor the index changed.
    Replay(E),
}

impl<E: Display> Display for JournalError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
            Self::Replay(err) => write!(f, "replay failed: {err}"),
        }
    }
}

impl<E: Error + 'static> Error for JournalError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Replay(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UndoJournal<C> {
    entries: Vec<C>,
    applied: usize,
}

impl<C> Default for UndoJournal<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            applied: 0,
        }
    }
}

impl<C> UndoJournal<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a command that has just been applied.
    pub fn register(&mut self, command: C) {
        self.entries.truncate(self.applied);
        self.entries.push(command);
        self.applied = self.entries.len();
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// Commands currently reflected in the target, oldest first.
    pub fn applied(&self) -> &[C] {
        &self.entries[..self.applied]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.applied = 0;
    }

    /// Rebuilds `target` from its load-time state with every applied command except the last.
    pub fn undo<T>(&mut self, target: &mut T) -> Result<(), JournalError<T::Error>>
    where
        T: Rewindable<Command = C>,
    {
        if self.applied == 0 {
            return Err(JournalError::NothingToUndo);
        }
        let keep = self.applied - 1;
        let rebuilt = match self.rebuild(target, keep) {
            Ok(rebuilt) => rebuilt,
            Err(err) => {
                error!("event=undo module=journal status=error replay_count={keep}");
                return Err(JournalError::Replay(err));
            }
        };
        *target = rebuilt;
        self.applied = keep;
        debug!("event=undo module=journal status=ok replay_count={keep}");
        Ok(())
    }

    fn rebuild<T>(&self, target: &T, count: usize) -> Result<T, T::Error>
    where
        T: Rewindable<Command = C>,
    {
        let mut scratch = target.rewound()?;
        for command in &self.entries[..count] {
            scratch.replay(command)?;
        }
        Ok(scratch)
    }

    /// Replays the next command of the redo suffix.
    pub fn redo<T>(&mut self, target: &mut T) -> Result<(), JournalError<T::Error>>
    where
        T: Rewindable<Command = C>,
    {
        let Some(command) = self.entries.get(self.applied) else {
            return Err(JournalError::NothingToRedo);
        };
        let mut scratch = target.fork();
        if let Err(err) = scratch.replay(command) {
            error!("event=redo module=journal status=error index={}", self.applied);
            return Err(JournalError::Replay(err));
        }
        *target = scratch;
        self.applied += 1;
        debug!("event=redo module=journal status=ok index={}", self.applied);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{JournalError, Rewindable, UndoJournal};

    /// Appends numbers to a vector; negative numbers fail after a partial write.
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Tape {
        values: Vec<i32>,
        rewinds: usize,
    }

    impl Rewindable for Tape {
        type Command = i32;
        type Error = String;

        fn rewound(&self) -> Result<Tape, String> {
            Ok(Tape {
                values: Vec::new(),
                rewinds: self.rewinds + 1,
            })
        }

        fn fork(&self) -> Tape {
            self.clone()
        }

        fn replay(&mut self, command: &i32) -> Result<(), String> {
            self.values.push(*command);
            if *command < 0 {
                return Err(format!("negative {command}"));
            }
            Ok(())
        }
    }

    fn run(journal: &mut UndoJournal<i32>, tape: &mut Tape, value: i32) {
        tape.replay(&value).unwrap();
        journal.register(value);
    }

    #[test]
    fn undo_replays_the_prefix_and_redo_the_next_entry() {
        let mut journal = UndoJournal::new();
        let mut tape = Tape::default();
        run(&mut journal, &mut tape, 1);
        run(&mut journal, &mut tape, 2);
        run(&mut journal, &mut tape, 3);

        journal.undo(&mut tape).unwrap();
        assert_eq!(tape.values, vec![1, 2]);
        journal.undo(&mut tape).unwrap();
        assert_eq!(tape.values, vec![1]);
        journal.redo(&mut tape).unwrap();
        assert_eq!(tape.values, vec![1, 2]);
        assert_eq!(tape.rewinds, 2);
    }

    #[test]
    fn registering_drops_the_redo_suffix() {
        let mut journal = UndoJournal::new();
        let mut tape = Tape::default();
        run(&mut journal, &mut tape, 1);
        run(&mut journal, &mut tape, 2);
        journal.undo(&mut tape).unwrap();
        run(&mut journal, &mut tape, 9);

        assert!(matches!(journal.redo(&mut tape), Err(JournalError::NothingToRedo)));
        assert_eq!(journal.applied(), &[1, 9]);
    }

    #[test]
    fn empty_journal_has_nothing_to_undo() {
        let mut journal: UndoJournal<i32> = UndoJournal::new();
        let mut tape = Tape::default();
        assert!(matches!(journal.undo(&mut tape), Err(JournalError::NothingToUndo)));
        assert_eq!(tape.rewinds, 0);
    }

    #[test]
    fn failed_replay_keeps_the_index() {
        let mut journal = UndoJournal::new();
        let mut tape = Tape::default();
        run(&mut journal, &mut tape, 1);
        journal.register(-1);
        run(&mut journal, &mut tape, 2);
        let before = tape.clone();

        assert!(matches!(journal.undo(&mut tape), Err(JournalError::Replay(_))));
        assert!(journal.can_undo());
        assert_eq!(journal.applied().len(), 3);
        assert_eq!(tape, before);
        assert_eq!(tape.values, vec![1, 2]);
        assert_eq!(tape.rewinds, 0);
    }

    #[test]
    fn failed_redo_leaves_the_target_untouched() {
        let mut journal = UndoJournal::new();
        let mut tape = Tape::default();
        run(&mut journal, &mut tape, 1);
        journal.register(-1);
        journal.undo(&mut tape).unwrap();
        assert_eq!(tape.values, vec![1]);
        let before = tape.clone();

        assert!(matches!(journal.redo(&mut tape), Err(JournalError::Replay(_))));
        assert_eq!(tape, before);
        assert!(journal.can_redo());
    }
}
