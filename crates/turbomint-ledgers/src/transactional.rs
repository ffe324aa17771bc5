//! Begin / commit / rollback seam.
//!
//! The escrow engine treats each public operation as one transaction. Before
//! the first side effect it calls `begin` on every mutable collaborator; on
//! success it calls `commit`, and if any step fails it calls `rollback`. A
//! collaborator backed by a host with native atomic transactions maps these
//! onto the host's own calls (or makes them no-ops).
//!
//! The in-memory services record an [`UndoJournal`] entry for every key they
//! overwrite while a transaction is open, so the cost of a transaction is
//! proportional to what it touches, not to the size of the state.

/// State that can be mutated inside an all-or-nothing transaction.
pub trait Transactional {
    /// Start recording. Mutations from here on can be undone by `rollback`.
    fn begin(&mut self);

    /// Keep every mutation since `begin` and stop recording.
    fn commit(&mut self);

    /// Undo every mutation since `begin` and stop recording.
    fn rollback(&mut self);
}

/// Prior values of the keys overwritten during an open transaction.
///
/// Outside a transaction `record` is a no-op.
#[derive(Debug, Clone)]
pub struct UndoJournal<E> {
    entries: Option<Vec<E>>,
}

impl<E> Default for UndoJournal<E> {
    fn default() -> Self {
        Self { entries: None }
    }
}

impl<E> UndoJournal<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction, discarding any entries left from a previous one.
    pub fn begin(&mut self) {
        self.entries = Some(Vec::new());
    }

    /// Close the transaction, keeping its effects.
    pub fn commit(&mut self) {
        self.entries = None;
    }

    /// Close the transaction and hand back its entries, newest first, for
    /// the owner to restore.
    pub fn unwind(&mut self) -> std::iter::Rev<std::vec::IntoIter<E>> {
        self.entries.take().unwrap_or_default().into_iter().rev()
    }

    /// Remember the value a key held before it is overwritten.
    pub fn record(&mut self, entry: E) {
        if let Some(entries) = self.entries.as_mut() {
            entries.push(entry);
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.entries.is_some()
    }

    /// Entries recorded so far in the open transaction.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
