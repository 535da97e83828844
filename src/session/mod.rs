//! Per-session buffering of student records before they are committed.
//!
//! A [`SessionBuffer`] holds records the user has entered but not yet
//! submitted. It is owned by whoever drives the session (one per entry
//! shell) and is never shared. The database is passed in explicitly to the
//! operations that need it, so the buffer itself holds no connection.
//!
//! Identifier uniqueness is enforced on [`SessionBuffer::add`] only, against
//! both the buffer and the database. [`SessionBuffer::edit`] replaces a
//! record wholesale without re-checking uniqueness, so an edit can
//! introduce a duplicate identifier that only surfaces when the buffer is
//! flushed.

use crate::storage::{Database, StudentRecord, MAX_MARKS, MIN_MARKS};

/// Errors produced by buffer operations.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// The identifier is already buffered or stored.
    #[error("Student ID {0} already exists. Please use a different Student ID.")]
    DuplicateIdentifier(String),

    /// No record at the requested buffer position.
    #[error("No record at position {index} (buffer holds {len})")]
    IndexOutOfRange {
        /// Requested zero-based position.
        index: usize,
        /// Buffer length at the time of the request.
        len: usize,
    },

    /// A field is empty or marks are out of range.
    #[error("Invalid record: {0}")]
    Validation(String),

    /// The database rejected a read or write.
    #[error("Database error: {0}")]
    Store(String),
}

impl EntryError {
    fn store(err: anyhow::Error) -> Self {
        EntryError::Store(format!("{err:#}"))
    }
}

/// One user action against the buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryAction {
    /// Validate a record and append it to the buffer.
    Add(StudentRecord),
    /// Replace the buffered record at a 0-based position.
    Edit { index: usize, record: StudentRecord },
    /// Remove the buffered record at a 0-based position.
    Delete(usize),
    /// Commit every buffered record in one transaction.
    Flush,
    /// Show the buffered records.
    List,
    /// Discard the buffer without committing.
    Clear,
}

/// What an applied action did.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    /// The record now sits at the end of the buffer.
    Added(StudentRecord),
    /// The record that replaced the one at `index`.
    Edited { index: usize, record: StudentRecord },
    /// The record taken out of the buffer.
    Deleted(StudentRecord),
    /// Number of records written to the store.
    Flushed(usize),
    /// Snapshot of the buffer in entry order.
    Listed(Vec<StudentRecord>),
    /// Number of records discarded.
    Cleared(usize),
}

/// Records entered during one session and not yet committed.
#[derive(Debug, Clone, Default)]
pub struct SessionBuffer {
    records: Vec<StudentRecord>,
}

impl SessionBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffered records in entry order.
    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StudentRecord> {
        self.records.get(index)
    }

    /// True if `student_id` is stored in the database or held in the buffer.
    pub fn exists(&self, db: &Database, student_id: &str) -> Result<bool, EntryError> {
        if self.records.iter().any(|r| r.student_id == student_id) {
            return Ok(true);
        }
        db.student_exists(student_id).map_err(EntryError::store)
    }

    /// Validates and appends a record.
    ///
    /// Fails without touching the buffer if any field is empty, the marks
    /// are out of range, or the identifier already exists.
    pub fn add(&mut self, db: &Database, record: StudentRecord) -> Result<(), EntryError> {
        validate(&record)?;
        if self.exists(db, &record.student_id)? {
            return Err(EntryError::DuplicateIdentifier(record.student_id));
        }
        tracing::debug!(student_id = %record.student_id, "buffered record");
        self.records.push(record);
        Ok(())
    }

    /// Replaces the record at `index`.
    ///
    /// Fields are validated, but the identifier is not checked for
    /// uniqueness against the rest of the buffer or the database.
    pub fn edit(&mut self, index: usize, record: StudentRecord) -> Result<(), EntryError> {
        let len = self.records.len();
        let slot = self
            .records
            .get_mut(index)
            .ok_or(EntryError::IndexOutOfRange { index, len })?;
        validate(&record)?;
        *slot = record;
        Ok(())
    }

    /// Removes and returns the record at `index`.
    pub fn delete(&mut self, index: usize) -> Result<StudentRecord, EntryError> {
        if index >= self.records.len() {
            return Err(EntryError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    /// Commits every buffered record in one transaction and empties the buffer.
    ///
    /// On failure nothing is written and the buffer is left as it was.
    pub fn flush(&mut self, db: &Database) -> Result<usize, EntryError> {
        if self.records.is_empty() {
            return Ok(0);
        }
        let committed = db
            .insert_students(&self.records)
            .map_err(EntryError::store)?;
        self.records.clear();
        tracing::info!(committed, "flushed session buffer");
        Ok(committed)
    }

    /// Discards all buffered records without committing them.
    pub fn clear(&mut self) -> usize {
        let dropped = self.records.len();
        self.records.clear();
        dropped
    }

    /// Applies one action and reports what happened.
    pub fn apply(&mut self, db: &Database, action: EntryAction) -> Result<EntryOutcome, EntryError> {
        match action {
            EntryAction::Add(record) => {
                self.add(db, record.clone())?;
                Ok(EntryOutcome::Added(record))
            }
            EntryAction::Edit { index, record } => {
                self.edit(index, record.clone())?;
                Ok(EntryOutcome::Edited { index, record })
            }
            EntryAction::Delete(index) => self.delete(index).map(EntryOutcome::Deleted),
            EntryAction::Flush => self.flush(db).map(EntryOutcome::Flushed),
            EntryAction::List => Ok(EntryOutcome::Listed(self.records.clone())),
            EntryAction::Clear => Ok(EntryOutcome::Cleared(self.clear())),
        }
    }
}

fn validate(record: &StudentRecord) -> Result<(), EntryError> {
    if let Some(field) = record.first_empty_field() {
        return Err(EntryError::Validation(format!("{field} must not be empty")));
    }
    if !record.marks_in_range() {
        return Err(EntryError::Validation(format!(
            "marks must be between {MIN_MARKS} and {MAX_MARKS}, got {}",
            record.marks
        )));
    }
    Ok(())
}
