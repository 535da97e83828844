//! SQLite storage layer for student-sql

use anyhow::{bail, Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{params, Batch, Connection};
use std::path::Path;

use super::models::{QueryRows, SqlValue, StudentRecord};
use crate::config::Config;

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database, creating the STUDENT table if absent
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        let db = Self { conn };
        db.initialize()?;
        tracing::debug!(path = %path.display(), "database ready");
        Ok(db)
    }

    /// Open the database configured for this environment
    pub fn open_default() -> Result<Self> {
        let path = Config::load()?.db_path();
        Self::open(&path)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.initialize()?;
        Ok(db)
    }

    /// Create the schema. Existing tables and data are never touched.
    fn initialize(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS STUDENT (
                STUDENT_ID VARCHAR(10) PRIMARY KEY,
                NAME VARCHAR(25),
                CLASS VARCHAR(25),
                SECTION VARCHAR(25),
                MARKS INTEGER
            );
            "#,
            )
            .context("Failed to initialize STUDENT table")?;
        Ok(())
    }

    // ==================== Students ====================

    /// Check if a student ID is already stored
    pub fn student_exists(&self, student_id: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM STUDENT WHERE STUDENT_ID = ?1",
                params![student_id],
                |row| row.get(0),
            )
            .context("Failed to look up student")?;
        Ok(count > 0)
    }

    /// Insert all records in a single transaction.
    ///
    /// Either every record lands or none does. Returns the number inserted.
    pub fn insert_students(&self, records: &[StudentRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO STUDENT (STUDENT_ID, NAME, CLASS, SECTION, MARKS) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.student_id,
                    record.name,
                    record.class,
                    record.section,
                    record.marks,
                ])
                .with_context(|| format!("Failed to insert student {}", record.student_id))?;
            }
        }
        tx.commit().context("Failed to commit students")?;
        Ok(records.len())
    }

    /// List stored students in insertion order
    pub fn list_students(&self, limit: usize) -> Result<Vec<StudentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT STUDENT_ID, NAME, CLASS, SECTION, MARKS FROM STUDENT ORDER BY rowid LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], Self::row_to_student)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list students")
    }

    fn row_to_student(row: &rusqlite::Row) -> rusqlite::Result<StudentRecord> {
        Ok(StudentRecord {
            student_id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            class: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            section: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            marks: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
        })
    }

    /// Get total student count
    pub fn student_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM STUDENT", [], |row| row.get(0))?;
        Ok(count)
    }

    // ==================== Unchecked SQL ====================

    /// Run arbitrary SQL text exactly as given and collect every result row.
    ///
    /// HAZARD: nothing here inspects the statement. Model-generated text goes
    /// through this path verbatim, so it can modify or drop data just as
    /// easily as read it. Callers own that risk.
    ///
    /// Text holding only whitespace or comments yields no rows. Text holding
    /// more than one statement is rejected before anything runs.
    pub fn execute_unchecked(&self, sql: &str) -> Result<QueryRows> {
        let mut batch = Batch::new(&self.conn, sql);
        let Some(mut stmt) = batch.next()? else {
            return Ok(QueryRows::default());
        };
        if batch.next()?.is_some() {
            bail!("You can only execute one statement at a time.");
        }

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query([])?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                values.push(sql_value(row.get_ref(idx)?));
            }
            collected.push(values);
        }

        Ok(QueryRows {
            columns,
            rows: collected,
        })
    }
}

fn sql_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Integer(v),
        ValueRef::Real(v) => SqlValue::Real(v),
        ValueRef::Text(v) => SqlValue::Text(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => SqlValue::Blob(v.to_vec()),
    }
}
