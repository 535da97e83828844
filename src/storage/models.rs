//! Core data models for student-sql
//!
//! These represent student records as they move from the entry buffer
//! into the database, plus the loosely typed rows returned by
//! free-form queries.

use serde::{Deserialize, Serialize};

/// Lowest accepted mark.
pub const MIN_MARKS: i64 = 0;

/// Highest accepted mark.
pub const MAX_MARKS: i64 = 100;

/// A single student row, either buffered in a session or stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Unique student identifier (the `STUDENT_ID` primary key)
    pub student_id: String,

    /// Student name
    pub name: String,

    /// Class label (e.g., "10", "Data Science")
    pub class: String,

    /// Section label (e.g., "A")
    pub section: String,

    /// Marks in the range 0-100
    pub marks: i64,
}

impl StudentRecord {
    /// Builds a record from borrowed field values.
    pub fn new(
        student_id: impl Into<String>,
        name: impl Into<String>,
        class: impl Into<String>,
        section: impl Into<String>,
        marks: i64,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
            class: class.into(),
            section: section.into(),
            marks,
        }
    }

    /// Returns the name of the first empty text field, if any.
    ///
    /// Whitespace-only values count as empty.
    pub fn first_empty_field(&self) -> Option<&'static str> {
        [
            ("student_id", &self.student_id),
            ("name", &self.name),
            ("class", &self.class),
            ("section", &self.section),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }

    /// True if the marks fall inside the accepted range.
    pub fn marks_in_range(&self) -> bool {
        (MIN_MARKS..=MAX_MARKS).contains(&self.marks)
    }
}

/// A single cell returned by an unchecked query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Raw bytes; rendered as a length marker in text output
    Blob(Vec<u8>),
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(v) => write!(f, "{v}"),
            SqlValue::Real(v) => write!(f, "{v}"),
            SqlValue::Text(v) => write!(f, "{v}"),
            SqlValue::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

/// Column names and rows produced by an unchecked query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryRows {
    /// Column names in result order
    pub columns: Vec<String>,

    /// Result rows, each with one value per column
    pub rows: Vec<Vec<SqlValue>>,
}

impl QueryRows {
    /// True when the query produced no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of result rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_empty_field_none_when_complete() {
        let record = StudentRecord::new("S1", "Alice", "10", "A", 85);
        assert_eq!(record.first_empty_field(), None);
    }

    #[test]
    fn test_first_empty_field_reports_whitespace_only() {
        let record = StudentRecord::new("S1", "Alice", "   ", "A", 85);
        assert_eq!(record.first_empty_field(), Some("class"));
    }

    #[test]
    fn test_first_empty_field_reports_first_in_order() {
        let record = StudentRecord::new("", "", "10", "", 85);
        assert_eq!(record.first_empty_field(), Some("student_id"));
    }

    #[test]
    fn test_marks_in_range_boundaries() {
        assert!(StudentRecord::new("S1", "A", "10", "A", 0).marks_in_range());
        assert!(StudentRecord::new("S1", "A", "10", "A", 100).marks_in_range());
        assert!(!StudentRecord::new("S1", "A", "10", "A", 101).marks_in_range());
        assert!(!StudentRecord::new("S1", "A", "10", "A", -1).marks_in_range());
    }

    #[test]
    fn test_sql_value_display() {
        assert_eq!(SqlValue::Null.to_string(), "NULL");
        assert_eq!(SqlValue::Integer(42).to_string(), "42");
        assert_eq!(SqlValue::Text("Alice".to_string()).to_string(), "Alice");
        assert_eq!(SqlValue::Blob(vec![1, 2, 3]).to_string(), "<3 bytes>");
    }

    #[test]
    fn test_sql_value_serializes_untagged() {
        let row = vec![
            SqlValue::Text("S1".to_string()),
            SqlValue::Integer(85),
            SqlValue::Null,
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"["S1",85,null]"#);
    }
}
