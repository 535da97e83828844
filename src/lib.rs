//! student-sql - buffered student data entry and natural-language queries
//!
//! Student records are collected in a per-session buffer, checked for
//! duplicate IDs, and committed to a local SQLite database in one go.
//! Separately, questions in plain English are turned into SQL by a hosted
//! model and run against the same database.

pub mod cli;
pub mod config;
pub mod query;
pub mod session;
pub mod storage;
