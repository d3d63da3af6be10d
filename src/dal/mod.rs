//! Data access for the tutoring store.
//!
//! Every operation opens its own connection and drops it before returning.
//! Reads degrade to an empty collection on any failure; mutations run inside
//! one transaction that is committed on success and rolled back otherwise.

mod error;
mod models;
mod sessions;
mod students;
mod subjects;
mod teams;
mod validate;

pub use error::DalError;
pub use models::{
    IdSet, Member, NewSession, NewTeam, Role, Session, SessionStatus, Student, StudentInput,
    StudentOption, StudentUpdate, Subject, Team,
};

use crate::config::StoreConfig;
use crate::db;
use rusqlite::{Connection, OptionalExtension, Transaction};

pub struct Dal {
    config: StoreConfig,
}

impl Dal {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn connect(&self) -> Result<Connection, DalError> {
        db::connect(&self.config).map_err(|e| {
            tracing::warn!(db = %self.config.db_path.display(), error = %e, "store unavailable");
            DalError::Unavailable(e.to_string())
        })
    }

    fn read<T>(
        &self,
        op: &'static str,
        query: impl FnOnce(&Connection) -> rusqlite::Result<Vec<T>>,
    ) -> Vec<T> {
        tracing::debug!(op, "read");
        let Ok(conn) = self.connect() else {
            return Vec::new();
        };
        match query(&conn) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(op, error = %e, "read failed, returning no rows");
                Vec::new()
            }
        }
    }

    fn write<T>(
        &self,
        op: &'static str,
        unit: impl FnOnce(&Transaction<'_>) -> Result<T, DalError>,
    ) -> Result<T, DalError> {
        tracing::debug!(op, "write");
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        match unit(&tx) {
            Ok(v) => {
                tx.commit()?;
                tracing::info!(op, "committed");
                Ok(v)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback() {
                    tracing::error!(op, error = %rb, "rollback failed");
                }
                tracing::warn!(op, error = %e, "rolled back");
                Err(e)
            }
        }
    }
}

/// Team and session mentors must exist and currently hold the mentor role.
fn require_mentor(conn: &Connection, mentor_id: i64) -> Result<(), DalError> {
    let role: Option<Role> = conn
        .query_row(
            "SELECT role FROM Student WHERE student_id = ?",
            [mentor_id],
            |r| r.get(0),
        )
        .optional()?;
    match role {
        Some(Role::Mentor) => Ok(()),
        Some(Role::Mentee) => Err(DalError::Constraint {
            field: Some("mentorId"),
            message: "the selected student is not a mentor".to_string(),
        }),
        None => Err(DalError::Constraint {
            field: Some("mentorId"),
            message: format!("no student with id {mentor_id}"),
        }),
    }
}
