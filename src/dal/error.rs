use rusqlite::ffi;
use thiserror::Error;

/// Why a data-access operation did not go through.
#[derive(Debug, Error)]
pub enum DalError {
    /// The store could not be reached (no workspace, missing file, open failed).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Input rejected before touching the store.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A uniqueness rule in the store was violated.
    #[error("{message}")]
    Conflict {
        field: Option<&'static str>,
        message: String,
    },

    /// A range, shape, or reference rule in the store was violated.
    #[error("{message}")]
    Constraint {
        field: Option<&'static str>,
        message: String,
    },

    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl DalError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DalError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Sorts a store failure into conflict / constraint / generic. Each
    /// `(needle, field)` pair is tried in order against the violation detail,
    /// which carries the column or constraint name.
    pub fn from_store(err: rusqlite::Error, fields: &[(&str, &'static str)]) -> Self {
        let (extended, detail) = match &err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ffi::ErrorCode::ConstraintViolation => {
                (e.extended_code, msg.clone().unwrap_or_default())
            }
            _ => return DalError::Store(err),
        };
        let lowered = detail.to_ascii_lowercase();
        let field = fields
            .iter()
            .find(|(needle, _)| lowered.contains(&needle.to_ascii_lowercase()))
            .map(|(_, field)| *field);

        match extended {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                DalError::Conflict {
                    field,
                    message: detail,
                }
            }
            ffi::SQLITE_CONSTRAINT_CHECK
            | ffi::SQLITE_CONSTRAINT_FOREIGNKEY
            | ffi::SQLITE_CONSTRAINT_NOTNULL => DalError::Constraint {
                field,
                message: detail,
            },
            _ => DalError::Store(err),
        }
    }

    /// Fills in the field for a conflict or constraint whose detail did not
    /// name one (foreign key failures never do).
    pub fn or_field(self, fallback: &'static str) -> Self {
        match self {
            DalError::Conflict {
                field: None,
                message,
            } => DalError::Conflict {
                field: Some(fallback),
                message,
            },
            DalError::Constraint {
                field: None,
                message,
            } => DalError::Constraint {
                field: Some(fallback),
                message,
            },
            other => other,
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            DalError::Validation { field, .. } => Some(field),
            DalError::Conflict { field, .. } | DalError::Constraint { field, .. } => *field,
            DalError::Unavailable(_) | DalError::Store(_) => None,
        }
    }

    /// Stable code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            DalError::Unavailable(_) => "store_unavailable",
            DalError::Validation { .. } => "validation_failed",
            DalError::Conflict { .. } => "conflict",
            DalError::Constraint { .. } => "constraint_failed",
            DalError::Store(_) => "db_error",
        }
    }
}
