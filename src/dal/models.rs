use super::error::DalError;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mentor,
    Mentee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Mentor => "mentor",
            Role::Mentee => "mentee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mentor" => Ok(Role::Mentor),
            "mentee" => Ok(Role::Mentee),
            _ => Err(DalError::validation(
                "role",
                "role must be 'mentor' or 'mentee'",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = DalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            _ => Err(DalError::validation(
                "status",
                "status must be 'scheduled', 'completed' or 'cancelled'",
            )),
        }
    }
}

// Both enums are stored as their lowercase text.
macro_rules! text_column {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                s.parse().map_err(|e: DalError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_column!(Role);
text_column!(SessionStatus);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub ph_no: String,
    pub dept: String,
    pub year: i64,
    pub role: Role,
}

/// Dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentOption {
    pub student_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub subject_id: i64,
    pub subject_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: i64,
    pub team_name: String,
    pub mentor_name: Option<String>,
    pub creation_date: NaiveDate,
}

/// A team member or session participant. `role` is the value recorded when
/// the row was created, not the student's current role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub student_id: i64,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: i64,
    pub subject_name: Option<String>,
    pub date_time: NaiveDateTime,
    pub duration: i64,
    pub status: SessionStatus,
}

/// Raw student form fields, as typed by the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentInput {
    pub name: String,
    pub email: String,
    pub ph_no: String,
    pub dept: String,
    #[serde(deserialize_with = "text_or_number")]
    pub year: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentUpdate {
    pub student_id: i64,
    #[serde(flatten)]
    pub fields: StudentInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTeam {
    pub team_name: String,
    pub mentor_id: Option<i64>,
    pub mentee_ids: IdSet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub subject_id: i64,
    pub date_time: String,
    pub duration: i64,
    pub mentor_id: i64,
    #[serde(default)]
    pub mentee_ids: IdSet,
}

/// Ordered set of student identifiers. Accepts a JSON list of integers or the
/// comma-delimited text form ("7, 9"); duplicates collapse to the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "IdSetRepr")]
pub struct IdSet(Vec<i64>);

#[derive(Deserialize)]
#[serde(untagged)]
enum IdSetRepr {
    List(Vec<i64>),
    Delimited(String),
}

impl TryFrom<IdSetRepr> for IdSet {
    type Error = DalError;

    fn try_from(repr: IdSetRepr) -> Result<Self, Self::Error> {
        match repr {
            IdSetRepr::List(ids) => Ok(IdSet::from_ids(ids)),
            IdSetRepr::Delimited(text) => IdSet::parse_delimited(&text),
        }
    }
}

impl IdSet {
    pub fn from_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        let mut out: Vec<i64> = Vec::new();
        for id in ids {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        IdSet(out)
    }

    pub fn parse_delimited(text: &str) -> Result<Self, DalError> {
        let mut ids = Vec::new();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let id = part.parse::<i64>().map_err(|_| {
                DalError::validation("menteeIds", format!("'{part}' is not a student id"))
            })?;
            ids.push(id);
        }
        Ok(IdSet::from_ids(ids))
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Int(n) => n.to_string(),
        TextOrNumber::Float(n) => n.to_string(),
    })
}
