use super::models::{Role, Student, StudentInput, StudentOption, StudentUpdate};
use super::validate::{self, ValidStudent};
use super::{Dal, DalError};
use rusqlite::Row;

// Column or constraint name in the violation detail -> field on the wire.
const STUDENT_FIELDS: [(&str, &str); 7] = [
    ("student.email", "email"),
    ("student.ph_no", "phNo"),
    ("chk_student_ph_no", "phNo"),
    ("chk_student_year", "year"),
    ("chk_student_role", "role"),
    ("chk_student_name", "name"),
    ("student.name", "name"),
];

/// Store failure -> message the form can show next to the offending field.
fn student_store_error(e: rusqlite::Error) -> DalError {
    match DalError::from_store(e, &STUDENT_FIELDS) {
        DalError::Conflict { field, .. } => {
            let message = match field {
                Some("email") => "this email is already registered",
                Some("phNo") => "this phone number is already registered",
                _ => "duplicate value detected",
            };
            DalError::Conflict {
                field,
                message: message.to_string(),
            }
        }
        DalError::Constraint { field, .. } => {
            let message = match field {
                Some("year") => "year must be between 1 and 4",
                Some("phNo") => "phone number must have 10 digits",
                _ => "input does not meet required conditions",
            };
            DalError::Constraint {
                field,
                message: message.to_string(),
            }
        }
        other => other,
    }
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        student_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        ph_no: row.get(3)?,
        dept: row.get(4)?,
        year: row.get(5)?,
        role: row.get(6)?,
    })
}

impl Dal {
    pub fn fetch_students(&self) -> Vec<Student> {
        self.read("students.fetch", |conn| {
            let mut stmt = conn.prepare(
                "SELECT student_id, name, email, ph_no, dept, year, role
                 FROM Student
                 ORDER BY student_id",
            )?;
            let rows = stmt
                .query_map([], student_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn fetch_students_by_role(&self, role: Role) -> Vec<StudentOption> {
        self.read("students.by_role", |conn| {
            let mut stmt = conn.prepare(
                "SELECT student_id, name FROM Student WHERE role = ? ORDER BY name",
            )?;
            let rows = stmt
                .query_map([role], |row| {
                    Ok(StudentOption {
                        student_id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Validates, then inserts. Returns the new student's identifier.
    pub fn add_student(&self, input: &StudentInput) -> Result<i64, DalError> {
        let s = validate::student(input)?;
        self.write("students.add", |tx| {
            tx.execute(
                "INSERT INTO Student(name, email, ph_no, dept, year, role)
                 VALUES(?, ?, ?, ?, ?, ?)",
                (&s.name, &s.email, &s.ph_no, &s.dept, s.year, s.role),
            )
            .map_err(student_store_error)?;
            let id = tx.last_insert_rowid();
            tracing::info!(student_id = id, name = %s.name, "student added");
            Ok(id)
        })
    }

    /// Overwrites every mutable field. Returns rows affected; zero is not an
    /// error.
    pub fn update_student(&self, update: &StudentUpdate) -> Result<usize, DalError> {
        let ValidStudent {
            name,
            email,
            ph_no,
            dept,
            year,
            role,
        } = validate::student(&update.fields)?;
        self.write("students.update", |tx| {
            let n = tx
                .execute(
                    "UPDATE Student
                     SET name = ?, email = ?, ph_no = ?, dept = ?, year = ?, role = ?
                     WHERE student_id = ?",
                    (&name, &email, &ph_no, &dept, year, role, update.student_id),
                )
                .map_err(student_store_error)?;
            Ok(n)
        })
    }

    /// Removes the student together with their team memberships, session
    /// participations and feedback. Teams they mentor survive without a
    /// mentor.
    pub fn delete_student(&self, student_id: i64) -> Result<usize, DalError> {
        self.write("students.delete", |tx| {
            let n = tx.execute("DELETE FROM Student WHERE student_id = ?", [student_id])?;
            Ok(n)
        })
    }
}
