use super::error::DalError;
use super::models::{IdSet, Role, StudentInput};
use chrono::NaiveDateTime;

/// Student fields that passed the form rules and are ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStudent {
    pub name: String,
    pub email: String,
    pub ph_no: String,
    pub dept: String,
    pub year: i64,
    pub role: Role,
}

/// Checks the form rules in order and reports the first one broken.
pub fn student(input: &StudentInput) -> Result<ValidStudent, DalError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(DalError::validation("name", "student name cannot be empty"));
    }

    let email = input.email.trim();
    if !email.contains('@') || !email.contains('.') {
        return Err(DalError::validation(
            "email",
            "please enter a valid email address",
        ));
    }

    let ph_no = input.ph_no.trim();
    if ph_no.len() != 10 || !ph_no.chars().all(|c| c.is_ascii_digit()) {
        return Err(DalError::validation(
            "phNo",
            "phone number must be exactly 10 digits",
        ));
    }

    let year = match input.year.trim().parse::<i64>() {
        Ok(y) if (1..=4).contains(&y) => y,
        Ok(_) => return Err(DalError::validation("year", "year must be between 1 and 4")),
        Err(_) => {
            return Err(DalError::validation(
                "year",
                "year must be a number between 1 and 4",
            ))
        }
    };

    let role: Role = input.role.parse()?;

    Ok(ValidStudent {
        name: name.to_string(),
        email: email.to_string(),
        ph_no: ph_no.to_string(),
        dept: input.dept.trim().to_string(),
        year,
        role,
    })
}

pub fn team_name(name: &str) -> Result<&str, DalError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DalError::validation("teamName", "team name is required"));
    }
    Ok(name)
}

pub fn mentor_not_mentee(mentor_id: i64, mentees: &IdSet) -> Result<(), DalError> {
    if mentees.contains(mentor_id) {
        return Err(DalError::validation(
            "menteeIds",
            "the mentor cannot also be listed as a mentee",
        ));
    }
    Ok(())
}

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

pub fn date_time(text: &str) -> Result<NaiveDateTime, DalError> {
    let text = text.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .ok_or_else(|| {
            DalError::validation("dateTime", "date-time must look like YYYY-MM-DD HH:MM")
        })
}

pub fn duration(minutes: i64) -> Result<i64, DalError> {
    if minutes <= 0 {
        return Err(DalError::validation(
            "duration",
            "duration must be a positive number of minutes",
        ));
    }
    Ok(minutes)
}
