use super::models::{Member, NewTeam, Role, Team};
use super::{require_mentor, validate, Dal, DalError};
use chrono::Local;

impl Dal {
    /// Teams by name. A team whose mentor was deleted still shows, with no
    /// mentor name.
    pub fn fetch_teams(&self) -> Vec<Team> {
        self.read("teams.fetch", |conn| {
            let mut stmt = conn.prepare(
                "SELECT t.team_id, t.team_name, s.name, t.creation_date
                 FROM Team t
                 LEFT JOIN Student s ON s.student_id = t.mentor_id
                 ORDER BY t.team_name, t.team_id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Team {
                        team_id: row.get(0)?,
                        team_name: row.get(1)?,
                        mentor_name: row.get(2)?,
                        creation_date: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn fetch_team_members(&self, team_id: i64) -> Vec<Member> {
        self.read("teams.members", |conn| {
            let mut stmt = conn.prepare(
                "SELECT s.student_id, s.name, tm.role
                 FROM TeamMember tm
                 JOIN Student s ON s.student_id = tm.student_id
                 WHERE tm.team_id = ?
                 ORDER BY CASE tm.role WHEN 'mentor' THEN 0 ELSE 1 END, s.name",
            )?;
            let rows = stmt
                .query_map([team_id], |row| {
                    Ok(Member {
                        student_id: row.get(0)?,
                        name: row.get(1)?,
                        role: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Inserts the team, its mentor membership and one membership per mentee
    /// as a single unit. Returns the new team's identifier.
    pub fn create_team(&self, team: &NewTeam) -> Result<i64, DalError> {
        let name = validate::team_name(&team.team_name)?;
        let Some(mentor_id) = team.mentor_id else {
            return Err(DalError::validation("mentorId", "a mentor must be selected"));
        };
        validate::mentor_not_mentee(mentor_id, &team.mentee_ids)?;
        let today = Local::now().date_naive();

        self.write("teams.create", |tx| {
            require_mentor(tx, mentor_id)?;
            tx.execute(
                "INSERT INTO Team(team_name, mentor_id, creation_date) VALUES(?, ?, ?)",
                (name, mentor_id, today),
            )
            .map_err(|e| DalError::from_store(e, &[("chk_team_name", "teamName")]))?;
            let team_id = tx.last_insert_rowid();

            let mut insert = tx.prepare(
                "INSERT INTO TeamMember(team_id, student_id, role) VALUES(?, ?, ?)",
            )?;
            insert
                .execute((team_id, mentor_id, Role::Mentor))
                .map_err(|e| DalError::from_store(e, &[]).or_field("mentorId"))?;
            for &mentee_id in team.mentee_ids.as_slice() {
                insert
                    .execute((team_id, mentee_id, Role::Mentee))
                    .map_err(|e| DalError::from_store(e, &[]).or_field("menteeIds"))?;
            }

            tracing::info!(
                team_id,
                mentor_id,
                mentees = team.mentee_ids.as_slice().len(),
                "team created"
            );
            Ok(team_id)
        })
    }

    /// Adds one member. Adding a student who is already on the team is a
    /// conflict on `studentId`.
    pub fn add_member_to_team(
        &self,
        team_id: i64,
        student_id: i64,
        role: Role,
    ) -> Result<(), DalError> {
        self.write("teams.add_member", |tx| {
            tx.execute(
                "INSERT INTO TeamMember(team_id, student_id, role) VALUES(?, ?, ?)",
                (team_id, student_id, role),
            )
            .map_err(|e| match DalError::from_store(e, &[]) {
                DalError::Conflict { .. } => DalError::Conflict {
                    field: Some("studentId"),
                    message: "this student is already in the team".to_string(),
                },
                DalError::Constraint { message, .. } => DalError::Constraint {
                    field: None,
                    message: format!("unknown team or student ({message})"),
                },
                other => other,
            })?;
            Ok(())
        })
    }

    /// Deletes the team; its memberships go with it.
    pub fn delete_team(&self, team_id: i64) -> Result<usize, DalError> {
        self.write("teams.delete", |tx| {
            let n = tx.execute("DELETE FROM Team WHERE team_id = ?", [team_id])?;
            Ok(n)
        })
    }
}
