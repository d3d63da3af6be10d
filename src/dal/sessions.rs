use super::models::{Member, NewSession, Role, Session, SessionStatus};
use super::{require_mentor, validate, Dal, DalError};

impl Dal {
    /// Most recent first.
    pub fn fetch_sessions(&self) -> Vec<Session> {
        self.read("sessions.fetch", |conn| {
            let mut stmt = conn.prepare(
                "SELECT ms.session_id, sub.subject_name, ms.date_time, ms.duration, ms.status
                 FROM MentorshipSession ms
                 LEFT JOIN Subject sub ON sub.subject_id = ms.subject_id
                 ORDER BY ms.date_time DESC, ms.session_id DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Session {
                        session_id: row.get(0)?,
                        subject_name: row.get(1)?,
                        date_time: row.get(2)?,
                        duration: row.get(3)?,
                        status: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn fetch_session_participants(&self, session_id: i64) -> Vec<Member> {
        self.read("sessions.participants", |conn| {
            let mut stmt = conn.prepare(
                "SELECT s.student_id, s.name, sp.role
                 FROM SessionParticipant sp
                 JOIN Student s ON s.student_id = sp.student_id
                 WHERE sp.session_id = ?
                 ORDER BY CASE sp.role WHEN 'mentor' THEN 0 ELSE 1 END, s.name",
            )?;
            let rows = stmt
                .query_map([session_id], |row| {
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

    /// Creates the session (status `scheduled`) and a participant row for the
    /// mentor and each mentee, all or nothing. Returns the session identifier.
    pub fn schedule_session(&self, session: &NewSession) -> Result<i64, DalError> {
        if session.mentee_ids.is_empty() {
            return Err(DalError::validation(
                "menteeIds",
                "select at least one mentee",
            ));
        }
        let date_time = validate::date_time(&session.date_time)?;
        let duration = validate::duration(session.duration)?;
        validate::mentor_not_mentee(session.mentor_id, &session.mentee_ids)?;

        self.write("sessions.schedule", |tx| {
            require_mentor(tx, session.mentor_id)?;
            tx.execute(
                "INSERT INTO MentorshipSession(subject_id, date_time, duration, status)
                 VALUES(?, ?, ?, ?)",
                (
                    session.subject_id,
                    date_time,
                    duration,
                    SessionStatus::Scheduled,
                ),
            )
            .map_err(|e| {
                DalError::from_store(e, &[("chk_session_duration", "duration")])
                    .or_field("subjectId")
            })?;
            let session_id = tx.last_insert_rowid();

            let mut insert = tx.prepare(
                "INSERT INTO SessionParticipant(session_id, student_id, role) VALUES(?, ?, ?)",
            )?;
            insert
                .execute((session_id, session.mentor_id, Role::Mentor))
                .map_err(|e| DalError::from_store(e, &[]).or_field("mentorId"))?;
            for &mentee_id in session.mentee_ids.as_slice() {
                insert
                    .execute((session_id, mentee_id, Role::Mentee))
                    .map_err(|e| DalError::from_store(e, &[]).or_field("menteeIds"))?;
            }

            tracing::info!(
                session_id,
                mentor_id = session.mentor_id,
                mentees = session.mentee_ids.as_slice().len(),
                "session scheduled"
            );
            Ok(session_id)
        })
    }

    /// Any status may follow any other.
    pub fn update_session_status(
        &self,
        session_id: i64,
        status: SessionStatus,
    ) -> Result<usize, DalError> {
        self.write("sessions.update_status", |tx| {
            let n = tx.execute(
                "UPDATE MentorshipSession SET status = ? WHERE session_id = ?",
                (status, session_id),
            )?;
            Ok(n)
        })
    }

    /// Deletes the session; participants and feedback go with it.
    pub fn cancel_session(&self, session_id: i64) -> Result<usize, DalError> {
        self.write("sessions.cancel", |tx| {
            let n = tx.execute(
                "DELETE FROM MentorshipSession WHERE session_id = ?",
                [session_id],
            )?;
            Ok(n)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::IdSet;
    use super::*;
    use chrono::NaiveDateTime;

    struct Fixture {
        subject: i64,
        mentor: i64,
        mentees: Vec<i64>,
    }

    fn fixture(dal: &Dal) -> Fixture {
        let subject = seed_subject(dal, "Calculus");
        let mentor = dal.add_student(&student("Hari", 1, "mentor")).expect("mentor");
        let mentees = vec![
            dal.add_student(&student("Lata", 2, "mentee")).expect("mentee"),
            dal.add_student(&student("Mona", 3, "mentee")).expect("mentee"),
        ];
        Fixture {
            subject,
            mentor,
            mentees,
        }
    }

    fn new_session(f: &Fixture, when: &str, mentees: &[i64]) -> NewSession {
        NewSession {
            subject_id: f.subject,
            date_time: when.to_string(),
            duration: 60,
            mentor_id: f.mentor,
            mentee_ids: IdSet::from_ids(mentees.iter().copied()),
        }
    }

    #[test]
    fn schedule_creates_session_and_all_participants() {
        let dal = fresh_dal("tutoring-sessions-schedule");
        let f = fixture(&dal);
        let id = dal
            .schedule_session(&new_session(&f, "2026-11-02 16:00", &f.mentees))
            .expect("schedule");

        let sessions = dal.fetch_sessions();
        assert_eq!(sessions.len(), 1);
        let s = &sessions[0];
        assert_eq!(s.session_id, id);
        assert_eq!(s.subject_name.as_deref(), Some("Calculus"));
        assert_eq!(s.duration, 60);
        assert_eq!(s.status, SessionStatus::Scheduled);
        assert_eq!(
            s.date_time,
            NaiveDateTime::parse_from_str("2026-11-02 16:00:00", "%Y-%m-%d %H:%M:%S").expect("dt")
        );

        let people: Vec<_> = dal
            .fetch_session_participants(id)
            .into_iter()
            .map(|m| (m.student_id, m.role))
            .collect();
        assert_eq!(
            people,
            vec![
                (f.mentor, Role::Mentor),
                (f.mentees[0], Role::Mentee),
                (f.mentees[1], Role::Mentee),
            ]
        );
    }

    #[test]
    fn zero_mentees_is_rejected_before_store_access() {
        let dal = fresh_dal("tutoring-sessions-no-mentees");
        let f = fixture(&dal);
        // Point at a missing store: validation must fire first.
        let offline = Dal::new(crate::config::StoreConfig::new(temp_dir("tutoring-offline")));
        let e = offline
            .schedule_session(&new_session(&f, "2026-11-02 16:00", &[]))
            .expect_err("no mentees");
        assert!(matches!(e, DalError::Validation { field: "menteeIds", .. }), "{e:?}");
        assert_eq!(count(&dal, "SELECT COUNT(*) FROM MentorshipSession"), 0);
    }

    #[test]
    fn unknown_mentee_leaves_no_session_behind() {
        let dal = fresh_dal("tutoring-sessions-rollback");
        let f = fixture(&dal);
        let e = dal
            .schedule_session(&new_session(&f, "2026-11-02 16:00", &[f.mentees[0], 4242]))
            .expect_err("unknown mentee");
        assert!(matches!(e, DalError::Constraint { field: Some("menteeIds"), .. }), "{e:?}");
        assert_eq!(count(&dal, "SELECT COUNT(*) FROM MentorshipSession"), 0);
        assert_eq!(count(&dal, "SELECT COUNT(*) FROM SessionParticipant"), 0);
    }

    #[test]
    fn unknown_subject_is_a_constraint_failure() {
        let dal = fresh_dal("tutoring-sessions-subject");
        let f = fixture(&dal);
        let s = NewSession {
            subject_id: f.subject + 99,
            ..new_session(&f, "2026-11-02 16:00", &f.mentees)
        };
        let e = dal.schedule_session(&s).expect_err("unknown subject");
        assert!(matches!(e, DalError::Constraint { field: Some("subjectId"), .. }), "{e:?}");
    }

    #[test]
    fn bad_date_time_or_duration_is_a_validation_failure() {
        let dal = fresh_dal("tutoring-sessions-fields");
        let f = fixture(&dal);
        let e = dal
            .schedule_session(&new_session(&f, "next tuesday", &f.mentees))
            .expect_err("date");
        assert!(matches!(e, DalError::Validation { field: "dateTime", .. }));

        let s = NewSession {
            duration: 0,
            ..new_session(&f, "2026-11-02 16:00", &f.mentees)
        };
        let e = dal.schedule_session(&s).expect_err("duration");
        assert!(matches!(e, DalError::Validation { field: "duration", .. }));
    }

    #[test]
    fn sessions_list_most_recent_first() {
        let dal = fresh_dal("tutoring-sessions-order");
        let f = fixture(&dal);
        let early = dal
            .schedule_session(&new_session(&f, "2026-01-05 09:00", &f.mentees))
            .expect("early");
        let late = dal
            .schedule_session(&new_session(&f, "2026-12-05 09:00", &f.mentees))
            .expect("late");
        let mid = dal
            .schedule_session(&new_session(&f, "2026-06-05T09:00", &f.mentees))
            .expect("mid");
        let order: Vec<_> = dal.fetch_sessions().into_iter().map(|s| s.session_id).collect();
        assert_eq!(order, vec![late, mid, early]);
    }

    #[test]
    fn status_moves_freely_in_any_direction() {
        let dal = fresh_dal("tutoring-sessions-status");
        let f = fixture(&dal);
        let id = dal
            .schedule_session(&new_session(&f, "2026-11-02 16:00", &f.mentees))
            .expect("schedule");
        for status in [
            SessionStatus::Completed,
            SessionStatus::Cancelled,
            SessionStatus::Scheduled,
            SessionStatus::Cancelled,
            SessionStatus::Completed,
        ] {
            assert_eq!(dal.update_session_status(id, status).expect("update"), 1);
            assert_eq!(dal.fetch_sessions()[0].status, status);
        }
        assert_eq!(
            dal.update_session_status(id + 7, SessionStatus::Completed)
                .expect("missing row is fine"),
            0
        );
    }

    #[test]
    fn cancel_removes_participants_and_feedback() {
        let dal = fresh_dal("tutoring-sessions-cancel");
        let f = fixture(&dal);
        let id = dal
            .schedule_session(&new_session(&f, "2026-11-02 16:00", &f.mentees))
            .expect("schedule");
        raw(&dal)
            .execute(
                "INSERT INTO Feedback(session_id, student_id, rating, comments) VALUES(?, ?, 5, 'great')",
                (id, f.mentees[0]),
            )
            .expect("feedback");

        assert_eq!(dal.cancel_session(id).expect("cancel"), 1);
        assert!(dal.fetch_sessions().is_empty());
        assert!(dal.fetch_session_participants(id).is_empty());
        assert_eq!(count(&dal, "SELECT COUNT(*) FROM SessionParticipant"), 0);
        assert_eq!(count(&dal, "SELECT COUNT(*) FROM Feedback"), 0);
    }
}
