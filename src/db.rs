use crate::config::StoreConfig;
use anyhow::Context;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

/// Creates the workspace (and database file) if needed and brings the schema
/// up to date. The connection used for this is closed before returning.
pub fn init_store(workspace: &Path, busy_timeout: Duration) -> anyhow::Result<StoreConfig> {
    std::fs::create_dir_all(workspace).with_context(|| {
        format!(
            "failed to create workspace directory {}",
            workspace.to_string_lossy()
        )
    })?;
    let config = StoreConfig::new(workspace).with_busy_timeout(busy_timeout);
    let conn = Connection::open(&config.db_path).with_context(|| {
        format!(
            "failed to open database {}",
            config.db_path.to_string_lossy()
        )
    })?;
    conn.busy_timeout(busy_timeout)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    apply_schema(&conn).context("failed to apply schema")?;
    Ok(config)
}

/// Opens a fresh connection for one unit of work. Never creates the database:
/// a missing file means the store is unavailable.
pub fn connect(config: &StoreConfig) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        &config.db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(config.busy_timeout)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    Ok(conn)
}

fn apply_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS Student(
            student_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            ph_no TEXT NOT NULL,
            dept TEXT NOT NULL DEFAULT '',
            year INTEGER NOT NULL,
            role TEXT NOT NULL,
            CONSTRAINT uq_student_email UNIQUE(email),
            CONSTRAINT uq_student_ph_no UNIQUE(ph_no),
            CONSTRAINT chk_student_name CHECK(length(trim(name)) > 0),
            CONSTRAINT chk_student_ph_no CHECK(length(ph_no) = 10 AND ph_no NOT GLOB '*[^0-9]*'),
            CONSTRAINT chk_student_year CHECK(year BETWEEN 1 AND 4),
            CONSTRAINT chk_student_role CHECK(role IN ('mentor', 'mentee'))
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_student_role_name ON Student(role, name)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS Subject(
            subject_id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_name TEXT NOT NULL UNIQUE
        )",
        [],
    )?;

    // A deleted mentor leaves the team in place with no resolvable mentor.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS Team(
            team_id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_name TEXT NOT NULL,
            mentor_id INTEGER,
            creation_date TEXT NOT NULL DEFAULT (date('now')),
            CONSTRAINT chk_team_name CHECK(length(trim(team_name)) > 0),
            FOREIGN KEY(mentor_id) REFERENCES Student(student_id) ON DELETE SET NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS TeamMember(
            team_id INTEGER NOT NULL,
            student_id INTEGER NOT NULL,
            role TEXT NOT NULL,
            PRIMARY KEY(team_id, student_id),
            CONSTRAINT chk_team_member_role CHECK(role IN ('mentor', 'mentee')),
            FOREIGN KEY(team_id) REFERENCES Team(team_id) ON DELETE CASCADE,
            FOREIGN KEY(student_id) REFERENCES Student(student_id) ON DELETE CASCADE
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_team_member_student ON TeamMember(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS MentorshipSession(
            session_id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_id INTEGER,
            date_time TEXT NOT NULL,
            duration INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'scheduled',
            CONSTRAINT chk_session_duration CHECK(duration > 0),
            CONSTRAINT chk_session_status CHECK(status IN ('scheduled', 'completed', 'cancelled')),
            FOREIGN KEY(subject_id) REFERENCES Subject(subject_id) ON DELETE SET NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_session_date_time ON MentorshipSession(date_time)",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS SessionParticipant(
            session_id INTEGER NOT NULL,
            student_id INTEGER NOT NULL,
            role TEXT NOT NULL,
            PRIMARY KEY(session_id, student_id),
            CONSTRAINT chk_participant_role CHECK(role IN ('mentor', 'mentee')),
            FOREIGN KEY(session_id) REFERENCES MentorshipSession(session_id) ON DELETE CASCADE,
            FOREIGN KEY(student_id) REFERENCES Student(student_id) ON DELETE CASCADE
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_session_participant_student ON SessionParticipant(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS Feedback(
            feedback_id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL,
            student_id INTEGER NOT NULL,
            rating INTEGER NOT NULL,
            comments TEXT,
            CONSTRAINT chk_feedback_rating CHECK(rating BETWEEN 1 AND 5),
            FOREIGN KEY(session_id) REFERENCES MentorshipSession(session_id) ON DELETE CASCADE,
            FOREIGN KEY(student_id) REFERENCES Student(student_id) ON DELETE CASCADE
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_feedback_session ON Feedback(session_id)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
pub(crate) fn table_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}
