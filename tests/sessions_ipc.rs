use rusqlite::Connection;
use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_tutoringd");
    let mut child = Command::new(exe)
        .env_remove("TUTORINGD_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn tutoringd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_of(value: &serde_json::Value) -> (String, Option<String>) {
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(false), "expected failure: {}", value);
    let error = value.get("error").expect("error object");
    let code = error
        .get("code")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let field = error
        .get("details")
        .and_then(|d| d.get("field"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    (code, field)
}

fn seed_subject(workspace: &Path, name: &str) -> i64 {
    let conn = Connection::open(workspace.join("tutoring.sqlite3")).expect("open db");
    conn.execute("INSERT INTO Subject(subject_name) VALUES(?)", [name])
        .expect("insert subject");
    conn.last_insert_rowid()
}

fn create_student(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    n: u32,
    name: &str,
    role: &str,
) -> i64 {
    let res = request_ok(
        stdin,
        reader,
        &format!("s{n}"),
        "students.create",
        json!({
            "name": name,
            "email": format!("learner{n}@college.in"),
            "phNo": format!("81000000{:02}", n),
            "dept": "Maths",
            "year": "1",
            "role": role,
        }),
    );
    res.get("studentId").and_then(|v| v.as_i64()).expect("studentId")
}

fn session_statuses(result: &serde_json::Value) -> Vec<(i64, String)> {
    result
        .get("sessions")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|s| {
            (
                s.get("sessionId").and_then(|v| v.as_i64()).expect("sessionId"),
                s.get("status").and_then(|v| v.as_str()).expect("status").to_string(),
            )
        })
        .collect()
}

#[test]
fn session_schedule_status_and_cancel_over_ipc() {
    let workspace = temp_dir("tutoring-sessions-ipc");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let subject = seed_subject(&workspace, "Organic Chemistry");
    let subjects = request_ok(&mut stdin, &mut reader, "2", "subjects.list", json!({}));
    assert_eq!(
        subjects
            .get("subjects")
            .and_then(|v| v.as_array())
            .and_then(|a| a.first())
            .and_then(|s| s.get("subjectName"))
            .and_then(|v| v.as_str()),
        Some("Organic Chemistry")
    );

    let mentor = create_student(&mut stdin, &mut reader, 1, "Gita", "mentor");
    let m1 = create_student(&mut stdin, &mut reader, 2, "Hemant", "mentee");
    let m2 = create_student(&mut stdin, &mut reader, 3, "Indu", "mentee");

    let older = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "sessions.schedule",
        json!({
            "subjectId": subject,
            "dateTime": "2026-09-01 10:00",
            "duration": 45,
            "mentorId": mentor,
            "menteeIds": format!("{m1},{m2}"),
        }),
    )
    .get("sessionId")
    .and_then(|v| v.as_i64())
    .expect("sessionId");
    let newer = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "sessions.schedule",
        json!({
            "subjectId": subject,
            "dateTime": "2026-10-01T10:00:00",
            "duration": 90,
            "mentorId": mentor,
            "menteeIds": [m2],
        }),
    )
    .get("sessionId")
    .and_then(|v| v.as_i64())
    .expect("sessionId");

    let listed = request_ok(&mut stdin, &mut reader, "5", "sessions.list", json!({}));
    assert_eq!(
        session_statuses(&listed),
        vec![
            (newer, "scheduled".to_string()),
            (older, "scheduled".to_string()),
        ]
    );

    let participants = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "sessions.participants",
        json!({ "sessionId": older }),
    );
    let ids: Vec<i64> = participants
        .get("participants")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.get("studentId").and_then(|v| v.as_i64()))
        .collect();
    assert_eq!(ids, vec![mentor, m1, m2]);

    for (i, status) in ["completed", "scheduled", "cancelled", "completed"].iter().enumerate() {
        let res = request_ok(
            &mut stdin,
            &mut reader,
            &format!("st{i}"),
            "sessions.updateStatus",
            json!({ "sessionId": older, "status": status }),
        );
        assert_eq!(res.get("updated").and_then(|v| v.as_u64()), Some(1));
    }
    let bad_status = request(
        &mut stdin,
        &mut reader,
        "7",
        "sessions.updateStatus",
        json!({ "sessionId": older, "status": "postponed" }),
    );
    assert_eq!(
        error_of(&bad_status),
        ("validation_failed".to_string(), Some("status".to_string()))
    );

    let listed = request_ok(&mut stdin, &mut reader, "8", "sessions.list", json!({}));
    assert_eq!(session_statuses(&listed)[1], (older, "completed".to_string()));

    let cancelled = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "sessions.cancel",
        json!({ "sessionId": older }),
    );
    assert_eq!(cancelled.get("deleted").and_then(|v| v.as_u64()), Some(1));

    let conn = Connection::open(workspace.join("tutoring.sqlite3")).expect("open db");
    let left: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM SessionParticipant WHERE session_id = ?",
            [older],
            |r| r.get(0),
        )
        .expect("count");
    assert_eq!(left, 0);
}

#[test]
fn session_without_mentees_is_rejected() {
    let workspace = temp_dir("tutoring-sessions-empty");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let subject = seed_subject(&workspace, "Statics");
    let mentor = create_student(&mut stdin, &mut reader, 1, "Jaya", "mentor");

    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "sessions.schedule",
        json!({
            "subjectId": subject,
            "dateTime": "2026-09-01 10:00",
            "duration": 30,
            "mentorId": mentor,
            "menteeIds": "",
        }),
    );
    assert_eq!(
        error_of(&resp),
        ("validation_failed".to_string(), Some("menteeIds".to_string()))
    );

    let conn = Connection::open(workspace.join("tutoring.sqlite3")).expect("open db");
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM MentorshipSession", [], |r| r.get(0))
        .expect("count");
    assert_eq!(n, 0);
}
