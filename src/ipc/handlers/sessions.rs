use crate::dal::{NewSession, SessionStatus};
use crate::ipc::error::{dal_err, no_workspace, ok};
use crate::ipc::helpers::{parse_params, required_i64, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_sessions_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return ok(&req.id, json!({ "sessions": [] }));
    };
    ok(&req.id, json!({ "sessions": dal.fetch_sessions() }))
}

fn handle_sessions_participants(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session_id = match required_i64(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(dal) = state.dal.as_ref() else {
        return ok(&req.id, json!({ "participants": [] }));
    };
    ok(
        &req.id,
        json!({ "participants": dal.fetch_session_participants(session_id) }),
    )
}

fn handle_sessions_schedule(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return no_workspace(&req.id);
    };
    let session: NewSession = match parse_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match dal.schedule_session(&session) {
        Ok(session_id) => ok(&req.id, json!({ "sessionId": session_id })),
        Err(e) => dal_err(&req.id, &e),
    }
}

fn handle_sessions_update_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return no_workspace(&req.id);
    };
    let session_id = match required_i64(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status: SessionStatus = match required_str(req, "status").map(str::parse::<SessionStatus>) {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return dal_err(&req.id, &e),
        Err(resp) => return resp,
    };
    match dal.update_session_status(session_id, status) {
        Ok(n) => ok(&req.id, json!({ "updated": n })),
        Err(e) => dal_err(&req.id, &e),
    }
}

fn handle_sessions_cancel(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return no_workspace(&req.id);
    };
    let session_id = match required_i64(req, "sessionId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match dal.cancel_session(session_id) {
        Ok(n) => ok(&req.id, json!({ "deleted": n })),
        Err(e) => dal_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "sessions.list" => Some(handle_sessions_list(state, req)),
        "sessions.participants" => Some(handle_sessions_participants(state, req)),
        "sessions.schedule" => Some(handle_sessions_schedule(state, req)),
        "sessions.updateStatus" => Some(handle_sessions_update_status(state, req)),
        "sessions.cancel" => Some(handle_sessions_cancel(state, req)),
        _ => None,
    }
}
