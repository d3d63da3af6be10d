use crate::dal::{NewTeam, Role};
use crate::ipc::error::{dal_err, no_workspace, ok};
use crate::ipc::helpers::{parse_params, required_i64, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_teams_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return ok(&req.id, json!({ "teams": [] }));
    };
    ok(&req.id, json!({ "teams": dal.fetch_teams() }))
}

fn handle_teams_members(state: &mut AppState, req: &Request) -> serde_json::Value {
    let team_id = match required_i64(req, "teamId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(dal) = state.dal.as_ref() else {
        return ok(&req.id, json!({ "members": [] }));
    };
    ok(&req.id, json!({ "members": dal.fetch_team_members(team_id) }))
}

fn handle_teams_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return no_workspace(&req.id);
    };
    let team: NewTeam = match parse_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match dal.create_team(&team) {
        Ok(team_id) => ok(&req.id, json!({ "teamId": team_id })),
        Err(e) => dal_err(&req.id, &e),
    }
}

fn handle_teams_add_member(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return no_workspace(&req.id);
    };
    let (team_id, student_id, role) = match (
        required_i64(req, "teamId"),
        required_i64(req, "studentId"),
        required_str(req, "role"),
    ) {
        (Ok(t), Ok(s), Ok(r)) => (t, s, r),
        (Err(resp), _, _) | (_, Err(resp), _) | (_, _, Err(resp)) => return resp,
    };
    let role: Role = match role.parse() {
        Ok(r) => r,
        Err(e) => return dal_err(&req.id, &e),
    };
    match dal.add_member_to_team(team_id, student_id, role) {
        Ok(()) => ok(&req.id, json!({})),
        Err(e) => dal_err(&req.id, &e),
    }
}

fn handle_teams_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return no_workspace(&req.id);
    };
    let team_id = match required_i64(req, "teamId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match dal.delete_team(team_id) {
        Ok(n) => ok(&req.id, json!({ "deleted": n })),
        Err(e) => dal_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teams.list" => Some(handle_teams_list(state, req)),
        "teams.members" => Some(handle_teams_members(state, req)),
        "teams.create" => Some(handle_teams_create(state, req)),
        "teams.addMember" => Some(handle_teams_add_member(state, req)),
        "teams.delete" => Some(handle_teams_delete(state, req)),
        _ => None,
    }
}
