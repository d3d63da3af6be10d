use crate::dal::{Role, StudentInput, StudentUpdate};
use crate::ipc::error::{dal_err, no_workspace, ok};
use crate::ipc::helpers::{parse_params, required_i64, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return ok(&req.id, json!({ "students": [] }));
    };
    ok(&req.id, json!({ "students": dal.fetch_students() }))
}

fn handle_students_by_role(state: &mut AppState, req: &Request) -> serde_json::Value {
    let role: Role = match required_str(req, "role").map(str::parse::<Role>) {
        Ok(Ok(r)) => r,
        Ok(Err(e)) => return dal_err(&req.id, &e),
        Err(resp) => return resp,
    };
    let Some(dal) = state.dal.as_ref() else {
        return ok(&req.id, json!({ "students": [] }));
    };
    ok(&req.id, json!({ "students": dal.fetch_students_by_role(role) }))
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return no_workspace(&req.id);
    };
    let input: StudentInput = match parse_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match dal.add_student(&input) {
        Ok(student_id) => ok(&req.id, json!({ "studentId": student_id })),
        Err(e) => dal_err(&req.id, &e),
    }
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return no_workspace(&req.id);
    };
    let update: StudentUpdate = match parse_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match dal.update_student(&update) {
        Ok(n) => ok(&req.id, json!({ "updated": n })),
        Err(e) => dal_err(&req.id, &e),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return no_workspace(&req.id);
    };
    let student_id = match required_i64(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match dal.delete_student(student_id) {
        Ok(n) => ok(&req.id, json!({ "deleted": n })),
        Err(e) => dal_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.byRole" => Some(handle_students_by_role(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
