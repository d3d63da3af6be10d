use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dal) = state.dal.as_ref() else {
        return ok(&req.id, json!({ "subjects": [] }));
    };
    ok(&req.id, json!({ "subjects": dal.fetch_subjects() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(handle_subjects_list(state, req)),
        _ => None,
    }
}
