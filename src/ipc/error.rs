use crate::dal::DalError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn dal_err(id: &str, e: &DalError) -> serde_json::Value {
    let details = e.field().map(|f| json!({ "field": f }));
    err(id, e.code(), e.to_string(), details)
}

pub fn no_workspace(id: &str) -> serde_json::Value {
    err(id, "store_unavailable", "select a workspace first", None)
}
