use crate::dal::Dal;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    /// Set once a workspace is selected. Holds configuration only; every
    /// request opens its own connection.
    pub dal: Option<Dal>,
    pub busy_timeout: Duration,
}

impl AppState {
    pub fn new(busy_timeout: Duration) -> Self {
        Self {
            dal: None,
            busy_timeout,
        }
    }
}
