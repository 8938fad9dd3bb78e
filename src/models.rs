use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ConnectQuery {
    pub user_id: Option<String>,
    #[serde(alias = "email")]
    pub identity: Option<String>,
    #[serde(alias = "password")]
    pub secret: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HrvQuery {
    pub user_id: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SleepResponse {
    pub date: String,
    pub sleep: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HrvResponse {
    pub date: String,
    pub operation: String,
    pub hrv: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub connected: bool,
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub user_id: String,
    pub connected: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisconnectResponse {
    pub disconnected: bool,
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<String>>,
}
