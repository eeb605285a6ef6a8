use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every non-2xx response. Also decoded by `client::api_client`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorPayload {
    pub message: String,
    /// HTTP status code
    pub code: u16,
    /// Machine-readable error kind, e.g. `NOT_FOUND`
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
