use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    /// Display name from the user directory, when the subject is still listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Access token expiry, unix seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}
