use serde::{Deserialize, Serialize};

use super::common::Flag;

/// Uploaded payment-proof image reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    #[serde(rename = "_id", default)]
    pub id: String,
    /// URL of the stored image
    #[serde(rename = "screen_shot", default)]
    pub url: String,
    #[serde(rename = "isActive", default)]
    pub is_active: Flag,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
