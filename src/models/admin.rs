use serde::{Deserialize, Serialize};

/// Admin identity; lives only as long as the admin session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}
