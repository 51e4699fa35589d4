//! Portal response envelopes.
//!
//! Every portal endpoint answers with `{success, message?, ...}`. The server
//! serializes these and the client session context reads them back, so
//! failure replies (which carry only `success` and `message`) must still
//! deserialize: every payload field is optional or defaulted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Admin, Customer, ScratchCard, Screenshot};

/// Bare `{success, message}` reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MessageReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Identity summary returned by a completed phone/OTP login
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub phone: String,
    /// Customer name, or `false` on the wire when the backend has none
    #[serde(default = "no_customer")]
    pub customer: Value,
}

fn no_customer() -> Value {
    Value::Bool(false)
}

impl UserSummary {
    pub fn new(phone: impl Into<String>, customer: Option<String>) -> Self {
        Self {
            phone: phone.into(),
            customer: customer.map(Value::String).unwrap_or(Value::Bool(false)),
        }
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer.as_str()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerLoginReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Admin summary returned by a successful admin login
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminSummary {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "adminToken", default)]
    pub admin_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminLoginReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AdminSummary>,
}

/// `GET /api/login`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Customer>,
}

/// `GET /api/admin/login`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminStatusReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Admin>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScratchCardsReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<ScratchCard>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenshotsReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_shot: Option<Screenshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_envelopes_deserialize() {
        let failed = json!({"success": false, "message": "Unauthorized"});
        let profile: ProfileReply = serde_json::from_value(failed.clone()).unwrap();
        assert!(!profile.success);
        assert!(profile.user.is_none());

        let cards: ScratchCardsReply = serde_json::from_value(failed.clone()).unwrap();
        assert!(cards.data.is_empty());

        let admin: AdminStatusReply = serde_json::from_value(failed).unwrap();
        assert!(!admin.is_admin);
    }

    #[test]
    fn test_user_summary_customer_false_when_missing() {
        let summary = UserSummary::new("9999999999", None);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value, json!({"phone": "9999999999", "customer": false}));
        assert_eq!(summary.customer_name(), None);

        let named = UserSummary::new("9999999999", Some("Asha".into()));
        assert_eq!(named.customer_name(), Some("Asha"));
    }
}
