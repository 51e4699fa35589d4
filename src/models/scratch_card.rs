use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{lenient_int, Amount, Flag};

/// Reward coupon revealed by scratching
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScratchCard {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(alias = "couponCode", default)]
    pub coupon_code: String,
    #[serde(default)]
    pub amount: Amount,
    /// Validity window in days, counted from creation
    #[serde(default, deserialize_with = "lenient_int")]
    pub validity: i64,
    #[serde(rename = "isActive", default)]
    pub is_active: Flag,
    #[serde(default)]
    pub scratched: Flag,
    #[serde(default)]
    pub redeemed: Flag,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Backend fields the portal does not interpret, passed through as sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Unscratched,
    Scratched,
    Redeemed,
}

impl std::fmt::Display for CardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardState::Unscratched => write!(f, "unscratched"),
            CardState::Scratched => write!(f, "scratched"),
            CardState::Redeemed => write!(f, "redeemed"),
        }
    }
}

impl ScratchCard {
    /// The two flags are independent on the backend; redeemed wins.
    pub fn state(&self) -> CardState {
        if self.redeemed.is_set() {
            CardState::Redeemed
        } else if self.scratched.is_set() {
            CardState::Scratched
        } else {
            CardState::Unscratched
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let created = self.created_at.as_deref()?;
        let created = DateTime::parse_from_rfc3339(created).ok()?.with_timezone(&Utc);
        created.checked_add_signed(Duration::try_days(self.validity)?)
    }

    /// Cards without a parseable creation date never expire locally
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|at| now >= at).unwrap_or(false)
    }
}
