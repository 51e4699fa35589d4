use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{lenient_opt_int, name_or_flag, Amount, Flag};
use super::screenshot::Screenshot;

/// Customer record as owned by the backend.
///
/// Monetary fields are normalized on the way in; serializing a `Customer`
/// always emits plain numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "name_or_flag")]
    pub customer: Option<String>,
    #[serde(rename = "fore_closure", default)]
    pub foreclosure: Amount,
    #[serde(default)]
    pub settlement: Amount,
    #[serde(default)]
    pub minimum_part_payment: Amount,
    #[serde(default)]
    pub foreclosure_reward: Amount,
    #[serde(default)]
    pub settlement_reward: Amount,
    #[serde(default)]
    pub minimum_part_payment_reward: Amount,
    #[serde(
        default,
        deserialize_with = "lenient_opt_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_type: Option<i64>,
    #[serde(rename = "isPaid", default)]
    pub is_paid: Flag,
    #[serde(rename = "isActive", default)]
    pub is_active: Flag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "screen_shot", default)]
    pub screenshots: Vec<Screenshot>,
    /// Payment proofs attached to admin list rows
    #[serde(default)]
    pub payments: Vec<Screenshot>,
    /// Backend fields the portal does not interpret, passed through as sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Customer {
    pub fn breakdown(&self) -> PaymentBreakdown {
        PaymentBreakdown::from_customer(self)
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_paid.is_set() {
            "Paid"
        } else {
            "Pending"
        }
    }

    /// Display name, falling back to the phone number
    pub fn display_name(&self) -> &str {
        self.customer.as_deref().unwrap_or(&self.phone)
    }
}

/// Repayment options offered to a customer together with their rewards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaymentBreakdown {
    pub foreclosure: f64,
    pub settlement: f64,
    pub minimum_part_payment: f64,
    pub foreclosure_reward: f64,
    pub settlement_reward: f64,
    pub minimum_part_payment_reward: f64,
}

impl PaymentBreakdown {
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            foreclosure: customer.foreclosure.value(),
            settlement: customer.settlement.value(),
            minimum_part_payment: customer.minimum_part_payment.value(),
            foreclosure_reward: customer.foreclosure_reward.value(),
            settlement_reward: customer.settlement_reward.value(),
            minimum_part_payment_reward: customer.minimum_part_payment_reward.value(),
        }
    }

    /// Sum of the three obligations, the denominator of the dashboard chart
    pub fn total(&self) -> f64 {
        self.foreclosure + self.settlement + self.minimum_part_payment
    }

    /// Rows of (label, amount, reward) in display order
    pub fn rows(&self) -> [(&'static str, f64, f64); 3] {
        [
            ("Foreclosure", self.foreclosure, self.foreclosure_reward),
            ("Settlement", self.settlement, self.settlement_reward),
            (
                "Minimum Payment",
                self.minimum_part_payment,
                self.minimum_part_payment_reward,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_mixed_decimal_representations() {
        let customer: Customer = serde_json::from_value(json!({
            "_id": "c1",
            "phone": "9999999999",
            "customer": "Asha",
            "fore_closure": "1000.50",
            "settlement": {"$numberDecimal": "800"},
            "minimum_part_payment": 250,
            "foreclosure_reward": {"$numberDecimal": "10.5"},
            "settlement_reward": null,
            "isPaid": false
        }))
        .unwrap();

        let breakdown = customer.breakdown();
        assert_eq!(breakdown.foreclosure, 1000.5);
        assert_eq!(breakdown.settlement, 800.0);
        assert_eq!(breakdown.minimum_part_payment, 250.0);
        assert_eq!(breakdown.foreclosure_reward, 10.5);
        assert_eq!(breakdown.settlement_reward, 0.0);
        assert_eq!(breakdown.minimum_part_payment_reward, 0.0);
        assert_eq!(breakdown.total(), 2050.5);
        assert_eq!(customer.display_name(), "Asha");
    }

    #[test]
    fn test_customer_flag_name_is_none() {
        let customer: Customer = serde_json::from_value(json!({
            "_id": "c2",
            "phone": "8888888888",
            "customer": false
        }))
        .unwrap();
        assert_eq!(customer.customer, None);
        assert_eq!(customer.display_name(), "8888888888");
    }

    #[test]
    fn test_customer_serializes_normalized_amounts() {
        let customer: Customer = serde_json::from_value(json!({
            "_id": "c3",
            "settlement": {"$numberDecimal": "12.34"}
        }))
        .unwrap();
        let value = serde_json::to_value(&customer).unwrap();
        assert_eq!(value["settlement"], json!(12.34));
        assert_eq!(value["_id"], json!("c3"));
    }

    #[test]
    fn test_customer_tolerates_drifting_shapes() {
        let customer: Customer = serde_json::from_value(json!({
            "_id": "c4",
            "phone": "7777777777",
            "isPaid": null,
            "isActive": 1,
            "payment_type": 2.0
        }))
        .unwrap();
        assert!(!customer.is_paid.is_set());
        assert_eq!(customer.status_label(), "Pending");
        assert!(customer.is_active.is_set());
        assert_eq!(customer.payment_type, Some(2));

        let paid: Customer = serde_json::from_value(json!({"isPaid": "true"})).unwrap();
        assert_eq!(paid.status_label(), "Paid");
    }

    #[test]
    fn test_customer_list_row_payments_and_passthrough() {
        let customer: Customer = serde_json::from_value(json!({
            "_id": "c5",
            "isLogin": true,
            "otp": 1234,
            "__v": 0,
            "payments": [
                {"_id": "p1", "screen_shot": "https://cdn/p1.png"},
                {"_id": "p2", "screen_shot": "https://cdn/p2.png"}
            ]
        }))
        .unwrap();
        assert_eq!(customer.payments.len(), 2);
        assert_eq!(customer.payments[1].url, "https://cdn/p2.png");

        let value = serde_json::to_value(&customer).unwrap();
        assert_eq!(value["isLogin"], json!(true));
        assert_eq!(value["__v"], json!(0));
        assert_eq!(value["payments"][0]["_id"], json!("p1"));
    }
}
