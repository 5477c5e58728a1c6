use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::soap::{Param, Value, XmlNode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: i64,
    pub item_id: i64,
    pub buyer_id: i64,
    pub amount: f64,
    pub status: String,
    pub transaction_date: Option<String>,
    pub payment_method: String,
    pub shipping_method: String,
}

impl Transaction {
    pub fn from_node(node: &XmlNode) -> Self {
        let buyer_id = node
            .parse_of("BuyerId")
            .or_else(|| node.child("Buyer").and_then(|b| b.parse_of("Id")))
            .unwrap_or(0);
        let item_id = node
            .parse_of("ItemId")
            .or_else(|| node.child("Item").and_then(|i| i.parse_of("Id")))
            .unwrap_or(0);
        Self {
            transaction_id: node
                .parse_of("TransactionId")
                .or_else(|| node.parse_of("Id"))
                .unwrap_or(0),
            item_id,
            buyer_id,
            amount: node.parse_of("Amount").unwrap_or(0.0),
            status: node.string_of("Status").unwrap_or_else(|| "Unknown".to_string()),
            transaction_date: node
                .string_of("TransactionDate")
                .or_else(|| node.string_of("Date"))
                .filter(|d| !d.is_empty()),
            payment_method: node.string_of("PaymentMethod").unwrap_or_default(),
            shipping_method: node.string_of("ShippingMethod").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackType {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackType::Positive => write!(f, "Positive"),
            FeedbackType::Neutral => write!(f, "Neutral"),
            FeedbackType::Negative => write!(f, "Negative"),
        }
    }
}

impl FromStr for FeedbackType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(FeedbackType::Positive),
            "neutral" => Ok(FeedbackType::Neutral),
            "negative" => Ok(FeedbackType::Negative),
            _ => Err(ApiError::Validation(format!(
                "Unknown feedback type {:?} (expected Positive, Neutral or Negative)",
                s
            ))),
        }
    }
}

/// Seller-side progress of a transaction. Each step implies the earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Paid,
    Shipped,
    Delivered,
    Completed,
}

/// The three flags of `TransactionStatusUpdateData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlags {
    pub mark_as_paid_confirmed: bool,
    pub marked_as_shipped: bool,
    pub mark_shipping_booked: bool,
}

impl TransactionStatus {
    pub fn flags(&self) -> StatusFlags {
        let (paid, shipped, booked) = match self {
            TransactionStatus::Paid => (true, false, false),
            TransactionStatus::Shipped => (true, true, false),
            TransactionStatus::Delivered | TransactionStatus::Completed => (true, true, true),
        };
        StatusFlags {
            mark_as_paid_confirmed: paid,
            marked_as_shipped: shipped,
            mark_shipping_booked: booked,
        }
    }

    pub fn update_data(&self, transaction_id: i64) -> Value {
        let flags = self.flags();
        Value::Element(vec![
            Param::new("TransactionId", transaction_id),
            Param::new("MarkAsPaidConfirmed", flags.mark_as_paid_confirmed),
            Param::new("MarkedAsShipped", flags.marked_as_shipped),
            Param::new("MarkShippingBooked", flags.mark_shipping_booked),
        ])
    }
}

impl FromStr for TransactionStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(TransactionStatus::Paid),
            "shipped" => Ok(TransactionStatus::Shipped),
            "delivered" => Ok(TransactionStatus::Delivered),
            "completed" => Ok(TransactionStatus::Completed),
            _ => Err(ApiError::Validation(format!(
                "Unknown transaction status {:?} (expected Paid, Shipped, Delivered or Completed)",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::response::parse_document;

    #[test]
    fn test_transaction_from_nested_node() {
        let node = parse_document(
            "<Transaction><Id>9</Id><Date>2026-03-01T10:00:00</Date>\
             <Buyer><Id>31</Id></Buyer><Item><Id>700</Id></Item><Amount>120.5</Amount></Transaction>",
        )
        .unwrap();
        let tx = Transaction::from_node(&node);
        assert_eq!(tx.transaction_id, 9);
        assert_eq!(tx.buyer_id, 31);
        assert_eq!(tx.item_id, 700);
        assert_eq!(tx.amount, 120.5);
        assert_eq!(tx.transaction_date.as_deref(), Some("2026-03-01T10:00:00"));
        assert_eq!(tx.status, "Unknown");
    }

    #[test]
    fn test_feedback_type_parse() {
        assert_eq!("positive".parse::<FeedbackType>().unwrap(), FeedbackType::Positive);
        assert_eq!("Negative".parse::<FeedbackType>().unwrap().to_string(), "Negative");
        assert!(matches!("great".parse::<FeedbackType>(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_status_flags_are_cumulative() {
        let paid = TransactionStatus::Paid.flags();
        assert!(paid.mark_as_paid_confirmed && !paid.marked_as_shipped);

        let shipped = TransactionStatus::Shipped.flags();
        assert!(shipped.marked_as_shipped && !shipped.mark_shipping_booked);

        assert_eq!(TransactionStatus::Delivered.flags(), TransactionStatus::Completed.flags());
        assert!("lost".parse::<TransactionStatus>().is_err());
    }
}
