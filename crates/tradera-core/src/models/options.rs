use serde::{Deserialize, Serialize};

use crate::soap::XmlNode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingOption {
    pub shipping_option_id: i64,
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub is_active: bool,
}

impl ShippingOption {
    pub fn placeholders() -> Vec<ShippingOption> {
        let option = |id, name: &str, description: &str, cost| ShippingOption {
            shipping_option_id: id,
            name: name.to_string(),
            description: description.to_string(),
            cost,
            is_active: true,
        };
        vec![
            option(1, "Standard Shipping", "Standard shipping option", 0.0),
            option(2, "Express Shipping", "Express shipping option", 50.0),
            option(3, "Pickup", "Local pickup option", 0.0),
        ]
    }

    pub fn from_node(node: &XmlNode) -> Self {
        Self {
            shipping_option_id: node
                .parse_of("ShippingOptionId")
                .or_else(|| node.parse_of("Id"))
                .unwrap_or(0),
            name: node.string_of("Name").unwrap_or_else(|| "Unknown".to_string()),
            description: node.string_of("Description").unwrap_or_default(),
            cost: node.parse_of("Cost").unwrap_or(0.0),
            is_active: node.bool_of("IsActive").unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOption {
    pub payment_option_id: i64,
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

impl PaymentOption {
    pub fn placeholders() -> Vec<PaymentOption> {
        let option = |id, name: &str, description: &str| PaymentOption {
            payment_option_id: id,
            name: name.to_string(),
            description: description.to_string(),
            is_active: true,
        };
        vec![
            option(1, "Bank Transfer", "Bank transfer payment"),
            option(2, "Credit Card", "Credit card payment"),
            option(3, "PayPal", "PayPal payment"),
        ]
    }

    pub fn from_node(node: &XmlNode) -> Self {
        Self {
            payment_option_id: node
                .parse_of("PaymentOptionId")
                .or_else(|| node.parse_of("Id"))
                .unwrap_or(0),
            name: node.string_of("Name").unwrap_or_else(|| "Unknown".to_string()),
            description: node.string_of("Description").unwrap_or_default(),
            is_active: node.bool_of("IsActive").unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::response::parse_document;

    #[test]
    fn test_shipping_option_defaults() {
        let node = parse_document("<ShippingOption><Id>4</Id><Name>Postnord</Name></ShippingOption>")
            .unwrap();
        let option = ShippingOption::from_node(&node);
        assert_eq!(option.shipping_option_id, 4);
        assert_eq!(option.name, "Postnord");
        assert_eq!(option.cost, 0.0);
        assert!(option.is_active);
    }

    #[test]
    fn test_payment_option_inactive() {
        let node = parse_document(
            "<PaymentOption><PaymentOptionId>2</PaymentOptionId><Name>Card</Name>\
             <IsActive>false</IsActive></PaymentOption>",
        )
        .unwrap();
        let option = PaymentOption::from_node(&node);
        assert_eq!(option.payment_option_id, 2);
        assert!(!option.is_active);
    }

    #[test]
    fn test_placeholders() {
        let names: Vec<String> = PaymentOption::placeholders().into_iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["Bank Transfer", "Credit Card", "PayPal"]);
        assert_eq!(ShippingOption::placeholders()[1].cost, 50.0);
    }
}
