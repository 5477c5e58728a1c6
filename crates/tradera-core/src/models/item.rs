//! Item listings: creation requests, listing details and shop items.

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, Result};
use crate::soap::{Param, Value, XmlNode};

/// Auction duration bounds in days.
pub const MIN_DURATION_DAYS: u32 = 3;
pub const MAX_DURATION_DAYS: u32 = 14;

/// One `ItemShipping` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemShipping {
    pub shipping_option_id: i64,
    /// Whole SEK
    pub cost: i64,
    pub shipping_weight: f64,
    pub shipping_product_id: i64,
    pub shipping_provider_id: i64,
}

impl Default for ItemShipping {
    fn default() -> Self {
        Self {
            shipping_option_id: 1,
            cost: 0,
            shipping_weight: 1.0,
            shipping_product_id: 1,
            shipping_provider_id: 1,
        }
    }
}

impl ItemShipping {
    fn to_value(&self) -> Value {
        Value::Element(vec![
            Param::new("ShippingOptionId", self.shipping_option_id),
            Param::new("Cost", self.cost),
            Param::new("ShippingWeight", self.shipping_weight),
            Param::new("ShippingProductId", self.shipping_product_id),
            Param::new("ShippingProviderId", self.shipping_provider_id),
        ])
    }
}

/// Listing request for `AddItem` / `AddItemXml`. Prices are in öre
/// (100 = 1 SEK).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRequest {
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub duration: u32,
    pub restarts: u32,
    pub start_price: i64,
    pub reserve_price: i64,
    pub buy_it_now_price: i64,
    pub payment_option_ids: Vec<i64>,
    pub shipping_options: Vec<ItemShipping>,
    /// 1..=4, who may bid
    pub accepted_bidder_id: u32,
    pub expo_item_ids: Vec<i64>,
    pub item_attributes: Vec<i64>,
    /// 1 = auction
    pub item_type: u32,
    /// Set to false when images are added before `AddItemCommit`.
    pub auto_commit: bool,
    pub vat: u32,
    pub shipping_condition: String,
    pub payment_condition: String,
    pub campaign_code: String,
    pub description_language_code_iso2: Option<String>,
    pub restarted_from_item_id: i64,
    pub own_references: Vec<String>,
    pub custom_end_date: Option<DateTime<Utc>>,
}

impl Default for ItemRequest {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category_id: 0,
            duration: 7,
            restarts: 0,
            start_price: 0,
            reserve_price: 0,
            buy_it_now_price: 0,
            payment_option_ids: vec![1],
            shipping_options: vec![ItemShipping::default()],
            accepted_bidder_id: 1,
            expo_item_ids: Vec::new(),
            item_attributes: vec![1],
            item_type: 1,
            auto_commit: true,
            vat: 25,
            shipping_condition: String::new(),
            payment_condition: String::new(),
            campaign_code: String::new(),
            description_language_code_iso2: None,
            restarted_from_item_id: 0,
            own_references: Vec::new(),
            custom_end_date: None,
        }
    }
}

impl ItemRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>, category_id: i64) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category_id,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("Required field 'Title' is missing".into()));
        }
        if self.description.trim().is_empty() {
            return Err(ApiError::Validation("Required field 'Description' is missing".into()));
        }
        if self.category_id <= 0 {
            return Err(ApiError::Validation("Required field 'CategoryId' is missing".into()));
        }
        if !(MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&self.duration) {
            return Err(ApiError::Validation(format!(
                "Duration must be between {} and {} days, got {}",
                MIN_DURATION_DAYS, MAX_DURATION_DAYS, self.duration
            )));
        }
        if !(1..=4).contains(&self.accepted_bidder_id) {
            return Err(ApiError::Validation(format!(
                "AcceptedBidderId must be between 1 and 4, got {}",
                self.accepted_bidder_id
            )));
        }
        if self.start_price < 0 || self.reserve_price < 0 || self.buy_it_now_price < 0 {
            return Err(ApiError::Validation("Prices must not be negative".into()));
        }
        Ok(())
    }

    /// The `ItemRequest` complex type, fields in schema order.
    pub fn to_value(&self) -> Value {
        let mut fields = vec![
            Param::new("Title", self.title.as_str()),
            Param::new("Description", self.description.as_str()),
            Param::new("CategoryId", self.category_id),
            Param::new("Duration", self.duration),
            Param::new("Restarts", self.restarts),
            Param::new("StartPrice", self.start_price),
            Param::new("ReservePrice", self.reserve_price),
            Param::new("BuyItNowPrice", self.buy_it_now_price),
            Param::new("PaymentOptionIds", Value::int_array(self.payment_option_ids.clone())),
            Param::new(
                "ShippingOptions",
                Value::Array {
                    item: "ItemShipping".to_string(),
                    values: self.shipping_options.iter().map(ItemShipping::to_value).collect(),
                },
            ),
            Param::new("AcceptedBidderId", self.accepted_bidder_id),
            Param::new("ExpoItemIds", Value::int_array(self.expo_item_ids.clone())),
            Param::new("ItemAttributes", Value::int_array(self.item_attributes.clone())),
            Param::new("ItemType", self.item_type),
            Param::new("AutoCommit", self.auto_commit),
            Param::new("VAT", self.vat),
            Param::new("ShippingCondition", self.shipping_condition.as_str()),
            Param::new("PaymentCondition", self.payment_condition.as_str()),
            Param::new("CampaignCode", self.campaign_code.as_str()),
        ];
        if let Some(lang) = &self.description_language_code_iso2 {
            fields.push(Param::new("DescriptionLanguageCodeIso2", lang.as_str()));
        }
        fields.push(Param::new(
            "AttributeValues",
            Value::Element(vec![
                Param::new("Terms", Value::Element(Vec::new())),
                Param::new("Numbers", Value::Element(Vec::new())),
            ]),
        ));
        fields.push(Param::new("RestartedFromItemId", self.restarted_from_item_id));
        fields.push(Param::new(
            "OwnReferences",
            Value::string_array(self.own_references.clone()),
        ));
        // Omitted rather than nil; the service rejects a nil end date
        if let Some(end) = self.custom_end_date {
            fields.push(Param::new("CustomEndDate", end));
        }
        Value::Element(fields)
    }

    /// `CreateItemRequest` document for `AddItemXml`.
    pub fn to_create_item_xml(&self) -> String {
        let mut xml = String::from("<CreateItemRequest>");
        let mut push = |name: &str, value: String| {
            xml.push_str(&format!("<{0}>{1}</{0}>", name, escape(value.as_str())));
        };
        push("AutoCommit", self.auto_commit.to_string());
        push("ItemType", self.item_type.to_string());
        push("Title", self.title.clone());
        push("ShippingCondition", self.shipping_condition.clone());
        push("PaymentCondition", self.payment_condition.clone());
        push("CategoryId", self.category_id.to_string());
        push("Duration", self.duration.to_string());
        push("Restarts", self.restarts.to_string());
        push("StartPrice", self.start_price.to_string());
        push("ReservePrice", self.reserve_price.to_string());
        push("BuyItNowPrice", self.buy_it_now_price.to_string());
        push("Description", self.description.clone());
        push("AcceptedBidderId", self.accepted_bidder_id.to_string());
        push("VAT", self.vat.to_string());

        xml.push_str("<OwnReferences>");
        for reference in &self.own_references {
            xml.push_str(&format!("<OwnReference>{}</OwnReference>", escape(reference.as_str())));
        }
        xml.push_str("</OwnReferences><ExpoItemIds>");
        for id in &self.expo_item_ids {
            xml.push_str(&format!("<ExpoItemId>{}</ExpoItemId>", id));
        }
        xml.push_str("</ExpoItemIds><PaymentOptionIds>");
        for id in &self.payment_option_ids {
            xml.push_str(&format!("<PaymentOptionId>{}</PaymentOptionId>", id));
        }
        xml.push_str("</PaymentOptionIds><ShippingOptions>");
        for option in &self.shipping_options {
            xml.push_str(&format!(
                "<ShippingOption><Id>{}</Id><Cost>{}</Cost></ShippingOption>",
                option.shipping_option_id, option.cost
            ));
        }
        xml.push_str("</ShippingOptions><ItemAttributes>");
        for attribute in &self.item_attributes {
            xml.push_str(&format!("<ItemAttribute>{}</ItemAttribute>", attribute));
        }
        xml.push_str("</ItemAttributes></CreateItemRequest>");
        xml
    }
}

/// Reply to `AddItem` / `AddItemXml`: the item is queued on Tradera's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItemResult {
    pub request_id: i64,
    pub item_id: i64,
    pub status: String,
    pub message: String,
}

impl AddItemResult {
    pub fn from_node(node: &XmlNode) -> Option<Self> {
        Some(Self {
            request_id: node.parse_of("RequestId")?,
            item_id: node.parse_of("ItemId")?,
            status: "queued".to_string(),
            message: "Item successfully queued for processing".to_string(),
        })
    }
}

/// Row of `GetSellerItems`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerItem {
    pub item_id: i64,
    pub title: String,
    pub starting_price: f64,
    pub current_price: f64,
    pub end_date: Option<String>,
    pub status: String,
    pub category_id: Option<i64>,
    pub quantity: i64,
}

impl SellerItem {
    pub fn from_node(node: &XmlNode) -> Self {
        Self {
            item_id: item_id_of(node),
            title: node.string_of("Title").unwrap_or_else(|| "No Title".to_string()),
            starting_price: node.parse_of("StartingPrice").unwrap_or(0.0),
            current_price: node.parse_of("CurrentPrice").unwrap_or(0.0),
            end_date: non_empty(node.string_of("EndDate")),
            status: node.string_of("Status").unwrap_or_else(|| "Unknown".to_string()),
            category_id: node.parse_of("CategoryId"),
            quantity: node.parse_of("Quantity").unwrap_or(1),
        }
    }
}

/// Full listing returned by `GetItem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub item_id: i64,
    pub title: String,
    pub description: String,
    pub starting_price: f64,
    pub current_price: f64,
    pub reserve_price: f64,
    pub buy_it_now_price: f64,
    pub category_id: i64,
    pub status: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub quantity: i64,
    pub seller_id: i64,
}

impl ItemDetails {
    pub fn from_node(node: &XmlNode, requested_id: i64) -> Self {
        let item_id = match item_id_of(node) {
            0 => requested_id,
            id => id,
        };
        let seller_id = node
            .parse_of("SellerId")
            .or_else(|| node.child("Seller").and_then(|s| s.parse_of("Id")))
            .unwrap_or(0);
        Self {
            item_id,
            title: node.string_of("Title").unwrap_or_else(|| "Unknown".to_string()),
            description: node.string_of("Description").unwrap_or_default(),
            starting_price: node.parse_of("StartingPrice").unwrap_or(0.0),
            current_price: node.parse_of("CurrentPrice").unwrap_or(0.0),
            reserve_price: node.parse_of("ReservePrice").unwrap_or(0.0),
            buy_it_now_price: node.parse_of("BuyItNowPrice").unwrap_or(0.0),
            category_id: node.parse_of("CategoryId").unwrap_or(0),
            status: node.string_of("Status").unwrap_or_else(|| "Unknown".to_string()),
            start_date: non_empty(node.string_of("StartDate")),
            end_date: non_empty(node.string_of("EndDate")),
            quantity: node.parse_of("Quantity").unwrap_or(1),
            seller_id,
        }
    }
}

/// Item data queued locally by `add_shop_item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopItem {
    pub title: String,
    pub description: String,
    pub starting_price: f64,
    pub category_id: i64,
    pub quantity: u32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub payment_methods: Vec<i64>,
    pub shipping_options: Vec<i64>,
    pub condition: String,
    pub location: String,
}

impl Default for ShopItem {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            starting_price: 0.0,
            category_id: 0,
            quantity: 1,
            start_date: None,
            end_date: None,
            payment_methods: vec![1],
            shipping_options: vec![1],
            condition: "Used".to_string(),
            location: "Stockholm, Sweden".to_string(),
        }
    }
}

impl ShopItem {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        starting_price: f64,
        category_id: i64,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            starting_price,
            category_id,
            ..Default::default()
        }
    }
}

/// Partial update for `UpdateShopItem`; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopItemUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    pub own_reference: Option<String>,
}

impl ShopItemUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ApiError::Validation("Shop item update has no fields set".into()));
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.own_reference.is_none()
    }

    pub fn to_value(&self) -> Value {
        let mut fields = Vec::new();
        if let Some(title) = &self.title {
            fields.push(Param::new("Title", title.as_str()));
        }
        if let Some(description) = &self.description {
            fields.push(Param::new("Description", description.as_str()));
        }
        if let Some(price) = self.price {
            fields.push(Param::new("Price", price));
        }
        if let Some(quantity) = self.quantity {
            fields.push(Param::new("Quantity", quantity));
        }
        if let Some(reference) = &self.own_reference {
            fields.push(Param::new("OwnReference", reference.as_str()));
        }
        Value::Element(fields)
    }
}

/// Shop prices are decimals on the wire; only finite, non-negative values
/// render to something the service accepts.
pub fn check_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::Validation(format!(
            "Invalid price {} (must be a finite, non-negative number)",
            price
        )));
    }
    Ok(())
}

/// Tradera uses `Id` in newer schemas and `ItemId` in older ones.
fn item_id_of(node: &XmlNode) -> i64 {
    node.parse_of("ItemId")
        .or_else(|| node.parse_of("Id"))
        .unwrap_or(0)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::response::parse_document;
    use crate::soap::value::write_params;

    #[test]
    fn test_validate_required_fields() {
        assert!(ItemRequest::new("Lamp", "Brass lamp", 12).validate().is_ok());

        let err = ItemRequest::new("", "Brass lamp", 12).validate().unwrap_err();
        assert!(err.to_string().contains("Title"));

        let err = ItemRequest::new("Lamp", " ", 12).validate().unwrap_err();
        assert!(err.to_string().contains("Description"));

        let err = ItemRequest::new("Lamp", "Brass lamp", 0).validate().unwrap_err();
        assert!(err.to_string().contains("CategoryId"));
    }

    #[test]
    fn test_validate_ranges() {
        let mut request = ItemRequest::new("Lamp", "Brass lamp", 12);
        request.duration = 2;
        assert!(matches!(request.validate(), Err(ApiError::Validation(_))));
        request.duration = 15;
        assert!(request.validate().is_err());
        request.duration = 14;
        assert!(request.validate().is_ok());

        request.accepted_bidder_id = 5;
        assert!(request.validate().is_err());
        request.accepted_bidder_id = 4;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_item_request_field_order() {
        let request = ItemRequest::new("Lamp", "Brass lamp", 12);
        let mut xml = String::new();
        write_params(&[Param::new("itemRequest", request.to_value())], &mut xml);

        let title = xml.find("<Title>").unwrap();
        let category = xml.find("<CategoryId>").unwrap();
        let references = xml.find("<OwnReferences>").unwrap();
        assert!(title < category && category < references);
        assert!(xml.contains("<PaymentOptionIds><int>1</int></PaymentOptionIds>"));
        assert!(xml.contains("<ShippingOptions><ItemShipping><ShippingOptionId>1</ShippingOptionId>"));
        assert!(!xml.contains("CustomEndDate"));
    }

    #[test]
    fn test_create_item_xml_escapes_text() {
        let request = ItemRequest::new("Tom & Jerry <DVD>", "Box set", 11);
        let xml = request.to_create_item_xml();
        assert!(xml.starts_with("<CreateItemRequest>"));
        assert!(xml.contains("<Title>Tom &amp; Jerry &lt;DVD&gt;</Title>"));
        assert!(xml.contains("<AutoCommit>true</AutoCommit>"));
        assert!(xml.contains("<ShippingOption><Id>1</Id><Cost>0</Cost></ShippingOption>"));
        assert!(parse_document(&xml).is_ok());
    }

    #[test]
    fn test_add_item_result_requires_ids() {
        let node = parse_document("<AddItemResult><RequestId>77</RequestId><ItemId>900</ItemId></AddItemResult>")
            .unwrap();
        let result = AddItemResult::from_node(&node).unwrap();
        assert_eq!(result.request_id, 77);
        assert_eq!(result.item_id, 900);
        assert_eq!(result.status, "queued");

        let node = parse_document("<AddItemResult><RequestId>77</RequestId></AddItemResult>").unwrap();
        assert!(AddItemResult::from_node(&node).is_none());
    }

    #[test]
    fn test_item_details_uses_requested_id() {
        let node = parse_document(
            "<Item><Title>Lamp</Title><Seller><Id>42</Id></Seller><EndDate></EndDate></Item>",
        )
        .unwrap();
        let details = ItemDetails::from_node(&node, 555);
        assert_eq!(details.item_id, 555);
        assert_eq!(details.seller_id, 42);
        assert_eq!(details.end_date, None);
        assert_eq!(details.quantity, 1);
    }

    #[test]
    fn test_shop_item_update_only_sends_set_fields() {
        let update = ShopItemUpdate {
            price: Some(199.0),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(update.to_value(), Value::Element(vec![Param::new("Price", 199.0)]));
        assert!(ShopItemUpdate::default().is_empty());
    }

    #[test]
    fn test_shop_item_update_rejects_bad_prices() {
        for price in [f64::NAN, f64::INFINITY, -1.0] {
            let update = ShopItemUpdate {
                price: Some(price),
                ..Default::default()
            };
            assert!(matches!(update.validate(), Err(ApiError::Validation(_))));
        }
        assert!(matches!(
            ShopItemUpdate::default().validate(),
            Err(ApiError::Validation(_))
        ));
        let free = ShopItemUpdate {
            price: Some(0.0),
            ..Default::default()
        };
        assert!(free.validate().is_ok());
    }
}
