use serde::{Deserialize, Serialize};

use crate::soap::{Param, Value, XmlNode};

/// Reply of `GetShopSettings`. `Default` doubles as the read fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopSettings {
    pub shop_name: String,
    pub shop_description: String,
    pub shop_url: String,
    pub is_active: bool,
    pub default_payment_method: i64,
    pub default_shipping_option: i64,
}

impl ShopSettings {
    pub fn from_node(node: &XmlNode) -> Self {
        Self {
            shop_name: node.string_of("ShopName").unwrap_or_default(),
            shop_description: node.string_of("ShopDescription").unwrap_or_default(),
            shop_url: node.string_of("ShopUrl").unwrap_or_default(),
            is_active: node.bool_of("IsActive").unwrap_or(true),
            default_payment_method: node.parse_of("DefaultPaymentMethod").unwrap_or(1),
            default_shipping_option: node.parse_of("DefaultShippingOption").unwrap_or(1),
        }
    }
}

/// `ShopSettingsData` payload for `SetShopSettings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopSettingsUpdate {
    pub company_information: String,
    pub purchase_terms: String,
    pub show_gallery_mode: bool,
    pub show_auction_view: bool,
    /// JPEG bytes; empty keeps the current logo
    #[serde(skip)]
    pub logo_image_data: Vec<u8>,
    pub remove_logo: bool,
    pub banner_color: String,
    pub is_temporary_closed: bool,
    pub temporary_closed_message: String,
    pub contact_information: String,
    pub logo_image_url: String,
    pub max_active_items: u32,
    pub max_inventory_items: u32,
}

impl Default for ShopSettingsUpdate {
    fn default() -> Self {
        Self {
            company_information: String::new(),
            purchase_terms: String::new(),
            show_gallery_mode: true,
            show_auction_view: true,
            logo_image_data: Vec::new(),
            remove_logo: false,
            banner_color: "#FFFFFF".to_string(),
            is_temporary_closed: false,
            temporary_closed_message: String::new(),
            contact_information: String::new(),
            logo_image_url: String::new(),
            max_active_items: 100,
            max_inventory_items: 1000,
        }
    }
}

impl ShopSettingsUpdate {
    pub fn to_value(&self) -> Value {
        Value::Element(vec![
            Param::new("CompanyInformation", self.company_information.as_str()),
            Param::new("PurchaseTerms", self.purchase_terms.as_str()),
            Param::new("ShowGalleryMode", self.show_gallery_mode),
            Param::new("ShowAuctionView", self.show_auction_view),
            Param::new(
                "LogoInformation",
                Value::Element(vec![
                    Param::new("ImageFormat", "Jpeg"),
                    Param::new("ImageData", Value::Binary(self.logo_image_data.clone())),
                    Param::new("RemoveLogo", self.remove_logo),
                ]),
            ),
            Param::new("BannerColor", self.banner_color.as_str()),
            Param::new("IsTemporaryClosed", self.is_temporary_closed),
            Param::new("TemporaryClosedMessage", self.temporary_closed_message.as_str()),
            Param::new("ContactInformation", self.contact_information.as_str()),
            Param::new("LogoImageUrl", self.logo_image_url.as_str()),
            Param::new("MaxActiveItems", self.max_active_items),
            Param::new("MaxInventoryItems", self.max_inventory_items),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::response::parse_document;

    #[test]
    fn test_settings_from_node() {
        let node = parse_document(
            "<ShopSettings><ShopName>Retro</ShopName><IsActive>false</IsActive></ShopSettings>",
        )
        .unwrap();
        let settings = ShopSettings::from_node(&node);
        assert_eq!(settings.shop_name, "Retro");
        assert!(!settings.is_active);
        assert_eq!(settings.default_payment_method, 1);
    }

    #[test]
    fn test_update_defaults() {
        let update = ShopSettingsUpdate::default();
        let Value::Element(fields) = update.to_value() else {
            panic!("expected element");
        };
        assert_eq!(fields.len(), 12);
        assert_eq!(fields[5], Param::new("BannerColor", "#FFFFFF"));
        assert_eq!(fields[11], Param::new("MaxInventoryItems", 1000u32));
    }
}
