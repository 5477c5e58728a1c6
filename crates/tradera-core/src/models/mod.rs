//! Data models for Tradera entities.
//!
//! Read models are built from reply elements with `from_node`, tolerating
//! both the child-element and attribute shapes Tradera uses. Write models
//! render themselves into SOAP parameter values.
//!
//! - `Category`, `FieldDefinition`: category tree and item field table
//! - `ShippingOption`, `PaymentOption`
//! - Items: `ItemRequest`, `AddItemResult`, `SellerItem`, `ItemDetails`,
//!   `ShopItem`, `ShopItemUpdate`
//! - Shop: `ShopSettings`, `ShopSettingsUpdate`
//! - Transactions: `Transaction`, `FeedbackType`, `TransactionStatus`

pub mod category;
pub mod item;
pub mod options;
pub mod shop;
pub mod transaction;

pub use category::{Category, FieldDefinition};
pub use item::{
    check_price, AddItemResult, ItemDetails, ItemRequest, ItemShipping, SellerItem, ShopItem,
    ShopItemUpdate,
};
pub use options::{PaymentOption, ShippingOption};
pub use shop::{ShopSettings, ShopSettingsUpdate};
pub use transaction::{FeedbackType, StatusFlags, Transaction, TransactionStatus};
