//! API client for the Tradera SOAP services.
//!
//! `TraderaClient` owns everything with a lifetime: the discovered service
//! descriptors, the call budget, the user session and the locally queued
//! shop-item requests. Each call is awaited to completion before the next
//! one can start, since every state-changing method takes `&mut self`.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use crate::auth::{self, LoginUrl, Session};
use crate::config::Config;
use crate::models::{
    check_price, AddItemResult, Category, FeedbackType, FieldDefinition, ItemDetails, ItemRequest,
    PaymentOption, SellerItem, ShippingOption, ShopItem, ShopItemUpdate, ShopSettings,
    ShopSettingsUpdate, Transaction, TransactionStatus,
};
use crate::soap::{
    parse_reply, HeaderBlock, Param, SchemaRegistry, ServiceDescriptor, ServiceKind, SoapReply,
    SoapRequest, Value, XmlNode,
};

use super::error::{ApiError, Result};
use super::pending::{PendingRequests, RequestResults};
use super::rate_limit::{RateLimitInfo, RateLimiter};
use super::transport::{HttpTransport, Transport};

// ============================================================================
// Constants
// ============================================================================

/// Filter passed to `GetSellerTransactions`; the only value the service
/// is known to accept.
const TRANSACTION_FILTER: &str = "New";

/// Schema type that must be published for item creation to be attempted.
const ITEM_REQUEST_TYPE: &str = "ItemRequest";

pub struct TraderaClient<T: Transport = HttpTransport> {
    config: Config,
    /// Numeric form of `config.app_id`, validated at construction.
    app_id: i64,
    transport: T,
    schemas: SchemaRegistry,
    rate_limiter: RateLimiter,
    session: Option<Session>,
    pending: PendingRequests,
}

impl TraderaClient<HttpTransport> {
    /// Validate `config`, build the HTTP transport and discover both services.
    pub async fn connect(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))
            .map_err(|e| ApiError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_transport(config, transport).await
    }
}

impl<T: Transport> TraderaClient<T> {
    pub async fn with_transport(config: Config, transport: T) -> Result<Self> {
        let app_id = config.validate()?;

        let public = discover(&transport, ServiceKind::Public, &config.base_url).await?;
        let restricted = discover(&transport, ServiceKind::Restricted, &config.base_url).await?;
        info!(
            public_operations = public.operations.len(),
            restricted_operations = restricted.operations.len(),
            sandbox = config.sandbox,
            "Tradera services discovered"
        );

        Ok(Self {
            config,
            app_id,
            transport,
            schemas: SchemaRegistry::new(public, restricted),
            rate_limiter: RateLimiter::default(),
            session: None,
            pending: PendingRequests::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    // ========================================================================
    // Session and rate limit state
    // ========================================================================

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Adopt a session obtained earlier, e.g. one loaded from a `SessionStore`.
    pub fn restore_session(&mut self, session: Session) -> Result<()> {
        if session.is_expired() {
            return Err(ApiError::SessionRequired);
        }
        debug!(user_id = session.user_id, token = %session.token_preview(), "Session restored");
        self.session = Some(session);
        Ok(())
    }

    pub fn clear_session(&mut self) {
        self.session = None;
    }

    pub fn rate_limit_info(&self) -> RateLimitInfo {
        self.rate_limiter.info()
    }


    fn active_session(&self) -> Result<&Session> {
        match &self.session {
            Some(session) if !session.is_expired() => Ok(session),
            _ => Err(ApiError::SessionRequired),
        }
    }

    /// Explicit id, else the session's user. There is no default user.
    fn resolve_user_id(&self, user_id: Option<i64>) -> Result<i64> {
        user_id
            .or_else(|| self.session.as_ref().map(|s| s.user_id))
            .ok_or_else(|| {
                ApiError::Validation("No user id given and no session to take it from".into())
            })
    }

    // ========================================================================
    // Raw calls
    // ========================================================================

    /// Call a public-service operation with application credentials.
    pub async fn make_request(&mut self, method: &str, params: &[Param]) -> Result<XmlNode> {
        let endpoint = self
            .schemas
            .require_operation(ServiceKind::Public, method)
            .map_err(ApiError::Validation)?
            .endpoint
            .clone();
        self.rate_limiter.check()?;

        let headers = vec![
            HeaderBlock::authentication(self.app_id, &self.config.service_key),
            HeaderBlock::public_configuration(&self.config.public_key),
        ];
        self.send(&endpoint, method, headers, params).await
    }

    /// Call a restricted-service operation on behalf of the session user.
    ///
    /// Checks run in order: session, operation, rate limit. A missing session
    /// therefore costs no call from the budget.
    pub async fn make_restricted_request(&mut self, method: &str, params: &[Param]) -> Result<XmlNode> {
        let session = self.active_session()?;
        let authorization = HeaderBlock::authorization(session.user_id, &session.token);

        let endpoint = self
            .schemas
            .require_operation(ServiceKind::Restricted, method)
            .map_err(ApiError::Validation)?
            .endpoint
            .clone();
        self.rate_limiter.check()?;

        let headers = vec![
            HeaderBlock::authentication(self.app_id, &self.config.service_key),
            authorization,
            HeaderBlock::restricted_configuration(self.config.sandbox, self.config.max_result_age),
        ];
        self.send(&endpoint, method, headers, params).await
    }

    /// A restricted write: the reply must answer `method` itself.
    async fn restricted_write(&mut self, method: &str, params: &[Param]) -> Result<XmlNode> {
        let response = self.make_restricted_request(method, params).await?;
        expect_response(method, &response)?;
        Ok(response)
    }

    async fn send(
        &self,
        endpoint: &str,
        method: &str,
        headers: Vec<HeaderBlock>,
        params: &[Param],
    ) -> Result<XmlNode> {
        let request = SoapRequest {
            operation: method,
            headers,
            params,
        };
        let body = request.to_xml();
        debug!(operation = method, endpoint, bytes = body.len(), "Sending SOAP request");

        let reply = self
            .transport
            .post_soap(endpoint, &request.soap_action(), body)
            .await
            .map_err(|e| ApiError::Transport {
                operation: method.to_string(),
                message: e.to_string(),
            })?;
        debug!(operation = method, status = reply.status, bytes = reply.body.len(), "SOAP reply received");

        match parse_reply(&reply.body) {
            Ok(SoapReply::Fault(fault)) => {
                let message = match fault.detail {
                    Some(detail) => format!("{} ({})", fault.message, detail),
                    None => fault.message,
                };
                Err(ApiError::RemoteFault {
                    operation: method.to_string(),
                    code: fault.code,
                    message,
                })
            }
            Ok(SoapReply::Body(node)) if reply.is_success() => Ok(node),
            Ok(SoapReply::Body(_)) => Err(ApiError::from_status(method, reply.status, &reply.body)),
            Err(_) if !reply.is_success() => {
                Err(ApiError::from_status(method, reply.status, &reply.body))
            }
            Err(e) => Err(ApiError::invalid_response(method, e.to_string())),
        }
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Build the token login URL for this application.
    pub fn generate_login_url(&self, secret_key: Option<&str>) -> LoginUrl {
        auth::generate_login_url(&self.config.app_id, &self.config.public_key, secret_key)
    }

    /// Redeem a secret key for a user token and make it the active session.
    /// On any failure the previous session is left as it was.
    pub async fn fetch_token(&mut self, user_id: i64, secret_key: &str) -> Result<String> {
        if secret_key.trim().is_empty() {
            return Err(ApiError::Validation("Secret key must not be empty".into()));
        }

        let params = [
            Param::new("userId", user_id),
            Param::new("secretKey", secret_key),
        ];
        let response = self.make_request("FetchToken", &params).await?;

        let token = response
            .find("AuthToken")
            .map(|n| n.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::invalid_response("FetchToken", "AuthToken not found in response"))?;
        let expires_at = response
            .find("HardExpirationTime")
            .and_then(|n| parse_expiration(&n.text));

        let session = Session::new(token.clone(), user_id, expires_at);
        info!(
            user_id,
            token = %session.token_preview(),
            expires_at = %session.expires_at,
            "Fetched user token"
        );
        self.session = Some(session);
        Ok(token)
    }

    // ========================================================================
    // Public service reads
    // ========================================================================

    pub async fn get_categories(&mut self) -> Result<Vec<Category>> {
        let response = self.make_request("GetCategories", &[]).await?;
        let categories = match lenient_result("GetCategories", &response) {
            Some(result) => Category::flatten_tree(result),
            None => Category::placeholders(),
        };
        info!(count = categories.len(), "Retrieved categories");
        Ok(categories)
    }

    pub async fn get_item_field_values(&mut self, category_id: i64) -> Result<Vec<FieldDefinition>> {
        let params = [Param::new("categoryId", category_id)];
        let response = self.make_request("GetItemFieldValues", &params).await?;
        let fields = match lenient_result("GetItemFieldValues", &response) {
            Some(result) => result
                .list("Fields", "Field")
                .into_iter()
                .map(FieldDefinition::from_node)
                .collect(),
            None => FieldDefinition::placeholders(),
        };
        info!(category_id, count = fields.len(), "Retrieved field definitions");
        Ok(fields)
    }

    pub async fn get_shipping_options(&mut self) -> Result<Vec<ShippingOption>> {
        let response = self.make_request("GetShippingOptions", &[]).await?;
        let options = match lenient_result("GetShippingOptions", &response) {
            Some(result) => result
                .list("ShippingOptions", "ShippingOption")
                .into_iter()
                .map(ShippingOption::from_node)
                .collect(),
            None => ShippingOption::placeholders(),
        };
        info!(count = options.len(), "Retrieved shipping options");
        Ok(options)
    }

    /// Listings of `user_id`, or of the session user when omitted.
    pub async fn get_seller_items(&mut self, user_id: Option<i64>) -> Result<Vec<SellerItem>> {
        let user_id = self.resolve_user_id(user_id)?;
        let params = [
            Param::new("userId", user_id),
            Param::new("categoryId", 0i64),
            Param::new("filterActive", "Active"),
            Param::new("minEndDate", Value::Null),
            Param::new("maxEndDate", Value::Null),
            Param::new("filterItemType", "All"),
        ];
        let response = self.make_request("GetSellerItems", &params).await?;
        let items: Vec<SellerItem> = match lenient_result("GetSellerItems", &response) {
            Some(result) => result
                .list("Items", "Item")
                .into_iter()
                .map(SellerItem::from_node)
                .collect(),
            None => Vec::new(),
        };
        info!(user_id, count = items.len(), "Retrieved seller items");
        Ok(items)
    }

    pub async fn get_item(&mut self, item_id: i64) -> Result<Option<ItemDetails>> {
        let params = [Param::new("itemId", item_id)];
        let response = self.make_request("GetItem", &params).await?;
        let item = lenient_result("GetItem", &response)
            .map(|result| result.child("Item").unwrap_or(result))
            .filter(|node| !node.children.is_empty())
            .map(|node| ItemDetails::from_node(node, item_id));
        if item.is_none() {
            info!(item_id, "Item not found");
        }
        Ok(item)
    }

    // ========================================================================
    // Restricted service reads
    // ========================================================================

    /// Payment options of `member_id`, or of the session user when omitted.
    pub async fn get_member_payment_options(&mut self, member_id: Option<i64>) -> Result<Vec<PaymentOption>> {
        let member_id = match member_id {
            Some(id) => id,
            None => self.active_session()?.user_id,
        };
        let params = [Param::new("memberId", member_id)];
        let response = self
            .make_restricted_request("GetMemberPaymentOptions", &params)
            .await?;
        let options = match lenient_result("GetMemberPaymentOptions", &response) {
            Some(result) => result
                .list("PaymentOptions", "PaymentOption")
                .into_iter()
                .map(PaymentOption::from_node)
                .collect(),
            None => PaymentOption::placeholders(),
        };
        info!(member_id, count = options.len(), "Retrieved payment options");
        Ok(options)
    }

    pub async fn get_shop_settings(&mut self) -> Result<ShopSettings> {
        let response = self.make_restricted_request("GetShopSettings", &[]).await?;
        let settings = match lenient_result("GetShopSettings", &response) {
            Some(result) => ShopSettings::from_node(result.child("ShopSettings").unwrap_or(result)),
            None => ShopSettings::default(),
        };
        Ok(settings)
    }

    pub async fn get_seller_transactions(
        &mut self,
        min_date: Option<DateTime<Utc>>,
        max_date: Option<DateTime<Utc>>,
    ) -> Result<Vec<Transaction>> {
        let params = [Param::new(
            "request",
            Value::Element(vec![
                Param::new("MinTransactionDate", min_date),
                Param::new("MaxTransactionDate", max_date),
                Param::new("Filter", TRANSACTION_FILTER),
            ]),
        )];
        let response = self
            .make_restricted_request("GetSellerTransactions", &params)
            .await?;
        let transactions: Vec<Transaction> = match lenient_result("GetSellerTransactions", &response) {
            Some(result) => result
                .list("Transactions", "Transaction")
                .into_iter()
                .map(Transaction::from_node)
                .collect(),
            None => Vec::new(),
        };
        info!(count = transactions.len(), "Retrieved seller transactions");
        Ok(transactions)
    }

    // ========================================================================
    // Restricted service writes
    // ========================================================================

    /// Create a listing with the typed `ItemRequest`.
    pub async fn add_item(&mut self, request: &ItemRequest) -> Result<AddItemResult> {
        request.validate()?;
        self.schemas
            .require_type(ServiceKind::Restricted, ITEM_REQUEST_TYPE)
            .map_err(ApiError::Validation)?;

        let params = [Param::new("itemRequest", request.to_value())];
        let response = self.restricted_write("AddItem", &params).await?;
        let result = strict_result("AddItem", &response)?;
        let added = AddItemResult::from_node(result)
            .ok_or_else(|| ApiError::invalid_response("AddItem", "Missing RequestId or ItemId"))?;
        info!(request_id = added.request_id, item_id = added.item_id, "Item queued");
        Ok(added)
    }

    /// Create a listing from a `CreateItemRequest` XML document.
    pub async fn add_item_xml(&mut self, request: &ItemRequest) -> Result<AddItemResult> {
        request.validate()?;

        let params = [Param::new("createItemRequestXml", request.to_create_item_xml())];
        let response = self.restricted_write("AddItemXml", &params).await?;
        let result = strict_result("AddItemXml", &response)?;
        let mut added = AddItemResult::from_node(result)
            .ok_or_else(|| ApiError::invalid_response("AddItemXml", "Missing RequestId or ItemId"))?;
        added.message = "Item successfully queued for processing via AddItemXml".to_string();
        info!(request_id = added.request_id, item_id = added.item_id, "Item queued via XML");
        Ok(added)
    }

    pub async fn add_item_image(
        &mut self,
        item_id: i64,
        image_data: &[u8],
        image_name: Option<&str>,
    ) -> Result<()> {
        if image_data.is_empty() {
            return Err(ApiError::Validation("Image data must not be empty".into()));
        }
        let image_name = image_name
            .map(String::from)
            .unwrap_or_else(|| format!("image_{}.jpg", item_id));

        let params = [
            Param::new("itemId", item_id),
            Param::new("imageData", Value::Binary(image_data.to_vec())),
            Param::new("imageName", image_name),
        ];
        self.restricted_write("AddItemImage", &params).await?;
        info!(item_id, bytes = image_data.len(), "Image added");
        Ok(())
    }

    /// Publish an item created with `auto_commit = false`.
    pub async fn add_item_commit(&mut self, item_id: i64) -> Result<()> {
        self.restricted_write("AddItemCommit", &[Param::new("itemId", item_id)])
            .await?;
        info!(item_id, "Item committed");
        Ok(())
    }

    pub async fn end_item(&mut self, item_id: i64) -> Result<()> {
        self.restricted_write("EndItem", &[Param::new("itemId", item_id)])
            .await?;
        info!(item_id, "Item ended");
        Ok(())
    }

    pub async fn remove_shop_item(&mut self, shop_item_id: i64) -> Result<()> {
        self.restricted_write("RemoveShopItem", &[Param::new("shopItemId", shop_item_id)])
            .await?;
        info!(shop_item_id, "Shop item removed");
        Ok(())
    }

    pub async fn update_shop_item(&mut self, item_id: i64, update: &ShopItemUpdate) -> Result<()> {
        update.validate()?;
        let params = [
            Param::new("itemId", item_id),
            Param::new("itemData", update.to_value()),
        ];
        self.restricted_write("UpdateShopItem", &params).await?;
        info!(item_id, "Shop item updated");
        Ok(())
    }

    pub async fn set_quantity_on_shop_items(&mut self, quantities: &BTreeMap<i64, u32>) -> Result<()> {
        if quantities.is_empty() {
            return Err(ApiError::Validation("No shop item quantities given".into()));
        }
        let entries = quantities
            .iter()
            .map(|(item_id, quantity)| {
                Value::Element(vec![
                    Param::new("ItemId", *item_id),
                    Param::new("Quantity", *quantity),
                ])
            })
            .collect();
        let params = [Param::new(
            "itemQuantities",
            Value::Array {
                item: "ItemQuantity".to_string(),
                values: entries,
            },
        )];
        self.restricted_write("SetQuantityOnShopItems", &params)
            .await?;
        info!(count = quantities.len(), "Shop item quantities updated");
        Ok(())
    }

    pub async fn set_price_on_shop_items(&mut self, prices: &BTreeMap<i64, f64>) -> Result<()> {
        if prices.is_empty() {
            return Err(ApiError::Validation("No shop item prices given".into()));
        }
        for price in prices.values() {
            check_price(*price)?;
        }
        let entries = prices
            .iter()
            .map(|(item_id, price)| {
                Value::Element(vec![
                    Param::new("ItemId", *item_id),
                    Param::new("Price", *price),
                ])
            })
            .collect();
        let params = [Param::new(
            "itemPrices",
            Value::Array {
                item: "ItemPrice".to_string(),
                values: entries,
            },
        )];
        self.restricted_write("SetPriceOnShopItems", &params)
            .await?;
        info!(count = prices.len(), "Shop item prices updated");
        Ok(())
    }

    pub async fn set_shop_settings(&mut self, update: &ShopSettingsUpdate) -> Result<()> {
        let params = [Param::new("shopSettings", update.to_value())];
        self.restricted_write("SetShopSettings", &params).await?;
        info!("Shop settings updated");
        Ok(())
    }

    pub async fn leave_feedback(
        &mut self,
        transaction_id: i64,
        feedback: FeedbackType,
        comment: &str,
    ) -> Result<()> {
        let params = [
            Param::new("transactionId", transaction_id),
            Param::new("comment", comment),
            Param::new("type", feedback.to_string()),
        ];
        self.restricted_write("LeaveFeedback", &params).await?;
        info!(transaction_id, %feedback, "Feedback left");
        Ok(())
    }

    pub async fn update_transaction_status(
        &mut self,
        transaction_id: i64,
        status: TransactionStatus,
    ) -> Result<()> {
        let params = [Param::new(
            "transactionStatusUpdateData",
            status.update_data(transaction_id),
        )];
        self.restricted_write("UpdateTransactionStatus", &params)
            .await?;
        info!(transaction_id, ?status, "Transaction status updated");
        Ok(())
    }

    // ========================================================================
    // Queued shop items
    // ========================================================================

    /// Queue an item for the shop and return the request id immediately.
    pub async fn add_shop_item(&mut self, item: ShopItem) -> Result<String> {
        self.active_session()?;
        if item.title.trim().is_empty() {
            return Err(ApiError::Validation("Shop item title must not be empty".into()));
        }
        let title = item.title.clone();
        let request_id = self.pending.submit(item);
        info!(request_id = %request_id, title = %title, "Shop item queued");
        Ok(request_id)
    }

    pub async fn get_request_results(&mut self, request_id: &str) -> Result<RequestResults> {
        self.get_request_results_at(request_id, Utc::now())
    }

    /// `get_request_results` evaluated at `now`.
    pub fn get_request_results_at(&mut self, request_id: &str, now: DateTime<Utc>) -> Result<RequestResults> {
        PendingRequests::validate_id(request_id)?;
        self.active_session()?;
        let results = self.pending.poll_at(request_id, now)?;
        debug!(request_id, status = ?results.status, "Polled queued request");
        Ok(results)
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn discover<T: Transport>(transport: &T, kind: ServiceKind, base_url: &str) -> Result<ServiceDescriptor> {
    let url = kind.wsdl_url(base_url);
    let discovery_error = |message: String| ApiError::Discovery {
        service: kind.display_name().to_string(),
        message,
    };

    debug!(url = %url, "Fetching WSDL");
    let reply = transport
        .get(&url)
        .await
        .map_err(|e| discovery_error(e.to_string()))?;
    if !reply.is_success() {
        return Err(discovery_error(format!("HTTP status {} from {}", reply.status, url)));
    }

    ServiceDescriptor::parse(kind, &reply.body, &kind.endpoint_url(base_url))
        .map_err(|e| discovery_error(e.to_string()))
}

/// The `{operation}Result` wrapper, or `None` (logged) when the reply lacks it.
fn lenient_result<'a>(operation: &str, response: &'a XmlNode) -> Option<&'a XmlNode> {
    let wrapper = format!("{}Result", operation);
    let result = response.child(&wrapper);
    if result.is_none() {
        warn!(operation, "{} not found in response, using fallback", wrapper);
    }
    result
}

fn expect_response(operation: &str, response: &XmlNode) -> Result<()> {
    let expected = format!("{}Response", operation);
    if response.name == expected {
        Ok(())
    } else {
        Err(ApiError::invalid_response(
            operation,
            format!("Expected {}, found {}", expected, response.name),
        ))
    }
}

fn strict_result<'a>(operation: &str, response: &'a XmlNode) -> Result<&'a XmlNode> {
    let wrapper = format!("{}Result", operation);
    response
        .child(&wrapper)
        .ok_or_else(|| ApiError::invalid_response(operation, format!("{} not found in response", wrapper)))
}

/// `HardExpirationTime` arrives either with an offset or as a bare UTC
/// timestamp. Unparseable values fall back to the default lifetime.
fn parse_expiration(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    warn!(value = raw, "Unparseable HardExpirationTime, using default token lifetime");
    None
}
