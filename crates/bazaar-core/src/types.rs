//! # Domain Types
//!
//! Core domain types used throughout Bazaar.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐                │
//! │  │    User      │   │   Product    │   │   CartLine   │                │
//! │  │  role        │◄──│  seller_id   │◄──│  product_id  │                │
//! │  │  wallet      │   │  product_code│   │  quantity    │                │
//! │  └──────┬───────┘   └──────────────┘   └──────────────┘                │
//! │         │ buyer                                                         │
//! │  ┌──────▼───────┐   ┌──────────────┐   ┌──────────────┐                │
//! │  │    Order     │◄──│  OrderItem   │   │ ReturnOrder  │──► Order       │
//! │  │ order_number │   │  seller_id   │   │ refund_amount│                │
//! │  │ status       │   │  unit price  │   │ status       │                │
//! │  └──────────────┘   └──────────────┘   └──────────────┘                │
//! │                                                                         │
//! │  WalletCredit: ledger row behind User.wallet_balance_cents             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations and URLs
//! - Business ID where humans need one: `product_code` (PROD-0001),
//!   `order_number` (ORD-20261019-3F9A1C2B)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::lifecycle::{OrderStatus, ReturnStatus};
use crate::money::{EarningsSplit, Money};
use crate::validation::{self, ValidationResult};

// =============================================================================
// Users
// =============================================================================

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Buyer,
    Seller,
    Admin,
}

impl UserRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::Buyer => "buyer",
            UserRole::Seller => "seller",
            UserRole::Admin => "admin",
        }
    }

    /// Parses a role a user may pick at signup. Admins are seeded, never signed up.
    pub fn parse_signup(s: &str) -> ValidationResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(UserRole::Buyer),
            "seller" => Ok(UserRole::Seller),
            _ => Err(ValidationError::NotAllowed {
                field: "user_type".to_string(),
                allowed: vec!["buyer".to_string(), "seller".to_string()],
            }),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marketplace account. The password hash never leaves bazaar-db.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub role: UserRole,
    pub is_verified: bool,

    // Seller-only business details
    pub shop_name: Option<String>,
    pub registration_number: Option<String>,
    pub shop_address: Option<String>,
    pub warehouse_address: Option<String>,
    pub return_address: Option<String>,
    pub business_details: Option<String>,

    /// Refund credit in cents.
    pub wallet_balance_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    #[inline]
    pub fn wallet_balance(&self) -> Money {
        Money::from_cents(self.wallet_balance_cents)
    }
}

/// Business details every seller must provide at signup.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SellerProfile {
    pub shop_name: String,
    pub registration_number: String,
    pub shop_address: String,
    pub warehouse_address: String,
    pub return_address: String,
    pub business_details: Option<String>,
}

/// Signup form as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub user_type: String,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub shop_address: Option<String>,
    #[serde(default)]
    pub warehouse_address: Option<String>,
    #[serde(default)]
    pub return_address: Option<String>,
    #[serde(default)]
    pub business_details: Option<String>,
}

impl SignupInput {
    /// Checks every field and returns the requested role.
    ///
    /// Sellers must also fill in shop name, registration number and the
    /// shop, warehouse and return addresses.
    pub fn validate(&self) -> ValidationResult<UserRole> {
        validation::validate_email(&self.email)?;
        validation::validate_password(&self.password)?;
        validation::validate_person_name("first_name", &self.first_name)?;
        validation::validate_person_name("last_name", &self.last_name)?;
        validation::validate_phone(&self.phone_number)?;
        validation::validate_required("address", &self.address)?;

        let role = UserRole::parse_signup(&self.user_type)?;
        if role == UserRole::Seller {
            let seller_fields = [
                ("shop_name", &self.shop_name),
                ("registration_number", &self.registration_number),
                ("shop_address", &self.shop_address),
                ("warehouse_address", &self.warehouse_address),
                ("return_address", &self.return_address),
            ];
            for (field, value) in seller_fields {
                validation::validate_required(field, value.as_deref().unwrap_or(""))?;
            }
        }

        Ok(role)
    }

    /// Builds the row to insert once the password has been hashed.
    pub fn into_new_user(self, role: UserRole, password_hash: String) -> NewUser {
        let seller = match role {
            UserRole::Seller => Some(SellerProfile {
                shop_name: trimmed(self.shop_name),
                registration_number: trimmed(self.registration_number),
                shop_address: trimmed(self.shop_address),
                warehouse_address: trimmed(self.warehouse_address),
                return_address: trimmed(self.return_address),
                business_details: self
                    .business_details
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
            }),
            _ => None,
        };

        NewUser {
            email: validation::normalize_email(&self.email),
            password_hash,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            address: self.address.trim().to_string(),
            role,
            is_verified: false,
            seller,
        }
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// A user ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub role: UserRole,
    pub is_verified: bool,
    pub seller: Option<SellerProfile>,
}

/// Partial profile edit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub shop_name: Option<String>,
    pub shop_address: Option<String>,
    pub warehouse_address: Option<String>,
    pub return_address: Option<String>,
    pub business_details: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self, role: UserRole) -> ValidationResult<()> {
        if let Some(name) = &self.first_name {
            validation::validate_person_name("first_name", name)?;
        }
        if let Some(name) = &self.last_name {
            validation::validate_person_name("last_name", name)?;
        }
        if let Some(phone) = &self.phone_number {
            validation::validate_phone(phone)?;
        }
        if let Some(address) = &self.address {
            validation::validate_required("address", address)?;
        }

        let seller_fields = [
            ("shop_name", &self.shop_name),
            ("shop_address", &self.shop_address),
            ("warehouse_address", &self.warehouse_address),
            ("return_address", &self.return_address),
        ];
        for (field, value) in seller_fields {
            if let Some(value) = value {
                if role != UserRole::Seller {
                    return Err(ValidationError::NotAllowed {
                        field: field.to_string(),
                        allowed: vec!["seller accounts".to_string()],
                    });
                }
                validation::validate_required(field, value)?;
            }
        }

        Ok(())
    }
}

// =============================================================================
// Products
// =============================================================================

/// Listing visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    Inactive,
    OutOfStock,
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Active
    }
}

/// A seller-owned listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    /// Business identifier, `PROD-0001`.
    pub product_code: String,
    pub seller_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub stock_quantity: i64,
    /// Image URLs, stored as a JSON array.
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub images: Vec<String>,
    pub status: ProductStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Visible in the shop and addable to a cart.
    pub fn is_purchasable(&self) -> bool {
        self.status == ProductStatus::Active && self.stock_quantity > 0
    }
}

/// A product joined with its seller, for the shop and the admin overview.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ListedProduct {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub product: Product,
    pub shop_name: Option<String>,
    pub seller_name: String,
}

/// Fields for a new listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub stock_quantity: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

impl NewProduct {
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_product_name(&self.name)?;
        validation::validate_required("description", &self.description)?;
        validation::validate_required("category", &self.category)?;
        validation::validate_price_cents(self.price_cents)?;
        validation::validate_stock(self.stock_quantity)?;
        validation::validate_images(&self.images)?;
        Ok(())
    }

    /// Status to store: an explicit choice wins, otherwise zero stock means
    /// out of stock.
    pub fn initial_status(&self) -> ProductStatus {
        match self.status {
            Some(status) => status,
            None if self.stock_quantity == 0 => ProductStatus::OutOfStock,
            None => ProductStatus::Active,
        }
    }
}

/// Partial product edit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub images: Option<Vec<String>>,
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validation::validate_product_name(name)?;
        }
        if let Some(description) = &self.description {
            validation::validate_required("description", description)?;
        }
        if let Some(category) = &self.category {
            validation::validate_required("category", category)?;
        }
        if let Some(price) = self.price_cents {
            validation::validate_price_cents(price)?;
        }
        if let Some(stock) = self.stock_quantity {
            validation::validate_stock(stock)?;
        }
        if let Some(images) = &self.images {
            validation::validate_images(images)?;
        }
        Ok(())
    }

    /// Applies the patch in place.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            product.description = description.trim().to_string();
        }
        if let Some(category) = &self.category {
            product.category = category.trim().to_string();
        }
        if let Some(price) = self.price_cents {
            product.price_cents = price;
        }
        if let Some(stock) = self.stock_quantity {
            product.stock_quantity = stock;
        }
        if let Some(images) = &self.images {
            product.images = images.clone();
        }
        if let Some(status) = self.status {
            product.status = status;
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A cart row joined with the product it points at.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLine {
    /// Cart item id.
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub product_name: String,
    pub price_cents: i64,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub images: Vec<String>,
    pub seller_id: String,
    pub shop_name: Option<String>,
}

impl CartLine {
    /// Live price × quantity.
    pub fn subtotal(&self) -> CoreResult<Money> {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// A placed order. `total_cents` is frozen at creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    /// Buyer.
    pub user_id: String,
    pub total_cents: i64,
    pub delivery_address: String,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line of an order.
/// Uses snapshot pattern to freeze product data at time of purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// Cleared if the product is later deleted.
    pub product_id: Option<String>,
    pub seller_id: String,
    /// Product name at time of purchase (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in cents at time of purchase (frozen).
    pub unit_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn line_total(&self) -> CoreResult<Money> {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// An order item with the product's current images.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItemDetail {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub item: OrderItem,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub product_images: Vec<String>,
}

/// An order with its lines and return, as shown to the buyer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
    /// Sum of item quantities.
    pub item_count: i64,
    pub return_order: Option<ReturnOrder>,
}

impl OrderDetail {
    pub fn new(order: Order, items: Vec<OrderItemDetail>, return_order: Option<ReturnOrder>) -> Self {
        let item_count = items.iter().map(|i| i.item.quantity).sum();
        OrderDetail {
            order,
            items,
            item_count,
            return_order,
        }
    }

    pub fn return_status(&self) -> Option<ReturnStatus> {
        self.return_order.as_ref().map(|r| r.status)
    }
}

/// An order with the buyer's display name (admin view).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderWithBuyer {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub order: Order,
    pub buyer_name: String,
}

// =============================================================================
// Returns
// =============================================================================

/// Post-delivery return of an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ReturnOrder {
    pub id: String,
    pub order_id: String,
    /// Buyer.
    pub user_id: String,
    pub seller_id: String,
    pub return_reason: String,
    pub status: ReturnStatus,
    /// Frozen from the order total at request time.
    pub refund_amount_cents: i64,
    /// Copied from the seller's profile at request time.
    pub return_address: String,
    #[ts(as = "Option<String>")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Wallet
// =============================================================================

/// Why a wallet was credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CreditReason {
    OrderRejected,
    ReturnResolved,
}

/// One credit in a user's wallet ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct WalletCredit {
    pub id: String,
    pub user_id: String,
    pub order_id: String,
    pub reason: CreditReason,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Admin
// =============================================================================

/// Delivered-sales earnings of one seller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SellerEarnings {
    pub seller_id: String,
    pub seller_name: String,
    pub shop_name: Option<String>,
    #[serde(flatten)]
    pub split: EarningsSplit,
}

/// Everything the back-office overview shows.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdminOverview {
    pub users: Vec<User>,
    pub products: Vec<ListedProduct>,
    pub orders: Vec<OrderWithBuyer>,
    pub seller_earnings: Vec<SellerEarnings>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn buyer_signup() -> SignupInput {
        SignupInput {
            email: "Ada@Example.com ".to_string(),
            password: "secret1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone_number: "0300 1234567".to_string(),
            address: "12 Analytical St".to_string(),
            user_type: "buyer".to_string(),
            ..Default::default()
        }
    }

    fn product(status: ProductStatus, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            product_code: "PROD-0001".to_string(),
            seller_id: "s-1".to_string(),
            name: "Scarf".to_string(),
            description: "Silk".to_string(),
            category: "Accessories".to_string(),
            price_cents: 1000,
            stock_quantity: stock,
            images: vec![],
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_buyer_signup_is_valid() {
        let input = buyer_signup();
        assert_eq!(input.validate().unwrap(), UserRole::Buyer);

        let new_user = input.into_new_user(UserRole::Buyer, "hash".to_string());
        assert_eq!(new_user.email, "ada@example.com");
        assert!(new_user.seller.is_none());
        assert!(!new_user.is_verified);
    }

    #[test]
    fn test_seller_signup_requires_business_fields() {
        let mut input = buyer_signup();
        input.user_type = "seller".to_string();
        input.shop_name = Some("Ada's".to_string());
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("registration_number"));

        input.registration_number = Some("REG-1".to_string());
        input.shop_address = Some("1 Shop Rd".to_string());
        input.warehouse_address = Some("2 Store Rd".to_string());
        input.return_address = Some("3 Return Rd".to_string());
        assert_eq!(input.validate().unwrap(), UserRole::Seller);

        let new_user = input.into_new_user(UserRole::Seller, "hash".to_string());
        let seller = new_user.seller.unwrap();
        assert_eq!(seller.return_address, "3 Return Rd");
        assert!(seller.business_details.is_none());
    }

    #[test]
    fn test_admin_cannot_sign_up() {
        let mut input = buyer_signup();
        input.user_type = "admin".to_string();
        assert!(matches!(
            input.validate(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_buyer_cannot_set_shop_fields() {
        let update = ProfileUpdate {
            return_address: Some("x".to_string()),
            ..Default::default()
        };
        assert!(update.validate(UserRole::Buyer).is_err());
        assert!(update.validate(UserRole::Seller).is_ok());
    }

    #[test]
    fn test_purchasable() {
        assert!(product(ProductStatus::Active, 3).is_purchasable());
        assert!(!product(ProductStatus::Active, 0).is_purchasable());
        assert!(!product(ProductStatus::Inactive, 3).is_purchasable());
    }

    #[test]
    fn test_product_patch_apply() {
        let mut p = product(ProductStatus::Active, 3);
        let patch = ProductPatch {
            price_cents: Some(1500),
            status: Some(ProductStatus::Inactive),
            ..Default::default()
        };
        patch.validate().unwrap();
        patch.apply(&mut p);
        assert_eq!(p.price_cents, 1500);
        assert_eq!(p.status, ProductStatus::Inactive);
        assert_eq!(p.name, "Scarf");
    }

    #[test]
    fn test_new_product_initial_status() {
        let mut np = NewProduct {
            name: "Scarf".to_string(),
            description: "Silk".to_string(),
            category: "Accessories".to_string(),
            price_cents: 1000,
            stock_quantity: 0,
            images: vec![],
            status: None,
        };
        assert_eq!(np.initial_status(), ProductStatus::OutOfStock);
        np.stock_quantity = 5;
        assert_eq!(np.initial_status(), ProductStatus::Active);
        np.price_cents = -1;
        assert!(np.validate().is_err());
    }
}
