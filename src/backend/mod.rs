//! Gateway to the storefront backend service.
//!
//! Every backend operation the core consumes is one async method on
//! [`StoreBackend`]. Money crosses as integer pence, timestamps as
//! nanoseconds since the epoch and coupon codes already normalized.

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{
    CouponValidation, Membership, Order, Package, PaymentMethod, PaymentSettings,
    PlaceOrderRequest, Product, ProductFileInfo, UserProfile,
};

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::InMemoryBackend;

#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Check a coupon for this customer. Unknown, inactive, exhausted or
    /// already-used coupons are rejected with an error.
    async fn validate_coupon(&self, code: &str, customer_username: &str)
        -> AppResult<CouponValidation>;

    /// Returns the new order id.
    async fn place_order(&self, request: &PlaceOrderRequest) -> AppResult<u64>;

    async fn list_product_files(&self, product_id: u64) -> AppResult<Vec<ProductFileInfo>>;

    async fn list_product_files_admin(&self, product_id: u64) -> AppResult<Vec<ProductFileInfo>>;

    /// Files of the product with this name. Works after the product itself
    /// was deleted or made unavailable.
    async fn list_files_by_product_name(&self, product_name: &str)
        -> AppResult<Vec<ProductFileInfo>>;

    async fn download_product_file(&self, file_id: u64) -> AppResult<Vec<u8>>;

    /// Returns the new membership id.
    async fn purchase_membership(
        &self,
        customer_username: &str,
        payment_method: PaymentMethod,
        payment_reference: &str,
    ) -> AppResult<u64>;

    async fn get_membership_status(&self, customer_username: &str)
        -> AppResult<Option<Membership>>;

    async fn check_active_membership(&self, customer_username: &str) -> AppResult<bool>;

    async fn get_customer_orders(&self, customer_username: &str) -> AppResult<Vec<Order>>;

    async fn list_available_products(&self) -> AppResult<Vec<Product>>;

    async fn list_active_packages(&self) -> AppResult<Vec<Package>>;

    async fn get_payment_settings(&self) -> AppResult<Option<PaymentSettings>>;

    async fn save_user_profile(&self, profile: &UserProfile) -> AppResult<()>;

    async fn register_user(&self, username: &str, email: &str) -> AppResult<()>;
}
