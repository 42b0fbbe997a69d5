#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Notify;

use game_vault_core::backend::{InMemoryBackend, StoreBackend};
use game_vault_core::errors::AppResult;
use game_vault_core::models::{
    Coupon, CouponValidation, DiscountType, Membership, Order, Package, PaymentMethod,
    PaymentSettings, PlaceOrderRequest, Product, ProductFileInfo, UserProfile,
};
use game_vault_core::session::Session;

pub fn percentage_coupon(code: &str, percent: u64) -> Coupon {
    Coupon {
        code: code.to_string(),
        discount_type: DiscountType::Percentage,
        discount_value: percent,
        used_count: 0,
        max_uses: 0,
        is_active: true,
    }
}

pub fn fixed_coupon(code: &str, pence: u64) -> Coupon {
    Coupon {
        code: code.to_string(),
        discount_type: DiscountType::Fixed,
        discount_value: pence,
        used_count: 0,
        max_uses: 0,
        is_active: true,
    }
}

pub fn alice() -> UserProfile {
    UserProfile {
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
    }
}

pub fn logged_in_session(backend: Arc<dyn StoreBackend>) -> Session {
    let session = Session::new(backend);
    session.login(alice());
    session
}

/// Wraps an [`InMemoryBackend`] and holds every `validate_coupon` call until
/// the test releases it.
pub struct GatedBackend {
    pub inner: InMemoryBackend,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedBackend {
    pub fn new(inner: InMemoryBackend) -> Self {
        Self {
            inner,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl StoreBackend for GatedBackend {
    async fn validate_coupon(
        &self,
        code: &str,
        customer_username: &str,
    ) -> AppResult<CouponValidation> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.validate_coupon(code, customer_username).await
    }

    async fn place_order(&self, request: &PlaceOrderRequest) -> AppResult<u64> {
        self.inner.place_order(request).await
    }

    async fn list_product_files(&self, product_id: u64) -> AppResult<Vec<ProductFileInfo>> {
        self.inner.list_product_files(product_id).await
    }

    async fn list_product_files_admin(&self, product_id: u64) -> AppResult<Vec<ProductFileInfo>> {
        self.inner.list_product_files_admin(product_id).await
    }

    async fn list_files_by_product_name(
        &self,
        product_name: &str,
    ) -> AppResult<Vec<ProductFileInfo>> {
        self.inner.list_files_by_product_name(product_name).await
    }

    async fn download_product_file(&self, file_id: u64) -> AppResult<Vec<u8>> {
        self.inner.download_product_file(file_id).await
    }

    async fn purchase_membership(
        &self,
        customer_username: &str,
        payment_method: PaymentMethod,
        payment_reference: &str,
    ) -> AppResult<u64> {
        self.inner
            .purchase_membership(customer_username, payment_method, payment_reference)
            .await
    }

    async fn get_membership_status(
        &self,
        customer_username: &str,
    ) -> AppResult<Option<Membership>> {
        self.inner.get_membership_status(customer_username).await
    }

    async fn check_active_membership(&self, customer_username: &str) -> AppResult<bool> {
        self.inner.check_active_membership(customer_username).await
    }

    async fn get_customer_orders(&self, customer_username: &str) -> AppResult<Vec<Order>> {
        self.inner.get_customer_orders(customer_username).await
    }

    async fn list_available_products(&self) -> AppResult<Vec<Product>> {
        self.inner.list_available_products().await
    }

    async fn list_active_packages(&self) -> AppResult<Vec<Package>> {
        self.inner.list_active_packages().await
    }

    async fn get_payment_settings(&self) -> AppResult<Option<PaymentSettings>> {
        self.inner.get_payment_settings().await
    }

    async fn save_user_profile(&self, profile: &UserProfile) -> AppResult<()> {
        self.inner.save_user_profile(profile).await
    }

    async fn register_user(&self, username: &str, email: &str) -> AppResult<()> {
        self.inner.register_user(username, email).await
    }
}
