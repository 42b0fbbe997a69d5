use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

use super::StoreBackend;
use crate::config::{AppConfig, BackendConfig};
use crate::errors::{AppError, AppResult};
use crate::log_debug;
use crate::models::{
    CouponValidation, Membership, Order, Package, PaymentMethod, PaymentSettings,
    PlaceOrderRequest, Product, ProductFileInfo, PurchaseMembershipRequest, UserProfile,
};

/// JSON-over-HTTP client for the backend gateway. Each operation is a POST
/// to `<base_url>/api/<operation>` with a camelCase JSON body.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_app_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;
        Self::new(&config.backend)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, operation: &str) -> String {
        format!("{}/api/{}", self.base_url, operation)
    }

    async fn send<B>(&self, operation: &str, body: &B) -> AppResult<reqwest::Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        log_debug!("BACKEND", &format!("POST {}", operation));

        let response = self
            .client
            .post(self.endpoint(operation))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body.trim().to_string()
            };
            return Err(AppError::Backend {
                status: Some(status.as_u16()),
                message,
            });
        }

        Ok(response)
    }

    async fn call<B, R>(&self, operation: &str, body: &B) -> AppResult<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let raw = self.send(operation, body).await?.text().await?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::Decode(format!("{}: {}", operation, e)))
    }

    async fn call_unit<B>(&self, operation: &str, body: &B) -> AppResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(operation, body).await?;
        Ok(())
    }
}

#[async_trait]
impl StoreBackend for HttpBackend {
    async fn validate_coupon(
        &self,
        code: &str,
        customer_username: &str,
    ) -> AppResult<CouponValidation> {
        self.call(
            "validateCoupon",
            &json!({ "code": code, "customerUsername": customer_username }),
        )
        .await
    }

    async fn place_order(&self, request: &PlaceOrderRequest) -> AppResult<u64> {
        self.call("placeOrder", request).await
    }

    async fn list_product_files(&self, product_id: u64) -> AppResult<Vec<ProductFileInfo>> {
        self.call("listProductFiles", &json!({ "productId": product_id }))
            .await
    }

    async fn list_product_files_admin(&self, product_id: u64) -> AppResult<Vec<ProductFileInfo>> {
        self.call("listProductFilesAdmin", &json!({ "productId": product_id }))
            .await
    }

    async fn list_files_by_product_name(
        &self,
        product_name: &str,
    ) -> AppResult<Vec<ProductFileInfo>> {
        self.call(
            "listFilesByProductName",
            &json!({ "productName": product_name }),
        )
        .await
    }

    async fn download_product_file(&self, file_id: u64) -> AppResult<Vec<u8>> {
        let bytes = self
            .send("downloadProductFile", &json!({ "fileId": file_id }))
            .await?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    async fn purchase_membership(
        &self,
        customer_username: &str,
        payment_method: PaymentMethod,
        payment_reference: &str,
    ) -> AppResult<u64> {
        let request = PurchaseMembershipRequest {
            customer_username: customer_username.to_string(),
            payment_method,
            payment_reference: payment_reference.to_string(),
        };
        self.call("purchaseMembership", &request).await
    }

    async fn get_membership_status(
        &self,
        customer_username: &str,
    ) -> AppResult<Option<Membership>> {
        self.call(
            "getMembershipStatus",
            &json!({ "customerUsername": customer_username }),
        )
        .await
    }

    async fn check_active_membership(&self, customer_username: &str) -> AppResult<bool> {
        self.call(
            "checkActiveMembership",
            &json!({ "customerUsername": customer_username }),
        )
        .await
    }

    async fn get_customer_orders(&self, customer_username: &str) -> AppResult<Vec<Order>> {
        self.call(
            "getCustomerOrders",
            &json!({ "customerUsername": customer_username }),
        )
        .await
    }

    async fn list_available_products(&self) -> AppResult<Vec<Product>> {
        self.call("listAvailableProducts", &json!({})).await
    }

    async fn list_active_packages(&self) -> AppResult<Vec<Package>> {
        self.call("listActivePackages", &json!({})).await
    }

    async fn get_payment_settings(&self) -> AppResult<Option<PaymentSettings>> {
        self.call("getPaymentSettings", &json!({})).await
    }

    async fn save_user_profile(&self, profile: &UserProfile) -> AppResult<()> {
        self.call_unit("saveCallerUserProfile", profile).await
    }

    async fn register_user(&self, username: &str, email: &str) -> AppResult<()> {
        self.call_unit(
            "registerUser",
            &json!({ "username": username, "email": email }),
        )
        .await
    }
}
