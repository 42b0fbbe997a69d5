//! In-process backend with the same observable rules as the real service.
//! Used by tests and local demos.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::StoreBackend;
use crate::dashboard::membership::{is_membership_active, now_nanos};
use crate::errors::{AppError, AppResult};
use crate::models::product::names_match;
use crate::models::{
    Coupon, CouponDraft, CouponValidation, Membership, Order, OrderStatus, Package, PaymentMethod,
    PaymentSettings, PlaceOrderRequest, Product, ProductCategory, ProductFileInfo, UserProfile,
};
use crate::validation;

const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;

struct StoredFile {
    info: ProductFileInfo,
    /// Name of the owning product at upload time, kept so lookups by name
    /// survive deletion of the product.
    product_name: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Store {
    products: Vec<Product>,
    packages: Vec<Package>,
    coupons: HashMap<String, Coupon>,
    /// (code, username) pairs that already redeemed a coupon.
    coupon_uses: HashSet<(String, String)>,
    orders: Vec<Order>,
    files: Vec<StoredFile>,
    memberships: Vec<Membership>,
    users: HashMap<String, UserProfile>,
    payment_settings: Option<PaymentSettings>,
    failing_downloads: HashSet<u64>,
    calls: Vec<&'static str>,
    next_id: u64,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct InMemoryBackend {
    store: Mutex<Store>,
    membership_days: u32,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let membership_days = crate::config::get_config()
            .map(|c| c.store.membership_days)
            .unwrap_or(30);
        Self::with_membership_days(membership_days)
    }

    pub fn with_membership_days(membership_days: u32) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            membership_days,
        }
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| AppError::backend("In-memory store lock poisoned"))
    }

    fn record(&self, op: &'static str) -> AppResult<MutexGuard<'_, Store>> {
        let mut store = self.lock()?;
        store.calls.push(op);
        Ok(store)
    }

    /// How many times `op` (the trait method name) was called.
    pub fn call_count(&self, op: &str) -> usize {
        self.lock()
            .map(|s| s.calls.iter().filter(|c| **c == op).count())
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().map(|s| s.calls.len()).unwrap_or(0)
    }

    // ----- admin-side seeding -----

    pub fn add_product(&self, name: &str, price: u64, category: ProductCategory) -> AppResult<u64> {
        let mut store = self.lock()?;
        let id = store.next_id();
        store.products.push(Product {
            id,
            name: name.trim().to_string(),
            description: String::new(),
            price,
            category,
            is_available: true,
            image_url: String::new(),
        });
        Ok(id)
    }

    pub fn set_product_available(&self, product_id: u64, available: bool) -> AppResult<()> {
        let mut store = self.lock()?;
        let product = store
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
        product.is_available = available;
        Ok(())
    }

    /// Deletes the product record. Its files stay reachable by name.
    pub fn delete_product(&self, product_id: u64) -> AppResult<()> {
        let mut store = self.lock()?;
        let before = store.products.len();
        store.products.retain(|p| p.id != product_id);
        if store.products.len() == before {
            return Err(AppError::NotFound(format!("product {product_id}")));
        }
        Ok(())
    }

    pub fn add_package(&self, name: &str, price: u64, features: &[&str]) -> AppResult<u64> {
        let mut store = self.lock()?;
        let id = store.next_id();
        store.packages.push(Package {
            id,
            name: name.trim().to_string(),
            description: String::new(),
            price,
            features: features.iter().map(|f| f.to_string()).collect(),
            is_active: true,
        });
        Ok(id)
    }

    /// Store a coupon. Definitions outside the discount bounds are rejected.
    pub fn add_coupon(&self, coupon: Coupon) -> AppResult<()> {
        let code = validation::normalize_coupon_code(&coupon.code);
        validation::validate_coupon_draft(&CouponDraft {
            code: code.clone(),
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            max_uses: coupon.max_uses,
            is_active: coupon.is_active,
        })?;
        let mut store = self.lock()?;
        store.coupons.insert(code.clone(), Coupon { code, ..coupon });
        Ok(())
    }

    /// Upload a file for a product. The type is detected from the extension.
    pub fn add_file(&self, product_id: u64, file_name: &str, bytes: Vec<u8>) -> AppResult<u64> {
        let file_type = validation::validate_upload_file_name(file_name)?;
        let mut store = self.lock()?;
        let product_name = store
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.name.clone())
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
        let file_id = store.next_id();
        store.files.push(StoredFile {
            info: ProductFileInfo {
                file_id,
                product_id,
                file_name: file_name.trim().to_string(),
                file_type,
            },
            product_name,
            bytes,
        });
        Ok(file_id)
    }

    pub fn fail_downloads_of(&self, file_id: u64) -> AppResult<()> {
        self.lock()?.failing_downloads.insert(file_id);
        Ok(())
    }

    pub fn set_order_status(&self, order_id: u64, status: OrderStatus) -> AppResult<()> {
        let mut store = self.lock()?;
        let order = store
            .orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
        order.status = status;
        Ok(())
    }

    pub fn set_payment_settings(&self, settings: PaymentSettings) -> AppResult<()> {
        self.lock()?.payment_settings = Some(settings);
        Ok(())
    }

    pub fn insert_membership(&self, membership: Membership) -> AppResult<()> {
        self.lock()?.memberships.push(membership);
        Ok(())
    }

    pub fn orders(&self) -> Vec<Order> {
        self.lock().map(|s| s.orders.clone()).unwrap_or_default()
    }

    pub fn coupon(&self, code: &str) -> Option<Coupon> {
        self.lock()
            .ok()
            .and_then(|s| s.coupons.get(&validation::normalize_coupon_code(code)).cloned())
    }

    pub fn user(&self, username: &str) -> Option<UserProfile> {
        self.lock().ok().and_then(|s| s.users.get(username).cloned())
    }
}

fn latest_membership<'a>(store: &'a Store, username: &str) -> Option<&'a Membership> {
    store
        .memberships
        .iter()
        .filter(|m| m.customer_username == username)
        .max_by_key(|m| m.expires_at)
}

#[async_trait]
impl StoreBackend for InMemoryBackend {
    async fn validate_coupon(
        &self,
        code: &str,
        customer_username: &str,
    ) -> AppResult<CouponValidation> {
        let store = self.record("validate_coupon")?;
        let code = validation::normalize_coupon_code(code);

        let coupon = store
            .coupons
            .get(&code)
            .ok_or_else(|| AppError::backend("Coupon not found"))?;
        if !coupon.is_active {
            return Err(AppError::backend("Coupon is not active"));
        }
        if coupon.is_exhausted() {
            return Err(AppError::backend("Coupon usage limit reached"));
        }
        if store
            .coupon_uses
            .contains(&(code.clone(), customer_username.to_string()))
        {
            return Err(AppError::backend("Coupon already used by this customer"));
        }

        Ok(CouponValidation {
            coupon: coupon.clone(),
            solo_use: coupon.max_uses == 1,
        })
    }

    async fn place_order(&self, request: &PlaceOrderRequest) -> AppResult<u64> {
        let mut store = self.record("place_order")?;

        if let Some(code) = &request.coupon_code {
            let code = validation::normalize_coupon_code(code);
            let key = (code.clone(), request.customer_username.clone());
            if store.coupon_uses.contains(&key) {
                return Err(AppError::backend("Coupon already used by this customer"));
            }
            let coupon = store
                .coupons
                .get_mut(&code)
                .ok_or_else(|| AppError::backend("Coupon not found"))?;
            if !coupon.is_active || coupon.is_exhausted() {
                return Err(AppError::backend("Coupon is no longer valid"));
            }
            coupon.used_count += 1;
            store.coupon_uses.insert(key);
        }

        let order_id = store.next_id();
        store.orders.push(Order {
            order_id,
            customer_username: request.customer_username.clone(),
            item_name: request.item_name.clone(),
            price: request.price,
            payment_method: request.payment_method,
            payment_reference: request.payment_reference.clone(),
            status: OrderStatus::Pending,
            coupon_code: request.coupon_code.clone(),
            delivery_email: request.delivery_email.clone(),
            timestamp: now_nanos(),
        });
        Ok(order_id)
    }

    async fn list_product_files(&self, product_id: u64) -> AppResult<Vec<ProductFileInfo>> {
        let store = self.record("list_product_files")?;
        Ok(store
            .files
            .iter()
            .filter(|f| f.info.product_id == product_id)
            .map(|f| f.info.clone())
            .collect())
    }

    async fn list_product_files_admin(&self, product_id: u64) -> AppResult<Vec<ProductFileInfo>> {
        let store = self.record("list_product_files_admin")?;
        Ok(store
            .files
            .iter()
            .filter(|f| f.info.product_id == product_id)
            .map(|f| f.info.clone())
            .collect())
    }

    async fn list_files_by_product_name(
        &self,
        product_name: &str,
    ) -> AppResult<Vec<ProductFileInfo>> {
        let store = self.record("list_files_by_product_name")?;
        Ok(store
            .files
            .iter()
            .filter(|f| names_match(&f.product_name, product_name))
            .map(|f| f.info.clone())
            .collect())
    }

    async fn download_product_file(&self, file_id: u64) -> AppResult<Vec<u8>> {
        let store = self.record("download_product_file")?;
        if store.failing_downloads.contains(&file_id) {
            return Err(AppError::Transport(format!("connection reset while fetching file {file_id}")));
        }
        store
            .files
            .iter()
            .find(|f| f.info.file_id == file_id)
            .map(|f| f.bytes.clone())
            .ok_or_else(|| AppError::NotFound(format!("file {file_id}")))
    }

    async fn purchase_membership(
        &self,
        customer_username: &str,
        payment_method: PaymentMethod,
        payment_reference: &str,
    ) -> AppResult<u64> {
        let mut store = self.record("purchase_membership")?;
        let id = store.next_id();
        let purchased_at = now_nanos();
        store.memberships.push(Membership {
            id,
            customer_username: customer_username.to_string(),
            purchased_at,
            expires_at: purchased_at + i64::from(self.membership_days) * NANOS_PER_DAY,
            payment_method,
            payment_reference: payment_reference.to_string(),
        });
        Ok(id)
    }

    async fn get_membership_status(
        &self,
        customer_username: &str,
    ) -> AppResult<Option<Membership>> {
        let store = self.record("get_membership_status")?;
        Ok(latest_membership(&store, customer_username).cloned())
    }

    async fn check_active_membership(&self, customer_username: &str) -> AppResult<bool> {
        let store = self.record("check_active_membership")?;
        Ok(is_membership_active(
            latest_membership(&store, customer_username),
            now_nanos(),
        ))
    }

    async fn get_customer_orders(&self, customer_username: &str) -> AppResult<Vec<Order>> {
        let store = self.record("get_customer_orders")?;
        let mut orders: Vec<Order> = store
            .orders
            .iter()
            .filter(|o| o.customer_username == customer_username)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.order_id.cmp(&a.order_id)));
        Ok(orders)
    }

    async fn list_available_products(&self) -> AppResult<Vec<Product>> {
        let store = self.record("list_available_products")?;
        Ok(store.products.iter().filter(|p| p.is_available).cloned().collect())
    }

    async fn list_active_packages(&self) -> AppResult<Vec<Package>> {
        let store = self.record("list_active_packages")?;
        Ok(store.packages.iter().filter(|p| p.is_active).cloned().collect())
    }

    async fn get_payment_settings(&self) -> AppResult<Option<PaymentSettings>> {
        let store = self.record("get_payment_settings")?;
        Ok(store.payment_settings.clone())
    }

    async fn save_user_profile(&self, profile: &UserProfile) -> AppResult<()> {
        let mut store = self.record("save_user_profile")?;
        store.users.insert(profile.username.clone(), profile.clone());
        Ok(())
    }

    async fn register_user(&self, username: &str, email: &str) -> AppResult<()> {
        let mut store = self.record("register_user")?;
        if store.users.contains_key(username) {
            return Err(AppError::backend("Username already taken"));
        }
        store.users.insert(
            username.to_string(),
            UserProfile {
                username: username.to_string(),
                email: email.to_string(),
            },
        );
        Ok(())
    }
}
