//! Order-to-file reconciliation for the customer dashboard.
//!
//! Orders reference items by name, so the files of an order are found by
//! matching `order.item_name` against product names. Only accepted orders
//! get files.

use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::audit::{self, PaymentAuditAction};
use crate::backend::StoreBackend;
use crate::errors::{AppError, AppResult};
use crate::models::{Order, Product, ProductFileInfo};
use crate::{log_debug, log_error, log_info, validation};

/// How an order's files are located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLookup {
    /// Ask the backend by product name. Works after the product was deleted.
    ByName,
    /// Legacy: find the product in `products` by name, then list by id.
    ById { products: Vec<Product> },
}

impl FileLookup {
    pub async fn files_for_order(
        &self,
        backend: &dyn StoreBackend,
        order: &Order,
    ) -> AppResult<Vec<ProductFileInfo>> {
        if !can_download(order) {
            return Ok(Vec::new());
        }

        match self {
            FileLookup::ByName => backend.list_files_by_product_name(order.item_name.trim()).await,
            FileLookup::ById { products } => {
                match products.iter().find(|p| p.matches_item_name(&order.item_name)) {
                    Some(product) => backend.list_product_files(product.id).await,
                    None => {
                        log_debug!(
                            "DOWNLOAD",
                            "No catalog product matches order item",
                            json!({ "order_id": order.order_id, "item_name": order.item_name })
                        );
                        Ok(Vec::new())
                    }
                }
            }
        }
    }
}

/// Downloads are offered for accepted orders only.
pub fn can_download(order: &Order) -> bool {
    order.is_accepted()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl DownloadedFile {
    /// Write the payload to `dir/<file_name>`, dropping any directory parts
    /// of the stored name.
    pub fn save_to(&self, dir: &Path) -> AppResult<PathBuf> {
        let name = validation::sanitize_file_name(&self.file_name).ok_or_else(|| {
            AppError::validation(format!("Cannot save file named '{}'", self.file_name))
        })?;
        let path = dir.join(name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

pub async fn download_file(
    backend: &dyn StoreBackend,
    file: &ProductFileInfo,
) -> AppResult<DownloadedFile> {
    let bytes = backend.download_product_file(file.file_id).await?;

    audit::log_payment_action(
        PaymentAuditAction::DownloadFile,
        &json!({ "file_id": file.file_id, "size": bytes.len() }),
    );

    Ok(DownloadedFile {
        file_name: file.file_name.clone(),
        mime_type: file.file_type.mime_type(),
        bytes,
    })
}

/// Download each file on its own; one failure leaves the others untouched.
pub async fn download_all(
    backend: &dyn StoreBackend,
    files: &[ProductFileInfo],
) -> Vec<(u64, AppResult<DownloadedFile>)> {
    let mut results = Vec::with_capacity(files.len());
    for file in files {
        let result = download_file(backend, file).await;
        if let Err(e) = &result {
            log_error!("DOWNLOAD", &format!("Failed to download {}", file.file_name), e);
        }
        results.push((file.file_id, result));
    }
    results
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderFilesState {
    Loading,
    Ready(Vec<ProductFileInfo>),
}

#[derive(Debug)]
struct DownloadsInner {
    state: OrderFilesState,
    downloading: Option<u64>,
}

/// Files panel for one order row.
pub struct OrderDownloads {
    order: Order,
    lookup: FileLookup,
    backend: Arc<dyn StoreBackend>,
    inner: Mutex<DownloadsInner>,
}

impl OrderDownloads {
    pub fn new(order: Order, lookup: FileLookup, backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            order,
            lookup,
            backend,
            inner: Mutex::new(DownloadsInner {
                state: OrderFilesState::Loading,
                downloading: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DownloadsInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn state(&self) -> OrderFilesState {
        self.lock().state.clone()
    }

    pub fn downloading(&self) -> Option<u64> {
        self.lock().downloading
    }

    /// Fetch the file list. A failed lookup is logged and shows as no files.
    pub async fn load(&self) -> OrderFilesState {
        self.lock().state = OrderFilesState::Loading;

        let files = match self.lookup.files_for_order(&*self.backend, &self.order).await {
            Ok(files) => files,
            Err(e) => {
                log_error!("DOWNLOAD", "Failed to list files for order", e);
                Vec::new()
            }
        };

        let state = OrderFilesState::Ready(files);
        self.lock().state = state.clone();
        state
    }

    /// Download one listed file. Errors come back as a message for the
    /// customer.
    pub async fn download(&self, file_id: u64) -> Result<DownloadedFile, String> {
        let file = match &self.lock().state {
            OrderFilesState::Ready(files) => files.iter().find(|f| f.file_id == file_id).cloned(),
            OrderFilesState::Loading => None,
        };
        let Some(file) = file else {
            return Err(audit::user_message(
                &AppError::NotFound(format!("file {file_id}")),
                "Download",
            ));
        };

        self.lock().downloading = Some(file_id);
        let result = download_file(&*self.backend, &file).await;
        {
            let mut inner = self.lock();
            if inner.downloading == Some(file_id) {
                inner.downloading = None;
            }
        }

        match result {
            Ok(downloaded) => {
                log_info!(
                    "DOWNLOAD",
                    "File downloaded",
                    json!({ "order_id": self.order.order_id, "file_id": file_id })
                );
                Ok(downloaded)
            }
            Err(e) => Err(audit::user_message(&e, "Download")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::models::file::{APK_MIME, TEXT_MIME};
    use crate::models::{FileType, OrderStatus, PaymentMethod, ProductCategory};

    fn order(item_name: &str, status: OrderStatus) -> Order {
        Order {
            order_id: 99,
            customer_username: "alice".into(),
            item_name: item_name.into(),
            price: 500,
            payment_method: PaymentMethod::Paypal,
            payment_reference: "TX".into(),
            status,
            coupon_code: None,
            delivery_email: "alice@example.com".into(),
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn pending_and_declined_orders_have_no_files() {
        let backend = InMemoryBackend::new();
        let id = backend.add_product("Mod Menu", 500, ProductCategory::DownloadFile).unwrap();
        backend.add_file(id, "menu.apk", vec![1]).unwrap();

        for status in [OrderStatus::Pending, OrderStatus::Declined] {
            let files = FileLookup::ByName
                .files_for_order(&backend, &order("Mod Menu", status))
                .await
                .unwrap();
            assert!(files.is_empty());
        }
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn by_id_matches_names_loosely() {
        let backend = InMemoryBackend::new();
        let id = backend.add_product("Mod Menu", 500, ProductCategory::DownloadFile).unwrap();
        backend.add_file(id, "menu.apk", vec![1]).unwrap();
        let products = backend.list_available_products().await.unwrap();

        let files = FileLookup::ById { products }
            .files_for_order(&backend, &order("  MOD MENU ", OrderStatus::Accepted))
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_type, FileType::Apk);
    }

    #[tokio::test]
    async fn mime_follows_file_type() {
        let backend = InMemoryBackend::new();
        let id = backend.add_product("Bundle", 500, ProductCategory::DownloadFile).unwrap();
        backend.add_file(id, "menu.apk", vec![1, 2]).unwrap();
        backend.add_file(id, "speed.lua", b"x".to_vec()).unwrap();

        let files = backend.list_product_files(id).await.unwrap();
        let results = download_all(&backend, &files).await;
        let mimes: Vec<&str> = results
            .iter()
            .map(|(_, r)| r.as_ref().unwrap().mime_type)
            .collect();
        assert_eq!(mimes, vec![APK_MIME, TEXT_MIME]);
    }

    #[test]
    fn save_keeps_only_the_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = DownloadedFile {
            file_name: "../../speed.lua".into(),
            mime_type: TEXT_MIME,
            bytes: b"print('hi')".to_vec(),
        };
        let path = file.save_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("speed.lua"));
        assert_eq!(std::fs::read(path).unwrap(), b"print('hi')");
    }

    #[tokio::test]
    async fn panel_loads_and_downloads() {
        let backend = Arc::new(InMemoryBackend::new());
        let id = backend.add_product("Speed Hack", 500, ProductCategory::CpmLuaScripts).unwrap();
        let file_id = backend.add_file(id, "speed.lua", b"x".to_vec()).unwrap();

        let panel = OrderDownloads::new(
            order("Speed Hack", OrderStatus::Accepted),
            FileLookup::ByName,
            backend.clone(),
        );
        assert_eq!(panel.state(), OrderFilesState::Loading);

        match panel.load().await {
            OrderFilesState::Ready(files) => assert_eq!(files.len(), 1),
            other => panic!("unexpected state {other:?}"),
        }

        let downloaded = panel.download(file_id).await.unwrap();
        assert_eq!(downloaded.file_name, "speed.lua");
        assert_eq!(panel.downloading(), None);
        assert!(panel.download(file_id + 100).await.is_err());
    }
}
