pub mod audit;
pub mod backend;
pub mod checkout;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod logger;
pub mod models;
pub mod pricing;
pub mod session;
pub mod validation;

use std::path::Path;
use std::sync::Arc;

use backend::{HttpBackend, StoreBackend};
use errors::AppResult;
use session::Session;

/// Application state shared by the storefront views.
pub struct AppState {
    pub config: &'static config::AppConfig,
    pub session: Session,
}

impl AppState {
    pub fn backend(&self) -> Arc<dyn StoreBackend> {
        self.session.backend()
    }
}

/// Read `<app_data_dir>/.env`, load configuration, start logging under
/// `app_data_dir` and connect to the configured backend.
pub fn init(app_data_dir: &Path) -> AppResult<AppState> {
    let dotenv_path = config::load_dotenv(app_data_dir);
    let app_config = config::init_config();

    if let Err(e) = logger::init_global_logger(app_data_dir, (&app_config.logging).into()) {
        eprintln!("Warning: failed to initialize logger: {}", e);
    }

    app_config.validate()?;

    log_info!(
        "APP",
        "Storefront core starting",
        serde_json::json!({
            "version": app_config.version,
            "environment": app_config.environment.as_str(),
            "backend_url": app_config.backend.base_url,
            "app_data_dir": app_data_dir.to_string_lossy(),
            "dotenv": dotenv_path.as_ref().map(|p| p.to_string_lossy())
        })
    );

    let backend = HttpBackend::from_app_config(app_config)?;
    Ok(init_with_backend(Arc::new(backend)))
}

/// Same as [`init`] without logging setup, over any backend.
pub fn init_with_backend(backend: Arc<dyn StoreBackend>) -> AppState {
    AppState {
        config: config::init_config(),
        session: Session::new(backend),
    }
}
