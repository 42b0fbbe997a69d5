use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::StoreBackend;
use crate::errors::{AppError, AppResult};
use crate::models::UserProfile;
use crate::{log_info, log_warn, validation};

/// Application session: the backend handle plus the logged-in customer.
pub struct Session {
    backend: Arc<dyn StoreBackend>,
    customer: Mutex<Option<UserProfile>>,
}

impl Session {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            backend,
            customer: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<UserProfile>> {
        // A panic while holding this lock leaves plain data behind.
        self.customer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn backend(&self) -> Arc<dyn StoreBackend> {
        Arc::clone(&self.backend)
    }

    pub fn login(&self, profile: UserProfile) {
        log_info!("SESSION", "Customer logged in", json!({ "username": profile.username }));
        *self.lock() = Some(profile);
    }

    pub fn logout(&self) {
        *self.lock() = None;
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.lock().clone()
    }

    pub fn username(&self) -> Option<String> {
        self.current_user().map(|p| p.username)
    }

    pub fn require_username(&self) -> AppResult<String> {
        self.username().ok_or(AppError::NotLoggedIn)
    }

    /// Create an account and log it in.
    pub async fn register(&self, username: &str, email: &str) -> AppResult<UserProfile> {
        validation::validate_username(username)?;
        validation::validate_email(email)?;

        let profile = UserProfile {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
        };
        self.backend
            .register_user(&profile.username, &profile.email)
            .await?;
        self.login(profile.clone());
        Ok(profile)
    }

    /// Persist a new email for the logged-in customer when it differs from
    /// the stored one. Returns whether anything was saved.
    pub async fn sync_email(&self, email: &str) -> AppResult<bool> {
        let current = self.current_user().ok_or(AppError::NotLoggedIn)?;
        let email = email.trim();
        if email == current.email {
            return Ok(false);
        }

        let updated = UserProfile {
            username: current.username,
            email: email.to_string(),
        };
        self.backend.save_user_profile(&updated).await?;

        // Only update if the same customer is still logged in.
        match self.lock().as_mut() {
            Some(c) if c.username == updated.username => c.email = updated.email,
            _ => log_warn!("SESSION", "Customer changed while saving email"),
        }
        Ok(true)
    }
}
