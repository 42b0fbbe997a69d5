use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    GameAccount,
    DownloadFile,
    CpmServices,
    CpmLuaScripts,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::GameAccount => "game_account",
            ProductCategory::DownloadFile => "download_file",
            ProductCategory::CpmServices => "cpm_services",
            ProductCategory::CpmLuaScripts => "cpm_lua_scripts",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::GameAccount => "Game Accounts",
            ProductCategory::DownloadFile => "Downloads",
            ProductCategory::CpmServices => "CPM Services",
            ProductCategory::CpmLuaScripts => "CPM Lua Scripts",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "game_account" => Ok(ProductCategory::GameAccount),
            "download_file" => Ok(ProductCategory::DownloadFile),
            "cpm_services" => Ok(ProductCategory::CpmServices),
            "cpm_lua_scripts" => Ok(ProductCategory::CpmLuaScripts),
            other => Err(AppError::validation(format!(
                "Unknown product category '{other}'"
            ))),
        }
    }
}

/// Catalog entry as listed by the backend. Prices are in pence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub category: ProductCategory,
    pub is_available: bool,
    pub image_url: String,
}

impl Product {
    /// Order item names are matched against product names, not ids.
    pub fn matches_item_name(&self, item_name: &str) -> bool {
        names_match(&self.name, item_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub features: Vec<String>,
    pub is_active: bool,
}

/// Case-insensitive, whitespace-trimmed name comparison.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
