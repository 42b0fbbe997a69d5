use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

pub const APK_MIME: &str = "application/vnd.android.package-archive";
pub const TEXT_MIME: &str = "text/plain";

/// Downloadable file kinds. Decided from the extension at upload time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Lua,
    Apk,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Lua => "lua",
            FileType::Apk => "apk",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileType::Apk => APK_MIME,
            FileType::Lua => TEXT_MIME,
        }
    }

    /// Detect the type from a file name's extension, e.g. `script.LUA`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.trim().rsplit_once('.')?;
        ext.parse().ok()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lua" => Ok(FileType::Lua),
            "apk" => Ok(FileType::Apk),
            other => Err(AppError::validation(format!(
                "Unsupported file type '{other}'. Only .lua and .apk files are allowed"
            ))),
        }
    }
}

/// File listing entry; the payload itself is fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFileInfo {
    pub file_id: u64,
    pub product_id: u64,
    pub file_name: String,
    pub file_type: FileType,
}
