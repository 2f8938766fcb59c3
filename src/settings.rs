//! User settings persisted as discrete key-value entries
//!
//! Each field lives under its own key and is overwritten independently on
//! save. There is no versioning: a missing key falls back to its default.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::wallet::WalletConnector;

pub const KEY_USER_NAME: &str = "userName";
pub const KEY_USER_EMAIL: &str = "userEmail";
pub const KEY_WALLET_ADDRESS: &str = "walletAddress";
pub const KEY_DARK_MODE: &str = "darkMode";
pub const KEY_LANGUAGE: &str = "language";

/// Durable string storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Keys kept in a flat JSON object on disk, written through on every set
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store, starting empty when the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    TrackerError::Storage(format!("{} is not a settings file: {e}", path.display()))
                })?
            }
        } else {
            BTreeMap::new()
        };
        log::debug!("settings store at {}", path.display());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&updated)?;
        fs::write(&self.path, json)?;
        // Memory only follows a successful write
        *entries = updated;
        Ok(())
    }
}

/// In-process store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Es, Language::Fr, Language::De];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code.trim())
    }
}

/// Settings form values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "userEmail")]
    pub user_email: String,
    #[serde(rename = "walletAddress")]
    pub wallet_address: String,
    #[serde(rename = "darkMode")]
    pub dark_mode: bool,
    pub language: Language,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            user_email: String::new(),
            wallet_address: String::new(),
            dark_mode: true,
            language: Language::En,
        }
    }
}

impl Settings {
    /// Check required fields before anything is written
    pub fn validate(&self) -> Result<()> {
        if self.user_name.trim().is_empty() {
            return Err(TrackerError::Validation("Please enter your name".into()));
        }
        if self.user_email.trim().is_empty() {
            return Err(TrackerError::Validation("Please enter your email".into()));
        }
        if !is_valid_email(self.user_email.trim()) {
            return Err(TrackerError::Validation("Please enter a valid email".into()));
        }
        Ok(())
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

/// Reads and writes [`Settings`] through a [`KeyValueStore`]
pub struct SettingsStore {
    store: Box<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Load saved settings, filling defaults for missing keys
    pub fn load(&self) -> Result<Settings> {
        let defaults = Settings::default();
        let text = |key: &str| -> Result<String> { Ok(self.store.get(key)?.unwrap_or_default()) };

        let dark_mode = match self.store.get(KEY_DARK_MODE)? {
            Some(value) => value == "true",
            None => defaults.dark_mode,
        };
        let language = self
            .store
            .get(KEY_LANGUAGE)?
            .and_then(|code| Language::parse(&code))
            .unwrap_or(defaults.language);

        Ok(Settings {
            user_name: text(KEY_USER_NAME)?,
            user_email: text(KEY_USER_EMAIL)?,
            wallet_address: text(KEY_WALLET_ADDRESS)?,
            dark_mode,
            language,
        })
    }

    /// Validate, then overwrite each key
    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;
        self.store.set(KEY_USER_NAME, settings.user_name.trim())?;
        self.store.set(KEY_USER_EMAIL, settings.user_email.trim())?;
        self.store
            .set(KEY_WALLET_ADDRESS, settings.wallet_address.trim())?;
        self.store
            .set(KEY_DARK_MODE, if settings.dark_mode { "true" } else { "false" })?;
        self.store.set(KEY_LANGUAGE, settings.language.code())?;
        log::info!("settings saved for {}", settings.user_name.trim());
        Ok(())
    }

    /// Saved theme preference
    pub fn dark_mode(&self) -> bool {
        self.load().map_or(true, |s| s.dark_mode)
    }

    /// Connect a wallet and store its address right away.
    ///
    /// Wallet failures come back as `WalletUnavailable` or `WalletRejected`;
    /// a connected address that could not be stored is a `Storage` error.
    pub async fn connect_wallet(&self, connector: &WalletConnector) -> Result<String> {
        let address = connector.request_account().await?;
        self.store
            .set(KEY_WALLET_ADDRESS, &address)
            .map_err(|e| TrackerError::Storage(format!("could not store wallet address: {e}")))?;
        log::info!("wallet {address} stored in settings");
        Ok(address)
    }
}
