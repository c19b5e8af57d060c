//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the application works out of the box.

use crate::nav::keys::KeySetError;
use crate::nav::KeySet;
use crate::wallet::{Account, Transaction};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// UI appearance and behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_help_bar: bool,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_toast_short_ms")]
    pub toast_short_ms: u64,
    #[serde(default = "default_toast_long_ms")]
    pub toast_long_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_help_bar: true,
            date_format: default_date_format(),
            toast_short_ms: default_toast_short_ms(),
            toast_long_ms: default_toast_long_ms(),
        }
    }
}

/// Key bindings, written as `|`-separated key names (e.g. `"q|Ctrl-C"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default = "default_quit_keys")]
    pub quit: String,
    #[serde(default = "default_select_keys")]
    pub select: String,
    #[serde(default = "default_back_keys")]
    pub back: String,
    #[serde(default = "default_up_keys")]
    pub up: String,
    #[serde(default = "default_down_keys")]
    pub down: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            quit: default_quit_keys(),
            select: default_select_keys(),
            back: default_back_keys(),
            up: default_up_keys(),
            down: default_down_keys(),
        }
    }
}

/// Parsed form of [`KeysConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub quit: KeySet,
    pub select: KeySet,
    pub back: KeySet,
    pub up: KeySet,
    pub down: KeySet,
}

impl KeysConfig {
    /// Parse every binding, failing on the first invalid one.
    pub fn bindings(&self) -> Result<KeyBindings, KeySetError> {
        Ok(KeyBindings {
            quit: self.quit.parse()?,
            select: self.select.parse()?,
            back: self.back.parse()?,
            up: self.up.parse()?,
            down: self.down.parse()?,
        })
    }
}

/// Where accounts come from and how hard to try fetching them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Simulated network delay per fetch.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// Number of initial fetches that fail, for exercising the retry path.
    #[serde(default)]
    pub simulated_failures: u32,
    #[serde(default = "default_accounts")]
    pub accounts: Vec<Account>,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            latency_ms: default_latency_ms(),
            simulated_failures: 0,
            accounts: default_accounts(),
        }
    }
}

/// Diagnostic log settings. The terminal is taken over by the UI, so logs
/// only ever go to a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_date_format() -> String {
    "%d %b %Y".to_string()
}
fn default_toast_short_ms() -> u64 {
    2000
}
fn default_toast_long_ms() -> u64 {
    5000
}
fn default_quit_keys() -> String {
    "q|Ctrl-C".to_string()
}
fn default_select_keys() -> String {
    "Enter".to_string()
}
fn default_back_keys() -> String {
    "Esc|Backspace".to_string()
}
fn default_up_keys() -> String {
    "Up|k".to_string()
}
fn default_down_keys() -> String {
    "Down|j".to_string()
}
fn default_retry_attempts() -> u32 {
    5
}
fn default_retry_delay_ms() -> u64 {
    3000
}
fn default_latency_ms() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_dir() -> String {
    "~/.local/share/crabwallet/logs".to_string()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_default()
}

fn tx(id: &str, amount: f64, created: DateTime<Utc>, merchant: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount,
        created,
        merchant: merchant.to_string(),
    }
}

fn default_accounts() -> Vec<Account> {
    vec![
        Account {
            id: "acc_00009current".into(),
            account_number: "12345678".into(),
            description: "Current account".into(),
            created: at(2021, 4, 12, 9, 0),
            balance: 1204.55,
            transactions: vec![
                tx("tx_0001", 2450.00, at(2024, 3, 1, 8, 2), "Salary"),
                tx("tx_0002", -850.00, at(2024, 3, 1, 9, 15), "Rent"),
                tx("tx_0003", -42.18, at(2024, 3, 2, 18, 40), "Grocer & Co"),
                tx("tx_0004", -3.20, at(2024, 3, 3, 7, 55), "Corner Coffee"),
                tx("tx_0005", -64.99, at(2024, 3, 5, 12, 30), "Rail Tickets"),
            ],
        },
        Account {
            id: "acc_00009savings".into(),
            account_number: "87654321".into(),
            description: "Savings pot".into(),
            created: at(2022, 1, 3, 14, 30),
            balance: 5300.00,
            transactions: vec![
                tx("tx_0101", 300.00, at(2024, 2, 1, 6, 0), "Round-ups"),
                tx("tx_0102", 500.00, at(2024, 3, 1, 6, 0), "Standing order"),
            ],
        },
    ]
}
