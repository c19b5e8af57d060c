//! Bank account data and the source it is fetched from.

pub mod retry;

use crate::config::WalletConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub account_number: String,
    #[serde(default)]
    pub description: String,
    pub created: DateTime<Utc>,
    /// Balance in pounds.
    pub balance: f64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Negative for money leaving the account.
    pub amount: f64,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub merchant: String,
}

impl Account {
    /// Display name: the description if set, else the account number.
    pub fn label(&self) -> &str {
        if self.description.is_empty() {
            &self.account_number
        } else {
            &self.description
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum WalletError {
    #[error("no accounts found")]
    NoAccounts,
    #[error("bank unavailable: {0}")]
    Unavailable(String),
}

impl WalletError {
    /// Errors that another attempt cannot fix.
    pub fn is_permanent(&self) -> bool {
        matches!(self, WalletError::NoAccounts)
    }
}

#[async_trait]
pub trait Wallet: Send + Sync {
    async fn fetch_accounts(&self) -> Result<Vec<Account>, WalletError>;
}

/// Serves a fixed set of accounts after a simulated network delay. The first
/// `failures` fetches fail as if the bank were unreachable.
pub struct StaticWallet {
    accounts: Vec<Account>,
    latency: Duration,
    failures_left: AtomicU32,
}

impl StaticWallet {
    pub fn new(accounts: Vec<Account>, latency: Duration, failures: u32) -> Self {
        Self {
            accounts,
            latency,
            failures_left: AtomicU32::new(failures),
        }
    }

    pub fn from_config(config: &WalletConfig) -> Arc<dyn Wallet> {
        Arc::new(Self::new(
            config.accounts.clone(),
            Duration::from_millis(config.latency_ms),
            config.simulated_failures,
        ))
    }
}

#[async_trait]
impl Wallet for StaticWallet {
    async fn fetch_accounts(&self) -> Result<Vec<Account>, WalletError> {
        tokio::time::sleep(self.latency).await;

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            warn!("simulated bank outage");
            return Err(WalletError::Unavailable("connection reset by peer".into()));
        }

        if self.accounts.is_empty() {
            return Err(WalletError::NoAccounts);
        }
        debug!(count = self.accounts.len(), "fetched accounts");
        Ok(self.accounts.clone())
    }
}

#[cfg(test)]
pub(crate) fn sample_accounts() -> Vec<Account> {
    crate::config::WalletConfig::default().accounts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_wallet_fails_then_serves() {
        let wallet = StaticWallet::new(sample_accounts(), Duration::ZERO, 2);
        for _ in 0..2 {
            assert!(matches!(
                wallet.fetch_accounts().await,
                Err(WalletError::Unavailable(_))
            ));
        }
        let accounts = wallet.fetch_accounts().await.unwrap();
        assert_eq!(accounts, sample_accounts());
    }

    #[tokio::test]
    async fn test_empty_wallet_is_permanent_error() {
        let wallet = StaticWallet::new(vec![], Duration::ZERO, 0);
        let err = wallet.fetch_accounts().await.unwrap_err();
        assert_eq!(err, WalletError::NoAccounts);
        assert!(err.is_permanent());
        assert!(!WalletError::Unavailable("x".into()).is_permanent());
    }

    #[test]
    fn test_label_falls_back_to_number() {
        let mut account = sample_accounts().remove(0);
        account.description.clear();
        assert_eq!(account.label(), account.account_number);
    }
}
