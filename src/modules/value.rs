//! Value-for-value module: contributions and exchanges.
//!
//! Contributions are recorded in memory. With payments disabled the module
//! still accepts them, marked `"acknowledged"` rather than `"completed"`.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub message: Option<String>,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// In-memory value-for-value store.
#[derive(Debug)]
pub struct ValueModule {
    enabled: bool,
    transactions: DashMap<String, Transaction>,
}

impl ValueModule {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            transactions: DashMap::new(),
        }
    }

    /// Whether contributions are actually processed.
    pub fn payments_enabled(&self) -> bool {
        self.enabled
    }

    /// Always available, even with payments off.
    pub fn is_available(&self) -> bool {
        true
    }

    /// Record a contribution and return the transaction.
    pub fn contribute(
        &self,
        amount: f64,
        currency: String,
        message: Option<String>,
    ) -> Transaction {
        let status = if self.enabled {
            "completed"
        } else {
            "acknowledged"
        };
        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            amount,
            currency,
            message,
            status: status.to_string(),
            timestamp: Utc::now(),
        };
        self.transactions
            .insert(transaction.id.clone(), transaction.clone());
        transaction
    }

    /// Fetch a transaction by id.
    pub fn get(&self, id: &str) -> Option<Transaction> {
        self.transactions.get(id).map(|t| t.value().clone())
    }
}
