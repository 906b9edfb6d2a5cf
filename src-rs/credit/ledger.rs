use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient credit, {remaining} remaining")]
    InsufficientCredit { remaining: i64 },

    #[error("credit ledger unavailable: {0}")]
    Unavailable(String),
}

/// Usable-credit balances per principal.
///
/// Idempotency of `adjust` is the caller's concern; the ledger applies every
/// call it receives.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    async fn balance(&self, principal: &str) -> Result<i64, LedgerError>;

    /// Applies `delta` atomically and returns the new balance.
    async fn adjust(&self, principal: &str, delta: i64) -> Result<i64, LedgerError>;
}

pub struct InMemoryCreditLedger {
    initial_credit: i64,
    balances: DashMap<String, i64>,
}

impl InMemoryCreditLedger {
    pub fn new(initial_credit: i64) -> Self {
        Self {
            initial_credit,
            balances: DashMap::new(),
        }
    }
}

#[async_trait]
impl CreditLedger for InMemoryCreditLedger {
    async fn balance(&self, principal: &str) -> Result<i64, LedgerError> {
        Ok(self
            .balances
            .get(principal)
            .map(|balance| *balance)
            .unwrap_or(self.initial_credit))
    }

    async fn adjust(&self, principal: &str, delta: i64) -> Result<i64, LedgerError> {
        // The entry guard holds the shard lock for the whole read-modify-write.
        match self.balances.entry(principal.to_string()) {
            Entry::Occupied(mut slot) => {
                let next = *slot.get() + delta;
                if next < 0 {
                    return Err(LedgerError::InsufficientCredit { remaining: *slot.get() });
                }
                slot.insert(next);
                Ok(next)
            }
            Entry::Vacant(slot) => {
                let next = self.initial_credit + delta;
                if next < 0 {
                    return Err(LedgerError::InsufficientCredit {
                        remaining: self.initial_credit,
                    });
                }
                slot.insert(next);
                Ok(next)
            }
        }
    }
}
