pub mod ledger;

pub use ledger::{CreditLedger, InMemoryCreditLedger, LedgerError};
