//! Error types for the ledger client

use thiserror::Error;

/// Result type for ledger client operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Ledger client errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection profile missing or malformed
    #[error("Connection profile error: {0}")]
    Profile(String),

    /// Wallet identity missing or unusable
    #[error("Identity error: {0}")]
    Identity(String),

    /// No gateway peer could be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Submitting a state-changing transaction failed
    #[error("Failed to submit transaction {transaction}: {reason}")]
    Submit {
        /// Transaction name
        transaction: String,
        /// Failure reported by the gateway
        reason: String,
    },

    /// Evaluating a read-only transaction failed
    #[error("Failed to evaluate transaction {transaction}: {reason}")]
    Evaluate {
        /// Transaction name
        transaction: String,
        /// Failure reported by the gateway
        reason: String,
    },

    /// Transaction result was not a valid record
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Build a submit failure for `transaction`
    pub fn submit(transaction: &str, reason: impl ToString) -> Self {
        LedgerError::Submit {
            transaction: transaction.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build an evaluate failure for `transaction`
    pub fn evaluate(transaction: &str, reason: impl ToString) -> Self {
        LedgerError::Evaluate {
            transaction: transaction.to_string(),
            reason: reason.to_string(),
        }
    }
}
