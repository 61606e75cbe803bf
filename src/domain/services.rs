use thiserror::Error;

/// Contract interaction errors
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Transaction failed: {0}")]
    TransactionError(String),

    #[error("Contract call failed: {0}")]
    ContractCallError(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to decode log: {0}")]
    DecodeError(String),

    #[error("Unsupported chain ID: {0}")]
    UnsupportedChain(u64),

    #[error("Invalid outcome value: {0}")]
    InvalidOutcome(u8),

    #[error("Invalid market status value: {0}")]
    InvalidStatus(u8),

    #[error("Private key not configured: {reason}")]
    MissingPrivateKey { reason: String },

    #[error("Deployment artifact error: {reason}")]
    ArtifactError { reason: String },

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },

    #[error("Not authorized: {operation}")]
    NotAuthorized { operation: String },
}
