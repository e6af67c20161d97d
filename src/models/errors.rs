//! Centralized Error Handling Module
//!
//! Every failure in the pipeline carries a unique error code so logs stay
//! grep-able in production.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - RPC_xxx: transport / JSON-RPC errors
//! - INPUT / NETWORK: validation and configuration errors
//! - TX / RECEIPT / BLOCK: fetch outcomes

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Input / Configuration Errors
    // ============================================
    /// Malformed transaction hash or address
    InvalidInput,
    /// Chain ID not in the registry
    UnsupportedNetwork,
    /// Registry entry has an empty endpoint list
    NoEndpointsConfigured,

    // ============================================
    // Failover / Connectivity Errors
    // ============================================
    /// Every endpoint in the list failed the liveness probe
    AllEndpointsFailed,
    /// Primary transaction fetch exceeded its budget
    FetchTimeout,
    /// RPC returned error response
    RpcError,
    /// RPC connection failed
    RpcConnectionFailed,
    /// Invalid RPC response
    RpcInvalidResponse,

    // ============================================
    // Fetch Outcomes
    // ============================================
    /// Transaction hash unknown to the network
    TransactionNotFound,
    /// Receipt missing for a known transaction
    ReceiptNotFound,
    /// Block missing (secondary entry points)
    BlockNotFound,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::UnsupportedNetwork => "UNSUPPORTED_NETWORK",
            Self::NoEndpointsConfigured => "NO_ENDPOINTS_CONFIGURED",

            Self::AllEndpointsFailed => "ALL_ENDPOINTS_FAILED",
            Self::FetchTimeout => "FETCH_TIMEOUT",
            Self::RpcError => "RPC_ERROR",
            Self::RpcConnectionFailed => "RPC_CONNECTION_FAILED",
            Self::RpcInvalidResponse => "RPC_INVALID_RESPONSE",

            Self::TransactionNotFound => "TX_NOT_FOUND",
            Self::ReceiptNotFound => "RECEIPT_NOT_FOUND",
            Self::BlockNotFound => "BLOCK_NOT_FOUND",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Check if error is retryable (connectivity-shaped, not semantic)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AllEndpointsFailed
                | Self::FetchTimeout
                | Self::RpcError
                | Self::RpcConnectionFailed
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Malformed input
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    /// Unsupported chain
    pub fn unsupported_network(chain_id: u64) -> Self {
        Self::new(
            ErrorCode::UnsupportedNetwork,
            format!("Unsupported chain_id: {}", chain_id),
        )
    }

    /// Registry entry with no endpoints
    pub fn no_endpoints(chain_id: u64) -> Self {
        Self::new(
            ErrorCode::NoEndpointsConfigured,
            format!("No RPC endpoints configured for chain {}", chain_id),
        )
    }

    /// All endpoints failed; message carries every per-endpoint failure
    pub fn all_endpoints_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AllEndpointsFailed, msg)
    }

    /// Fetch exceeded its budget
    pub fn fetch_timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::FetchTimeout, msg)
    }

    /// Transaction not found
    pub fn tx_not_found(hash: &str) -> Self {
        Self::new(
            ErrorCode::TransactionNotFound,
            format!("Transaction not found: {}", hash),
        )
    }

    /// Receipt not found
    pub fn receipt_not_found(hash: &str) -> Self {
        Self::new(
            ErrorCode::ReceiptNotFound,
            format!("Receipt not found for transaction: {}", hash),
        )
    }

    /// Block not found
    pub fn block_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::BlockNotFound,
            format!("Block not found: {}", reference),
        )
    }

    /// RPC error response
    pub fn rpc_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::FetchTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::RpcConnectionFailed, "Connection failed")
        } else {
            Self::new(ErrorCode::RpcError, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::RpcInvalidResponse, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::fetch_timeout("transaction fetch exceeded 15s");
        assert_eq!(err.code, ErrorCode::FetchTimeout);
        assert_eq!(err.code_str(), "FETCH_TIMEOUT");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::AllEndpointsFailed.is_retryable());
        assert!(ErrorCode::FetchTimeout.is_retryable());
        assert!(!ErrorCode::InvalidInput.is_retryable());
        assert!(!ErrorCode::TransactionNotFound.is_retryable());
    }

    #[test]
    fn test_display_format() {
        let err = AppError::unsupported_network(1);
        assert_eq!(err.to_string(), "[UNSUPPORTED_NETWORK] Unsupported chain_id: 1");
    }
}
