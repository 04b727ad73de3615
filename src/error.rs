// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error types for the swap pipeline.

use alloy::primitives::{B256, U256};

/// An error produced by one attempt of the swap pipeline, or by the retry
/// wrapper once every attempt has failed
#[derive(Debug, Clone, thiserror::Error)]
pub enum SwapError {
    /// The account does not hold enough of the input token
    #[error("insufficient balance: have {balance}, need at least {required}")]
    InsufficientBalance {
        /// The balance observed on chain
        balance: U256,
        /// The smallest amount the request allows
        required: U256,
    },
    /// The aggregator returned no usable route
    #[error("route unavailable: {0}")]
    RouteUnavailable(String),
    /// The aggregator refused to build the route
    #[error("route build failed: {0}")]
    BuildFailed(String),
    /// The approval transaction failed on chain
    #[error("approval failed: {0}")]
    ApprovalFailed(String),
    /// A transaction could not be signed, submitted or was reverted
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
    /// The transaction was not mined within the confirmation window
    #[error("transaction {0:#x} not confirmed in time")]
    ConfirmationTimeout(B256),
    /// A chain read (balance, nonce, gas price...) failed
    #[error("rpc error: {0}")]
    Rpc(String),
    /// The swap request violates one of its invariants
    #[error("invalid swap request: {0}")]
    InvalidRequest(String),
    /// The token symbol is not in the token table
    #[error("unknown token symbol: {0}")]
    UnknownToken(String),
    /// The run was cancelled while waiting
    #[error("cancelled")]
    Cancelled,
    /// Every attempt failed
    #[error("retries exhausted after {attempts} attempts, last error: {last}")]
    RetriesExhausted {
        /// How many attempts were made
        attempts: u32,
        /// The error of the final attempt
        last: Box<SwapError>,
    },
}

impl SwapError {
    /// Create a new route unavailable error
    #[allow(clippy::needless_pass_by_value)]
    pub fn route_unavailable<T: ToString>(e: T) -> Self {
        SwapError::RouteUnavailable(e.to_string())
    }

    /// Create a new build failed error
    #[allow(clippy::needless_pass_by_value)]
    pub fn build_failed<T: ToString>(e: T) -> Self {
        SwapError::BuildFailed(e.to_string())
    }

    /// Create a new approval failed error
    #[allow(clippy::needless_pass_by_value)]
    pub fn approval_failed<T: ToString>(e: T) -> Self {
        SwapError::ApprovalFailed(e.to_string())
    }

    /// Create a new submission failed error
    #[allow(clippy::needless_pass_by_value)]
    pub fn submission<T: ToString>(e: T) -> Self {
        SwapError::SubmissionFailed(e.to_string())
    }

    /// Create a new rpc error
    #[allow(clippy::needless_pass_by_value)]
    pub fn rpc<T: ToString>(e: T) -> Self {
        SwapError::Rpc(e.to_string())
    }

    /// Create a new invalid request error
    #[allow(clippy::needless_pass_by_value)]
    pub fn invalid_request<T: ToString>(e: T) -> Self {
        SwapError::InvalidRequest(e.to_string())
    }

    /// Whether running the whole pipeline again could succeed.
    ///
    /// Malformed requests, unknown symbols and cancellation fail the same
    /// way on every attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            SwapError::InvalidRequest(_)
                | SwapError::UnknownToken(_)
                | SwapError::Cancelled
                | SwapError::RetriesExhausted { .. }
        )
    }
}
