// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chain client: reads chain state, submits raw transactions, polls receipts.

use crate::error::SwapError;
use crate::rpc::{PendingTransaction, SwapReceipt};
use crate::tokens::NATIVE_TOKEN;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::sol;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// ERC20 reads
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

/// Interval between receipt polls.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Everything the pipeline needs from the chain RPC endpoint.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, SwapError>;

    /// Current legacy gas price in wei.
    async fn gas_price(&self) -> Result<u128, SwapError>;

    /// Next nonce for `address`, including pending transactions.
    async fn nonce(&self, address: Address) -> Result<u64, SwapError>;

    /// Balance of `token` held by `owner`; the native sentinel reads the
    /// account balance.
    async fn balance(&self, token: Address, owner: Address) -> Result<U256, SwapError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, SwapError>;

    async fn estimate_gas(&self, tx: &PendingTransaction) -> Result<u64, SwapError>;

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, SwapError>;

    /// Block until the transaction is mined, the confirmation window closes,
    /// or `cancel` fires.
    async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        cancel: &CancellationToken,
    ) -> Result<SwapReceipt, SwapError>;
}

/// Chain client over an alloy provider.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: DynProvider,
    confirmation_timeout: Duration,
}

impl RpcChainClient {
    pub fn new(provider: DynProvider, confirmation_timeout: Duration) -> Self {
        Self { provider, confirmation_timeout }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn chain_id(&self) -> Result<u64, SwapError> {
        self.provider.get_chain_id().await.map_err(SwapError::rpc)
    }

    async fn gas_price(&self) -> Result<u128, SwapError> {
        self.provider.get_gas_price().await.map_err(SwapError::rpc)
    }

    async fn nonce(&self, address: Address) -> Result<u64, SwapError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(SwapError::rpc)
    }

    async fn balance(&self, token: Address, owner: Address) -> Result<U256, SwapError> {
        if token == NATIVE_TOKEN {
            return self.provider.get_balance(owner).await.map_err(SwapError::rpc);
        }

        IERC20::new(token, &self.provider)
            .balanceOf(owner)
            .call()
            .await
            .map_err(SwapError::rpc)
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, SwapError> {
        IERC20::new(token, &self.provider)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(SwapError::rpc)
    }

    async fn estimate_gas(&self, tx: &PendingTransaction) -> Result<u64, SwapError> {
        self.provider
            .estimate_gas(tx.to_estimate_request())
            .await
            .map_err(SwapError::rpc)
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, SwapError> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(SwapError::submission)?;

        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        cancel: &CancellationToken,
    ) -> Result<SwapReceipt, SwapError> {
        let deadline = Instant::now() + self.confirmation_timeout;

        loop {
            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    return Ok(SwapReceipt {
                        tx_hash,
                        success: receipt.status(),
                        block_number: receipt.block_number,
                        gas_used: receipt.gas_used,
                    });
                }
                Ok(None) => debug!("Receipt for {:?} not available yet", tx_hash),
                // Keep polling through RPC errors until the deadline
                Err(e) => debug!("Receipt poll for {:?} failed: {}", tx_hash, e),
            }

            if Instant::now() >= deadline {
                return Err(SwapError::ConfirmationTimeout(tx_hash));
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(SwapError::Cancelled),
                _ = tokio::time::sleep(RECEIPT_POLL_INTERVAL) => {}
            }
        }
    }
}
