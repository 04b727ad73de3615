// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transaction assembly, signing, submission and confirmation.

use crate::error::SwapError;
use crate::rpc::{Account, ChainClient, PendingTransaction, SwapReceipt};
use alloy::primitives::{Address, Bytes, B256, U256};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Headroom applied to gas limit hints, in percent of the hint.
const GAS_BUFFER_PCT: u64 = 120;

/// Turns a call into a mined transaction for one account.
#[derive(Clone)]
pub struct TransactionSubmitter {
    chain: Arc<dyn ChainClient>,
    account: Arc<dyn Account>,
}

impl TransactionSubmitter {
    pub fn new(chain: Arc<dyn ChainClient>, account: Arc<dyn Account>) -> Self {
        Self { chain, account }
    }

    pub fn address(&self) -> Address {
        self.account.address()
    }

    pub fn chain(&self) -> &dyn ChainClient {
        self.chain.as_ref()
    }

    /// Build, sign and submit a call, then wait until it is mined.
    ///
    /// A mined but reverted transaction is returned as a receipt with
    /// `success == false`.
    pub async fn submit_and_confirm(
        &self,
        to: Address,
        data: Bytes,
        value: U256,
        gas_price_override: Option<u128>,
        gas_limit_hint: Option<u64>,
        cancel: &CancellationToken,
    ) -> Result<SwapReceipt, SwapError> {
        let tx_hash = self.submit(to, data, value, gas_price_override, gas_limit_hint).await?;
        self.confirm(tx_hash, cancel).await
    }

    /// Build, sign and submit a call, returning its hash.
    ///
    /// Chain id, gas price and nonce are read fresh on every call. The gas
    /// limit is `gas_limit_hint` plus a 20% buffer, or the node's estimate
    /// when there is no hint.
    pub async fn submit(
        &self,
        to: Address,
        data: Bytes,
        value: U256,
        gas_price_override: Option<u128>,
        gas_limit_hint: Option<u64>,
    ) -> Result<B256, SwapError> {
        let from = self.account.address();
        let chain_id = self.chain.chain_id().await?;
        let gas_price = match gas_price_override {
            Some(price) => price,
            None => self.chain.gas_price().await?,
        };
        let nonce = self.chain.nonce(from).await?;

        let mut tx = PendingTransaction {
            chain_id,
            gas_price,
            gas_limit: 0,
            from,
            to,
            data,
            value,
            nonce,
        };
        tx.gas_limit = match gas_limit_hint {
            Some(hint) => hint.saturating_mul(GAS_BUFFER_PCT) / 100,
            None => self.chain.estimate_gas(&tx).await?,
        };

        debug!(
            "Transaction: chain={}, from={}, to={}, nonce={}, gas_price={}, gas_limit={}, value={}",
            tx.chain_id,
            tx.from.to_checksum(None),
            tx.to.to_checksum(None),
            tx.nonce,
            tx.gas_price,
            tx.gas_limit,
            tx.value
        );

        let signed = self.account.sign(&tx).await?;
        let tx_hash = self.chain.send_raw_transaction(&signed).await?;
        info!("📤 Transaction sent: {:?}", tx_hash);
        Ok(tx_hash)
    }

    /// Wait until `tx_hash` is mined.
    pub async fn confirm(
        &self,
        tx_hash: B256,
        cancel: &CancellationToken,
    ) -> Result<SwapReceipt, SwapError> {
        let receipt = self.chain.wait_for_receipt(tx_hash, cancel).await?;
        debug!(
            "Receipt {:?}: success={}, block={:?}, gas_used={}",
            receipt.tx_hash, receipt.success, receipt.block_number, receipt.gas_used
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::{MockAccount, MockChain, CHAIN_ID, ESTIMATED_GAS, ROUTER, WALLET};

    fn submitter(chain: Arc<MockChain>, account: Arc<MockAccount>) -> TransactionSubmitter {
        TransactionSubmitter::new(chain, account)
    }

    #[tokio::test]
    async fn test_assembles_transaction_from_chain_state() {
        let chain = Arc::new(MockChain::default().with_gas_prices([25]));
        let account = Arc::new(MockAccount::default());
        let submitter = submitter(chain.clone(), account.clone());

        let receipt = submitter
            .submit_and_confirm(
                ROUTER,
                Bytes::from_static(&[1, 2, 3]),
                U256::from(5u64),
                None,
                Some(100_000),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(receipt.success);

        let signed = account.signed();
        assert_eq!(signed.len(), 1);
        let tx = &signed[0];
        assert_eq!(tx.chain_id, CHAIN_ID);
        assert_eq!(tx.gas_price, 25);
        assert_eq!(tx.gas_limit, 120_000);
        assert_eq!(tx.from, WALLET);
        assert_eq!(tx.to, ROUTER);
        assert_eq!(tx.value, U256::from(5u64));
        assert_eq!(tx.nonce, 0);
        assert_eq!(chain.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_gas_overrides_and_estimate() {
        let chain = Arc::new(MockChain::default().with_gas_prices([25]));
        let account = Arc::new(MockAccount::default());
        let submitter = submitter(chain.clone(), account.clone());

        submitter
            .submit_and_confirm(ROUTER, Bytes::new(), U256::ZERO, Some(7), None, &CancellationToken::new())
            .await
            .unwrap();

        let signed = account.signed();
        let tx = &signed[0];
        assert_eq!(tx.gas_price, 7);
        assert_eq!(tx.gas_limit, ESTIMATED_GAS);
        assert_eq!(chain.gas_polls(), 0);
    }

    #[tokio::test]
    async fn test_submission_failure_propagates() {
        let chain = Arc::new(MockChain::default().with_send_failures(1));
        let submitter = submitter(chain.clone(), Arc::new(MockAccount::default()));

        let err = submitter
            .submit_and_confirm(ROUTER, Bytes::new(), U256::ZERO, None, None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::SubmissionFailed(_)));
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_nonce_advances_between_submissions() {
        let chain = Arc::new(MockChain::default());
        let account = Arc::new(MockAccount::default());
        let submitter = submitter(chain, account.clone());
        let cancel = CancellationToken::new();

        for _ in 0..2 {
            submitter
                .submit_and_confirm(ROUTER, Bytes::new(), U256::ZERO, None, Some(1), &cancel)
                .await
                .unwrap();
        }

        let nonces: Vec<u64> = account.signed().iter().map(|tx| tx.nonce).collect();
        assert_eq!(nonces, vec![0, 1]);
    }
}
