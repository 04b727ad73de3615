// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! ERC20 allowance management for the aggregator router.

use crate::error::SwapError;
use crate::executor::TransactionSubmitter;
use crate::tokens::NATIVE_TOKEN;
use alloy::primitives::{Address, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use tokio_util::sync::CancellationToken;
use tracing::info;

// ERC20 for approval
sol! {
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// What `ensure_approved` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Native asset, nothing to approve
    Native,
    /// The existing allowance already covers the amount
    AlreadyApproved,
    /// An approval transaction was mined
    Approved,
}

/// Make sure `spender` may move at least `amount` of `token` for the
/// submitter's account.
///
/// The allowance is read first, so re-running after a previous attempt's
/// approval landed does not approve twice.
pub async fn ensure_approved(
    submitter: &TransactionSubmitter,
    token: Address,
    spender: Address,
    amount: U256,
    cancel: &CancellationToken,
) -> Result<ApprovalOutcome, SwapError> {
    if token == NATIVE_TOKEN {
        return Ok(ApprovalOutcome::Native);
    }

    let owner = submitter.address();
    let allowance = submitter.chain().allowance(token, owner, spender).await?;
    if allowance >= amount {
        info!("Already approved {} of {:?} for {:?}", allowance, token, spender);
        return Ok(ApprovalOutcome::AlreadyApproved);
    }

    info!("🔓 Approving {} of {:?} for {:?}", amount, token, spender);
    let call = IERC20::approveCall { spender, amount }.abi_encode();
    let receipt = submitter
        .submit_and_confirm(token, call.into(), U256::ZERO, None, None, cancel)
        .await?;

    if !receipt.success {
        return Err(SwapError::approval_failed(format!(
            "approval {:?} reverted",
            receipt.tx_hash
        )));
    }

    info!("✅ Approval confirmed: {:?}", receipt.tx_hash);
    Ok(ApprovalOutcome::Approved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::{MockAccount, MockChain, ROUTER};
    use alloy::primitives::address;
    use std::sync::Arc;

    const USDC: Address = address!("0x3355df6D4c9C3035724Fd0e3914dE96A5a83aaf4");

    fn setup(chain: MockChain) -> (Arc<MockChain>, Arc<MockAccount>, TransactionSubmitter) {
        let chain = Arc::new(chain);
        let account = Arc::new(MockAccount::default());
        let submitter = TransactionSubmitter::new(chain.clone(), account.clone());
        (chain, account, submitter)
    }

    #[tokio::test]
    async fn test_native_token_is_noop() {
        let (chain, account, submitter) = setup(MockChain::default());
        let outcome =
            ensure_approved(&submitter, NATIVE_TOKEN, ROUTER, U256::from(10u64), &CancellationToken::new())
                .await
                .unwrap();

        assert_eq!(outcome, ApprovalOutcome::Native);
        assert!(account.signed().is_empty());
        assert_eq!(chain.send_attempts(), 0);
    }

    #[tokio::test]
    async fn test_approves_token_for_spender() {
        let (_, account, submitter) = setup(MockChain::default());
        let amount = U256::from(1_500_000u64);
        let outcome = ensure_approved(&submitter, USDC, ROUTER, amount, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, ApprovalOutcome::Approved);
        let signed = account.signed();
        assert_eq!(signed.len(), 1);
        assert_eq!(signed[0].to, USDC);
        assert_eq!(signed[0].value, U256::ZERO);

        let decoded = IERC20::approveCall::abi_decode(&signed[0].data).unwrap();
        assert_eq!(decoded.spender, ROUTER);
        assert_eq!(decoded.amount, amount);
    }

    #[tokio::test]
    async fn test_sufficient_allowance_skips_transaction() {
        let (_, account, submitter) =
            setup(MockChain::default().with_allowance(U256::from(2_000_000u64)));
        let outcome =
            ensure_approved(&submitter, USDC, ROUTER, U256::from(1_500_000u64), &CancellationToken::new())
                .await
                .unwrap();

        assert_eq!(outcome, ApprovalOutcome::AlreadyApproved);
        assert!(account.signed().is_empty());
    }

    #[tokio::test]
    async fn test_reverted_approval_fails() {
        let (_, _, submitter) = setup(MockChain::default().with_reverts([true]));
        let err = ensure_approved(&submitter, USDC, ROUTER, U256::from(1u64), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SwapError::ApprovalFailed(_)));
    }
}
