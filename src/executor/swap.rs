// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Swap execution through the aggregator.
//!
//! One attempt walks `SelectAmount → Quote → Build → (Approve) → Submit →
//! Confirm → Done`; any stage may fail the attempt. [`SwapExecutor::run`]
//! wraps attempts as `with_retry(with_gas_guard(with_notify(attempt)))`.

use crate::aggregator::{build_deadline, RouteService};
use crate::error::SwapError;
use crate::executor::{
    ensure_approved, select_amount, with_gas_guard, with_notify, with_retry, ApprovalOutcome,
    GasGuard, ResolvedAmount, RetryPolicy, SwapRequest, TransactionSubmitter,
};
use crate::rpc::SwapReceipt;
use crate::telegram::Notifier;
use crate::tokens::TokenTable;
use alloy::primitives::{Address, U256};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Where an attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStage {
    SelectAmount,
    Quote,
    Build,
    Approve,
    Submit,
    Confirm,
    Done,
}

impl fmt::Display for SwapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwapStage::SelectAmount => "SELECT_AMOUNT",
            SwapStage::Quote => "QUOTE",
            SwapStage::Build => "BUILD",
            SwapStage::Approve => "APPROVE",
            SwapStage::Submit => "SUBMIT",
            SwapStage::Confirm => "CONFIRM",
            SwapStage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Result of a confirmed swap.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub amount: ResolvedAmount,
    pub router: Address,
    pub approval: ApprovalOutcome,
    pub receipt: SwapReceipt,
}

/// Executes guarded aggregator swaps for one account.
pub struct SwapExecutor {
    submitter: TransactionSubmitter,
    routes: Arc<dyn RouteService>,
    tokens: Arc<TokenTable>,
    gas_guard: GasGuard,
    retry: RetryPolicy,
    notifier: Arc<dyn Notifier>,
}

impl SwapExecutor {
    pub fn new(
        submitter: TransactionSubmitter,
        routes: Arc<dyn RouteService>,
        tokens: Arc<TokenTable>,
        gas_guard: GasGuard,
        retry: RetryPolicy,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { submitter, routes, tokens, gas_guard, retry, notifier }
    }

    pub fn address(&self) -> Address {
        self.submitter.address()
    }

    /// Run the swap with gas gating, notifications and retries.
    pub async fn run(
        &self,
        request: &SwapRequest,
        cancel: &CancellationToken,
    ) -> Result<SwapOutcome, SwapError> {
        request.validate()?;

        let label = format!(
            "{} {} → {}",
            self.submitter.address().to_checksum(None),
            request.from_token,
            request.to_token
        );
        let label = label.as_str();
        let notifier = self.notifier.as_ref();

        with_retry(self.retry, notifier, label, cancel, move |attempt| async move {
            debug!("[{}] attempt {}", label, attempt);
            with_gas_guard(&self.gas_guard, self.submitter.chain(), cancel, move || {
                with_notify(notifier, label, self.execute_once(request, cancel))
            })
            .await
        })
        .await
    }

    /// One attempt of the pipeline, without gating or retries.
    pub async fn execute_once(
        &self,
        request: &SwapRequest,
        cancel: &CancellationToken,
    ) -> Result<SwapOutcome, SwapError> {
        let mut stage = SwapStage::SelectAmount;
        let result = self.drive(request, &mut stage, cancel).await;
        if let Err(e) = &result {
            error!("❌ Swap attempt failed at {}: {}", stage, e);
        }
        result
    }

    async fn drive(
        &self,
        request: &SwapRequest,
        stage: &mut SwapStage,
        cancel: &CancellationToken,
    ) -> Result<SwapOutcome, SwapError> {
        let token_in = self.tokens.address(&request.from_token)?;
        let token_out = self.tokens.address(&request.to_token)?;
        let native_in = self.tokens.is_native(&request.from_token)?;
        let wallet = self.submitter.address();

        let balance = self.submitter.chain().balance(token_in, wallet).await?;
        let amount = {
            let mut rng = rand::thread_rng();
            select_amount(request, balance, &mut rng)?
        };
        info!(
            "🚀 Swapping {} {} → {} (balance {})",
            amount.human_amount, request.from_token, request.to_token, balance
        );

        advance(stage, SwapStage::Quote);
        let quote = self
            .routes
            .get_route(amount.wei_amount, token_in, token_out, wallet)
            .await?;

        advance(stage, SwapStage::Build);
        let built = self
            .routes
            .build_transaction(quote, request.slippage_bips(), wallet, wallet, build_deadline())
            .await?;
        debug!("Router {:?}, estimated gas {}", built.router_address, built.estimated_gas);

        let (approval, value) = if native_in {
            (ApprovalOutcome::Native, amount.wei_amount)
        } else {
            advance(stage, SwapStage::Approve);
            let approval =
                ensure_approved(&self.submitter, token_in, built.router_address, amount.wei_amount, cancel)
                    .await?;
            (approval, U256::ZERO)
        };

        advance(stage, SwapStage::Submit);
        let tx_hash = self
            .submitter
            .submit(built.router_address, built.call_data, value, None, Some(built.estimated_gas))
            .await?;

        advance(stage, SwapStage::Confirm);
        let receipt = self.submitter.confirm(tx_hash, cancel).await?;
        if !receipt.success {
            return Err(SwapError::submission(format!("swap {:?} reverted", receipt.tx_hash)));
        }

        advance(stage, SwapStage::Done);
        info!(
            "✅ SWAP SUCCESS: {} {} → {} - tx: {:?}",
            amount.human_amount, request.from_token, request.to_token, receipt.tx_hash
        );

        Ok(SwapOutcome { amount, router: built.router_address, approval, receipt })
    }
}

fn advance(stage: &mut SwapStage, next: SwapStage) {
    debug!("{} → {}", stage, next);
    *stage = next;
}
