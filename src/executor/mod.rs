// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Swap pipeline: amount selection, approval, submission, gas gating and retries.

pub mod amount;
pub mod approval;
pub mod gas;
pub mod request;
pub mod retry;
pub mod submitter;
pub mod swap;

#[cfg(test)]
pub mod testing;

pub use amount::{select_amount, ResolvedAmount};
pub use approval::{ensure_approved, ApprovalOutcome};
pub use gas::{with_gas_guard, GasGuard};
pub use request::SwapRequest;
pub use retry::{with_notify, with_retry, RetryPolicy};
pub use submitter::TransactionSubmitter;
pub use swap::SwapExecutor;
