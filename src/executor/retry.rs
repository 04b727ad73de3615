// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Whole-pipeline retry and notification wrappers.

use crate::error::SwapError;
use crate::telegram::Notifier;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How often and how patiently to re-run a failing operation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

/// Run `op` up to `policy.max_attempts` times.
///
/// `op` receives the 1-based attempt number and must redo all of its work on
/// every call. Each failed attempt is logged and notified exactly once.
/// Errors that cannot succeed on a later attempt are returned as-is.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    notifier: &dyn Notifier,
    label: &str,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, SwapError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, SwapError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        warn!("⚠️ [{}] attempt {}/{} failed: {}", label, attempt, max_attempts, err);
        notifier.notify(format!("⚠️ {label}\nAttempt {attempt}/{max_attempts} failed: {err}"));

        if !err.is_retryable() {
            error!("❌ [{}] not retrying: {}", label, err);
            return Err(err);
        }
        if attempt >= max_attempts {
            error!("❌ [{}] giving up after {} attempts", label, attempt);
            return Err(SwapError::RetriesExhausted { attempts: attempt, last: Box::new(err) });
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(SwapError::Cancelled),
            _ = tokio::time::sleep(policy.delay) => {}
        }
        attempt += 1;
    }
}

/// Notify on success of `op`; failures are left to the retry layer.
pub async fn with_notify<T, Fut>(
    notifier: &dyn Notifier,
    label: &str,
    op: Fut,
) -> Result<T, SwapError>
where
    Fut: Future<Output = Result<T, SwapError>>,
{
    let result = op.await;
    if result.is_ok() {
        info!("✅ [{}] done", label);
        notifier.notify(format!("✅ {label}\nSwap confirmed"));
    }
    result
}
