// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gas price gate.

use crate::error::SwapError;
use crate::rpc::ChainClient;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Holds work back until the network gas price drops to a ceiling.
#[derive(Debug, Clone, Copy)]
pub struct GasGuard {
    /// Highest acceptable gas price in wei.
    pub ceiling: u128,
    /// Pause between gas price polls.
    pub poll_interval: Duration,
}

impl GasGuard {
    pub fn new(ceiling: u128, poll_interval: Duration) -> Self {
        Self { ceiling, poll_interval }
    }

    /// Guard with a ceiling given in gwei.
    pub fn from_gwei(max_gwei: f64, poll_interval: Duration) -> Self {
        Self::new((max_gwei * WEI_PER_GWEI as f64) as u128, poll_interval)
    }

    /// Poll until the gas price is at or below the ceiling, returning the
    /// accepted price.
    ///
    /// Waits indefinitely; the only way out other than an acceptable price is
    /// `cancel`. Failed polls are logged and retried on the next interval.
    pub async fn wait(
        &self,
        chain: &dyn ChainClient,
        cancel: &CancellationToken,
    ) -> Result<u128, SwapError> {
        loop {
            if cancel.is_cancelled() {
                return Err(SwapError::Cancelled);
            }

            match chain.gas_price().await {
                Ok(price) if price <= self.ceiling => {
                    debug!("⛽ Gas price {} within ceiling {}", price, self.ceiling);
                    return Ok(price);
                }
                Ok(price) => info!(
                    "⛽ Gas price {:.3} gwei above ceiling {:.3} gwei, waiting {:?}",
                    price as f64 / WEI_PER_GWEI as f64,
                    self.ceiling as f64 / WEI_PER_GWEI as f64,
                    self.poll_interval
                ),
                Err(e) => warn!("⚠️ Failed to read gas price: {}", e),
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(SwapError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

/// Run `op` once the gas guard lets it through.
pub async fn with_gas_guard<T, F, Fut>(
    guard: &GasGuard,
    chain: &dyn ChainClient,
    cancel: &CancellationToken,
    op: F,
) -> Result<T, SwapError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, SwapError>>,
{
    guard.wait(chain, cancel).await?;
    op().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::MockChain;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn guard(ceiling: u128) -> GasGuard {
        GasGuard::new(ceiling, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_waits_for_price_below_ceiling() {
        let chain = MockChain::default().with_gas_prices([50, 45, 20]);
        let cancel = CancellationToken::new();
        let observed = &chain;

        let result = with_gas_guard(&guard(30), &chain, &cancel, move || async move {
            // Invoked only once the last observed price is acceptable
            assert_eq!(observed.gas_polls(), 3);
            Ok(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(chain.gas_polls(), 3);
    }

    #[tokio::test]
    async fn test_price_equal_to_ceiling_passes() {
        let chain = MockChain::default().with_gas_prices([30]);
        let price = guard(30).wait(&chain, &CancellationToken::new()).await.unwrap();
        assert_eq!(price, 30);
        assert_eq!(chain.gas_polls(), 1);
    }

    #[tokio::test]
    async fn test_poll_errors_are_tolerated() {
        let chain = MockChain::default().with_gas_prices([50]).with_gas_error_first();
        let price = guard(60).wait(&chain, &CancellationToken::new()).await.unwrap();
        assert_eq!(price, 50);
        assert_eq!(chain.gas_polls(), 2);
    }

    #[tokio::test]
    async fn test_cancel_aborts_wait_without_running_op() {
        // Gas stays high forever
        let chain = Arc::new(MockChain::default().with_gas_prices([100]));
        let cancel = CancellationToken::new();
        let flag = AtomicBool::new(false);
        let ran = &flag;

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result: Result<(), _> = with_gas_guard(&guard(30), chain.as_ref(), &cancel, move || async move {
            ran.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(SwapError::Cancelled)));
        assert!(!ran.load(Ordering::SeqCst));
        assert!(chain.gas_polls() >= 1);
    }

    #[test]
    fn test_gwei_ceiling() {
        let guard = GasGuard::from_gwei(0.25, Duration::from_secs(1));
        assert_eq!(guard.ceiling, 250_000_000);
    }
}
