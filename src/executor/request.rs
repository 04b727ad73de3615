// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Swap request handed to the pipeline.

use crate::error::SwapError;

/// Maximum slippage the aggregator accepts, in basis points (20%).
pub const MAX_SLIPPAGE_BIPS: u32 = 2000;

/// One swap to perform.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    pub from_token: String,
    pub to_token: String,
    /// Lower bound of the traded amount in whole tokens (fixed mode).
    pub min_amount: f64,
    /// Upper bound of the traded amount in whole tokens (fixed mode).
    pub max_amount: f64,
    /// Decimals of `from_token`.
    pub decimals: u8,
    /// Slippage tolerance; multiplied by 100 to get basis points.
    pub slippage: u32,
    /// Trade a percentage of the balance instead of a fixed range.
    pub use_all_balance: bool,
    pub min_percent: u8,
    pub max_percent: u8,
}

impl SwapRequest {
    /// Slippage in basis points, as sent to the aggregator.
    pub fn slippage_bips(&self) -> u32 {
        self.slippage.saturating_mul(100)
    }

    /// Check the request invariants.
    pub fn validate(&self) -> Result<(), SwapError> {
        if self.from_token.eq_ignore_ascii_case(&self.to_token) {
            return Err(SwapError::invalid_request("from and to tokens are the same"));
        }
        if !self.min_amount.is_finite() || !self.max_amount.is_finite() || self.min_amount < 0.0 {
            return Err(SwapError::invalid_request("amounts must be finite and non-negative"));
        }
        if self.min_amount > self.max_amount {
            return Err(SwapError::invalid_request(format!(
                "min amount {} exceeds max amount {}",
                self.min_amount, self.max_amount
            )));
        }
        if !self.use_all_balance && self.max_amount <= 0.0 {
            return Err(SwapError::invalid_request("max amount must be positive"));
        }
        if self.min_percent > self.max_percent || self.max_percent > 100 {
            return Err(SwapError::invalid_request(format!(
                "percent range {}..={} is not within 0..=100",
                self.min_percent, self.max_percent
            )));
        }
        if self.slippage_bips() > MAX_SLIPPAGE_BIPS {
            return Err(SwapError::invalid_request(format!(
                "slippage {} exceeds {} bips",
                self.slippage_bips(),
                MAX_SLIPPAGE_BIPS
            )));
        }
        // 10^77 is the largest power of ten below U256::MAX
        if self.decimals > 77 {
            return Err(SwapError::invalid_request("decimals must be at most 77"));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn usdc_to_eth() -> SwapRequest {
    SwapRequest {
        from_token: "USDC".to_string(),
        to_token: "ETH".to_string(),
        min_amount: 1.0,
        max_amount: 2.0,
        decimals: 6,
        slippage: 1,
        use_all_balance: false,
        min_percent: 50,
        max_percent: 100,
    }
}
