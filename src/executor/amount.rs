// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Randomized trade amount selection.

use crate::error::SwapError;
use crate::executor::SwapRequest;
use alloy::primitives::U256;
use rand::Rng;

/// The amount one attempt trades.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAmount {
    /// Amount in base units.
    pub wei_amount: U256,
    /// Amount in whole tokens, for logs and notifications.
    pub human_amount: f64,
    /// Balance the amount was derived from.
    pub source_balance: U256,
}

/// Pick the amount to trade from `balance` according to the request policy.
///
/// All-balance mode trades a whole percentage drawn from
/// `[min_percent, max_percent]`. Fixed mode draws from
/// `[min_amount, max_amount]`, capped at the balance, rounded to the token's
/// decimals.
pub fn select_amount<R: Rng + ?Sized>(
    request: &SwapRequest,
    balance: U256,
    rng: &mut R,
) -> Result<ResolvedAmount, SwapError> {
    if request.use_all_balance {
        let percent = rng.gen_range(request.min_percent..=request.max_percent);
        let wei_amount = balance * U256::from(percent) / U256::from(100u64);
        if wei_amount.is_zero() {
            return Err(SwapError::InsufficientBalance {
                balance,
                required: U256::from(1u64),
            });
        }

        return Ok(ResolvedAmount {
            wei_amount,
            human_amount: to_human(wei_amount, request.decimals),
            source_balance: balance,
        });
    }

    let min_wei = to_wei(request.min_amount, request.decimals);
    if balance < min_wei {
        return Err(SwapError::InsufficientBalance { balance, required: min_wei });
    }

    let balance_human = to_human(balance, request.decimals);
    let upper = request.max_amount.min(balance_human).max(request.min_amount);
    let drawn = if upper > request.min_amount {
        rng.gen_range(request.min_amount..=upper)
    } else {
        request.min_amount
    };

    // Rounding may push the draw past either bound by half a unit
    let human_amount = round_to(drawn, request.decimals).clamp(request.min_amount, upper);
    let wei_amount = to_wei(human_amount, request.decimals).min(balance).max(min_wei);
    if wei_amount.is_zero() {
        return Err(SwapError::InsufficientBalance {
            balance,
            required: min_wei.max(U256::from(1u64)),
        });
    }
    Ok(ResolvedAmount { wei_amount, human_amount, source_balance: balance })
}

fn round_to(value: f64, decimals: u8) -> f64 {
    // f64 carries ~15 significant digits; more places are noise
    let places = i32::from(decimals.min(15));
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Convert a whole-token amount to base units.
pub fn to_wei(amount: f64, decimals: u8) -> U256 {
    // Exactly `decimals` fraction digits, dot removed
    let formatted = format!("{:.*}", usize::from(decimals), amount.max(0.0));
    let digits: String = formatted.chars().filter(|c| *c != '.').collect();
    digits.parse().unwrap_or(U256::ZERO)
}

/// Convert base units to whole tokens.
pub fn to_human(amount: U256, decimals: u8) -> f64 {
    let formatted = alloy::primitives::utils::format_units(amount, decimals).unwrap_or_default();
    formatted.parse().unwrap_or(0.0)
}
