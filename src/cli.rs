// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command line arguments.

use crate::executor::SwapRequest;
use clap::Parser;

/// Guarded KyberSwap swaps on zkSync
#[derive(Debug, Parser)]
#[command(name = "kyber-swapper", version, about)]
pub struct SwapArgs {
    /// Symbol of the token to sell
    #[arg(long = "from")]
    pub from_token: String,

    /// Symbol of the token to buy
    #[arg(long = "to")]
    pub to_token: String,

    /// Lower bound of the amount to sell, in whole tokens
    #[arg(long, default_value_t = 0.0)]
    pub min_amount: f64,

    /// Upper bound of the amount to sell, in whole tokens
    #[arg(long, default_value_t = 0.0)]
    pub max_amount: f64,

    /// Decimals of the token being sold
    #[arg(long, default_value_t = 18)]
    pub decimals: u8,

    /// Slippage tolerance; multiplied by 100 to get basis points
    #[arg(long, default_value_t = 1)]
    pub slippage: u32,

    /// Sell a random percentage of the whole balance
    #[arg(long)]
    pub all_balance: bool,

    #[arg(long, default_value_t = 100)]
    pub min_percent: u8,

    #[arg(long, default_value_t = 100)]
    pub max_percent: u8,
}

impl SwapArgs {
    pub fn to_request(&self) -> SwapRequest {
        SwapRequest {
            from_token: self.from_token.clone(),
            to_token: self.to_token.clone(),
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            decimals: self.decimals,
            slippage: self.slippage,
            use_all_balance: self.all_balance,
            min_percent: self.min_percent,
            max_percent: self.max_percent,
        }
    }
}
