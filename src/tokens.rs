// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Token address table used to resolve swap symbols.

use crate::error::SwapError;
use alloy::primitives::{address, Address};
use std::collections::HashMap;
use std::fs;
use tracing::info;

/// Address the aggregator uses for the chain's native asset.
pub const NATIVE_TOKEN: Address = address!("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Symbol to address mapping for the tokens the bot may trade.
#[derive(Debug, Clone)]
pub struct TokenTable {
    tokens: HashMap<String, Address>,
}

impl TokenTable {
    /// Build a table from explicit entries.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Address)>,
        S: Into<String>,
    {
        let tokens = entries
            .into_iter()
            .map(|(symbol, addr)| (symbol.into().to_uppercase(), addr))
            .collect();
        Self { tokens }
    }

    /// Default zkSync Era table.
    pub fn zksync() -> Self {
        Self::new([
            ("ETH", NATIVE_TOKEN),
            ("WETH", address!("0x5AEa5775959fBC2557Cc8789bC1bf90A239D9a91")),
            ("USDC", address!("0x3355df6D4c9C3035724Fd0e3914dE96A5a83aaf4")),
            ("USDT", address!("0x493257fD37EDB34451f62EDf8D2a0C418852bA4C")),
        ])
    }

    /// Merge a JSON file of `{"SYMBOL": "0x..."}` entries over this table.
    pub fn merge_file(mut self, path: &str) -> Result<Self, String> {
        let contents =
            fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        let entries: HashMap<String, Address> = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse {}: {}", path, e))?;

        info!("📒 Loaded {} token overrides from {}", entries.len(), path);
        for (symbol, addr) in entries {
            self.tokens.insert(symbol.to_uppercase(), addr);
        }
        Ok(self)
    }

    /// Resolve a symbol to its address.
    pub fn address(&self, symbol: &str) -> Result<Address, SwapError> {
        self.tokens
            .get(&symbol.to_uppercase())
            .copied()
            .ok_or_else(|| SwapError::UnknownToken(symbol.to_string()))
    }

    /// Whether the symbol resolves to the native asset sentinel.
    pub fn is_native(&self, symbol: &str) -> Result<bool, SwapError> {
        self.address(symbol).map(|addr| addr == NATIVE_TOKEN)
    }
}
