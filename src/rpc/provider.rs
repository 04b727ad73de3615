// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Provider setup for the chain RPC endpoint.

use alloy::{
    providers::{DynProvider, Provider, ProviderBuilder},
    transports::http::reqwest::Url,
};

/// Configuration for RPC connection.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub rpc_url: String,
}

/// Create a read-only provider from config.
///
/// Signing happens in [`super::LocalAccount`], so the provider carries no
/// wallet and only ever sees raw, already signed transactions.
pub fn create_provider(config: &RpcConfig) -> Result<DynProvider, String> {
    let url: Url = config
        .rpc_url
        .parse()
        .map_err(|e| format!("Invalid RPC URL: {e}"))?;

    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_http(url);

    Ok(provider.erased())
}
