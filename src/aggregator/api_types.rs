// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! KyberSwap aggregator API types.
//!
//! See <https://docs.kyberswap.com/kyberswap-solutions/kyberswap-aggregator/aggregator-api-specification/evm-swaps>

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `code` the aggregator uses for a successful call.
pub const SUCCESS_CODE: i64 = 0;

/// Query parameters of `GET /{chain}/api/v1/routes`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesQuery {
    pub chain: String,
    pub amount_in: String,
    pub to: String,
    pub token_in: String,
    pub token_out: String,
    pub save_gas: u8,
}

/// Envelope shared by both endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, or describe why there is none.
    pub fn into_data(self) -> Result<T, String> {
        if self.code != SUCCESS_CODE {
            return Err(format!(
                "code {}: {}",
                self.code,
                self.message.unwrap_or_default()
            ));
        }
        self.data.ok_or_else(|| "response has no data".to_string())
    }
}

/// Payload of the routes endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesData {
    /// Opaque route summary, echoed back verbatim to the build endpoint.
    #[serde(default)]
    pub route_summary: Option<Value>,
}

/// Body of `POST /{chain}/api/v1/route/build`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub route_summary: Value,
    pub deadline: u64,
    /// In basis points, range [0, 2000].
    pub slippage_tolerance: u32,
    pub sender: String,
    pub recipient: String,
}

/// Payload of the build endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildData {
    /// Hex encoded calldata for the router.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub router_address: Option<String>,
    #[serde(default)]
    pub gas: Option<GasAmount>,
}

/// The aggregator reports gas as either a decimal string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GasAmount {
    Number(u64),
    Text(String),
}

impl GasAmount {
    pub fn to_u64(&self) -> Result<u64, String> {
        match self {
            GasAmount::Number(n) => Ok(*n),
            GasAmount::Text(s) => s.parse().map_err(|e| format!("invalid gas {s:?}: {e}")),
        }
    }
}
