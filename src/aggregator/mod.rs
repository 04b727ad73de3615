// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Route negotiation with the KyberSwap aggregator.
//!
//! A swap takes two calls: `routes` returns an opaque route summary for an
//! input amount, and `route/build` turns that summary into router calldata
//! under a slippage tolerance. Both calls carry the same `x-client-id` so the
//! service can correlate them.

pub mod api_types;

use crate::error::SwapError;
use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

use self::api_types::{ApiResponse, BuildData, BuildRequest, RoutesData, RoutesQuery};

/// The default aggregator base URL
pub const DEFAULT_BASE_URL: &str = "https://aggregator-api.kyberswap.com";

/// The correlation header sent on both calls
const CLIENT_ID_HEADER: &str = "x-client-id";

/// Horizon added to the current time to form the build deadline
pub const DEADLINE_HORIZON_SECS: u64 = 1_000_000;

/// A route returned by the aggregator, valid for one build call.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Opaque route summary, forwarded unmodified
    pub route_summary: Value,
    /// Correlation id shared by the route and build calls
    pub client_id: String,
}

/// A route turned into a router call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRoute {
    pub call_data: Bytes,
    pub router_address: Address,
    pub estimated_gas: u64,
}

/// The aggregator's two-call protocol.
#[async_trait]
pub trait RouteService: Send + Sync {
    /// Request the best route for swapping `amount_in` of `token_in`.
    async fn get_route(
        &self,
        amount_in: U256,
        token_in: Address,
        token_out: Address,
        recipient: Address,
    ) -> Result<Quote, SwapError>;

    /// Build router calldata for a quote; `slippage_bips` is in basis points.
    async fn build_transaction(
        &self,
        quote: Quote,
        slippage_bips: u32,
        sender: Address,
        recipient: Address,
        deadline: u64,
    ) -> Result<BuiltRoute, SwapError>;
}

/// Build deadline for a request made now.
pub fn build_deadline() -> u64 {
    chrono::Utc::now().timestamp() as u64 + DEADLINE_HORIZON_SECS
}

/// HTTP client for the KyberSwap aggregator API
#[derive(Clone)]
pub struct KyberClient {
    /// The underlying HTTP client
    http_client: Client,
    /// The base URL, without a trailing slash
    base_url: String,
    /// The chain slug used in paths and queries, e.g. `zksync`
    chain: String,
}

impl KyberClient {
    /// Create a new client, optionally routed through an HTTP proxy
    pub fn new(
        base_url: &str,
        chain: &str,
        proxy: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, String> {
        let mut builder = Client::builder().timeout(timeout);
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| format!("Invalid proxy: {e}"))?;
            builder = builder.proxy(proxy);
        }
        let http_client = builder.build().map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain: chain.to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}/api/v1/{}", self.base_url, self.chain, endpoint)
    }
}

/// Decode an aggregator response, mapping HTTP and envelope failures to a
/// message.
async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    let status = response.status();
    let body = response.text().await.map_err(|e| e.to_string())?;
    if !status.is_success() {
        return Err(format!("HTTP {status}: {body}"));
    }

    let envelope: ApiResponse<T> =
        serde_json::from_str(&body).map_err(|e| format!("malformed response: {e}"))?;
    envelope.into_data()
}

#[async_trait]
impl RouteService for KyberClient {
    #[instrument(skip(self), fields(chain = %self.chain))]
    async fn get_route(
        &self,
        amount_in: U256,
        token_in: Address,
        token_out: Address,
        recipient: Address,
    ) -> Result<Quote, SwapError> {
        let client_id = Uuid::new_v4().simple().to_string();
        let query = RoutesQuery {
            chain: self.chain.clone(),
            amount_in: amount_in.to_string(),
            to: recipient.to_checksum(None),
            token_in: token_in.to_checksum(None),
            token_out: token_out.to_checksum(None),
            save_gas: 1,
        };

        let response = self
            .http_client
            .get(self.url("routes"))
            .query(&query)
            .header(CLIENT_ID_HEADER, &client_id)
            .send()
            .await
            .map_err(SwapError::route_unavailable)?;

        let data: RoutesData =
            decode_response(response).await.map_err(SwapError::route_unavailable)?;
        let route_summary = data
            .route_summary
            .filter(|summary| !summary.is_null())
            .ok_or_else(|| SwapError::route_unavailable("response has no routeSummary"))?;

        debug!("Got route summary for client {}", client_id);
        Ok(Quote { route_summary, client_id })
    }

    #[instrument(skip(self, quote), fields(chain = %self.chain, client_id = %quote.client_id))]
    async fn build_transaction(
        &self,
        quote: Quote,
        slippage_bips: u32,
        sender: Address,
        recipient: Address,
        deadline: u64,
    ) -> Result<BuiltRoute, SwapError> {
        let body = BuildRequest {
            route_summary: quote.route_summary,
            deadline,
            slippage_tolerance: slippage_bips,
            sender: sender.to_checksum(None),
            recipient: recipient.to_checksum(None),
        };

        let response = self
            .http_client
            .post(self.url("route/build"))
            .header(CLIENT_ID_HEADER, &quote.client_id)
            .json(&body)
            .send()
            .await
            .map_err(SwapError::build_failed)?;

        let data: BuildData = decode_response(response).await.map_err(SwapError::build_failed)?;

        let call_data: Bytes = data
            .data
            .ok_or_else(|| SwapError::build_failed("response has no data.data"))?
            .parse()
            .map_err(|e| SwapError::build_failed(format!("invalid calldata: {e}")))?;
        let router_address: Address = data
            .router_address
            .ok_or_else(|| SwapError::build_failed("response has no routerAddress"))?
            .parse()
            .map_err(|e| SwapError::build_failed(format!("invalid router address: {e}")))?;
        let estimated_gas = data
            .gas
            .ok_or_else(|| SwapError::build_failed("response has no gas"))?
            .to_u64()
            .map_err(SwapError::build_failed)?;

        debug!("Estimated gas by aggregator: {}", estimated_gas);
        Ok(BuiltRoute { call_data, router_address, estimated_gas })
    }
}
