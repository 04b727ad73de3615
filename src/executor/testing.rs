// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory collaborators for pipeline tests.

use crate::aggregator::{BuiltRoute, Quote, RouteService};
use crate::error::SwapError;
use crate::rpc::{Account, ChainClient, PendingTransaction, SwapReceipt};
use alloy::primitives::{address, keccak256, Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

pub const WALLET: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const ROUTER: Address = address!("0x6131B5fae19EA4f9D964eAc0408E4408b66337b5");
pub const CHAIN_ID: u64 = 324;
pub const ESTIMATED_GAS: u64 = 60_000;

/// Chain double with scripted gas prices, submission failures and receipts.
#[derive(Default)]
pub struct MockChain {
    gas_prices: Mutex<VecDeque<u128>>,
    gas_error_first: AtomicBool,
    gas_polls: AtomicU32,
    balances: Mutex<HashMap<Address, U256>>,
    allowance: Mutex<U256>,
    nonce: AtomicU64,
    send_failures: AtomicU32,
    sends: AtomicU32,
    reverts: Mutex<VecDeque<bool>>,
    sent: Mutex<Vec<Bytes>>,
}

impl MockChain {
    /// Gas prices returned in order; the last one repeats.
    pub fn with_gas_prices(self, prices: impl IntoIterator<Item = u128>) -> Self {
        *self.gas_prices.lock().unwrap() = prices.into_iter().collect();
        self
    }

    pub fn with_gas_error_first(self) -> Self {
        self.gas_error_first.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_balance(self, token: Address, balance: U256) -> Self {
        self.balances.lock().unwrap().insert(token, balance);
        self
    }

    pub fn with_allowance(self, allowance: U256) -> Self {
        *self.allowance.lock().unwrap() = allowance;
        self
    }

    /// Fail the next `n` raw submissions.
    pub fn with_send_failures(self, n: u32) -> Self {
        self.send_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Script receipt outcomes in submission order; `true` means reverted.
    pub fn with_reverts(self, reverts: impl IntoIterator<Item = bool>) -> Self {
        *self.reverts.lock().unwrap() = reverts.into_iter().collect();
        self
    }

    pub fn gas_polls(&self) -> u32 {
        self.gas_polls.load(Ordering::SeqCst)
    }

    pub fn send_attempts(&self) -> u32 {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> Result<u64, SwapError> {
        Ok(CHAIN_ID)
    }

    async fn gas_price(&self) -> Result<u128, SwapError> {
        self.gas_polls.fetch_add(1, Ordering::SeqCst);
        if self.gas_error_first.swap(false, Ordering::SeqCst) {
            return Err(SwapError::rpc("connection reset"));
        }

        let mut prices = self.gas_prices.lock().unwrap();
        let price = if prices.len() > 1 { prices.pop_front() } else { prices.front().copied() };
        Ok(price.unwrap_or(1))
    }

    async fn nonce(&self, _address: Address) -> Result<u64, SwapError> {
        Ok(self.nonce.load(Ordering::SeqCst))
    }

    async fn balance(&self, token: Address, _owner: Address) -> Result<U256, SwapError> {
        Ok(self.balances.lock().unwrap().get(&token).copied().unwrap_or_default())
    }

    async fn allowance(
        &self,
        _token: Address,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, SwapError> {
        Ok(*self.allowance.lock().unwrap())
    }

    async fn estimate_gas(&self, _tx: &PendingTransaction) -> Result<u64, SwapError> {
        Ok(ESTIMATED_GAS)
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, SwapError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        let remaining = self.send_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.send_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(SwapError::submission("replacement transaction underpriced"));
        }

        self.nonce.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(raw.clone());
        Ok(keccak256(raw))
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        _cancel: &CancellationToken,
    ) -> Result<SwapReceipt, SwapError> {
        let reverted = self.reverts.lock().unwrap().pop_front().unwrap_or(false);
        Ok(SwapReceipt { tx_hash, success: !reverted, block_number: Some(1), gas_used: 21_000 })
    }
}

/// Account double that "signs" by JSON-encoding the transaction.
#[derive(Default)]
pub struct MockAccount {
    signed: Mutex<Vec<PendingTransaction>>,
}

impl MockAccount {
    pub fn signed(&self) -> Vec<PendingTransaction> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Account for MockAccount {
    fn address(&self) -> Address {
        WALLET
    }

    async fn sign(&self, tx: &PendingTransaction) -> Result<Bytes, SwapError> {
        let mut signed = self.signed.lock().unwrap();
        signed.push(tx.clone());
        Ok(Bytes::from(format!("{}:{}:{}", tx.nonce, tx.to, signed.len()).into_bytes()))
    }
}

/// Route service double recording what it was asked.
#[derive(Default)]
pub struct MockRoutes {
    route_failures: AtomicU32,
    pub routes_requested: Mutex<Vec<(U256, Address, Address)>>,
    pub quotes_built: Mutex<Vec<(Quote, u32)>>,
    issued: Mutex<Vec<Quote>>,
}

impl MockRoutes {
    /// Fail the next `n` route requests.
    pub fn with_route_failures(self, n: u32) -> Self {
        self.route_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn issued(&self) -> Vec<Quote> {
        self.issued.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteService for MockRoutes {
    async fn get_route(
        &self,
        amount_in: U256,
        token_in: Address,
        token_out: Address,
        _recipient: Address,
    ) -> Result<Quote, SwapError> {
        let remaining = self.route_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.route_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(SwapError::route_unavailable("no route"));
        }

        self.routes_requested.lock().unwrap().push((amount_in, token_in, token_out));
        let mut issued = self.issued.lock().unwrap();
        let quote = Quote {
            route_summary: json!({"amountIn": amount_in.to_string(), "seq": issued.len()}),
            client_id: format!("client-{}", issued.len()),
        };
        issued.push(quote.clone());
        Ok(quote)
    }

    async fn build_transaction(
        &self,
        quote: Quote,
        slippage_bips: u32,
        _sender: Address,
        _recipient: Address,
        _deadline: u64,
    ) -> Result<BuiltRoute, SwapError> {
        self.quotes_built.lock().unwrap().push((quote, slippage_bips));
        Ok(BuiltRoute {
            call_data: Bytes::from_static(&[0xe2, 0x1f, 0xd0, 0xe9]),
            router_address: ROUTER,
            estimated_gas: 200_000,
        })
    }
}
