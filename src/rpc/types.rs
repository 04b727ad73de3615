// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transaction lifecycle values passed between the submitter and the chain.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::TransactionRequest;

/// A fully populated legacy transaction, ready for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub chain_id: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub nonce: u64,
}

impl PendingTransaction {
    /// Convert into an alloy request.
    pub fn to_request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .with_chain_id(self.chain_id)
            .with_gas_price(self.gas_price)
            .with_gas_limit(self.gas_limit)
            .with_from(self.from)
            .with_to(self.to)
            .with_input(self.data.clone())
            .with_value(self.value)
            .with_nonce(self.nonce)
    }

    /// Request for `eth_estimateGas`, with no gas limit set.
    pub fn to_estimate_request(&self) -> TransactionRequest {
        let mut request = self.to_request();
        request.gas = None;
        request
    }
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    pub tx_hash: B256,
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}
