// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Signing account.

use crate::error::SwapError;
use crate::rpc::PendingTransaction;
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

/// An account that owns an address and can sign transactions for it.
#[async_trait]
pub trait Account: Send + Sync {
    /// The account address.
    fn address(&self) -> Address;

    /// Sign a transaction, returning its EIP-2718 encoding.
    async fn sign(&self, tx: &PendingTransaction) -> Result<Bytes, SwapError>;
}

/// Account backed by a local private key.
#[derive(Clone)]
pub struct LocalAccount {
    address: Address,
    wallet: EthereumWallet,
}

impl LocalAccount {
    /// Parse a hex private key.
    pub fn from_private_key(private_key: &str) -> Result<Self, String> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| format!("Invalid private key: {e}"))?;

        Ok(Self { address: signer.address(), wallet: EthereumWallet::from(signer) })
    }
}

#[async_trait]
impl Account for LocalAccount {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(&self, tx: &PendingTransaction) -> Result<Bytes, SwapError> {
        let envelope = TransactionBuilder::<Ethereum>::build(tx.to_request(), &self.wallet)
            .await
            .map_err(|e| SwapError::submission(format!("signing failed: {e}")))?;

        Ok(envelope.encoded_2718().into())
    }
}
