// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! RPC module for interacting with the chain and the signing account.

mod account;
mod client;
mod provider;
mod types;

pub use account::{Account, LocalAccount};
pub use client::{ChainClient, RpcChainClient};
pub use provider::{create_provider, RpcConfig};
pub use types::{PendingTransaction, SwapReceipt};
