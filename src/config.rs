// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration module - loads settings from environment variables.

use crate::aggregator::DEFAULT_BASE_URL;
use std::time::Duration;

/// Runtime configuration for the swapper.
#[derive(Debug, Clone)]
pub struct Config {
    // RPC
    pub rpc_url: String,
    pub confirmation_timeout_sec: u64,

    // Wallets
    pub private_keys: Vec<String>,

    // Aggregator
    pub chain: String,
    pub kyber_api_url: String,
    pub http_proxy_url: Option<String>,
    pub http_timeout_sec: u64,

    // Gas guard
    pub max_gas_gwei: f64,
    pub gas_poll_interval_sec: u64,

    // Retry
    pub retry_count: u32,
    pub retry_delay_sec: u64,

    // Run
    pub run_timeout_sec: Option<u64>,
    pub tokens_file: Option<String>,

    // Telegram
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let private_keys = parse_keys(&env_var("PRIVATE_KEYS")?);
        if private_keys.is_empty() {
            return Err("PRIVATE_KEYS contains no keys".to_string());
        }

        Ok(Self {
            // RPC
            rpc_url: env_var("RPC_URL")?,
            confirmation_timeout_sec: env_var_or("CONFIRMATION_TIMEOUT_SEC", "180")
                .parse()
                .unwrap_or(180),

            // Wallets
            private_keys,

            // Aggregator
            chain: env_var_or("CHAIN", "zksync"),
            kyber_api_url: env_var_or("KYBER_API_URL", DEFAULT_BASE_URL),
            http_proxy_url: optional_var("HTTP_PROXY_URL"),
            http_timeout_sec: env_var_or("HTTP_TIMEOUT_SEC", "20").parse().unwrap_or(20),

            // Gas guard
            max_gas_gwei: parse_var("MAX_GAS_GWEI", "30")?,
            gas_poll_interval_sec: env_var_or("GAS_POLL_INTERVAL_SEC", "60")
                .parse()
                .unwrap_or(60),

            // Retry
            retry_count: env_var_or("RETRY_COUNT", "3").parse().unwrap_or(3),
            retry_delay_sec: env_var_or("RETRY_DELAY_SEC", "10").parse().unwrap_or(10),

            // Run
            run_timeout_sec: optional_var("RUN_TIMEOUT_SEC").and_then(|s| s.parse().ok()),
            tokens_file: optional_var("TOKENS_FILE"),

            // Telegram
            telegram_token: optional_var("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: optional_var("TELEGRAM_CHAT_ID"),
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_sec)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_sec)
    }

    pub fn gas_poll_interval(&self) -> Duration {
        Duration::from_secs(self.gas_poll_interval_sec)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_sec)
    }
}

fn env_var(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("{} not set", name))
}

fn env_var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var(name: &str, default: &str) -> Result<f64, String> {
    let raw = env_var_or(name, default);
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(format!("Invalid {}: {}", name, raw)),
    }
}

fn parse_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
