// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Kyber Swapper - guarded KyberSwap aggregator swaps on zkSync

mod aggregator;
mod cli;
mod config;
mod error;
mod executor;
mod rpc;
mod telegram;
mod tokens;

use aggregator::{KyberClient, RouteService};
use clap::Parser;
use cli::SwapArgs;
use config::Config;
use executor::{GasGuard, RetryPolicy, SwapExecutor, TransactionSubmitter};
use futures_util::future::join_all;
use rpc::{create_provider, Account, ChainClient, LocalAccount, RpcChainClient, RpcConfig};
use telegram::{Notifier, TelegramNotifier};
use tokens::TokenTable;

use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let request = SwapArgs::parse().to_request();
    request.validate()?;

    info!("🚀 Kyber Swapper starting...");

    let config = Config::from_env().map_err(anyhow::Error::msg)?;

    info!("📡 RPC: {}", config.rpc_url);
    info!("🔀 Aggregator: {} ({})", config.kyber_api_url, config.chain);
    info!("⛽ Max gas: {} gwei, polled every {}s", config.max_gas_gwei, config.gas_poll_interval_sec);
    info!("🔁 Retries: {} every {}s", config.retry_count, config.retry_delay_sec);

    let mut tokens = TokenTable::zksync();
    if let Some(path) = &config.tokens_file {
        tokens = tokens.merge_file(path).map_err(anyhow::Error::msg)?;
    }
    let tokens = Arc::new(tokens);

    let provider = create_provider(&RpcConfig { rpc_url: config.rpc_url.clone() })
        .map_err(anyhow::Error::msg)?;
    let chain: Arc<dyn ChainClient> =
        Arc::new(RpcChainClient::new(provider, config.confirmation_timeout()));

    let routes: Arc<dyn RouteService> = Arc::new(
        KyberClient::new(
            &config.kyber_api_url,
            &config.chain,
            config.http_proxy_url.as_deref(),
            config.http_timeout(),
        )
        .map_err(anyhow::Error::msg)?,
    );

    let telegram = Arc::new(TelegramNotifier::new(
        config.telegram_token.clone(),
        config.telegram_chat_id.clone(),
    ));
    let notifier: Arc<dyn Notifier> = telegram.clone();

    let gas_guard = GasGuard::from_gwei(config.max_gas_gwei, config.gas_poll_interval());
    let retry = RetryPolicy { max_attempts: config.retry_count, delay: config.retry_delay() };

    let mut executors = Vec::with_capacity(config.private_keys.len());
    for key in &config.private_keys {
        let account: Arc<dyn Account> =
            Arc::new(LocalAccount::from_private_key(key).map_err(anyhow::Error::msg)?);
        info!("👛 Wallet: {}", account.address().to_checksum(None));

        executors.push(SwapExecutor::new(
            TransactionSubmitter::new(Arc::clone(&chain), account),
            Arc::clone(&routes),
            Arc::clone(&tokens),
            gas_guard,
            retry,
            Arc::clone(&notifier),
        ));
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                warn!("🛑 Shutdown signal received, cancelling swaps...");
                cancel.cancel();
            }
        });
    }
    if let Some(secs) = config.run_timeout_sec {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            warn!("⏰ Run timeout of {}s reached, cancelling swaps...", secs);
            cancel.cancel();
        });
    }

    info!("✅ Ready! Swapping {} → {} for {} wallet(s)", request.from_token, request.to_token, executors.len());
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let results = join_all(executors.iter().map(|executor| executor.run(&request, &cancel))).await;

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let mut failed = 0;
    for (executor, result) in executors.iter().zip(&results) {
        let wallet = executor.address().to_checksum(None);
        match result {
            Ok(outcome) => info!(
                "✅ {}: swapped {} {} via {:?} (approval: {:?}) in {:?}",
                wallet,
                outcome.amount.human_amount,
                request.from_token,
                outcome.router,
                outcome.approval,
                outcome.receipt.tx_hash
            ),
            Err(e) => {
                failed += 1;
                error!("❌ {}: {}", wallet, e);
            }
        }
    }

    let total = results.len();
    telegram
        .send_message(&format!(
            "📊 *Swap summary*\n{} → {}\nSucceeded: {}/{}",
            request.from_token,
            request.to_token,
            total - failed,
            total
        ))
        .await;

    if failed > 0 {
        anyhow::bail!("{} of {} swaps failed", failed, total);
    }

    info!("🏁 All swaps confirmed");
    Ok(())
}
