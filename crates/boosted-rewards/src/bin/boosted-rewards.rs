// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use boosted_rewards::{
    chain::EtherscanBlockResolver, BlockAnchor, CampaignConfig, EligibleWallets, RpcChainClient,
    SnapshotError,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Compute the boosted rewards snapshot of a staking farm.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct MainArgs {
    /// URL of the Ethereum RPC endpoint.
    #[clap(long, env = "ETHEREUM_RPC_NODE")]
    rpc_url: Option<Url>,
    /// Etherscan API key, needed only to resolve timestamp anchors.
    #[clap(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    etherscan_api_key: Option<String>,
    /// CSV file listing eligible wallets in an `id` column.
    #[clap(long, default_value = "wallets.csv")]
    wallets: PathBuf,
    /// Where to write the JSON snapshot.
    #[clap(long, default_value = "wallets.json")]
    output: PathBuf,
    /// Address of the staking farm.
    #[clap(long)]
    farm_address: Option<Address>,
    /// Block the farm was created in; events are read from here.
    #[clap(long)]
    contract_start_block: Option<u64>,
    /// First block of the boost window.
    #[clap(long, conflicts_with = "start_timestamp")]
    start_block: Option<u64>,
    /// Unix timestamp marking the start of the boost window.
    #[clap(long)]
    start_timestamp: Option<u64>,
    /// Last block of the boost window.
    #[clap(long, conflicts_with = "end_timestamp")]
    end_block: Option<u64>,
    /// Unix timestamp marking the end of the boost window.
    #[clap(long)]
    end_timestamp: Option<u64>,
    /// Number of blocks per log query.
    #[clap(long)]
    log_chunk_size: Option<u64>,
    /// Number of earned() calls per multicall.
    #[clap(long)]
    multicall_chunk_size: Option<usize>,
    /// Whether to log in JSON format.
    #[clap(long, default_value_t = false)]
    log_json: bool,
}

fn anchor(block: Option<u64>, timestamp: Option<u64>, default: BlockAnchor) -> BlockAnchor {
    match (block, timestamp) {
        (Some(block), _) => BlockAnchor::Block(block),
        (None, Some(timestamp)) => BlockAnchor::Timestamp(timestamp),
        (None, None) => default,
    }
}

impl MainArgs {
    fn campaign(&self) -> CampaignConfig {
        let defaults = CampaignConfig::sky_farm();
        CampaignConfig {
            farm_address: self.farm_address.unwrap_or(defaults.farm_address),
            contract_start_block: self
                .contract_start_block
                .unwrap_or(defaults.contract_start_block),
            start: anchor(self.start_block, self.start_timestamp, defaults.start),
            end: anchor(self.end_block, self.end_timestamp, defaults.end),
            log_chunk_size: self.log_chunk_size.unwrap_or(defaults.log_chunk_size),
            multicall_chunk_size: self
                .multicall_chunk_size
                .unwrap_or(defaults.multicall_chunk_size),
            ..defaults
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Loaded before parsing so that `.env` values feed the `env` fallbacks below.
    let dotenv = dotenvy::dotenv();

    let args = MainArgs::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt().with_ansi(false).with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment variables from {:?}", path),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => bail!("failed to load .env file: {}", e),
    }

    tracing::info!("Script started.");

    if let Err(err) = run(&args).await {
        tracing::error!("{err}");
        return Err(err.into());
    }

    tracing::info!("Script finished.");
    Ok(())
}

async fn run(args: &MainArgs) -> Result<(), SnapshotError> {
    let campaign = args.campaign();

    let rpc_url =
        args.rpc_url.clone().ok_or(SnapshotError::ConfigurationMissing("ETHEREUM_RPC_NODE"))?;
    let mut client = RpcChainClient::connect(rpc_url)
        .with_log_chunk_size(campaign.log_chunk_size)
        .with_multicall_chunk_size(campaign.multicall_chunk_size);

    if campaign.needs_block_resolver() {
        let api_key = args
            .etherscan_api_key
            .clone()
            .ok_or(SnapshotError::ConfigurationMissing("ETHERSCAN_API_KEY"))?;
        let resolver = EtherscanBlockResolver::new(api_key, campaign.chain_id)
            .context("Failed to create Etherscan client")
            .map_err(SnapshotError::ChainFetch)?;
        client = client.with_block_resolver(resolver);
    }

    tracing::info!("Fetching all boosted rewards wallets");
    let eligible = EligibleWallets::load(&args.wallets)?;
    tracing::info!("Loaded {} eligible wallets from {}", eligible.len(), args.wallets.display());

    let rewards = boosted_rewards::compute_snapshot(&client, &campaign, &eligible).await?;

    tracing::info!("Generating JSON file");
    boosted_rewards::write_snapshot(&args.output, &rewards)?;

    tracing::info!("Total Rewards: {}", rewards.total);
    Ok(())
}
