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

use std::collections::HashMap;

use alloy::{
    eips::BlockId,
    primitives::{Address, U256},
    providers::{
        fillers::{ChainIdFiller, FillProvider, JoinFill},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::{
        client::RpcClient,
        types::{BlockNumberOrTag, Filter, Log},
    },
    transports::layers::RetryBackoffLayer,
};
use anyhow::{bail, Context};
use async_trait::async_trait;
use url::Url;

use super::{
    ChainClient, EtherscanBlockResolver, FarmEvent, FarmEventKind, IStakingRewards, TopicFilter,
};
use crate::wallets::WalletAddress;

/// Default number of blocks per `eth_getLogs` request.
pub const DEFAULT_LOG_CHUNK_SIZE: u64 = 10_000;
/// Default number of `earned()` calls aggregated into one multicall.
pub const DEFAULT_MULTICALL_CHUNK_SIZE: usize = 50;

pub type HttpProvider = FillProvider<JoinFill<Identity, ChainIdFiller>, RootProvider>;

/// [ChainClient] backed by an alloy provider, with timestamps resolved through Etherscan.
pub struct RpcChainClient<P> {
    provider: P,
    block_resolver: Option<EtherscanBlockResolver>,
    log_chunk_size: u64,
    multicall_chunk_size: usize,
}

impl RpcChainClient<HttpProvider> {
    /// Connect to an HTTP RPC endpoint, retrying rate-limited and transient failures.
    pub fn connect(rpc_url: Url) -> Self {
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .filler(ChainIdFiller::default())
            .connect_client(
                RpcClient::builder().layer(RetryBackoffLayer::new(5, 1000, 330)).http(rpc_url),
            );
        Self::new(provider)
    }
}

impl<P> RpcChainClient<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            block_resolver: None,
            log_chunk_size: DEFAULT_LOG_CHUNK_SIZE,
            multicall_chunk_size: DEFAULT_MULTICALL_CHUNK_SIZE,
        }
    }

    pub fn with_block_resolver(self, block_resolver: EtherscanBlockResolver) -> Self {
        Self { block_resolver: Some(block_resolver), ..self }
    }

    pub fn with_log_chunk_size(self, log_chunk_size: u64) -> Self {
        Self { log_chunk_size: log_chunk_size.max(1), ..self }
    }

    pub fn with_multicall_chunk_size(self, multicall_chunk_size: usize) -> Self {
        Self { multicall_chunk_size: multicall_chunk_size.max(1), ..self }
    }
}

/// Query logs in chunks to stay under provider range limits.
async fn query_logs_chunked<P: Provider>(
    provider: &P,
    filter: Filter,
    from_block: u64,
    to_block: u64,
    chunk_size: u64,
) -> anyhow::Result<Vec<Log>> {
    let mut all_logs = Vec::new();
    let mut current_from = from_block;

    while current_from <= to_block {
        let current_to = current_from.saturating_add(chunk_size - 1).min(to_block);

        let chunk_filter = filter
            .clone()
            .from_block(BlockNumberOrTag::Number(current_from))
            .to_block(BlockNumberOrTag::Number(current_to));

        let logs = provider.get_logs(&chunk_filter).await.with_context(|| {
            format!("Failed to get logs for blocks {current_from}..={current_to}")
        })?;
        tracing::trace!("Fetched {} logs in blocks {current_from}..={current_to}", logs.len());
        all_logs.extend(logs);

        if current_to == u64::MAX {
            break;
        }
        current_from = current_to + 1;
    }

    Ok(all_logs)
}

fn decode_farm_event(log: &Log, topics: &TopicFilter) -> anyhow::Result<FarmEvent> {
    let topic0 = log.topics().first().context("Log has no topics")?;
    let kind = topics
        .kind_of(topic0)
        .with_context(|| format!("Unexpected event topic {topic0}"))?;

    let event = match kind {
        FarmEventKind::Staked => {
            let decoded = log
                .log_decode::<IStakingRewards::Staked>()
                .context("Failed to decode Staked log")?;
            FarmEvent::Staked { wallet: decoded.inner.data.user.into() }
        }
        FarmEventKind::RewardPaid => {
            let block_number = log.block_number.context("RewardPaid log has no block number")?;
            let decoded = log
                .log_decode::<IStakingRewards::RewardPaid>()
                .context("Failed to decode RewardPaid log")?;
            FarmEvent::RewardPaid {
                wallet: decoded.inner.data.user.into(),
                amount: decoded.inner.data.reward,
                block_number,
            }
        }
    };
    Ok(event)
}

#[async_trait]
impl<P> ChainClient for RpcChainClient<P>
where
    P: Provider + Send + Sync,
{
    async fn block_for_timestamp(&self, timestamp: u64) -> anyhow::Result<u64> {
        let Some(resolver) = &self.block_resolver else {
            bail!("No block resolver configured, cannot resolve timestamp {timestamp}");
        };
        resolver.block_for_timestamp(timestamp).await
    }

    async fn fetch_events(
        &self,
        contract: Address,
        topics: &TopicFilter,
        from_block: u64,
        to_block: u64,
    ) -> anyhow::Result<Vec<FarmEvent>> {
        let filter = Filter::new().address(contract).event_signature(topics.hashes());
        let logs =
            query_logs_chunked(&self.provider, filter, from_block, to_block, self.log_chunk_size)
                .await?;

        logs.iter()
            .map(|log| {
                decode_farm_event(log, topics).with_context(|| {
                    format!(
                        "Bad log in tx {:?} at block {:?}",
                        log.transaction_hash, log.block_number
                    )
                })
            })
            .collect()
    }

    async fn batch_earned(
        &self,
        contract: Address,
        wallets: &[WalletAddress],
        block: u64,
    ) -> anyhow::Result<HashMap<WalletAddress, U256>> {
        let farm = IStakingRewards::new(contract, &self.provider);
        let mut balances = HashMap::with_capacity(wallets.len());

        for chunk in wallets.chunks(self.multicall_chunk_size) {
            let mut multicall = self
                .provider
                .multicall()
                .dynamic::<IStakingRewards::earnedCall>()
                .block(BlockId::number(block));

            for wallet in chunk {
                multicall = multicall.add_dynamic(farm.earned(wallet.address()));
            }

            let results: Vec<U256> = multicall
                .aggregate()
                .await
                .with_context(|| format!("earned() multicall failed at block {block}"))?;

            if results.len() != chunk.len() {
                bail!(
                    "earned() multicall at block {block} returned {} results for {} wallets",
                    results.len(),
                    chunk.len()
                );
            }

            for (wallet, earned) in chunk.iter().zip(results) {
                balances.insert(*wallet, earned);
            }
        }

        Ok(balances)
    }
}
