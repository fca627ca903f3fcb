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

//! Read-only access to the farm contract: event logs, historical `earned()` views and
//! timestamp to block resolution.

use std::collections::HashMap;

use alloy::{
    primitives::{Address, B256, U256},
    sol_types::SolEvent,
};
use async_trait::async_trait;

use crate::wallets::WalletAddress;

mod etherscan;
mod rpc;

pub use etherscan::{EtherscanBlockResolver, ETHERSCAN_API_URL};
pub use rpc::{
    HttpProvider, RpcChainClient, DEFAULT_LOG_CHUNK_SIZE, DEFAULT_MULTICALL_CHUNK_SIZE,
};

alloy::sol! {
    /// Subset of the StakingRewards farm interface used for the snapshot.
    #[sol(rpc)]
    interface IStakingRewards {
        event Staked(address indexed user, uint256 amount);
        event RewardPaid(address indexed user, uint256 reward);

        function earned(address account) external view returns (uint256);
    }
}

/// Farm events the snapshot consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FarmEventKind {
    Staked,
    RewardPaid,
}

impl FarmEventKind {
    pub fn topic(&self) -> B256 {
        match self {
            FarmEventKind::Staked => IStakingRewards::Staked::SIGNATURE_HASH,
            FarmEventKind::RewardPaid => IStakingRewards::RewardPaid::SIGNATURE_HASH,
        }
    }

    pub fn signature(&self) -> &'static str {
        match self {
            FarmEventKind::Staked => IStakingRewards::Staked::SIGNATURE,
            FarmEventKind::RewardPaid => IStakingRewards::RewardPaid::SIGNATURE,
        }
    }
}

/// Resolved topic0 hashes for a set of farm events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicFilter {
    topics: Vec<(B256, FarmEventKind)>,
}

impl TopicFilter {
    pub fn new(events: &[FarmEventKind]) -> Self {
        let mut topics: Vec<(B256, FarmEventKind)> = Vec::with_capacity(events.len());
        for kind in events {
            if !topics.iter().any(|(_, k)| k == kind) {
                topics.push((kind.topic(), *kind));
            }
        }
        Self { topics }
    }

    pub fn hashes(&self) -> Vec<B256> {
        self.topics.iter().map(|(hash, _)| *hash).collect()
    }

    /// The event kind a topic0 hash belongs to, if it is part of this filter.
    pub fn kind_of(&self, topic0: &B256) -> Option<FarmEventKind> {
        self.topics.iter().find(|(hash, _)| hash == topic0).map(|(_, kind)| *kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = FarmEventKind> + '_ {
        self.topics.iter().map(|(_, kind)| *kind)
    }
}

/// A decoded farm event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarmEvent {
    Staked { wallet: WalletAddress },
    RewardPaid { wallet: WalletAddress, amount: U256, block_number: u64 },
}

/// Capabilities the snapshot needs from the chain.
///
/// Implementations own batching, pagination and retries. Every call is atomic from the
/// caller's point of view: it either returns the complete result or an error.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Returns the last block mined at or before the given unix timestamp.
    async fn block_for_timestamp(&self, timestamp: u64) -> anyhow::Result<u64>;

    /// Resolves the topic filter for the given events of `contract`.
    ///
    /// The default implementation uses the compiled farm ABI and is valid for any contract
    /// exposing the StakingRewards events.
    fn event_topics(&self, _contract: Address, events: &[FarmEventKind]) -> TopicFilter {
        TopicFilter::new(events)
    }

    /// Fetches every event matching `topics` emitted by `contract` in `[from_block, to_block]`.
    async fn fetch_events(
        &self,
        contract: Address,
        topics: &TopicFilter,
        from_block: u64,
        to_block: u64,
    ) -> anyhow::Result<Vec<FarmEvent>>;

    /// Calls `earned(wallet)` on `contract` for each wallet, evaluated at `block`.
    ///
    /// The returned map is keyed by wallet. A wallet missing from the map means its call did
    /// not produce a value; callers must not treat that as zero.
    async fn batch_earned(
        &self,
        contract: Address,
        wallets: &[WalletAddress],
        block: u64,
    ) -> anyhow::Result<HashMap<WalletAddress, U256>>;
}
