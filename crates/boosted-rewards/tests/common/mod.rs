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

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use alloy::primitives::{Address, U256};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use boosted_rewards::{ChainClient, FarmEvent, FarmEventKind, TopicFilter, WalletAddress};

pub const FARM: Address = Address::repeat_byte(0xfa);

pub fn wallet(byte: u8) -> WalletAddress {
    Address::repeat_byte(byte).into()
}

/// In-memory farm: a list of events tagged with their block, `earned()` per block, and a
/// timestamp to block table.
#[derive(Default)]
pub struct FakeChain {
    events: Vec<(u64, FarmEvent)>,
    earned: HashMap<u64, HashMap<WalletAddress, U256>>,
    timestamps: HashMap<u64, u64>,
    /// Wallets whose `earned()` call silently produces nothing.
    dropped: Vec<WalletAddress>,
    fail_events: bool,
    pub earned_calls: AtomicUsize,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staked(mut self, wallet: WalletAddress, block: u64) -> Self {
        self.events.push((block, FarmEvent::Staked { wallet }));
        self
    }

    pub fn reward_paid(mut self, wallet: WalletAddress, amount: u64, block: u64) -> Self {
        self.events.push((
            block,
            FarmEvent::RewardPaid { wallet, amount: U256::from(amount), block_number: block },
        ));
        self
    }

    pub fn earned_at(mut self, block: u64, wallet: WalletAddress, amount: u64) -> Self {
        self.earned.entry(block).or_default().insert(wallet, U256::from(amount));
        self
    }

    pub fn timestamp(mut self, timestamp: u64, block: u64) -> Self {
        self.timestamps.insert(timestamp, block);
        self
    }

    pub fn drop_earned(mut self, wallet: WalletAddress) -> Self {
        self.dropped.push(wallet);
        self
    }

    pub fn failing_events(mut self) -> Self {
        self.fail_events = true;
        self
    }
}

fn kind(event: &FarmEvent) -> FarmEventKind {
    match event {
        FarmEvent::Staked { .. } => FarmEventKind::Staked,
        FarmEvent::RewardPaid { .. } => FarmEventKind::RewardPaid,
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn block_for_timestamp(&self, timestamp: u64) -> anyhow::Result<u64> {
        self.timestamps
            .get(&timestamp)
            .copied()
            .ok_or_else(|| anyhow!("unknown timestamp {timestamp}"))
    }

    async fn fetch_events(
        &self,
        contract: Address,
        topics: &TopicFilter,
        from_block: u64,
        to_block: u64,
    ) -> anyhow::Result<Vec<FarmEvent>> {
        if self.fail_events {
            bail!("connection reset by peer");
        }
        if contract != FARM {
            return Ok(Vec::new());
        }
        Ok(self
            .events
            .iter()
            .filter(|(block, _)| (from_block..=to_block).contains(block))
            .filter(|(_, event)| topics.kinds().any(|k| k == kind(event)))
            .map(|(_, event)| event.clone())
            .collect())
    }

    async fn batch_earned(
        &self,
        contract: Address,
        wallets: &[WalletAddress],
        block: u64,
    ) -> anyhow::Result<HashMap<WalletAddress, U256>> {
        assert_eq!(contract, FARM);
        self.earned_calls.fetch_add(1, Ordering::SeqCst);
        let at_block = self.earned.get(&block);
        Ok(wallets
            .iter()
            .filter(|wallet| !self.dropped.contains(wallet))
            .map(|wallet| {
                let amount = at_block.and_then(|m| m.get(wallet)).copied().unwrap_or(U256::ZERO);
                (*wallet, amount)
            })
            .collect())
    }
}
