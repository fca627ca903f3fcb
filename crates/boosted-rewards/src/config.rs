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

//! Run parameters of a boosted-rewards campaign.

use std::fmt;

use alloy::primitives::{address, Address};

use crate::{
    chain::{ChainClient, DEFAULT_LOG_CHUNK_SIZE, DEFAULT_MULTICALL_CHUNK_SIZE},
    errors::SnapshotError,
};

/// SKY farm on Ethereum mainnet.
pub const SKY_FARM_ADDRESS: Address = address!("0650caf159c5a49f711e8169d4336ecb9b950275");
/// Block in which the SKY farm was created.
pub const SKY_FARM_CONTRACT_START_BLOCK: u64 = 20692595;
/// First block of the boost window (2024-09-18 13:00 UTC).
pub const SKY_CAMPAIGN_START_BLOCK: u64 = 20777633;
/// Last block of the boost window (2024-10-16 13:00 UTC).
pub const SKY_CAMPAIGN_END_BLOCK: u64 = 20978279;
/// 2024-09-18 13:00:00 UTC
pub const SKY_CAMPAIGN_START_TIMESTAMP: u64 = 1726664400;
/// 2024-10-16 13:00:00 UTC
pub const SKY_CAMPAIGN_END_TIMESTAMP: u64 = 1729083600;

/// A window boundary, either fixed or derived from wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAnchor {
    Block(u64),
    /// Unix timestamp, resolved to the last block mined at or before it.
    Timestamp(u64),
}

impl BlockAnchor {
    pub fn is_timestamp(&self) -> bool {
        matches!(self, BlockAnchor::Timestamp(_))
    }

    async fn resolve<C: ChainClient + ?Sized>(&self, client: &C) -> Result<u64, SnapshotError> {
        match *self {
            BlockAnchor::Block(block) => Ok(block),
            BlockAnchor::Timestamp(timestamp) => {
                let block = client
                    .block_for_timestamp(timestamp)
                    .await
                    .map_err(SnapshotError::ChainFetch)?;
                tracing::info!("Resolved timestamp {timestamp} to block {block}");
                Ok(block)
            }
        }
    }
}

impl fmt::Display for BlockAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockAnchor::Block(block) => write!(f, "block {block}"),
            BlockAnchor::Timestamp(ts) => write!(f, "timestamp {ts}"),
        }
    }
}

/// Immutable parameters of one snapshot run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignConfig {
    /// The staking farm whose events and `earned()` views are read.
    pub farm_address: Address,
    pub chain_id: u64,
    /// Events are fetched from this block onwards.
    pub contract_start_block: u64,
    /// Claims strictly before the start block are netted out.
    pub start: BlockAnchor,
    pub end: BlockAnchor,
    pub log_chunk_size: u64,
    pub multicall_chunk_size: usize,
}

impl CampaignConfig {
    /// The SKY farm boosted-rewards campaign.
    pub fn sky_farm() -> Self {
        Self {
            farm_address: SKY_FARM_ADDRESS,
            chain_id: 1,
            contract_start_block: SKY_FARM_CONTRACT_START_BLOCK,
            start: BlockAnchor::Block(SKY_CAMPAIGN_START_BLOCK),
            end: BlockAnchor::Block(SKY_CAMPAIGN_END_BLOCK),
            log_chunk_size: DEFAULT_LOG_CHUNK_SIZE,
            multicall_chunk_size: DEFAULT_MULTICALL_CHUNK_SIZE,
        }
    }

    pub fn needs_block_resolver(&self) -> bool {
        self.start.is_timestamp() || self.end.is_timestamp()
    }

    /// Resolve both window anchors and validate the resulting block range.
    pub async fn resolve_window<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> Result<CampaignWindow, SnapshotError> {
        if self.log_chunk_size == 0 || self.multicall_chunk_size == 0 {
            return Err(SnapshotError::InvalidConfiguration("chunk sizes must be non-zero".into()));
        }
        let start_block = self.start.resolve(client).await?;
        let end_block = self.end.resolve(client).await?;
        CampaignWindow::new(self.farm_address, self.contract_start_block, start_block, end_block)
    }
}

/// The concrete block range of a run, after anchors are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignWindow {
    pub farm_address: Address,
    pub contract_start_block: u64,
    pub start_block: u64,
    pub end_block: u64,
}

impl CampaignWindow {
    pub fn new(
        farm_address: Address,
        contract_start_block: u64,
        start_block: u64,
        end_block: u64,
    ) -> Result<Self, SnapshotError> {
        if start_block == 0 {
            return Err(SnapshotError::InvalidConfiguration(
                "start block must be at least 1".into(),
            ));
        }
        if contract_start_block > start_block {
            return Err(SnapshotError::InvalidConfiguration(format!(
                "contract start block {contract_start_block} is after start block {start_block}"
            )));
        }
        if start_block > end_block {
            return Err(SnapshotError::InvalidConfiguration(format!(
                "start block {start_block} is after end block {end_block}"
            )));
        }
        Ok(Self { farm_address, contract_start_block, start_block, end_block })
    }

    /// Block at which earnings accrued before the window are read.
    pub fn pre_window_block(&self) -> u64 {
        self.start_block - 1
    }
}
