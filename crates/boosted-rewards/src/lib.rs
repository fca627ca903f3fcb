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

//! Snapshot of boosted staking-farm rewards over a fixed block window.
//!
//! Wallets that staked in the farm and appear on a curated eligibility list are credited with
//! the rewards they accrued inside the window, computed from `RewardPaid` events and
//! historical `earned()` views, and written to a JSON artifact.

pub mod chain;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod pipeline;
pub mod rewards;
pub mod snapshot;
pub mod wallets;

pub use chain::{ChainClient, FarmEvent, FarmEventKind, RpcChainClient, TopicFilter};
pub use config::{BlockAnchor, CampaignConfig, CampaignWindow};
pub use errors::{CodedError, SnapshotError};
pub use ledger::{ClaimedRewardsLedger, RewardLedger};
pub use pipeline::compute_snapshot;
pub use rewards::{BoostedRewards, EarnedSnapshot};
pub use snapshot::{read_snapshot, write_snapshot};
pub use wallets::{EligibleWallets, WalletAddress};
