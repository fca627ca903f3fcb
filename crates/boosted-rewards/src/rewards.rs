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

//! Boosted reward computation.
//!
//! For each boosted wallet the reward attributable to the window `[start, end]` is
//!
//! ```text
//! counted_claimed + earned_at_end - ignored_claimed - earned_before_start
//! ```
//!
//! which removes anything accrued or claimed before the window opened.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use alloy::primitives::{I256, U256};

use crate::{
    errors::SnapshotError,
    ledger::ClaimedRewardsLedger,
    wallets::{EligibleWallets, WalletAddress},
};

/// Wallets that staked in the farm and are on the eligible list.
pub fn select_boosted_wallets(
    farm_wallets: &HashSet<WalletAddress>,
    eligible: &EligibleWallets,
) -> BTreeSet<WalletAddress> {
    farm_wallets.iter().filter(|wallet| eligible.contains(wallet)).copied().collect()
}

/// `earned()` results for a set of wallets at one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarnedSnapshot {
    block: u64,
    balances: HashMap<WalletAddress, U256>,
}

impl EarnedSnapshot {
    pub fn new(block: u64, balances: HashMap<WalletAddress, U256>) -> Self {
        Self { block, balances }
    }

    pub fn block(&self) -> u64 {
        self.block
    }

    /// The earned balance of `wallet`. Absence is an error, not zero.
    pub fn earned(&self, wallet: &WalletAddress) -> Result<U256, SnapshotError> {
        self.balances
            .get(wallet)
            .copied()
            .ok_or(SnapshotError::MissingEarned { wallet: *wallet, block: self.block })
    }

    /// Fails on the first wallet of `wallets` that has no result in this snapshot.
    pub fn ensure_complete<'a>(
        &self,
        wallets: impl IntoIterator<Item = &'a WalletAddress>,
    ) -> Result<(), SnapshotError> {
        for wallet in wallets {
            self.earned(wallet)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

/// Final per-wallet boosted rewards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoostedRewards {
    pub rewards: BTreeMap<WalletAddress, I256>,
    /// Sum of every entry in `rewards`.
    pub total: I256,
    /// Wallets whose net reward came out negative.
    pub negative_wallets: Vec<WalletAddress>,
}

impl BoostedRewards {
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

fn signed(value: U256, what: &str, wallet: &WalletAddress) -> Result<I256, SnapshotError> {
    I256::try_from(value).map_err(|_| {
        SnapshotError::DataInconsistency(format!("{what} for {wallet} does not fit in int256"))
    })
}

fn overflow(wallet: &WalletAddress) -> SnapshotError {
    SnapshotError::DataInconsistency(format!("net reward for {wallet} overflows int256"))
}

/// Net reward of one wallet over the window.
pub fn net_reward(
    wallet: &WalletAddress,
    claimed: &ClaimedRewardsLedger,
    earned_before_start: &EarnedSnapshot,
    earned_at_end: &EarnedSnapshot,
) -> Result<I256, SnapshotError> {
    let counted = signed(claimed.counted.get_or_zero(wallet), "counted claims", wallet)?;
    let ignored = signed(claimed.ignored.get_or_zero(wallet), "ignored claims", wallet)?;
    let end = signed(earned_at_end.earned(wallet)?, "earned at end", wallet)?;
    let start = signed(earned_before_start.earned(wallet)?, "earned at start", wallet)?;

    counted
        .checked_add(end)
        .and_then(|v| v.checked_sub(ignored))
        .and_then(|v| v.checked_sub(start))
        .ok_or_else(|| overflow(wallet))
}

/// Compute the boosted reward of every wallet in `boosted` and the grand total.
///
/// Negative results are kept as-is and reported in [BoostedRewards::negative_wallets]; they
/// usually mean a claim happened that the event source did not return.
pub fn compute_boosted_rewards(
    boosted: &BTreeSet<WalletAddress>,
    claimed: &ClaimedRewardsLedger,
    earned_before_start: &EarnedSnapshot,
    earned_at_end: &EarnedSnapshot,
) -> Result<BoostedRewards, SnapshotError> {
    let mut result = BoostedRewards::default();

    for wallet in boosted {
        let reward = net_reward(wallet, claimed, earned_before_start, earned_at_end)?;
        if reward.is_negative() {
            tracing::warn!(
                "Negative boosted reward {reward} for {wallet}: earned at block {} exceeds \
                 claims plus earned at block {}; events may be missing",
                earned_before_start.block(),
                earned_at_end.block()
            );
            result.negative_wallets.push(*wallet);
        }
        result.total = result.total.checked_add(reward).ok_or_else(|| {
            SnapshotError::DataInconsistency("total boosted rewards overflow int256".into())
        })?;
        result.rewards.insert(*wallet, reward);
    }

    Ok(result)
}
