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

//! Aggregation of farm events by wallet.

use std::collections::{HashMap, HashSet};

use alloy::primitives::U256;

use crate::{chain::FarmEvent, errors::SnapshotError, wallets::WalletAddress};

/// Per-wallet reward accumulator. Wallets never credited read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardLedger {
    balances: HashMap<WalletAddress, U256>,
}

impl RewardLedger {
    pub fn add(&mut self, wallet: WalletAddress, amount: U256) -> Result<(), SnapshotError> {
        let balance = self.balances.entry(wallet).or_insert(U256::ZERO);
        *balance = balance.checked_add(amount).ok_or_else(|| {
            SnapshotError::DataInconsistency(format!("reward total overflows for {wallet}"))
        })?;
        Ok(())
    }

    pub fn get_or_zero(&self, wallet: &WalletAddress) -> U256 {
        self.balances.get(wallet).copied().unwrap_or(U256::ZERO)
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

/// Claimed rewards split at the start of the boost window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedRewardsLedger {
    /// Claims strictly before the start block.
    pub ignored: RewardLedger,
    /// Claims at or after the start block.
    pub counted: RewardLedger,
}

impl ClaimedRewardsLedger {
    /// Fold `RewardPaid` events into the ledger. Other events are skipped.
    ///
    /// The result does not depend on the order of `events`.
    pub fn from_events<'a>(
        events: impl IntoIterator<Item = &'a FarmEvent>,
        start_block: u64,
    ) -> Result<Self, SnapshotError> {
        let mut ledger = Self::default();
        for event in events {
            if let FarmEvent::RewardPaid { wallet, amount, block_number } = event {
                ledger.record(*wallet, *amount, *block_number, start_block)?;
            }
        }
        Ok(ledger)
    }

    fn record(
        &mut self,
        wallet: WalletAddress,
        amount: U256,
        block_number: u64,
        start_block: u64,
    ) -> Result<(), SnapshotError> {
        if block_number < start_block {
            self.ignored.add(wallet, amount)
        } else {
            self.counted.add(wallet, amount)
        }
    }
}

/// Distinct wallets that have ever staked, from a stream of farm events.
pub fn farm_wallets<'a>(events: impl IntoIterator<Item = &'a FarmEvent>) -> HashSet<WalletAddress> {
    events
        .into_iter()
        .filter_map(|event| match event {
            FarmEvent::Staked { wallet } => Some(*wallet),
            FarmEvent::RewardPaid { .. } => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;
    use proptest::prelude::*;

    use super::*;

    fn wallet(byte: u8) -> WalletAddress {
        Address::repeat_byte(byte).into()
    }

    fn paid(byte: u8, amount: u64, block_number: u64) -> FarmEvent {
        FarmEvent::RewardPaid { wallet: wallet(byte), amount: U256::from(amount), block_number }
    }

    #[test]
    fn unseen_wallet_is_zero() {
        let ledger = RewardLedger::default();
        assert_eq!(ledger.get_or_zero(&wallet(1)), U256::ZERO);
        assert!(ledger.is_empty());
    }

    #[test]
    fn splits_at_start_block() {
        let events = [paid(1, 10, 99), paid(1, 40, 100), paid(1, 60, 150), paid(2, 7, 1)];
        let ledger = ClaimedRewardsLedger::from_events(&events, 100).unwrap();

        assert_eq!(ledger.ignored.get_or_zero(&wallet(1)), U256::from(10));
        assert_eq!(ledger.counted.get_or_zero(&wallet(1)), U256::from(100));
        assert_eq!(ledger.ignored.get_or_zero(&wallet(2)), U256::from(7));
        assert_eq!(ledger.counted.get_or_zero(&wallet(2)), U256::ZERO);
    }

    #[test]
    fn staked_events_are_not_claims() {
        let events = [FarmEvent::Staked { wallet: wallet(3) }, paid(4, 1, 5)];
        let ledger = ClaimedRewardsLedger::from_events(&events, 0).unwrap();
        assert_eq!(ledger.counted.len(), 1);
        assert!(ledger.ignored.is_empty());
        assert_eq!(farm_wallets(&events), HashSet::from([wallet(3)]));
    }

    #[test]
    fn overflow_is_an_error() {
        let mut ledger = RewardLedger::default();
        ledger.add(wallet(1), U256::MAX).unwrap();
        let err = ledger.add(wallet(1), U256::from(1)).unwrap_err();
        assert!(matches!(err, SnapshotError::DataInconsistency(_)));
    }

    #[test]
    fn farm_wallets_dedup() {
        let staked = FarmEvent::Staked { wallet: wallet(9) };
        let events = [staked.clone(), staked, FarmEvent::Staked { wallet: wallet(8) }];
        assert_eq!(farm_wallets(&events).len(), 2);
    }

    /// A list of claims together with a random permutation of it.
    fn claims_and_permutation() -> impl Strategy<Value = (Vec<FarmEvent>, Vec<FarmEvent>)> {
        prop::collection::vec((0u8..4, 0u64..1_000_000_000, 0u64..200), 0..64)
            .prop_map(|raw| {
                raw.into_iter()
                    .map(|(w, amount, block)| paid(w, amount, block))
                    .collect::<Vec<FarmEvent>>()
            })
            .prop_flat_map(|events| {
                (Just(events.clone()), Just(events).prop_shuffle())
            })
    }

    proptest! {
        #[test]
        fn accumulation_is_order_independent((events, shuffled) in claims_and_permutation()) {
            let forward = ClaimedRewardsLedger::from_events(&events, 100).unwrap();
            let backward = ClaimedRewardsLedger::from_events(events.iter().rev(), 100).unwrap();
            let permuted = ClaimedRewardsLedger::from_events(&shuffled, 100).unwrap();
            prop_assert_eq!(&forward, &backward);
            prop_assert_eq!(&forward, &permuted);
        }
    }
}
