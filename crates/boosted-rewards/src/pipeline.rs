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

use std::collections::{BTreeSet, HashSet};

use crate::{
    chain::{ChainClient, FarmEvent, FarmEventKind},
    config::{CampaignConfig, CampaignWindow},
    errors::SnapshotError,
    ledger::{farm_wallets, ClaimedRewardsLedger},
    rewards::{compute_boosted_rewards, select_boosted_wallets, BoostedRewards, EarnedSnapshot},
    wallets::{EligibleWallets, WalletAddress},
};

async fn fetch_farm_events<C: ChainClient + ?Sized>(
    client: &C,
    window: &CampaignWindow,
    kind: FarmEventKind,
) -> Result<Vec<FarmEvent>, SnapshotError> {
    tracing::info!("Fetching {} events", kind.signature());
    let topics = client.event_topics(window.farm_address, &[kind]);
    let events = client
        .fetch_events(window.farm_address, &topics, window.contract_start_block, window.end_block)
        .await
        .map_err(SnapshotError::ChainFetch)?;
    tracing::debug!("Fetched {} {} events", events.len(), kind.signature());
    Ok(events)
}

/// Every wallet that staked in the farm between its creation and the end of the window.
pub async fn fetch_farm_wallets<C: ChainClient + ?Sized>(
    client: &C,
    window: &CampaignWindow,
) -> Result<HashSet<WalletAddress>, SnapshotError> {
    tracing::info!("Fetching all farm wallets");
    let events = fetch_farm_events(client, window, FarmEventKind::Staked).await?;
    let wallets = farm_wallets(&events);
    tracing::info!("Found {} farm wallets", wallets.len());
    Ok(wallets)
}

/// Claimed rewards from the farm's creation to the end of the window, split at the start.
pub async fn fetch_claimed_rewards<C: ChainClient + ?Sized>(
    client: &C,
    window: &CampaignWindow,
) -> Result<ClaimedRewardsLedger, SnapshotError> {
    tracing::info!("Fetching claimed balances");
    let events = fetch_farm_events(client, window, FarmEventKind::RewardPaid).await?;
    ClaimedRewardsLedger::from_events(&events, window.start_block)
}

/// `earned()` for every wallet at `block`. Every wallet must be present in the result.
pub async fn fetch_earned_snapshot<C: ChainClient + ?Sized>(
    client: &C,
    window: &CampaignWindow,
    wallets: &BTreeSet<WalletAddress>,
    block: u64,
) -> Result<EarnedSnapshot, SnapshotError> {
    let wallets: Vec<WalletAddress> = wallets.iter().copied().collect();
    if wallets.is_empty() {
        return Ok(EarnedSnapshot::new(block, Default::default()));
    }

    tracing::info!("Fetching earned() for {} wallets at block {block}", wallets.len());
    let balances = client
        .batch_earned(window.farm_address, &wallets, block)
        .await
        .map_err(SnapshotError::ChainFetch)?;

    let snapshot = EarnedSnapshot::new(block, balances);
    snapshot.ensure_complete(&wallets)?;
    if snapshot.len() != wallets.len() {
        tracing::warn!(
            "earned() batch at block {block} returned {} extra entries",
            snapshot.len() - wallets.len()
        );
    }
    Ok(snapshot)
}

/// Run the whole computation for `config`: resolve the window, gather events and views, and
/// compute the boosted reward of every eligible farm wallet.
pub async fn compute_snapshot<C: ChainClient + ?Sized>(
    client: &C,
    config: &CampaignConfig,
    eligible: &EligibleWallets,
) -> Result<BoostedRewards, SnapshotError> {
    let window = config.resolve_window(client).await?;
    tracing::info!(
        "Computing boosted rewards for farm {} over blocks {}..={} (events from {})",
        window.farm_address,
        window.start_block,
        window.end_block,
        window.contract_start_block
    );

    tracing::info!("Fetching wallets rewards");
    let claimed = fetch_claimed_rewards(client, &window).await?;

    tracing::info!("Getting unique boosted wallets which are staking in farm");
    let farm = fetch_farm_wallets(client, &window).await?;
    let boosted = select_boosted_wallets(&farm, eligible);
    tracing::info!(
        "{} of {} farm wallets are boosted ({} eligible)",
        boosted.len(),
        farm.len(),
        eligible.len()
    );

    let earned_before_start =
        fetch_earned_snapshot(client, &window, &boosted, window.pre_window_block()).await?;
    let earned_at_end = fetch_earned_snapshot(client, &window, &boosted, window.end_block).await?;

    let rewards =
        compute_boosted_rewards(&boosted, &claimed, &earned_before_start, &earned_at_end)?;
    if !rewards.negative_wallets.is_empty() {
        tracing::warn!("{} wallets have a negative boosted reward", rewards.negative_wallets.len());
    }
    Ok(rewards)
}
