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

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/v2/api";

#[derive(Debug, Deserialize)]
struct EtherscanResponse<T> {
    status: String,
    message: String,
    result: Option<T>,
}

/// Resolves unix timestamps to block numbers with Etherscan's `getblocknobytime` endpoint.
#[derive(Clone)]
pub struct EtherscanBlockResolver {
    client: reqwest::Client,
    api_url: Url,
    api_key: String,
    chain_id: u64,
}

impl std::fmt::Debug for EtherscanBlockResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtherscanBlockResolver")
            .field("api_url", &self.api_url.as_str())
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl EtherscanBlockResolver {
    pub fn new(api_key: impl Into<String>, chain_id: u64) -> anyhow::Result<Self> {
        let api_url = Url::parse(ETHERSCAN_API_URL).context("Invalid Etherscan API URL")?;
        Ok(Self::with_api_url(api_url, api_key, chain_id))
    }

    pub fn with_api_url(api_url: Url, api_key: impl Into<String>, chain_id: u64) -> Self {
        Self { client: reqwest::Client::new(), api_url, api_key: api_key.into(), chain_id }
    }

    fn request_url(&self, timestamp: u64) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair("chainid", &self.chain_id.to_string())
            .append_pair("module", "block")
            .append_pair("action", "getblocknobytime")
            .append_pair("timestamp", &timestamp.to_string())
            .append_pair("closest", "before")
            .append_pair("apikey", &self.api_key);
        url
    }

    /// Returns the last block mined at or before `timestamp`.
    pub async fn block_for_timestamp(&self, timestamp: u64) -> anyhow::Result<u64> {
        let response = self
            .client
            .get(self.request_url(timestamp))
            .send()
            .await
            .context("Etherscan request failed")?
            .error_for_status()
            .context("Etherscan returned an error status")?;
        let data: EtherscanResponse<String> =
            response.json().await.context("Failed to parse Etherscan response")?;

        let block = parse_block_response(data)
            .with_context(|| format!("Failed to resolve block for timestamp {timestamp}"))?;
        tracing::debug!("Resolved timestamp {timestamp} to block {block}");
        Ok(block)
    }
}

fn parse_block_response(data: EtherscanResponse<String>) -> anyhow::Result<u64> {
    if data.status != "1" {
        bail!(
            "Etherscan error: {} ({})",
            data.message,
            data.result.as_deref().unwrap_or("no details")
        );
    }
    let raw = data.result.context("Etherscan response has no result")?;

    // Etherscan answers in decimal, but accept hex as well.
    let block = match raw.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16)?,
        None => raw.parse::<u64>()?,
    };
    Ok(block)
}
