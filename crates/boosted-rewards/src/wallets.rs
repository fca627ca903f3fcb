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

//! Wallet addresses and the eligible-wallet list.

use std::{collections::HashSet, fmt, fs::File, path::Path, str::FromStr};

use alloy::{hex, primitives::Address};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::SnapshotError;

/// Name of the column holding wallet identifiers in the eligible-wallets file.
pub const WALLET_ID_COLUMN: &str = "id";

/// A wallet address, always rendered in lowercase hex.
///
/// Parsing is case-insensitive and does not enforce EIP-55 checksums, so `0xABC...` and
/// `0xabc...` are the same key everywhere.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WalletAddress(Address);

impl WalletAddress {
    pub const fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for WalletAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl FromStr for WalletAddress {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Address::from_str(&normalized).map(Self)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_prefixed(self.0))
    }
}

impl fmt::Debug for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletAddress({self})")
    }
}

impl Serialize for WalletAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WalletAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Wallets eligible for the boost, loaded from a curated CSV list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibleWallets {
    wallets: HashSet<WalletAddress>,
}

impl EligibleWallets {
    /// Load the eligible wallets from a comma-delimited file whose header has an `id` column.
    ///
    /// Other columns are ignored. Duplicate rows (in any letter case) collapse into one entry.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SnapshotError::WalletsFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Parse the eligible wallets from any CSV source.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, SnapshotError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| SnapshotError::WalletsFileMalformed(format!("unreadable header: {e}")))?;
        let column = headers.iter().position(|h| h.trim() == WALLET_ID_COLUMN).ok_or_else(|| {
            SnapshotError::WalletsFileMalformed(format!("missing `{WALLET_ID_COLUMN}` column"))
        })?;

        let mut wallets = HashSet::new();
        for record in reader.records() {
            let record = record.map_err(|e| SnapshotError::WalletsFileMalformed(e.to_string()))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let raw = record.get(column).ok_or_else(|| {
                SnapshotError::WalletsFileMalformed(format!(
                    "line {line}: missing `{WALLET_ID_COLUMN}` value"
                ))
            })?;
            let wallet: WalletAddress = raw.parse().map_err(|e| {
                SnapshotError::WalletsFileMalformed(format!(
                    "line {line}: invalid address {raw:?}: {e}"
                ))
            })?;
            wallets.insert(wallet);
        }

        tracing::debug!("Loaded {} eligible wallets", wallets.len());
        Ok(Self { wallets })
    }

    pub fn contains(&self, wallet: &WalletAddress) -> bool {
        self.wallets.contains(wallet)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WalletAddress> {
        self.wallets.iter()
    }
}

impl FromIterator<WalletAddress> for EligibleWallets {
    fn from_iter<I: IntoIterator<Item = WalletAddress>>(iter: I) -> Self {
        Self { wallets: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MIXED: &str = "0x00000000000000000000000000000000000ABCDE";
    const LOWER: &str = "0x00000000000000000000000000000000000abcde";

    #[test]
    fn address_is_lowercased() {
        let wallet: WalletAddress = MIXED.parse().unwrap();
        assert_eq!(wallet.to_string(), LOWER);
        assert_eq!(wallet, LOWER.parse().unwrap());
    }

    #[test]
    fn bad_checksum_is_accepted() {
        // Valid hex with a casing that is not a valid EIP-55 checksum.
        let wallet: WalletAddress = "0xF39fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(wallet.to_string(), "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    }

    #[test]
    fn serde_uses_lowercase_string() {
        let wallet: WalletAddress = MIXED.parse().unwrap();
        let json = serde_json::to_string(&wallet).unwrap();
        assert_eq!(json, format!("\"{LOWER}\""));
        let back: WalletAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wallet);
    }

    #[test]
    fn loads_and_dedups_mixed_case() {
        let csv = format!("id,label\n{MIXED},first\n{LOWER},second\n");
        let wallets = EligibleWallets::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(wallets.len(), 1);
        assert!(wallets.contains(&LOWER.parse().unwrap()));
    }

    #[test]
    fn id_column_need_not_be_first() {
        let csv = format!("label,id\nfoo,{MIXED}\n");
        let wallets = EligibleWallets::from_reader(csv.as_bytes()).unwrap();
        assert!(wallets.contains(&LOWER.parse().unwrap()));
    }

    #[test]
    fn header_only_is_empty() {
        let wallets = EligibleWallets::from_reader("id\n".as_bytes()).unwrap();
        assert!(wallets.is_empty());
    }

    #[test]
    fn missing_id_column() {
        let csv = format!("wallet\n{LOWER}\n");
        let err = EligibleWallets::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SnapshotError::WalletsFileMalformed(_)), "{err}");
    }

    #[test]
    fn invalid_address_reports_line() {
        let csv = format!("id\n{LOWER}\nnot-an-address\n");
        let err = EligibleWallets::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            SnapshotError::WalletsFileMalformed(msg) => assert!(msg.contains("line 3"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EligibleWallets::load(dir.path().join("wallets.csv")).unwrap_err();
        assert!(matches!(err, SnapshotError::WalletsFileRead { .. }), "{err}");
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id").unwrap();
        writeln!(file, "{MIXED}").unwrap();
        let wallets = EligibleWallets::load(file.path()).unwrap();
        assert_eq!(wallets.iter().copied().collect::<Vec<_>>(), vec![LOWER.parse().unwrap()]);
    }
}
