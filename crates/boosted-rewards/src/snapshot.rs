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

//! JSON snapshot artifact: `{ "<wallet>": "<decimal amount>", ... }`.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
    str::FromStr,
};

use alloy::primitives::I256;
use serde::Serialize;

use crate::{errors::SnapshotError, rewards::BoostedRewards, wallets::WalletAddress};

fn write_error(path: &Path, source: std::io::Error) -> SnapshotError {
    SnapshotError::OutputWrite { path: path.to_path_buf(), source }
}

/// Serialize the rewards as pretty JSON with decimal string values.
pub fn to_json(rewards: &BoostedRewards) -> Result<Vec<u8>, serde_json::Error> {
    let entries: BTreeMap<String, String> = rewards
        .rewards
        .iter()
        .map(|(wallet, amount)| (wallet.to_string(), amount.to_string()))
        .collect();

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write the snapshot to `path`, replacing any existing file.
///
/// The content goes to a temporary file next to `path` which is then renamed over it, so a
/// failure never leaves a partially written snapshot behind.
pub fn write_snapshot(
    path: impl AsRef<Path>,
    rewards: &BoostedRewards,
) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    let json = to_json(rewards).map_err(|e| write_error(path, e.into()))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_error(path, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        writer.write_all(&json).map_err(|e| write_error(path, e))?;
        writer.flush().map_err(|e| write_error(path, e))?;
    }
    tmp.as_file().sync_all().map_err(|e| write_error(path, e))?;
    tmp.persist(path).map_err(|e| write_error(path, e.error))?;

    tracing::info!("Wrote {} boosted rewards to {}", rewards.len(), path.display());
    Ok(())
}

/// Read a snapshot written by [write_snapshot].
pub fn read_snapshot(path: impl AsRef<Path>) -> anyhow::Result<BTreeMap<WalletAddress, I256>> {
    let file = File::open(path.as_ref())?;
    let raw: BTreeMap<WalletAddress, String> = serde_json::from_reader(BufReader::new(file))?;
    raw.into_iter()
        .map(|(wallet, amount)| {
            let amount = I256::from_str(&amount)
                .map_err(|e| anyhow::anyhow!("invalid amount {amount:?} for {wallet}: {e}"))?;
            Ok((wallet, amount))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;

    use super::*;

    fn rewards(entries: &[(u8, &str)]) -> BoostedRewards {
        let mut result = BoostedRewards::default();
        for (byte, amount) in entries {
            let amount = I256::from_dec_str(amount).unwrap();
            result.rewards.insert(Address::repeat_byte(*byte).into(), amount);
            result.total += amount;
        }
        result
    }

    #[test]
    fn json_uses_strings_and_lowercase_keys() {
        let json = to_json(&rewards(&[(0xab, "1000000000000000000000001"), (0x01, "0")])).unwrap();
        let text = String::from_utf8(json).unwrap();
        let expected = "{\n    \
            \"0x0101010101010101010101010101010101010101\": \"0\",\n    \
            \"0xabababababababababababababababababababab\": \"1000000000000000000000001\"\n}\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_rewards_write_empty_object() {
        let text = String::from_utf8(to_json(&BoostedRewards::default()).unwrap()).unwrap();
        assert_eq!(text, "{}\n");
    }

    #[test]
    fn written_total_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let rewards = rewards(&[(1, "123456789012345678901234567890"), (2, "-5"), (3, "0")]);

        write_snapshot(&path, &rewards).unwrap();
        let back = read_snapshot(&path).unwrap();

        assert_eq!(back, rewards.rewards);
        let total = back.values().fold(I256::ZERO, |acc, v| acc + *v);
        assert_eq!(total, rewards.total);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        std::fs::write(&path, "stale").unwrap();

        write_snapshot(&path, &rewards(&[(4, "7")])).unwrap();
        assert_eq!(read_snapshot(&path).unwrap().len(), 1);
        // No temp files are left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("wallets.json");
        let err = write_snapshot(&path, &rewards(&[(4, "7")])).unwrap_err();
        assert!(matches!(err, SnapshotError::OutputWrite { .. }), "{err}");
        assert!(!path.exists());
    }
}
