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

use std::path::PathBuf;

use thiserror::Error;

use crate::wallets::WalletAddress;

pub trait CodedError: std::error::Error {
    fn code(&self) -> &str;
}

/// Implements [std::fmt::Debug] in terms of [std::fmt::Display], so that an error returned from
/// `main` prints its code and message rather than the derived struct layout.
#[macro_export]
macro_rules! impl_coded_debug {
    ($name:ident) => {
        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{self}")
            }
        }
    };
}

#[derive(Error)]
pub enum SnapshotError {
    #[error("{code} Missing required configuration: {0}", code = self.code())]
    ConfigurationMissing(&'static str),

    #[error("{code} Invalid configuration: {0}", code = self.code())]
    InvalidConfiguration(String),

    #[error("{code} Failed to read eligible wallets file {}: {source}", .path.display(), code = self.code())]
    WalletsFileRead { path: PathBuf, source: std::io::Error },

    #[error("{code} Malformed eligible wallets file: {0}", code = self.code())]
    WalletsFileMalformed(String),

    #[error("{code} Chain fetch failed: {0:#}", code = self.code())]
    ChainFetch(anyhow::Error),

    #[error("{code} No earned() result for wallet {wallet} at block {block}", code = self.code())]
    MissingEarned { wallet: WalletAddress, block: u64 },

    #[error("{code} Data inconsistency: {0}", code = self.code())]
    DataInconsistency(String),

    #[error("{code} Failed to write snapshot {}: {source}", .path.display(), code = self.code())]
    OutputWrite { path: PathBuf, source: std::io::Error },
}

impl CodedError for SnapshotError {
    fn code(&self) -> &str {
        match self {
            SnapshotError::ConfigurationMissing(_) => "[BR-CFG-001]",
            SnapshotError::InvalidConfiguration(_) => "[BR-CFG-002]",
            SnapshotError::WalletsFileRead { .. } => "[BR-IN-101]",
            SnapshotError::WalletsFileMalformed(_) => "[BR-IN-102]",
            SnapshotError::ChainFetch(_) => "[BR-CHN-201]",
            SnapshotError::MissingEarned { .. } => "[BR-DAT-301]",
            SnapshotError::DataInconsistency(_) => "[BR-DAT-302]",
            SnapshotError::OutputWrite { .. } => "[BR-OUT-401]",
        }
    }
}

impl_coded_debug!(SnapshotError);
