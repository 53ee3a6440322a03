// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the client data directory.

use std::path::{Path, PathBuf};

/// Directory name used under the home directory when none is configured.
pub const DEFAULT_DIR_NAME: &str = ".orderly-onboard";

/// Storage path utilities.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        let root = std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(DEFAULT_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR_NAME));
        Self::new(root)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all client data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the client state database.
    pub fn state_db(&self) -> PathBuf {
        self.root.join("state.redb")
    }
}
