// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistence Layer
//!
//! Small string key-value store for client state that must survive between
//! runs: the broker id and delegate contract last used on a chain, and the
//! Orderly API keys created for an account.
//!
//! ## Key Space
//!
//! ```text
//! orderly-key:{account_id}:{testnet|mainnet}   # base64url ed25519 private key
//! broker-id:{chain_id}                          # last broker id used on the chain
//! contract-address:{chain_id}                   # last delegate contract used on the chain
//! ```
//!
//! ## Important Notes
//!
//! - Writes are unconditional overwrites; there is no key rotation history
//! - Nothing expires and nothing is encrypted: private keys are stored in
//!   plaintext, protect the data directory accordingly
//! - The store is injected (see [`KeyValueStore`]); there is no global state

pub mod keyspace;
pub mod kv_database;
pub mod memory;
pub mod paths;

pub use keyspace::OrderlyStorage;
pub use kv_database::RedbStore;
pub use memory::MemoryStore;
pub use paths::StoragePaths;

/// Error type for persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A thread panicked while holding the in-memory store lock.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String key-value store backing [`OrderlyStorage`].
///
/// Reads of unset keys return `Ok(None)`; `set` overwrites unconditionally.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
