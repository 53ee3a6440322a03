// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Polling Subscriptions
//!
//! Balances, allowances and unsettled PnL are refreshed on a fixed interval
//! (5 s by default). Each refresh loop is a [`Subscription`]: a background
//! task publishing into a `watch` channel that stops when cancelled or
//! dropped.
//!
//! ## Stale results
//!
//! When the inputs of a poll change (another account, another chain) the
//! caller drops the old subscription and starts a new one. A fetch still in
//! flight at that moment is abandoned and its result never published, so a
//! slow response for the old inputs cannot overwrite fresher state.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ClientResult;

/// Default interval between refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to a running poll loop.
pub struct Subscription<T> {
    name: &'static str,
    receiver: watch::Receiver<Option<T>>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Start polling `fetch` every `interval`, beginning immediately.
///
/// A failed fetch is logged and the previously published value is kept.
pub fn subscribe<T, F, Fut>(name: &'static str, interval: Duration, mut fetch: F) -> Subscription<T>
where
    T: Send + Sync + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ClientResult<T>> + Send,
{
    let (sender, receiver) = watch::channel(None);
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let handle = tokio::spawn(async move {
        debug!(subscription = name, interval_ms = interval.as_millis() as u64, "Polling started");
        loop {
            let result = tokio::select! {
                result = fetch() => result,
                _ = token.cancelled() => break,
            };
            if token.is_cancelled() {
                break;
            }

            match result {
                Ok(value) => {
                    sender.send_replace(Some(value));
                }
                Err(e) => warn!(subscription = name, error = %e, "Poll failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {},
                _ = token.cancelled() => break,
            }
        }
        debug!(subscription = name, "Polling stopped");
    });

    Subscription {
        name,
        receiver,
        cancel,
        handle,
    }
}

impl<T> Subscription<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Most recent successful value, `None` until the first one arrives.
    pub fn latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.receiver.borrow().clone()
    }

    /// Independent receiver for the published values.
    pub fn receiver(&self) -> watch::Receiver<Option<T>> {
        self.receiver.clone()
    }

    /// Wait for the next published value. `None` once the loop has stopped.
    pub async fn changed(&mut self) -> Option<T>
    where
        T: Clone,
    {
        self.receiver.changed().await.ok()?;
        self.receiver.borrow_and_update().clone()
    }

    /// Stop polling. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
