//! Content slots: one independently loading piece of page content.
//!
//! A slot is a small state machine over `Idle → Loading → {Ready | Error}`.
//! Its state lives inside a `tokio::sync::watch` channel: the channel is both
//! the store (every transition goes through `send_if_modified`, so the
//! "already loading" check and the move into `Loading` happen under one lock)
//! and the observer list (subscribers are woken on each transition).
//!
//! At most one fetch is in flight per slot. In-flight fetches are never
//! cancelled; the spawned task only holds a `Weak` to its slot, so a result that
//! arrives after the page was torn down is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error};

use crate::genai_client::GenAiError;

pub mod fetchers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Fires once, automatically, when the owning page mounts.
    OnMount,
    /// Fires on every explicit refresh request that is not already loading.
    OnDemand,
}

/// Why a fetch did not produce a value. Never shown to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotFailure {
    #[error("configuration missing: no API key")]
    ConfigurationMissing,

    #[error("transport failure: {0}")]
    TransportFailure(String),
}

impl SlotFailure {
    /// Short user-safe label stored next to the fallback value.
    pub fn user_label(&self) -> &'static str {
        match self {
            SlotFailure::ConfigurationMissing => "not_configured",
            SlotFailure::TransportFailure(_) => "unavailable",
        }
    }
}

impl From<GenAiError> for SlotFailure {
    fn from(e: GenAiError) -> Self {
        match e {
            GenAiError::NotConfigured => SlotFailure::ConfigurationMissing,
            other => SlotFailure::TransportFailure(other.to_string()),
        }
    }
}

/// Values substituted for the slot content when a fetch fails.
#[derive(Debug, Clone)]
pub struct Fallback<T> {
    pub not_configured: T,
    pub failed: T,
}

impl<T: Clone> Fallback<T> {
    pub fn uniform(value: T) -> Self {
        Self {
            not_configured: value.clone(),
            failed: value,
        }
    }

    fn for_failure(&self, failure: &SlotFailure) -> T {
        match failure {
            SlotFailure::ConfigurationMissing => self.not_configured.clone(),
            SlotFailure::TransportFailure(_) => self.failed.clone(),
        }
    }
}

/// Observable state of a slot. `value` is always renderable.
#[derive(Debug, Clone, Serialize)]
pub struct SlotState<T> {
    pub status: SlotStatus,
    pub value: T,
    pub error_message: Option<String>,
    /// Number of fetches that have resolved. Zero means `value` is still the default.
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

impl<T> SlotState<T> {
    fn new(status: SlotStatus, value: T) -> Self {
        Self {
            status,
            value,
            error_message: None,
            revision: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == SlotStatus::Loading
    }

    /// Moves into `Loading`, keeping the displayed value.
    /// Returns false when a fetch is already in flight.
    fn begin_loading(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.status = SlotStatus::Loading;
        self.updated_at = Utc::now();
        true
    }

    /// Applies a fetch outcome. Ignored unless the slot is loading.
    fn resolve(&mut self, outcome: Result<T, SlotFailure>, fallback: &Fallback<T>) -> bool
    where
        T: Clone,
    {
        if !self.is_loading() {
            return false;
        }
        match outcome {
            Ok(value) => {
                self.status = SlotStatus::Ready;
                self.value = value;
                self.error_message = None;
            }
            Err(failure) => {
                self.status = SlotStatus::Error;
                self.value = fallback.for_failure(&failure);
                self.error_message = Some(failure.user_label().to_string());
            }
        }
        self.revision += 1;
        self.updated_at = Utc::now();
        true
    }
}

/// The asynchronous operation behind a slot.
#[async_trait]
pub trait Fetcher<T>: Send + Sync {
    /// Synchronous check run before anything is spawned. A failure here
    /// resolves the slot to `Error` immediately.
    fn preflight(&self) -> Result<(), SlotFailure> {
        Ok(())
    }

    async fn fetch(&self) -> Result<T, SlotFailure>;
}

pub struct ContentSlot<T> {
    name: &'static str,
    policy: TriggerPolicy,
    fallback: Fallback<T>,
    fetcher: Arc<dyn Fetcher<T>>,
    state: watch::Sender<SlotState<T>>,
    activated: AtomicBool,
}

impl<T> ContentSlot<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// `OnMount` slots start `Idle`; `OnDemand` slots start `Ready` showing the default.
    pub fn new(
        name: &'static str,
        policy: TriggerPolicy,
        default_value: T,
        fallback: Fallback<T>,
        fetcher: Arc<dyn Fetcher<T>>,
    ) -> Arc<Self> {
        let status = match policy {
            TriggerPolicy::OnMount => SlotStatus::Idle,
            TriggerPolicy::OnDemand => SlotStatus::Ready,
        };
        let (state, _) = watch::channel(SlotState::new(status, default_value));

        Arc::new(Self {
            name,
            policy,
            fallback,
            fetcher,
            state,
            activated: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    pub fn snapshot(&self) -> SlotState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SlotState<T>> {
        self.state.subscribe()
    }

    /// Called when the owning page becomes active. Only the first call on an
    /// `OnMount` slot dispatches a fetch.
    pub fn activate(self: &Arc<Self>) -> bool {
        if self.policy != TriggerPolicy::OnMount {
            return false;
        }
        if self.activated.swap(true, Ordering::SeqCst) {
            debug!(slot = self.name, "Slot already activated; ignoring");
            return false;
        }
        self.dispatch()
    }

    /// Explicit refresh of an `OnDemand` slot. No-op while a fetch is in flight.
    pub fn request_refresh(self: &Arc<Self>) -> bool {
        if self.policy != TriggerPolicy::OnDemand {
            debug!(slot = self.name, "Refresh requested on an on-mount slot; ignoring");
            return false;
        }
        self.dispatch()
    }

    /// Waits until the slot is not loading and returns that state.
    pub async fn settled(&self) -> SlotState<T> {
        let mut rx = self.subscribe();
        let settled = rx.wait_for(|s| !s.is_loading()).await.map(|s| s.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }

    fn dispatch(self: &Arc<Self>) -> bool {
        if !self.state.send_if_modified(|s| s.begin_loading()) {
            debug!(slot = self.name, "Fetch already in flight; ignoring trigger");
            return false;
        }
        debug!(slot = self.name, "Slot loading");

        if let Err(failure) = self.fetcher.preflight() {
            self.complete(Err(failure));
            return true;
        }

        let slot = Arc::downgrade(self);
        let fetcher = Arc::clone(&self.fetcher);
        let name = self.name;
        tokio::spawn(async move {
            let outcome = fetcher.fetch().await;
            match slot.upgrade() {
                Some(slot) => slot.complete(outcome),
                None => debug!(slot = name, "Fetch finished after teardown; result dropped"),
            }
        });
        true
    }

    fn complete(&self, outcome: Result<T, SlotFailure>) {
        if let Err(failure) = &outcome {
            error!(slot = self.name, error = %failure, "Content fetch failed; showing fallback");
        }
        let fallback = &self.fallback;
        if self.state.send_if_modified(|s| s.resolve(outcome, fallback)) {
            debug!(slot = self.name, status = ?self.state.borrow().status, "Slot resolved");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fetcher whose results are fed by the test, one per call.

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::{mpsc, Mutex};

    use super::{Fetcher, SlotFailure};

    pub struct ScriptedFetcher<T> {
        pub calls: AtomicUsize,
        configured: bool,
        results: Mutex<mpsc::UnboundedReceiver<Result<T, SlotFailure>>>,
    }

    impl<T> ScriptedFetcher<T> {
        pub fn new() -> (Self, mpsc::UnboundedSender<Result<T, SlotFailure>>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let fetcher = Self {
                calls: AtomicUsize::new(0),
                configured: true,
                results: Mutex::new(rx),
            };
            (fetcher, tx)
        }

        pub fn unconfigured() -> Self {
            let (mut fetcher, _) = Self::new();
            fetcher.configured = false;
            fetcher
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<T: Send + 'static> Fetcher<T> for ScriptedFetcher<T> {
        fn preflight(&self) -> Result<(), SlotFailure> {
            if self.configured {
                Ok(())
            } else {
                Err(SlotFailure::ConfigurationMissing)
            }
        }

        async fn fetch(&self) -> Result<T, SlotFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .await
                .recv()
                .await
                .unwrap_or_else(|| Err(SlotFailure::TransportFailure("script ended".into())))
        }
    }
}
