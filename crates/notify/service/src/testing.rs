//! In-memory fakes for service tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify_core::{BatchOutcome, DeviceToken, JobStatus, NotificationPayload, NotificationStatus, Platform};
use notify_push::Pusher;
use notify_storage::{DeviceRegistry, StatusStore};

pub fn tokens(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("tok-{i}")).collect()
}

/// Ordered record of side effects across fakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Sent(usize),
    Pruned(Vec<String>),
    Finalized(String),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

/// Scriptable pusher.
#[derive(Default)]
pub struct FakePusher {
    delay: Duration,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    invalid: HashSet<String>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    events: Option<EventLog>,
}

impl FakePusher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    /// Batches containing any of these tokens get no provider response.
    pub fn failing_batches_containing<const N: usize>(mut self, tokens: [&str; N]) -> Self {
        self.failing.extend(tokens.iter().map(|t| t.to_string()));
        self
    }

    pub fn panicking_batches_containing<const N: usize>(mut self, tokens: [&str; N]) -> Self {
        self.panicking.extend(tokens.iter().map(|t| t.to_string()));
        self
    }

    /// These tokens are reported as permanently invalid.
    pub fn with_invalid_tokens<I: IntoIterator<Item = String>>(mut self, tokens: I) -> Self {
        self.invalid.extend(tokens);
        self
    }

    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Pusher for FakePusher {
    async fn send(&self, batch: &[String], _payload: &NotificationPayload) -> BatchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if batch.iter().any(|t| self.panicking.contains(t)) {
            panic!("scripted pusher panic");
        }

        if let Some(events) = &self.events {
            events.lock().unwrap().push(Event::Sent(batch.len()));
        }

        if batch.iter().any(|t| self.failing.contains(t)) {
            return BatchOutcome::failed(batch.len());
        }

        let mut outcome = BatchOutcome::default();
        for token in batch {
            if self.invalid.contains(token) {
                outcome.failure_count += 1;
                outcome.invalid_tokens.push(token.clone());
            } else {
                outcome.success_count += 1;
            }
        }
        outcome
    }
}

#[derive(Default)]
struct State {
    devices: Vec<DeviceToken>,
    statuses: HashMap<String, NotificationStatus>,
    delete_calls: usize,
    finalize_writes: usize,
    fail_finalize: bool,
    fail_create: bool,
    write_delay: Duration,
}

/// In-memory device registry and status store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    events: Option<EventLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    /// Register one Android device per token.
    pub fn with_tokens(self, tokens: &[String]) -> Self {
        for (i, token) in tokens.iter().enumerate() {
            self.register(&DeviceToken {
                subscriber_id: format!("sub-{i}"),
                platform: Platform::Android,
                token: token.clone(),
            })
            .unwrap();
        }
        self
    }

    pub fn failing_finalize(self) -> Self {
        self.state.lock().unwrap().fail_finalize = true;
        self
    }

    /// Block the calling thread this long on every delete and finalize.
    pub fn with_write_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().write_delay = delay;
        self
    }

    fn stall(&self) {
        let delay = self.state.lock().unwrap().write_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }

    pub fn failing_create(self) -> Self {
        self.state.lock().unwrap().fail_create = true;
        self
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }

    pub fn finalize_writes(&self) -> usize {
        self.state.lock().unwrap().finalize_writes
    }

    pub fn status_count(&self) -> usize {
        self.state.lock().unwrap().statuses.len()
    }

    pub fn insert_status(&self, status: NotificationStatus) {
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(status.job_id.clone(), status);
    }
}

impl DeviceRegistry for MemoryStore {
    fn register(&self, device: &DeviceToken) -> color_eyre::eyre::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.devices.retain(|d| {
            d.token != device.token
                && !(d.subscriber_id == device.subscriber_id && d.platform == device.platform)
        });
        state.devices.push(device.clone());
        Ok(())
    }

    fn tokens_for_subscribers(&self, subscriber_ids: &[&str]) -> color_eyre::eyre::Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .devices
            .iter()
            .filter(|d| subscriber_ids.contains(&d.subscriber_id.as_str()))
            .map(|d| d.token.clone())
            .collect())
    }

    fn all_tokens(&self) -> color_eyre::eyre::Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        Ok(state.devices.iter().map(|d| d.token.clone()).collect())
    }

    fn get_device(
        &self,
        subscriber_id: &str,
        platform: Platform,
    ) -> color_eyre::eyre::Result<Option<DeviceToken>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .devices
            .iter()
            .find(|d| d.subscriber_id == subscriber_id && d.platform == platform)
            .cloned())
    }

    fn delete_tokens(&self, tokens: &[&str]) -> color_eyre::eyre::Result<usize> {
        self.stall();
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;
        let before = state.devices.len();
        state.devices.retain(|d| !tokens.contains(&d.token.as_str()));

        if let Some(events) = &self.events {
            let mut pruned: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
            pruned.sort();
            events.lock().unwrap().push(Event::Pruned(pruned));
        }

        Ok(before - state.devices.len())
    }
}

impl StatusStore for MemoryStore {
    fn create_pending(&self, status: &NotificationStatus) -> color_eyre::eyre::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            color_eyre::eyre::bail!("status store unavailable");
        }
        state.statuses.insert(status.job_id.clone(), status.clone());
        Ok(())
    }

    fn finalize(
        &self,
        job_id: &str,
        successful_count: i64,
        failed_count: i64,
    ) -> color_eyre::eyre::Result<bool> {
        self.stall();
        let mut state = self.state.lock().unwrap();
        if state.fail_finalize {
            color_eyre::eyre::bail!("status store unavailable");
        }

        let Some(status) = state.statuses.get_mut(job_id) else {
            return Ok(false);
        };
        if status.status != JobStatus::Pending {
            return Ok(false);
        }

        status.successful_count = successful_count;
        status.failed_count = failed_count;
        status.status = JobStatus::Done;
        state.finalize_writes += 1;

        if let Some(events) = &self.events {
            events.lock().unwrap().push(Event::Finalized(job_id.to_string()));
        }

        Ok(true)
    }

    fn get_status(&self, job_id: &str) -> color_eyre::eyre::Result<Option<NotificationStatus>> {
        Ok(self.state.lock().unwrap().statuses.get(job_id).cloned())
    }
}
