/**
 * Poll Client
 *
 * Repeatedly polls one channel and hands each event to a callback.
 *
 * # States
 *
 * `Idle` and `Polling`, mutated only by `start`, `stop` and the outcome
 * handlers of the running cycle:
 *
 * - `start()` - no-op while `Polling`; otherwise clears the last error and
 *   spawns a cycle task
 * - 204 -> next request immediately
 * - 200 -> event callback, next request immediately
 * - error -> error callback, then one retry after the backoff delay
 *   (401/403 and unroutable channels go `Idle` instead)
 * - `stop()` -> `Idle`, aborts the in-flight request and the retry timer,
 *   then waits for the cycle task to finish
 * - a panicking callback -> `Idle` with the panic recorded as last error
 *
 * # Invariant
 *
 * At most one request is in flight and at most one retry timer is pending
 * per client, and never both. Both are registered under the state lock
 * together with a generation check, so a cycle superseded by `stop()` can
 * never issue another request.
 */

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures_util::future::{abortable, AbortHandle};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::client::error::PollError;
use crate::client::retry::BackoffStrategy;
use crate::client::transport::{PollResponse, PollTransport};
use crate::shared::{ChannelKey, PollEnvelope};

/// Consumer of delivered events
pub type EventCallback = Arc<dyn Fn(PollEnvelope) + Send + Sync>;

/// Consumer of poll failures
pub type ErrorCallback = Arc<dyn Fn(&PollError) + Send + Sync>;

/// Activity state of a poll client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
}

struct Inner {
    state: PollState,
    /// Bumped by every `start` and `stop`; a cycle only acts while its
    /// generation is current
    generation: u64,
    last_error: Option<String>,
    in_flight: Option<AbortHandle>,
    pending_retry: Option<AbortHandle>,
    task: Option<JoinHandle<()>>,
    on_event: EventCallback,
    on_error: ErrorCallback,
}

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.state == PollState::Polling
    }
}

/// Long-poll loop for one channel
pub struct PollClient<T: PollTransport> {
    transport: Arc<T>,
    channel: ChannelKey,
    backoff: BackoffStrategy,
    inner: Arc<Mutex<Inner>>,
}

impl<T: PollTransport> PollClient<T> {
    pub fn new(transport: Arc<T>, channel: ChannelKey) -> Self {
        Self {
            transport,
            channel,
            backoff: BackoffStrategy::default(),
            inner: Arc::new(Mutex::new(Inner {
                state: PollState::Idle,
                generation: 0,
                last_error: None,
                in_flight: None,
                pending_retry: None,
                task: None,
                on_event: Arc::new(|_| {}),
                on_error: Arc::new(|_| {}),
            })),
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn on_event(self, callback: impl Fn(PollEnvelope) + Send + Sync + 'static) -> Self {
        self.inner.lock().on_event = Arc::new(callback);
        self
    }

    pub fn on_error(self, callback: impl Fn(&PollError) + Send + Sync + 'static) -> Self {
        self.inner.lock().on_error = Arc::new(callback);
        self
    }

    /// Replace both callbacks; a running cycle uses them from its next outcome
    pub fn set_callbacks(&self, on_event: EventCallback, on_error: ErrorCallback) {
        let mut inner = self.inner.lock();
        inner.on_event = on_event;
        inner.on_error = on_error;
    }

    pub fn channel(&self) -> &ChannelKey {
        &self.channel
    }

    pub fn state(&self) -> PollState {
        self.inner.lock().state
    }

    pub fn is_active(&self) -> bool {
        self.state() == PollState::Polling
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    /// Begin polling. Must be called inside a tokio runtime.
    pub fn start(&self) {
        let mut inner = self.inner.lock();
        if inner.state == PollState::Polling {
            return;
        }

        inner.state = PollState::Polling;
        inner.last_error = None;
        inner.generation += 1;

        // A cycle whose stop() was never awaited may still be unwinding.
        if let Some(previous) = inner.task.take() {
            previous.abort();
        }

        tracing::debug!("[Client] Polling {}", self.channel);
        inner.task = Some(tokio::spawn(run_cycle(
            self.transport.clone(),
            self.channel.clone(),
            self.backoff.clone(),
            self.inner.clone(),
            inner.generation,
        )));
    }

    /// Stop polling and wait until the cycle has wound down. Idempotent.
    pub async fn stop(&self) {
        let task = {
            let mut inner = self.inner.lock();
            if inner.state == PollState::Polling {
                tracing::debug!("[Client] Stopping {}", self.channel);
            }
            inner.state = PollState::Idle;
            inner.generation += 1;
            if let Some(handle) = inner.in_flight.take() {
                handle.abort();
            }
            if let Some(handle) = inner.pending_retry.take() {
                handle.abort();
            }
            inner.task.take()
        };

        if let Some(task) = task {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!("[Client] Poll cycle for {} panicked", self.channel);
                }
            }
        }
    }

    /// Switch channels. The old cycle is fully stopped before a new one
    /// starts, and polling resumes only if it was active.
    pub async fn set_channel(&mut self, channel: ChannelKey) {
        if channel == self.channel {
            return;
        }
        let was_active = self.is_active();
        self.stop().await;
        tracing::debug!("[Client] Channel {} -> {}", self.channel, channel);
        self.channel = channel;
        if was_active {
            self.start();
        }
    }
}

impl<T: PollTransport> Drop for PollClient<T> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        inner.state = PollState::Idle;
        inner.generation += 1;
        if let Some(handle) = inner.in_flight.take() {
            handle.abort();
        }
        if let Some(handle) = inner.pending_retry.take() {
            handle.abort();
        }
        if let Some(task) = inner.task.take() {
            task.abort();
        }
    }
}

async fn run_cycle<T: PollTransport>(
    transport: Arc<T>,
    channel: ChannelKey,
    backoff: BackoffStrategy,
    inner: Arc<Mutex<Inner>>,
    generation: u64,
) {
    let mut failures: u32 = 0;

    loop {
        let request = {
            let mut guard = inner.lock();
            if !guard.is_current(generation) {
                return;
            }
            let (request, handle) = abortable(transport.poll(&channel));
            guard.in_flight = Some(handle);
            request
        };

        let result = request.await;

        let (on_event, on_error) = {
            let mut guard = inner.lock();
            if !guard.is_current(generation) {
                // stop() won the race with the response
                return;
            }
            guard.in_flight = None;
            (guard.on_event.clone(), guard.on_error.clone())
        };

        let error = match result {
            Err(_aborted) => return,
            Ok(Ok(PollResponse::Empty)) => {
                failures = 0;
                continue;
            }
            Ok(Ok(PollResponse::Event(envelope))) => {
                failures = 0;
                if !invoke_callback(&inner, generation, &channel, "event", || on_event(envelope)) {
                    return;
                }
                continue;
            }
            Ok(Err(PollError::Aborted)) => return,
            Ok(Err(error)) => error,
        };

        tracing::warn!("[Client] Poll on {} failed: {}", channel, error);
        {
            let mut guard = inner.lock();
            if !guard.is_current(generation) {
                return;
            }
            guard.last_error = Some(error.to_string());
        }
        if !invoke_callback(&inner, generation, &channel, "error", || on_error(&error)) {
            return;
        }

        if error.is_fatal() {
            let mut guard = inner.lock();
            if guard.generation == generation {
                guard.state = PollState::Idle;
            }
            tracing::info!("[Client] Stopped polling {} after {}", channel, error);
            return;
        }

        failures = failures.saturating_add(1);
        let delay = backoff.delay(failures);
        let timer = {
            let mut guard = inner.lock();
            if !guard.is_current(generation) {
                return;
            }
            let (timer, handle) = abortable(tokio::time::sleep(delay));
            guard.pending_retry = Some(handle);
            timer
        };

        tracing::debug!("[Client] Retrying {} in {:?}", channel, delay);
        if timer.await.is_err() {
            return;
        }
        inner.lock().pending_retry = None;
    }
}

/// Run a consumer callback. On panic the cycle's generation goes `Idle`
/// and `false` is returned so the caller can end the cycle.
fn invoke_callback(
    inner: &Mutex<Inner>,
    generation: u64,
    channel: &ChannelKey,
    kind: &str,
    callback: impl FnOnce(),
) -> bool {
    if catch_unwind(AssertUnwindSafe(callback)).is_ok() {
        return true;
    }

    tracing::error!("[Client] {} callback for {} panicked", kind, channel);
    let mut guard = inner.lock();
    if guard.generation == generation {
        guard.state = PollState::Idle;
        guard.in_flight = None;
        guard.pending_retry = None;
        guard.last_error = Some(format!("{} callback panicked", kind));
    }
    false
}
