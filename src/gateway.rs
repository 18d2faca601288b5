//! Gateway instances: shared state, public API, and the poll scheduler.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use futures::future::BoxFuture;
use log::debug;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    config::GatewayConfig,
    error::{GatewayError, HandlerError},
    hooks::GatewayHooks,
    message::{
        CompositeId, Location, Message, Outbound, Segment, SendCallback, TransmitOutcome,
    },
    pipeline,
    runner::{CommandRunner, GammuRunner},
    store::{MemoryStore, Persistence, SegmentStore},
};

/// Record that owns a location scheduled for deletion.
#[derive(Clone, Debug)]
pub(crate) struct DeletionOwner {
    pub(crate) from: String,
    pub(crate) id: Option<CompositeId>,
}

/// Mutable per-instance queues and indices.
///
/// The poll scheduler is the single writer apart from [`Gateway::send`]
/// appending outbound items; every access holds the lock for a plain data
/// update only, never across subprocess I/O or handler invocations.
#[derive(Default)]
pub(crate) struct State {
    /// Fully-received messages awaiting delivery within the current poll.
    pub(crate) inbound: VecDeque<Message>,
    /// Outbound items awaiting transmission, in submission order.
    pub(crate) outbound: VecDeque<Outbound>,
    /// Modem locations owed to the helper's `delete` command.
    pub(crate) deletions: HashMap<Location, DeletionOwner>,
}

/// Shared core behind a [`Gateway`] and its poll task.
pub(crate) struct GatewayCore {
    pub(crate) config: GatewayConfig,
    pub(crate) runner: Arc<dyn CommandRunner>,
    store: Mutex<Arc<dyn SegmentStore>>,
    hooks: Mutex<GatewayHooks>,
    state: Mutex<State>,
    polling: AtomicBool,
}

impl GatewayCore {
    fn new(config: GatewayConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            runner,
            store: Mutex::new(Arc::new(MemoryStore::new())),
            hooks: Mutex::new(GatewayHooks::default()),
            state: Mutex::new(State::default()),
            polling: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the handler table.
    pub(crate) fn hooks(&self) -> GatewayHooks {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_hook(&self, set: impl FnOnce(&mut GatewayHooks)) {
        set(&mut self.hooks.lock().unwrap_or_else(PoisonError::into_inner));
    }

    pub(crate) fn segment_store(&self) -> Arc<dyn SegmentStore> {
        Arc::clone(&self.store.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Deliver an error to the `error` hook, logged under its scope.
    pub(crate) fn report(&self, error: GatewayError) {
        log::warn!("{} error: {error}", error.scope());
        self.hooks().error(&error);
    }
}

/// Coordinator between an embedding application and a `gammu-json` helper.
///
/// A gateway owns the outbound queue and deletion index for one modem and
/// drives the helper on a fixed cadence: each poll cycle receives, deletes,
/// and transmits, in that order. Lifecycle events reach the embedder through
/// the `on_*` handler registrations.
///
/// # Examples
///
/// ```no_run
/// use smsgate::{Gateway, GatewayConfig};
///
/// # async fn demo() {
/// let gateway = Gateway::new(GatewayConfig::default());
/// gateway.on_receive(|message| {
///     Box::pin(async move {
///         println!("from {}: {}", message.from, message.content);
///         Ok(())
///     })
/// });
/// gateway.start();
/// # }
/// ```
pub struct Gateway {
    core: Arc<GatewayCore>,
    poll: Mutex<Option<CancellationToken>>,
}

impl Gateway {
    /// Create a gateway that spawns the helper named in `config`.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let config = config.normalised();
        let runner: Arc<dyn CommandRunner> = match &config.prefix {
            Some(prefix) => Arc::new(GammuRunner::with_prefix(&config.command, prefix)),
            None => Arc::new(GammuRunner::new(&config.command)),
        };
        Self::with_runner(config, runner)
    }

    /// Create a gateway over an arbitrary [`CommandRunner`].
    ///
    /// Embedders use this to fake the helper in tests or to interpose on its
    /// invocations.
    #[must_use]
    pub fn with_runner(config: GatewayConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            core: Arc::new(GatewayCore::new(config.normalised(), runner)),
            poll: Mutex::new(None),
        }
    }

    /// Replace the segment store backing unhooked persistence events.
    ///
    /// The default is the in-memory [`MemoryStore`]; a durable store makes
    /// segment deletion safe before the composite completes.
    pub fn set_segment_store(&self, store: Arc<dyn SegmentStore>) {
        *self
            .core
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = store;
    }

    /// Begin polling. A no-op when the gateway is already polling.
    pub fn start(&self) {
        let mut poll = self.poll.lock().unwrap_or_else(PoisonError::into_inner);
        if poll.is_some() {
            return;
        }
        self.core.polling.store(true, Ordering::SeqCst);
        let token = CancellationToken::new();
        tokio::spawn(poll_loop(Arc::clone(&self.core), token.clone()));
        *poll = Some(token);
        debug!("polling started: interval={:?}", self.core.config.interval);
    }

    /// Stop polling after the in-flight poll cycle, if any, completes.
    ///
    /// In-flight helper subprocesses run to completion; [`Gateway::start`]
    /// resumes polling afterwards.
    pub fn stop(&self) {
        self.core.polling.store(false, Ordering::SeqCst);
        if let Some(token) = self
            .poll
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
            debug!("polling stopped");
        }
    }

    /// Whether the poll scheduler is active.
    #[must_use]
    pub fn is_polling(&self) -> bool { self.core.polling.load(Ordering::SeqCst) }

    /// Run one poll cycle (receive, delete, transmit) to completion.
    ///
    /// An alternative to [`Gateway::start`] for embedders that drive the
    /// cadence themselves; do not mix the two.
    pub async fn poll_once(&self) { pipeline::tick(&self.core).await; }

    /// Queue an outbound message for the next transmit phase.
    pub fn send(&self, to: impl Into<String>, content: impl Into<String>) {
        self.core.state().outbound.push_back(Outbound::new(to, content));
    }

    /// Queue an outbound message with a completion callback.
    ///
    /// The callback fires exactly once: with the helper's verdict on
    /// success, or with the final error once attempts are exhausted.
    pub fn send_with_callback(
        &self,
        to: impl Into<String>,
        content: impl Into<String>,
        callback: impl FnOnce(Result<&TransmitOutcome, &GatewayError>) + Send + 'static,
    ) {
        let item = Outbound::new(to, content).with_callback(Box::new(callback) as SendCallback);
        self.core.state().outbound.push_back(item);
    }

    /// Outbound items waiting for a transmit phase.
    #[must_use]
    pub fn pending_outbound(&self) -> usize { self.core.state().outbound.len() }

    /// Modem locations waiting for a delete phase.
    #[must_use]
    pub fn pending_deletions(&self) -> usize { self.core.state().deletions.len() }

    /// Register the terminal delivery handler.
    ///
    /// Returning `Ok` acknowledges the message: its locations are scheduled
    /// for deletion and, for composites, stored segments are released.
    /// Returning `Err` refuses it; the message stays on the modem and is
    /// re-delivered on a later poll.
    pub fn on_receive<H>(&self, handler: H)
    where
        H: Fn(Message) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync + 'static,
    {
        self.core.set_hook(|hooks| hooks.receive = Some(Arc::new(handler)));
    }

    /// Register the fire-and-forget transmit notification.
    pub fn on_transmit<H>(&self, handler: H)
    where
        H: Fn(&Outbound, &TransmitOutcome) + Send + Sync + 'static,
    {
        self.core.set_hook(|hooks| hooks.transmit = Some(Arc::new(handler)));
    }

    /// Register the error handler for all scopes.
    pub fn on_error<H>(&self, handler: H)
    where
        H: Fn(&GatewayError) + Send + Sync + 'static,
    {
        self.core.set_hook(|hooks| hooks.error = Some(Arc::new(handler)));
    }

    /// Register durable persistence for one inbound segment.
    ///
    /// Reporting [`Persistence::Durable`] permits the gateway to delete the
    /// modem copy before the whole group has arrived: the gateway owns the
    /// segment's location from that moment, so the persisted copy should
    /// drop it. A stored location that resurfaces through `return_segments`
    /// only costs a redundant delete of an already-empty slot.
    pub fn on_receive_segment<H>(&self, handler: H)
    where
        H: Fn(Segment) -> BoxFuture<'static, Result<Persistence, HandlerError>>
            + Send
            + Sync
            + 'static,
    {
        self.core
            .set_hook(|hooks| hooks.receive_segment = Some(Arc::new(handler)));
    }

    /// Register retrieval of all stored segments for a group.
    pub fn on_return_segments<H>(&self, handler: H)
    where
        H: Fn(CompositeId) -> BoxFuture<'static, Result<Vec<Segment>, HandlerError>>
            + Send
            + Sync
            + 'static,
    {
        self.core
            .set_hook(|hooks| hooks.return_segments = Some(Arc::new(handler)));
    }

    /// Register the notification that a group's stored segments may be
    /// discarded.
    pub fn on_release_segments<H>(&self, handler: H)
    where
        H: Fn(CompositeId) + Send + Sync + 'static,
    {
        self.core
            .set_hook(|hooks| hooks.release_segments = Some(Arc::new(handler)));
    }
}

impl Drop for Gateway {
    fn drop(&mut self) { self.stop(); }
}

/// Scheduler task: run a poll cycle, then wait out the configured interval.
///
/// The interval runs from the completion of one cycle to the start of the
/// next, so a slow cycle delays its successor instead of overlapping it.
async fn poll_loop(core: Arc<GatewayCore>, token: CancellationToken) {
    loop {
        pipeline::tick(&core).await;
        tokio::select! {
            () = token.cancelled() => break,
            () = sleep(core.config.interval) => {}
        }
    }
}
