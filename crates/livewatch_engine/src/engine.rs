use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{mpsc, Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::FutureExt;
use livewatch_core::{
    update, ConnectionState, CycleFailure, CycleId, Effect, Msg, SchedulerState, SchedulerView,
    Snapshot,
};
use thiserror::Error;
use tokio::sync::{mpsc as async_mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::config::{Clock, ConfigError, WatchConfig};
use crate::dispatch::{ChannelSink, NotificationDispatcher, NotificationSink};
use crate::fetch::SnapshotFetcher;
use crate::EngineEvent;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Environment signals delivered by whatever adapter watches the dashboard
/// (tab visibility, network reachability).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    VisibilityLost,
    VisibilityRegained,
    NetworkLost,
    NetworkRegained,
}

impl LifecycleSignal {
    fn into_msg(self) -> Msg {
        match self {
            Self::VisibilityLost => Msg::VisibilityLost,
            Self::VisibilityRegained => Msg::VisibilityRegained,
            Self::NetworkLost => Msg::NetworkLost,
            Self::NetworkRegained => Msg::NetworkRegained,
        }
    }
}

/// Values the driver publishes for readers between cycles.
struct Shared {
    snapshot: RwLock<Arc<Snapshot>>,
    view: Mutex<SchedulerView>,
}

/// Owner-side handle to the polling engine.
///
/// The scheduler state lives on a dedicated thread running a single-threaded
/// tokio runtime; every method here only posts a message to it. Dropping the
/// handle stops the engine and waits for the thread to exit.
pub struct EngineHandle {
    msg_tx: async_mpsc::UnboundedSender<Msg>,
    event_rx: mpsc::Receiver<EngineEvent>,
    status_rx: watch::Receiver<ConnectionState>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(config: WatchConfig, fetcher: Arc<dyn SnapshotFetcher>) -> Result<Self, EngineError> {
        Self::with_sinks(config, fetcher, Vec::new())
    }

    /// Like [`EngineHandle::new`], with extra notification sinks that are
    /// served after the engine's own event channel.
    pub fn with_sinks(
        config: WatchConfig,
        fetcher: Arc<dyn SnapshotFetcher>,
        sinks: Vec<Arc<dyn NotificationSink>>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (msg_tx, msg_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let state = SchedulerState::new(config.scheduler_config());
        let (status_tx, status_rx) = watch::channel(state.connection_state());
        let shared = Arc::new(Shared {
            snapshot: RwLock::new(state.snapshot().clone()),
            view: Mutex::new(state.view()),
        });

        let mut all_sinks: Vec<Arc<dyn NotificationSink>> =
            vec![Arc::new(ChannelSink::new(event_tx.clone()))];
        all_sinks.extend(sinks);

        let driver = Driver {
            state,
            fetcher,
            dispatcher: NotificationDispatcher::new(all_sinks),
            loopback: msg_tx.clone(),
            event_tx,
            status_tx,
            shared: shared.clone(),
            shutdown: CancellationToken::new(),
            timer: None,
            clock: config.clock,
        };

        let worker = thread::Builder::new()
            .name("livewatch-engine".to_string())
            .spawn(move || runtime.block_on(driver.run(msg_rx)))?;

        Ok(Self {
            msg_tx,
            event_rx,
            status_rx,
            shared,
            worker: Some(worker),
        })
    }

    pub fn start(&self) {
        self.send(Msg::Start);
    }

    pub fn pause(&self) {
        self.send(Msg::Pause);
    }

    pub fn resume(&self) {
        self.send(Msg::Resume);
    }

    /// Runs one cycle now, queued behind any cycle already in flight.
    pub fn force_tick(&self) {
        self.send(Msg::ForceTick);
    }

    pub fn stop(&self) {
        self.send(Msg::Stop);
    }

    pub fn signal(&self, signal: LifecycleSignal) {
        self.send(signal.into_msg());
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.status_rx.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionState> {
        self.status_rx.clone()
    }

    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        self.shared
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn metrics(&self) -> SchedulerView {
        self.shared
            .view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, msg: Msg) {
        // A closed channel means the engine already stopped.
        let _ = self.msg_tx.send(msg);
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.send(Msg::Stop);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Sole owner and writer of the scheduler state.
struct Driver {
    state: SchedulerState,
    fetcher: Arc<dyn SnapshotFetcher>,
    dispatcher: NotificationDispatcher,
    loopback: async_mpsc::UnboundedSender<Msg>,
    event_tx: mpsc::Sender<EngineEvent>,
    status_tx: watch::Sender<ConnectionState>,
    shared: Arc<Shared>,
    shutdown: CancellationToken,
    timer: Option<(u64, CancellationToken)>,
    clock: Option<Clock>,
}

impl Driver {
    async fn run(mut self, mut msg_rx: async_mpsc::UnboundedReceiver<Msg>) {
        engine_info!("engine started");
        while let Some(msg) = msg_rx.recv().await {
            if self.handle(msg) == Flow::Stop {
                break;
            }
        }
        self.shutdown.cancel();
        engine_info!("engine stopped");
    }

    fn handle(&mut self, msg: Msg) -> Flow {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        let mut flow = Flow::Continue;
        for effect in effects {
            if self.apply(effect) == Flow::Stop {
                flow = Flow::Stop;
            }
        }
        *self.shared.view.lock().unwrap_or_else(PoisonError::into_inner) = self.state.view();
        flow
    }

    fn apply(&mut self, effect: Effect) -> Flow {
        match effect {
            Effect::ArmTimer { generation, after } => self.arm_timer(generation, after),
            Effect::CancelTimer { generation } => self.cancel_timer(generation),
            Effect::BeginFetch { cycle } => self.begin_fetch(cycle),
            Effect::SnapshotReplaced(snapshot) => self.publish_snapshot(snapshot),
            Effect::Publish {
                cycle,
                changes,
                notifications,
            } => {
                engine_logging::set_cycle(cycle);
                engine_info!(
                    "{} added, {} resolved, {} status changes",
                    changes.added.len(),
                    changes.resolved.len(),
                    changes.status_changed.len()
                );
                self.dispatcher.dispatch(cycle, &notifications);
            }
            Effect::StatusChanged(transition) => {
                engine_debug!("connection {} -> {}", transition.from, transition.to);
                self.status_tx.send_replace(transition.to);
                let _ = self.event_tx.send(EngineEvent::StatusChanged(transition));
            }
            Effect::CycleFailed { cycle, message } => {
                engine_logging::set_cycle(cycle);
                engine_warn!("fetch failed: {}", message);
                let _ = self.event_tx.send(EngineEvent::CycleFailed { cycle, message });
            }
            Effect::Shutdown => {
                self.shutdown.cancel();
                self.timer = None;
                self.publish_snapshot(self.state.snapshot().clone());
                let _ = self.event_tx.send(EngineEvent::Stopped);
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    fn arm_timer(&mut self, generation: u64, after: Duration) {
        if let Some((_, previous)) = self.timer.take() {
            previous.cancel();
        }
        let token = self.shutdown.child_token();
        let cancelled = token.clone();
        let loopback = self.loopback.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(after) => {
                    let _ = loopback.send(Msg::TimerFired { generation });
                }
            }
        });
        self.timer = Some((generation, token));
    }

    fn cancel_timer(&mut self, generation: u64) {
        if self.timer.as_ref().is_some_and(|(armed, _)| *armed == generation) {
            if let Some((_, token)) = self.timer.take() {
                token.cancel();
            }
        }
    }

    fn begin_fetch(&self, cycle: CycleId) {
        engine_logging::set_cycle(cycle);
        engine_debug!("fetching records");

        let fetcher = self.fetcher.clone();
        let loopback = self.loopback.clone();
        let shutdown = self.shutdown.clone();
        let clock = self.clock.clone();
        tokio::spawn(async move {
            // No engine-level timeout: a stalled fetch delays the next tick.
            let fetch = AssertUnwindSafe(fetcher.fetch()).catch_unwind();
            let outcome = tokio::select! {
                _ = shutdown.cancelled() => return,
                outcome = fetch => outcome,
            };
            // A panic still completes the cycle, as a failure.
            let result = match outcome {
                Ok(result) => result.map_err(|err| CycleFailure::new(err.to_string())),
                Err(panic) => Err(CycleFailure::new(format!(
                    "fetch panicked: {}",
                    panic_message(panic.as_ref())
                ))),
            };
            let finished_at = clock.as_deref().map(|clock| clock());
            let _ = loopback.send(Msg::CycleCompleted {
                cycle,
                result,
                finished_at,
            });
        });
    }

    fn publish_snapshot(&self, snapshot: Arc<Snapshot>) {
        *self
            .shared
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
