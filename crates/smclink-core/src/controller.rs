// ── Controller abstraction ──
//
// Full lifecycle management for one SMC instance. Owns the poll timer,
// the command processor and the state store; every request, polled or
// commanded, completes through the store's epoch/health discipline.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::Value;
use smclink_api::{Endpoint, SmcClient};
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope, CommandResult, RequestOutcome};
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::event::ControllerEvent;
use crate::feedback::Feedback;
use crate::model::{DeviceState, HealthSnapshot};
use crate::store::{Completion, Epoch, StateStore};

const COMMAND_CHANNEL_SIZE: usize = 64;
const MISSING_ADDRESS: &str = "IP is not set";

// ── Poller state ─────────────────────────────────────────────────

/// Whether the repeating poll timer is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Running,
}

struct PollerHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Transport for the current configuration, or why there is none.
#[derive(Clone)]
enum ClientSlot {
    Ready(Arc<SmcClient>),
    Unconfigured(String),
}

impl ClientSlot {
    fn build(config: &ControllerConfig) -> Self {
        if !config.has_address() {
            return Self::Unconfigured(MISSING_ADDRESS.to_owned());
        }
        match SmcClient::new(
            &config.target_address,
            config.credentials(),
            &config.transport(),
        ) {
            Ok(client) => Self::Ready(Arc::new(client)),
            Err(e) => Self::Unconfigured(e.to_string()),
        }
    }
}

/// Per-endpoint outcome of one poll cycle.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub epoch: Epoch,
    pub results: Vec<(Endpoint, Completion)>,
}

impl PollReport {
    /// Number of completions written to the store.
    pub fn accepted(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, c)| matches!(c, Completion::Succeeded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, c)| matches!(c, Completion::Failed { .. }))
            .count()
    }
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for hosts.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Created idle:
/// [`init()`](Self::init) starts the command processor and the poller,
/// [`destroy()`](Self::destroy) stops both.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: RwLock<ControllerConfig>,
    client: RwLock<ClientSlot>,
    store: Arc<StateStore>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current init/destroy lifetime.
    cancel_child: Mutex<CancellationToken>,
    poller: Mutex<Option<PollerHandle>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    running: watch::Sender<bool>,
}

impl Controller {
    /// Create a controller from configuration. Does NOT start anything;
    /// call [`init()`](Self::init).
    pub fn new(config: ControllerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let (running, _) = watch::channel(false);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();
        let client = ClientSlot::build(&config);

        Self {
            inner: Arc::new(ControllerInner {
                config: RwLock::new(config),
                client: RwLock::new(client),
                store: Arc::new(StateStore::new()),
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                poller: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
                running,
            }),
        }
    }

    /// A copy of the current configuration.
    pub fn config(&self) -> ControllerConfig {
        self.inner
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Access the underlying StateStore.
    pub fn store(&self) -> &Arc<StateStore> {
        &self.inner.store
    }

    pub fn is_running(&self) -> bool {
        *self.inner.running.borrow()
    }

    fn client(&self) -> Result<Arc<SmcClient>, String> {
        match &*self.inner.client.read().unwrap_or_else(PoisonError::into_inner) {
            ClientSlot::Ready(client) => Ok(Arc::clone(client)),
            ClientSlot::Unconfigured(reason) => Err(reason.clone()),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start the command processor and the poller. A second call while
    /// running is a no-op.
    pub async fn init(&self) {
        if self.is_running() {
            return;
        }

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let handle = tokio::spawn(command_processor_task(self.clone(), rx, child));
            self.inner.task_handles.lock().await.push(handle);
        }

        let _ = self.inner.running.send_replace(true);
        self.start_polling().await;
        debug!("controller initialised");
    }

    /// Replace the configuration wholesale: re-derive credentials, rebuild
    /// the transport and restart the poller. Safe to call at any time;
    /// requests still in flight go through the normal staleness check.
    pub async fn config_updated(&self, config: ControllerConfig) {
        let client = ClientSlot::build(&config);
        *self
            .inner
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner) = config;
        *self
            .inner
            .client
            .write()
            .unwrap_or_else(PoisonError::into_inner) = client;
        debug!("configuration updated");

        if self.is_running() {
            self.stop_polling().await;
            self.start_polling().await;
        }
    }

    /// Stop the poller and the command processor, retire the current
    /// epoch and report `Disconnected`.
    pub async fn destroy(&self) {
        self.stop_polling().await;
        self.inner.cancel_child.lock().await.cancel();

        // The processor abandons an in-flight command on cancel, so these
        // joins return without waiting on the device.
        let handles: Vec<_> = self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }

        // Recreate the command channel so a later init can spawn a fresh receiver.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        self.inner.store.retire();
        let _ = self.inner.running.send_replace(false);
        debug!("controller destroyed");
    }

    // ── Poller ───────────────────────────────────────────────────

    /// Start the repeating poll timer. Idempotent: never creates a second
    /// timer. A zero poll interval leaves the poller idle.
    pub async fn start_polling(&self) {
        let period = self.config().poll_interval;
        if period.is_zero() {
            debug!("polling disabled");
            return;
        }

        let mut poller = self.inner.poller.lock().await;
        if poller.as_ref().is_some_and(|p| !p.handle.is_finished()) {
            return;
        }

        let cancel = self.inner.cancel.child_token();
        let handle = tokio::spawn(poll_task(self.clone(), period, cancel.clone()));
        *poller = Some(PollerHandle { cancel, handle });
        info!(interval_ms = period.as_millis(), "poller started");
    }

    /// Cancel the poll timer. Requests already sent are not aborted.
    pub async fn stop_polling(&self) {
        let Some(poller) = self.inner.poller.lock().await.take() else {
            return;
        };
        poller.cancel.cancel();
        let _ = poller.handle.await;
        debug!("poller stopped");
    }

    pub async fn poller_state(&self) -> PollerState {
        match self.inner.poller.lock().await.as_ref() {
            Some(p) if !p.handle.is_finished() => PollerState::Running,
            _ => PollerState::Idle,
        }
    }

    /// Run one poll cycle now and wait for every endpoint to complete.
    pub async fn refresh(&self) -> Result<PollReport, CoreError> {
        let epoch = self.inner.store.begin_cycle();
        self.poll_cycle(epoch).await
    }

    async fn poll_cycle(&self, epoch: Epoch) -> Result<PollReport, CoreError> {
        let store = &self.inner.store;
        let client = match self.client() {
            Ok(client) => client,
            Err(reason) => {
                store.mark_bad_config(epoch, &reason);
                return Err(CoreError::Configuration { message: reason });
            }
        };

        let requests = Endpoint::POLL_SET.into_iter().map(|endpoint| {
            let client = Arc::clone(&client);
            async move {
                let result = client.get(endpoint.path()).await.map_err(CoreError::from);
                (endpoint, store.complete(epoch, endpoint.path(), result))
            }
        });
        let results = join_all(requests).await;

        Ok(PollReport { epoch, results })
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command and wait for every POST it plans.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task. POST failures are reported per request in the
    /// [`CommandResult`] and have already updated connection health.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        cmd.validate()?;
        if !self.is_running() {
            return Err(CoreError::ControllerNotRunning);
        }

        let (tx, rx) = oneshot::channel();
        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerNotRunning)?;

        rx.await.map_err(|_| CoreError::ControllerNotRunning)?
    }

    /// Host-facing fire-and-forget dispatch by action identifier.
    ///
    /// Parameters are validated before anything is sent; a rejected
    /// command issues no request.
    pub fn execute_command(&self, name: &str, options: &Value) -> Result<(), CoreError> {
        let cmd = Command::from_options(name, options)?;
        if !self.is_running() {
            return Err(CoreError::ControllerNotRunning);
        }

        let controller = self.clone();
        tokio::spawn(async move {
            let action = cmd.kind();
            match controller.execute(cmd).await {
                Ok(result) => {
                    if let Some(e) = result.first_error() {
                        debug!(%action, error = %e, "command finished with errors");
                    }
                }
                Err(e) => warn!(%action, error = %e, "command not executed"),
            }
        });
        Ok(())
    }

    // ── Feedbacks ────────────────────────────────────────────────

    /// Evaluate a feedback by identifier against the current state.
    pub fn evaluate_feedback(&self, name: &str, options: &Value) -> Result<bool, CoreError> {
        let feedback = Feedback::from_options(name, options)?;
        Ok(feedback.evaluate(&self.inner.store.device()))
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: init without polling, run closure, destroy.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let controller = Controller::new(config.one_shot());
        controller.init().await;
        let result = f(controller.clone()).await;
        controller.destroy().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    pub fn device(&self) -> Arc<DeviceState> {
        self.inner.store.device()
    }

    pub fn health(&self) -> HealthSnapshot {
        self.inner.store.health()
    }

    pub fn subscribe_device(&self) -> watch::Receiver<Arc<DeviceState>> {
        self.inner.store.subscribe_device()
    }

    pub fn subscribe_health(&self) -> watch::Receiver<HealthSnapshot> {
        self.inner.store.subscribe_health()
    }

    /// Subscribe to the event broadcast stream.
    pub fn events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.inner.store.subscribe_events()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// One tick per `period`, the first immediately. Each tick allocates its
/// epoch up front and runs its requests on a separate task, so a slow
/// device never delays the timer.
async fn poll_task(controller: Controller, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let epoch = controller.inner.store.begin_cycle();
                let controller = controller.clone();
                tokio::spawn(async move {
                    let _ = controller.poll_cycle(epoch).await;
                });
            }
        }
    }
}

/// Process commands from the mpsc channel one at a time.
async fn command_processor_task(
    controller: Controller,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                // Dropping the envelope on cancel answers the caller with
                // ControllerNotRunning; the aborted POST never records.
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = route_command(&controller, envelope.command) => {
                        let _ = envelope.response_tx.send(result);
                    }
                }
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Send each planned POST in order. Every POST gets its own epoch and
/// completes through the store; a failure does not stop later POSTs.
async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let store = &controller.inner.store;
    let client = controller.client();
    debug!(action = %cmd.kind(), "executing command");

    let mut requests = Vec::new();
    for planned in cmd.plan() {
        let epoch = store.begin_cycle();
        let result = match &client {
            Ok(client) => client
                .post(planned.path, &planned.body)
                .await
                .map_err(CoreError::from),
            Err(reason) => Err(CoreError::Configuration {
                message: reason.clone(),
            }),
        };
        store.complete(epoch, planned.path, result.clone());
        requests.push(RequestOutcome {
            path: planned.path,
            result,
        });
    }

    Ok(CommandResult { requests })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::ConnectionHealth;

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let controller = Controller::new(ControllerConfig::default());
        controller.init().await;
        controller.start_polling().await;
        controller.start_polling().await;
        assert_eq!(controller.poller_state().await, PollerState::Running);

        // Ticks at 0, 1000, 2000 and 3000 ms: one timer, four cycles.
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(controller.store().cycles_started(), 4);
        assert_eq!(controller.health().status, ConnectionHealth::BadConfig);

        controller.destroy().await;
        assert_eq!(controller.poller_state().await, PollerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_never_polls() {
        let controller = Controller::new(ControllerConfig::default().one_shot());
        controller.init().await;
        assert_eq!(controller.poller_state().await, PollerState::Idle);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(controller.store().cycles_started(), 0);
        controller.destroy().await;
    }

    #[tokio::test]
    async fn execute_requires_init() {
        let controller = Controller::new(ControllerConfig::default());
        let err = controller.execute(Command::PowerOn).await.unwrap_err();
        assert!(matches!(err, CoreError::ControllerNotRunning));
    }

    #[tokio::test]
    async fn invalid_options_are_rejected_before_dispatch() {
        let controller = Controller::new(ControllerConfig::default().one_shot());
        controller.init().await;

        let err = controller
            .execute_command("send_notification", &json!({"duration": 60}))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert_eq!(controller.store().cycles_started(), 0);

        controller.destroy().await;
    }

    #[tokio::test]
    async fn command_without_address_is_bad_config() {
        let controller = Controller::new(ControllerConfig::default().one_shot());
        controller.init().await;

        let result = controller.execute(Command::FlashLcd).await.unwrap();
        assert!(matches!(
            result.first_error(),
            Some(CoreError::Configuration { .. })
        ));
        assert_eq!(controller.health().status, ConnectionHealth::BadConfig);

        controller.destroy().await;
        assert_eq!(controller.health().status, ConnectionHealth::Disconnected);
    }

    #[tokio::test]
    async fn unparseable_address_is_bad_config() {
        let config = ControllerConfig::new("http://", "", secrecy::SecretString::from(String::new()))
            .one_shot();
        let controller = Controller::new(config);
        let err = controller.refresh().await.unwrap_err();
        assert!(matches!(err, CoreError::Configuration { .. }));
        assert_eq!(controller.health().status, ConnectionHealth::BadConfig);
    }

    #[tokio::test]
    async fn https_address_is_bad_config() {
        let config = ControllerConfig::new(
            "https://10.0.0.2",
            "",
            secrecy::SecretString::from(String::new()),
        )
        .one_shot();
        let controller = Controller::new(config);
        assert!(controller.client().is_err());
        let err = controller.refresh().await.unwrap_err();
        assert!(matches!(err, CoreError::Configuration { .. }));
        assert_eq!(controller.health().status, ConnectionHealth::BadConfig);
    }
}
