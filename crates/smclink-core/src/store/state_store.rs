// ── Central state store ──
//
// Holds the latest `DeviceState`, the connection-health latch and the
// request epoch behind one lock, so a completion's staleness check, health
// transition and field updates are applied as a single step. Readers get
// snapshots through `watch` channels; discrete changes go out on `broadcast`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, trace, warn};

use super::ingest;
use crate::error::CoreError;
use crate::event::{ControllerEvent, VariableUpdate};
use crate::model::{ConnectionHealth, DeviceState, HealthSnapshot};

/// Start marker of a request cycle. Allocated strictly increasing.
pub type Epoch = u64;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// What happened to one request completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A newer cycle already completed; the result was dropped.
    Stale,
    /// No usable address. `logged` is true if this call emitted the log line.
    BadConfig { logged: bool },
    /// Request failed. `logged` is true if this call emitted the log line.
    Failed { logged: bool },
    /// Request succeeded. `announced` is true on the first success after
    /// start or after a failure streak.
    Succeeded { announced: bool },
}

impl Completion {
    pub fn is_stale(self) -> bool {
        self == Self::Stale
    }
}

struct HealthLatch {
    status: ConnectionHealth,
    message: Option<String>,
    /// Suppresses repeat error logs until the next success.
    error_logged: bool,
    /// No request has succeeded since start.
    first_attempt: bool,
}

impl HealthLatch {
    fn fresh() -> Self {
        Self {
            status: ConnectionHealth::Disconnected,
            message: None,
            error_logged: false,
            first_attempt: true,
        }
    }
}

struct StoreInner {
    epoch: Epoch,
    device: DeviceState,
    latch: HealthLatch,
}

/// Owner of device state, health and the staleness epoch.
pub struct StateStore {
    inner: Mutex<StoreInner>,
    next_epoch: AtomicU64,
    device_tx: watch::Sender<Arc<DeviceState>>,
    health_tx: watch::Sender<HealthSnapshot>,
    events_tx: broadcast::Sender<ControllerEvent>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (device_tx, _) = watch::channel(Arc::new(DeviceState::default()));
        let (health_tx, _) = watch::channel(HealthSnapshot::default());
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            inner: Mutex::new(StoreInner {
                epoch: 0,
                device: DeviceState::default(),
                latch: HealthLatch::fresh(),
            }),
            next_epoch: AtomicU64::new(0),
            device_tx,
            health_tx,
            events_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Snapshots & subscriptions ────────────────────────────────────

    pub fn device(&self) -> Arc<DeviceState> {
        self.device_tx.borrow().clone()
    }

    pub fn health(&self) -> HealthSnapshot {
        self.health_tx.borrow().clone()
    }

    /// Epoch of the most recently accepted completion.
    pub fn epoch(&self) -> Epoch {
        self.lock().epoch
    }

    /// Number of epochs handed out so far.
    pub fn cycles_started(&self) -> u64 {
        self.next_epoch.load(Ordering::SeqCst)
    }

    pub fn subscribe_device(&self) -> watch::Receiver<Arc<DeviceState>> {
        self.device_tx.subscribe()
    }

    pub fn subscribe_health(&self) -> watch::Receiver<HealthSnapshot> {
        self.health_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events_tx.subscribe()
    }

    // ── Cycle bookkeeping ────────────────────────────────────────────

    /// Allocate the epoch for a new poll tick or command request.
    pub(crate) fn begin_cycle(&self) -> Epoch {
        self.next_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record a cycle skipped because the address is missing or unusable.
    pub(crate) fn mark_bad_config(&self, epoch: Epoch, reason: &str) -> Completion {
        let mut inner = self.lock();
        if epoch < inner.epoch {
            return Completion::Stale;
        }
        inner.epoch = epoch;

        let logged = !inner.latch.error_logged;
        if logged {
            warn!("{reason}");
            inner.latch.error_logged = true;
        }
        self.set_status(&mut inner, ConnectionHealth::BadConfig, Some(reason.to_owned()));
        Completion::BadConfig { logged }
    }

    /// Apply one request completion that started at `epoch`.
    pub(crate) fn complete(
        &self,
        epoch: Epoch,
        path: &str,
        outcome: Result<Value, CoreError>,
    ) -> Completion {
        let mut inner = self.lock();
        if epoch < inner.epoch {
            trace!(epoch, current = inner.epoch, path, "stale completion dropped");
            return Completion::Stale;
        }
        inner.epoch = epoch;

        let body = match outcome {
            Ok(body) => body,
            Err(CoreError::Configuration { message }) => {
                drop(inner);
                return self.mark_bad_config(epoch, &message);
            }
            Err(err) => {
                let message = format!("request to {path} failed ({err})");
                let logged = !inner.latch.error_logged;
                if logged {
                    error!("{message}");
                    inner.latch.error_logged = true;
                }
                self.set_status(&mut inner, ConnectionHealth::ConnectionFailure, Some(message));
                return Completion::Failed { logged };
            }
        };

        let announced = inner.latch.error_logged || inner.latch.first_attempt;
        if announced {
            if inner.latch.first_attempt {
                info!("connection succeeded");
            } else {
                info!("connection restored");
            }
            inner.latch.error_logged = false;
            inner.latch.first_attempt = false;
        }
        self.set_status(&mut inner, ConnectionHealth::Ok, None);

        let ingested = ingest::apply(&mut inner.device, path, &body);
        if !ingested.is_empty() {
            inner.device.last_updated = Some(Utc::now());
            let snapshot = Arc::new(inner.device.clone());
            let updates: Vec<VariableUpdate> = ingested
                .variables
                .iter()
                .map(|&variable| VariableUpdate {
                    variable,
                    value: snapshot.variable(variable),
                })
                .collect();
            self.device_tx.send_replace(snapshot);
            if !updates.is_empty() {
                let _ = self.events_tx.send(ControllerEvent::VariablesChanged(updates));
            }
            if !ingested.feedbacks.is_empty() {
                let _ = self
                    .events_tx
                    .send(ControllerEvent::CheckFeedbacks(ingested.feedbacks));
            }
        }

        Completion::Succeeded { announced }
    }

    /// Invalidate every epoch handed out so far and reset health.
    ///
    /// Requests still in flight complete as stale. Device fields keep their
    /// last values.
    pub(crate) fn retire(&self) {
        let epoch = self.begin_cycle();
        let mut inner = self.lock();
        inner.epoch = inner.epoch.max(epoch);
        inner.latch = HealthLatch::fresh();
        self.publish_health(&inner);
    }

    // ── Health ───────────────────────────────────────────────────────

    fn set_status(&self, inner: &mut StoreInner, status: ConnectionHealth, message: Option<String>) {
        let changed = inner.latch.status != status || inner.latch.message != message;
        inner.latch.status = status;
        inner.latch.message = message;
        if changed {
            self.publish_health(inner);
        }
    }

    fn publish_health(&self, inner: &StoreInner) {
        let snapshot = HealthSnapshot::new(inner.latch.status, inner.latch.message.clone());
        let status_changed = self.health_tx.borrow().status != snapshot.status;
        self.health_tx.send_replace(snapshot.clone());
        if status_changed {
            let _ = self.events_tx.send(ControllerEvent::HealthChanged(snapshot));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn power_body(on: bool) -> Value {
        json!({
            "System Power": on,
            "Power Overload": false,
            "Main Power Fault": false,
            "Power Control Fault": false
        })
    }

    fn server_error() -> CoreError {
        CoreError::Protocol {
            message: "HTTP 500: internal".into(),
            status: Some(500),
        }
    }

    #[test]
    fn epochs_increase() {
        let store = StateStore::new();
        let a = store.begin_cycle();
        let b = store.begin_cycle();
        assert!(b > a);
        assert_eq!(store.cycles_started(), 2);
    }

    #[test]
    fn stale_completion_leaves_state_unchanged() {
        let store = StateStore::new();
        let old = store.begin_cycle();
        let new = store.begin_cycle();

        let path = "/api/chassis/power/status";
        assert_eq!(
            store.complete(new, path, Ok(power_body(true))),
            Completion::Succeeded { announced: true }
        );
        let before = store.device();

        assert!(store.complete(old, path, Ok(power_body(false))).is_stale());
        assert!(store.complete(old, path, Err(server_error())).is_stale());

        assert_eq!(store.device(), before);
        assert_eq!(store.health().status, ConnectionHealth::Ok);
        assert_eq!(store.epoch(), new);
    }

    #[test]
    fn same_epoch_completions_are_all_accepted() {
        let store = StateStore::new();
        let epoch = store.begin_cycle();
        store.complete(epoch, "/api/session", Ok(json!({"role": "director"})));
        store.complete(epoch, "/api/chassis/power/status", Ok(power_body(true)));

        let device = store.device();
        assert_eq!(device.role.as_deref(), Some("director"));
        assert_eq!(device.system_power, Some(true));
    }

    #[test]
    fn failure_streak_logs_once_and_recovery_announces_once() {
        let store = StateStore::new();
        let path = "/api/localmachine";

        let first = store.begin_cycle();
        assert_eq!(
            store.complete(first, path, Err(server_error())),
            Completion::Failed { logged: true }
        );
        assert_eq!(store.health().status, ConnectionHealth::ConnectionFailure);

        let second = store.begin_cycle();
        assert_eq!(
            store.complete(second, path, Err(server_error())),
            Completion::Failed { logged: false }
        );

        let third = store.begin_cycle();
        assert_eq!(
            store.complete(third, "/api/vfcs", Ok(json!({}))),
            Completion::Succeeded { announced: true }
        );
        assert_eq!(
            store.complete(third, "/api/vfcs", Ok(json!({}))),
            Completion::Succeeded { announced: false }
        );
        assert_eq!(store.health(), HealthSnapshot::new(ConnectionHealth::Ok, None));
    }

    #[test]
    fn bad_config_is_latched() {
        let store = StateStore::new();
        let first = store.begin_cycle();
        assert_eq!(
            store.mark_bad_config(first, "IP is not set"),
            Completion::BadConfig { logged: true }
        );
        let second = store.begin_cycle();
        assert_eq!(
            store.mark_bad_config(second, "IP is not set"),
            Completion::BadConfig { logged: false }
        );
        assert_eq!(store.health().status, ConnectionHealth::BadConfig);
        assert_eq!(store.epoch(), second);
    }

    #[test]
    fn configuration_error_completion_is_bad_config() {
        let store = StateStore::new();
        let epoch = store.begin_cycle();
        let completion = store.complete(
            epoch,
            "/api/session",
            Err(CoreError::Configuration {
                message: "invalid address".into(),
            }),
        );
        assert_eq!(completion, Completion::BadConfig { logged: true });
        assert_eq!(store.health().status, ConnectionHealth::BadConfig);
    }

    #[test]
    fn power_fault_flag_for_all_fault_combinations() {
        let store = StateStore::new();
        for bits in 0u8..8 {
            let epoch = store.begin_cycle();
            let body = json!({
                "System Power": true,
                "Power Overload": bits & 1 != 0,
                "Main Power Fault": bits & 2 != 0,
                "Power Control Fault": bits & 4 != 0
            });
            store.complete(epoch, "/api/chassis/power/status", Ok(body));
            assert_eq!(store.device().power_fault, Some(bits != 0), "bits={bits:03b}");
        }
    }

    #[test]
    fn retire_makes_in_flight_requests_stale() {
        let store = StateStore::new();
        let epoch = store.begin_cycle();
        store.complete(epoch, "/api/session", Ok(json!({"role": "actor"})));
        let in_flight = store.begin_cycle();

        store.retire();
        assert_eq!(store.health().status, ConnectionHealth::Disconnected);
        assert!(
            store
                .complete(in_flight, "/api/session", Ok(json!({"role": "director"})))
                .is_stale()
        );
        assert_eq!(store.device().role.as_deref(), Some("actor"));

        // The first success after a restart is announced again.
        let next = store.begin_cycle();
        assert_eq!(
            store.complete(next, "/api/vfcs", Ok(json!({}))),
            Completion::Succeeded { announced: true }
        );
    }

    #[test]
    fn events_follow_ingestion() {
        let store = StateStore::new();
        let mut events = store.subscribe_events();

        let epoch = store.begin_cycle();
        store.complete(epoch, "/api/chassis/power/status", Ok(power_body(true)));

        assert!(matches!(
            events.try_recv(),
            Ok(ControllerEvent::HealthChanged(HealthSnapshot {
                status: ConnectionHealth::Ok,
                ..
            }))
        ));
        match events.try_recv() {
            Ok(ControllerEvent::VariablesChanged(updates)) => assert_eq!(updates.len(), 4),
            other => panic!("expected VariablesChanged, got {other:?}"),
        }
        assert!(matches!(
            events.try_recv(),
            Ok(ControllerEvent::CheckFeedbacks(kinds)) if kinds.len() == 2
        ));
    }
}
