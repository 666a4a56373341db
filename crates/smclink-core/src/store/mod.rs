// ── Device state store ──
//
// Single owner of `DeviceState`, connection health and the request epoch.
// Every request completion funnels through `StateStore::complete`.

mod ingest;
mod state_store;

pub use state_store::{Completion, Epoch, StateStore};
