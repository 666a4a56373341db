// ── Domain model ──
//
// Flat, host-facing snapshots derived from device responses. Fields start
// unknown (`None`) and are only ever overwritten by a fresh decode.

mod device;
mod health;

pub use device::{DeviceState, VariableValue};
pub use health::{ConnectionHealth, HealthSnapshot};
