//! Subprocess interface to the adb tool
//!
//! The bridge is an opaque executable driven through its CLI: `devices`,
//! `connect`, `disconnect`, and `wait-for-device`. Exit codes and stdout
//! text are the only contract consumed; stderr is ignored.

mod parse;
mod runner;

pub use parse::{parse_devices, DeviceRecord, DeviceState};
pub use runner::{BridgeOutput, BridgeRunner};
