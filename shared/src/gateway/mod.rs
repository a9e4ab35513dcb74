//! Named-operation interface for external callers.
//!
//! ```text
//!  caller --(name, args)--> CapabilityTable::invoke --> handler(args, ctx)
//!                                 |                          |
//!                          signature check          WaterRegistry / HostBridge
//! ```
//!
//! The table is built once and never changes. The descriptors are published to
//! the host under [`crate::CAPABILITY_HANDLER_ID`] so callers can discover it.

mod ops;
mod table;
mod value;
mod version;

pub use table::{names, Capability, CapabilityDescriptor, CapabilityTable, Handler, Signature};
pub use value::{
    Args, PhysicalData, PhysicsData, RenderData, TideData, Value, ValueKind, WaveData,
};
pub use version::VersionGate;

use crate::host::HostBridge;
use crate::sync::ReplicaRole;
use crate::water::WaterRegistry;

/// Everything a handler may touch during one call.
pub struct GatewayContext<'a> {
    pub registry: &'a WaterRegistry,
    pub host: &'a mut dyn HostBridge,
    pub versions: &'a mut VersionGate,
    pub role: ReplicaRole,
}
