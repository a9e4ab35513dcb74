use bevy_ecs::resource::Resource;
use bevy_log::{info, warn};
use std::collections::HashSet;

use crate::constants::MIN_API_VERSION;
use crate::host::HostBridge;

/// Soft compatibility gate for external callers.
///
/// A caller below the minimum version is warned about and remembered as
/// incompatible; nothing else happens to it.
#[derive(Resource, Debug)]
pub struct VersionGate {
    min_version: i32,
    compatible: HashSet<String>,
    rejected: HashSet<String>,
}

impl Default for VersionGate {
    fn default() -> Self {
        Self::with_min_version(MIN_API_VERSION)
    }
}

impl VersionGate {
    pub fn with_min_version(min_version: i32) -> Self {
        Self {
            min_version,
            compatible: HashSet::new(),
            rejected: HashSet::new(),
        }
    }

    #[inline]
    pub fn min_version(&self) -> i32 {
        self.min_version
    }

    pub fn verify(&mut self, version: i32, caller: &str, host: &mut dyn HostBridge) -> bool {
        if version < self.min_version {
            warn!(
                "Caller '{}' uses water API version {} (minimum {})",
                caller, version, self.min_version
            );
            host.show_message(&format!(
                "The mod '{caller}' is using an outdated water API, tell the author to update!"
            ));
            self.compatible.remove(caller);
            self.rejected.insert(caller.to_string());
            return false;
        }

        info!("Caller '{}' verified with water API version {}", caller, version);
        self.rejected.remove(caller);
        self.compatible.insert(caller.to_string());
        true
    }

    pub fn is_compatible(&self, caller: &str) -> bool {
        self.compatible.contains(caller)
    }

    pub fn is_rejected(&self, caller: &str) -> bool {
        self.rejected.contains(caller)
    }
}
