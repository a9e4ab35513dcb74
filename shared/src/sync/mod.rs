//! Whole-registry state synchronization between replicas.
//!
//! There is no delta protocol: a snapshot always carries every body and the
//! receiver swaps its registry for the decoded one. A payload that fails to
//! decode is rejected whole and the registry keeps its last good state.

pub mod codec;

use bevy_log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::WaterResult;
use crate::host::{HostBridge, SyncTarget};
use crate::water::WaterRegistry;
use crate::{game_message_to_payload, payload_to_game_message};
use codec::{decode_body, encode_body, TaggedRecord};

pub const SNAPSHOT_FORMAT: u16 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SnapshotEnvelope {
    pub format: u16,
    pub records: Vec<TaggedRecord>,
}

/// Which side of the sync relationship this process is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicaRole {
    Authority,
    Mirror,
}

impl ReplicaRole {
    pub fn sync_target(self) -> SyncTarget {
        match self {
            ReplicaRole::Authority => SyncTarget::Peers,
            ReplicaRole::Mirror => SyncTarget::Authority,
        }
    }
}

/// Serializes every body of the registry.
pub fn snapshot(registry: &WaterRegistry) -> WaterResult<Vec<u8>> {
    let mut ids: Vec<_> = registry.ids().collect();
    ids.sort();

    let records = ids
        .into_iter()
        .map(|id| registry.get(id).and_then(encode_body))
        .collect::<WaterResult<Vec<_>>>()?;

    game_message_to_payload(&SnapshotEnvelope {
        format: SNAPSHOT_FORMAT,
        records,
    })
}

/// Replaces the registry with the snapshot's bodies, or leaves it untouched on error.
///
/// Returns the number of bodies now registered.
pub fn apply(registry: &mut WaterRegistry, payload: &[u8]) -> WaterResult<usize> {
    let decoded = decode_snapshot(payload);
    let bodies = match decoded {
        Ok(bodies) => bodies,
        Err(err) => {
            error!("Rejected water snapshot of {} bytes: {}", payload.len(), err);
            return Err(err);
        }
    };

    let count = bodies.len();
    registry.replace_all(bodies);
    info!("Applied water snapshot with {} bodies", count);
    Ok(count)
}

fn decode_snapshot(payload: &[u8]) -> WaterResult<HashMap<crate::water::BodyId, crate::water::WaterBody>> {
    let envelope: SnapshotEnvelope = payload_to_game_message(payload)?;
    if envelope.format != SNAPSHOT_FORMAT {
        debug!(
            "Snapshot format {} differs from ours ({}), decoding known fields only",
            envelope.format, SNAPSHOT_FORMAT
        );
    }

    let mut bodies = HashMap::with_capacity(envelope.records.len());
    for record in &envelope.records {
        let body = decode_body(record)?;
        bodies.insert(body.body_id, body);
    }
    Ok(bodies)
}

/// Sends a full snapshot to the other side. Fire and forget.
pub fn force_sync(
    registry: &WaterRegistry,
    role: ReplicaRole,
    host: &mut dyn HostBridge,
) -> WaterResult<()> {
    let payload = snapshot(registry)?;
    debug!(
        "Forcing water sync of {} bodies to {:?}",
        registry.len(),
        role.sync_target()
    );
    host.send_snapshot(role.sync_target(), payload);
    Ok(())
}
