//! Messages exchanged between the authority and its mirrors.

use bevy::math::DVec3;
use serde::{Deserialize, Serialize};

use crate::gateway::{CapabilityDescriptor, Value};

pub type PeerId = u64;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InvokeRequest {
    pub request_id: u32,
    pub name: String,
    pub args: Vec<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InvokeResponse {
    pub request_id: u32,
    pub result: Result<Value, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum EffectEvent {
    Splash {
        position: DVec3,
        radius: f32,
        audible: bool,
    },
    Bubble {
        position: DVec3,
        radius: f32,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ClientToServerMessage {
    /// Ask the authority for a full snapshot
    RequestSync,
    /// Full snapshot pushed by a mirror
    Snapshot(Vec<u8>),
    Invoke(InvokeRequest),
    SaveWorldRequest,
    Exit,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ServerToClientMessage {
    Snapshot(Vec<u8>),
    Capabilities {
        handler_id: u16,
        capabilities: Vec<CapabilityDescriptor>,
    },
    InvokeResult(InvokeResponse),
    Effect(EffectEvent),
    Notice(String),
}

impl From<InvokeResponse> for ServerToClientMessage {
    fn from(response: InvokeResponse) -> Self {
        ServerToClientMessage::InvokeResult(response)
    }
}

impl From<EffectEvent> for ServerToClientMessage {
    fn from(effect: EffectEvent) -> Self {
        ServerToClientMessage::Effect(effect)
    }
}
