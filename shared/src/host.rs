//! Interface to the collaborators this crate does not own: message display,
//! effects, chat commands and the replica transport.

use bevy::math::DVec3;
use serde::{Deserialize, Serialize};

use crate::gateway::CapabilityDescriptor;

/// Where a forced snapshot goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncTarget {
    /// Every other replica (sent by the authority)
    Peers,
    /// The authority (sent by a mirror)
    Authority,
}

pub trait HostBridge {
    /// User-visible notification.
    fn show_message(&mut self, text: &str);
    fn create_splash(&mut self, position: DVec3, radius: f32, audible: bool);
    fn create_bubble(&mut self, position: DVec3, radius: f32);
    fn run_command(&mut self, text: &str);
    /// Hands a serialized snapshot to the transport. Delivery is not confirmed.
    fn send_snapshot(&mut self, target: SyncTarget, payload: Vec<u8>);
    fn publish_capabilities(&mut self, handler_id: u16, capabilities: Vec<CapabilityDescriptor>);
}

/// Everything a [`QueuedHost`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum HostAction {
    ShowMessage(String),
    Splash {
        position: DVec3,
        radius: f32,
        audible: bool,
    },
    Bubble {
        position: DVec3,
        radius: f32,
    },
    RunCommand(String),
    Snapshot {
        target: SyncTarget,
        payload: Vec<u8>,
    },
    PublishCapabilities {
        handler_id: u16,
        capabilities: Vec<CapabilityDescriptor>,
    },
}

/// Host bridge that records requests so the caller can route them later.
#[derive(Debug, Default)]
pub struct QueuedHost {
    actions: Vec<HostAction>,
}

impl QueuedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[HostAction] {
        &self.actions
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, HostAction> {
        self.actions.drain(..)
    }
}

impl HostBridge for QueuedHost {
    fn show_message(&mut self, text: &str) {
        self.actions.push(HostAction::ShowMessage(text.to_string()));
    }

    fn create_splash(&mut self, position: DVec3, radius: f32, audible: bool) {
        self.actions.push(HostAction::Splash {
            position,
            radius,
            audible,
        });
    }

    fn create_bubble(&mut self, position: DVec3, radius: f32) {
        self.actions.push(HostAction::Bubble { position, radius });
    }

    fn run_command(&mut self, text: &str) {
        self.actions.push(HostAction::RunCommand(text.to_string()));
    }

    fn send_snapshot(&mut self, target: SyncTarget, payload: Vec<u8>) {
        self.actions.push(HostAction::Snapshot { target, payload });
    }

    fn publish_capabilities(&mut self, handler_id: u16, capabilities: Vec<CapabilityDescriptor>) {
        self.actions.push(HostAction::PublishCapabilities {
            handler_id,
            capabilities,
        });
    }
}
