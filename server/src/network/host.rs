//! Routes what the water system asks of its host to connected clients.

use bevy_log::{debug, info};
use bevy_renet::renet::{ClientId, RenetServer};
use shared::host::{HostAction, SyncTarget};
use shared::messages::{EffectEvent, ServerToClientMessage};

use super::extensions::SendGameMessageExtension;

/// Turns a host request into the message every client should receive.
///
/// The authority has no one above it, so snapshots meant for the authority
/// are dropped.
pub fn route_action(action: HostAction) -> Option<ServerToClientMessage> {
    match action {
        HostAction::ShowMessage(text) => Some(ServerToClientMessage::Notice(text)),
        HostAction::Splash {
            position,
            radius,
            audible,
        } => Some(
            EffectEvent::Splash {
                position,
                radius,
                audible,
            }
            .into(),
        ),
        HostAction::Bubble { position, radius } => {
            Some(EffectEvent::Bubble { position, radius }.into())
        }
        HostAction::RunCommand(text) => {
            info!("Water command requested: {}", text);
            Some(ServerToClientMessage::Notice(text))
        }
        HostAction::Snapshot {
            target: SyncTarget::Peers,
            payload,
        } => Some(ServerToClientMessage::Snapshot(payload)),
        HostAction::Snapshot {
            target: SyncTarget::Authority,
            ..
        } => {
            debug!("Dropping snapshot addressed to the authority");
            None
        }
        HostAction::PublishCapabilities {
            handler_id,
            capabilities,
        } => Some(ServerToClientMessage::Capabilities {
            handler_id,
            capabilities,
        }),
    }
}

/// Who receives a host request raised while serving one caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Caller,
    Everyone,
}

/// Messages are meant for whoever triggered them; effects and state are shared.
pub fn audience(action: &HostAction) -> Audience {
    match action {
        HostAction::ShowMessage(_) => Audience::Caller,
        _ => Audience::Everyone,
    }
}

pub fn flush_caller_actions(
    server: &mut RenetServer,
    caller: ClientId,
    actions: impl IntoIterator<Item = HostAction>,
) {
    for action in actions {
        let audience = audience(&action);
        let Some(message) = route_action(action) else {
            continue;
        };
        match audience {
            Audience::Caller => server.send_game_message(caller, message),
            Audience::Everyone => server.broadcast_game_message(message),
        }
    }
}

pub fn flush_host_actions(
    server: &mut RenetServer,
    actions: impl IntoIterator<Item = HostAction>,
) {
    for message in actions.into_iter().filter_map(route_action) {
        server.broadcast_game_message(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::DVec3;

    #[test]
    fn effects_become_effect_messages() {
        let message = route_action(HostAction::Bubble {
            position: DVec3::ONE,
            radius: 0.5,
        });
        assert_eq!(
            message,
            Some(ServerToClientMessage::Effect(EffectEvent::Bubble {
                position: DVec3::ONE,
                radius: 0.5
            }))
        );
    }

    #[test]
    fn snapshots_go_to_peers_only() {
        assert_eq!(
            route_action(HostAction::Snapshot {
                target: SyncTarget::Peers,
                payload: vec![1, 2, 3],
            }),
            Some(ServerToClientMessage::Snapshot(vec![1, 2, 3]))
        );
        assert_eq!(
            route_action(HostAction::Snapshot {
                target: SyncTarget::Authority,
                payload: vec![1],
            }),
            None
        );
    }

    #[test]
    fn messages_stay_with_the_caller() {
        assert_eq!(
            audience(&HostAction::ShowMessage("outdated".into())),
            Audience::Caller
        );
        assert_eq!(
            audience(&HostAction::Splash {
                position: DVec3::ZERO,
                radius: 1.0,
                audible: false,
            }),
            Audience::Everyone
        );
        assert_eq!(
            audience(&HostAction::Snapshot {
                target: SyncTarget::Peers,
                payload: vec![],
            }),
            Audience::Everyone
        );
    }

    #[test]
    fn warnings_become_notices() {
        assert_eq!(
            route_action(HostAction::ShowMessage("outdated".into())),
            Some(ServerToClientMessage::Notice("outdated".into()))
        );
    }
}
