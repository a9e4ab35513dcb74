use bevy::prelude::*;
use bevy_log::{debug, error, info, warn};
use bevy_renet::renet::{ClientId, RenetServer, ServerEvent};
use shared::gateway::{CapabilityTable, GatewayContext, VersionGate};
use shared::host::QueuedHost;
use shared::messages::{ClientToServerMessage, InvokeRequest, InvokeResponse, ServerToClientMessage};
use shared::sync::{self, ReplicaRole};
use shared::water::WaterRegistry;
use shared::CAPABILITY_HANDLER_ID;

use super::extensions::SendGameMessageExtension;
use super::host::{flush_caller_actions, flush_host_actions};
use crate::world::save::{save_water_system, SaveRequestEvent};
use crate::world::simulation::{step_water_system, update_server_time, ServerTime};

pub fn setup_resources_and_events(app: &mut App) {
    app.add_event::<SaveRequestEvent>()
        .init_resource::<CapabilityTable>()
        .init_resource::<VersionGate>()
        .init_resource::<ServerTime>();
}

pub fn register_systems(app: &mut App) {
    app.add_systems(Startup, publish_capabilities_system);

    // Chained so that a save always sees the messages of the same frame
    app.add_systems(
        Update,
        (server_update_system, save_water_system).chain(),
    );

    app.add_systems(FixedUpdate, step_water_system);

    app.add_systems(PostUpdate, update_server_time);
}

fn publish_capabilities_system(table: Res<CapabilityTable>, mut server: ResMut<RenetServer>) {
    let mut host = QueuedHost::new();
    table.publish(&mut host);
    flush_host_actions(&mut server, host.drain());
}

fn send_snapshot(server: &mut RenetServer, client_id: ClientId, registry: &WaterRegistry) {
    match sync::snapshot(registry) {
        Ok(payload) => {
            server.send_game_message(client_id, ServerToClientMessage::Snapshot(payload))
        }
        Err(err) => error!("Could not build water snapshot for {}: {}", client_id, err),
    }
}

/// Runs one gateway call on behalf of a client.
pub fn handle_invoke(
    request: InvokeRequest,
    table: &CapabilityTable,
    registry: &WaterRegistry,
    versions: &mut VersionGate,
    host: &mut QueuedHost,
) -> InvokeResponse {
    let mut ctx = GatewayContext {
        registry,
        host,
        versions,
        role: ReplicaRole::Authority,
    };
    let result = table
        .invoke(&request.name, &request.args, &mut ctx)
        .map_err(|err| {
            warn!("Water call {} failed: {}", request.name, err);
            err.to_string()
        });
    InvokeResponse {
        request_id: request.request_id,
        result,
    }
}

fn server_update_system(
    mut server_events: EventReader<ServerEvent>,
    mut server: ResMut<RenetServer>,
    (mut registry, table, mut versions): (
        ResMut<WaterRegistry>,
        Res<CapabilityTable>,
        ResMut<VersionGate>,
    ),
    mut ev_save_request: EventWriter<SaveRequestEvent>,
) {
    for event in server_events.read() {
        match event {
            ServerEvent::ClientConnected { client_id } => {
                info!("Mirror {} connected.", client_id);
                server.send_game_message(
                    *client_id,
                    ServerToClientMessage::Capabilities {
                        handler_id: CAPABILITY_HANDLER_ID,
                        capabilities: table.descriptors(),
                    },
                );
                send_snapshot(&mut server, *client_id, &registry);
            }
            ServerEvent::ClientDisconnected { client_id, reason } => {
                info!("Mirror {} disconnected: {}", client_id, reason);
            }
        }
    }

    for client_id in server.clients_id() {
        while let Some(message) = server.receive_game_message(client_id) {
            let message = match message {
                Ok(message) => message,
                Err(err) => {
                    warn!("Dropping malformed message from {}: {}", client_id, err);
                    continue;
                }
            };

            match message {
                ClientToServerMessage::RequestSync => {
                    debug!("Sync requested by {}", client_id);
                    send_snapshot(&mut server, client_id, &registry);
                }
                ClientToServerMessage::Snapshot(payload) => {
                    match sync::apply(&mut registry, &payload) {
                        Ok(count) => {
                            info!("Applied water snapshot from {} ({} bodies)", client_id, count);
                            server.broadcast_game_message_except(
                                client_id,
                                ServerToClientMessage::Snapshot(payload),
                            );
                        }
                        Err(err) => {
                            server.send_game_message(
                                client_id,
                                ServerToClientMessage::Notice(format!(
                                    "Water snapshot rejected: {err}"
                                )),
                            );
                        }
                    }
                }
                ClientToServerMessage::Invoke(request) => {
                    let mut host = QueuedHost::new();
                    let response =
                        handle_invoke(request, &table, &registry, &mut versions, &mut host);
                    server.send_game_message(client_id, response.into());
                    flush_caller_actions(&mut server, client_id, host.drain());
                }
                ClientToServerMessage::SaveWorldRequest => {
                    debug!("Save request received from {}", client_id);
                    ev_save_request.write(SaveRequestEvent);
                }
                ClientToServerMessage::Exit => {
                    server.disconnect(client_id);
                    info!("Mirror {:?} disconnected", client_id);
                }
            }
        }
    }
}
