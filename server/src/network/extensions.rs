use bevy_renet::renet::{ClientId, RenetServer};
use shared::messages::{ClientToServerMessage, ServerToClientMessage};
use shared::{
    game_message_to_payload, payload_to_game_message, ChannelResolvableExt, WaterResult,
    CTS_STANDARD_CHANNEL, CTS_SYNC_CHANNEL,
};

pub trait SendGameMessageExtension {
    fn send_game_message(&mut self, client_id: ClientId, message: ServerToClientMessage);
    fn broadcast_game_message(&mut self, message: ServerToClientMessage);
    fn broadcast_game_message_except(&mut self, client_id: ClientId, message: ServerToClientMessage);
    fn receive_game_message(
        &mut self,
        client_id: ClientId,
    ) -> Option<WaterResult<ClientToServerMessage>>;
}

impl SendGameMessageExtension for RenetServer {
    fn send_game_message(&mut self, client_id: ClientId, message: ServerToClientMessage) {
        match game_message_to_payload(&message) {
            Ok(payload) => self.send_message(client_id, message.get_channel_id(), payload),
            Err(err) => bevy_log::error!("Could not encode message for {}: {}", client_id, err),
        }
    }

    fn broadcast_game_message(&mut self, message: ServerToClientMessage) {
        match game_message_to_payload(&message) {
            Ok(payload) => self.broadcast_message(message.get_channel_id(), payload),
            Err(err) => bevy_log::error!("Could not encode broadcast message: {}", err),
        }
    }

    fn broadcast_game_message_except(&mut self, client_id: ClientId, message: ServerToClientMessage) {
        match game_message_to_payload(&message) {
            Ok(payload) => {
                self.broadcast_message_except(client_id, message.get_channel_id(), payload)
            }
            Err(err) => bevy_log::error!("Could not encode broadcast message: {}", err),
        }
    }

    fn receive_game_message(
        &mut self,
        client_id: ClientId,
    ) -> Option<WaterResult<ClientToServerMessage>> {
        // Sync traffic first so a pending snapshot is applied before queries
        [CTS_SYNC_CHANNEL, CTS_STANDARD_CHANNEL]
            .into_iter()
            .find_map(|channel| self.receive_message(client_id, channel))
            .map(|bytes| payload_to_game_message(&bytes))
    }
}
