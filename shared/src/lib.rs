use std::{path::PathBuf, time::Duration};

use bevy_ecs::resource::Resource;
use bevy_log::debug;
use bevy_renet::renet::{ChannelConfig, ConnectionConfig, SendType};
use bincode::Options;

pub mod constants;
pub mod error;
pub mod gateway;
pub mod host;
pub mod messages;
pub mod sync;
pub mod utils;
pub mod water;

pub use constants::*;
pub use error::{WaterError, WaterResult};
use messages::{ClientToServerMessage, ServerToClientMessage};
use utils::format_bytes;

#[derive(Resource, Debug, Clone)]
pub struct GameFolderPaths {
    pub game_folder_path: PathBuf,
}

#[derive(Resource)]
pub struct WaterServerConfig {
    pub world_name: String,
    pub tick_rate: u64,
}

const MAX_MEMORY: usize = 128 * 1024 * 1024;
const RESEND_TIME: Duration = Duration::from_millis(300);
const AVAILABLE_BYTES_PER_TICK: u64 = 5 * 1024 * 1024;

pub const CTS_STANDARD_CHANNEL: u8 = 0;
pub const CTS_SYNC_CHANNEL: u8 = 1;

pub fn get_customized_client_to_server_channels() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig {
            channel_id: CTS_STANDARD_CHANNEL,
            max_memory_usage_bytes: MAX_MEMORY,
            send_type: SendType::ReliableOrdered {
                resend_time: RESEND_TIME,
            },
        },
        ChannelConfig {
            channel_id: CTS_SYNC_CHANNEL,
            max_memory_usage_bytes: MAX_MEMORY,
            send_type: SendType::ReliableOrdered {
                resend_time: RESEND_TIME,
            },
        },
    ]
}

pub const STC_STANDARD_CHANNEL: u8 = 0;
pub const STC_SYNC_CHANNEL: u8 = 1;

pub fn get_customized_server_to_client_channels() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig {
            channel_id: STC_STANDARD_CHANNEL,
            max_memory_usage_bytes: MAX_MEMORY,
            send_type: SendType::ReliableOrdered {
                resend_time: RESEND_TIME,
            },
        },
        ChannelConfig {
            channel_id: STC_SYNC_CHANNEL,
            max_memory_usage_bytes: MAX_MEMORY,
            send_type: SendType::ReliableOrdered {
                resend_time: RESEND_TIME,
            },
        },
    ]
}

pub fn get_shared_renet_config() -> ConnectionConfig {
    ConnectionConfig {
        client_channels_config: get_customized_client_to_server_channels(),
        server_channels_config: get_customized_server_to_client_channels(),
        available_bytes_per_tick: AVAILABLE_BYTES_PER_TICK,
    }
}

/// Encodes a message with bincode and compresses it with lz4.
pub fn game_message_to_payload<T: serde::Serialize>(message: &T) -> WaterResult<Vec<u8>> {
    let payload = bincode::options().serialize(message)?;
    if payload.len() > MAX_PAYLOAD_BYTES {
        return Err(WaterError::PayloadTooLarge(payload.len()));
    }
    let output = lz4::block::compress(&payload, None, true)?;
    if payload.len() > 1024 {
        debug!(
            "Original payload size: {}",
            format_bytes(payload.len() as u64)
        );
        debug!(
            "Compressed payload of size: {}",
            format_bytes(output.len() as u64)
        );
    }
    Ok(output)
}

pub fn payload_to_game_message<T: serde::de::DeserializeOwned>(payload: &[u8]) -> WaterResult<T> {
    let declared = declared_payload_size(payload)?;
    if declared > MAX_PAYLOAD_BYTES {
        return Err(WaterError::PayloadTooLarge(declared));
    }
    let decompressed_payload = lz4::block::decompress(payload, None)?;
    Ok(bincode::options()
        .with_limit(MAX_PAYLOAD_BYTES as u64)
        .deserialize(&decompressed_payload)?)
}

/// Reads the uncompressed size lz4 prepends to a payload.
fn declared_payload_size(payload: &[u8]) -> WaterResult<usize> {
    let prefix: [u8; 4] = payload
        .get(..4)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| invalid_payload("payload is shorter than its size prefix"))?;
    usize::try_from(i32::from_le_bytes(prefix))
        .map_err(|_| invalid_payload("negative uncompressed size"))
}

fn invalid_payload(reason: &str) -> WaterError {
    WaterError::Compression(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        reason.to_string(),
    ))
}

pub fn get_game_folder_paths(game_folder_path: Option<String>) -> GameFolderPaths {
    let mut paths = default_game_folder_paths();

    if let Some(game_data) = game_folder_path {
        paths.game_folder_path = game_data.into();
    }

    paths
}

#[cfg(target_os = "windows")]
pub fn default_game_folder_paths() -> GameFolderPaths {
    GameFolderPaths {
        game_folder_path: "%AppData/tidewater".into(),
    }
}

#[cfg(target_os = "linux")]
pub fn default_game_folder_paths() -> GameFolderPaths {
    GameFolderPaths {
        game_folder_path: "$HOME/.local/share/tidewater".into(),
    }
}

#[cfg(target_os = "macos")]
pub fn default_game_folder_paths() -> GameFolderPaths {
    GameFolderPaths {
        game_folder_path: "$HOME/Library/Application Support/tidewater".into(),
    }
}

pub trait ChannelResolvableExt {
    fn get_channel_id(&self) -> u8;
}

impl ChannelResolvableExt for ClientToServerMessage {
    fn get_channel_id(&self) -> u8 {
        match self {
            ClientToServerMessage::Snapshot(_) | ClientToServerMessage::RequestSync => {
                CTS_SYNC_CHANNEL
            }
            _ => CTS_STANDARD_CHANNEL,
        }
    }
}

impl ChannelResolvableExt for ServerToClientMessage {
    fn get_channel_id(&self) -> u8 {
        match self {
            ServerToClientMessage::Snapshot(_) => STC_SYNC_CHANNEL,
            _ => STC_STANDARD_CHANNEL,
        }
    }
}
