use bevy::prelude::*;
use bevy_log::{error, info};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use shared::water::{WaterBody, WaterRegistry};
use shared::{GameFolderPaths, WaterServerConfig};
use std::{fs::File, io::Write, path::Path};

use super::load_from_file::water_state_path;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveRequestEvent;

/// Everything needed to restore the water of a world.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WaterStateData {
    pub name: String,
    pub bodies: Vec<WaterBody>,
}

impl WaterStateData {
    pub fn from_registry(name: &str, registry: &WaterRegistry) -> Self {
        let mut bodies: Vec<WaterBody> = registry.iter().cloned().collect();
        bodies.sort_by_key(|body| body.body_id);
        Self {
            name: name.to_string(),
            bodies,
        }
    }
}

pub fn save_water_system(
    registry: Res<WaterRegistry>,
    config: Res<WaterServerConfig>,
    game_folder_paths: Res<GameFolderPaths>,
    mut events: EventReader<SaveRequestEvent>,
) {
    // Drain every request so a burst results in one save
    if events.read().count() == 0 {
        return;
    }

    let state = WaterStateData::from_registry(&config.world_name, &registry);
    let file_path = water_state_path(&config.world_name, &game_folder_paths);

    if let Err(err) = save_water_data(&state, &file_path) {
        error!("[{}] Failed to save water state: {}", config.world_name, err);
    } else {
        info!(
            "[{}] Water state saved successfully ({} bodies)",
            config.world_name,
            state.bodies.len()
        );
    }
}

pub fn save_water_data(
    state: &WaterStateData,
    file_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let pretty_config = PrettyConfig::new()
        .with_depth_limit(3)
        .with_separate_tuple_members(true)
        .with_enumerate_arrays(true);

    let serialized = ron::ser::to_string_pretty(state, pretty_config)?;
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(file_path)?;
    file.write_all(serialized.as_bytes())?;
    info!("Water state saved to {}", file_path.display());
    Ok(())
}
