use bevy_log::{info, warn};
use ron::de::from_str;
use serde::{Deserialize, Serialize};
use shared::water::{BodyId, PlanetInfo, WaterBody, WaterRegistry, WaterSettings};
use shared::GameFolderPaths;
use std::fs;
use std::path::{Path, PathBuf};

use super::save::WaterStateData;
use super::WATER_PATH;

/// One planet of the world file, with its water if it has any.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlanetEntry {
    pub id: i64,
    pub center: bevy::math::DVec3,
    pub minimum_radius: f64,
    #[serde(default)]
    pub water: Option<WaterSettings>,
}

impl PlanetEntry {
    pub fn info(&self) -> PlanetInfo {
        PlanetInfo {
            id: BodyId(self.id),
            center: self.center,
            minimum_radius: self.minimum_radius,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WaterWorldConfig {
    #[serde(default)]
    pub planets: Vec<PlanetEntry>,
}

impl WaterWorldConfig {
    pub fn planet_infos(&self) -> Vec<PlanetInfo> {
        self.planets.iter().map(PlanetEntry::info).collect()
    }
}

pub fn world_config_path(world_name: &str, game_folder_paths: &GameFolderPaths) -> PathBuf {
    game_folder_paths
        .game_folder_path
        .join(WATER_PATH)
        .join(format!("{world_name}.ron"))
}

pub fn water_state_path(world_name: &str, game_folder_paths: &GameFolderPaths) -> PathBuf {
    game_folder_paths
        .game_folder_path
        .join(WATER_PATH)
        .join(format!("{world_name}.state.ron"))
}

pub fn parse_world_config(contents: &str) -> Result<WaterWorldConfig, Box<dyn std::error::Error>> {
    Ok(from_str(contents)?)
}

pub fn load_world_config(
    world_name: &str,
    game_folder_paths: &GameFolderPaths,
) -> Result<WaterWorldConfig, Box<dyn std::error::Error>> {
    let file_path = world_config_path(world_name, game_folder_paths);
    let path: &Path = file_path.as_path();

    if !path.exists() {
        info!(
            "Water world file not found: {}. Starting without water.",
            file_path.display()
        );
        return Ok(WaterWorldConfig::default());
    }

    let contents: String = fs::read_to_string(path)?;
    let config = parse_world_config(&contents)?;

    info!(
        "Found water world file from disk: {} ({} planets)",
        file_path.display(),
        config.planets.len()
    );

    Ok(config)
}

/// Reads the last saved water state, if the world was ever saved.
pub fn load_water_state(
    world_name: &str,
    game_folder_paths: &GameFolderPaths,
) -> Result<Option<WaterStateData>, Box<dyn std::error::Error>> {
    let file_path = water_state_path(world_name, game_folder_paths);
    let path: &Path = file_path.as_path();

    if !path.exists() {
        return Ok(None);
    }

    let contents: String = fs::read_to_string(path)?;
    let state: WaterStateData = from_str(&contents)?;

    info!("Found water state file from disk: {}", file_path.display());

    Ok(Some(state))
}

/// Builds the registry from saved state when there is one, otherwise from
/// the configured settings. Bodies that fail validation are skipped.
pub fn build_registry(config: &WaterWorldConfig, state: Option<WaterStateData>) -> WaterRegistry {
    let bodies: Vec<WaterBody> = match state {
        Some(state) => state
            .bodies
            .into_iter()
            .map(|mut body| {
                body.rebuild_derived();
                body
            })
            .collect(),
        None => config
            .planets
            .iter()
            .filter_map(|entry| {
                entry
                    .water
                    .as_ref()
                    .map(|settings| WaterBody::from_planet(&entry.info(), Some(settings)))
            })
            .collect(),
    };

    let mut registry = WaterRegistry::new();
    for body in bodies {
        if let Err(err) = body.validate() {
            warn!("Skipping water body {}: {}", body.body_id, err);
            continue;
        }
        registry.register(body);
    }
    registry
}
