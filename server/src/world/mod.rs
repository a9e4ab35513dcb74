pub mod load_from_file;
pub mod save;
pub mod simulation;

use bevy::prelude::*;
use shared::water::{BodyId, PlanetInfo, PlanetLookup};

/// Folder under the game folder where water worlds live.
pub const WATER_PATH: &str = "water";

/// The planets the authority knows about.
///
/// Stands in for the host's planet registry: water bodies follow these centers
/// and disappear with their planet.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlanetCatalog {
    pub planets: Vec<PlanetInfo>,
}

impl PlanetLookup for PlanetCatalog {
    fn planet(&self, id: BodyId) -> Option<PlanetInfo> {
        self.planets.planet(id)
    }
}
