//! Planet collaborator interface.
//!
//! Water bodies never own their planet. They keep its id and ask the host's
//! planet registry for the current state when needed.

use bevy::math::DVec3;
use serde::{Deserialize, Serialize};

use super::BodyId;

/// What the water system needs to know about a planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetInfo {
    pub id: BodyId,
    pub center: DVec3,
    pub minimum_radius: f64,
}

/// Lookup into the host's planet registry.
pub trait PlanetLookup {
    fn planet(&self, id: BodyId) -> Option<PlanetInfo>;
}

impl PlanetLookup for [PlanetInfo] {
    fn planet(&self, id: BodyId) -> Option<PlanetInfo> {
        self.iter().find(|p| p.id == id).copied()
    }
}

impl PlanetLookup for Vec<PlanetInfo> {
    fn planet(&self, id: BodyId) -> Option<PlanetInfo> {
        self.as_slice().planet(id)
    }
}
