use bevy::prelude::*;
use bevy_log::debug;
use shared::water::WaterRegistry;
use shared::{WaterServerConfig, TICKS_PER_SECOND};

use super::PlanetCatalog;

/// Tick counter of the authority.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ServerTime(pub u64);

/// Seconds of simulated time per server tick.
pub fn tick_duration(tick_rate: u64) -> f64 {
    1.0 / tick_rate.max(1) as f64
}

/// Advances every water body by one tick. Sole writer of the timers.
pub fn step_water_system(
    mut registry: ResMut<WaterRegistry>,
    planets: Res<PlanetCatalog>,
    config: Res<WaterServerConfig>,
) {
    if planets.is_changed() {
        registry.sync_with_planets(&*planets);
    }
    registry.step(tick_duration(config.tick_rate));
}

pub fn update_server_time(mut time: ResMut<ServerTime>, registry: Res<WaterRegistry>) {
    if time.0.is_multiple_of(5 * TICKS_PER_SECOND) {
        debug!("Server time: {} ({} water bodies)", time.0, registry.len());
    }
    time.0 += 1;
}
