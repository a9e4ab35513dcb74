//! Keyed collection of water bodies.

use bevy::math::DVec3;
use bevy_ecs::resource::Resource;
use bevy_log::{debug, info};
use std::collections::HashMap;

use super::body::{BodyId, WaterBody};
use super::planet::PlanetLookup;
use crate::error::{WaterError, WaterResult};

/// All water bodies known to this replica.
///
/// The tick system is the only writer; queries borrow it immutably.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct WaterRegistry {
    bodies: HashMap<BodyId, WaterBody>,
}

impl WaterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from bodies, rebuilding their derived state.
    pub fn from_bodies(bodies: impl IntoIterator<Item = WaterBody>) -> Self {
        let mut registry = Self::new();
        for mut body in bodies {
            body.rebuild_derived();
            registry.register(body);
        }
        registry
    }

    /// Inserts a body, replacing any body with the same id.
    pub fn register(&mut self, body: WaterBody) -> Option<WaterBody> {
        let previous = self.bodies.insert(body.body_id, body);
        if let Some(old) = &previous {
            debug!("Replaced water on body {}", old.body_id);
        }
        previous
    }

    pub fn remove(&mut self, id: BodyId) -> Option<WaterBody> {
        self.bodies.remove(&id)
    }

    pub fn get(&self, id: BodyId) -> WaterResult<&WaterBody> {
        self.bodies.get(&id).ok_or(WaterError::NotFound(id))
    }

    pub fn get_mut(&mut self, id: BodyId) -> WaterResult<&mut WaterBody> {
        self.bodies.get_mut(&id).ok_or(WaterError::NotFound(id))
    }

    #[inline]
    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    /// Body whose center is nearest to `position`.
    ///
    /// This is the nearest center, not the nearest surface. Equidistant
    /// bodies resolve to the lowest id so every replica picks the same one.
    pub fn closest(&self, position: DVec3) -> Option<&WaterBody> {
        self.bodies.values().min_by(|a, b| {
            a.center
                .distance_squared(position)
                .total_cmp(&b.center.distance_squared(position))
                .then(a.body_id.cmp(&b.body_id))
        })
    }

    /// Resolves an optional explicit id, falling back to the closest body.
    ///
    /// An explicit id that is not registered is an error; an empty registry
    /// without an id is not.
    pub fn resolve(&self, id: Option<BodyId>, position: DVec3) -> WaterResult<Option<&WaterBody>> {
        match id {
            Some(id) => self.get(id).map(Some),
            None => Ok(self.closest(position)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &WaterBody> {
        self.bodies.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.keys().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Advances every body by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        for body in self.bodies.values_mut() {
            body.step(dt);
        }
    }

    /// Follows planet movement and drops water whose planet no longer exists.
    pub fn sync_with_planets(&mut self, planets: &(impl PlanetLookup + ?Sized)) {
        self.bodies.retain(|id, body| match planets.planet(*id) {
            Some(planet) => {
                body.center = planet.center;
                true
            }
            None => {
                info!("Planet {} is gone, removing its water", id);
                false
            }
        });
    }

    /// Swaps in a complete set of bodies in one step.
    pub(crate) fn replace_all(&mut self, bodies: HashMap<BodyId, WaterBody>) {
        self.bodies = bodies;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water::PlanetInfo;

    fn two_bodies() -> WaterRegistry {
        WaterRegistry::from_bodies([
            WaterBody::calm(BodyId(1), DVec3::ZERO, 600.0),
            WaterBody::calm(BodyId(2), DVec3::new(10000.0, 0.0, 0.0), 600.0),
        ])
    }

    #[test]
    fn closest_is_by_center() {
        let registry = two_bodies();
        let closest = registry.closest(DVec3::new(2.0, 0.0, 0.0)).map(|b| b.body_id);
        assert_eq!(closest, Some(BodyId(1)));

        // A huge body far away has a nearer surface but a farther center.
        let mut registry = two_bodies();
        registry.register(WaterBody::calm(BodyId(3), DVec3::new(0.0, 9000.0, 0.0), 8990.0));
        let closest = registry.closest(DVec3::new(0.0, 200.0, 0.0)).map(|b| b.body_id);
        assert_eq!(closest, Some(BodyId(1)));
    }

    #[test]
    fn equidistant_bodies_pick_lowest_id() {
        let axes = [
            (9, DVec3::X),
            (3, DVec3::NEG_X),
            (7, DVec3::Y),
            (1, DVec3::NEG_Z),
            (5, DVec3::NEG_Y),
            (11, DVec3::Z),
        ];
        let registry = WaterRegistry::from_bodies(
            axes.map(|(id, axis)| WaterBody::calm(BodyId(id), axis * 5000.0, 600.0)),
        );

        assert_eq!(registry.closest(DVec3::ZERO).unwrap().body_id, BodyId(1));
    }

    #[test]
    fn empty_registry_resolves_to_none() {
        let registry = WaterRegistry::new();
        assert!(registry.closest(DVec3::ZERO).is_none());
        assert!(matches!(registry.resolve(None, DVec3::ZERO), Ok(None)));
    }

    #[test]
    fn explicit_id_must_exist() {
        let registry = two_bodies();
        assert!(matches!(
            registry.resolve(Some(BodyId(7)), DVec3::ZERO),
            Err(WaterError::NotFound(BodyId(7)))
        ));
        assert!(registry.get(BodyId(2)).is_ok());
    }

    #[test]
    fn id_zero_is_a_real_id() {
        let registry = WaterRegistry::from_bodies([
            WaterBody::calm(BodyId(0), DVec3::new(5000.0, 0.0, 0.0), 100.0),
            WaterBody::calm(BodyId(1), DVec3::ZERO, 100.0),
        ]);
        let explicit = registry.resolve(Some(BodyId(0)), DVec3::ZERO).ok().flatten();
        assert_eq!(explicit.map(|b| b.body_id), Some(BodyId(0)));
        let implicit = registry.resolve(None, DVec3::ZERO).ok().flatten();
        assert_eq!(implicit.map(|b| b.body_id), Some(BodyId(1)));
    }

    #[test]
    fn register_overwrites() {
        let mut registry = two_bodies();
        let previous = registry.register(WaterBody::calm(BodyId(1), DVec3::ONE, 50.0));
        assert!(previous.is_some());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(BodyId(1)).map(|b| b.base_radius).ok(), Some(50.0));
    }

    #[test]
    fn planets_drive_centers_and_lifetime() {
        let mut registry = two_bodies();
        let planets = vec![PlanetInfo {
            id: BodyId(2),
            center: DVec3::new(10500.0, 0.0, 0.0),
            minimum_radius: 580.0,
        }];
        registry.sync_with_planets(&planets);

        assert!(!registry.contains(BodyId(1)));
        assert_eq!(
            registry.get(BodyId(2)).map(|b| b.center).ok(),
            Some(DVec3::new(10500.0, 0.0, 0.0))
        );
    }

    #[test]
    fn step_touches_every_body() {
        let mut registry = two_bodies();
        registry.step(0.5);
        assert!(registry.iter().all(|b| b.tide_timer > 0.0));
    }
}
