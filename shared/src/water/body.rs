//! Water body state and its per-tick update.

use bevy::math::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::noise::NoiseField;
use super::planet::PlanetInfo;
use crate::constants::{
    DEFAULT_FOG_COLOR, DEFAULT_RADIUS_MULTIPLIER, DEFAULT_SEED, DEFAULT_TEXTURE, TIDE_TIMER_RATE,
    TIMER_UNITS_PER_SECOND,
};
use crate::error::{WaterError, WaterResult};

/// Stable external id of the planet a water body belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub i64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authoritative water configuration for one planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterSettings {
    /// Water radius as a multiple of the planet's minimum radius
    pub radius: f64,
    pub wave_height: f32,
    pub wave_speed: f32,
    pub wave_scale: f32,
    pub tide_height: f32,
    pub tide_speed: f32,
    pub viscosity: f32,
    pub buoyancy: f32,
    pub crush_depth: i32,
    pub collection_rate: f32,
    pub enable_fish: bool,
    pub enable_seagulls: bool,
    pub player_drag: bool,
    pub transparent: bool,
    pub lit: bool,
    pub texture: String,
    pub fog_color: DVec3,
    pub seed: u32,
}

impl Default for WaterSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS_MULTIPLIER,
            wave_height: 0.5,
            wave_speed: 0.04,
            wave_scale: 3.0,
            tide_height: 2.0,
            tide_speed: 1.0,
            viscosity: 0.1,
            buoyancy: 1.0,
            crush_depth: 500,
            collection_rate: 1.0,
            enable_fish: true,
            enable_seagulls: true,
            player_drag: true,
            transparent: true,
            lit: true,
            texture: DEFAULT_TEXTURE.to_string(),
            fog_color: DEFAULT_FOG_COLOR,
            seed: DEFAULT_SEED,
        }
    }
}

/// A deformed water sphere attached to a planet.
///
/// `noise` and `tide_direction` are derived from `seed` and `tide_timer` and
/// are rebuilt with [`WaterBody::rebuild_derived`] after deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterBody {
    pub body_id: BodyId,
    pub center: DVec3,
    /// Mean radius of the water sphere
    pub base_radius: f64,
    /// Effective radius, kept within [`WaterBody::radius_bounds`]
    pub current_radius: f64,

    pub wave_height: f32,
    pub wave_speed: f32,
    pub wave_scale: f32,
    /// Phase accumulator shared by all replicas
    pub wave_timer: f64,
    seed: u32,

    pub tide_height: f32,
    pub tide_speed: f32,
    pub tide_timer: f64,

    pub viscosity: f32,
    pub buoyancy: f32,
    pub crush_depth: i32,
    pub collection_rate: f32,

    pub transparent: bool,
    pub lit: bool,
    pub player_drag: bool,
    pub enable_fish: bool,
    pub enable_seagulls: bool,
    pub texture: String,
    pub fog_color: DVec3,

    #[serde(skip, default = "default_noise")]
    noise: NoiseField,
    #[serde(skip)]
    tide_direction: DVec3,
}

fn default_noise() -> NoiseField {
    NoiseField::new(DEFAULT_SEED)
}

/// Tidal bulge axis for a given tide timer, in the body's horizontal plane.
pub fn tide_direction_for(tide_timer: f64) -> DVec3 {
    let (sin, cos) = tide_timer.sin_cos();
    DVec3::new(cos, 0.0, sin)
}

impl WaterBody {
    /// Creates a body with default parameters around `center`.
    pub fn new(body_id: BodyId, center: DVec3, base_radius: f64) -> Self {
        let planet = PlanetInfo {
            id: body_id,
            center,
            minimum_radius: base_radius,
        };
        let settings = WaterSettings {
            radius: 1.0,
            ..Default::default()
        };
        Self::from_planet(&planet, Some(&settings))
    }

    /// Builds the water for a planet, using defaults when no settings are given.
    pub fn from_planet(planet: &PlanetInfo, settings: Option<&WaterSettings>) -> Self {
        let defaults = WaterSettings::default();
        let settings = settings.unwrap_or(&defaults);
        let base_radius = planet.minimum_radius * settings.radius;

        let mut body = Self {
            body_id: planet.id,
            center: planet.center,
            base_radius,
            current_radius: base_radius,
            wave_height: settings.wave_height,
            wave_speed: settings.wave_speed,
            wave_scale: settings.wave_scale,
            wave_timer: 0.0,
            seed: settings.seed,
            tide_height: settings.tide_height,
            tide_speed: settings.tide_speed,
            tide_timer: 0.0,
            viscosity: settings.viscosity,
            buoyancy: settings.buoyancy,
            crush_depth: settings.crush_depth,
            collection_rate: settings.collection_rate,
            transparent: settings.transparent,
            lit: settings.lit,
            player_drag: settings.player_drag,
            enable_fish: settings.enable_fish,
            enable_seagulls: settings.enable_seagulls,
            texture: settings.texture.clone(),
            fog_color: settings.fog_color,
            noise: NoiseField::new(settings.seed),
            tide_direction: DVec3::X,
        };
        body.rebuild_derived();
        body
    }

    /// Flat test body: no waves, no tides.
    pub fn calm(body_id: BodyId, center: DVec3, base_radius: f64) -> Self {
        let mut body = Self::new(body_id, center, base_radius);
        body.wave_height = 0.0;
        body.tide_height = 0.0;
        body
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn set_seed(&mut self, seed: u32) {
        self.seed = seed;
        self.noise = NoiseField::new(seed);
    }

    #[inline]
    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    #[inline]
    pub fn tide_direction(&self) -> DVec3 {
        self.tide_direction
    }

    /// Recomputes the values that are never sent over the wire.
    pub fn rebuild_derived(&mut self) {
        if self.noise.seed() != self.seed {
            self.noise = NoiseField::new(self.seed);
        }
        self.tide_direction = tide_direction_for(self.tide_timer);
    }

    /// Lowest and highest radius the surface can reach.
    pub fn radius_bounds(&self) -> (f64, f64) {
        let swing = self.wave_height as f64 + self.tide_height as f64;
        (self.base_radius - swing, self.base_radius + swing)
    }

    pub fn set_current_radius(&mut self, radius: f64) {
        let (min, max) = self.radius_bounds();
        self.current_radius = radius.clamp(min, max);
    }

    /// Advances timers by `dt` seconds of simulated time.
    pub fn step(&mut self, dt: f64) {
        let units = dt * TIMER_UNITS_PER_SECOND;
        self.wave_timer += self.wave_speed as f64 * units;
        self.tide_timer += self.tide_speed as f64 * units * TIDE_TIMER_RATE;
        self.tide_direction = tide_direction_for(self.tide_timer);
        self.set_current_radius(self.current_radius);
    }

    /// Checks the invariants a body received from elsewhere must hold.
    pub fn validate(&self) -> WaterResult<()> {
        let invalid = |reason: &str| WaterError::InvalidBody {
            body_id: self.body_id,
            reason: reason.to_string(),
        };

        if !(self.base_radius.is_finite() && self.base_radius > 0.0) {
            return Err(invalid("base radius must be positive"));
        }
        if !self.center.is_finite() || !self.fog_color.is_finite() {
            return Err(invalid("non-finite position"));
        }
        let floats = [
            self.wave_height,
            self.wave_speed,
            self.wave_scale,
            self.tide_height,
            self.tide_speed,
            self.viscosity,
            self.buoyancy,
            self.collection_rate,
        ];
        if floats.iter().any(|v| !v.is_finite())
            || !self.current_radius.is_finite()
            || !self.wave_timer.is_finite()
            || !self.tide_timer.is_finite()
        {
            return Err(invalid("non-finite parameter"));
        }
        if self.wave_height < 0.0 || self.tide_height < 0.0 {
            return Err(invalid("wave and tide heights must not be negative"));
        }
        if self.wave_scale <= 0.0 {
            return Err(invalid("wave scale must be positive"));
        }
        let (min, max) = self.radius_bounds();
        if !(min..=max).contains(&self.current_radius) {
            return Err(invalid("current radius outside wave and tide bounds"));
        }
        Ok(())
    }
}
