//! Seeded scalar noise shared by every replica.
//!
//! Only the seed ever crosses the network; each replica rebuilds the same
//! generator from it and samples identical values.
//!
//! The lattice tiles every [`NOISE_PERIOD`] units, so positions are reduced
//! into one period in `f64` before sampling in `f32`. Far from the origin the
//! field keeps its sub-unit detail instead of snapping to the lattice.

use bevy::math::{DVec3, Vec3};
use noiz::prelude::*;
use std::fmt;

/// Lattice cells per tile along each axis.
pub const NOISE_PERIOD: i32 = 4096;

type TiledPerlin = MixCellGradients<OrthoGrid<i32>, Smoothstep, QuickGradients>;

/// Deterministic 3D noise generator bound to a seed.
#[derive(Clone)]
pub struct NoiseField {
    seed: u32,
    perlin: Noise<TiledPerlin>,
}

#[inline]
fn reduce(coordinate: f64) -> f32 {
    coordinate.rem_euclid(NOISE_PERIOD as f64) as f32
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        let mut perlin = Noise::from(TiledPerlin {
            cells: OrthoGrid(NOISE_PERIOD),
            ..Default::default()
        });
        perlin.set_seed(seed);
        Self { seed, perlin }
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Samples the field at an arbitrary real-valued position.
    ///
    /// Returns a value in `[-1, 1]`.
    #[inline]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f32 {
        let value = self
            .perlin
            .sample_for::<f32>(Vec3::new(reduce(x), reduce(y), reduce(z)));
        if value.is_finite() {
            value.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    #[inline]
    pub fn sample_at(&self, position: DVec3) -> f32 {
        self.sample(position.x, position.y, position.z)
    }
}

impl fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

impl PartialEq for NoiseField {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed
    }
}

/// One-shot sample without keeping a generator around.
pub fn sample(seed: u32, x: f64, y: f64, z: f64) -> f32 {
    NoiseField::new(seed).sample(x, y, z)
}
